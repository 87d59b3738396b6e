#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::domain::models::Action;
use crate::domain::models::CatalogSourceBox;
use crate::domain::models::CategoryFilter;
use crate::domain::models::CompletionBox;
use crate::domain::models::CompletionRequest;
use crate::domain::models::CompletionResponse;
use crate::domain::models::Event;
use crate::domain::models::RoutineError;

async fn load_catalog(
    catalog: Arc<CatalogSourceBox>,
    filter: CategoryFilter,
    tx: mpsc::UnboundedSender<Event>,
) -> Result<()> {
    let res = catalog.load().await.map_err(|err| {
        tracing::error!(error = ?err, source = %catalog.name(), "Catalog load failed");
        return RoutineError::CatalogLoadFailed(err.to_string());
    });

    tx.send(Event::CatalogLoaded(filter, res))?;
    return Ok(());
}

async fn get_completion(
    completion: Arc<CompletionBox>,
    req: CompletionRequest,
    tx: mpsc::UnboundedSender<Event>,
) -> Result<()> {
    let res = completion.get_completion(&req.turns).await.map_err(|err| {
        tracing::error!(error = ?err, id = req.id, "Completion request failed");
        return RoutineError::GenerationFailed(err.to_string());
    });

    tx.send(Event::CompletionResponse(CompletionResponse {
        id: req.id,
        result: res,
    }))?;

    return Ok(());
}

/// Runs a detached worker task, logging its failure since nothing awaits it.
async fn run_worker<F>(task: &'static str, future: F) -> bool
where
    F: Future<Output = Result<()>>,
{
    if let Err(err) = future.await {
        tracing::error!(error = ?err, task = task, "Worker task failed");
        return false;
    }

    return true;
}

pub struct ActionsService {}

impl ActionsService {
    /// Runs until the action channel closes. Every action is handled on its
    /// own task, so a new request can be sent while another is in flight.
    pub async fn start(
        catalog: CatalogSourceBox,
        completion: CompletionBox,
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        let catalog = Arc::new(catalog);
        let completion = Arc::new(completion);

        while let Some(action) = rx.recv().await {
            let worker_tx = tx.clone();
            match action {
                Action::LoadCatalog(filter) => {
                    tokio::spawn(run_worker(
                        "load_catalog",
                        load_catalog(catalog.clone(), filter, worker_tx),
                    ));
                }
                Action::CompletionRequest(req) => {
                    tracing::debug!(id = req.id, turns = req.turns.len(), "Sending completion request");
                    tokio::spawn(run_worker(
                        "get_completion",
                        get_completion(completion.clone(), req, worker_tx),
                    ));
                }
            }
        }

        return Ok(());
    }
}
