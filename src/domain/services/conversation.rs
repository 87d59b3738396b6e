#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;

use serde_derive::Serialize;

use crate::domain::models::CompletionRequest;
use crate::domain::models::Product;
use crate::domain::models::RequestId;
use crate::domain::models::RoutineError;
use crate::domain::models::Transcript;

pub const SYSTEM_PROMPT: &str = "You are a friendly beauty and personal care advisor. \
Using only the products the user selected, build a clear step-by-step routine, \
saying when (morning or evening) and in what order to use each product, and why. \
Keep answers concise and practical. Only answer follow-up questions about the \
generated routine or related topics such as skincare, haircare, makeup, fragrance \
and grooming.";

pub const DEFAULT_TOPICS: &[&str] = &[
    "routine",
    "product",
    "skin",
    "hair",
    "scalp",
    "makeup",
    "fragrance",
    "perfume",
    "scent",
    "cleanser",
    "moistur",
    "serum",
    "toner",
    "sunscreen",
    "spf",
    "lotion",
    "cream",
    "shampoo",
    "conditioner",
    "mascara",
    "foundation",
    "lipstick",
    "grooming",
    "beard",
    "shave",
    "acne",
    "wrinkle",
    "apply",
    "morning",
    "evening",
    "night",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversationState {
    /// No transcript yet, or the last generation failed.
    Idle,
    /// A routine request is in flight.
    Generating,
    /// A routine exists. At most one follow-up is in flight.
    Awaiting,
}

#[derive(Serialize)]
struct ProductSummary<'a> {
    name: &'a str,
    brand: &'a str,
    category: &'a str,
    description: &'a str,
}

pub fn routine_prompt(selection: &[Product]) -> String {
    let summary = selection
        .iter()
        .map(|product| {
            return ProductSummary {
                name: &product.name,
                brand: &product.brand,
                category: &product.category,
                description: &product.description,
            };
        })
        .collect::<Vec<ProductSummary>>();

    // Serializing borrowed strings can't fail.
    let json = serde_json::to_string_pretty(&summary).unwrap_or_default();

    return format!("Create a personalized routine using these selected products:\n{json}");
}

/// Tracks the routine chat. Requests are handed out as values so the caller
/// decides how to send them, and replies are fed back by request id. Only the
/// most recently issued request is accepted, older replies are dropped.
pub struct ConversationEngine {
    transcript: Transcript,
    state: ConversationState,
    topics: Vec<String>,
    last_request_id: RequestId,
    pending: Option<RequestId>,
}

impl Default for ConversationEngine {
    fn default() -> ConversationEngine {
        return ConversationEngine::new(
            DEFAULT_TOPICS
                .iter()
                .map(|e| return e.to_string())
                .collect(),
        );
    }
}

impl ConversationEngine {
    pub fn new(topics: Vec<String>) -> ConversationEngine {
        return ConversationEngine {
            transcript: Transcript::default(),
            state: ConversationState::Idle,
            topics: topics
                .iter()
                .map(|e| return e.trim().to_lowercase())
                .filter(|e| return !e.is_empty())
                .collect(),
            last_request_id: 0,
            pending: None,
        };
    }

    /// Builds an engine from a comma separated topic list, falling back to the
    /// default topics when empty.
    pub fn with_topics(topics: &str) -> ConversationEngine {
        if topics.trim().is_empty() {
            return ConversationEngine::default();
        }

        return ConversationEngine::new(
            topics
                .split(',')
                .map(|e| return e.to_string())
                .collect(),
        );
    }

    pub fn generate_routine(
        &mut self,
        selection: &[Product],
    ) -> Result<CompletionRequest, RoutineError> {
        if selection.is_empty() {
            return Err(RoutineError::EmptySelection);
        }

        self.transcript
            .reset(SYSTEM_PROMPT, &routine_prompt(selection));
        self.state = ConversationState::Generating;

        tracing::debug!(products = selection.len(), "Generating routine");
        return Ok(self.next_request());
    }

    pub fn submit_follow_up(&mut self, text: &str) -> Result<CompletionRequest, RoutineError> {
        if self.transcript.is_empty() {
            return Err(RoutineError::EmptyTranscript);
        }
        if self.state != ConversationState::Awaiting || self.is_pending() {
            return Err(RoutineError::RequestInFlight);
        }
        if !self.is_on_topic(text) {
            return Err(RoutineError::OffTopic);
        }

        // A question whose reply failed is replaced by the new one.
        if self.transcript.drop_unanswered() {
            tracing::debug!("Replacing unanswered follow-up");
        }
        self.transcript
            .push_user(text.trim())
            .map_err(|err| return RoutineError::GenerationFailed(err.to_string()))?;

        return Ok(self.next_request());
    }

    /// Applies a reply. Returns Ok(false) when the reply belonged to a request
    /// that has since been superseded.
    pub fn handle_completion(
        &mut self,
        id: RequestId,
        result: Result<String, RoutineError>,
    ) -> Result<bool, RoutineError> {
        if self.pending != Some(id) {
            tracing::debug!(id = id, pending = ?self.pending, "Dropping stale completion");
            return Ok(false);
        }
        self.pending = None;

        let generating = self.state == ConversationState::Generating;
        let res = result.and_then(|text| {
            return self
                .transcript
                .push_assistant(&text)
                .map_err(|err| return RoutineError::GenerationFailed(err.to_string()));
        });

        match res {
            Ok(()) => {
                self.state = ConversationState::Awaiting;
                return Ok(true);
            }
            Err(err) => {
                tracing::warn!(error = %err, generating = generating, "Completion failed");
                if generating {
                    self.transcript.clear();
                    self.state = ConversationState::Idle;
                }

                return Err(err);
            }
        }
    }

    pub fn is_on_topic(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        return self
            .topics
            .iter()
            .any(|topic| return lowered.contains(topic.as_str()));
    }

    pub fn state(&self) -> ConversationState {
        return self.state;
    }

    pub fn transcript(&self) -> &Transcript {
        return &self.transcript;
    }

    pub fn is_pending(&self) -> bool {
        return self.pending.is_some();
    }

    fn next_request(&mut self) -> CompletionRequest {
        self.last_request_id += 1;
        if let Some(stale) = self.pending {
            tracing::debug!(stale = stale, id = self.last_request_id, "Superseding in flight request");
        }
        self.pending = Some(self.last_request_id);

        return CompletionRequest {
            id: self.last_request_id,
            turns: self.transcript.turns().to_vec(),
        };
    }
}
