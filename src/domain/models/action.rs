use super::CategoryFilter;
use super::CompletionRequest;

pub enum Action {
    LoadCatalog(CategoryFilter),
    CompletionRequest(CompletionRequest),
}
