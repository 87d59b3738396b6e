use thiserror::Error;

use super::ProductId;

/// Failures of a single user action. The display text is what ends up in the
/// chat window, so it is written for the user rather than for a log.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RoutineError {
    #[error("Unable to load the product catalog: {0}")]
    CatalogLoadFailed(String),

    #[error("Please select at least one product before generating a routine.")]
    EmptySelection,

    #[error("Generate a routine first, then ask follow-up questions about it.")]
    EmptyTranscript,

    #[error("The assistant is still answering. Please wait for the reply before asking again.")]
    RequestInFlight,

    #[error("I can only help with questions about your routine, skincare, haircare, makeup, fragrance and related topics.")]
    OffTopic,

    #[error("Sorry, something went wrong while talking to the assistant: {0}")]
    GenerationFailed(String),

    #[error("Product {0} is not part of the catalog.")]
    UnknownProduct(ProductId),
}
