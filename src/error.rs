/// Fallback shown when the service fails without a usable error message.
pub const GENERIC_ANALYSIS_FAILURE: &str = "Analysis failed";

/// Why a photo analysis attempt did not produce a result.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// The selected file is not an image; nothing was sent.
    #[error("Please select an image (got {media_type})")]
    InvalidInput { media_type: String },

    /// The service answered with a non-success status.
    #[error("{0}")]
    Service(String),

    /// The request never completed, or the success body could not be read.
    #[error("Could not analyze the photo")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Another analysis is still in flight.
    #[error("An analysis is already in progress")]
    Busy,

    /// The flow was reset while this request was in flight.
    #[error("Analysis was discarded")]
    Discarded,
}

impl AnalysisError {
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        AnalysisError::Transport(Box::new(err))
    }
}
