use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The storage collaborator failed. The affected brand's cycle work is
    /// abandoned and retried next cycle from the same watermark.
    #[error("repository unavailable: {0}")]
    Repository(String),

    /// A state invariant the engine relies on was found broken (e.g. two
    /// active alerts for one brand). Surfaced loudly, never reconciled
    /// silently — it indicates a concurrency-control failure upstream.
    #[error("invariant violation for brand '{brand}': {detail}")]
    InvariantViolation { brand: String, detail: String },
}
