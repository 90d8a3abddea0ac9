#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Lock on {resource} not acquired within {waited_ms} ms")]
    LockTimeout {
        resource: &'static str,
        waited_ms: u64,
    },
}
