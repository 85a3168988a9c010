/// Errors raised while accepting caller-supplied documents.
///
/// The KPI computations themselves never fail: unusable input degrades to
/// an undefined value. Only structurally broken context documents are
/// rejected with one of these variants.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid document field `{field}`: {reason}")]
    InvalidDocument { field: &'static str, reason: String },
}
