use thiserror::Error;

/// Errors raised by edit operations.
///
/// Display strings are user-facing and printed verbatim by the command layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    /// Requested radius exceeds the configured maximum.
    #[error("Maximum radius: {max}.")]
    MaxRadius { max: i32 },
    /// The operation would change more cells than allowed.
    #[error("Max blocks changed in an operation reached ({limit}).")]
    ChangeLimit { limit: usize },
    /// A cancel token was tripped mid-operation.
    #[error("Operation cancelled.")]
    Cancelled,
    /// Block name or id could not be resolved.
    #[error("Unknown block type '{0}'.")]
    UnknownBlock(String),
    /// Malformed pattern or mask syntax.
    #[error("Invalid pattern '{input}': {reason}")]
    InvalidPattern { input: String, reason: String },
}

pub type EditResult<T> = Result<T, EditError>;
