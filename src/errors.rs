use thiserror::Error;

/// Pipeline errors, one variant per stage. Each is terminal for the current
/// request; nothing is retried or downgraded to a warning.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A locator could not be resolved into a complete instance.
    #[error("loading instance {instance:?}: {reason}")]
    Load { instance: String, reason: String },

    /// A resolved instance failed to evaluate into a value.
    #[error("building instance {instance:?}: {reason}")]
    Build { instance: String, reason: String },

    /// Conflicting constraints across instance values.
    #[error("unifying values: {0}")]
    Unify(String),

    /// The path expression is syntactically invalid.
    #[error("parsing path {path:?}: {reason}")]
    ParsePath { path: String, reason: String },

    /// The path is well formed but absent from the value.
    #[error("looking up path {path:?}: not found")]
    Lookup { path: String },

    /// The (possibly narrowed) value is not concrete and final.
    #[error("validating value: {0}")]
    Validate(String),

    /// The concrete value could not be serialized to JSON.
    #[error("marshaling value: {0}")]
    Marshal(String),
}

pub type Result<T> = std::result::Result<T, ExportError>;
