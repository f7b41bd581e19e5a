use apollo_compiler::Name;

/// Inputs this crate cannot make sense of.
///
/// Every "nothing to complete" outcome is a success; these only describe requests, schemas or
/// metadata that break the invariants the completion relies on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    #[error("Entity of abstract type \"{declared_type}\" does not report its `__typename`")]
    MissingTypename { declared_type: Name },

    #[error("Unknown type \"{type_name}\"")]
    UnknownType { type_name: String },

    #[error("Origin \"{origin}\" exposes no fields for type \"{type_name}\"")]
    MissingFieldMap { origin: String, type_name: Name },

    #[error("Invalid schema for origin \"{origin}\": {message}")]
    InvalidSchema { origin: String, message: String },

    #[error("Invalid selection set on type \"{type_name}\": {message}")]
    InvalidSelectionSet { type_name: Name, message: String },

    #[error("Invalid federation metadata: {message}")]
    InvalidMetadata { message: String },
}

impl CompletionError {
    pub(crate) fn invalid_metadata(message: impl Into<String>) -> Self {
        Self::InvalidMetadata {
            message: message.into(),
        }
    }
}
