use thiserror::Error;

/// Violations of the dialogue's own invariants. These never reach the
/// party as errors; the orchestrator converts every one of them into a
/// clarifying re-prompt or a dialogue restart.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("order draft has no items")]
    EmptyDraft,
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("integration failure: {0}")]
    Integration(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[cfg(test)]
mod tests {
    use super::{ApplicationError, DomainError};

    #[test]
    fn domain_error_wraps_into_application_error() {
        let error = ApplicationError::from(DomainError::EmptyDraft);
        assert!(matches!(error, ApplicationError::Domain(DomainError::EmptyDraft)));
        assert_eq!(error.to_string(), "order draft has no items");
    }
}
