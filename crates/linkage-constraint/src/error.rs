//! Error type for the constraint core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConstraintError {
    #[error("body index {body} out of range for model with {body_count} bodies")]
    BodyOutOfRange { body: usize, body_count: usize },

    #[error("singular system while {0} (redundant or inconsistent constraints?)")]
    SingularSystem(&'static str),

    #[error("actuation map must be set before calling inverse-dynamics operators")]
    ActuationMapNotSet,
}

pub type Result<T> = std::result::Result<T, ConstraintError>;
