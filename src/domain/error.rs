use thiserror::Error;

use crate::domain::types::CategoryId;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("domain validation failed: {message}")]
    Validation { message: String },
    #[error("category {id} appears more than once")]
    DuplicateCategory { id: CategoryId },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
