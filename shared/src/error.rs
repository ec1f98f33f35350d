use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::KvError;
use crate::model::ProductId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    InvalidState,
    Storage,
    Serialization,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Conflict => "CONFLICT",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidState => "INVALID_STATE",
            Self::Storage => "STORAGE_ERROR",
            Self::Serialization => "SERIALIZATION_ERROR",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("category name is empty")]
    Empty,
    #[error("category '{name}' already exists")]
    Duplicate { name: String },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("index {index} out of bounds for {len} products")]
    Index { index: usize, len: usize },

    #[error("product {id} no longer exists")]
    StaleIndex { id: ProductId },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("serialization failed for '{key}': {message}")]
    Serialization { key: String, message: String },

    #[error("storage failed: {0}")]
    Storage(#[from] KvError),
}

/// Error as the shell sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Validation | ErrorKind::Conflict | ErrorKind::NotFound => {
                self.message.clone()
            }
            ErrorKind::InvalidState => {
                "That product was removed. Please start the edit again.".into()
            }
            ErrorKind::Storage | ErrorKind::Serialization => {
                "Changes could not be saved and will be lost when the page closes.".into()
            }
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)
    }
}

impl std::error::Error for AppError {}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::Validation(ValidationError::Empty) => {
                AppError::new(ErrorKind::Validation, "Please enter a category name")
            }
            CatalogError::Validation(ValidationError::Duplicate { .. }) => {
                AppError::new(ErrorKind::Conflict, "Category already exists")
            }
            CatalogError::Index { .. } => {
                AppError::new(ErrorKind::NotFound, "That product does not exist")
            }
            e @ CatalogError::StaleIndex { .. } => {
                AppError::new(ErrorKind::InvalidState, e.to_string())
            }
        }
    }
}

impl From<PersistenceError> for AppError {
    fn from(e: PersistenceError) -> Self {
        let kind = match &e {
            PersistenceError::Serialization { .. } => ErrorKind::Serialization,
            PersistenceError::Storage(_) => ErrorKind::Storage,
        };
        AppError::new(kind, e.to_string())
    }
}
