use thiserror::Error;

use crate::formation::SLOTS;

#[derive(Error, Debug)]
pub enum FormationError {
    #[error("Invalid slot count: expected {expected}, found {found}")]
    InvalidSlotCount { expected: usize, found: usize },

    #[error("Window has no frames")]
    EmptyWindow,

    #[error("Distance matrix covers {matrix} formations, expected {formations}")]
    MatrixSizeMismatch { formations: usize, matrix: usize },

    #[error("Invalid frame rate: {0} Hz")]
    InvalidFrameRate(f64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FormationError {
    pub fn slot_count(found: usize) -> Self {
        FormationError::InvalidSlotCount { expected: SLOTS, found }
    }

    /// Contract violations point at a bug upstream; everything else is bad input.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            FormationError::InvalidSlotCount { .. }
                | FormationError::EmptyWindow
                | FormationError::MatrixSizeMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FormationError>;
