use thiserror::Error;

use crate::outcome::Outcome;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Kind or id absent for an item-addressed operation.
    #[error("not found")]
    NotFound,
}

impl StoreError {
    pub fn outcome(&self) -> Outcome {
        match self {
            StoreError::NotFound => Outcome::NotFound,
        }
    }
}
