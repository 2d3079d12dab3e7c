use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid item record: {reason}")]
    InvalidItemRecord { reason: String },
}
