use thiserror::Error;

use crate::state::traits::StoreError;

/// Governance operation result type
pub type GovernanceResult<T> = Result<T, GovernanceError>;

/// Governance errors.
///
/// The Display string of a business rejection is the message handed back to
/// the ledger dispatcher, so these texts are part of the external contract.
#[derive(Debug, Error)]
pub enum GovernanceError {
    /// Malformed proposal fields (title, description, topic, heights).
    #[error("{0}")]
    Validation(String),

    /// Structurally invalid topic content. Fails the whole transaction.
    #[error("{0}")]
    InvalidContent(String),

    /// Unknown method or wrongly shaped arguments from the dispatcher.
    #[error("Invalid call: {0}")]
    InvalidCall(String),

    #[error("Proposal not found")]
    ProposalNotFound,

    #[error("Asset not exists")]
    AssetNotFound,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Already voted")]
    DuplicateVote,

    #[error("Proposal expired")]
    Expired,

    #[error("Exceed issue limit")]
    LimitExceeded,

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for GovernanceError {
    /// A vote that loses a commit race to the same voter's other vote is a
    /// duplicate, not a store failure.
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::VoteConflict { .. } => Self::DuplicateVote,
            other => Self::Store(other),
        }
    }
}

/// Coarse error taxonomy shared with the ledger layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Permission,
    DuplicateVote,
    Expired,
    LimitExceeded,
    Internal,
}

impl GovernanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::InvalidContent(_) | Self::InvalidCall(_) => {
                ErrorKind::Validation
            }
            Self::ProposalNotFound | Self::AssetNotFound => ErrorKind::NotFound,
            Self::PermissionDenied => ErrorKind::Permission,
            Self::DuplicateVote => ErrorKind::DuplicateVote,
            Self::Expired => ErrorKind::Expired,
            Self::LimitExceeded => ErrorKind::LimitExceeded,
            Self::Store(_) => ErrorKind::Internal,
        }
    }

    /// Fatal errors are raised as failures instead of being returned as a
    /// rejection message.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidContent(_) | Self::InvalidCall(_) | Self::Store(_)
        )
    }
}
