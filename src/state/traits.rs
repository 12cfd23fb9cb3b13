//! Trait abstractions for the ledger's persistence and membership layers.
//!
//! Governance logic only talks to these seams, so it runs unchanged against
//! the production ledger or the in-memory [`MemoryStore`](super::mock::MemoryStore).
//!
//! Balance credits travel inside the [`WriteBatch`] as
//! `increase(address, currency, amount)` entries, so the persistence layer
//! applies them in the same transaction as the record writes.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use std::collections::{BTreeMap, BTreeSet};

use crate::types::{Address, Asset, Proposal, ProposalVote, TransactionId};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A write would create a key that already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The voter already has a committed vote on this proposal.
    #[error("Conflict: vote {proposal_id}/{voter}")]
    VoteConflict {
        proposal_id: TransactionId,
        voter: Address,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A write refers to a record that does not exist.
    #[error("Corrupt write: {0}")]
    Corrupt(String),
}

/// Balance increase of `amount` units of `currency` for `address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceCredit {
    pub address: Address,
    pub currency: String,
    pub amount: BigDecimal,
}

/// All writes produced by one governance call.
///
/// The store must apply a batch atomically: either every write and every
/// credit lands or none does. Creating a proposal whose key already exists
/// is a [`StoreError::Conflict`]; a second vote by the same voter is a
/// [`StoreError::VoteConflict`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    pub proposals: Vec<Proposal>,
    pub votes: Vec<ProposalVote>,
    /// Proposals to flip to `activated = true`.
    pub activations: BTreeSet<TransactionId>,
    /// New `quantity` per asset name.
    pub asset_quantities: BTreeMap<String, BigDecimal>,
    /// Balance increases, applied in the same transaction.
    pub credits: Vec<BalanceCredit>,
}

impl WriteBatch {
    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
            && self.votes.is_empty()
            && self.activations.is_empty()
            && self.asset_quantities.is_empty()
            && self.credits.is_empty()
    }
}

/// Keyed entity store for governance records.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn load_proposal(&self, id: &TransactionId) -> StoreResult<Option<Proposal>>;

    /// All votes recorded for a proposal, in insertion order.
    async fn find_votes(&self, proposal_id: &TransactionId) -> StoreResult<Vec<ProposalVote>>;

    async fn vote_exists(&self, proposal_id: &TransactionId, voter: &Address)
        -> StoreResult<bool>;

    async fn load_asset(&self, name: &str) -> StoreResult<Option<Asset>>;

    /// Apply a batch of record writes and balance credits atomically.
    async fn apply(&self, batch: WriteBatch) -> StoreResult<()>;
}

/// Bookkeeper membership, read at call time.
///
/// Implementations must answer from the current set; callers never cache
/// the answer because membership changes between blocks.
pub trait MembershipOracle: Send + Sync {
    fn is_current_bookkeeper(&self, address: &Address) -> bool;
}
