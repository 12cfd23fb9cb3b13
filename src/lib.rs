//! Asset Governance - proposal and vote handling for a permissioned ledger
//!
//! Any account may submit a proposal. The fixed bookkeeper set votes on it,
//! and once valid votes exceed the approval threshold the proposal's effect
//! is applied exactly once. The only effect today is `asset_issue`: mint
//! more of an existing asset to its issuer, within the asset's maximum.
//!
//! Key principles:
//! - Votes are re-checked against current bookkeeper membership on every evaluation
//! - Each call commits all of its writes or none of them
//! - Issuance for one currency is serialized through a named lock
//!
//! Ledger storage, balances and membership are reached through the traits in
//! [`state`]; [`state::MemoryStore`] and [`state::StaticMembership`] back tests
//! and local runs.

pub mod approval;
pub mod config;
pub mod context;
pub mod contract;
pub mod error;
pub mod issuance;
pub mod locks;
pub mod logging;
pub mod proposals;
pub mod service;
pub mod state;
pub mod types;
pub mod validation;

pub use config::{GovernanceConfig, GovernanceRules};
pub use context::TxContext;
pub use contract::GovernanceContract;
pub use error::{GovernanceError, GovernanceResult};
pub use service::{GovernanceService, VoteReceipt};
pub use types::{Address, Asset, AssetIssueContent, Proposal, ProposalVote, Topic, TransactionId};
