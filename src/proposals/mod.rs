//! Proposal records and the votes cast on them.

pub mod store;
pub mod votes;

pub use store::{ProposalDraft, ProposalStore};
pub use votes::VoteLedger;
