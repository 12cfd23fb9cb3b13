//! Ledger state access.
//!
//! - `traits`: seams to the persistence and membership layers
//! - `staged`: per-call write buffer giving all-or-nothing semantics
//! - `mock`: in-memory collaborators for tests and local runs

pub mod mock;
pub mod staged;
pub mod traits;

pub use mock::{MemoryStore, StaticMembership};
pub use staged::StagedState;
pub use traits::{
    BalanceCredit, EntityStore, MembershipOracle, StoreError, StoreResult, WriteBatch,
};
