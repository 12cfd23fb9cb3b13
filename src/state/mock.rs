//! In-memory ledger collaborators for testing.
//!
//! `MemoryStore` is the entity store and also holds balances, so record
//! writes and credits land under one lock.
//! `StaticMembership` is a bookkeeper set tests can rotate between votes.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use super::traits::*;
use crate::types::{Address, Asset, Proposal, ProposalVote, TransactionId};

/// In-memory entity store with balances.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    proposals: HashMap<TransactionId, Proposal>,
    votes: Vec<ProposalVote>,
    assets: HashMap<String, Asset>,
    balances: HashMap<(Address, String), BigDecimal>,
    fail_writes: bool,
    fail_credits: bool,
}

impl MemoryState {
    fn increase(&mut self, address: &Address, currency: &str, amount: &BigDecimal) {
        let balance = self
            .balances
            .entry((address.clone(), currency.to_string()))
            .or_default();
        *balance = &*balance + amount;
    }

    fn has_vote(&self, proposal_id: &TransactionId, voter: &Address) -> bool {
        self.votes
            .iter()
            .any(|v| &v.proposal_id == proposal_id && &v.voter == voter)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".to_string()))
    }

    fn inspect(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap()
    }

    /// Register an asset (for test setup).
    pub fn put_asset(&self, name: &str, issuer: Address, quantity: &str, maximum: &str) {
        let asset = Asset {
            name: name.to_string(),
            issuer,
            quantity: BigDecimal::from_str(quantity).unwrap(),
            maximum: BigDecimal::from_str(maximum).unwrap(),
        };
        self.inspect().assets.insert(name.to_string(), asset);
    }

    /// Insert a proposal directly, bypassing validation (for test setup).
    pub fn insert_proposal(&self, proposal: Proposal) {
        self.inspect().proposals.insert(proposal.id.clone(), proposal);
    }

    /// Insert a vote directly (for test setup).
    pub fn insert_vote(&self, vote: ProposalVote) {
        self.inspect().votes.push(vote);
    }

    /// Make every following `apply` fail with `Unavailable`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inspect().fail_writes = fail;
    }

    /// Make every following `apply` that carries balance credits fail with
    /// `Unavailable`, as if the balance ledger were down.
    pub fn set_fail_credits(&self, fail: bool) {
        self.inspect().fail_credits = fail;
    }

    /// Credit a balance directly (for test setup).
    pub fn fund(&self, address: &Address, currency: &str, amount: &str) {
        let amount = BigDecimal::from_str(amount).unwrap();
        self.inspect().increase(address, currency, &amount);
    }

    pub fn proposal(&self, id: &TransactionId) -> Option<Proposal> {
        self.inspect().proposals.get(id).cloned()
    }

    pub fn asset(&self, name: &str) -> Option<Asset> {
        self.inspect().assets.get(name).cloned()
    }

    pub fn vote_count(&self, proposal_id: &TransactionId) -> usize {
        self.inspect()
            .votes
            .iter()
            .filter(|v| &v.proposal_id == proposal_id)
            .count()
    }

    pub fn balance_of(&self, address: &Address, currency: &str) -> BigDecimal {
        self.inspect()
            .balances
            .get(&(address.clone(), currency.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn load_proposal(&self, id: &TransactionId) -> StoreResult<Option<Proposal>> {
        Ok(self.lock()?.proposals.get(id).cloned())
    }

    async fn find_votes(&self, proposal_id: &TransactionId) -> StoreResult<Vec<ProposalVote>> {
        Ok(self
            .lock()?
            .votes
            .iter()
            .filter(|v| &v.proposal_id == proposal_id)
            .cloned()
            .collect())
    }

    async fn vote_exists(
        &self,
        proposal_id: &TransactionId,
        voter: &Address,
    ) -> StoreResult<bool> {
        Ok(self.lock()?.has_vote(proposal_id, voter))
    }

    async fn load_asset(&self, name: &str) -> StoreResult<Option<Asset>> {
        Ok(self.lock()?.assets.get(name).cloned())
    }

    async fn apply(&self, batch: WriteBatch) -> StoreResult<()> {
        let mut state = self.lock()?;
        if state.fail_writes {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        if state.fail_credits && !batch.credits.is_empty() {
            return Err(StoreError::Unavailable("balance ledger down".to_string()));
        }

        // Check every write before touching anything
        let mut new_votes = HashSet::new();
        for proposal in &batch.proposals {
            if state.proposals.contains_key(&proposal.id) {
                return Err(StoreError::Conflict(format!("proposal {}", proposal.id)));
            }
        }
        for vote in &batch.votes {
            let key = (&vote.proposal_id, &vote.voter);
            if state.has_vote(&vote.proposal_id, &vote.voter) || !new_votes.insert(key) {
                return Err(StoreError::VoteConflict {
                    proposal_id: vote.proposal_id.clone(),
                    voter: vote.voter.clone(),
                });
            }
        }
        for id in &batch.activations {
            let staged = batch.proposals.iter().any(|p| &p.id == id);
            if !staged && !state.proposals.contains_key(id) {
                return Err(StoreError::Corrupt(format!("activation of unknown proposal {}", id)));
            }
        }
        for name in batch.asset_quantities.keys() {
            if !state.assets.contains_key(name) {
                return Err(StoreError::Corrupt(format!("quantity of unknown asset {}", name)));
            }
        }

        for proposal in batch.proposals {
            state.proposals.insert(proposal.id.clone(), proposal);
        }
        state.votes.extend(batch.votes);
        for id in batch.activations {
            if let Some(proposal) = state.proposals.get_mut(&id) {
                proposal.activated = true;
            }
        }
        for (name, quantity) in batch.asset_quantities {
            if let Some(asset) = state.assets.get_mut(&name) {
                asset.quantity = quantity;
            }
        }
        for credit in &batch.credits {
            state.increase(&credit.address, &credit.currency, &credit.amount);
        }
        Ok(())
    }
}

/// Bookkeeper set that tests can change between votes.
#[derive(Clone, Default)]
pub struct StaticMembership {
    members: Arc<RwLock<HashSet<Address>>>,
}

impl StaticMembership {
    pub fn new<I>(members: I) -> Self
    where
        I: IntoIterator<Item = Address>,
    {
        Self {
            members: Arc::new(RwLock::new(members.into_iter().collect())),
        }
    }

    pub fn add(&self, member: Address) {
        self.members.write().unwrap().insert(member);
    }

    pub fn remove(&self, member: &Address) {
        self.members.write().unwrap().remove(member);
    }

    pub fn len(&self) -> usize {
        self.members.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MembershipOracle for StaticMembership {
    fn is_current_bookkeeper(&self, address: &Address) -> bool {
        self.members
            .read()
            .map(|members| members.contains(address))
            .unwrap_or(false)
    }
}
