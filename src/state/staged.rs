//! Per-call write buffer.
//!
//! A governance call reads through [`StagedState`] and writes into it. Reads
//! see the call's own pending writes. Nothing reaches the store until
//! [`StagedState::commit`]; dropping the state discards every write and
//! releases every lock the call took.

use bigdecimal::BigDecimal;

use super::traits::{BalanceCredit, EntityStore, StoreResult, WriteBatch};
use crate::locks::NamedLockGuard;
use crate::types::{Address, Asset, Proposal, ProposalVote, TransactionId};

pub struct StagedState<'a, S: ?Sized> {
    store: &'a S,
    batch: WriteBatch,
    locks: Vec<NamedLockGuard>,
}

impl<'a, S: EntityStore + ?Sized> StagedState<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            batch: WriteBatch::default(),
            locks: Vec::new(),
        }
    }

    pub async fn load_proposal(&self, id: &TransactionId) -> StoreResult<Option<Proposal>> {
        let staged = self.batch.proposals.iter().find(|p| &p.id == id).cloned();
        let proposal = match staged {
            Some(proposal) => Some(proposal),
            None => self.store.load_proposal(id).await?,
        };

        Ok(proposal.map(|mut proposal| {
            if self.batch.activations.contains(id) {
                proposal.activated = true;
            }
            proposal
        }))
    }

    pub fn create_proposal(&mut self, proposal: Proposal) {
        self.batch.proposals.push(proposal);
    }

    pub fn mark_activated(&mut self, id: &TransactionId) {
        self.batch.activations.insert(id.clone());
    }

    pub async fn vote_exists(
        &self,
        proposal_id: &TransactionId,
        voter: &Address,
    ) -> StoreResult<bool> {
        let staged = self
            .batch
            .votes
            .iter()
            .any(|v| &v.proposal_id == proposal_id && &v.voter == voter);
        if staged {
            return Ok(true);
        }
        self.store.vote_exists(proposal_id, voter).await
    }

    pub async fn find_votes(&self, proposal_id: &TransactionId) -> StoreResult<Vec<ProposalVote>> {
        let mut votes = self.store.find_votes(proposal_id).await?;
        votes.extend(
            self.batch
                .votes
                .iter()
                .filter(|v| &v.proposal_id == proposal_id)
                .cloned(),
        );
        Ok(votes)
    }

    pub fn create_vote(&mut self, vote: ProposalVote) {
        self.batch.votes.push(vote);
    }

    pub async fn load_asset(&self, name: &str) -> StoreResult<Option<Asset>> {
        let asset = self.store.load_asset(name).await?;
        Ok(asset.map(|mut asset| {
            if let Some(quantity) = self.batch.asset_quantities.get(name) {
                asset.quantity = quantity.clone();
            }
            asset
        }))
    }

    pub fn set_asset_quantity(&mut self, name: &str, quantity: BigDecimal) {
        self.batch.asset_quantities.insert(name.to_string(), quantity);
    }

    pub fn credit(&mut self, address: &Address, currency: &str, amount: BigDecimal) {
        self.batch.credits.push(BalanceCredit {
            address: address.clone(),
            currency: currency.to_string(),
            amount,
        });
    }

    /// Keep `guard` until this state is committed or dropped.
    pub fn hold(&mut self, guard: NamedLockGuard) {
        self.locks.push(guard);
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    /// Hand every staged write and credit to the store as one atomic
    /// batch, then release locks.
    ///
    /// A failure here is a store failure, not a business rejection, and
    /// leaves the store exactly as it was.
    pub async fn commit(self) -> StoreResult<()> {
        let Self {
            store,
            batch,
            locks,
        } = self;

        if !batch.is_empty() {
            store.apply(batch).await?;
        }

        drop(locks);
        Ok(())
    }
}
