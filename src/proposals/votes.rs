//! Vote recording and counting.
//!
//! A voter gets one vote per proposal, ever. Counting re-checks every
//! recorded voter against the membership oracle, because the bookkeeper set
//! may have changed since the vote was cast.

use tracing::debug;

use crate::context::TxContext;
use crate::error::{GovernanceError, GovernanceResult};
use crate::state::{EntityStore, MembershipOracle, StagedState};
use crate::types::{ProposalVote, TransactionId};

#[derive(Debug, Clone)]
pub struct VoteLedger {
    vote_window_blocks: u64,
}

impl VoteLedger {
    pub fn new(vote_window_blocks: u64) -> Self {
        Self { vote_window_blocks }
    }

    /// Record the sender's vote on `proposal_id`.
    ///
    /// Fails with `ProposalNotFound`, `Expired` once the proposal is older
    /// than the vote window, or `DuplicateVote`.
    pub async fn record_vote<S: EntityStore + ?Sized>(
        &self,
        state: &mut StagedState<'_, S>,
        ctx: &TxContext,
        proposal_id: &TransactionId,
    ) -> GovernanceResult<ProposalVote> {
        let proposal = state
            .load_proposal(proposal_id)
            .await?
            .ok_or(GovernanceError::ProposalNotFound)?;

        let age = ctx.block_height.saturating_sub(proposal.created_height);
        if age > self.vote_window_blocks {
            return Err(GovernanceError::Expired);
        }

        if state.vote_exists(proposal_id, &ctx.sender).await? {
            return Err(GovernanceError::DuplicateVote);
        }

        let vote = ProposalVote {
            proposal_id: proposal_id.clone(),
            voter: ctx.sender.clone(),
            cast_at: ctx.transaction.id.clone(),
        };
        state.create_vote(vote.clone());

        debug!(
            proposal = %proposal_id,
            voter = %ctx.sender,
            age,
            "vote recorded"
        );
        Ok(vote)
    }

    /// Number of recorded voters who are bookkeepers right now.
    pub async fn count_votes_from<S, M>(
        &self,
        state: &StagedState<'_, S>,
        proposal_id: &TransactionId,
        membership: &M,
    ) -> GovernanceResult<usize>
    where
        S: EntityStore + ?Sized,
        M: MembershipOracle + ?Sized,
    {
        let votes = state.find_votes(proposal_id).await?;
        Ok(votes
            .iter()
            .filter(|vote| membership.is_current_bookkeeper(&vote.voter))
            .count())
    }
}
