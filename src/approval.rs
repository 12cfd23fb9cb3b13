//! Approval evaluation.
//!
//! The threshold is an absolute vote count derived from the fixed bookkeeper
//! population, not a share of the votes cast. Only voters who are
//! bookkeepers at evaluation time count.

use tracing::debug;

use crate::config::GovernanceRules;
use crate::error::GovernanceResult;
use crate::proposals::VoteLedger;
use crate::state::{EntityStore, MembershipOracle, StagedState};
use crate::types::{Topic, TransactionId};

#[derive(Debug, Clone)]
pub struct ApprovalEvaluator {
    threshold: u64,
}

impl ApprovalEvaluator {
    pub fn new(rules: &GovernanceRules) -> Self {
        Self {
            threshold: rules.approval_threshold(),
        }
    }

    /// Valid votes must strictly exceed this.
    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    pub fn passes(&self, valid_votes: usize) -> bool {
        valid_votes as u64 > self.threshold
    }

    /// False for a missing proposal, a topic mismatch or an already
    /// activated proposal; otherwise compares current valid votes against
    /// the threshold.
    pub async fn is_approved<S, M>(
        &self,
        state: &StagedState<'_, S>,
        votes: &VoteLedger,
        membership: &M,
        proposal_id: &TransactionId,
        expected_topic: Topic,
    ) -> GovernanceResult<bool>
    where
        S: EntityStore + ?Sized,
        M: MembershipOracle + ?Sized,
    {
        let Some(proposal) = state.load_proposal(proposal_id).await? else {
            return Ok(false);
        };
        if proposal.topic != expected_topic || proposal.activated {
            return Ok(false);
        }

        let valid_votes = votes
            .count_votes_from(state, proposal_id, membership)
            .await?;
        let approved = self.passes(valid_votes);

        debug!(
            proposal = %proposal_id,
            valid_votes,
            threshold = self.threshold,
            approved,
            "approval evaluated"
        );
        Ok(approved)
    }
}
