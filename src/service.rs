//! Governance entry points.
//!
//! `propose` validates and stores a proposal. `vote` checks the sender is a
//! current bookkeeper, records the vote, and applies the proposal's effect
//! once approval is reached. Each call stages its writes and commits them
//! only when every step succeeded.

use std::sync::Arc;
use tracing::info;

use crate::approval::ApprovalEvaluator;
use crate::config::GovernanceRules;
use crate::context::TxContext;
use crate::error::{GovernanceError, GovernanceResult};
use crate::issuance::{AssetIssuance, IssuanceOutcome, IssuanceReceipt};
use crate::locks::LockRegistry;
use crate::proposals::{ProposalDraft, ProposalStore, VoteLedger};
use crate::state::{EntityStore, MembershipOracle, StagedState};
use crate::types::{AssetIssueContent, Proposal, ProposalVote, Topic, TransactionId};
use crate::validation::{check_issue_content, FormatValidator, StandardFormats};

/// Result of a successful vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteReceipt {
    pub vote: ProposalVote,
    /// Set when this vote pushed the proposal over the threshold.
    pub issuance: Option<IssuanceReceipt>,
}

pub struct GovernanceService<S, M> {
    store: Arc<S>,
    membership: Arc<M>,
    formats: Arc<dyn FormatValidator>,
    locks: LockRegistry,
    rules: GovernanceRules,
    proposals: ProposalStore,
    votes: VoteLedger,
    approval: ApprovalEvaluator,
    issuance: AssetIssuance,
}

impl<S, M> GovernanceService<S, M>
where
    S: EntityStore,
    M: MembershipOracle,
{
    pub fn new(store: Arc<S>, membership: Arc<M>, rules: GovernanceRules) -> Self {
        let formats: Arc<dyn FormatValidator> = Arc::new(StandardFormats);
        let locks = LockRegistry::new();
        Self {
            store,
            membership,
            proposals: ProposalStore::new(rules.clone()),
            votes: VoteLedger::new(rules.vote_window_blocks),
            approval: ApprovalEvaluator::new(&rules),
            issuance: AssetIssuance::new(formats.clone(), locks.clone()),
            formats,
            locks,
            rules,
        }
    }

    /// Use the ledger's registered field formats instead of the built-in ones.
    pub fn with_format_validator(mut self, formats: Arc<dyn FormatValidator>) -> Self {
        self.issuance = AssetIssuance::new(formats.clone(), self.locks.clone());
        self.formats = formats;
        self
    }

    /// Share named locks with other handlers running against the same ledger.
    pub fn with_lock_registry(mut self, locks: LockRegistry) -> Self {
        self.issuance = AssetIssuance::new(self.formats.clone(), locks.clone());
        self.locks = locks;
        self
    }

    pub fn rules(&self) -> &GovernanceRules {
        &self.rules
    }

    pub fn proposal_store(&self) -> &ProposalStore {
        &self.proposals
    }

    pub fn approval(&self) -> &ApprovalEvaluator {
        &self.approval
    }

    /// Submit a proposal under the current transaction id.
    ///
    /// Field errors are business rejections. Malformed topic content is
    /// fatal (`GovernanceError::InvalidContent`) and nothing is written.
    pub async fn propose(
        &self,
        ctx: &TxContext,
        draft: ProposalDraft,
    ) -> GovernanceResult<Proposal> {
        let topic = self.proposals.validate(ctx, &draft)?;
        match topic {
            Topic::AssetIssue => {
                let content = AssetIssueContent::from_value(&draft.content)?;
                check_issue_content(&content, self.formats.as_ref())?;
            }
        }

        let mut state = StagedState::new(self.store.as_ref());
        let proposal = self.proposals.create(&mut state, ctx, draft)?;
        state.commit().await?;

        info!(
            proposal = %proposal.id,
            topic = %proposal.topic,
            submitter = %proposal.submitter,
            end_height = proposal.end_height,
            "proposal created"
        );
        Ok(proposal)
    }

    /// Cast the sender's vote and apply the effect if it tips approval.
    pub async fn vote(
        &self,
        ctx: &TxContext,
        proposal_id: &TransactionId,
    ) -> GovernanceResult<VoteReceipt> {
        if !self.membership.is_current_bookkeeper(&ctx.sender) {
            return Err(GovernanceError::PermissionDenied);
        }

        let mut state = StagedState::new(self.store.as_ref());
        let vote = self.votes.record_vote(&mut state, ctx, proposal_id).await?;

        let approved = self
            .approval
            .is_approved(
                &state,
                &self.votes,
                self.membership.as_ref(),
                proposal_id,
                Topic::AssetIssue,
            )
            .await?;

        let issuance = if approved {
            match self.issuance.apply(&mut state, ctx, proposal_id).await? {
                IssuanceOutcome::Applied(receipt) => Some(receipt),
                IssuanceOutcome::Skipped => None,
            }
        } else {
            None
        };

        state.commit().await?;

        if let Some(receipt) = &issuance {
            info!(
                proposal = %proposal_id,
                currency = %receipt.currency,
                quantity = %receipt.new_quantity,
                "proposal activated"
            );
        }
        Ok(VoteReceipt { vote, issuance })
    }

    pub async fn proposal(&self, id: &TransactionId) -> GovernanceResult<Option<Proposal>> {
        let state = StagedState::new(self.store.as_ref());
        self.proposals.find_by_key(&state, id).await
    }

    /// Current valid vote count for a proposal.
    pub async fn valid_votes(&self, id: &TransactionId) -> GovernanceResult<usize> {
        let state = StagedState::new(self.store.as_ref());
        self.votes
            .count_votes_from(&state, id, self.membership.as_ref())
            .await
    }
}
