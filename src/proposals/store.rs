//! Proposal creation and lookup.

use std::str::FromStr;

use crate::config::GovernanceRules;
use crate::context::TxContext;
use crate::error::GovernanceResult;
use crate::state::{EntityStore, StagedState};
use crate::types::{Proposal, Topic, TransactionId};
use crate::validation::{check_description, check_end_height, check_title};

/// Proposal as submitted, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposalDraft {
    pub title: String,
    pub description: String,
    pub topic: String,
    /// Topic payload. Stored verbatim as JSON.
    pub content: serde_json::Value,
    pub end_height: u64,
}

/// Validates and persists proposals keyed by transaction id.
#[derive(Debug, Clone)]
pub struct ProposalStore {
    rules: GovernanceRules,
}

impl ProposalStore {
    pub fn new(rules: GovernanceRules) -> Self {
        Self { rules }
    }

    /// Check title, description, topic and end height, in that order.
    pub fn validate(&self, ctx: &TxContext, draft: &ProposalDraft) -> GovernanceResult<Topic> {
        let topic = self.validate_text(&draft.title, &draft.description, &draft.topic)?;
        check_end_height(draft.end_height, ctx.block_height, &self.rules)?;
        Ok(topic)
    }

    /// The text checks of [`validate`](Self::validate) on their own.
    pub fn validate_text(
        &self,
        title: &str,
        description: &str,
        topic: &str,
    ) -> GovernanceResult<Topic> {
        check_title(title, &self.rules)?;
        check_description(description, &self.rules)?;
        Topic::from_str(topic)
    }

    /// Validate `draft` and stage it under the current transaction id.
    pub fn create<S: EntityStore + ?Sized>(
        &self,
        state: &mut StagedState<'_, S>,
        ctx: &TxContext,
        draft: ProposalDraft,
    ) -> GovernanceResult<Proposal> {
        let topic = self.validate(ctx, &draft)?;

        let proposal = Proposal {
            id: ctx.transaction.id.clone(),
            timestamp: ctx.transaction.timestamp,
            title: draft.title,
            description: draft.description,
            topic,
            content: draft.content.to_string(),
            created_height: ctx.block_height,
            end_height: draft.end_height,
            activated: false,
            submitter: ctx.sender.clone(),
        };
        state.create_proposal(proposal.clone());
        Ok(proposal)
    }

    pub async fn find_by_key<S: EntityStore + ?Sized>(
        &self,
        state: &StagedState<'_, S>,
        id: &TransactionId,
    ) -> GovernanceResult<Option<Proposal>> {
        Ok(state.load_proposal(id).await?)
    }
}
