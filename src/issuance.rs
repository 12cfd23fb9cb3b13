//! Asset issuance effect.
//!
//! Applying an approved `asset_issue` proposal:
//! 1. Load the proposal; missing or already activated is a no-op
//! 2. Parse and re-validate `{currency, amount}`
//! 3. Take the `issue@<currency>` lock until the call commits or fails
//! 4. Load the asset; the current sender must be its issuer
//! 5. `quantity + amount` must not exceed `maximum`
//! 6. Stage the new quantity, the sender's credit and the activation
//!
//! All writes go through the caller's [`StagedState`], so a failure in any
//! step leaves the ledger untouched.

use bigdecimal::BigDecimal;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

use crate::context::TxContext;
use crate::error::{GovernanceError, GovernanceResult};
use crate::locks::{issue_lock_name, LockRegistry};
use crate::state::{EntityStore, StagedState};
use crate::types::{AssetIssueContent, TransactionId};
use crate::validation::{check_issue_content, FormatValidator};

/// What an issuance attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssuanceOutcome {
    Applied(IssuanceReceipt),
    /// Proposal missing or already activated.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuanceReceipt {
    pub proposal_id: TransactionId,
    pub currency: String,
    pub amount: BigDecimal,
    pub new_quantity: BigDecimal,
}

/// Effect applier for approved `asset_issue` proposals.
#[derive(Clone)]
pub struct AssetIssuance {
    formats: Arc<dyn FormatValidator>,
    locks: LockRegistry,
}

impl AssetIssuance {
    pub fn new(formats: Arc<dyn FormatValidator>, locks: LockRegistry) -> Self {
        Self { formats, locks }
    }

    pub async fn apply<S: EntityStore + ?Sized>(
        &self,
        state: &mut StagedState<'_, S>,
        ctx: &TxContext,
        proposal_id: &TransactionId,
    ) -> GovernanceResult<IssuanceOutcome> {
        let Some(proposal) = state.load_proposal(proposal_id).await? else {
            return Ok(IssuanceOutcome::Skipped);
        };
        if proposal.activated {
            return Ok(IssuanceOutcome::Skipped);
        }

        let content = AssetIssueContent::from_json(&proposal.content)?;
        check_issue_content(&content, self.formats.as_ref())?;
        let amount = BigDecimal::from_str(&content.amount)
            .map_err(|_| GovernanceError::InvalidContent(format!("Invalid amount: {}", content.amount)))?;
        let currency = content.currency;

        state.hold(self.locks.acquire(&issue_lock_name(&currency)).await);

        // Another transaction may have activated it while we waited
        let activated = state
            .load_proposal(proposal_id)
            .await?
            .is_some_and(|p| p.activated);
        if activated {
            debug!(proposal = %proposal_id, "already activated while waiting for lock");
            return Ok(IssuanceOutcome::Skipped);
        }

        let asset = state
            .load_asset(&currency)
            .await?
            .ok_or(GovernanceError::AssetNotFound)?;
        if asset.issuer != ctx.sender {
            return Err(GovernanceError::PermissionDenied);
        }

        let new_quantity = &asset.quantity + &amount;
        if new_quantity > asset.maximum {
            return Err(GovernanceError::LimitExceeded);
        }

        state.set_asset_quantity(&currency, new_quantity.clone());
        state.credit(&ctx.sender, &currency, amount.clone());
        state.mark_activated(proposal_id);

        info!(
            proposal = %proposal_id,
            currency = %currency,
            amount = %amount,
            quantity = %new_quantity,
            "asset issuance staged"
        );
        Ok(IssuanceOutcome::Applied(IssuanceReceipt {
            proposal_id: proposal_id.clone(),
            currency,
            amount,
            new_quantity,
        }))
    }
}
