//! Dispatcher-facing handler.
//!
//! The ledger's transaction dispatcher calls contract methods by name with
//! positional JSON arguments and expects either nothing (success), a
//! rejection message, or a hard failure that aborts the transaction.

use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use crate::context::TxContext;
use crate::error::{GovernanceError, GovernanceResult};
use crate::proposals::ProposalDraft;
use crate::service::GovernanceService;
use crate::state::{EntityStore, MembershipOracle};
use crate::types::TransactionId;

const END_HEIGHT_ERROR: &str = "EndHeight should be positive integer";

/// Contract methods exposed to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Propose,
    Vote,
}

impl Method {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "propose" => Some(Self::Propose),
            "vote" => Some(Self::Vote),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Propose => "propose",
            Self::Vote => "vote",
        }
    }

    fn arity(&self) -> usize {
        match self {
            Self::Propose => 5,
            Self::Vote => 1,
        }
    }
}

pub struct GovernanceContract<S, M> {
    service: Arc<GovernanceService<S, M>>,
}

impl<S, M> Clone for GovernanceContract<S, M> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

impl<S, M> GovernanceContract<S, M>
where
    S: EntityStore,
    M: MembershipOracle,
{
    pub fn new(service: Arc<GovernanceService<S, M>>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &GovernanceService<S, M> {
        &self.service
    }

    /// Run `method` with positional `args`.
    ///
    /// `Ok(None)` on success, `Ok(Some(message))` for a business rejection,
    /// `Err` for failures that must abort the transaction.
    pub async fn dispatch(
        &self,
        ctx: &TxContext,
        method: &str,
        args: &[Value],
    ) -> GovernanceResult<Option<String>> {
        let method = Method::parse(method)
            .ok_or_else(|| GovernanceError::InvalidCall(format!("unknown method {}", method)))?;
        if args.len() != method.arity() {
            return Err(GovernanceError::InvalidCall(format!(
                "{} expects {} arguments, got {}",
                method.name(),
                method.arity(),
                args.len()
            )));
        }

        let result = match method {
            Method::Propose => self.propose(ctx, args).await,
            Method::Vote => self.vote(ctx, &args[0]).await,
        };

        match result {
            Ok(()) => Ok(None),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(
                    method = method.name(),
                    sender = %ctx.sender,
                    tx = %ctx.transaction.id,
                    reason = %e,
                    "call rejected"
                );
                Ok(Some(e.to_string()))
            }
        }
    }

    async fn propose(&self, ctx: &TxContext, args: &[Value]) -> GovernanceResult<()> {
        let title = string_arg(&args[0], "Invalid proposal title")?;
        let description = string_arg(&args[1], "Invalid proposal description")?;
        let topic = string_arg(&args[2], "Invalid proposal topic")?;

        let end_height = match parse_end_height(&args[4]) {
            Some(height) => height,
            None => {
                // Field errors ahead of the height shape error still win
                self.service
                    .proposal_store()
                    .validate_text(title, description, topic)?;
                return Err(GovernanceError::Validation(END_HEIGHT_ERROR.to_string()));
            }
        };

        let draft = ProposalDraft {
            title: title.to_string(),
            description: description.to_string(),
            topic: topic.to_string(),
            content: args[3].clone(),
            end_height,
        };
        self.service.propose(ctx, draft).await?;
        Ok(())
    }

    async fn vote(&self, ctx: &TxContext, pid: &Value) -> GovernanceResult<()> {
        let pid = pid
            .as_str()
            .ok_or_else(|| GovernanceError::InvalidCall("proposal id must be a string".to_string()))?;
        self.service.vote(ctx, &TransactionId::new(pid)).await?;
        Ok(())
    }
}

fn string_arg<'v>(value: &'v Value, rejection: &str) -> GovernanceResult<&'v str> {
    value
        .as_str()
        .ok_or_else(|| GovernanceError::Validation(rejection.to_string()))
}

/// Non-negative integral JSON number, including integral floats like `7000.0`.
fn parse_end_height(value: &Value) -> Option<u64> {
    if let Some(height) = value.as_u64() {
        return Some(height);
    }
    let height = value.as_f64()?;
    if height.fract() == 0.0 && height >= 0.0 && height <= u64::MAX as f64 {
        Some(height as u64)
    } else {
        None
    }
}
