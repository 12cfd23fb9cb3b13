//! Persisted records and identifiers.
//!
//! Field shapes follow the ledger's `Proposal`, `ProposalVote` and `Asset`
//! tables. Quantities are exact decimals; nothing here touches floating point.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{GovernanceError, GovernanceResult};

/// Ledger account address.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transaction identifier. Proposals are keyed by the id of the transaction
/// that created them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Recognized proposal topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    AssetIssue,
}

impl Topic {
    pub const ALL: &'static [Topic] = &[Topic::AssetIssue];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::AssetIssue => "asset_issue",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = GovernanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::ALL
            .iter()
            .copied()
            .find(|topic| topic.as_str() == s)
            .ok_or_else(|| GovernanceError::Validation("Invalid proposal topic".to_string()))
    }
}

/// A governance proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Id of the creating transaction (unique, immutable).
    pub id: TransactionId,
    /// Timestamp of the creating transaction.
    pub timestamp: u64,
    pub title: String,
    pub description: String,
    pub topic: Topic,
    /// Topic payload as a JSON document, opaque to the proposal store.
    pub content: String,
    pub created_height: u64,
    pub end_height: u64,
    /// Monotonic: false until the effect is applied, then true forever.
    pub activated: bool,
    pub submitter: Address,
}

/// One bookkeeper's vote on one proposal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProposalVote {
    pub proposal_id: TransactionId,
    pub voter: Address,
    /// Id of the transaction that cast the vote.
    pub cast_at: TransactionId,
}

/// A user-issued asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Currency name, e.g. `MyCoin.USD`.
    pub name: String,
    pub issuer: Address,
    pub quantity: BigDecimal,
    pub maximum: BigDecimal,
}

/// Content of an `asset_issue` proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetIssueContent {
    pub currency: String,
    /// Amount in its decimal string form.
    pub amount: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountField {
    Text(String),
    Number(serde_json::Number),
}

#[derive(Deserialize)]
struct RawIssueContent {
    currency: Option<String>,
    amount: Option<AmountField>,
}

/// Decimal text of a JSON number, dropping the `.0` of integral floats.
fn amount_text(number: &serde_json::Number) -> String {
    if number.is_f64() {
        if let Some(value) = number.as_f64() {
            if value.fract() == 0.0 && value.abs() < 1e21 {
                return format!("{}", value as i128);
            }
        }
    }
    number.to_string()
}

impl AssetIssueContent {
    /// Extract issuance content from an arbitrary JSON value.
    ///
    /// `amount` may be a JSON string or number. Integral numbers are written
    /// without a fractional part, so `100.0` reads as `"100"`.
    pub fn from_value(value: &serde_json::Value) -> GovernanceResult<Self> {
        let invalid = || GovernanceError::InvalidContent("Invalid proposal content".to_string());

        if !value.is_object() {
            return Err(invalid());
        }
        let raw: RawIssueContent = serde_json::from_value(value.clone()).map_err(|_| invalid())?;

        let currency = raw.currency.ok_or_else(invalid)?;
        let amount = match raw.amount.ok_or_else(invalid)? {
            AmountField::Text(text) => text,
            AmountField::Number(number) => amount_text(&number),
        };

        Ok(Self { currency, amount })
    }

    /// Parse content stored on a proposal.
    pub fn from_json(content: &str) -> GovernanceResult<Self> {
        let value: serde_json::Value = serde_json::from_str(content).map_err(|_| {
            GovernanceError::InvalidContent("Invalid proposal content".to_string())
        })?;
        Self::from_value(&value)
    }

    pub fn to_json(&self) -> String {
        serde_json::json!({ "currency": self.currency, "amount": self.amount }).to_string()
    }
}
