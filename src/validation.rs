//! Field format checks.
//!
//! The currency pattern is checked twice: once when an issuance is proposed
//! and again when the issuance is applied. Both call sites go through
//! [`check_currency`] so they cannot drift apart.

use regex::Regex;
use std::sync::LazyLock;

use crate::config::GovernanceRules;
use crate::error::{GovernanceError, GovernanceResult};
use crate::types::AssetIssueContent;

// The separator is an unescaped `.`, so any single character is accepted
// between the name and the code (`MyCoin.USD`, `MyCoin-USD`, `MyCoin USD`).
static CURRENCY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{1,16}.[A-Z]{3,6}$").expect("valid currency regex"));

static TITLE_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_\-+!@$% ]*$").expect("valid title regex"));

static AMOUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9][0-9]{0,49}$").expect("valid amount regex"));

/// Kinds of fields with a registered format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Amount,
}

/// Format validator provided by the ledger.
pub trait FormatValidator: Send + Sync {
    /// Fail with a message if `value` does not match the format for `kind`.
    fn validate(&self, kind: FieldKind, value: &str) -> Result<(), String>;
}

/// Built-in formats: an amount is a positive integer in base units,
/// without leading zeros, at most 50 digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFormats;

impl FormatValidator for StandardFormats {
    fn validate(&self, kind: FieldKind, value: &str) -> Result<(), String> {
        match kind {
            FieldKind::Amount => {
                if AMOUNT_PATTERN.is_match(value) {
                    Ok(())
                } else {
                    Err(format!("Invalid amount: {}", value))
                }
            }
        }
    }
}

pub fn is_valid_currency(currency: &str) -> bool {
    CURRENCY_PATTERN.is_match(currency)
}

/// Currency check shared by the propose-time and apply-time guards.
pub fn check_currency(currency: &str) -> GovernanceResult<()> {
    if is_valid_currency(currency) {
        Ok(())
    } else {
        Err(GovernanceError::InvalidContent("Invalid currency".to_string()))
    }
}

/// Currency and amount checks for `asset_issue` content.
pub fn check_issue_content(
    content: &AssetIssueContent,
    formats: &dyn FormatValidator,
) -> GovernanceResult<()> {
    check_currency(&content.currency)?;
    formats
        .validate(FieldKind::Amount, &content.amount)
        .map_err(GovernanceError::InvalidContent)
}

pub fn check_title(title: &str, rules: &GovernanceRules) -> GovernanceResult<()> {
    let len = title.chars().count();
    if len < rules.title_min_chars || len > rules.title_max_chars || !TITLE_CHARSET.is_match(title)
    {
        return Err(GovernanceError::Validation(
            "Invalid proposal title".to_string(),
        ));
    }
    Ok(())
}

/// Description length is counted in UTF-16 code units, so a character
/// outside the Basic Multilingual Plane counts twice.
pub fn check_description(description: &str, rules: &GovernanceRules) -> GovernanceResult<()> {
    if description.encode_utf16().count() > rules.description_max_chars {
        return Err(GovernanceError::Validation(
            "Invalid proposal description".to_string(),
        ));
    }
    Ok(())
}

/// `end_height` must leave at least `min_duration_blocks` of voting time.
pub fn check_end_height(
    end_height: u64,
    current_height: u64,
    rules: &GovernanceRules,
) -> GovernanceResult<()> {
    if end_height < current_height.saturating_add(rules.min_duration_blocks) {
        return Err(GovernanceError::Validation(
            "Invalid proposal finish date".to_string(),
        ));
    }
    Ok(())
}
