//! Integration test for end-to-end proposal flow.
//!
//! Tests the complete lifecycle:
//! 1. Propose an asset issuance
//! 2. Bookkeepers vote until the threshold is crossed
//! 3. The tipping vote applies the issuance exactly once
//! 4. Later, duplicate and expired votes are rejected without side effects

use std::sync::Arc;

use asset_governance::config::GovernanceRules;
use asset_governance::state::{MemoryStore, StaticMembership};
use asset_governance::{
    Address, GovernanceContract, GovernanceError, GovernanceService, TransactionId, TxContext,
};
use bigdecimal::BigDecimal;
use serde_json::{json, Value};

const CURRENT_HEIGHT: u64 = 10_000;
const CURRENCY: &str = "MyCoin.USD";

fn bookkeeper(i: usize) -> Address {
    Address::new(format!("bk{:03}", i))
}

/// Issuer is bookkeeper 52, so it can cast the 53rd vote itself.
fn issuer() -> Address {
    bookkeeper(52)
}

struct Harness {
    store: Arc<MemoryStore>,
    membership: Arc<StaticMembership>,
    contract: GovernanceContract<MemoryStore, StaticMembership>,
}

impl Harness {
    fn new(quantity: &str, maximum: &str) -> Self {
        let store = Arc::new(MemoryStore::new());
        store.put_asset(CURRENCY, issuer(), quantity, maximum);
        let membership = Arc::new(StaticMembership::new((0..101).map(bookkeeper)));
        let service = GovernanceService::new(
            store.clone(),
            membership.clone(),
            GovernanceRules::default(),
        );
        Self {
            store,
            membership,
            contract: GovernanceContract::new(Arc::new(service)),
        }
    }

    async fn propose(&self, tx: &str, amount: Value) -> Option<String> {
        let ctx = TxContext::new(
            Address::new("alice"),
            TransactionId::new(tx),
            1_700_000_000,
            CURRENT_HEIGHT,
        );
        let args = [
            json!("Issue MyCoin"),
            json!("Top up circulating supply"),
            json!("asset_issue"),
            json!({ "currency": CURRENCY, "amount": amount }),
            json!(CURRENT_HEIGHT + 6000),
        ];
        self.contract.dispatch(&ctx, "propose", &args).await.unwrap()
    }

    async fn vote_at(&self, voter: Address, pid: &str, height: u64) -> Option<String> {
        let tx = TransactionId::new(format!("vote-{}-{}", pid, voter));
        let ctx = TxContext::new(voter, tx, 1_700_000_100, height);
        self.contract
            .dispatch(&ctx, "vote", &[json!(pid)])
            .await
            .unwrap()
    }

    async fn vote(&self, voter: Address, pid: &str) -> Option<String> {
        self.vote_at(voter, pid, CURRENT_HEIGHT + 1).await
    }

    fn quantity(&self) -> BigDecimal {
        self.store.asset(CURRENCY).unwrap().quantity
    }

    fn activated(&self, pid: &str) -> bool {
        self.store
            .proposal(&TransactionId::new(pid))
            .unwrap()
            .activated
    }
}

#[tokio::test]
async fn test_full_issuance_lifecycle() {
    let h = Harness::new("0", "1000000");

    // 1. Propose
    assert_eq!(h.propose("p1", json!("100")).await, None);
    let stored = h.store.proposal(&TransactionId::new("p1")).unwrap();
    assert!(!stored.activated);
    assert_eq!(stored.created_height, CURRENT_HEIGHT);
    assert_eq!(stored.end_height, CURRENT_HEIGHT + 6000);
    assert_eq!(stored.submitter, Address::new("alice"));

    // 2. 52 votes do not reach approval
    for i in 0..52 {
        assert_eq!(h.vote(bookkeeper(i), "p1").await, None);
    }
    assert!(!h.activated("p1"));
    assert_eq!(h.quantity(), BigDecimal::from(0));

    // 3. The issuer's vote is the 53rd and applies the issuance
    assert_eq!(h.vote(issuer(), "p1").await, None);
    assert!(h.activated("p1"));
    assert_eq!(h.quantity(), BigDecimal::from(100));
    assert_eq!(h.store.balance_of(&issuer(), CURRENCY), BigDecimal::from(100));

    // 4. A 54th vote is recorded but nothing is issued again
    assert_eq!(h.vote(bookkeeper(53), "p1").await, None);
    assert_eq!(h.store.vote_count(&TransactionId::new("p1")), 54);
    assert_eq!(h.quantity(), BigDecimal::from(100));
    assert_eq!(h.store.balance_of(&issuer(), CURRENCY), BigDecimal::from(100));
}

#[tokio::test]
async fn test_numeric_amount_is_accepted() {
    let h = Harness::new("0", "1000");
    assert_eq!(h.propose("p1", json!(250)).await, None);

    for i in 0..53 {
        h.vote(bookkeeper(i), "p1").await;
    }
    assert_eq!(h.quantity(), BigDecimal::from(250));
}

#[tokio::test]
async fn test_duplicate_vote_rejected() {
    let h = Harness::new("0", "1000");
    h.propose("p1", json!("100")).await;

    assert_eq!(h.vote(bookkeeper(0), "p1").await, None);
    assert_eq!(
        h.vote(bookkeeper(0), "p1").await.as_deref(),
        Some("Already voted")
    );
    assert_eq!(h.store.vote_count(&TransactionId::new("p1")), 1);
}

#[tokio::test]
async fn test_vote_window_boundary() {
    let h = Harness::new("0", "1000");
    h.propose("p1", json!("100")).await;
    let window = GovernanceRules::default().vote_window_blocks;

    assert_eq!(
        h.vote_at(bookkeeper(0), "p1", CURRENT_HEIGHT + window).await,
        None
    );
    assert_eq!(
        h.vote_at(bookkeeper(1), "p1", CURRENT_HEIGHT + window + 1)
            .await
            .as_deref(),
        Some("Proposal expired")
    );
    assert_eq!(h.store.vote_count(&TransactionId::new("p1")), 1);
}

#[tokio::test]
async fn test_vote_on_unknown_proposal() {
    let h = Harness::new("0", "1000");
    assert_eq!(
        h.vote(bookkeeper(0), "nope").await.as_deref(),
        Some("Proposal not found")
    );
}

#[tokio::test]
async fn test_non_bookkeeper_cannot_vote() {
    let h = Harness::new("0", "1000");
    h.propose("p1", json!("100")).await;
    assert_eq!(
        h.vote(Address::new("mallory"), "p1").await.as_deref(),
        Some("Permission denied")
    );
}

#[tokio::test]
async fn test_limit_exceeded_leaves_ledger_untouched() {
    let h = Harness::new("950", "1000");
    h.propose("p1", json!("100")).await;

    for i in 0..52 {
        assert_eq!(h.vote(bookkeeper(i), "p1").await, None);
    }
    assert_eq!(
        h.vote(issuer(), "p1").await.as_deref(),
        Some("Exceed issue limit")
    );

    assert_eq!(h.quantity(), BigDecimal::from(950));
    assert!(!h.activated("p1"));
    assert_eq!(h.store.balance_of(&issuer(), CURRENCY), BigDecimal::from(0));
    // The tipping vote was rolled back with the issuance
    assert_eq!(h.store.vote_count(&TransactionId::new("p1")), 52);
}

#[tokio::test]
async fn test_non_issuer_tipping_vote_is_denied() {
    let h = Harness::new("0", "1000");
    h.propose("p1", json!("100")).await;

    for i in 0..52 {
        h.vote(bookkeeper(i), "p1").await;
    }
    // bookkeeper 60 is not the asset's issuer
    assert_eq!(
        h.vote(bookkeeper(60), "p1").await.as_deref(),
        Some("Permission denied")
    );
    assert!(!h.activated("p1"));

    // The issuer can still tip it afterwards
    assert_eq!(h.vote(issuer(), "p1").await, None);
    assert!(h.activated("p1"));
}

#[tokio::test]
async fn test_membership_change_reduces_valid_votes() {
    let h = Harness::new("0", "1000");
    h.propose("p1", json!("100")).await;

    for i in 0..52 {
        h.vote(bookkeeper(i), "p1").await;
    }
    // Two earlier voters lose bookkeeper status
    h.membership.remove(&bookkeeper(0));
    h.membership.remove(&bookkeeper(1));

    assert_eq!(h.vote(issuer(), "p1").await, None);
    assert!(!h.activated("p1"));
    assert_eq!(
        h.contract
            .service()
            .valid_votes(&TransactionId::new("p1"))
            .await
            .unwrap(),
        51
    );

    for i in 53..55 {
        h.vote(bookkeeper(i), "p1").await;
    }
    // Quorum reached by a non-issuer: issuance is denied
    assert!(!h.activated("p1"));
}

#[tokio::test]
async fn test_propose_rejections() {
    let h = Harness::new("0", "1000");
    let ctx = TxContext::new(Address::new("alice"), TransactionId::new("p9"), 0, CURRENT_HEIGHT);

    let cases: [(&str, [Value; 5], &str); 4] = [
        (
            "short title",
            [
                json!("Too short"),
                json!(""),
                json!("asset_issue"),
                json!({"currency": CURRENCY, "amount": "1"}),
                json!(CURRENT_HEIGHT + 6000),
            ],
            "Invalid proposal title",
        ),
        (
            "bad characters",
            [
                json!("Issue <MyCoin>"),
                json!(""),
                json!("asset_issue"),
                json!({"currency": CURRENCY, "amount": "1"}),
                json!(CURRENT_HEIGHT + 6000),
            ],
            "Invalid proposal title",
        ),
        (
            "unknown topic",
            [
                json!("Issue MyCoin"),
                json!(""),
                json!("asset_burn"),
                json!({"currency": CURRENCY, "amount": "1"}),
                json!(CURRENT_HEIGHT + 6000),
            ],
            "Invalid proposal topic",
        ),
        (
            "too soon",
            [
                json!("Issue MyCoin"),
                json!(""),
                json!("asset_issue"),
                json!({"currency": CURRENCY, "amount": "1"}),
                json!(CURRENT_HEIGHT + 5759),
            ],
            "Invalid proposal finish date",
        ),
    ];

    for (case, args, expected) in cases {
        let result = h.contract.dispatch(&ctx, "propose", &args).await.unwrap();
        assert_eq!(result.as_deref(), Some(expected), "case: {}", case);
    }
    assert!(h.store.proposal(&TransactionId::new("p9")).is_none());
}

#[tokio::test]
async fn test_minimum_duration_is_accepted() {
    let h = Harness::new("0", "1000");
    let ctx = TxContext::new(Address::new("alice"), TransactionId::new("p1"), 0, CURRENT_HEIGHT);
    let args = [
        json!("Issue MyCoin"),
        json!(""),
        json!("asset_issue"),
        json!({"currency": CURRENCY, "amount": "1"}),
        json!(CURRENT_HEIGHT + 5760),
    ];
    assert_eq!(h.contract.dispatch(&ctx, "propose", &args).await.unwrap(), None);
}

#[tokio::test]
async fn test_malformed_content_fails_hard() {
    let h = Harness::new("0", "1000");
    let ctx = TxContext::new(Address::new("alice"), TransactionId::new("p1"), 0, CURRENT_HEIGHT);

    for content in [
        json!({"amount": "1"}),
        json!({"currency": CURRENCY}),
        json!({"currency": "MyCoin.usd", "amount": "1"}),
        json!({"currency": CURRENCY, "amount": "-5"}),
        json!("not an object"),
    ] {
        let args = [
            json!("Issue MyCoin"),
            json!(""),
            json!("asset_issue"),
            content.clone(),
            json!(CURRENT_HEIGHT + 6000),
        ];
        let err = h.contract.dispatch(&ctx, "propose", &args).await.unwrap_err();
        assert!(err.is_fatal(), "content {} should be fatal", content);
    }
    assert!(h.store.proposal(&TransactionId::new("p1")).is_none());
}

#[tokio::test]
async fn test_store_outage_surfaces_as_error() {
    let h = Harness::new("0", "1000");
    h.propose("p1", json!("100")).await;
    h.store.set_fail_writes(true);

    let ctx = TxContext::new(bookkeeper(0), TransactionId::new("v1"), 0, CURRENT_HEIGHT + 1);
    let err = h
        .contract
        .dispatch(&ctx, "vote", &[json!("p1")])
        .await
        .unwrap_err();
    assert!(matches!(err, GovernanceError::Store(_)));
}

#[tokio::test]
async fn test_ledger_outage_on_tipping_vote_applies_nothing() {
    let h = Harness::new("0", "1000");
    h.propose("p1", json!("100")).await;
    for i in 0..52 {
        assert_eq!(h.vote(bookkeeper(i), "p1").await, None);
    }

    h.store.set_fail_credits(true);
    let ctx = TxContext::new(issuer(), TransactionId::new("tip"), 0, CURRENT_HEIGHT + 1);
    let err = h
        .contract
        .dispatch(&ctx, "vote", &[json!("p1")])
        .await
        .unwrap_err();
    assert!(err.is_fatal());

    assert_eq!(h.quantity(), BigDecimal::from(0));
    assert!(!h.activated("p1"));
    assert_eq!(h.store.vote_count(&TransactionId::new("p1")), 52);
    assert_eq!(h.store.balance_of(&issuer(), CURRENCY), BigDecimal::from(0));

    // Once the ledger is back the same vote goes through
    h.store.set_fail_credits(false);
    assert_eq!(h.vote(issuer(), "p1").await, None);
    assert!(h.activated("p1"));
    assert_eq!(h.quantity(), BigDecimal::from(100));
    assert_eq!(h.store.balance_of(&issuer(), CURRENCY), BigDecimal::from(100));
}

#[tokio::test]
async fn test_integral_float_amount_is_accepted() {
    let h = Harness::new("0", "1000");
    assert_eq!(h.propose("p1", json!(100.0)).await, None);
    for i in 0..52 {
        h.vote(bookkeeper(i), "p1").await;
    }
    assert_eq!(h.vote(issuer(), "p1").await, None);
    assert_eq!(h.quantity(), BigDecimal::from(100));

    // A fractional amount still fails the integer format
    let ctx = TxContext::new(Address::new("alice"), TransactionId::new("p2"), 0, CURRENT_HEIGHT);
    let args = [
        json!("Issue MyCoin"),
        json!(""),
        json!("asset_issue"),
        json!({ "currency": CURRENCY, "amount": 100.5 }),
        json!(CURRENT_HEIGHT + 6000),
    ];
    let err = h.contract.dispatch(&ctx, "propose", &args).await.unwrap_err();
    assert!(err.is_fatal());
}
