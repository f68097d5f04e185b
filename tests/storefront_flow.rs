//! Storefront Integration Tests
//!
//! End-to-end sign-in, purchase and sign-out against the file-backed store.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

use ebookvault::payment::{PaymentError, SimulatedProcessor};
use ebookvault::session::SESSION_KEY;
use ebookvault::{
    AppState, CardDetails, Catalog, FileStore, ItemId, KeyValueStore, Storefront, StorefrontError,
};

fn open_shop(temp: &TempDir) -> Storefront<FileStore> {
    let processor = SimulatedProcessor::new().with_delay(Duration::from_millis(5));
    Storefront::new(
        Catalog::builtin().unwrap(),
        FileStore::new(temp.path().join("storage.json")),
        Arc::new(processor),
    )
}

fn card(number: &str) -> CardDetails {
    CardDetails::new("Jane Reader", number, "12/99", "123")
}

#[tokio::test]
async fn test_session_survives_restart() {
    let temp = TempDir::new().unwrap();

    {
        let shop = open_shop(&temp);
        let result = shop
            .sign_in(
                &AppState::signed_out(),
                "Jane Reader",
                "jane@example.com",
                card("4242424242424242"),
                Utc::now(),
            )
            .await;
        assert_ok!(result);
    }

    // A fresh storefront over the same file sees the session
    let shop = open_shop(&temp);
    let state = shop.state().unwrap();
    let user = state.user.as_ref().unwrap();
    assert_eq!(user.email, "jane@example.com");

    let stored = shop.store().get(SESSION_KEY).unwrap().unwrap();
    assert!(!stored.contains("4242424242424242"));

    let (item, _) = shop
        .purchase(&state, ItemId(2), card("4111 1111 1111 1111"))
        .await
        .unwrap();
    assert_eq!(item.title, "Python Programming Guide");

    assert_ok!(shop.sign_out(&state, Utc::now()));
    assert!(!shop.state().unwrap().is_logged_in());
}

#[tokio::test]
async fn test_invalid_card_does_not_sign_in() {
    let temp = TempDir::new().unwrap();
    let shop = open_shop(&temp);

    let result = shop
        .sign_in(
            &AppState::signed_out(),
            "Jane Reader",
            "jane@example.com",
            card("4242424242424241"),
            Utc::now(),
        )
        .await;

    match assert_err!(result) {
        StorefrontError::Payment(e) => assert_eq!(e, PaymentError::ChecksumMismatch),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!shop.state().unwrap().is_logged_in());
}

#[tokio::test]
async fn test_invalid_email_rejected_before_charging() {
    let temp = TempDir::new().unwrap();
    let shop = open_shop(&temp);

    let result = shop
        .sign_in(
            &AppState::signed_out(),
            "Jane Reader",
            "not-an-email",
            card("4242424242424242"),
            Utc::now(),
        )
        .await;

    assert!(matches!(result, Err(StorefrontError::Session(_))));
}

#[tokio::test]
async fn test_payment_timeout_surfaces() {
    let temp = TempDir::new().unwrap();
    let processor = SimulatedProcessor::new().with_delay(Duration::from_secs(5));
    let shop = Storefront::new(
        Catalog::builtin().unwrap(),
        FileStore::new(temp.path().join("storage.json")),
        Arc::new(processor),
    )
    .with_payment_timeout(Duration::from_millis(20));

    let result = shop
        .sign_in(
            &AppState::signed_out(),
            "Jane Reader",
            "jane@example.com",
            card("4242424242424242"),
            Utc::now(),
        )
        .await;

    assert!(matches!(
        result,
        Err(StorefrontError::Payment(PaymentError::TimedOut(_)))
    ));
}
