//! Integration tests for the identity registry.

mod common;

use access_service::models::{PrivilegeTier, UserRecord};
use access_service::services::{IdentityRegistry, ServiceError};
use common::{new_user, TestApp};
use std::sync::Arc;
use std::thread;

#[test]
fn test_list_all_returns_registrations_in_order() {
    let app = TestApp::new();
    let names = ["zoe", "adam", "mia", "bob", "eve"];
    let tiers = [
        PrivilegeTier::Customer,
        PrivilegeTier::Admin,
        PrivilegeTier::Employee,
        PrivilegeTier::Customer,
        PrivilegeTier::Employee,
    ];

    let registered: Vec<UserRecord> = names
        .iter()
        .zip(tiers)
        .map(|(name, tier)| app.register(name, tier))
        .collect();

    let listed: Vec<Arc<UserRecord>> = app.registry.list_all().unwrap().collect();
    assert_eq!(listed.len(), registered.len());
    for (listed, registered) in listed.iter().zip(&registered) {
        assert_eq!(listed.user_id(), registered.user_id());
        assert_eq!(listed.display_name(), registered.display_name());
        assert_eq!(listed.created_utc(), registered.created_utc());
    }
}

#[test]
fn test_list_all_is_restartable() {
    let app = TestApp::new();
    app.register("first", PrivilegeTier::Admin);
    app.register("second", PrivilegeTier::Customer);

    let listing = app.registry.list_all().unwrap();
    let first_pass: Vec<_> = listing.clone().map(|u| u.user_id()).collect();
    let second_pass: Vec<_> = listing.map(|u| u.user_id()).collect();
    assert_eq!(first_pass, second_pass);

    let fresh: Vec<_> = app.registry.list_all().unwrap().map(|u| u.user_id()).collect();
    assert_eq!(first_pass, fresh);
}

#[test]
fn test_list_all_reflects_later_registrations() {
    let app = TestApp::new();
    app.register("first", PrivilegeTier::Admin);
    assert_eq!(app.registry.list_all().unwrap().count(), 1);

    let late = app.register("late", PrivilegeTier::Employee);
    let listed: Vec<_> = app.registry.list_all().unwrap().collect();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[1].user_id(), late.user_id());
}

#[test]
fn test_empty_registry_lists_nothing() {
    let registry = IdentityRegistry::new();
    assert_eq!(registry.list_all().unwrap().count(), 0);
}

#[test]
fn test_duplicate_registration_is_rejected_and_original_kept() {
    let app = TestApp::new();
    let admin = app.register("admin", PrivilegeTier::Admin);
    let original = app.register("original", PrivilegeTier::Customer);

    app.controller
        .request_tier_change(&original, PrivilegeTier::Employee, Some(&admin))
        .unwrap();

    // The caller's copy still carries the customer tier.
    let err = app.registry.register(original.clone()).unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateIdentity(id) if id == original.user_id()));

    let stored = app.registry.find(&original.user_id()).unwrap();
    assert_eq!(stored.tier(), PrivilegeTier::Employee);
    assert_eq!(stored.display_name(), "original");
    assert_eq!(stored.created_utc(), original.created_utc());
    assert_eq!(app.registry.len().unwrap(), 2);
}

#[test]
fn test_find_unknown_identifier_is_not_found() {
    let app = TestApp::new();
    let stranger = UserRecord::new(new_user("stranger", PrivilegeTier::Admin));

    assert!(matches!(
        app.registry.find(&stranger.user_id()),
        Err(ServiceError::NotFound(id)) if id == stranger.user_id()
    ));
}

#[test]
fn test_concurrent_registrations_are_all_recorded() {
    let registry = Arc::new(IdentityRegistry::new());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = registry.clone();
            thread::spawn(move || {
                for j in 0..25 {
                    let record =
                        UserRecord::new(new_user(&format!("user-{}-{}", i, j), PrivilegeTier::Customer));
                    registry.register(record).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.len().unwrap(), 200);
    let mut ids: Vec<_> = registry.list_all().unwrap().map(|u| u.user_id()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 200);
}
