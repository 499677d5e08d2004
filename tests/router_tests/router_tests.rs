//! Tests for Router
//!
//! These tests verify:
//! - Input validation happens before the store is touched
//! - Absent ids surface as NotFound
//! - Command dispatch produces the matching reply
//! - Routers share one injected store

use std::sync::Arc;

use userstore::protocol::{Command, Reply};
use userstore::router::MAX_FIELD_LEN;
use userstore::{Router, StoreError, User, UserStore};

fn setup_router() -> Router {
    Router::new(Arc::new(UserStore::new()))
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_create_rejects_empty_name() {
    let router = setup_router();

    let result = router.create_user(String::new(), "a@x.com".to_string());

    assert!(matches!(result, Err(StoreError::InvalidInput(_))));
    assert!(router.store().is_empty());
}

#[test]
fn test_create_rejects_blank_email() {
    let router = setup_router();

    let result = router.create_user("Alice".to_string(), "   ".to_string());

    match result {
        Err(StoreError::InvalidInput(message)) => assert!(message.contains("email")),
        other => panic!("Expected InvalidInput, got {:?}", other),
    }
    assert!(router.store().is_empty());
}

#[test]
fn test_update_rejects_empty_fields_before_lookup() {
    let router = setup_router();
    router
        .create_user("Alice".to_string(), "a@x.com".to_string())
        .unwrap();

    let result = router.update_user(1, String::new(), "b@x.com".to_string());
    assert!(matches!(result, Err(StoreError::InvalidInput(_))));

    // Validation wins over not-found
    let result = router.update_user(99, String::new(), String::new());
    assert!(matches!(result, Err(StoreError::InvalidInput(_))));

    assert_eq!(router.get_user(1).unwrap().name, "Alice");
}

#[test]
fn test_field_length_limit() {
    let router = setup_router();

    let at_limit = "a".repeat(MAX_FIELD_LEN);
    assert!(router
        .create_user(at_limit.clone(), "a@x.com".to_string())
        .is_ok());

    let result = router.create_user("Bob".to_string(), "e".repeat(MAX_FIELD_LEN + 1));
    match result {
        Err(StoreError::InvalidInput(message)) => assert!(message.starts_with("email exceeds")),
        other => panic!("Expected InvalidInput, got {:?}", other),
    }

    let result = router.update_user(1, at_limit + "a", "a@x.com".to_string());
    assert!(matches!(result, Err(StoreError::InvalidInput(_))));
    assert_eq!(router.store().len(), 1);
}

// =============================================================================
// Not Found Tests
// =============================================================================

#[test]
fn test_get_missing_user() {
    let router = setup_router();
    assert!(matches!(router.get_user(5), Err(StoreError::NotFound(5))));
}

#[test]
fn test_update_missing_user() {
    let router = setup_router();
    let result = router.update_user(3, "Bob".to_string(), "b@x.com".to_string());
    assert!(matches!(result, Err(StoreError::NotFound(3))));
}

#[test]
fn test_delete_missing_user_twice() {
    let router = setup_router();
    router
        .create_user("Bob".to_string(), "b@x.com".to_string())
        .unwrap();

    router.delete_user(1).unwrap();
    assert!(matches!(router.delete_user(1), Err(StoreError::NotFound(1))));
}

// =============================================================================
// Dispatch Tests
// =============================================================================

#[test]
fn test_execute_full_lifecycle() {
    let router = setup_router();

    let created = router
        .execute(Command::Create {
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
        })
        .unwrap();
    let alice = User {
        id: 1,
        name: "Alice".to_string(),
        email: "a@x.com".to_string(),
    };
    assert_eq!(created, Reply::Created(alice.clone()));

    assert_eq!(
        router.execute(Command::Get { id: 1 }).unwrap(),
        Reply::User(alice.clone())
    );
    assert_eq!(
        router.execute(Command::List).unwrap(),
        Reply::Users(vec![alice])
    );

    let updated = router
        .execute(Command::Update {
            id: 1,
            name: "Alice2".to_string(),
            email: "a2@x.com".to_string(),
        })
        .unwrap();
    assert_eq!(
        updated,
        Reply::Updated(User {
            id: 1,
            name: "Alice2".to_string(),
            email: "a2@x.com".to_string(),
        })
    );

    assert_eq!(
        router.execute(Command::Delete { id: 1 }).unwrap(),
        Reply::Deleted { id: 1 }
    );
    assert_eq!(router.execute(Command::List).unwrap(), Reply::Users(vec![]));
}

#[test]
fn test_execute_ping() {
    let router = setup_router();
    assert_eq!(router.execute(Command::Ping).unwrap(), Reply::Pong);
}

#[test]
fn test_execute_get_missing() {
    let router = setup_router();
    assert!(matches!(
        router.execute(Command::Get { id: 1 }),
        Err(StoreError::NotFound(1))
    ));
}

#[test]
fn test_routers_share_injected_store() {
    let store = Arc::new(UserStore::new());
    let first = Router::new(Arc::clone(&store));
    let second = Router::new(Arc::clone(&store));

    first
        .create_user("Alice".to_string(), "a@x.com".to_string())
        .unwrap();

    assert_eq!(second.get_user(1).unwrap().name, "Alice");
    assert_eq!(store.len(), 1);
}
