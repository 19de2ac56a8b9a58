#![allow(clippy::unwrap_used)] // Integration tests use unwrap for brevity

//! Integration tests over a file-backed store.
//!
//! Exercises the full flow a storefront session goes through: sign in,
//! admin gate, user bookkeeping, sign out, and reopening the store.

use std::sync::Arc;

use centertech_core::config::AuthConfig;
use centertech_core::session::ROLE_KEY;
use centertech_core::users::USERS_KEY;
use centertech_core::{GuardDecision, JsonFileStore, KeyValueStore, Role, Services};
use serde_json::{Map, Value, json};

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn services_at(path: &std::path::Path) -> Services {
    Services::new(Arc::new(JsonFileStore::open(path)), &AuthConfig::default())
}

#[test]
fn session_and_users_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let services = services_at(&path);
    services.session.set_token(Some("tok"));
    services.session.set_role(Some(Role::Admin));
    let ana = services.users.create(fields(json!({"nome": "Ana", "email": "ana@x.io"})));
    let bia = services.users.create(fields(json!({"nome": "Bia"})));

    let reopened = services_at(&path);
    assert_eq!(reopened.session.role(), Some(Role::Admin));
    assert_eq!(reopened.users.list(), vec![ana.clone(), bia.clone()]);
    assert_eq!(
        reopened.guard.check_admin("/admin/usuarios", &reopened.session),
        GuardDecision::Allow
    );

    assert!(reopened.users.delete(&ana.id));
    assert_eq!(services.users.list(), vec![bia]);
}

#[test]
fn sign_out_redirects_back_to_origin() {
    let dir = tempfile::tempdir().unwrap();
    let services = services_at(&dir.path().join("store.json"));
    services.session.set_token(Some("tok"));
    services.session.set_role(Some(Role::Cliente));

    assert!(matches!(
        services.guard.check_admin("/admin", &services.session),
        GuardDecision::Forbidden { role: Some(Role::Cliente) }
    ));

    services.session.sign_out();
    let GuardDecision::Redirect(redirect) = services.guard.check("/minhas-rifas") else {
        unreachable!("expected redirect after sign out");
    };
    assert_eq!(redirect.location(), "/login?from=%2Fminhas-rifas");
}

#[test]
fn foreign_values_in_file_read_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let raw = JsonFileStore::open(&path);
    raw.set(ROLE_KEY, "SUPERUSER").unwrap();
    raw.set(USERS_KEY, "{\"broken\": true").unwrap();

    let services = services_at(&path);
    assert_eq!(services.session.role(), None);
    assert!(services.users.list().is_empty());

    services.users.clear();
    assert_eq!(raw.get(USERS_KEY).unwrap(), None);
}

#[test]
fn corrupt_store_file_degrades_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, "garbage").unwrap();

    let services = services_at(&path);
    assert_eq!(services.session.role(), None);
    assert!(services.users.list().is_empty());

    services.session.set_role(Some(Role::Cliente));
    assert_eq!(services.session.role(), Some(Role::Cliente));
}
