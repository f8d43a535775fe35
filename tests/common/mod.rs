#![allow(dead_code)]

use qbe_rest::session::{Sessions, Token, User};
use qbe_rest::{ensure_tables, Registry, Resource, ResourceApi, SqliteStore, Store};
use std::sync::Arc;

pub async fn memory_store() -> Arc<dyn Store> {
    Arc::new(SqliteStore::in_memory().await.expect("in-memory sqlite"))
}

/// Register `R` on a fresh registry, create its table, and bind it to the store.
pub async fn api_for<R: Resource>(store: &Arc<dyn Store>) -> ResourceApi<R> {
    let mut registry = Registry::new(store.dialect());
    let handle = registry.register_resource::<R>().expect("register");
    ensure_tables(store.as_ref(), registry.handles()).await.expect("create table");
    ResourceApi::new(handle, store.clone()).expect("bind api")
}

pub async fn sessions() -> Sessions {
    let store = memory_store().await;
    let users = api_for::<User>(&store).await;
    let tokens = api_for::<Token>(&store).await;
    Sessions::new(users, tokens)
}

pub fn user(id: i64, name: &str, password: &str) -> User {
    User {
        id: Some(id),
        name: Some(name.into()),
        password: Some(password.into()),
    }
}

pub fn credentials(name: &str, password: &str) -> User {
    User {
        id: None,
        name: Some(name.into()),
        password: Some(password.into()),
    }
}
