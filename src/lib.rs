//! Query-by-example REST resources: generic CRUD over a relational store, with per-operation hooks.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod hooks;
pub mod model;
pub mod response;
pub mod rest;
pub mod routes;
pub mod service;
pub mod session;
pub mod sql;
pub mod state;
pub mod store;

pub use config::ServerConfig;
pub use error::{AppError, ConfigError, RegistryError, StoreError};
pub use extractors::{RequestContext, TOKEN_HEADER};
pub use hooks::{CustomOperation, GetResponse, Hooks, PassThrough, PreCreate, PreDelete, PreGet, PreUpdate};
pub use model::{FieldDescriptor, FieldKind, FieldType, FieldValue, Registry, Resource, TypeHandle};
pub use rest::RestResource;
pub use routes::{common_routes_with_ready, resource_routes};
pub use service::{allocate_free_identity, ResourceApi, TimeCandidates};
pub use sql::Dialect;
pub use state::AppState;
pub use store::{connect, ensure_tables, PgStore, SqliteStore, Store};
