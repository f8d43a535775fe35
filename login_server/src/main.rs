//! Login demo server: `/user` with login, logout and self-service CRUD, `/admin` over tokens.
//!
//! Run from repo root: `cargo run -p login-server`

use qbe_rest::{
    common_routes_with_ready, connect, ensure_tables, resource_routes,
    session::{token_admin_resource, user_resource, Sessions, Token, User},
    AppState, Registry, ResourceApi, ServerConfig,
};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("qbe_rest=info,login_server=info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let store = connect(&config.database_url, config.max_connections).await?;

    let mut registry = Registry::new(store.dialect());
    let user_type = registry.register_resource::<User>()?;
    let token_type = registry.register_resource::<Token>()?;
    ensure_tables(store.as_ref(), registry.handles()).await?;

    let users = ResourceApi::<User>::new(user_type, store.clone())?;
    let tokens = ResourceApi::<Token>::new(token_type, store.clone())?;
    let sessions = Sessions::new(users, tokens).with_max_attempts(config.identity_max_attempts);

    let user = user_resource(sessions.clone());
    let operations: Vec<&str> = user.operation_names().collect();
    tracing::info!(?operations, "mounted /user");

    let app = Router::new()
        .merge(common_routes_with_ready(AppState { store }))
        .nest("/user", resource_routes(Arc::new(user)))
        .nest("/admin", resource_routes(Arc::new(token_admin_resource(sessions))));

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
