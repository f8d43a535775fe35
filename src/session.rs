//! Login sessions built only from two resource types and hooks.
//!
//! A `Token` row is a session: logging in creates one, logging out deletes it.
//! Callers present the token's ID in the `Token` header. Login looks the user up
//! and then inserts the token as two separate store calls; a crash in between
//! leaves no token and is not rolled back.

use crate::error::AppError;
use crate::extractors::RequestContext;
use crate::hooks::{CustomOperation, GetResponse, Hooks, PreCreate, PreDelete, PreGet, PreUpdate};
use crate::model::Resource;
use crate::rest::RestResource;
use crate::service::{allocate_free_identity, ResourceApi, TimeCandidates, DEFAULT_MAX_ATTEMPTS};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

crate::resource! {
    /// Account with login credentials.
    pub struct User in "User" {
        id: i64 => "ID",
        name: String => "Name",
        password: String => "Password",
    }
}

crate::resource! {
    /// Open session. `user_id` references `User.ID` without a store constraint.
    pub struct Token in "Token" {
        id: i64 => "ID",
        user_id: i64 => "UserID",
    }
}

fn non_empty(s: &Option<String>) -> bool {
    s.as_deref().is_some_and(|s| !s.is_empty())
}

#[derive(Clone)]
pub struct Sessions {
    users: ResourceApi<User>,
    tokens: ResourceApi<Token>,
    max_attempts: u32,
}

impl Sessions {
    pub fn new(users: ResourceApi<User>, tokens: ResourceApi<Token>) -> Self {
        Sessions {
            users,
            tokens,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Bound on identity probes per allocation.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn users(&self) -> &ResourceApi<User> {
        &self.users
    }

    pub fn tokens(&self) -> &ResourceApi<Token> {
        &self.tokens
    }

    /// Wrong name and wrong password are both `AccessDenied`.
    pub async fn login(&self, credentials: User) -> Result<i64, AppError> {
        if !non_empty(&credentials.name) || !non_empty(&credentials.password) {
            return Err(AppError::AccessDenied);
        }
        let example = User {
            id: None,
            name: credentials.name,
            password: credentials.password,
        };
        let user = match self.users.get_first(example).await {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => return Err(AppError::AccessDenied),
            Err(e) => return Err(e),
        };
        let user_id = user.id.ok_or(AppError::AccessDenied)?;
        let token_id = allocate_free_identity(&self.tokens, &mut TimeCandidates::default(), self.max_attempts).await?;
        self.tokens
            .create(Token {
                id: Some(token_id),
                user_id: Some(user_id),
            })
            .await?;
        tracing::info!(user_id, "login");
        Ok(token_id)
    }

    /// Delete the caller's token. Unknown or malformed tokens are `AccessDenied`.
    pub async fn logout(&self, ctx: &RequestContext) -> Result<(), AppError> {
        let token = self.authorize(ctx).await?;
        self.tokens
            .delete(Token {
                id: token.id,
                user_id: None,
            })
            .await?;
        tracing::info!(user_id = ?token.user_id, "logout");
        Ok(())
    }

    /// Resolve the bearer credential to its token. Fails closed.
    pub async fn authorize(&self, ctx: &RequestContext) -> Result<Token, AppError> {
        let token_id: i64 = ctx
            .bearer_token()
            .and_then(|s| s.parse().ok())
            .ok_or(AppError::AccessDenied)?;
        let example = Token {
            id: Some(token_id),
            user_id: None,
        };
        match self.tokens.get_first(example).await {
            Ok(token) if token.user_id.is_some() => Ok(token),
            Ok(_) | Err(AppError::NotFound(_)) => Err(AppError::AccessDenied),
            Err(e) => {
                tracing::warn!(error = %e, "token lookup failed");
                Err(AppError::AccessDenied)
            }
        }
    }

    /// The example the caller may act on: their own user ID and nothing else.
    async fn narrow_to_caller(&self, ctx: &RequestContext, example: &mut User) -> Result<(), AppError> {
        let token = self.authorize(ctx).await?;
        *example = User {
            id: token.user_id,
            name: None,
            password: None,
        };
        Ok(())
    }
}

/// Name and Password are required; the identity is always chosen here, never by the caller.
#[derive(Clone)]
pub struct UserCreatePolicy {
    sessions: Sessions,
}

#[async_trait]
impl PreCreate<User> for UserCreatePolicy {
    async fn pre_create(&self, _ctx: &RequestContext, user: &mut User) -> Result<(), AppError> {
        if !non_empty(&user.name) {
            return Err(AppError::Validation("invalid name".into()));
        }
        if !non_empty(&user.password) {
            return Err(AppError::Validation("invalid password".into()));
        }
        let id = allocate_free_identity(
            &self.sessions.users,
            &mut TimeCandidates::default(),
            self.sessions.max_attempts,
        )
        .await?;
        user.id = Some(id);
        Ok(())
    }
}

/// Signed-in callers may read, change and delete only their own user row.
#[derive(Clone)]
pub struct UserAccess {
    sessions: Sessions,
}

#[async_trait]
impl PreGet<User> for UserAccess {
    async fn pre_get(&self, ctx: &RequestContext, example: &mut User) -> Result<(), AppError> {
        self.sessions.narrow_to_caller(ctx, example).await
    }
}

/// Deleting an account also ends every session it holds. The token delete runs
/// first; if the user delete then fails the caller is only logged out.
#[async_trait]
impl PreDelete<User> for UserAccess {
    async fn pre_delete(&self, ctx: &RequestContext, example: &mut User) -> Result<(), AppError> {
        self.sessions.narrow_to_caller(ctx, example).await?;
        let ended = self
            .sessions
            .tokens
            .delete(Token {
                id: None,
                user_id: example.id,
            })
            .await?;
        tracing::info!(user_id = ?example.id, sessions = ended, "account deleted");
        Ok(())
    }
}

#[async_trait]
impl PreUpdate<User> for UserAccess {
    async fn pre_update(&self, ctx: &RequestContext, find: &mut User, patch: &mut User) -> Result<(), AppError> {
        self.sessions.narrow_to_caller(ctx, find).await?;
        patch.id = None;
        Ok(())
    }
}

#[derive(Serialize)]
struct PublicUser {
    #[serde(rename = "ID")]
    id: Option<i64>,
    #[serde(rename = "Name")]
    name: Option<String>,
}

/// Users go out without a Password key at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct RedactPassword;

#[async_trait]
impl GetResponse<User> for RedactPassword {
    async fn get_response(&self, _ctx: &RequestContext, users: Vec<User>) -> Result<Value, AppError> {
        let public: Vec<PublicUser> = users
            .into_iter()
            .map(|u| PublicUser { id: u.id, name: u.name })
            .collect();
        Ok(serde_json::to_value(public)?)
    }
}

pub struct Login {
    sessions: Sessions,
}

#[async_trait]
impl CustomOperation<User> for Login {
    async fn call(&self, _ctx: &RequestContext, credentials: User) -> Result<Value, AppError> {
        let token = self.sessions.login(credentials).await?;
        Ok(json!({ "Token": token }))
    }
}

pub struct Logout {
    sessions: Sessions,
}

#[async_trait]
impl CustomOperation<User> for Logout {
    async fn call(&self, ctx: &RequestContext, _record: User) -> Result<Value, AppError> {
        self.sessions.logout(ctx).await?;
        Ok(Value::Null)
    }
}

/// Rejects every write.
#[derive(Clone, Copy, Debug, Default)]
pub struct DenyWrites;

#[async_trait]
impl<R: Resource> PreCreate<R> for DenyWrites {
    async fn pre_create(&self, _ctx: &RequestContext, _record: &mut R) -> Result<(), AppError> {
        Err(AppError::AccessDenied)
    }
}

#[async_trait]
impl<R: Resource> PreUpdate<R> for DenyWrites {
    async fn pre_update(&self, _ctx: &RequestContext, _find: &mut R, _patch: &mut R) -> Result<(), AppError> {
        Err(AppError::AccessDenied)
    }
}

#[async_trait]
impl<R: Resource> PreDelete<R> for DenyWrites {
    async fn pre_delete(&self, _ctx: &RequestContext, _example: &mut R) -> Result<(), AppError> {
        Err(AppError::AccessDenied)
    }
}

/// Signed-in callers see only the sessions of their own account.
#[derive(Clone)]
pub struct OwnTokens {
    sessions: Sessions,
}

#[async_trait]
impl PreGet<Token> for OwnTokens {
    async fn pre_get(&self, ctx: &RequestContext, example: &mut Token) -> Result<(), AppError> {
        let token = self.sessions.authorize(ctx).await?;
        *example = Token {
            id: None,
            user_id: token.user_id,
        };
        Ok(())
    }
}

/// The user resource with its policy hooks and `login` / `logout` operations.
pub fn user_resource(sessions: Sessions) -> RestResource<User> {
    let access = UserAccess {
        sessions: sessions.clone(),
    };
    let hooks = Hooks::<User>::default()
        .with_pre_create(UserCreatePolicy {
            sessions: sessions.clone(),
        })
        .with_pre_get(access.clone())
        .with_pre_update(access.clone())
        .with_pre_delete(access)
        .with_get_response(RedactPassword);
    RestResource::new(sessions.users.clone())
        .with_hooks(hooks)
        .with_operation(
            "login",
            Login {
                sessions: sessions.clone(),
            },
        )
        .with_operation("logout", Logout { sessions })
}

/// Session view of tokens: the caller's own sessions, read-only.
pub fn token_admin_resource(sessions: Sessions) -> RestResource<Token> {
    let hooks = Hooks::<Token>::default()
        .with_pre_create(DenyWrites)
        .with_pre_update(DenyWrites)
        .with_pre_delete(DenyWrites)
        .with_pre_get(OwnTokens {
            sessions: sessions.clone(),
        });
    RestResource::new(sessions.tokens.clone()).with_hooks(hooks)
}
