//! Login, logout and self-only access built from the User and Token resources.

mod common;

use common::{credentials, sessions, user};
use qbe_rest::session::{token_admin_resource, user_resource, Token, User};
use qbe_rest::{AppError, RequestContext};
use serde_json::json;

#[tokio::test]
async fn login_issues_a_token_for_the_matching_user() {
    let sessions = sessions().await;
    sessions.users().create(user(1, "joe", "x")).await.unwrap();

    let token_id = sessions.login(credentials("joe", "x")).await.unwrap();
    let token = sessions
        .tokens()
        .get_first(Token {
            id: Some(token_id),
            user_id: None,
        })
        .await
        .unwrap();
    assert_eq!(token.user_id, Some(1));
}

#[tokio::test]
async fn bad_credentials_are_all_access_denied() {
    let sessions = sessions().await;
    sessions.users().create(user(1, "joe", "x")).await.unwrap();

    for attempt in [
        credentials("joe", "wrong"),
        credentials("nobody", "x"),
        credentials("joe", ""),
        User::default(),
    ] {
        let err = sessions.login(attempt).await.unwrap_err();
        assert!(matches!(err, AppError::AccessDenied));
    }
    assert!(sessions.tokens().get(Token::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn logout_deletes_the_token_once() {
    let sessions = sessions().await;
    sessions.users().create(user(1, "joe", "x")).await.unwrap();
    let token_id = sessions.login(credentials("joe", "x")).await.unwrap();
    let ctx = RequestContext::with_token(&token_id.to_string());

    sessions.logout(&ctx).await.unwrap();
    assert!(matches!(sessions.logout(&ctx).await, Err(AppError::AccessDenied)));
    assert!(matches!(
        sessions.logout(&RequestContext::with_token("not-a-number")).await,
        Err(AppError::AccessDenied)
    ));
}

#[tokio::test]
async fn get_returns_only_the_callers_row_without_password() {
    let sessions = sessions().await;
    sessions.users().create(user(1, "joe", "x")).await.unwrap();
    sessions.users().create(user(2, "ann", "y")).await.unwrap();
    let token_id = sessions.login(credentials("joe", "x")).await.unwrap();
    let rest = user_resource(sessions);

    let err = rest.get(&RequestContext::default(), User::default()).await.unwrap_err();
    assert!(matches!(err, AppError::AccessDenied));

    let ctx = RequestContext::with_token(&token_id.to_string());
    let someone_else = User {
        id: Some(2),
        name: Some("ann".into()),
        password: None,
    };
    let value = rest.get(&ctx, someone_else).await.unwrap();
    assert_eq!(value, json!([{ "ID": 1, "Name": "joe" }]));
}

#[tokio::test]
async fn update_is_limited_to_the_caller_and_cannot_change_identity() {
    let sessions = sessions().await;
    sessions.users().create(user(1, "joe", "x")).await.unwrap();
    sessions.users().create(user(2, "ann", "y")).await.unwrap();
    let token_id = sessions.login(credentials("joe", "x")).await.unwrap();
    let users = sessions.users().clone();
    let rest = user_resource(sessions);
    let ctx = RequestContext::with_token(&token_id.to_string());

    let target_ann = User {
        id: Some(2),
        ..Default::default()
    };
    let patch = User {
        id: Some(99),
        name: Some("joseph".into()),
        password: None,
    };
    rest.update(&ctx, target_ann, patch).await.unwrap();

    let mut rows = users.get(User::default()).await.unwrap();
    rows.sort_by_key(|u| u.id);
    assert_eq!(rows, vec![user(1, "joseph", "x"), user(2, "ann", "y")]);

    let denied = rest
        .update(&RequestContext::with_token("12345"), User::default(), User::default())
        .await;
    assert!(matches!(denied, Err(AppError::AccessDenied)));
}

#[tokio::test]
async fn delete_removes_only_the_caller() {
    let sessions = sessions().await;
    sessions.users().create(user(1, "joe", "x")).await.unwrap();
    sessions.users().create(user(2, "ann", "y")).await.unwrap();
    let token_id = sessions.login(credentials("joe", "x")).await.unwrap();
    let users = sessions.users().clone();
    let rest = user_resource(sessions);

    assert!(matches!(
        rest.delete(&RequestContext::default(), User::default()).await,
        Err(AppError::AccessDenied)
    ));
    assert_eq!(users.get(User::default()).await.unwrap().len(), 2);

    let ctx = RequestContext::with_token(&token_id.to_string());
    rest.delete(&ctx, User::default()).await.unwrap();
    assert_eq!(users.get(User::default()).await.unwrap(), vec![user(2, "ann", "y")]);
}

#[tokio::test]
async fn create_validates_and_assigns_identity() {
    let sessions = sessions().await;
    let users = sessions.users().clone();
    let rest = user_resource(sessions);
    let ctx = RequestContext::default();

    let missing_password = User {
        id: None,
        name: Some("joe".into()),
        password: None,
    };
    assert!(matches!(
        rest.create(&ctx, missing_password).await,
        Err(AppError::Validation(_))
    ));
    assert!(users.get(User::default()).await.unwrap().is_empty());

    rest.create(&ctx, user(1, "joe", "x")).await.unwrap();
    let created = users.get_first(User::default()).await.unwrap();
    assert_eq!(created.name.as_deref(), Some("joe"));
    assert_ne!(created.id, Some(1));
    assert!(created.id.is_some());
}

#[tokio::test]
async fn login_and_logout_run_as_named_operations() {
    let sessions = sessions().await;
    sessions.users().create(user(1, "joe", "x")).await.unwrap();
    let tokens = sessions.tokens().clone();
    let rest = user_resource(sessions);

    let value = rest
        .call("login", &RequestContext::default(), credentials("joe", "x"))
        .await
        .unwrap();
    let token_id = value["Token"].as_i64().expect("token id");

    let ctx = RequestContext::with_token(&token_id.to_string());
    assert_eq!(rest.call("logout", &ctx, User::default()).await.unwrap(), json!(null));
    assert!(tokens.get(Token::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn admin_tokens_are_read_only_and_scoped_to_the_caller() {
    let sessions = sessions().await;
    sessions.users().create(user(1, "joe", "x")).await.unwrap();
    sessions.users().create(user(2, "ann", "y")).await.unwrap();
    let joe_token = sessions.login(credentials("joe", "x")).await.unwrap();
    sessions.login(credentials("ann", "y")).await.unwrap();
    let tokens = sessions.tokens().clone();
    let admin = token_admin_resource(sessions);
    let ctx = RequestContext::with_token(&joe_token.to_string());

    let forged = Token {
        id: Some(7),
        user_id: Some(2),
    };
    assert!(matches!(admin.create(&ctx, forged).await, Err(AppError::AccessDenied)));
    let mine = Token {
        id: Some(joe_token),
        user_id: None,
    };
    let hijack = Token {
        id: None,
        user_id: Some(2),
    };
    assert!(matches!(
        admin.update(&ctx, mine.clone(), hijack).await,
        Err(AppError::AccessDenied)
    ));
    assert!(matches!(admin.delete(&ctx, mine.clone()).await, Err(AppError::AccessDenied)));
    assert_eq!(tokens.get_first(mine).await.unwrap().user_id, Some(1));
    assert_eq!(tokens.get(Token::default()).await.unwrap().len(), 2);

    assert!(matches!(
        admin.get(&RequestContext::default(), Token::default()).await,
        Err(AppError::AccessDenied)
    ));
    let visible = admin.get(&ctx, Token::default()).await.unwrap();
    assert_eq!(visible, json!([{ "ID": joe_token, "UserID": 1 }]));
}

#[tokio::test]
async fn deleting_the_account_ends_its_sessions() {
    let sessions = sessions().await;
    sessions.users().create(user(1, "joe", "x")).await.unwrap();
    sessions.users().create(user(2, "ann", "y")).await.unwrap();
    let first = sessions.login(credentials("joe", "x")).await.unwrap();
    let second = sessions.login(credentials("joe", "x")).await.unwrap();
    let ann = sessions.login(credentials("ann", "y")).await.unwrap();
    let rest = user_resource(sessions.clone());
    let ctx = RequestContext::with_token(&first.to_string());

    rest.delete(&ctx, User::default()).await.unwrap();

    assert!(matches!(sessions.authorize(&ctx).await, Err(AppError::AccessDenied)));
    let other = RequestContext::with_token(&second.to_string());
    assert!(matches!(sessions.authorize(&other).await, Err(AppError::AccessDenied)));
    let still_in = sessions
        .authorize(&RequestContext::with_token(&ann.to_string()))
        .await
        .unwrap();
    assert_eq!(still_in.user_id, Some(2));
    assert_eq!(sessions.users().get(User::default()).await.unwrap(), vec![user(2, "ann", "y")]);
}
