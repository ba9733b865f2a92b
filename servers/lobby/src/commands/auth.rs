use gamecore_common::hashing;
use serde_json::{json, Value};

use super::require_str;
use crate::error::LobbyError;
use crate::session::{ConnState, LobbyContext};
use crate::state::RegisterSession;

pub async fn register(ctx: &LobbyContext, request: &Value) -> Result<Value, LobbyError> {
    let username = require_str(request, "username")?;
    let password = require_str(request, "password")?;

    let hash = hashing::hash_password(password);
    let user = ctx.ds.create_user(username, &hash).await?;
    Ok(json!({ "userId": user.id, "username": user.name }))
}

pub async fn login(ctx: &LobbyContext, conn: &mut ConnState, request: &Value) -> Result<Value, LobbyError> {
    let username = require_str(request, "username")?;
    let password = require_str(request, "password")?;

    let user = ctx
        .ds
        .find_user_by_name(username)
        .await?
        .ok_or(LobbyError::InvalidCredentials)?;

    if !hashing::verify_password(password, &user.password_hash) {
        return Err(LobbyError::InvalidCredentials);
    }
    if user.online == 1 {
        return Err(LobbyError::AlreadyLoggedIn);
    }

    ctx.actor
        .send(RegisterSession {
            user_id: user.id,
            conn_id: conn.conn_id,
        })
        .await
        .map_err(|_| LobbyError::DataStore("lobby actor unavailable".to_string()))??;

    let now = gamecore_common::time::now_iso8601();
    ctx.ds.set_user_online(user.id, 1, Some(&now)).await?;

    conn.user_id = Some(user.id);
    conn.username = Some(user.name.clone());

    Ok(json!({ "userId": user.id, "username": user.name }))
}

pub async fn logout(ctx: &LobbyContext, conn: &mut ConnState) -> Result<Value, LobbyError> {
    let user_id = super::require_authenticated(conn)?;

    ctx.actor
        .send(crate::state::MarkOffline { conn_id: conn.conn_id })
        .await
        .map_err(|_| LobbyError::DataStore("lobby actor unavailable".to_string()))?;
    ctx.ds.set_user_online(user_id, 0, None).await?;

    conn.user_id = None;
    conn.username = None;

    Ok(json!({}))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn test_register_then_login() {
        let (ds, _dir) = test_support::spawn_ds().await;
        let ctx = test_support::context(ds);

        let registered = register(&ctx, &json!({"username": "alice", "password": "hunter2"}))
            .await
            .unwrap();
        assert_eq!(registered["username"], "alice");

        let mut conn = test_support::conn();
        let logged_in = login(&ctx, &mut conn, &json!({"username": "alice", "password": "hunter2"}))
            .await
            .unwrap();
        assert_eq!(logged_in["username"], "alice");
        assert_eq!(conn.user_id, Some(registered["userId"].as_u64().unwrap() as gamecore_protocol::entities::Id));
    }

    #[tokio::test]
    async fn test_login_wrong_password_rejected() {
        let (ds, _dir) = test_support::spawn_ds().await;
        let ctx = test_support::context(ds);

        register(&ctx, &json!({"username": "bob", "password": "correct"})).await.unwrap();

        let mut conn = test_support::conn();
        let err = login(&ctx, &mut conn, &json!({"username": "bob", "password": "wrong"})).await;
        assert!(matches!(err, Err(LobbyError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_duplicate_login_rejected() {
        let (ds, _dir) = test_support::spawn_ds().await;
        let ctx = test_support::context(ds);

        register(&ctx, &json!({"username": "carol", "password": "pw"})).await.unwrap();

        let mut first = test_support::conn();
        login(&ctx, &mut first, &json!({"username": "carol", "password": "pw"})).await.unwrap();

        let mut second = test_support::conn();
        let err = login(&ctx, &mut second, &json!({"username": "carol", "password": "pw"})).await;
        assert!(matches!(err, Err(LobbyError::AlreadyLoggedIn)));
    }

    #[tokio::test]
    async fn test_logout_allows_relogin() {
        let (ds, _dir) = test_support::spawn_ds().await;
        let ctx = test_support::context(ds);

        register(&ctx, &json!({"username": "dave", "password": "pw"})).await.unwrap();

        let mut conn = test_support::conn();
        login(&ctx, &mut conn, &json!({"username": "dave", "password": "pw"})).await.unwrap();
        logout(&ctx, &mut conn).await.unwrap();
        assert!(conn.user_id.is_none());

        let mut again = test_support::conn();
        login(&ctx, &mut again, &json!({"username": "dave", "password": "pw"})).await.unwrap();
    }
}
