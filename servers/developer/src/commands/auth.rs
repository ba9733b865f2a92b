use gamecore_common::hashing;
use serde_json::{json, Value};

use super::require_str;
use crate::error::DeveloperError;
use crate::session::DevContext;

pub async fn dev_register(ctx: &DevContext, request: &Value) -> Result<Value, DeveloperError> {
    let username = require_str(request, "username")?;
    let password = require_str(request, "password")?;

    let hash = hashing::hash_password(password);
    let developer = ctx.ds.create_developer(username, &hash).await?;
    Ok(json!({ "devId": developer.id, "username": developer.name }))
}

pub async fn dev_login(ctx: &DevContext, request: &Value) -> Result<Value, DeveloperError> {
    let username = require_str(request, "username")?;
    let password = require_str(request, "password")?;

    let developer = ctx
        .ds
        .find_developer_by_name(username)
        .await?
        .ok_or(DeveloperError::InvalidCredentials)?;

    if !hashing::verify_password(password, &developer.password_hash) {
        return Err(DeveloperError::InvalidCredentials);
    }

    Ok(json!({ "devId": developer.id, "username": developer.name }))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_support;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_register_then_login() {
        let (ds, _dir) = test_support::spawn_ds().await;
        let ctx = test_support::context(ds, PathBuf::from(std::env::temp_dir()));

        let registered = dev_register(&ctx, &json!({"username": "dev1", "password": "pw"}))
            .await
            .unwrap();
        assert_eq!(registered["username"], "dev1");

        let logged_in = dev_login(&ctx, &json!({"username": "dev1", "password": "pw"}))
            .await
            .unwrap();
        assert_eq!(logged_in["devId"], registered["devId"]);
    }

    #[tokio::test]
    async fn test_login_wrong_password_rejected() {
        let (ds, _dir) = test_support::spawn_ds().await;
        let ctx = test_support::context(ds, PathBuf::from(std::env::temp_dir()));

        dev_register(&ctx, &json!({"username": "dev2", "password": "correct"})).await.unwrap();

        let err = dev_login(&ctx, &json!({"username": "dev2", "password": "wrong"})).await;
        assert!(matches!(err, Err(DeveloperError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_user_rejected() {
        let (ds, _dir) = test_support::spawn_ds().await;
        let ctx = test_support::context(ds, PathBuf::from(std::env::temp_dir()));

        let err = dev_login(&ctx, &json!({"username": "ghost", "password": "pw"})).await;
        assert!(matches!(err, Err(DeveloperError::InvalidCredentials)));
    }
}
