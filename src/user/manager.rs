use chrono::Utc;
use rand::Rng;

use crate::database::Database;
use crate::error::Error;
use crate::utils::require_non_blank;

use super::password::{hash_password, verify_password};
use super::{User, UserId};

const TOKEN_BYTES: usize = 32;
const MIN_PASSWORD_LENGTH: usize = 8;

#[tracing::instrument(skip(db, password))]
pub async fn create_user(
    db: &dyn Database,
    username: String,
    password: String,
) -> Result<User, Error> {
    let username = require_non_blank("username", username)?;
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::InvalidField {
            field: "password",
            reason: "must be at least 8 characters",
        });
    }

    let now = Utc::now();
    let user = User {
        id: UserId::new(),
        username,
        password_hash: hash_password(&password)?,
        token: generate_token(),
        is_active: true,
        created_at: now,
        modified_at: now,
    };

    db.users().insert_user(&user).await?;

    Ok(user)
}

#[tracing::instrument(skip(db))]
pub async fn expect_user_by_id(db: &dyn Database, user_id: UserId) -> Result<User, Error> {
    let user = db
        .users()
        .fetch_user_by_id(user_id)
        .await?
        .ok_or(Error::UserNotFound { user_id })?;

    Ok(user)
}

/// Exchanges a username and password for the user, whose token is then
/// handed back to the client. Unknown usernames and wrong passwords are
/// indistinguishable to the caller.
#[tracing::instrument(skip(db, password))]
pub async fn login(db: &dyn Database, username: &str, password: &str) -> Result<User, Error> {
    let user = db
        .users()
        .fetch_user_by_username(username.trim())
        .await?
        .ok_or(Error::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash)? {
        return Err(Error::InvalidCredentials);
    }

    if !user.is_active {
        return Err(Error::InactiveUser { user_id: user.id });
    }

    Ok(user)
}

/// Resolves a bearer token to the active user it was issued to.
#[tracing::instrument(skip(db, token))]
pub async fn authenticate(db: &dyn Database, token: &str) -> Result<User, Error> {
    let user = db
        .users()
        .fetch_user_by_token(token)
        .await?
        .ok_or(Error::InvalidCredentials)?;

    if !user.is_active {
        return Err(Error::InactiveUser { user_id: user.id });
    }

    Ok(user)
}

fn generate_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test::MockDatabase;
    use std::sync::{Arc, Mutex};

    fn test_user(is_active: bool) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            username: "rosa".to_string(),
            password_hash: hash_password("correct horse").unwrap(),
            token: "abc123".to_string(),
            is_active,
            created_at: now,
            modified_at: now,
        }
    }

    #[tokio::test]
    async fn can_create_user() {
        let mut db = MockDatabase::new();
        let called_insert = Arc::new(Mutex::new(false));
        let called_insert_clone = Arc::clone(&called_insert);
        db.users.on_insert_user = Box::new(move |user| {
            *called_insert_clone.lock().unwrap() = true;
            assert_eq!(user.username, "rosa".to_string());
            assert!(user.is_active);
            Ok(())
        });

        let user = create_user(&db, "  rosa ".into(), "correct horse".into())
            .await
            .unwrap();

        assert_eq!(user.username, "rosa".to_string());
        assert_eq!(user.token.len(), TOKEN_BYTES * 2);
        assert_ne!(user.password_hash, "correct horse".to_string());
        assert!(verify_password("correct horse", &user.password_hash).unwrap());
        assert!(
            *called_insert.lock().unwrap(),
            "db.insert_user was not called"
        );
    }

    #[tokio::test]
    async fn create_user_rejects_blank_username() {
        let db = MockDatabase::new();

        let result = create_user(&db, "   ".into(), "correct horse".into()).await;

        assert_eq!(
            result.unwrap_err(),
            Error::InvalidField {
                field: "username",
                reason: "must not be empty",
            }
        );
    }

    #[tokio::test]
    async fn create_user_rejects_short_password() {
        let db = MockDatabase::new();

        let result = create_user(&db, "rosa".into(), "hunter2".into()).await;

        assert_eq!(
            result.unwrap_err(),
            Error::InvalidField {
                field: "password",
                reason: "must be at least 8 characters",
            }
        );
    }

    #[tokio::test]
    async fn tokens_are_unique_per_user() {
        assert_ne!(generate_token(), generate_token());
    }

    #[tokio::test]
    async fn login_returns_user_for_correct_password() {
        let mut db = MockDatabase::new();
        let user = test_user(true);
        let user_clone = user.clone();
        db.users.on_fetch_user_by_username = Box::new(move |username| {
            assert_eq!(username, "rosa");
            Ok(Some(user_clone.clone()))
        });

        let logged_in = login(&db, " rosa ", "correct horse").await.unwrap();

        assert_eq!(logged_in.id, user.id);
        assert_eq!(logged_in.token, "abc123".to_string());
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let mut db = MockDatabase::new();
        let user = test_user(true);
        db.users.on_fetch_user_by_username = Box::new(move |_| Ok(Some(user.clone())));

        let result = login(&db, "rosa", "battery staple").await;

        assert_eq!(result.unwrap_err(), Error::InvalidCredentials);
    }

    #[tokio::test]
    async fn login_rejects_unknown_username() {
        let mut db = MockDatabase::new();
        db.users.on_fetch_user_by_username = Box::new(|_| Ok(None));

        let result = login(&db, "nobody", "correct horse").await;

        assert_eq!(result.unwrap_err(), Error::InvalidCredentials);
    }

    #[tokio::test]
    async fn login_rejects_inactive_user() {
        let mut db = MockDatabase::new();
        let user = test_user(false);
        let user_id = user.id;
        db.users.on_fetch_user_by_username = Box::new(move |_| Ok(Some(user.clone())));

        let result = login(&db, "rosa", "correct horse").await;

        assert_eq!(result.unwrap_err(), Error::InactiveUser { user_id });
    }

    #[tokio::test]
    async fn authenticate_returns_active_user() {
        let mut db = MockDatabase::new();
        let user = test_user(true);
        let user_clone = user.clone();
        db.users.on_fetch_user_by_token = Box::new(move |token| {
            assert_eq!(token, "abc123");
            Ok(Some(user_clone.clone()))
        });

        let authenticated = authenticate(&db, "abc123").await.unwrap();

        assert_eq!(authenticated.id, user.id);
    }

    #[tokio::test]
    async fn authenticate_rejects_unknown_token() {
        let mut db = MockDatabase::new();
        db.users.on_fetch_user_by_token = Box::new(|_| Ok(None));

        let result = authenticate(&db, "nope").await;

        assert_eq!(result.unwrap_err(), Error::InvalidCredentials);
    }

    #[tokio::test]
    async fn authenticate_rejects_inactive_user() {
        let mut db = MockDatabase::new();
        let user = test_user(false);
        let user_id = user.id;
        db.users.on_fetch_user_by_token = Box::new(move |_| Ok(Some(user.clone())));

        let result = authenticate(&db, "abc123").await;

        assert_eq!(result.unwrap_err(), Error::InactiveUser { user_id });
    }

    #[tokio::test]
    async fn expect_user_by_id_returns_error_if_doesnt_exist() {
        let mut db = MockDatabase::new();
        let test_user_id = UserId::new();
        db.users.on_fetch_user_by_id = Box::new(move |user_id| {
            assert_eq!(user_id, test_user_id);
            Ok(None)
        });

        let result = expect_user_by_id(&db, test_user_id).await;

        assert_eq!(
            result.unwrap_err(),
            Error::UserNotFound {
                user_id: test_user_id
            }
        );
    }
}
