use async_trait::async_trait;
use mongodb::{bson, Database};

use crate::database::MongoUserStore;
use crate::error::Error;

use super::{User, UserId};

const USERS: &str = "users";

pub async fn initialize(db: &Database) -> Result<(), Error> {
    db.run_command(
        bson::doc! {
            "createIndexes": USERS,
            "indexes": [
                { "key": { "username": 1 }, "name": "by_username", "unique": true },
                { "key": { "token": 1 }, "name": "by_token", "unique": true }
            ]
        },
        None,
    )
    .await?;

    Ok(())
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: &User) -> Result<(), Error>;

    async fn fetch_user_by_id(&self, user_id: UserId) -> Result<Option<User>, Error>;

    async fn fetch_user_by_username(&self, username: &str) -> Result<Option<User>, Error>;

    async fn fetch_user_by_token(&self, token: &str) -> Result<Option<User>, Error>;
}

#[async_trait]
impl UserStore for MongoUserStore {
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    async fn insert_user(&self, user: &User) -> Result<(), Error> {
        self.insert_one(user, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_user_by_id(&self, user_id: UserId) -> Result<Option<User>, Error> {
        let user = self.find_one(bson::doc! { "_id": user_id }, None).await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_user_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        let user = self
            .find_one(bson::doc! { "username": username }, None)
            .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self, token))]
    async fn fetch_user_by_token(&self, token: &str) -> Result<Option<User>, Error> {
        let user = self.find_one(bson::doc! { "token": token }, None).await?;

        Ok(user)
    }
}
