use async_trait::async_trait;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::{bson, Collection};
use tracing::info;

use crate::campaign::db::CampaignStore;
use crate::campaign::{self, Campaign};
use crate::error::Error;
use crate::update::db::UpdateStore;
use crate::update::{self, Update};
use crate::user::db::UserStore;
use crate::user::{self, User};
use crate::utils::Page;

pub mod memory;

pub use memory::MemoryDatabase;

pub type MongoCampaignStore = Collection<Campaign>;
pub type MongoUpdateStore = Collection<Update>;
pub type MongoUserStore = Collection<User>;

/// The persistence layer as seen by the managers. Every manager function
/// receives it explicitly so tests can substitute their own.
#[async_trait]
pub trait Database: Send + Sync {
    fn campaigns(&self) -> &dyn CampaignStore;

    fn updates(&self) -> &dyn UpdateStore;

    fn users(&self) -> &dyn UserStore;

    /// Removes all stored data.
    async fn clear(&self) -> Result<(), Error>;
}

#[derive(Debug, Clone)]
pub struct MongoDatabase {
    campaigns: MongoCampaignStore,
    updates: MongoUpdateStore,
    users: MongoUserStore,
    db: mongodb::Database,
}

impl MongoDatabase {
    pub fn new(db: mongodb::Database) -> MongoDatabase {
        MongoDatabase {
            campaigns: db.collection("campaigns"),
            updates: db.collection("updates"),
            users: db.collection("users"),
            db,
        }
    }

    /// Verifies the connection and ensures every collection has its indexes.
    pub async fn initialize(db: mongodb::Database) -> Result<MongoDatabase, Error> {
        db.run_command(bson::doc! { "ping": 1 }, None).await?;

        campaign::db::initialize(&db).await?;
        update::db::initialize(&db).await?;
        user::db::initialize(&db).await?;
        info!("initialized database: {}", db.name());

        Ok(MongoDatabase::new(db))
    }
}

#[async_trait]
impl Database for MongoDatabase {
    fn campaigns(&self) -> &dyn CampaignStore {
        &self.campaigns
    }

    fn updates(&self) -> &dyn UpdateStore {
        &self.updates
    }

    fn users(&self) -> &dyn UserStore {
        &self.users
    }

    async fn clear(&self) -> Result<(), Error> {
        self.campaigns.delete_many(bson::doc! {}, None).await?;
        self.updates.delete_many(bson::doc! {}, None).await?;
        self.users.delete_many(bson::doc! {}, None).await?;

        Ok(())
    }
}

/// Lists are returned in creation order.
pub(crate) fn paged(page: Page) -> FindOptions {
    FindOptions::builder()
        .sort(bson::doc! { "created_at": 1 })
        .skip(page.offset)
        .limit(i64::from(page.limit))
        .build()
}

pub(crate) fn returning_modified() -> FindOneAndUpdateOptions {
    FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build()
}
