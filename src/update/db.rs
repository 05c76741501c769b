use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{bson, Database};

use crate::campaign::CampaignId;
use crate::database::{paged, returning_modified, MongoUpdateStore};
use crate::error::Error;
use crate::utils::Page;

use super::{Update, UpdateChanges, UpdateId};

const UPDATES: &str = "updates";

pub async fn initialize(db: &Database) -> Result<(), Error> {
    db.run_command(
        bson::doc! {
            "createIndexes": UPDATES,
            "indexes": [
                {
                    "key": { "campaign_id": 1, "title": 1 },
                    "name": "by_campaign_id_and_title",
                    "unique": true
                },
                { "key": { "campaign_id": 1, "created_at": 1 }, "name": "by_campaign_id" }
            ]
        },
        None,
    )
    .await?;

    Ok(())
}

#[async_trait]
pub trait UpdateStore: Send + Sync {
    async fn insert_update(&self, update: &Update) -> Result<(), Error>;

    async fn fetch_updates_by_campaign(
        &self,
        campaign_id: CampaignId,
        page: Page,
    ) -> Result<Vec<Update>, Error>;

    async fn fetch_update_by_id(&self, update_id: UpdateId) -> Result<Option<Update>, Error>;

    /// Returns the modified update, or `None` if it no longer exists.
    async fn update_update(
        &self,
        update_id: UpdateId,
        changes: &UpdateChanges,
        modified_at: DateTime<Utc>,
    ) -> Result<Option<Update>, Error>;

    async fn delete_update(&self, update_id: UpdateId) -> Result<(), Error>;

    async fn delete_updates_by_campaign(&self, campaign_id: CampaignId) -> Result<(), Error>;
}

#[async_trait]
impl UpdateStore for MongoUpdateStore {
    #[tracing::instrument(skip(self))]
    async fn insert_update(&self, update: &Update) -> Result<(), Error> {
        self.insert_one(update, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_updates_by_campaign(
        &self,
        campaign_id: CampaignId,
        page: Page,
    ) -> Result<Vec<Update>, Error> {
        let updates: Vec<Update> = self
            .find(bson::doc! { "campaign_id": campaign_id }, paged(page))
            .await?
            .try_collect()
            .await?;

        Ok(updates)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_update_by_id(&self, update_id: UpdateId) -> Result<Option<Update>, Error> {
        let update = self.find_one(bson::doc! { "_id": update_id }, None).await?;

        Ok(update)
    }

    #[tracing::instrument(skip(self))]
    async fn update_update(
        &self,
        update_id: UpdateId,
        changes: &UpdateChanges,
        modified_at: DateTime<Utc>,
    ) -> Result<Option<Update>, Error> {
        let mut set = bson::doc! { "modified_at": bson::DateTime::from_chrono(modified_at) };
        if let Some(title) = &changes.title {
            set.insert("title", title.as_str());
        }
        if let Some(content) = &changes.content {
            set.insert("content", content.as_str());
        }

        let update = self
            .find_one_and_update(
                bson::doc! { "_id": update_id },
                bson::doc! { "$set": set },
                returning_modified(),
            )
            .await?;

        Ok(update)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_update(&self, update_id: UpdateId) -> Result<(), Error> {
        self.delete_one(bson::doc! { "_id": update_id }, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_updates_by_campaign(&self, campaign_id: CampaignId) -> Result<(), Error> {
        self.delete_many(bson::doc! { "campaign_id": campaign_id }, None)
            .await?;

        Ok(())
    }
}
