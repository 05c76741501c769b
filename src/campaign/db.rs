use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{bson, Database};

use crate::database::{paged, returning_modified, MongoCampaignStore};
use crate::error::Error;
use crate::user::UserId;
use crate::utils::Page;

use super::{Campaign, CampaignChanges, CampaignId, CampaignState};

const CAMPAIGNS: &str = "campaigns";

pub async fn initialize(db: &Database) -> Result<(), Error> {
    db.run_command(
        bson::doc! {
            "createIndexes": CAMPAIGNS,
            "indexes": [
                { "key": { "title": 1 }, "name": "by_title", "unique": true },
                { "key": { "owner_id": 1, "created_at": 1 }, "name": "by_owner_id" },
                { "key": { "created_at": 1 }, "name": "by_created_at" }
            ]
        },
        None,
    )
    .await?;

    Ok(())
}

#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error>;

    async fn fetch_campaigns(&self, page: Page) -> Result<Vec<Campaign>, Error>;

    async fn fetch_campaigns_by_owner(
        &self,
        owner_id: UserId,
        page: Page,
    ) -> Result<Vec<Campaign>, Error>;

    async fn fetch_campaign_by_id(&self, campaign_id: CampaignId)
        -> Result<Option<Campaign>, Error>;

    /// Returns the modified campaign, or `None` if it no longer exists.
    async fn update_campaign(
        &self,
        campaign_id: CampaignId,
        changes: &CampaignChanges,
        modified_at: DateTime<Utc>,
    ) -> Result<Option<Campaign>, Error>;

    /// Returns the modified campaign, or `None` if it no longer exists.
    async fn update_campaign_state(
        &self,
        campaign_id: CampaignId,
        state: CampaignState,
        modified_at: DateTime<Utc>,
    ) -> Result<Option<Campaign>, Error>;

    async fn delete_campaign(&self, campaign_id: CampaignId) -> Result<(), Error>;
}

#[async_trait]
impl CampaignStore for MongoCampaignStore {
    #[tracing::instrument(skip(self))]
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error> {
        self.insert_one(campaign, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaigns(&self, page: Page) -> Result<Vec<Campaign>, Error> {
        let campaigns: Vec<Campaign> = self
            .find(bson::doc! {}, paged(page))
            .await?
            .try_collect()
            .await?;

        Ok(campaigns)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaigns_by_owner(
        &self,
        owner_id: UserId,
        page: Page,
    ) -> Result<Vec<Campaign>, Error> {
        let campaigns: Vec<Campaign> = self
            .find(bson::doc! { "owner_id": owner_id }, paged(page))
            .await?
            .try_collect()
            .await?;

        Ok(campaigns)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error> {
        let campaign = self
            .find_one(bson::doc! { "_id": campaign_id }, None)
            .await?;

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn update_campaign(
        &self,
        campaign_id: CampaignId,
        changes: &CampaignChanges,
        modified_at: DateTime<Utc>,
    ) -> Result<Option<Campaign>, Error> {
        let mut set = bson::doc! { "modified_at": bson::DateTime::from_chrono(modified_at) };
        if let Some(title) = &changes.title {
            set.insert("title", title.as_str());
        }
        if let Some(description) = &changes.description {
            set.insert("description", description.as_str());
        }
        if let Some(goal) = changes.goal {
            set.insert("goal", goal);
        }

        let campaign = self
            .find_one_and_update(
                bson::doc! { "_id": campaign_id },
                bson::doc! { "$set": set },
                returning_modified(),
            )
            .await?;

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn update_campaign_state(
        &self,
        campaign_id: CampaignId,
        state: CampaignState,
        modified_at: DateTime<Utc>,
    ) -> Result<Option<Campaign>, Error> {
        let new_state = bson::to_bson(&state)?;
        let new_modified_at = bson::DateTime::from_chrono(modified_at);

        let campaign = self
            .find_one_and_update(
                bson::doc! { "_id": campaign_id },
                bson::doc! { "$set": { "state": new_state, "modified_at": new_modified_at } },
                returning_modified(),
            )
            .await?;

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_campaign(&self, campaign_id: CampaignId) -> Result<(), Error> {
        self.delete_one(bson::doc! { "_id": campaign_id }, None)
            .await?;

        Ok(())
    }
}
