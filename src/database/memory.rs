//! A process-local [`Database`] that keeps everything in memory.
//!
//! It enforces the same uniqueness rules as the MongoDB indexes, so it can
//! stand in for the real thing when running locally or in HTTP tests. Data
//! is lost on restart.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::campaign::db::CampaignStore;
use crate::campaign::{Campaign, CampaignChanges, CampaignId, CampaignState};
use crate::error::Error;
use crate::update::db::UpdateStore;
use crate::update::{Update, UpdateChanges, UpdateId};
use crate::user::db::UserStore;
use crate::user::{User, UserId};
use crate::utils::Page;

use super::Database;

#[derive(Debug, Default)]
pub struct MemoryDatabase {
    campaigns: MemoryCampaignStore,
    updates: MemoryUpdateStore,
    users: MemoryUserStore,
}

impl MemoryDatabase {
    pub fn new() -> MemoryDatabase {
        MemoryDatabase::default()
    }
}

#[async_trait]
impl Database for MemoryDatabase {
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
        lock(&self.campaigns.0)?.clear();
        lock(&self.updates.0)?.clear();
        lock(&self.users.0)?.clear();

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryCampaignStore(Mutex<Vec<Campaign>>);

#[async_trait]
impl CampaignStore for MemoryCampaignStore {
    #[tracing::instrument(skip(self))]
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error> {
        let mut campaigns = lock(&self.0)?;
        if campaigns.iter().any(|c| c.title == campaign.title) {
            return Err(Error::ResourceConflict);
        }

        campaigns.push(campaign.clone());

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaigns(&self, page: Page) -> Result<Vec<Campaign>, Error> {
        let campaigns = lock(&self.0)?;

        Ok(page.slice(&campaigns))
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaigns_by_owner(
        &self,
        owner_id: UserId,
        page: Page,
    ) -> Result<Vec<Campaign>, Error> {
        let campaigns: Vec<Campaign> = lock(&self.0)?
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();

        Ok(page.slice(&campaigns))
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error> {
        let campaigns = lock(&self.0)?;

        Ok(campaigns.iter().find(|c| c.id == campaign_id).cloned())
    }

    #[tracing::instrument(skip(self))]
    async fn update_campaign(
        &self,
        campaign_id: CampaignId,
        changes: &CampaignChanges,
        modified_at: DateTime<Utc>,
    ) -> Result<Option<Campaign>, Error> {
        let mut campaigns = lock(&self.0)?;
        if let Some(title) = &changes.title {
            if campaigns
                .iter()
                .any(|c| c.id != campaign_id && &c.title == title)
            {
                return Err(Error::ResourceConflict);
            }
        }

        let campaign = campaigns.iter_mut().find(|c| c.id == campaign_id).map(|c| {
            changes.apply(c);
            c.modified_at = modified_at;
            c.clone()
        });

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn update_campaign_state(
        &self,
        campaign_id: CampaignId,
        state: CampaignState,
        modified_at: DateTime<Utc>,
    ) -> Result<Option<Campaign>, Error> {
        let mut campaigns = lock(&self.0)?;

        let campaign = campaigns.iter_mut().find(|c| c.id == campaign_id).map(|c| {
            c.state = state;
            c.modified_at = modified_at;
            c.clone()
        });

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_campaign(&self, campaign_id: CampaignId) -> Result<(), Error> {
        lock(&self.0)?.retain(|c| c.id != campaign_id);

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryUpdateStore(Mutex<Vec<Update>>);

#[async_trait]
impl UpdateStore for MemoryUpdateStore {
    #[tracing::instrument(skip(self))]
    async fn insert_update(&self, update: &Update) -> Result<(), Error> {
        let mut updates = lock(&self.0)?;
        if updates
            .iter()
            .any(|u| u.campaign_id == update.campaign_id && u.title == update.title)
        {
            return Err(Error::ResourceConflict);
        }

        updates.push(update.clone());

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_updates_by_campaign(
        &self,
        campaign_id: CampaignId,
        page: Page,
    ) -> Result<Vec<Update>, Error> {
        let updates: Vec<Update> = lock(&self.0)?
            .iter()
            .filter(|u| u.campaign_id == campaign_id)
            .cloned()
            .collect();

        Ok(page.slice(&updates))
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_update_by_id(&self, update_id: UpdateId) -> Result<Option<Update>, Error> {
        let updates = lock(&self.0)?;

        Ok(updates.iter().find(|u| u.id == update_id).cloned())
    }

    #[tracing::instrument(skip(self))]
    async fn update_update(
        &self,
        update_id: UpdateId,
        changes: &UpdateChanges,
        modified_at: DateTime<Utc>,
    ) -> Result<Option<Update>, Error> {
        let mut updates = lock(&self.0)?;
        let campaign_id = match updates.iter().find(|u| u.id == update_id) {
            Some(update) => update.campaign_id,
            None => return Ok(None),
        };
        if let Some(title) = &changes.title {
            if updates
                .iter()
                .any(|u| u.id != update_id && u.campaign_id == campaign_id && &u.title == title)
            {
                return Err(Error::ResourceConflict);
            }
        }

        let update = updates.iter_mut().find(|u| u.id == update_id).map(|u| {
            changes.apply(u);
            u.modified_at = modified_at;
            u.clone()
        });

        Ok(update)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_update(&self, update_id: UpdateId) -> Result<(), Error> {
        lock(&self.0)?.retain(|u| u.id != update_id);

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_updates_by_campaign(&self, campaign_id: CampaignId) -> Result<(), Error> {
        lock(&self.0)?.retain(|u| u.campaign_id != campaign_id);

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserStore(Mutex<Vec<User>>);

#[async_trait]
impl UserStore for MemoryUserStore {
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    async fn insert_user(&self, user: &User) -> Result<(), Error> {
        let mut users = lock(&self.0)?;
        if users
            .iter()
            .any(|u| u.username == user.username || u.token == user.token)
        {
            return Err(Error::ResourceConflict);
        }

        users.push(user.clone());

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_user_by_id(&self, user_id: UserId) -> Result<Option<User>, Error> {
        let users = lock(&self.0)?;

        Ok(users.iter().find(|u| u.id == user_id).cloned())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_user_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        let users = lock(&self.0)?;

        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    #[tracing::instrument(skip(self, token))]
    async fn fetch_user_by_token(&self, token: &str) -> Result<Option<User>, Error> {
        let users = lock(&self.0)?;

        Ok(users.iter().find(|u| u.token == token).cloned())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, Error> {
    mutex
        .lock()
        .map_err(|_| Error::ExistentialState("in-memory store lock was poisoned".to_string()))
}
