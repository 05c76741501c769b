use chrono::Utc;

use crate::access;
use crate::campaign::{self, Campaign, CampaignId};
use crate::database::Database;
use crate::error::Error;
use crate::user::User;
use crate::utils::{require_non_blank, Page};

use super::{Update, UpdateChanges, UpdateId};

#[tracing::instrument(skip(db))]
pub async fn create_update(
    db: &dyn Database,
    campaign: &Campaign,
    title: String,
    content: String,
) -> Result<Update, Error> {
    let title = require_non_blank("title", title)?;

    let now = Utc::now();
    let update = Update {
        id: UpdateId::new(),
        campaign_id: campaign.id,
        title,
        content,
        created_at: now,
        modified_at: now,
    };

    db.updates().insert_update(&update).await?;

    Ok(update)
}

#[tracing::instrument(skip(db))]
pub async fn get_updates_by_campaign(
    db: &dyn Database,
    campaign_id: CampaignId,
    page: Page,
) -> Result<Vec<Update>, Error> {
    if page.is_empty() {
        return Ok(vec![]);
    }

    let updates = db
        .updates()
        .fetch_updates_by_campaign(campaign_id, page)
        .await?;

    Ok(updates)
}

#[tracing::instrument(skip(db))]
pub async fn expect_update_by_id(db: &dyn Database, update_id: UpdateId) -> Result<Update, Error> {
    let update = db
        .updates()
        .fetch_update_by_id(update_id)
        .await?
        .ok_or(Error::UpdateNotFound { update_id })?;

    Ok(update)
}

/// Resolves an update the user is about to modify. The update and its
/// campaign must both exist, and the user must have access to the campaign.
#[tracing::instrument(skip(db, user), fields(user_id = %user.id))]
pub async fn expect_accessible_update(
    db: &dyn Database,
    update_id: UpdateId,
    user: &User,
) -> Result<Update, Error> {
    let update = expect_update_by_id(db, update_id).await?;
    let campaign = campaign::manager::expect_campaign_by_id(db, update.campaign_id).await?;
    access::authorize(&campaign, user)?;

    Ok(update)
}

#[tracing::instrument(skip(db))]
pub async fn update_update(
    db: &dyn Database,
    update: Update,
    mut changes: UpdateChanges,
) -> Result<Update, Error> {
    if let Some(title) = changes.title.take() {
        changes.title = Some(require_non_blank("title", title)?);
    }

    let update_id = update.id;
    let update = db
        .updates()
        .update_update(update_id, &changes, Utc::now())
        .await?
        .ok_or(Error::UpdateNotFound { update_id })?;

    Ok(update)
}

#[tracing::instrument(skip(db))]
pub async fn delete_update(db: &dyn Database, update: Update) -> Result<(), Error> {
    db.updates().delete_update(update.id).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::CampaignState;
    use crate::database::test::MockDatabase;
    use crate::user::UserId;
    use std::sync::{Arc, Mutex};

    fn test_user() -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            username: "rosa".to_string(),
            password_hash: String::new(),
            token: "abc123".to_string(),
            is_active: true,
            created_at: now,
            modified_at: now,
        }
    }

    fn test_campaign(owner_id: UserId) -> Campaign {
        let now = Utc::now();
        Campaign {
            id: CampaignId::new(),
            owner_id,
            title: "Save the Lighthouse".to_string(),
            description: String::new(),
            goal: 500_000,
            state: CampaignState::Started,
            created_at: now,
            modified_at: now,
        }
    }

    fn test_update(campaign_id: CampaignId) -> Update {
        let now = Utc::now();
        Update {
            id: UpdateId::new(),
            campaign_id,
            title: "Scaffolding is up".to_string(),
            content: "Painting starts Monday".to_string(),
            created_at: now,
            modified_at: now,
        }
    }

    #[tokio::test]
    async fn can_create_update() {
        let mut db = MockDatabase::new();
        let campaign = test_campaign(UserId::new());
        let test_campaign_id = campaign.id;
        let called_insert = Arc::new(Mutex::new(false));
        let called_insert_clone = Arc::clone(&called_insert);
        db.updates.on_insert_update = Box::new(move |update| {
            *called_insert_clone.lock().unwrap() = true;
            assert_eq!(update.campaign_id, test_campaign_id);
            assert_eq!(update.title, "Scaffolding is up".to_string());
            Ok(())
        });

        let update = create_update(
            &db,
            &campaign,
            "Scaffolding is up".into(),
            "Painting starts Monday".into(),
        )
        .await
        .unwrap();

        assert_eq!(update.campaign_id, campaign.id);
        assert_eq!(update.created_at, update.modified_at);
        assert!(
            *called_insert.lock().unwrap(),
            "db.insert_update was not called"
        );
    }

    #[tokio::test]
    async fn create_update_reports_conflict() {
        let mut db = MockDatabase::new();
        db.updates.on_insert_update = Box::new(|_| Err(Error::ResourceConflict));

        let result = create_update(
            &db,
            &test_campaign(UserId::new()),
            "Again".into(),
            "".into(),
        )
        .await;

        assert_eq!(result.unwrap_err(), Error::ResourceConflict);
    }

    #[tokio::test]
    async fn expect_update_by_id_returns_error_if_doesnt_exist() {
        let mut db = MockDatabase::new();
        let test_update_id = UpdateId::new();
        db.updates.on_fetch_update_by_id = Box::new(move |update_id| {
            assert_eq!(update_id, test_update_id);
            Ok(None)
        });

        let result = expect_update_by_id(&db, test_update_id).await;

        assert_eq!(
            result.unwrap_err(),
            Error::UpdateNotFound {
                update_id: test_update_id
            }
        );
    }

    #[tokio::test]
    async fn accessible_update_requires_existing_update_first() {
        let mut db = MockDatabase::new();
        let update_id = UpdateId::new();
        db.updates.on_fetch_update_by_id = Box::new(|_| Ok(None));

        let result = expect_accessible_update(&db, update_id, &test_user()).await;

        assert_eq!(result.unwrap_err(), Error::UpdateNotFound { update_id });
    }

    #[tokio::test]
    async fn accessible_update_requires_existing_campaign() {
        let mut db = MockDatabase::new();
        let update = test_update(CampaignId::new());
        let update_id = update.id;
        let campaign_id = update.campaign_id;
        db.updates.on_fetch_update_by_id = Box::new(move |_| Ok(Some(update.clone())));
        db.campaigns.on_fetch_campaign_by_id = Box::new(|_| Ok(None));

        let result = expect_accessible_update(&db, update_id, &test_user()).await;

        assert_eq!(result.unwrap_err(), Error::CampaignNotFound { campaign_id });
    }

    #[tokio::test]
    async fn access_to_update_follows_its_campaign_owner() {
        let owner = test_user();
        let stranger = test_user();
        let own_campaign = test_campaign(owner.id);
        let other_campaign = test_campaign(stranger.id);
        let own_update = test_update(own_campaign.id);
        let other_update = test_update(other_campaign.id);
        let own_update_id = own_update.id;
        let other_update_id = other_update.id;

        let mut db = MockDatabase::new();
        db.updates.on_fetch_update_by_id = Box::new(move |update_id| {
            Ok([&own_update, &other_update]
                .iter()
                .find(|update| update.id == update_id)
                .map(|update| (*update).clone()))
        });
        db.campaigns.on_fetch_campaign_by_id = Box::new(move |campaign_id| {
            Ok([&own_campaign, &other_campaign]
                .iter()
                .find(|campaign| campaign.id == campaign_id)
                .map(|campaign| (*campaign).clone()))
        });

        let allowed = expect_accessible_update(&db, own_update_id, &owner).await;
        let denied = expect_accessible_update(&db, other_update_id, &owner).await;

        assert_eq!(allowed.unwrap().id, own_update_id);
        assert_eq!(
            denied.unwrap_err(),
            Error::AccessDenied { user_id: owner.id }
        );
    }

    #[tokio::test]
    async fn update_update_applies_changes() {
        let mut db = MockDatabase::new();
        let update = test_update(CampaignId::new());
        let stored = update.clone();
        db.updates.on_update_update = Box::new(move |update_id, changes, modified_at| {
            assert_eq!(update_id, stored.id);
            let mut refreshed = stored.clone();
            changes.apply(&mut refreshed);
            refreshed.modified_at = modified_at;
            Ok(Some(refreshed))
        });

        let changes = UpdateChanges {
            content: Some("Painting starts Tuesday".to_string()),
            ..Default::default()
        };
        let updated = update_update(&db, update.clone(), changes).await.unwrap();

        assert_eq!(updated.title, update.title);
        assert_eq!(updated.content, "Painting starts Tuesday".to_string());
    }

    #[tokio::test]
    async fn update_update_reports_title_conflict() {
        let mut db = MockDatabase::new();
        db.updates.on_update_update = Box::new(|_, changes, _| {
            assert_eq!(changes.title, Some("Kickoff".to_string()));
            Err(Error::ResourceConflict)
        });
        let changes = UpdateChanges {
            title: Some("Kickoff".to_string()),
            ..Default::default()
        };

        let result = update_update(&db, test_update(CampaignId::new()), changes).await;

        assert_eq!(result.unwrap_err(), Error::ResourceConflict);
    }

    #[tokio::test]
    async fn update_update_rejects_blank_title() {
        let db = MockDatabase::new();
        let changes = UpdateChanges {
            title: Some("".to_string()),
            ..Default::default()
        };

        let result = update_update(&db, test_update(CampaignId::new()), changes).await;

        assert_eq!(
            result.unwrap_err(),
            Error::InvalidField {
                field: "title",
                reason: "must not be empty",
            }
        );
    }

    #[tokio::test]
    async fn can_delete_update() {
        let mut db = MockDatabase::new();
        let update = test_update(CampaignId::new());
        let test_update_id = update.id;
        let called_delete = Arc::new(Mutex::new(false));
        let called_delete_clone = Arc::clone(&called_delete);
        db.updates.on_delete_update = Box::new(move |update_id| {
            *called_delete_clone.lock().unwrap() = true;
            assert_eq!(update_id, test_update_id);
            Ok(())
        });

        delete_update(&db, update).await.unwrap();

        assert!(
            *called_delete.lock().unwrap(),
            "db.delete_update was not called"
        );
    }

    #[tokio::test]
    async fn empty_page_skips_the_database() {
        let db = MockDatabase::new();
        let page = Page {
            limit: 0,
            offset: 3,
        };

        let updates = get_updates_by_campaign(&db, CampaignId::new(), page)
            .await
            .unwrap();

        assert!(updates.is_empty());
    }
}
