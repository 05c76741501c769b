use chrono::Utc;

use crate::access;
use crate::database::Database;
use crate::error::Error;
use crate::user::{User, UserId};
use crate::utils::{require_non_blank, Page};

use super::{Campaign, CampaignChanges, CampaignId, CampaignState};

#[tracing::instrument(skip(db, owner), fields(owner_id = %owner.id))]
pub async fn create_campaign(
    db: &dyn Database,
    owner: &User,
    title: String,
    description: String,
    goal: i64,
) -> Result<Campaign, Error> {
    let title = require_non_blank("title", title)?;
    validate_goal(goal)?;

    let now = Utc::now();
    let campaign = Campaign {
        id: CampaignId::new(),
        owner_id: owner.id,
        title,
        description,
        goal,
        state: CampaignState::Draft,
        created_at: now,
        modified_at: now,
    };

    db.campaigns().insert_campaign(&campaign).await?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn get_campaigns(db: &dyn Database, page: Page) -> Result<Vec<Campaign>, Error> {
    if page.is_empty() {
        return Ok(vec![]);
    }

    let campaigns = db.campaigns().fetch_campaigns(page).await?;

    Ok(campaigns)
}

#[tracing::instrument(skip(db))]
pub async fn get_campaigns_by_owner(
    db: &dyn Database,
    owner_id: UserId,
    page: Page,
) -> Result<Vec<Campaign>, Error> {
    if page.is_empty() {
        return Ok(vec![]);
    }

    let campaigns = db
        .campaigns()
        .fetch_campaigns_by_owner(owner_id, page)
        .await?;

    Ok(campaigns)
}

#[tracing::instrument(skip(db))]
pub async fn expect_campaign_by_id(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<Campaign, Error> {
    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::CampaignNotFound { campaign_id })?;

    Ok(campaign)
}

/// Resolves a campaign the user is about to modify, failing if it doesn't
/// exist or if the user may not act on it.
#[tracing::instrument(skip(db, user), fields(user_id = %user.id))]
pub async fn expect_accessible_campaign(
    db: &dyn Database,
    campaign_id: CampaignId,
    user: &User,
) -> Result<Campaign, Error> {
    let campaign = expect_campaign_by_id(db, campaign_id).await?;
    access::authorize(&campaign, user)?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn update_campaign(
    db: &dyn Database,
    campaign: Campaign,
    mut changes: CampaignChanges,
) -> Result<Campaign, Error> {
    if let Some(title) = changes.title.take() {
        changes.title = Some(require_non_blank("title", title)?);
    }
    if let Some(goal) = changes.goal {
        validate_goal(goal)?;
    }

    let campaign_id = campaign.id;
    let campaign = db
        .campaigns()
        .update_campaign(campaign_id, &changes, Utc::now())
        .await?
        .ok_or(Error::CampaignNotFound { campaign_id })?;

    Ok(campaign)
}

// starting an already started campaign leaves it started
#[tracing::instrument(skip(db))]
pub async fn start_campaign(db: &dyn Database, campaign: Campaign) -> Result<Campaign, Error> {
    let campaign_id = campaign.id;
    let campaign = db
        .campaigns()
        .update_campaign_state(campaign_id, CampaignState::Started, Utc::now())
        .await?
        .ok_or(Error::CampaignNotFound { campaign_id })?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn delete_campaign(db: &dyn Database, campaign: Campaign) -> Result<(), Error> {
    db.updates().delete_updates_by_campaign(campaign.id).await?;
    db.campaigns().delete_campaign(campaign.id).await?;

    Ok(())
}

fn validate_goal(goal: i64) -> Result<(), Error> {
    if goal <= 0 {
        return Err(Error::InvalidField {
            field: "goal",
            reason: "must be positive",
        });
    }

    Ok(())
}
