use chrono::Utc;
use tracing::info;

use crate::campaign::{Campaign, CampaignId, CampaignState};
use crate::database::Database;
use crate::error::Error;
use crate::update::{Update, UpdateId};
use crate::user::password::hash_password;
use crate::user::{User, UserId};

pub const DEMO_USER_PASSWORD: &str = "lighthouse-keeper";
pub const DEMO_USER_TOKEN: &str = "7e0c5a1f3d9b4e62a8f1c3d5b7e9a2c4f6d8b0a1c3e5f7a9b2d4c6e8f0a1b3c5";

/// Replaces all stored data with a small, fixed set of records.
pub async fn seed(db: &dyn Database) -> Result<(), Error> {
    db.clear().await?;

    let user_id: UserId = "USR-8D3AF1E6-2C47-4B1D-9E05-7A6C3B2F1D90"
        .parse()
        .map_err(|_| Error::ExistentialState("invalid seed user id".to_string()))?;
    let campaign_id: CampaignId = "CPN-16E77539-8873-4C8A-BCA3-2036010474AD"
        .parse()
        .map_err(|_| Error::ExistentialState("invalid seed campaign id".to_string()))?;
    let update_id: UpdateId = "UPD-5EA81D0A-9788-4B8A-82D9-1A0D636B53CE"
        .parse()
        .map_err(|_| Error::ExistentialState("invalid seed update id".to_string()))?;

    let now = Utc::now();
    let user = User {
        id: user_id,
        username: "demo".to_string(),
        password_hash: hash_password(DEMO_USER_PASSWORD)?,
        token: DEMO_USER_TOKEN.to_string(),
        is_active: true,
        created_at: now,
        modified_at: now,
    };

    let campaign = Campaign {
        id: campaign_id,
        owner_id: user_id,
        title: "Restore the Old Lighthouse".to_string(),
        description: "New paint, new wiring, and a working lamp by summer.".to_string(),
        goal: 2_500_000,
        state: CampaignState::Started,
        created_at: now,
        modified_at: now,
    };

    let update = Update {
        id: update_id,
        campaign_id,
        title: "Scaffolding is up".to_string(),
        content: "Thanks to everyone who chipped in. Painting starts next week.".to_string(),
        created_at: now,
        modified_at: now,
    };

    db.users().insert_user(&user).await?;
    db.campaigns().insert_campaign(&campaign).await?;
    db.updates().insert_update(&update).await?;

    info!("seeded demo user {} with campaign {}", user_id, campaign_id);

    Ok(())
}
