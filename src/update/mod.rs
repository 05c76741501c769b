use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::campaign::CampaignId;
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub type UpdateId = TypedId<Update>;

/// A status post on a campaign. Access to an update is governed by the owner
/// of its campaign.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Update {
    #[serde(rename = "_id")]
    pub id: UpdateId,
    pub campaign_id: CampaignId,
    pub title: String,
    pub content: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for Update {
    fn tag() -> &'static str {
        "UPD"
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl UpdateChanges {
    pub fn apply(&self, update: &mut Update) {
        if let Some(title) = &self.title {
            update.title = title.clone();
        }
        if let Some(content) = &self.content {
            update.content = content.clone();
        }
    }
}
