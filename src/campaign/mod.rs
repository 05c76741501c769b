use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::access::Owned;
use crate::typedid::{TypedId, TypedIdMarker};
use crate::user::UserId;

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub type CampaignId = TypedId<Campaign>;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Campaign {
    #[serde(rename = "_id")]
    pub id: CampaignId,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub goal: i64,
    pub state: CampaignState,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for Campaign {
    fn tag() -> &'static str {
        "CPN"
    }
}

impl Owned for Campaign {
    fn owner_id(&self) -> UserId {
        self.owner_id
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum CampaignState {
    Draft,
    Started,
}

/// A partial modification; `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CampaignChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub goal: Option<i64>,
}

impl CampaignChanges {
    pub fn apply(&self, campaign: &mut Campaign) {
        if let Some(title) = &self.title {
            campaign.title = title.clone();
        }
        if let Some(description) = &self.description {
            campaign.description = description.clone();
        }
        if let Some(goal) = self.goal {
            campaign.goal = goal;
        }
    }
}
