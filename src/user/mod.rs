use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::typedid::{TypedId, TypedIdMarker};

pub mod auth;
pub mod db;
pub mod endpoints;
pub mod manager;
pub mod password;
pub use auth::CurrentUser;
pub use endpoints::*;

pub type UserId = TypedId<User>;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub token: String,
    pub is_active: bool,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for User {
    fn tag() -> &'static str {
        "USR"
    }
}
