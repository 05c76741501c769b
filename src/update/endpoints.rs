use actix_web::web::{Data, Json, Path, Query};
use actix_web::{delete, get, post, put, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::campaign::{self, CampaignId};
use crate::database::Database;
use crate::error::Error;
use crate::user::CurrentUser;
use crate::utils::Page;

use super::{manager, Update, UpdateChanges, UpdateId};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateUpdateBody {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ModifyUpdateBody {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl From<ModifyUpdateBody> for UpdateChanges {
    fn from(body: ModifyUpdateBody) -> UpdateChanges {
        UpdateChanges {
            title: body.title,
            content: body.content,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateBody {
    pub id: UpdateId,
    pub campaign_id: CampaignId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl UpdateBody {
    pub fn render(update: Update) -> UpdateBody {
        UpdateBody {
            id: update.id,
            campaign_id: update.campaign_id,
            title: update.title,
            content: update.content,
            created_at: update.created_at,
            modified_at: update.modified_at,
        }
    }
}

#[post("/campaigns/{campaign_id}/updates")]
#[tracing::instrument(skip(db, current_user))]
pub async fn create_update_in_campaign(
    db: Data<Box<dyn Database>>,
    current_user: CurrentUser,
    params: Path<CampaignId>,
    body: Result<Json<CreateUpdateBody>, actix_web::Error>,
) -> Result<HttpResponse, actix_web::Error> {
    let campaign_id = params.into_inner();
    let user = current_user.into_inner();
    let campaign =
        campaign::manager::expect_accessible_campaign(&***db, campaign_id, &user).await?;
    let body = body?.into_inner();

    let update = manager::create_update(&***db, &campaign, body.title, body.content).await?;

    Ok(HttpResponse::Created().json(UpdateBody::render(update)))
}

#[get("/campaigns/{campaign_id}/updates")]
#[tracing::instrument(skip(db))]
pub async fn get_updates_in_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
    query: Query<Page>,
) -> Result<Json<Vec<UpdateBody>>, Error> {
    let campaign_id = params.into_inner();
    let updates = manager::get_updates_by_campaign(&***db, campaign_id, query.into_inner()).await?;

    let body = updates.into_iter().map(UpdateBody::render).collect();

    Ok(Json(body))
}

#[get("/updates/{update_id}")]
#[tracing::instrument(skip(db))]
pub async fn get_update_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<UpdateId>,
) -> Result<Json<UpdateBody>, Error> {
    let update_id = params.into_inner();
    let update = manager::expect_update_by_id(&***db, update_id).await?;

    Ok(Json(UpdateBody::render(update)))
}

#[put("/updates/{update_id}")]
#[tracing::instrument(skip(db, current_user))]
pub async fn update_update(
    db: Data<Box<dyn Database>>,
    current_user: CurrentUser,
    params: Path<UpdateId>,
    body: Result<Json<ModifyUpdateBody>, actix_web::Error>,
) -> Result<Json<UpdateBody>, actix_web::Error> {
    let update_id = params.into_inner();
    let user = current_user.into_inner();
    let update = manager::expect_accessible_update(&***db, update_id, &user).await?;
    let body = body?.into_inner();

    let update = manager::update_update(&***db, update, body.into()).await?;

    Ok(Json(UpdateBody::render(update)))
}

#[delete("/updates/{update_id}")]
#[tracing::instrument(skip(db, current_user))]
pub async fn delete_update(
    db: Data<Box<dyn Database>>,
    current_user: CurrentUser,
    params: Path<UpdateId>,
) -> Result<HttpResponse, Error> {
    let update_id = params.into_inner();
    let user = current_user.into_inner();
    let update = manager::expect_accessible_update(&***db, update_id, &user).await?;

    manager::delete_update(&***db, update).await?;

    Ok(HttpResponse::NoContent().finish())
}
