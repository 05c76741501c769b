use actix_web::web::{Data, Json, Path, Query};
use actix_web::{delete, get, post, put, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::error::Error;
use crate::user::{CurrentUser, UserId};
use crate::utils::Page;

use super::{manager, Campaign, CampaignChanges, CampaignId, CampaignState};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateCampaignBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub goal: i64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ModifyCampaignBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub goal: Option<i64>,
}

impl From<ModifyCampaignBody> for CampaignChanges {
    fn from(body: ModifyCampaignBody) -> CampaignChanges {
        CampaignChanges {
            title: body.title,
            description: body.description,
            goal: body.goal,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CampaignBody {
    pub id: CampaignId,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub goal: i64,
    pub state: CampaignState,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl CampaignBody {
    pub fn render(campaign: Campaign) -> CampaignBody {
        CampaignBody {
            id: campaign.id,
            owner_id: campaign.owner_id,
            title: campaign.title,
            description: campaign.description,
            goal: campaign.goal,
            state: campaign.state,
            created_at: campaign.created_at,
            modified_at: campaign.modified_at,
        }
    }
}

#[post("/campaigns")]
#[tracing::instrument(skip(db, current_user))]
pub async fn create_campaign(
    db: Data<Box<dyn Database>>,
    current_user: CurrentUser,
    body: Json<CreateCampaignBody>,
) -> Result<HttpResponse, Error> {
    let user = current_user.into_inner();
    let body = body.into_inner();

    let campaign =
        manager::create_campaign(&***db, &user, body.title, body.description, body.goal).await?;

    Ok(HttpResponse::Created().json(CampaignBody::render(campaign)))
}

#[get("/campaigns")]
#[tracing::instrument(skip(db))]
pub async fn get_campaigns(
    db: Data<Box<dyn Database>>,
    query: Query<Page>,
) -> Result<Json<Vec<CampaignBody>>, Error> {
    let campaigns = manager::get_campaigns(&***db, query.into_inner()).await?;

    let body = campaigns.into_iter().map(CampaignBody::render).collect();

    Ok(Json(body))
}

#[get("/users/{user_id}/campaigns")]
#[tracing::instrument(skip(db))]
pub async fn get_campaigns_by_user(
    db: Data<Box<dyn Database>>,
    params: Path<UserId>,
    query: Query<Page>,
) -> Result<Json<Vec<CampaignBody>>, Error> {
    let user_id = params.into_inner();
    let campaigns = manager::get_campaigns_by_owner(&***db, user_id, query.into_inner()).await?;

    let body = campaigns.into_iter().map(CampaignBody::render).collect();

    Ok(Json(body))
}

#[get("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
pub async fn get_campaign_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();
    let campaign = manager::expect_campaign_by_id(&***db, campaign_id).await?;

    Ok(Json(CampaignBody::render(campaign)))
}

// the body is only inspected once the caller is known to have access
#[put("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db, current_user))]
pub async fn update_campaign(
    db: Data<Box<dyn Database>>,
    current_user: CurrentUser,
    params: Path<CampaignId>,
    body: Result<Json<ModifyCampaignBody>, actix_web::Error>,
) -> Result<Json<CampaignBody>, actix_web::Error> {
    let campaign_id = params.into_inner();
    let user = current_user.into_inner();
    let campaign = manager::expect_accessible_campaign(&***db, campaign_id, &user).await?;
    let body = body?.into_inner();

    let campaign = manager::update_campaign(&***db, campaign, body.into()).await?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[post("/campaigns/{campaign_id}/start")]
#[tracing::instrument(skip(db, current_user))]
pub async fn start_campaign(
    db: Data<Box<dyn Database>>,
    current_user: CurrentUser,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();
    let user = current_user.into_inner();
    let campaign = manager::expect_accessible_campaign(&***db, campaign_id, &user).await?;

    let campaign = manager::start_campaign(&***db, campaign).await?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[delete("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db, current_user))]
pub async fn delete_campaign(
    db: Data<Box<dyn Database>>,
    current_user: CurrentUser,
    params: Path<CampaignId>,
) -> Result<HttpResponse, Error> {
    let campaign_id = params.into_inner();
    let user = current_user.into_inner();
    let campaign = manager::expect_accessible_campaign(&***db, campaign_id, &user).await?;

    manager::delete_campaign(&***db, campaign).await?;

    Ok(HttpResponse::NoContent().finish())
}
