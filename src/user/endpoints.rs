use actix_web::web::{Data, Form, Json, Path};
use actix_web::{get, post, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::error::Error;

use super::{manager, CurrentUser, User, UserId};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateUserBody {
    pub username: String,
    pub password: String,
}

/// Sent form-encoded, e.g. `username=rosa&password=correct+horse`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginBody {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenBody {
    pub access_token: String,
    pub token_type: String,
}

impl TokenBody {
    pub fn bearer(token: String) -> TokenBody {
        TokenBody {
            access_token: token,
            token_type: "bearer".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserBody {
    pub id: UserId,
    pub username: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl UserBody {
    pub fn render(user: User) -> UserBody {
        UserBody {
            id: user.id,
            username: user.username,
            is_active: user.is_active,
            created_at: user.created_at,
            modified_at: user.modified_at,
        }
    }
}

/// Returned when registering. Afterwards the token is retrieved by logging in.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisteredUserBody {
    #[serde(flatten)]
    pub user: UserBody,
    pub token: String,
}

#[post("/users")]
#[tracing::instrument(skip(db, body))]
pub async fn create_user(
    db: Data<Box<dyn Database>>,
    body: Json<CreateUserBody>,
) -> Result<HttpResponse, Error> {
    let body = body.into_inner();

    let mut user = manager::create_user(&***db, body.username, body.password).await?;
    let token = std::mem::take(&mut user.token);

    Ok(HttpResponse::Created().json(RegisteredUserBody {
        user: UserBody::render(user),
        token,
    }))
}

#[post("/login")]
#[tracing::instrument(skip(db, form))]
pub async fn login(
    db: Data<Box<dyn Database>>,
    form: Form<LoginBody>,
) -> Result<Json<TokenBody>, Error> {
    let form = form.into_inner();

    let user = manager::login(&***db, &form.username, &form.password).await?;

    Ok(Json(TokenBody::bearer(user.token)))
}

#[get("/users/me")]
#[tracing::instrument(skip(current_user))]
pub async fn get_current_user(current_user: CurrentUser) -> Result<Json<UserBody>, Error> {
    Ok(Json(UserBody::render(current_user.into_inner())))
}

#[get("/users/{user_id}")]
#[tracing::instrument(skip(db))]
pub async fn get_user_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<UserId>,
) -> Result<Json<UserBody>, Error> {
    let user_id = params.into_inner();
    let user = manager::expect_user_by_id(&***db, user_id).await?;

    Ok(Json(UserBody::render(user)))
}
