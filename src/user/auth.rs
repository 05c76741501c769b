use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::web::Data;
use actix_web::{FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;

use crate::database::Database;
use crate::error::Error;

use super::{manager, User};

const BEARER_PREFIX: &str = "Bearer ";

/// The active user identified by the request's bearer token. Handlers that
/// take this extractor reject anonymous callers before running.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn into_inner(self) -> User {
        self.0
    }
}

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<CurrentUser, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let db = req.app_data::<Data<Box<dyn Database>>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let db = db.ok_or_else(|| {
                Error::ExistentialState("no database registered with the app".to_string())
            })?;
            let token = token.ok_or(Error::MissingCredentials)?;

            let user = manager::authenticate(&***db, &token).await?;

            Ok(CurrentUser(user))
        })
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?.trim();

    if token.is_empty() {
        return None;
    }

    Some(token.to_string())
}
