use std::fmt::{Debug, Display};
use std::io::Error as IoError;

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError, UrlencodedError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derivative::Derivative;
use argon2::password_hash::Error as PasswordHashError;
use mongodb::bson::ser::Error as BsonError;
use mongodb::error::{Error as DatabaseError, ErrorKind, WriteFailure};
use serde::{Serialize, Serializer};
use tracing::warn;

use crate::campaign::CampaignId;
use crate::update::UpdateId;
use crate::user::UserId;

const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Serialize, Derivative)]
#[derivative(PartialEq, Eq)]
#[serde(untagged)]
pub enum Error {
    // 400
    #[serde(serialize_with = "display")]
    InvalidJson(#[derivative(PartialEq = "ignore")] JsonPayloadError),
    #[serde(serialize_with = "display")]
    InvalidPath(#[derivative(PartialEq = "ignore")] PathError),
    #[serde(serialize_with = "display")]
    InvalidForm(#[derivative(PartialEq = "ignore")] UrlencodedError),
    #[serde(serialize_with = "display")]
    InvalidQuery(#[derivative(PartialEq = "ignore")] QueryPayloadError),
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },

    // 401
    MissingCredentials,
    InvalidCredentials,
    InactiveUser {
        user_id: UserId,
    },

    // 403
    AccessDenied {
        user_id: UserId,
    },

    // 404
    PathNotFound,
    CampaignNotFound {
        campaign_id: CampaignId,
    },
    UpdateNotFound {
        update_id: UpdateId,
    },
    UserNotFound {
        user_id: UserId,
    },

    // 409
    ResourceConflict,

    // 500
    ExistentialState(String),
    InvalidConfig {
        key: &'static str,
        value: String,
    },
    #[serde(serialize_with = "display")]
    FailedDatabaseCall(#[derivative(PartialEq = "ignore")] DatabaseError),
    #[serde(serialize_with = "display")]
    FailedToSerializeToBson(#[derivative(PartialEq = "ignore")] BsonError),
    #[serde(serialize_with = "display")]
    IoError(#[derivative(PartialEq = "ignore")] IoError),
    #[serde(serialize_with = "display")]
    FailedToHashPassword(#[derivative(PartialEq = "ignore")] PasswordHashError),
}

impl Error {
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "E4001000",
            Error::InvalidPath(_) => "E4001001",
            Error::InvalidForm(_) => "E4001002",
            Error::InvalidQuery(_) => "E4001003",
            Error::InvalidField { .. } => "E4001004",
            Error::MissingCredentials => "E4011000",
            Error::InvalidCredentials => "E4011001",
            Error::InactiveUser { .. } => "E4011002",
            Error::AccessDenied { .. } => "E4031000",
            Error::PathNotFound => "E4041000",
            Error::CampaignNotFound { .. } => "E4041001",
            Error::UpdateNotFound { .. } => "E4041002",
            Error::UserNotFound { .. } => "E4041003",
            Error::ResourceConflict => "E4091000",
            Error::ExistentialState(_) => "E5001000",
            Error::FailedDatabaseCall(_) => "E5001001",
            Error::FailedToSerializeToBson(_) => "E5001002",
            Error::IoError(_) => "E5001003",
            Error::InvalidConfig { .. } => "E5001004",
            Error::FailedToHashPassword(_) => "E5001005",
        }
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "The given json could not be parsed",
            Error::InvalidPath(_) => "The given path could not be parsed",
            Error::InvalidForm(_) => "The given form could not be parsed",
            Error::InvalidQuery(_) => "The given query could not be parsed",
            Error::InvalidField { .. } => "The given body contains an invalid field",
            Error::MissingCredentials => "The request did not provide a bearer token",
            Error::InvalidCredentials => "The provided bearer token is not recognized",
            Error::InactiveUser { .. } => "The authenticated user is not active",
            Error::AccessDenied { .. } => {
                "The authenticated user does not have access to the requested resource"
            }
            Error::PathNotFound => "The requested path was not found",
            Error::CampaignNotFound { .. } => "The requested campaign was not found",
            Error::UpdateNotFound { .. } => "The requested update was not found",
            Error::UserNotFound { .. } => "The requested user was not found",
            Error::ResourceConflict => "The request conflicts with an existing resource",
            Error::ExistentialState(_) => "The server detected an invalid state",
            Error::InvalidConfig { .. } => "The server configuration is invalid",
            Error::FailedDatabaseCall(_) => {
                "An error occurred when communicating with the database"
            }
            Error::FailedToSerializeToBson(_) => {
                "An error occurred when serializing an object to bson"
            }
            Error::IoError(_) => "An error occurred during an I/O operation",
            Error::FailedToHashPassword(_) => "An error occurred when hashing a password",
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Error::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Error::InvalidForm(_) => StatusCode::BAD_REQUEST,
            Error::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Error::InvalidField { .. } => StatusCode::BAD_REQUEST,
            Error::MissingCredentials => StatusCode::UNAUTHORIZED,
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::InactiveUser { .. } => StatusCode::UNAUTHORIZED,
            Error::AccessDenied { .. } => StatusCode::FORBIDDEN,
            Error::PathNotFound => StatusCode::NOT_FOUND,
            Error::CampaignNotFound { .. } => StatusCode::NOT_FOUND,
            Error::UpdateNotFound { .. } => StatusCode::NOT_FOUND,
            Error::UserNotFound { .. } => StatusCode::NOT_FOUND,
            Error::ResourceConflict => StatusCode::CONFLICT,
            Error::ExistentialState(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::InvalidConfig { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedDatabaseCall(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToSerializeToBson(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToHashPassword(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        #[derive(Serialize)]
        struct Dummy<'a> {
            error_code: &'static str,
            error_message: &'static str,
            error_meta: &'a Error,
        }

        HttpResponse::build(self.status_code()).json(&Dummy {
            error_code: self.error_code(),
            error_message: self.error_message(),
            error_meta: self,
        })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        Debug::fmt(self, f)
    }
}

impl From<DatabaseError> for Error {
    fn from(error: DatabaseError) -> Error {
        // the offending index and key stay in the logs, clients only see a conflict
        if is_duplicate_key(&error) {
            warn!("write rejected by unique index: {}", error);
            return Error::ResourceConflict;
        }

        Error::FailedDatabaseCall(error)
    }
}

impl From<BsonError> for Error {
    fn from(error: BsonError) -> Error {
        Error::FailedToSerializeToBson(error)
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

impl From<PasswordHashError> for Error {
    fn from(error: PasswordHashError) -> Error {
        Error::FailedToHashPassword(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidJson(err) => Some(err),
            Error::InvalidPath(err) => Some(err),
            Error::InvalidForm(err) => Some(err),
            Error::InvalidQuery(err) => Some(err),
            Error::FailedDatabaseCall(err) => Some(err),
            Error::FailedToSerializeToBson(err) => Some(err),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

// inserts report the violation as a write error, findAndModify as a command error
fn is_duplicate_key(error: &DatabaseError) -> bool {
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY,
        ErrorKind::BulkWrite(failure) => failure
            .write_errors
            .iter()
            .flatten()
            .any(|write_error| write_error.code == DUPLICATE_KEY),
        _ => false,
    }
}

fn display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}
