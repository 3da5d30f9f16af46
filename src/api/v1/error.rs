use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::{debug, warn};
use warp::filters::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let code = if let Some(code) = err.find::<ApiErrorCode>() {
        code.clone()
    } else if let Some(e) = err.find::<BodyDeserializeError>() {
        debug!("rejected body: {}", e);
        ApiErrorCode::InvalidRequest
    } else if err.find::<reject::UnsupportedMediaType>().is_some()
        || err.find::<reject::PayloadTooLarge>().is_some()
        || err.find::<reject::LengthRequired>().is_some()
    {
        ApiErrorCode::InvalidRequest
    } else if err.find::<reject::InvalidHeader>().is_some() {
        ApiErrorCode::Unauthorized
    } else if err.is_not_found() {
        ApiErrorCode::NotFound
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        ApiErrorCode::MethodNotAllowed
    } else {
        warn!("unhandled rejection: {:?}", err);
        ApiErrorCode::InternalError
    };

    let json = warp::reply::json(&ApiResponse::<()>::err(code.clone(), code.to_string()));
    Ok(warp::reply::with_status(json, code.status()))
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("Invalid request body")]
    InvalidRequest,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Refresh token is not valid")]
    InvalidRefreshToken,
    #[error("Could not issue tokens")]
    TokenIssueFailed,
    #[error("Could not refresh tokens")]
    RefreshFailed,
    #[error("Not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::InvalidRequest => StatusCode::UNPROCESSABLE_ENTITY,
            ApiErrorCode::InvalidCredentials
            | ApiErrorCode::Unauthorized
            | ApiErrorCode::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
            ApiErrorCode::TokenIssueFailed => StatusCode::UNPROCESSABLE_ENTITY,
            ApiErrorCode::RefreshFailed => StatusCode::FORBIDDEN,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Every gate failure looks the same to the caller. The cause is logged.
    pub fn unauthorized(error: AuthError) -> ApiErrorCode {
        match &error {
            AuthError::StoreUnavailable(_) => warn!("access check failed closed: {}", error),
            _ => debug!("access denied: {}", error),
        }
        ApiErrorCode::Unauthorized
    }

    pub fn from_login(error: AuthError) -> ApiErrorCode {
        match error {
            AuthError::InvalidCredentials => ApiErrorCode::InvalidCredentials,
            AuthError::SigningFailure(_)
            | AuthError::RegistrationFailed(_)
            | AuthError::StoreUnavailable(_) => {
                warn!("login issuance failed: {}", error);
                ApiErrorCode::TokenIssueFailed
            }
            e => ApiErrorCode::internal(e),
        }
    }

    pub fn from_refresh(error: AuthError) -> ApiErrorCode {
        match error {
            AuthError::RefreshInvalid(_) | AuthError::RefreshAlreadyUsedOrExpired => {
                debug!("refresh denied: {}", error);
                ApiErrorCode::InvalidRefreshToken
            }
            AuthError::SigningFailure(_)
            | AuthError::RegistrationFailed(_)
            | AuthError::StoreUnavailable(_) => {
                warn!("refresh issuance failed: {}", error);
                ApiErrorCode::RefreshFailed
            }
            e => ApiErrorCode::internal(e),
        }
    }
}

impl reject::Reject for ApiErrorCode {}
