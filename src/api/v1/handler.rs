use super::error::*;
use crate::application_port::*;
use crate::domain_model::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

fn reply<T: Serialize>(data: T, status: StatusCode) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(warp::reply::json(&ApiResponse::ok(data)), status)
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn login(
    body: LoginRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let login_input = LoginInput {
        username: body.username,
        password: body.password,
    };
    let pair = auth_service
        .login(login_input)
        .await
        .map_err(ApiErrorCode::from_login)
        .map_err(reject::custom)?;

    Ok(reply(AuthTokens::from(pair), StatusCode::OK))
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub async fn refresh(
    body: RefreshRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let pair = auth_service
        .refresh(&body.refresh_token)
        .await
        .map_err(ApiErrorCode::from_refresh)
        .map_err(reject::custom)?;

    Ok(reply(AuthTokens::from(pair), StatusCode::CREATED))
}

pub async fn logout(
    identity: AuthenticatedIdentity,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    auth_service
        .logout(&identity)
        .await
        .map_err(ApiErrorCode::unauthorized)
        .map_err(reject::custom)?;

    Ok(reply("Successfully logged out", StatusCode::OK))
}

#[derive(Debug, Serialize)]
pub struct LogoutAllResponse {
    pub revoked: u64,
}

pub async fn logout_all(
    identity: AuthenticatedIdentity,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let revoked = auth_service
        .logout_all(&identity)
        .await
        .map_err(ApiErrorCode::unauthorized)
        .map_err(reject::custom)?;

    Ok(reply(LogoutAllResponse { revoked }, StatusCode::OK))
}

pub async fn create_todo(
    identity: AuthenticatedIdentity,
    body: Todo,
) -> Result<impl warp::Reply, warp::Rejection> {
    let todo = Todo {
        user_id: Some(identity.user_id),
        title: body.title,
    };
    Ok(reply(todo, StatusCode::CREATED))
}
