use super::error::*;
use super::handler;
use crate::application_port::AuthService;
use crate::domain_model::AuthenticatedIdentity;
use crate::server::*;
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, reject};

const MAX_BODY_BYTES: u64 = 16 * 1024;

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let login = warp::post()
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(json_body())
        .and(with(server.auth_service.clone()))
        .and_then(handler::login);

    let refresh = warp::post()
        .and(warp::path!("token" / "refresh"))
        .and(json_body())
        .and(with(server.auth_service.clone()))
        .and_then(handler::refresh);

    let logout = warp::post()
        .and(warp::path("logout"))
        .and(warp::path::end())
        .and(with_verification(server.auth_service.clone()))
        .and(with(server.auth_service.clone()))
        .and_then(handler::logout);

    let logout_all = warp::post()
        .and(warp::path!("logout" / "all"))
        .and(with_verification(server.auth_service.clone()))
        .and(with(server.auth_service.clone()))
        .and_then(handler::logout_all);

    let todo = warp::post()
        .and(warp::path("todo"))
        .and(warp::path::end())
        .and(with_verification(server.auth_service.clone()))
        .and(json_body())
        .and_then(handler::create_todo);

    login.or(refresh).or(logout).or(logout_all).or(todo)
}

fn json_body<T: DeserializeOwned + Send>() -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

/// Auth gate: the only place protected routes get their caller from.
fn with_verification(
    auth_service: Arc<dyn AuthService>,
) -> impl Filter<Extract = (AuthenticatedIdentity,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(
        move |header: Option<String>| {
            let auth_service = auth_service.clone();
            async move {
                auth_service
                    .authenticate(header.as_deref())
                    .await
                    .map_err(ApiErrorCode::unauthorized)
                    .map_err(reject::custom)
            }
        },
    )
}
