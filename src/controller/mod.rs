use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use anyhow::Context;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeFile;
use tracing::info;
use crate::config::Config;
use crate::helpers::handler_404::page_not_found_handler;
use crate::mailer::Mailer;

pub mod health_check;
pub mod reservation_controller;

#[derive(Clone)]
pub struct AppState {
    pub reservations_dir: PathBuf,
    pub mailer: Arc<Mailer>,
    pub environment: String,
    pub restaurant_phone: String,
}

pub async fn serve(
    mailer: Arc<Mailer>,
    config: &Config,
) -> anyhow::Result<()> {
    let origins: Vec<HeaderValue> = config
        .origin_urls
        .split(',')
        .map(|s| s.parse().unwrap())
        .collect::<Vec<HeaderValue>>();

    let app_state = AppState {
        reservations_dir: PathBuf::from(&config.reservations_dir),
        mailer,
        environment: config.environment.clone(),
        restaurant_phone: config.restaurant_phone.clone(),
    };

    let application = router_endpoints(app_state)
        .route_service("/", ServeFile::new("public/index.html"))
        .layer(
            ServiceBuilder::new()
                .layer(
                    CorsLayer::new()
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::PUT,
                            Method::DELETE,
                            Method::OPTIONS
                        ])
                        .allow_origin(origins)
                        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                )
        )
        .fallback(page_not_found_handler);

    let port = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("API server listening on port: {}", port);
    axum::Server::bind(&port)
        .serve(application.into_make_service())
        .await
        .context("Error spinning up the API server")
}

pub fn router_endpoints(app_state: AppState) -> Router {
    Router::new()
        .nest("/reservations", reservation_controller::router(app_state.clone()))
        .merge(health_check::router(app_state))
}
