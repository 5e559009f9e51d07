use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Router};
use serde_json::json;

use crate::controller::AppState;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(get_health_check))
        .route_layer(Extension(app_state))
}

/// Reports whether the outbound mail channel came up ready.
async fn get_health_check(
    Extension(state): Extension<AppState>,
) -> impl IntoResponse {
    (
        StatusCode::OK,
        json!({
            "status": "ok",
            "emailConfigured": state.mailer.is_ready(),
        }).to_string(),
    )
}
