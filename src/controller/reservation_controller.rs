use std::sync::Arc;
use axum::{Extension, Json, Router};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;
use crate::controller::AppState;
use crate::models::reservation::Reservation;
use crate::repositories::file_repo::FileReservationRepo;

pub fn router(app_state: AppState) -> Router {
    let file_repo = Arc::new(FileReservationRepo::new(
        app_state.reservations_dir.clone()
    ));

    Router::new()
        .route("/", get(list_reservations))
        .route("/", post(submit_reservation))
        .route_layer(Extension(file_repo))
        .route_layer(Extension(app_state))
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SubmitReservation {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub guests: Option<u32>,
    pub notes: Option<String>,
}

fn required(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub async fn submit_reservation(
    Extension(file_repo): Extension<Arc<FileReservationRepo>>,
    Extension(state): Extension<AppState>,
    Json(body): Json<SubmitReservation>,
) -> impl IntoResponse {
    // Rejected submissions must leave no trace: no record, no email.
    let fields = (
        required(&body.name),
        required(&body.phone),
        required(&body.email),
        required(&body.date),
        required(&body.time),
        body.guests.filter(|guests| *guests > 0),
    );
    let (name, phone, email, date, time, guests) = match fields {
        (Some(name), Some(phone), Some(email), Some(date), Some(time), Some(guests)) => {
            (name, phone, email, date, time, guests)
        }
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                json!({
                    "success": false,
                    "message": "Missing required fields",
                }).to_string(),
            ).into_response();
        }
    };
    let notes = body.notes.as_deref().unwrap_or_default().trim().to_string();

    let reservation = Reservation::new(name, phone, email, date, time, guests, notes);

    if let Err(e) = file_repo.save(&reservation).await {
        warn!("Something went wrong saving reservation {} due to: {}", reservation.id, e);
        let mut response = json!({
            "success": false,
            "message": format!(
                "We could not save your reservation. Please call us at {} to book your table.",
                state.restaurant_phone
            ),
        });
        if state.environment != "production" {
            response["error"] = json!(e.to_string());
        }
        return (StatusCode::INTERNAL_SERVER_ERROR, response.to_string()).into_response();
    }

    // Best effort only: a failed or skipped notification never fails the
    // submission, it just changes the confirmation wording.
    let outcome = state.mailer.notify_both(&reservation).await;
    let message = if outcome.all_sent() {
        "Reservation request received! You will receive a confirmation email shortly."
    } else {
        "Reservation request received! We will contact you to confirm your booking."
    };

    (
        StatusCode::OK,
        json!({
            "success": true,
            "message": message,
        }).to_string(),
    ).into_response()
}

pub async fn list_reservations(
    Extension(file_repo): Extension<Arc<FileReservationRepo>>,
) -> impl IntoResponse {
    return match file_repo.list_all().await {
        Ok(mut reservations) => {
            // The stored timestamps are fixed-width, so the lexical string
            // comparison is a chronological sort.
            reservations.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
            (
                StatusCode::OK,
                json!({
                    "success": true,
                    "reservations": reservations,
                }).to_string(),
            ).into_response()
        }
        Err(e) => {
            warn!("Something went wrong listing reservations due to: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "success": false,
                    "message": "Failed to load reservations, please try again.",
                }).to_string(),
            ).into_response()
        }
    };
}
