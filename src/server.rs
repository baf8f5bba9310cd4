use crate::config::ServerConfig;
use crate::data::{SchedulingInput, SchedulingOutput};
use crate::report::{examiner_load, room_occupation};
use crate::solver;
use crate::store::InMemoryStore;
use axum::{Json, Router, http::StatusCode, routing::{get, post}};
use chrono::{Local, NaiveDate};
use log::{error, info};

/// Builds a store from the request, schedules every pending module and
/// reports the resulting calendar.
pub fn schedule_input(input: SchedulingInput, today: NaiveDate) -> Result<SchedulingOutput, String> {
    let store = InMemoryStore::new(
        input.groups,
        input.modules,
        input.examiners.clone(),
        input.rooms.clone(),
    );
    for booking in input.bookings {
        let id = booking.id;
        store
            .restore(booking)
            .map_err(|e| format!("existing booking {id} is invalid: {e}"))?;
    }

    let result = solver::solve(&store, &store, &store, &input.config, today).map_err(|e| e.to_string())?;
    let bookings = store.bookings().map_err(|e| e.to_string())?;

    Ok(SchedulingOutput {
        room_occupation: room_occupation(&input.rooms, &bookings),
        examiner_load: examiner_load(&input.examiners, &bookings),
        result,
        bookings,
    })
}

async fn schedule_handler(
    Json(input): Json<SchedulingInput>,
) -> Result<Json<SchedulingOutput>, (StatusCode, String)> {
    let today = Local::now().date_naive();
    match schedule_input(input, today) {
        Ok(output) => Ok(Json(output)),
        Err(e) => {
            error!("Scheduling request failed: {}", e);
            Err((StatusCode::BAD_REQUEST, e))
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

pub fn router() -> Router {
    Router::new()
        .route("/v1/exams/schedule", post(schedule_handler))
        .route("/health", get(health))
}

pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, router()).await
}
