use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::notifications::summary::{run_daily_summary, SummaryOutcome};
use crate::web::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/notifications/daily", post(trigger_daily_summary))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DailySummaryBody {
    date: Option<NaiveDate>,
    recipients: Option<Vec<String>>,
}

async fn trigger_daily_summary(
    State(state): State<AppState>,
    body: Option<Json<DailySummaryBody>>,
) -> Response {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let date = body
        .date
        .unwrap_or_else(|| Utc::now().with_timezone(&state.timezone).date_naive());

    match run_daily_summary(
        &state.store,
        &state.mailer,
        date,
        body.recipients.as_deref(),
    )
    .await
    {
        Ok(SummaryOutcome::NoTasks) => StatusCode::NO_CONTENT.into_response(),
        Ok(_) => (StatusCode::ACCEPTED, Json(json!({ "status": "queued" }))).into_response(),
        Err(err) => {
            error!(error = %err, date = %date, "daily summary send failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Could not send the daily summary" })),
            )
                .into_response()
        }
    }
}
