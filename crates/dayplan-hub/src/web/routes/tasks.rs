use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use dayplan_shared::schemas::{Task, TaskDraft, TaskPatch};

use crate::store::{StoreError, TaskFilter};
use crate::web::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks))
        .route("/tasks", post(create_task))
        .route("/tasks/{id}", put(update_task))
        .route("/tasks/{id}", delete(delete_task))
}

#[derive(Deserialize)]
struct TasksQuery {
    date: Option<NaiveDate>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<TasksQuery>,
) -> (StatusCode, Json<Value>) {
    let filter = if let Some(date) = query.date {
        TaskFilter::Date(date)
    } else if let (Some(from), Some(to)) = (query.from, query.to) {
        TaskFilter::Range { from, to }
    } else {
        TaskFilter::All
    };

    let tasks = state.store.list(&filter);
    (
        StatusCode::OK,
        Json(serde_json::to_value(tasks).unwrap_or(json!([]))),
    )
}

async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<TaskDraft>, axum::extract::rejection::JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let Json(draft) = match body {
        Ok(b) => b,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid body" })),
            );
        }
    };

    let task = match state.store.create(draft) {
        Ok(task) => task,
        Err(StoreError::Validation(msg)) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": msg })));
        }
        Err(err) => {
            error!(error = %err, "failed to create task");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Could not create the task" })),
            );
        }
    };

    // Post-commit mirror hook; its failure never fails the create.
    let task = mirror_create(&state, task).await;

    (
        StatusCode::CREATED,
        Json(serde_json::to_value(task).unwrap_or(json!({}))),
    )
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<TaskPatch>, axum::extract::rejection::JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let Json(patch) = match body {
        Ok(b) => b,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid body" })),
            );
        }
    };

    let task = match state.store.update(&id, patch) {
        Ok(Some(task)) => task,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Task not found" })),
            );
        }
        Err(err) => {
            error!(error = %err, task_id = %id, "failed to update task");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Could not update the task" })),
            );
        }
    };

    // Tasks that were never mirrored get a create attempt, so an earlier
    // calendar outage heals on the next edit.
    let task = if task.calendar_event_id.is_some() {
        match state.calendar.update_event(&task).await {
            Ok(_) => task,
            Err(err) => {
                error!(error = %err, task_id = %task.id, "calendar event update failed");
                task
            }
        }
    } else {
        mirror_create(&state, task).await
    };

    (
        StatusCode::OK,
        Json(serde_json::to_value(task).unwrap_or(json!({}))),
    )
}

async fn delete_task(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.delete(&id) {
        Ok(Some(removed)) => {
            if let Err(err) = state.calendar.delete_event(&removed).await {
                error!(error = %err, task_id = %removed.id, "calendar event delete failed");
            }
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Task not found" })),
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, task_id = %id, "failed to delete task");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Could not delete the task" })),
            )
                .into_response()
        }
    }
}

/// Try to mirror a freshly written task to the calendar and record the won
/// event id on the stored record. Every failure path returns the task as it
/// was persisted by the primary write.
async fn mirror_create(state: &AppState, task: Task) -> Task {
    match state.calendar.create_event(&task).await {
        Ok(Some(event_id)) => {
            match state
                .store
                .update(&task.id, TaskPatch::calendar_event(event_id))
            {
                Ok(Some(synced)) => synced,
                // Deleted between the write and the mirror; nothing to record.
                Ok(None) => task,
                Err(err) => {
                    error!(error = %err, task_id = %task.id, "failed to record calendar event id");
                    task
                }
            }
        }
        Ok(None) => task,
        Err(err) => {
            error!(error = %err, task_id = %task.id, "calendar event create failed");
            task
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::calendar::CalendarService;
    use crate::notifications::mailer::Mailer;
    use crate::store::TaskStore;

    fn test_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(TaskStore::open(dir.path().join("tasks.json")).unwrap());
        let timezone = chrono_tz::America::Sao_Paulo;
        let state = AppState {
            store,
            calendar: Arc::new(CalendarService::new(None, timezone, 60)),
            mailer: Arc::new(Mailer::new(None)),
            timezone,
            cors_origins: vec!["*".into()],
        };
        (state, dir)
    }

    fn draft(title: &str, date: &str) -> TaskDraft {
        TaskDraft {
            title: Some(title.into()),
            date: date.parse().ok(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_returns_201_with_defaults() {
        let (state, _dir) = test_state();
        let (status, Json(body)) =
            create_task(State(state), Ok(Json(draft("X", "2024-01-01")))).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["time"], "09:00");
        assert_eq!(body["category"], "other");
        assert_eq!(body["priority"], "medium");
        assert_eq!(body["calendarEventId"], Value::Null);
        assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn create_without_title_is_400_and_persists_nothing() {
        let (state, _dir) = test_state();
        let (status, Json(body)) = create_task(
            State(state.clone()),
            Ok(Json(TaskDraft {
                date: "2024-01-01".parse().ok(),
                ..Default::default()
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().is_some());
        assert!(state.store.list(&TaskFilter::All).is_empty());
    }

    #[tokio::test]
    async fn list_filters_by_exact_date() {
        let (state, _dir) = test_state();
        state.store.create(draft("a", "2024-01-01")).unwrap();
        state.store.create(draft("b", "2024-01-02")).unwrap();

        let query = TasksQuery {
            date: "2024-01-01".parse().ok(),
            from: None,
            to: None,
        };
        let (status, Json(body)) = list_tasks(State(state), Query(query)).await;

        assert_eq!(status, StatusCode::OK);
        let tasks = body.as_array().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0]["title"], "a");
    }

    #[tokio::test]
    async fn update_unknown_id_is_404() {
        let (state, _dir) = test_state();
        let (status, Json(body)) = update_task(
            State(state),
            Path("nope".into()),
            Ok(Json(TaskPatch::default())),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Task not found");
    }

    #[tokio::test]
    async fn update_merges_partial_patch() {
        let (state, _dir) = test_state();
        let task = state.store.create(draft("Standup", "2024-01-01")).unwrap();

        let patch = TaskPatch {
            time: Some("14:30".into()),
            ..Default::default()
        };
        let (status, Json(body)) =
            update_task(State(state), Path(task.id.clone()), Ok(Json(patch))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["time"], "14:30");
        assert_eq!(body["title"], "Standup");
    }

    #[tokio::test]
    async fn delete_twice_is_204_then_404() {
        let (state, _dir) = test_state();
        let task = state.store.create(draft("a", "2024-01-01")).unwrap();

        let first = delete_task(State(state.clone()), Path(task.id.clone())).await;
        assert_eq!(first.status(), StatusCode::NO_CONTENT);

        let second = delete_task(State(state), Path(task.id)).await;
        assert_eq!(second.status(), StatusCode::NOT_FOUND);
    }
}
