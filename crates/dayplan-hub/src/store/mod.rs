pub mod types;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use dayplan_shared::schemas::{Task, TaskDraft, TaskPatch};
use dayplan_shared::timeutil::DEFAULT_TASK_TIME;

pub use types::{StoreError, TaskFilter};

/// Shape of the durable document: `{ "tasks": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    tasks: Vec<Task>,
}

/// Authoritative, durable task collection.
///
/// The whole document lives in memory behind a mutex and is flushed
/// synchronously on every mutation, so writers serialize and a reader never
/// observes a half-written collection. Each flush goes through a temp file
/// and an atomic rename. Mutations commit to memory only after the flush
/// succeeds; a failed write leaves no phantom record.
pub struct TaskStore {
    path: PathBuf,
    doc: Mutex<StoreDocument>,
}

impl TaskStore {
    /// Open the store at `path`, initializing an empty collection when the
    /// file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let doc = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            let doc = StoreDocument::default();
            write_document(&path, &doc)?;
            info!(path = %path.display(), "initialized empty task document");
            doc
        };

        Ok(Self {
            path,
            doc: Mutex::new(doc),
        })
    }

    /// Tasks matching `filter`, in storage order. Ordering for display is a
    /// view concern.
    pub fn list(&self, filter: &TaskFilter) -> Vec<Task> {
        let doc = self.doc.lock().unwrap();
        doc.tasks
            .iter()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect()
    }

    /// Validate `draft`, assign a fresh id and timestamps, apply field
    /// defaults, append and persist.
    pub fn create(&self, draft: TaskDraft) -> Result<Task, StoreError> {
        let title = draft.title.as_deref().map(str::trim).unwrap_or("");
        if title.is_empty() {
            return Err(StoreError::Validation("\"title\" is required".into()));
        }
        let Some(date) = draft.date else {
            return Err(StoreError::Validation("\"date\" is required".into()));
        };

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: draft.description.unwrap_or_default(),
            date,
            time: non_blank(draft.time).unwrap_or_else(|| DEFAULT_TASK_TIME.to_string()),
            end_time: non_blank(draft.end_time),
            category: draft.category.unwrap_or_default(),
            priority: draft.priority.unwrap_or_default(),
            calendar_event_id: None,
            created_at: now,
            updated_at: now,
        };

        let mut doc = self.doc.lock().unwrap();
        let mut next = doc.clone();
        next.tasks.push(task.clone());
        write_document(&self.path, &next)?;
        *doc = next;
        Ok(task)
    }

    /// Merge `patch` onto the task with `id`, refresh `updated_at` and
    /// persist. `Ok(None)` when no task has that id.
    pub fn update(&self, id: &str, patch: TaskPatch) -> Result<Option<Task>, StoreError> {
        let mut doc = self.doc.lock().unwrap();
        let Some(index) = doc.tasks.iter().position(|task| task.id == id) else {
            return Ok(None);
        };

        let mut next = doc.clone();
        let task = &mut next.tasks[index];
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(date) = patch.date {
            task.date = date;
        }
        if let Some(time) = patch.time {
            task.time = time;
        }
        if let Some(end_time) = patch.end_time {
            task.end_time = Some(end_time);
        }
        if let Some(category) = patch.category {
            task.category = category;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(event_id) = patch.calendar_event_id {
            task.calendar_event_id = Some(event_id);
        }
        task.updated_at = Utc::now();
        let merged = task.clone();

        write_document(&self.path, &next)?;
        *doc = next;
        Ok(Some(merged))
    }

    /// Remove and return the task with `id`. `Ok(None)` when unknown.
    pub fn delete(&self, id: &str) -> Result<Option<Task>, StoreError> {
        let mut doc = self.doc.lock().unwrap();
        let Some(index) = doc.tasks.iter().position(|task| task.id == id) else {
            return Ok(None);
        };

        let mut next = doc.clone();
        let removed = next.tasks.remove(index);
        write_document(&self.path, &next)?;
        *doc = next;
        Ok(Some(removed))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Full-document atomic write: temp file, then rename over the target.
fn write_document(path: &Path, doc: &StoreDocument) -> Result<(), StoreError> {
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(doc)?;
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dayplan_shared::schemas::{Category, Priority};

    fn test_store() -> (TaskStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::open(dir.path().join("tasks.json")).unwrap();
        (store, dir)
    }

    fn draft(title: &str, date: &str) -> TaskDraft {
        TaskDraft {
            title: Some(title.into()),
            date: date.parse().ok(),
            ..Default::default()
        }
    }

    #[test]
    fn open_initializes_missing_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("tasks.json");
        let store = TaskStore::open(&path).unwrap();

        assert!(path.exists());
        assert!(store.list(&TaskFilter::All).is_empty());

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["tasks"], serde_json::json!([]));
    }

    #[test]
    fn create_applies_defaults() {
        let (store, _dir) = test_store();
        let task = store.create(draft("X", "2024-01-01")).unwrap();

        assert_eq!(task.time, "09:00");
        assert_eq!(task.category, Category::Other);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.description, "");
        assert!(task.calendar_event_id.is_none());
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn create_rejects_missing_or_blank_title() {
        let (store, _dir) = test_store();

        let err = store.create(draft("   ", "2024-01-01")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let err = store
            .create(TaskDraft {
                date: "2024-01-01".parse().ok(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        // Nothing was persisted.
        assert!(store.list(&TaskFilter::All).is_empty());
        let reopened = TaskStore::open(store.path()).unwrap();
        assert!(reopened.list(&TaskFilter::All).is_empty());
    }

    #[test]
    fn create_rejects_missing_date() {
        let (store, _dir) = test_store();
        let err = store
            .create(TaskDraft {
                title: Some("X".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn list_by_exact_date() {
        let (store, _dir) = test_store();
        store.create(draft("a", "2024-01-01")).unwrap();
        store.create(draft("b", "2024-01-02")).unwrap();
        store.create(draft("c", "2024-01-01")).unwrap();

        let day = TaskFilter::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let tasks = store.list(&day);
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.date.to_string() == "2024-01-01"));
    }

    #[test]
    fn range_includes_both_bounds() {
        let (store, _dir) = test_store();
        store.create(draft("before", "2024-01-14")).unwrap();
        store.create(draft("from", "2024-01-15")).unwrap();
        store.create(draft("mid", "2024-01-17")).unwrap();
        store.create(draft("to", "2024-01-21")).unwrap();
        store.create(draft("after", "2024-01-22")).unwrap();

        let range = TaskFilter::Range {
            from: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            to: NaiveDate::from_ymd_opt(2024, 1, 21).unwrap(),
        };
        let titles: Vec<_> = store.list(&range).into_iter().map(|t| t.title).collect();
        assert_eq!(titles, ["from", "mid", "to"]);
    }

    #[test]
    fn update_merges_partial_fields() {
        let (store, _dir) = test_store();
        let task = store
            .create(TaskDraft {
                title: Some("Standup".into()),
                date: "2024-01-01".parse().ok(),
                category: Some(Category::Work),
                ..Default::default()
            })
            .unwrap();

        std::thread::sleep(std::time::Duration::from_millis(5));
        let merged = store
            .update(
                &task.id,
                TaskPatch {
                    time: Some("14:30".into()),
                    ..Default::default()
                },
            )
            .unwrap()
            .expect("task exists");

        assert_eq!(merged.time, "14:30");
        assert_eq!(merged.title, "Standup");
        assert_eq!(merged.category, Category::Work);
        assert_eq!(merged.created_at, task.created_at);
        assert!(merged.updated_at > task.updated_at);
    }

    #[test]
    fn update_unknown_id_returns_none() {
        let (store, _dir) = test_store();
        store.create(draft("a", "2024-01-01")).unwrap();

        let result = store.update("nope", TaskPatch::default()).unwrap();
        assert!(result.is_none());
        assert_eq!(store.list(&TaskFilter::All).len(), 1);
    }

    #[test]
    fn delete_twice_returns_record_then_none() {
        let (store, _dir) = test_store();
        let task = store.create(draft("a", "2024-01-01")).unwrap();

        let removed = store.delete(&task.id).unwrap().expect("first delete");
        assert_eq!(removed.id, task.id);
        assert!(store.delete(&task.id).unwrap().is_none());
        assert!(store.list(&TaskFilter::All).is_empty());
    }

    #[test]
    fn reopen_sees_persisted_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");

        {
            let store = TaskStore::open(&path).unwrap();
            for i in 0..5 {
                store.create(draft(&format!("task-{i}"), "2024-03-01")).unwrap();
            }
        }

        let store = TaskStore::open(&path).unwrap();
        let tasks = store.list(&TaskFilter::All);
        assert_eq!(tasks.len(), 5);
        assert!(tasks.iter().all(|t| !t.id.is_empty()));
        assert_eq!(tasks[0].title, "task-0");
    }
}
