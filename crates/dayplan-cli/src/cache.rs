//! Local fallback copy of the task list.
//!
//! The cache is disposable and non-authoritative: it is overwritten
//! wholesale after every successful hub operation and read only when the
//! hub is unreachable. Its own failures are logged and never surfaced.

use std::path::{Path, PathBuf};

use tracing::warn;

use dayplan_shared::schemas::Task;

pub struct TaskCache {
    path: PathBuf,
}

impl TaskCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Last successfully cached list, or empty when the cache is missing or
    /// unreadable.
    pub fn load(&self) -> Vec<Task> {
        let Ok(raw) = std::fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_default()
    }

    /// Replace the cached list. Best-effort: failures are logged, never
    /// returned.
    pub fn save(&self, tasks: &[Task]) {
        if let Err(err) = self.write(tasks) {
            warn!(error = %err, path = %self.path.display(), "could not write task cache");
        }
    }

    fn write(&self, tasks: &[Task]) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(tasks)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use dayplan_shared::schemas::{Category, Priority};

    fn task(title: &str) -> Task {
        Task {
            id: "t1".into(),
            title: title.into(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            time: "09:00".into(),
            end_time: None,
            category: Category::Other,
            priority: Priority::Medium,
            calendar_event_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TaskCache::new(dir.path().join("cache.json"));

        cache.save(&[task("a"), task("b")]);
        let loaded = cache.load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].title, "a");
    }

    #[test]
    fn missing_cache_loads_empty() {
        let cache = TaskCache::new("/nonexistent/cache.json");
        assert!(cache.load().is_empty());
    }

    #[test]
    fn corrupt_cache_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{not json").unwrap();

        let cache = TaskCache::new(&path);
        assert!(cache.load().is_empty());
    }

    #[test]
    fn save_overwrites_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TaskCache::new(dir.path().join("cache.json"));

        cache.save(&[task("a"), task("b")]);
        cache.save(&[task("c")]);
        let loaded = cache.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "c");
    }
}
