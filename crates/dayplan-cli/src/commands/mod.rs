pub mod add;
pub mod edit;
pub mod list;
pub mod remove;
pub mod summary;

use tracing::warn;

use dayplan_shared::schemas::Task;

use crate::api::ApiClient;
use crate::cache::TaskCache;
use crate::config::Configuration;

pub(crate) struct Context {
    pub api: ApiClient,
    pub cache: TaskCache,
}

pub(crate) fn context() -> anyhow::Result<Context> {
    let config = Configuration::create()?;
    Ok(Context {
        api: ApiClient::new(&config)?,
        cache: TaskCache::new(config.cache_path),
    })
}

/// Refresh the local fallback copy with the authoritative list. Called after
/// every successful hub mutation; a refresh failure only costs freshness.
pub(crate) async fn refresh_cache(api: &ApiClient, cache: &TaskCache) {
    match api.list_tasks().await {
        Ok(tasks) => cache.save(&tasks),
        Err(err) => warn!(error = %err, "could not refresh task cache"),
    }
}

pub(crate) fn print_tasks(tasks: &[Task]) {
    for task in tasks {
        println!(
            "  {}  {}  {:<32} [{}/{}]  {}",
            task.date,
            task.time,
            task.title,
            task.category,
            task.priority,
            task.id,
        );
    }
}
