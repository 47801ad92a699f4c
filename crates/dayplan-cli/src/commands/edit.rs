use anyhow::{bail, Result};
use chrono::NaiveDate;

use dayplan_shared::schemas::TaskPatch;

use super::{context, refresh_cache};

#[allow(clippy::too_many_arguments)]
pub async fn run(
    id: String,
    title: Option<String>,
    date: Option<NaiveDate>,
    time: Option<String>,
    end_time: Option<String>,
    description: Option<String>,
    category: Option<String>,
    priority: Option<String>,
) -> Result<()> {
    let ctx = context()?;

    let patch = TaskPatch {
        title,
        description,
        date,
        time,
        end_time,
        category: category.map(|c| c.parse().unwrap_or_default()),
        priority: priority.map(|p| p.parse().unwrap_or_default()),
        calendar_event_id: None,
    };

    let Some(task) = ctx.api.update_task(&id, &patch).await? else {
        bail!("no task with id {id}");
    };

    println!(
        "Updated {} {} - {} [{}/{}]",
        task.date, task.time, task.title, task.category, task.priority
    );

    refresh_cache(&ctx.api, &ctx.cache).await;
    Ok(())
}
