use anyhow::Result;
use chrono::{Local, NaiveDate};

use dayplan_shared::schemas::TaskDraft;

use super::{context, refresh_cache};

#[allow(clippy::too_many_arguments)]
pub async fn run(
    title: String,
    date: Option<NaiveDate>,
    time: Option<String>,
    end_time: Option<String>,
    description: Option<String>,
    category: Option<String>,
    priority: Option<String>,
) -> Result<()> {
    let ctx = context()?;

    let draft = TaskDraft {
        title: Some(title),
        description,
        date: Some(date.unwrap_or_else(|| Local::now().date_naive())),
        time,
        end_time,
        category: category.map(|c| c.parse().unwrap_or_default()),
        priority: priority.map(|p| p.parse().unwrap_or_default()),
    };

    let task = ctx.api.create_task(&draft).await?;
    println!(
        "Created {} {} - {} [{}/{}]",
        task.date, task.time, task.title, task.category, task.priority
    );
    println!("  id: {}", task.id);
    if task.calendar_event_id.is_some() {
        println!("  calendar: synced");
    }

    refresh_cache(&ctx.api, &ctx.cache).await;
    Ok(())
}
