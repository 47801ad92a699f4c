use anyhow::Result;
use chrono::{Local, NaiveDate};
use tracing::warn;

use dayplan_shared::timeutil::week_bounds;

use super::{context, print_tasks, refresh_cache};

pub async fn run(date: Option<NaiveDate>, week: bool, all: bool) -> Result<()> {
    let ctx = context()?;
    let today = Local::now().date_naive();

    enum Scope {
        All,
        Day(NaiveDate),
        Week(NaiveDate, NaiveDate),
    }

    let scope = if all {
        Scope::All
    } else if week {
        let (from, to) = week_bounds(today);
        Scope::Week(from, to)
    } else {
        Scope::Day(date.unwrap_or(today))
    };

    let fetched = match &scope {
        Scope::All => ctx.api.list_tasks().await,
        Scope::Day(day) => ctx.api.tasks_by_date(*day).await,
        Scope::Week(from, to) => ctx.api.tasks_between(*from, *to).await,
    };

    let (mut tasks, from_cache) = match fetched {
        Ok(tasks) => {
            match &scope {
                // The full list IS the authoritative view; skip the extra fetch.
                Scope::All => ctx.cache.save(&tasks),
                _ => refresh_cache(&ctx.api, &ctx.cache).await,
            }
            (tasks, false)
        }
        Err(err) => {
            warn!(error = %err, "hub unreachable; falling back to cached tasks");
            let mut cached = ctx.cache.load();
            match &scope {
                Scope::All => {}
                Scope::Day(day) => cached.retain(|t| t.date == *day),
                Scope::Week(from, to) => cached.retain(|t| t.date >= *from && t.date <= *to),
            }
            (cached, true)
        }
    };

    tasks.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.time.cmp(&b.time)));

    let heading = match &scope {
        Scope::All => "All tasks".to_string(),
        Scope::Day(day) => format!("Tasks for {day}"),
        Scope::Week(from, to) => format!("Tasks for {from} - {to}"),
    };
    if from_cache {
        println!("{heading} (cached copy; hub unreachable)");
    } else {
        println!("{heading}");
    }

    if tasks.is_empty() {
        println!("  no tasks");
    } else {
        print_tasks(&tasks);
    }

    Ok(())
}
