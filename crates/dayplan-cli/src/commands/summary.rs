use anyhow::Result;
use chrono::NaiveDate;

use crate::api::SummaryStatus;

use super::context;

pub async fn run(date: Option<NaiveDate>, recipients: Vec<String>) -> Result<()> {
    let ctx = context()?;

    match ctx.api.trigger_daily_summary(date, &recipients).await? {
        SummaryStatus::Queued => println!("Daily summary queued."),
        SummaryStatus::NoTasks => println!("No tasks for that date; nothing to send."),
    }
    Ok(())
}
