//! Daily summary: fetch a day's tasks and dispatch a formatted report.

use anyhow::Result;
use chrono::NaiveDate;
use tracing::info;

use dayplan_shared::schemas::Task;

use crate::store::{TaskFilter, TaskStore};

use super::mailer::Mailer;

/// Terminal state of one summary run. Only `Sent` reached the mail API;
/// the other two are normal no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// Nothing scheduled for the date; nothing to report.
    NoTasks,
    Sent,
    /// Tasks existed but the channel is unconfigured or has no recipient.
    Skipped,
}

/// Compile and dispatch the summary for `date`. Empty days are a logged
/// no-op. Recipients fall back to the mailer's configured default.
pub async fn run_daily_summary(
    store: &TaskStore,
    mailer: &Mailer,
    date: NaiveDate,
    recipients: Option<&[String]>,
) -> Result<SummaryOutcome> {
    let mut tasks = store.list(&TaskFilter::Date(date));
    if tasks.is_empty() {
        info!(date = %date, "no tasks for date; daily summary not sent");
        return Ok(SummaryOutcome::NoTasks);
    }

    // Presentation order; the store itself does not sort.
    tasks.sort_by(|a, b| a.time.cmp(&b.time));

    let subject = format!("Dayplan - daily summary ({date})");
    let html = render_summary_html(date, &tasks);

    if mailer.send(recipients, &subject, &html).await? {
        info!(date = %date, tasks = tasks.len(), "daily summary sent");
        Ok(SummaryOutcome::Sent)
    } else {
        Ok(SummaryOutcome::Skipped)
    }
}

/// Render the report body: one table row per task, time ascending.
pub fn render_summary_html(date: NaiveDate, tasks: &[Task]) -> String {
    let heading = date.format("%A, %B %-d, %Y");

    let mut rows = String::new();
    for task in tasks {
        let description = if task.description.is_empty() {
            "-"
        } else {
            task.description.as_str()
        };
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&task.time),
            escape_html(&task.title),
            task.category,
            task.priority,
            escape_html(description),
        ));
    }

    format!(
        r#"<div style="font-family: Arial, sans-serif; color: #1f2937;">
  <h2 style="color: #10b981; margin-bottom: 8px;">Daily report - {heading}</h2>
  <p style="margin-bottom: 16px;">Here is what is planned for today:</p>
  <table role="presentation" cellspacing="0" cellpadding="6" style="width: 100%; border-collapse: collapse;">
    <thead>
      <tr style="background: #f3f4f6; text-align: left;">
        <th>Time</th><th>Title</th><th>Category</th><th>Priority</th><th>Notes</th>
      </tr>
    </thead>
    <tbody>
{rows}    </tbody>
  </table>
  <p style="margin-top: 24px; color: #6b7280;">Automated message from Dayplan.</p>
</div>"#
    )
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
