//! Recurring trigger for the daily summary.
//!
//! Fires once per calendar day at the configured wall time in the
//! configured timezone. A failed run is logged and the loop keeps going.

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::store::TaskStore;

use super::mailer::Mailer;
use super::summary::run_daily_summary;

pub fn spawn(
    store: Arc<TaskStore>,
    mailer: Arc<Mailer>,
    timezone: Tz,
    fire_at: NaiveTime,
) -> JoinHandle<()> {
    info!(timezone = %timezone.name(), fire_at = %fire_at.format("%H:%M"), "daily summary scheduler started");

    tokio::spawn(async move {
        loop {
            let now_local = Utc::now().with_timezone(&timezone).naive_local();
            let wait = duration_until_fire(now_local, fire_at)
                .to_std()
                .unwrap_or_default();
            tokio::time::sleep(wait).await;

            let today = Utc::now().with_timezone(&timezone).date_naive();
            match run_daily_summary(&store, &mailer, today, None).await {
                Ok(outcome) => {
                    info!(date = %today, outcome = ?outcome, "scheduled daily summary finished")
                }
                Err(err) => error!(error = %err, date = %today, "scheduled daily summary failed"),
            }
        }
    })
}

/// Time until the next occurrence of `fire_at`, from `now_local`. Always in
/// the future, so a run that just fired waits a full day.
fn duration_until_fire(now_local: NaiveDateTime, fire_at: NaiveTime) -> Duration {
    let today_fire = now_local.date().and_time(fire_at);
    let next = if now_local < today_fire {
        today_fire
    } else {
        today_fire + Duration::days(1)
    };
    next - now_local
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn fires_later_today_when_time_not_reached() {
        let fire_at = NaiveTime::from_hms_opt(7, 0, 0).unwrap();
        assert_eq!(duration_until_fire(at(6, 0), fire_at), Duration::hours(1));
    }

    #[test]
    fn fires_tomorrow_when_time_already_passed() {
        let fire_at = NaiveTime::from_hms_opt(7, 0, 0).unwrap();
        assert_eq!(
            duration_until_fire(at(8, 0), fire_at),
            Duration::hours(23)
        );
    }

    #[test]
    fn exact_fire_time_waits_a_full_day() {
        let fire_at = NaiveTime::from_hms_opt(7, 0, 0).unwrap();
        assert_eq!(duration_until_fire(at(7, 0), fire_at), Duration::days(1));
    }
}
