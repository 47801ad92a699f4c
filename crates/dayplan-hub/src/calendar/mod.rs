//! Best-effort mirror of tasks into Google Calendar.
//!
//! The mirror never originates tasks; it only derives events from stored
//! records and annotates them with the external event id. Callers invoke it
//! after the store write commits and are expected to catch and log failures
//! rather than propagate them.

use anyhow::{bail, Context, Result};
use chrono::offset::LocalResult;
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use dayplan_shared::schemas::Task;
use dayplan_shared::timeutil;

use crate::config::CalendarConfig;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const CALENDARS_URL: &str = "https://www.googleapis.com/calendar/v3/calendars";

/// Access tokens are refreshed this many seconds before they expire.
const TOKEN_EXPIRY_SLACK_SECS: i64 = 60;

pub struct CalendarService {
    config: Option<CalendarConfig>,
    http: reqwest::Client,
    timezone: Tz,
    default_duration: Duration,
    token: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventPayload {
    summary: String,
    description: String,
    start: EventTime,
    end: EventTime,
    reminders: EventReminders,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    date_time: String,
    time_zone: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventReminders {
    use_default: bool,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Deserialize)]
struct CreatedEvent {
    id: String,
}

impl CalendarService {
    pub fn new(config: Option<CalendarConfig>, timezone: Tz, default_duration_min: i64) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            timezone,
            default_duration: Duration::minutes(default_duration_min),
            token: Mutex::new(None),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Insert a new event for `task`. `Ok(None)` when the mirror is not
    /// configured; this is a no-op, not an error.
    pub async fn create_event(&self, task: &Task) -> Result<Option<String>> {
        let Some(config) = &self.config else {
            return Ok(None);
        };

        let payload = self.event_payload(task)?;
        let token = self.access_token(config).await?;
        let resp = self
            .http
            .post(format!("{CALENDARS_URL}/{}/events", config.calendar_id))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!("calendar event insert failed ({status}): {text}");
        }

        let created: CreatedEvent = resp.json().await?;
        Ok(Some(created.id))
    }

    /// Push the derived payload to the task's existing event. No-op without
    /// an event id or configuration.
    pub async fn update_event(&self, task: &Task) -> Result<Option<String>> {
        let Some(config) = &self.config else {
            return Ok(None);
        };
        let Some(event_id) = &task.calendar_event_id else {
            return Ok(None);
        };

        let payload = self.event_payload(task)?;
        let token = self.access_token(config).await?;
        let resp = self
            .http
            .patch(format!(
                "{CALENDARS_URL}/{}/events/{event_id}",
                config.calendar_id
            ))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!("calendar event patch failed ({status}): {text}");
        }

        Ok(Some(event_id.clone()))
    }

    /// Remove the task's event. An event that is already gone (404/410) is
    /// success, not failure.
    pub async fn delete_event(&self, task: &Task) -> Result<()> {
        let Some(config) = &self.config else {
            return Ok(());
        };
        let Some(event_id) = &task.calendar_event_id else {
            return Ok(());
        };

        let token = self.access_token(config).await?;
        let resp = self
            .http
            .delete(format!(
                "{CALENDARS_URL}/{}/events/{event_id}",
                config.calendar_id
            ))
            .bearer_auth(&token)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() || status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Ok(());
        }

        let text = resp.text().await.unwrap_or_default();
        bail!("calendar event delete failed ({status}): {text}");
    }

    /// Event window: start at `date`+`time` in the configured timezone, end
    /// at the explicit `endTime` or start + default duration. Both sides are
    /// converted to absolute instants before transmission.
    fn event_payload(&self, task: &Task) -> Result<EventPayload> {
        let time = timeutil::parse_hhmm(&task.time)
            .with_context(|| format!("task {} has unparseable time {:?}", task.id, task.time))?;
        let start = self.to_instant(task.date.and_time(time))?;

        let end = match task.end_time.as_deref().and_then(timeutil::parse_hhmm) {
            Some(end_time) => self.to_instant(task.date.and_time(end_time))?,
            None => start + self.default_duration,
        };

        Ok(EventPayload {
            summary: task.title.clone(),
            description: task.description.clone(),
            start: EventTime {
                date_time: start.to_rfc3339(),
                time_zone: self.timezone.name().to_string(),
            },
            end: EventTime {
                date_time: end.to_rfc3339(),
                time_zone: self.timezone.name().to_string(),
            },
            reminders: EventReminders { use_default: true },
        })
    }

    fn to_instant(&self, wall: NaiveDateTime) -> Result<DateTime<Utc>> {
        match self.timezone.from_local_datetime(&wall) {
            LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
            // DST fold: take the earlier offset.
            LocalResult::Ambiguous(dt, _) => Ok(dt.with_timezone(&Utc)),
            LocalResult::None => bail!(
                "wall time {wall} does not exist in {}",
                self.timezone.name()
            ),
        }
    }

    async fn access_token(&self, config: &CalendarConfig) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Utc::now() {
                return Ok(token.access_token.clone());
            }
        }

        let params = [
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("refresh_token", config.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];
        let resp = self
            .http
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .context("calendar token refresh request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!("calendar token refresh failed ({status}): {text}");
        }

        let token: TokenResponse = resp.json().await?;
        let access = token.access_token.clone();
        *cached = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Utc::now()
                + Duration::seconds((token.expires_in - TOKEN_EXPIRY_SLACK_SECS).max(0)),
        });
        Ok(access)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use dayplan_shared::schemas::{Category, Priority};

    fn service() -> CalendarService {
        CalendarService::new(None, chrono_tz::America::Sao_Paulo, 60)
    }

    fn task() -> Task {
        Task {
            id: "t1".into(),
            title: "Dentist".into(),
            description: "Cleaning".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            time: "09:00".into(),
            end_time: None,
            category: Category::Personal,
            priority: Priority::Medium,
            calendar_event_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn payload_converts_wall_time_to_utc() {
        // Sao Paulo is UTC-3 year-round since 2019.
        let payload = service().event_payload(&task()).unwrap();
        assert_eq!(payload.start.date_time, "2024-01-15T12:00:00+00:00");
        assert_eq!(payload.start.time_zone, "America/Sao_Paulo");
        assert_eq!(payload.summary, "Dentist");
    }

    #[test]
    fn missing_end_time_uses_default_duration() {
        let payload = service().event_payload(&task()).unwrap();
        assert_eq!(payload.end.date_time, "2024-01-15T13:00:00+00:00");
    }

    #[test]
    fn explicit_end_time_wins_over_duration() {
        let mut task = task();
        task.end_time = Some("10:30".into());
        let payload = service().event_payload(&task).unwrap();
        assert_eq!(payload.end.date_time, "2024-01-15T13:30:00+00:00");
    }

    #[test]
    fn unparseable_time_is_an_error() {
        let mut task = task();
        task.time = "9am".into();
        assert!(service().event_payload(&task).is_err());
    }

    #[tokio::test]
    async fn unconfigured_mirror_is_a_no_op() {
        let service = service();
        let mut task = task();
        task.calendar_event_id = Some("evt1".into());

        assert!(!service.is_configured());
        assert_eq!(service.create_event(&task).await.unwrap(), None);
        assert_eq!(service.update_event(&task).await.unwrap(), None);
        service.delete_event(&task).await.unwrap();
    }
}
