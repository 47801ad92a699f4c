use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveTime;
use chrono_tz::Tz;

use dayplan_shared::timeutil;

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Sao_Paulo;
const DEFAULT_EVENT_DURATION_MIN: i64 = 60;
const DEFAULT_SUMMARY_TIME: &str = "07:00";

/// Credentials for the external calendar. All of them are required for the
/// mirror to be active; any missing variable disables it.
#[derive(Debug, Clone)]
pub struct CalendarConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub calendar_id: String,
}

/// Credentials for the mail-delivery API. `default_to` may still be absent,
/// in which case only explicitly supplied recipients are usable.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub api_url: String,
    pub api_token: String,
    pub from: String,
    pub default_to: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Configuration {
    pub data_dir: PathBuf,
    pub tasks_path: PathBuf,
    pub listen_host: String,
    pub listen_port: u16,
    pub cors_origins: Vec<String>,
    pub timezone: Tz,
    pub default_event_duration_min: i64,
    pub daily_summary_time: NaiveTime,
    pub calendar: Option<CalendarConfig>,
    pub mail: Option<MailerConfig>,
}

impl Configuration {
    pub fn create() -> Result<Self> {
        // Resolve data directory: DAYPLAN_HOME env or ~/.dayplan
        let data_dir = if let Some(home) = env_opt("DAYPLAN_HOME") {
            PathBuf::from(home)
        } else {
            let home = dirs_next::home_dir()
                .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
            home.join(".dayplan")
        };
        std::fs::create_dir_all(&data_dir)?;

        // Durable task document: TASKS_PATH env or {data_dir}/tasks.json
        let tasks_path = match env_opt("TASKS_PATH") {
            Some(p) => PathBuf::from(p),
            None => data_dir.join("tasks.json"),
        };

        let listen_host = env_opt("LISTEN_HOST").unwrap_or_else(|| "127.0.0.1".into());
        let listen_port = match env_opt("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT is not a valid port number: {raw}"))?,
            None => DEFAULT_PORT,
        };

        let cors_origins = match env_opt("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            None => vec!["*".to_string()],
        };

        let timezone = match env_opt("TIMEZONE") {
            Some(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("TIMEZONE is not a known IANA timezone: {raw}"))?,
            None => DEFAULT_TIMEZONE,
        };

        let default_event_duration_min = match env_opt("DEFAULT_TASK_DURATION_MIN") {
            Some(raw) => raw.parse().map_err(|_| {
                anyhow::anyhow!("DEFAULT_TASK_DURATION_MIN is not a number of minutes: {raw}")
            })?,
            None => DEFAULT_EVENT_DURATION_MIN,
        };

        let summary_raw = env_opt("DAILY_SUMMARY_TIME").unwrap_or_else(|| DEFAULT_SUMMARY_TIME.into());
        let daily_summary_time = timeutil::parse_hhmm(&summary_raw).ok_or_else(|| {
            anyhow::anyhow!("DAILY_SUMMARY_TIME must be HH:MM, got: {summary_raw}")
        })?;

        let calendar = match (
            env_opt("GOOGLE_CLIENT_ID"),
            env_opt("GOOGLE_CLIENT_SECRET"),
            env_opt("GOOGLE_REFRESH_TOKEN"),
            env_opt("GOOGLE_CALENDAR_ID"),
        ) {
            (Some(client_id), Some(client_secret), Some(refresh_token), Some(calendar_id)) => {
                Some(CalendarConfig {
                    client_id,
                    client_secret,
                    refresh_token,
                    calendar_id,
                })
            }
            _ => None,
        };

        let mail = match (
            env_opt("MAIL_API_URL"),
            env_opt("MAIL_API_TOKEN"),
            env_opt("MAIL_FROM"),
        ) {
            (Some(api_url), Some(api_token), Some(from)) => Some(MailerConfig {
                api_url,
                api_token,
                from,
                default_to: env_opt("MAIL_TO"),
            }),
            _ => None,
        };

        Ok(Configuration {
            data_dir,
            tasks_path,
            listen_host,
            listen_port,
            cors_origins,
            timezone,
            default_event_duration_min,
            daily_summary_time,
            calendar,
            mail,
        })
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
