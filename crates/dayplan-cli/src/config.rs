use std::path::PathBuf;

use anyhow::Result;

const DEFAULT_API_URL: &str = "http://127.0.0.1:4000";

#[derive(Debug, Clone)]
pub struct Configuration {
    pub api_url: String,
    pub data_dir: PathBuf,
    pub cache_path: PathBuf,
}

impl Configuration {
    pub fn create() -> Result<Self> {
        // Same data directory the hub uses: DAYPLAN_HOME env or ~/.dayplan
        let data_dir = if let Ok(home) = std::env::var("DAYPLAN_HOME") {
            PathBuf::from(home)
        } else {
            let home = dirs_next::home_dir()
                .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
            home.join(".dayplan")
        };
        std::fs::create_dir_all(&data_dir)?;

        let api_url = std::env::var("DAYPLAN_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.into())
            .trim_end_matches('/')
            .to_string();

        let cache_path = data_dir.join("cache.json");

        Ok(Configuration {
            api_url,
            data_dir,
            cache_path,
        })
    }
}
