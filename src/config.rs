// Runtime settings. Everything comes from environment variables with sane
// defaults so the tool runs with no setup at all.

use crate::error::ConfigError;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "https://api.hh.ru";
pub const DEFAULT_PER_PAGE: u32 = 100;
/// The API refuses page sizes above this.
pub const MAX_PER_PAGE: u32 = 100;
pub const DB_FILE_NAME: &str = "vacancies_hh_ru.db";

/// Resolved configuration passed explicitly to the components that need it.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub user_agent: String,
    pub per_page: u32,
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
}

impl Settings {
    /// Build settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = get("HH_API_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.into());
        let user_agent = get("HH_USER_AGENT")
            .unwrap_or_else(|| format!("hh-vacancies/{}", env!("CARGO_PKG_VERSION")));

        let per_page = match get("HH_PER_PAGE") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if (1..=MAX_PER_PAGE).contains(&n) => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "HH_PER_PAGE",
                        expected: "an integer between 1 and 100",
                        value: raw,
                    })
                }
            },
            None => DEFAULT_PER_PAGE,
        };

        let db_path = get("VACANCIES_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);
        let data_dir = get("VACANCIES_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));

        Ok(Settings {
            api_url,
            user_agent,
            per_page,
            db_path,
            data_dir,
        })
    }

    pub fn vacancies_file(&self) -> PathBuf {
        self.data_dir.join("vacancies.json")
    }

    pub fn employers_file(&self) -> PathBuf {
        self.data_dir.join("employers.json")
    }
}

/// `<local data dir>/hh_vacancies/vacancies_hh_ru.db`, or the working
/// directory when the platform has no data dir.
fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("hh_vacancies"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DB_FILE_NAME)
}
