use std::path::PathBuf;

const DEFAULT_DATA_FILE: &str = "leaderboard-data.json";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

/// Server settings, read from the environment at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_file: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Config {
            data_file: lookup("DATA_FILE")
                .unwrap_or_else(|| DEFAULT_DATA_FILE.into())
                .into(),
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.into()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
