use std::env;
use std::str::FromStr;

/// Which document store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            other => anyhow::bail!("Unknown EVENTOS_STORE backend: {}", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub credentials_path: String,
    pub project_id: Option<String>,
    pub database_id: String,
    pub emulator_host: Option<String>,
    pub store_timeout_secs: u64,
    pub store_backend: StoreBackend,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            credentials_path: env::var("GOOGLE_APPLICATION_CREDENTIALS")
                .unwrap_or_else(|_| "./beyond-vue-firebase-admin.json".to_string()),
            project_id: non_empty_var("FIRESTORE_PROJECT_ID"),
            database_id: env::var("FIRESTORE_DATABASE")
                .unwrap_or_else(|_| "(default)".to_string()),
            emulator_host: non_empty_var("FIRESTORE_EMULATOR_HOST"),
            store_timeout_secs: env::var("STORE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            store_backend: env::var("EVENTOS_STORE")
                .unwrap_or_else(|_| "firestore".to_string())
                .parse()?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
