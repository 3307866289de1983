use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::Duration;

use crate::error::{Error, Result};

const SNAPSHOT_FILE: &str = "shaderhub.json";
/// Ten years.
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// How long a login session stays valid.
    pub session_ttl_hours: i64,
    /// Seed the default tag vocabulary when the data directory is empty.
    pub seed_defaults: bool,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_FILE)
    }

    /// Session lifetime, at least one hour. Values past ten years are
    /// rejected so token expiry stays inside the representable date range.
    pub fn session_ttl(&self) -> Result<Duration> {
        let hours = self.session_ttl_hours.max(1);
        if hours > MAX_SESSION_TTL_HOURS {
            return Err(Error::Config(format!(
                "session TTL of {hours} hours exceeds the maximum of {MAX_SESSION_TTL_HOURS}"
            )));
        }
        Duration::try_hours(hours)
            .ok_or_else(|| Error::Config(format!("invalid session TTL: {hours} hours")))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            session_ttl_hours: 24,
            seed_defaults: true,
        }
    }
}
