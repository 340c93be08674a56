use anyhow::Context;

const DATABASE_URL_VAR: &str = "DATABASE_URL";
const SERVER_PORT_VAR: &str = "SERVER_PORT";
const DEFAULT_SERVER_PORT: u16 = 8080;

/// Runtime settings for the catalog, read once from the environment at
/// startup. `DATABASE_URL` names the SQLite database and must be set;
/// `SERVER_PORT` falls back to 8080 when absent.
#[derive(Debug)]
pub struct Config {
    database_url: String,
    server_port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var(DATABASE_URL_VAR)
            .with_context(|| format!("Failed to load environment variable {DATABASE_URL_VAR}"))?;
        let server_port = parse_port(std::env::var(SERVER_PORT_VAR).ok())?;
        Ok(Self {
            database_url,
            server_port,
        })
    }

    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    #[must_use]
    pub const fn server_port(&self) -> u16 {
        self.server_port
    }
}

fn parse_port(raw: Option<String>) -> anyhow::Result<u16> {
    raw.map_or(Ok(DEFAULT_SERVER_PORT), |raw| {
        raw.parse()
            .with_context(|| format!("Failed to parse environment variable {SERVER_PORT_VAR}"))
    })
}
