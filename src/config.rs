//! Server configuration from environment variables.

#[derive(Clone, Debug)]
pub struct Config {
    /// When unset the server falls back to the in-memory store.
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub log_level: String,
    /// Roles allowed to create, update and delete records.
    pub write_roles: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "carbook=info".into());
        let write_roles = std::env::var("WRITE_ROLES")
            .map(|s| {
                s.split(',')
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .collect::<Vec<_>>()
            })
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| vec!["admin".to_string()]);
        Config {
            database_url,
            bind_addr,
            log_level,
            write_roles,
        }
    }
}
