//! Server configuration

/// Server configuration loaded from environment variables
pub struct Config {
    /// EHR database; the in-memory store is used when unset
    pub database_url: Option<String>,
    pub bind_address: String,
    /// Externally visible base URL, used for bundle links and entry URLs
    pub public_base_url: String,
    pub cors_origins: Vec<String>,
    pub rate_limit_rps: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.is_empty()),
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|origins| parse_origins(&origins))
                .unwrap_or_else(|_| vec!["*".to_string()]),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|rps| rps.parse().ok())
                .unwrap_or(100),
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://a.example, http://b.example,,"),
            vec!["http://a.example", "http://b.example"]
        );
    }
}
