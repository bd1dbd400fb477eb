use anyhow::{Result, anyhow};

const DEFAULT_ORIGIN: &str = "http://localhost:5173";

/// Process-level settings read once at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub cors_allowed_origins: Vec<String>,
    /// Whether `/api/employees/search` is mounted. Published at
    /// `/api/capabilities` so clients can check before calling it.
    pub employee_search: bool,
    /// Run pre-checks and the mutation on one transaction.
    pub atomic_writes: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cors_allowed_origins: vec![DEFAULT_ORIGIN.to_string()],
            employee_search: true,
            atomic_writes: false,
        }
    }
}

impl AppConfig {
    /// Reads `CORS_ALLOWED_ORIGINS` (falling back to `FRONTEND_URL`),
    /// `HR_EMPLOYEE_SEARCH` and `HR_ATOMIC_WRITES`.
    pub fn load() -> Result<Self> {
        let origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .or_else(|_| std::env::var("FRONTEND_URL"))
            .unwrap_or_else(|_| DEFAULT_ORIGIN.into());
        let cors_allowed_origins = origins
            .split(',')
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect::<Vec<_>>();

        Ok(Self {
            cors_allowed_origins,
            employee_search: env_flag("HR_EMPLOYEE_SEARCH", true)?,
            atomic_writes: env_flag("HR_ATOMIC_WRITES", false)?,
        })
    }
}

fn env_flag(key: &str, default: bool) -> Result<bool> {
    match std::env::var(key) {
        Ok(val) => parse_flag(&val).ok_or_else(|| anyhow!("invalid boolean for {key}: {val}")),
        Err(_) => Ok(default),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
