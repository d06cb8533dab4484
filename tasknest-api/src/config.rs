/// Configuration management for the API server
///
/// Configuration is read once at startup into an immutable [`Config`] that
/// is shared through application state.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 3000)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: *)
/// - `JWT_SECRET`: Token signing secret, at least 32 characters (required)
/// - `JWT_TTL_HOURS`: Session lifetime (default: 24)
/// - `PASSWORD_HASH_COST`: Argon2 iterations (default: 3)
/// - `PASSWORD_HASH_MEMORY_KIB`: Argon2 memory cost (default: 65536)
/// - `LOGIN_MAX_ATTEMPTS`: Attempts per window on auth routes (default: 5)
/// - `LOGIN_WINDOW_SECS`: Throttle window length (default: 300)
/// - `RUST_LOG` / `LOG_FORMAT`: read by `main` before config loads
///
/// # Example
///
/// ```no_run
/// use tasknest_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tasknest_shared::auth::password::HashCost;

/// Minimum accepted signing secret length
pub const MIN_SECRET_LENGTH: usize = 32;

/// Longest accepted session lifetime (one year)
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `["*"]` means permissive
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Credential and session settings
#[derive(Clone)]
pub struct AuthConfig {
    /// Token signing secret
    ///
    /// Generate with: `openssl rand -hex 32`
    pub jwt_secret: String,

    /// Session token lifetime in hours
    pub token_ttl_hours: i64,

    /// Argon2id parameters for new password hashes
    pub hash_cost: HashCost,

    /// Attempts admitted per throttle window on register/login
    pub login_max_attempts: u32,

    /// Throttle window length
    pub login_window: Duration,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("hash_cost", &self.hash_cost)
            .field("login_max_attempts", &self.login_max_attempts)
            .field("login_window", &self.login_window)
            .finish()
    }
}

impl Config {
    /// Loads configuration from the process environment
    ///
    /// A `.env` file is loaded first if present (for development).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` or `JWT_SECRET` is missing
    /// - `JWT_SECRET` is shorter than 32 characters
    /// - a numeric variable does not parse
    /// - the Argon2 cost is one Argon2 refuses
    /// - `JWT_TTL_HOURS` is outside 1..=8760
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.chars().count() < MIN_SECRET_LENGTH {
            anyhow::bail!("JWT_SECRET must be at least {} characters long", MIN_SECRET_LENGTH);
        }

        let defaults = HashCost::default();
        let hash_cost = HashCost {
            iterations: parse_or(&lookup, "PASSWORD_HASH_COST", defaults.iterations)?,
            memory_kib: parse_or(&lookup, "PASSWORD_HASH_MEMORY_KIB", defaults.memory_kib)?,
            parallelism: defaults.parallelism,
        };
        hash_cost
            .validate()
            .map_err(|e| anyhow::anyhow!("PASSWORD_HASH_COST/PASSWORD_HASH_MEMORY_KIB rejected: {}", e))?;

        let token_ttl_hours: i64 = parse_or(&lookup, "JWT_TTL_HOURS", 24)?;
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&token_ttl_hours) {
            anyhow::bail!("JWT_TTL_HOURS must be between 1 and {}", MAX_TOKEN_TTL_HOURS);
        }

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            api: ApiConfig {
                host: lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&lookup, "API_PORT", 3000)?,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            },
            auth: AuthConfig {
                jwt_secret,
                token_ttl_hours,
                hash_cost,
                login_max_attempts: parse_or(&lookup, "LOGIN_MAX_ATTEMPTS", 5)?,
                login_window: Duration::from_secs(parse_or(&lookup, "LOGIN_WINDOW_SECS", 300)?),
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether CORS should allow any origin
    pub fn cors_permissive(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "postgresql://localhost/test"), ("JWT_SECRET", SECRET)]).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert!(config.cors_permissive());
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert_eq!(config.auth.hash_cost, HashCost::default());
        assert_eq!(config.auth.login_max_attempts, 5);
        assert_eq!(config.auth.login_window, Duration::from_secs(300));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", SECRET),
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "8080"),
            ("CORS_ORIGINS", "https://app.example.com, https://admin.example.com"),
            ("PASSWORD_HASH_COST", "2"),
            ("PASSWORD_HASH_MEMORY_KIB", "19456"),
            ("JWT_TTL_HOURS", "1"),
            ("LOGIN_MAX_ATTEMPTS", "3"),
            ("LOGIN_WINDOW_SECS", "60"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert!(!config.cors_permissive());
        assert_eq!(config.api.cors_origins.len(), 2);
        assert_eq!(config.auth.hash_cost.iterations, 2);
        assert_eq!(config.auth.hash_cost.memory_kib, 19456);
        assert_eq!(config.auth.token_ttl_hours, 1);
        assert_eq!(config.auth.login_max_attempts, 3);
        assert_eq!(config.auth.login_window, Duration::from_secs(60));
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        let err = load(&[("DATABASE_URL", "postgresql://localhost/test")]).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn test_short_secret_is_fatal() {
        let err = load(&[("DATABASE_URL", "postgresql://localhost/test"), ("JWT_SECRET", "short")]).unwrap_err();
        assert!(err.to_string().contains("at least 32"));
    }

    #[test]
    fn test_invalid_number() {
        let err = load(&[
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", SECRET),
            ("PASSWORD_HASH_COST", "lots"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("PASSWORD_HASH_COST"));
    }

    #[test]
    fn test_zero_hash_cost_is_fatal() {
        for (key, value) in [("PASSWORD_HASH_COST", "0"), ("PASSWORD_HASH_MEMORY_KIB", "0")] {
            let err = load(&[
                ("DATABASE_URL", "postgresql://localhost/test"),
                ("JWT_SECRET", SECRET),
                (key, value),
            ])
            .unwrap_err();
            assert!(err.to_string().contains("PASSWORD_HASH"), "{}={}", key, value);
        }
    }

    #[test]
    fn test_token_ttl_bounds() {
        for value in ["0", "-5", "9223372036854775807"] {
            let err = load(&[
                ("DATABASE_URL", "postgresql://localhost/test"),
                ("JWT_SECRET", SECRET),
                ("JWT_TTL_HOURS", value),
            ])
            .unwrap_err();
            assert!(err.to_string().contains("JWT_TTL_HOURS"), "JWT_TTL_HOURS={}", value);
        }

        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", SECRET),
            ("JWT_TTL_HOURS", "8760"),
        ])
        .unwrap();
        assert_eq!(config.auth.token_ttl_hours, MAX_TOKEN_TTL_HOURS);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = load(&[("DATABASE_URL", "postgresql://localhost/test"), ("JWT_SECRET", SECRET)]).unwrap();
        let debug = format!("{:?}", config);

        assert!(!debug.contains(SECRET));
        assert!(debug.contains("<redacted>"));
    }
}
