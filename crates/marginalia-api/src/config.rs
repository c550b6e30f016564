//! Server configuration read from the environment.

use marginalia_comments::domain::commands::CommentLimits;
use reqwest::Url;

use crate::error::AppError;
use crate::rate_limit::RateLimit;

/// Validated server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Upstash REST endpoint.
    pub redis_endpoint: Url,
    /// Bearer token for the REST endpoint.
    pub redis_token: String,
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Length bounds for comment input.
    pub limits: CommentLimits,
    /// Budget for `add-comment` per client IP.
    pub add_comment_rate_limit: RateLimit,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `.env` is unreadable or any variable is
    /// missing or invalid.
    pub fn from_env() -> Result<Self, AppError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::info!(path = %path.display(), "loaded environment file"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(AppError::Config(format!("failed to load .env: {e}"))),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup. Every
    /// problem found is reported at once.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` listing each missing or invalid variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut problems = Vec::new();
        let defaults = CommentLimits::default();

        let redis_endpoint = match lookup("REDIS_ENDPOINT") {
            Some(raw) => match Url::parse(raw.trim()) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
                Ok(url) => {
                    problems.push(format!(
                        "REDIS_ENDPOINT must use http or https, got {}",
                        url.scheme()
                    ));
                    None
                }
                Err(e) => {
                    problems.push(format!("REDIS_ENDPOINT is not a valid URL: {e}"));
                    None
                }
            },
            None => {
                problems.push("REDIS_ENDPOINT must be set".to_owned());
                None
            }
        };

        let redis_token = match lookup("REDIS_TOKEN").map(|t| t.trim().to_owned()) {
            Some(token) if !token.is_empty() => Some(token),
            Some(_) => {
                problems.push("REDIS_TOKEN must not be empty".to_owned());
                None
            }
            None => {
                problems.push("REDIS_TOKEN must be set".to_owned());
                None
            }
        };

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let port = parse_or(&lookup, "PORT", 3000_u16, &mut problems);
        let author_max = parse_or(&lookup, "AUTHOR_MAX_LENGTH", defaults.author_max, &mut problems);
        let comment_max =
            parse_or(&lookup, "COMMENT_MAX_LENGTH", defaults.comment_max, &mut problems);
        let requests = parse_or(&lookup, "ADD_COMMENT_RATE_LIMIT_REQUESTS", 2_u32, &mut problems);
        let window = lookup("ADD_COMMENT_RATE_LIMIT_WINDOW").unwrap_or_else(|| "1 m".to_owned());
        let add_comment_rate_limit = match RateLimit::parse(requests, &window) {
            Ok(limit) => Some(limit),
            Err(e) => {
                problems.push(format!("add-comment rate limit: {e}"));
                None
            }
        };

        match (redis_endpoint, redis_token, add_comment_rate_limit) {
            (Some(redis_endpoint), Some(redis_token), Some(add_comment_rate_limit))
                if problems.is_empty() =>
            {
                Ok(Self {
                    redis_endpoint,
                    redis_token,
                    host,
                    port,
                    limits: CommentLimits {
                        author_max,
                        comment_max,
                        ..defaults
                    },
                    add_comment_rate_limit,
                })
            }
            _ => Err(AppError::Config(problems.join("; "))),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T, problems: &mut Vec<String>) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            problems.push(format!("{key} is invalid: {e}"));
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    fn config_error(vars: &[(&str, &str)]) -> String {
        match Config::from_lookup(lookup(vars)) {
            Err(AppError::Config(msg)) => msg,
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_minimal_environment_uses_defaults() {
        // Arrange
        let vars = [
            ("REDIS_ENDPOINT", "https://eu1-example.upstash.io"),
            ("REDIS_TOKEN", "token"),
        ];

        // Act
        let config = Config::from_lookup(lookup(&vars)).unwrap();

        // Assert
        assert_eq!(config.redis_endpoint.host_str(), Some("eu1-example.upstash.io"));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.limits, CommentLimits::default());
        assert_eq!(config.add_comment_rate_limit.requests, 2);
        assert_eq!(config.add_comment_rate_limit.window, Duration::from_secs(60));
    }

    #[test]
    fn test_missing_required_variables_are_all_reported() {
        let msg = config_error(&[]);

        assert!(msg.contains("REDIS_ENDPOINT must be set"));
        assert!(msg.contains("REDIS_TOKEN must be set"));
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let msg = config_error(&[
            ("REDIS_ENDPOINT", "redis://localhost:6379"),
            ("REDIS_TOKEN", "  "),
            ("PORT", "eighty"),
            ("ADD_COMMENT_RATE_LIMIT_WINDOW", "whenever"),
        ]);

        assert!(msg.contains("REDIS_ENDPOINT must use http or https"));
        assert!(msg.contains("REDIS_TOKEN must not be empty"));
        assert!(msg.contains("PORT is invalid"));
        assert!(msg.contains("add-comment rate limit"));
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = Config::from_lookup(lookup(&[
            ("REDIS_ENDPOINT", "http://localhost:8079"),
            ("REDIS_TOKEN", "token"),
            ("PORT", "8080"),
            ("COMMENT_MAX_LENGTH", "500"),
            ("ADD_COMMENT_RATE_LIMIT_REQUESTS", "10"),
            ("ADD_COMMENT_RATE_LIMIT_WINDOW", "30 s"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.limits.comment_max, 500);
        assert_eq!(config.add_comment_rate_limit.requests, 10);
        assert_eq!(config.add_comment_rate_limit.window, Duration::from_secs(30));
    }
}
