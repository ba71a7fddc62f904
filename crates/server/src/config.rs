//! Server configuration from environment variables.

use std::net::SocketAddr;

/// Frontend serving mode configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontendMode {
    /// Proxy requests to a development server (e.g., Dioxus dx serve).
    Proxy { target: String },
    /// Serve the built dashboard from a directory.
    Static { dir: String },
    /// No frontend serving - API only.
    Disabled,
}

impl FrontendMode {
    /// Parse frontend mode from environment variables.
    ///
    /// Environment variables:
    /// - `SOCIALPULSE_FRONTEND_MODE`: "proxy" | "static" | "disabled" (default: "disabled")
    /// - `SOCIALPULSE_PROXY_TARGET`: Target URL for proxy mode (default: "http://localhost:8081")
    /// - `SOCIALPULSE_STATIC_DIR`: Directory for static mode (default: "./public")
    pub fn from_env() -> Self {
        Self::parse(
            std::env::var("SOCIALPULSE_FRONTEND_MODE").ok().as_deref(),
            std::env::var("SOCIALPULSE_PROXY_TARGET").ok(),
            std::env::var("SOCIALPULSE_STATIC_DIR").ok(),
        )
    }

    fn parse(mode: Option<&str>, target: Option<String>, dir: Option<String>) -> Self {
        match mode.unwrap_or("disabled").to_lowercase().as_str() {
            "proxy" => FrontendMode::Proxy {
                target: target.unwrap_or_else(|| "http://localhost:8081".to_string()),
            },
            "static" => FrontendMode::Static {
                dir: dir.unwrap_or_else(|| "./public".to_string()),
            },
            _ => FrontendMode::Disabled,
        }
    }
}

/// Top-level server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Populate storage with the demo account at startup.
    pub seed_demo: bool,
    pub frontend: FrontendMode,
}

impl ServerConfig {
    /// Environment variables:
    /// - `SOCIALPULSE_BIND_ADDR` (default: "0.0.0.0:8080")
    /// - `SOCIALPULSE_SEED_DEMO`: "false"/"0" disables the demo seed (default: enabled)
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = std::env::var("SOCIALPULSE_BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()?;
        let seed_demo = std::env::var("SOCIALPULSE_SEED_DEMO")
            .map(|v| parse_flag(&v))
            .unwrap_or(true);

        Ok(Self {
            bind_addr,
            seed_demo,
            frontend: FrontendMode::from_env(),
        })
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontend_mode_defaults() {
        assert_eq!(FrontendMode::parse(None, None, None), FrontendMode::Disabled);
        assert_eq!(
            FrontendMode::parse(Some("PROXY"), None, None),
            FrontendMode::Proxy {
                target: "http://localhost:8081".to_string()
            }
        );
        assert_eq!(
            FrontendMode::parse(Some("static"), None, Some("dist".into())),
            FrontendMode::Static {
                dir: "dist".to_string()
            }
        );
    }

    #[test]
    fn flags_default_to_enabled() {
        assert!(parse_flag("true"));
        assert!(parse_flag("yes"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(" Off "));
    }
}
