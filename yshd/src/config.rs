use anyhow::{self, Result};
use constant_time_eq::constant_time_eq;
use dotenv::dotenv;
use std::{net::SocketAddr, path::PathBuf};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthConfig {
    pub tokens: Vec<String>,
}

impl AuthConfig {
    pub fn from_list(raw: &str) -> Self {
        let tokens = raw.split(',').map(str::trim).filter(|t| !t.is_empty()).map(String::from).collect();
        Self { tokens }
    }

    pub fn is_enabled(&self) -> bool {
        !self.tokens.is_empty()
    }

    pub fn matches(&self, candidate: &str) -> bool {
        // compares against every token, no early exit
        self.tokens
            .iter()
            .fold(false, |hit, t| constant_time_eq(t.as_bytes(), candidate.as_bytes()) | hit)
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bind: SocketAddr,
    /// Integration settings (exposure filter and per-entity overrides).
    pub config_path: Option<PathBuf>,
    /// Seed for the in-memory home.
    pub states_path: Option<PathBuf>,
    pub auth: AuthConfig,
    pub diagnostics: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8123)),
            config_path: None,
            states_path: None,
            auth: AuthConfig::default(),
            diagnostics: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let mut c = Self::default();
        if let Ok(s) = std::env::var("YSH_BIND") {
            c.bind = s.parse()?;
        }
        if let Ok(s) = std::env::var("YSH_CONFIG") {
            c.config_path = Some(s.into());
        }
        if let Ok(s) = std::env::var("YSH_STATES") {
            c.states_path = Some(s.into());
        }
        if let Ok(s) = std::env::var("YSH_TOKENS") {
            c.auth = AuthConfig::from_list(&s);
        }
        if let Ok(s) = std::env::var("YSH_DIAGNOSTICS") {
            c.diagnostics = parse_flag(&s)?;
        }
        Ok(c)
    }
}

fn parse_flag(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("YSH_DIAGNOSTICS: expected a boolean, got `{other}`"),
    }
}
