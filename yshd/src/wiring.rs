use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use ysh_core::{
    config::Config as IntegrationConfig,
    home::{HomeSeed, InMemoryHome},
    SmartHome,
};

use crate::{config::Config, state::AppState};

pub fn build_state(cfg: &Config) -> Result<AppState> {
    let integration = match cfg.config_path.as_deref() {
        Some(path) => IntegrationConfig::from_json(&read(path)?)
            .with_context(|| format!("invalid integration config {}", path.display()))?,
        None => IntegrationConfig::default(),
    };

    let seed: HomeSeed = match cfg.states_path.as_deref() {
        Some(path) => serde_json::from_str(&read(path)?)
            .with_context(|| format!("invalid state seed {}", path.display()))?,
        None => HomeSeed::default(),
    };
    tracing::info!(
        entities = seed.states.len(),
        devices = seed.devices.len(),
        "seeding in-memory home"
    );

    let home = InMemoryHome::from_seed(seed);
    let smart_home = SmartHome::new(Arc::new(home.clone()), Arc::new(integration))
        .with_registry(Arc::new(home));

    Ok(AppState { smart_home, auth: cfg.auth.clone(), diagnostics: cfg.diagnostics })
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}
