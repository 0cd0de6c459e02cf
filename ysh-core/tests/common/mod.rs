#![allow(dead_code)]

use serde_json::Value;
use ysh_core::cap::Target;
use ysh_core::config::EntityConfig;
use ysh_core::home::InMemoryHome;
use ysh_core::model::{Context, EntitySnapshot, ServiceCall};

pub fn ctx() -> Context {
    Context::with_user("test-user")
}

pub async fn home_with(states: Vec<EntitySnapshot>) -> InMemoryHome {
    let home = InMemoryHome::new();
    for s in states {
        home.upsert_state(s).await;
    }
    home
}

pub fn target<'a>(
    home: &'a InMemoryHome,
    entity: &'a EntitySnapshot,
    config: &'a EntityConfig,
) -> Target<'a> {
    Target { entity, config, home }
}

pub fn entity_config(v: Value) -> EntityConfig {
    serde_json::from_value(v).unwrap()
}

pub async fn fetch(home: &InMemoryHome, entity_id: &str) -> EntitySnapshot {
    use ysh_core::home::Home;
    home.get_state(entity_id).await.unwrap().unwrap()
}

pub async fn last_call(home: &InMemoryHome) -> ServiceCall {
    home.calls().await.pop().expect("no service call recorded")
}
