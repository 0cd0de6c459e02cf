//! Collaborator seams: the live entity store, its device/area registry and the exposure filter.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::hass::{attr, domain, service, state};
use crate::model::{AreaEntry, AttrValue, Context, DeviceEntry, EntitySnapshot, Script, ServiceCall};

#[async_trait]
pub trait Home: Send + Sync {
    async fn get_state(&self, entity_id: &str) -> Result<Option<EntitySnapshot>>;
    async fn all_states(&self) -> Result<Vec<EntitySnapshot>>;
    /// With `blocking` the call returns once the platform confirms the change.
    async fn call_service(&self, call: ServiceCall, blocking: bool) -> Result<()>;
    async fn run_script(
        &self,
        script: &Script,
        variables: Map<String, Value>,
        context: &Context,
    ) -> Result<()>;
}

#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    async fn device_for_entity(&self, entity_id: &str) -> Result<Option<DeviceEntry>>;
    async fn area(&self, area_id: &str) -> Result<Option<AreaEntry>>;
}

pub trait ExposureFilter: Send + Sync {
    fn is_exposed(&self, entity_id: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptRun {
    pub script: Script,
    pub variables: Map<String, Value>,
    pub context: Context,
}

/// Serialized contents of an [`InMemoryHome`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeSeed {
    pub states: Vec<EntitySnapshot>,
    pub devices: Vec<DeviceEntry>,
    pub areas: Vec<AreaEntry>,
}

/// Entity store kept in memory. Service calls are recorded and their usual
/// effect is mirrored into the target snapshot.
#[derive(Default, Clone)]
pub struct InMemoryHome {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    states: BTreeMap<String, EntitySnapshot>,
    devices: HashMap<String, DeviceEntry>,
    areas: HashMap<String, AreaEntry>,
    calls: Vec<ServiceCall>,
    scripts: Vec<ScriptRun>,
    failing: HashSet<String>,
}

impl InMemoryHome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: HomeSeed) -> Self {
        let inner = Inner {
            states: seed.states.into_iter().map(|s| (s.entity_id.clone(), s)).collect(),
            devices: seed.devices.into_iter().map(|d| (d.id.clone(), d)).collect(),
            areas: seed.areas.into_iter().map(|a| (a.id.clone(), a)).collect(),
            ..Inner::default()
        };
        Self { inner: Arc::new(RwLock::new(inner)) }
    }

    pub async fn upsert_state(&self, snapshot: EntitySnapshot) {
        let mut g = self.inner.write().await;
        g.states.insert(snapshot.entity_id.clone(), snapshot);
    }

    pub async fn remove_state(&self, entity_id: &str) -> Option<EntitySnapshot> {
        self.inner.write().await.states.remove(entity_id)
    }

    pub async fn upsert_device(&self, device: DeviceEntry) {
        self.inner.write().await.devices.insert(device.id.clone(), device);
    }

    pub async fn upsert_area(&self, area: AreaEntry) {
        self.inner.write().await.areas.insert(area.id.clone(), area);
    }

    /// Makes every later call to `domain.service` fail.
    pub async fn fail_service(&self, service_id: &str) {
        self.inner.write().await.failing.insert(service_id.to_string());
    }

    pub async fn calls(&self) -> Vec<ServiceCall> {
        self.inner.read().await.calls.clone()
    }

    pub async fn scripts(&self) -> Vec<ScriptRun> {
        self.inner.read().await.scripts.clone()
    }

    pub async fn clear_history(&self) {
        let mut g = self.inner.write().await;
        g.calls.clear();
        g.scripts.clear();
    }
}

#[async_trait]
impl Home for InMemoryHome {
    async fn get_state(&self, entity_id: &str) -> Result<Option<EntitySnapshot>> {
        Ok(self.inner.read().await.states.get(entity_id).cloned())
    }

    async fn all_states(&self) -> Result<Vec<EntitySnapshot>> {
        Ok(self.inner.read().await.states.values().cloned().collect())
    }

    async fn call_service(&self, call: ServiceCall, _blocking: bool) -> Result<()> {
        let mut g = self.inner.write().await;
        let service_id = call.service_id();
        g.calls.push(call.clone());
        if g.failing.contains(&service_id) {
            return Err(anyhow!("service {service_id} failed"));
        }

        if let Some(target) = call.entity_id().and_then(|id| g.states.get_mut(id)) {
            apply_service(target, &call);
            target.touch();
        }
        Ok(())
    }

    async fn run_script(
        &self,
        script: &Script,
        variables: Map<String, Value>,
        context: &Context,
    ) -> Result<()> {
        let mut g = self.inner.write().await;
        g.scripts.push(ScriptRun { script: script.clone(), variables, context: context.clone() });
        Ok(())
    }
}

#[async_trait]
impl DeviceRegistry for InMemoryHome {
    async fn device_for_entity(&self, entity_id: &str) -> Result<Option<DeviceEntry>> {
        let g = self.inner.read().await;
        Ok(g.devices.values().find(|d| d.entities.iter().any(|e| e == entity_id)).cloned())
    }

    async fn area(&self, area_id: &str) -> Result<Option<AreaEntry>> {
        Ok(self.inner.read().await.areas.get(area_id).cloned())
    }
}

fn apply_service(target: &mut EntitySnapshot, call: &ServiceCall) {
    // data keys mirror attribute names for most setters
    for (key, value) in &call.data {
        if key != attr::ENTITY_ID {
            target.attributes.insert(key.clone(), AttrValue::from_json(value));
        }
    }

    let number = |key: &str| call.data.get(key).and_then(Value::as_f64);
    match call.service.as_str() {
        service::TURN_ON => {
            target.state = state::ON.into();
            if let Some(pct) = number(attr::BRIGHTNESS_PCT) {
                target.attributes.remove(attr::BRIGHTNESS_PCT);
                target.attributes.insert(attr::BRIGHTNESS.into(), AttrValue::Int(pct_to_255(pct)));
            }
            if let Some(kelvin) = number(attr::KELVIN).filter(|k| *k > 0.0) {
                target.attributes.remove(attr::KELVIN);
                let mireds = (1_000_000.0 / kelvin).round() as i64;
                target.attributes.insert(attr::COLOR_TEMP.into(), AttrValue::Int(mireds));
            }
        }
        service::TURN_OFF => target.state = state::OFF.into(),
        service::OPEN_COVER => {
            target.state = state::OPEN.into();
            target.attributes.insert(attr::CURRENT_POSITION.into(), AttrValue::Int(100));
        }
        service::CLOSE_COVER => {
            target.state = state::CLOSED.into();
            target.attributes.insert(attr::CURRENT_POSITION.into(), AttrValue::Int(0));
        }
        service::SET_COVER_POSITION => {
            if let Some(position) = target.attributes.remove(attr::POSITION) {
                let open = position.as_f64().is_some_and(|p| p > 0.0);
                target.state = if open { state::OPEN } else { state::CLOSED }.into();
                target.attributes.insert(attr::CURRENT_POSITION.into(), position);
            }
        }
        service::LOCK => target.state = state::LOCKED.into(),
        service::UNLOCK => target.state = state::UNLOCKED.into(),
        service::START => target.state = state::CLEANING.into(),
        service::RETURN_TO_BASE => target.state = state::DOCKED.into(),
        service::STOP if target.domain() == domain::VACUUM => target.state = "idle".into(),
        service::PAUSE | service::MEDIA_PAUSE => target.state = state::PAUSED.into(),
        service::MEDIA_PLAY => target.state = state::PLAYING.into(),
        service::SET_HVAC_MODE => {
            if let Some(mode) = call.data.get(attr::HVAC_MODE).and_then(Value::as_str) {
                target.state = mode.into();
            }
        }
        service::VOLUME_UP | service::VOLUME_DOWN => {
            let step = if call.service == service::VOLUME_UP { 0.1 } else { -0.1 };
            let level = target.attr_f64(attr::MEDIA_VOLUME_LEVEL).unwrap_or(0.0);
            let level = (level + step).clamp(0.0, 1.0);
            target.attributes.insert(attr::MEDIA_VOLUME_LEVEL.into(), AttrValue::Float(level));
        }
        _ => {}
    }
}

fn pct_to_255(pct: f64) -> i64 {
    (pct.clamp(0.0, 100.0) * 255.0 / 100.0).round() as i64
}
