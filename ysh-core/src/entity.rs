//! One entity as the platform sees it: discovery description, query state and actions.

use tracing::debug;

use crate::cap::{self, Capability, Target};
use crate::config::EntityConfig;
use crate::error::{ErrorCode, Result, SmartHomeError};
use crate::hass::attr;
use crate::home::{DeviceRegistry, Home};
use crate::model::{Context, EntitySnapshot};
use crate::prop::{self, Property, PropertyType};
use crate::protocol::{
    ActionState, CapabilityState, DeviceDescription, DeviceInfo, DeviceState, InstanceValue,
    PropertyState, StateValue,
};
use crate::type_mapper::determine_type;

pub struct YandexEntity<'a> {
    home: &'a dyn Home,
    config: &'a EntityConfig,
    state: EntitySnapshot,
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}

impl<'a> YandexEntity<'a> {
    pub fn new(home: &'a dyn Home, state: EntitySnapshot, config: &'a EntityConfig) -> Self {
        Self { home, config, state }
    }

    pub fn entity_id(&self) -> &str {
        &self.state.entity_id
    }

    pub fn state(&self) -> &EntitySnapshot {
        &self.state
    }

    fn target(&self) -> Target<'_> {
        Target { entity: &self.state, config: self.config, home: self.home }
    }

    pub fn capabilities(&self) -> Vec<Capability<'a>> {
        cap::resolve(&self.state, self.config)
    }

    pub fn properties(&self) -> Vec<Property<'a>> {
        prop::resolve(&self.state, self.config)
    }

    /// Configured name, else the entity's own display name. A blank configured name counts as unset.
    pub fn name(&self) -> String {
        match self.config.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.state.name(),
        }
    }

    fn attribute_device_info(&self) -> DeviceInfo {
        let text = |name: &str| self.state.attr_str(name).map(str::to_string);
        DeviceInfo {
            manufacturer: text(attr::MANUFACTURER),
            model: text(attr::MODEL),
            sw_version: text(attr::SW_VERSION),
            hw_version: text(attr::HW_VERSION),
        }
    }

    /// Description for device discovery; `None` when the entity should not be listed.
    pub async fn devices_serialize(
        &self,
        registry: Option<&dyn DeviceRegistry>,
    ) -> Result<Option<DeviceDescription>> {
        if self.state.is_unavailable() {
            debug!(entity_id = %self.entity_id(), "skipping unavailable entity");
            return Ok(None);
        }

        let name = self.name().trim().to_string();
        if name.is_empty() {
            debug!(entity_id = %self.entity_id(), "skipping entity without a name");
            return Ok(None);
        }

        let capabilities = self.capabilities();
        let properties = self.properties();
        if capabilities.is_empty() && properties.is_empty() {
            debug!(entity_id = %self.entity_id(), "skipping entity with nothing to expose");
            return Ok(None);
        }

        let mut descriptions = Vec::new();
        for c in &capabilities {
            push_unique(&mut descriptions, c.describe(&self.state, self.config));
        }
        let mut property_descriptions = Vec::new();
        for p in &properties {
            push_unique(&mut property_descriptions, p.describe());
        }

        let mut room = self.config.room.clone();
        let mut info = self.attribute_device_info();

        if let Some(registry) = registry
            && let Some(device) = registry.device_for_entity(self.entity_id()).await?
        {
            // registry data is the more complete source
            info.manufacturer = device.manufacturer.or(info.manufacturer);
            info.model = device.model.or(info.model);
            info.sw_version = device.sw_version.or(info.sw_version);
            info.hw_version = device.hw_version.or(info.hw_version);

            if room.is_none()
                && let Some(area_id) = &device.area_id
            {
                room = registry.area(area_id).await?.map(|a| a.name);
            }
        }

        Ok(Some(DeviceDescription {
            id: self.entity_id().to_string(),
            name,
            device_type: determine_type(&self.state, self.config),
            capabilities: descriptions,
            properties: property_descriptions,
            room,
            device_info: (!info.is_empty()).then_some(info),
        }))
    }

    /// Current values of every retrievable capability and every property.
    pub async fn query_serialize(&self) -> Result<DeviceState> {
        if self.state.is_unavailable() {
            return Ok(DeviceState::error(self.entity_id(), ErrorCode::DeviceUnreachable));
        }

        let t = self.target();
        let mut capabilities = Vec::new();
        for c in self.capabilities() {
            if !c.retrievable(&self.state, self.config) {
                continue;
            }
            capabilities.push(CapabilityState {
                kind: c.capability_type(),
                state: InstanceValue { instance: c.instance().to_string(), value: c.get_value(t).await? },
            });
        }

        let mut properties = Vec::new();
        for p in self.properties() {
            properties.push(PropertyState {
                kind: PropertyType::Float,
                state: InstanceValue {
                    instance: p.instance.to_string(),
                    value: StateValue::Float(p.get_value(t).await?),
                },
            });
        }

        Ok(DeviceState {
            id: self.entity_id().to_string(),
            capabilities: Some(capabilities),
            properties: Some(properties),
            error_code: None,
        })
    }

    /// Applies one requested capability state.
    pub async fn execute(&self, ctx: &Context, kind: &str, state: &ActionState) -> Result<()> {
        let instance = state
            .instance
            .as_deref()
            .ok_or_else(|| SmartHomeError::invalid_value("state has no instance"))?;

        let capability = self
            .capabilities()
            .into_iter()
            .find(|c| c.capability_type().as_str() == kind && c.instance() == instance)
            .ok_or_else(|| {
                SmartHomeError::not_supported(format!(
                    "{kind}/{instance} is not supported by {}",
                    self.entity_id()
                ))
            })?;

        capability.set_value(self.target(), state, ctx).await
    }

    /// Re-reads the snapshot after actions have run.
    pub async fn refresh(&mut self) -> Result<()> {
        match self.home.get_state(self.entity_id()).await? {
            Some(state) => {
                self.state = state;
                Ok(())
            }
            None => Err(SmartHomeError::unreachable(format!("{} disappeared", self.entity_id()))),
        }
    }
}
