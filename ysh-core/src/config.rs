use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::LazyLock;
use thiserror::Error;

use crate::cap::{MODES_NUMERIC, ModeInstance, RangeInstance, ToggleInstance};
use crate::home::ExposureFilter;
use crate::model::Script;
use crate::prop::PropertyInstance;
use crate::type_mapper::DeviceType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported device type `{0}`")]
    UnknownDeviceType(String),
    #[error("{entity_id}: range `{instance}` needs max > min")]
    EmptyRange { entity_id: String, instance: RangeInstance },
    #[error("{entity_id}: range `{instance}` multiplier must not be zero")]
    ZeroMultiplier { entity_id: String, instance: RangeInstance },
    #[error("{entity_id}: `{mode}` is not a mode of `{instance}`")]
    UnknownMode { entity_id: String, instance: ModeInstance, mode: String },
}

/// Exposure filter with the include/exclude semantics of the platform's entity filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EntityFilter {
    pub include_domains: BTreeSet<String>,
    pub include_entities: BTreeSet<String>,
    pub exclude_domains: BTreeSet<String>,
    pub exclude_entities: BTreeSet<String>,
}

impl EntityFilter {
    pub fn is_empty(&self) -> bool {
        self.include_domains.is_empty()
            && self.include_entities.is_empty()
            && self.exclude_domains.is_empty()
            && self.exclude_entities.is_empty()
    }
}

impl ExposureFilter for EntityFilter {
    fn is_exposed(&self, entity_id: &str) -> bool {
        if self.include_entities.contains(entity_id) {
            return true;
        }
        if self.exclude_entities.contains(entity_id) {
            return false;
        }

        let domain = entity_id.split_once('.').map(|(d, _)| d).unwrap_or_default();
        if !self.include_domains.is_empty() {
            return self.include_domains.contains(domain);
        }
        if !self.exclude_domains.is_empty() {
            return !self.exclude_domains.contains(domain);
        }

        // only explicit entities were listed
        self.include_entities.is_empty()
    }
}

/// `true` maps the entity's own list positionally, `false` disables, a map binds explicitly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum NumericModes {
    Auto(bool),
    Custom(BTreeMap<String, String>),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PropertyOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModeOverride {
    pub entity_id: String,
    pub set_script: Script,
    /// Platform-facing mode tag to the entity states it covers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RangeOverride {
    pub entity_id: String,
    pub set_script: Script,
    #[serde(default, alias = "minimum")]
    pub min: f64,
    #[serde(default = "default_max", alias = "maximum")]
    pub max: f64,
    #[serde(default = "default_one")]
    pub precision: f64,
    #[serde(default = "default_one")]
    pub multiplier: f64,
}

fn default_max() -> f64 {
    100.0
}

fn default_one() -> f64 {
    1.0
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EntityConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub device_type: Option<DeviceType>,
    pub channel_set_via_media_content_id: bool,
    pub relative_volume_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_up: Option<Script>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_down: Option<Script>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<NumericModes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub programs: Option<NumericModes>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<PropertyInstance, PropertyOverride>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub toggles: BTreeMap<ToggleInstance, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub modes: BTreeMap<ModeInstance, ModeOverride>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub ranges: BTreeMap<RangeInstance, RangeOverride>,
}

impl EntityConfig {
    pub fn numeric_modes(&self, instance: ModeInstance) -> Option<&NumericModes> {
        match instance {
            ModeInstance::Program => self.programs.as_ref(),
            ModeInstance::InputSource => self.sources.as_ref(),
            _ => None,
        }
    }

    fn validate(&self, entity_id: &str) -> Result<(), ConfigError> {
        for (instance, range) in &self.ranges {
            if range.max <= range.min {
                return Err(ConfigError::EmptyRange {
                    entity_id: entity_id.into(),
                    instance: *instance,
                });
            }
            if range.multiplier == 0.0 {
                return Err(ConfigError::ZeroMultiplier {
                    entity_id: entity_id.into(),
                    instance: *instance,
                });
            }
        }

        for (instance, mode) in &self.modes {
            let mut tags = mode.mapping.iter().flat_map(|m| m.keys());
            if let Some(tag) = tags.find(|t| !instance.internal_modes().contains(&t.as_str())) {
                return Err(ConfigError::UnknownMode {
                    entity_id: entity_id.into(),
                    instance: *instance,
                    mode: tag.clone(),
                });
            }
        }

        for instance in [ModeInstance::Program, ModeInstance::InputSource] {
            if let Some(NumericModes::Custom(map)) = self.numeric_modes(instance) {
                if let Some(tag) = map.keys().find(|t| !MODES_NUMERIC.contains(&t.as_str())) {
                    return Err(ConfigError::UnknownMode {
                        entity_id: entity_id.into(),
                        instance,
                        mode: tag.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

static EMPTY_ENTITY_CONFIG: LazyLock<EntityConfig> = LazyLock::new(EntityConfig::default);

/// Integration settings, built once at load time and shared read-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub filter: EntityFilter,
    pub entity_config: HashMap<String, EntityConfig>,
}

impl Config {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (entity_id, entity) in &self.entity_config {
            entity.validate(entity_id)?;
        }
        Ok(())
    }

    pub fn entity(&self, entity_id: &str) -> &EntityConfig {
        self.entity_config.get(entity_id).unwrap_or(&EMPTY_ENTITY_CONFIG)
    }

    pub fn should_expose(&self, entity_id: &str) -> bool {
        self.filter.is_exposed(entity_id)
    }
}
