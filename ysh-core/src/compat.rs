//! Declarative bindings between capability kinds and the platform's entity domains.
//!
//! Capabilities whose behaviour is just "read an attribute, call a service with
//! the new value" are described here as data; the engine modules interpret them.

use crate::cap::{ModeInstance, RangeInstance, ToggleInstance};
use crate::features::{
    ClimateFeatures, FanFeatures, LightFeatures, MediaPlayerFeatures, VacuumFeatures,
    WaterHeaterFeatures,
};
use crate::hass::{attr, domain, service, state};
use crate::model::EntitySnapshot;

/// Where an entity reports the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    State,
    Attribute(&'static str),
}

impl Source {
    pub fn read<'e>(&self, entity: &'e EntitySnapshot) -> Option<&'e str> {
        match self {
            Source::State => Some(entity.state.as_str()),
            Source::Attribute(name) => entity.attr_str(name),
        }
    }
}

fn applies(entity: &EntitySnapshot, domain: &str, features: u32) -> bool {
    entity.domain() == domain && entity.feature_bits() & features == features
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleRead {
    /// Boolean attribute; missing reads as off.
    Attribute(&'static str),
    /// On whenever the state differs from the given one.
    StateIsNot(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleWrite {
    /// One service taking the new value in `attr`.
    Flag { service: &'static str, attr: &'static str },
    /// Separate verbs for on and off.
    Verbs { on: &'static str, off: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleBinding {
    pub domain: &'static str,
    pub features: u32,
    pub read: ToggleRead,
    pub write: ToggleWrite,
}

pub const TOGGLES: &[(ToggleInstance, ToggleBinding)] = &[
    (
        ToggleInstance::Mute,
        ToggleBinding {
            domain: domain::MEDIA_PLAYER,
            features: MediaPlayerFeatures::VOLUME_MUTE.bits(),
            read: ToggleRead::Attribute(attr::MEDIA_VOLUME_MUTED),
            write: ToggleWrite::Flag {
                service: service::VOLUME_MUTE,
                attr: attr::MEDIA_VOLUME_MUTED,
            },
        },
    ),
    (
        ToggleInstance::Oscillation,
        ToggleBinding {
            domain: domain::FAN,
            features: FanFeatures::OSCILLATE.bits(),
            read: ToggleRead::Attribute(attr::OSCILLATING),
            write: ToggleWrite::Flag { service: service::OSCILLATE, attr: attr::OSCILLATING },
        },
    ),
    (
        ToggleInstance::Pause,
        ToggleBinding {
            domain: domain::MEDIA_PLAYER,
            features: MediaPlayerFeatures::PLAY.union(MediaPlayerFeatures::PAUSE).bits(),
            read: ToggleRead::StateIsNot(state::PLAYING),
            write: ToggleWrite::Verbs { on: service::MEDIA_PAUSE, off: service::MEDIA_PLAY },
        },
    ),
    (
        ToggleInstance::Pause,
        ToggleBinding {
            domain: domain::VACUUM,
            features: VacuumFeatures::PAUSE.bits(),
            read: ToggleRead::StateIsNot(state::CLEANING),
            write: ToggleWrite::Verbs { on: service::PAUSE, off: service::START },
        },
    ),
];

pub fn toggle_binding(instance: ToggleInstance, entity: &EntitySnapshot) -> Option<&'static ToggleBinding> {
    TOGGLES
        .iter()
        .find(|(i, b)| *i == instance && applies(entity, b.domain, b.features))
        .map(|(_, b)| b)
}

/// How raw entity modes translate to platform mode tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeMapping {
    /// Exact `(raw, tag)` pairs.
    Exact(&'static [(&'static str, &'static str)]),
    /// A raw value maps to the first tag one of whose keywords it contains, ignoring case.
    Keywords(&'static [(&'static str, &'static [&'static str])]),
    /// Positional `one`..`ten`, optionally rebound by entity configuration.
    Numeric,
}

impl ModeMapping {
    pub fn tag_for(&self, raw: &str) -> Option<&'static str> {
        match self {
            ModeMapping::Exact(pairs) => pairs.iter().find(|(r, _)| *r == raw).map(|(_, t)| *t),
            ModeMapping::Keywords(table) => {
                let raw = raw.to_lowercase();
                table.iter().find(|(_, words)| words.iter().any(|w| raw.contains(w))).map(|(t, _)| *t)
            }
            ModeMapping::Numeric => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeBinding {
    pub domain: &'static str,
    pub features: u32,
    pub current: Source,
    pub list_attr: &'static str,
    pub service: &'static str,
    pub service_attr: &'static str,
    pub mapping: ModeMapping,
}

const HVAC_MODES: &[(&str, &str)] = &[
    ("auto", "auto"),
    ("heat_cool", "auto"),
    ("cool", "cool"),
    ("dry", "dry"),
    ("fan_only", "fan_only"),
    ("heat", "heat"),
];

const SWING_MODES: &[(&str, &str)] =
    &[("both", "auto"), ("horizontal", "horizontal"), ("off", "stationary"), ("vertical", "vertical")];

const FAN_SPEED_KEYWORDS: &[(&str, &[&str])] = &[
    ("auto", &["auto"]),
    ("low", &["low", "min", "silent"]),
    ("medium", &["medium", "middle"]),
    ("high", &["high", "max", "strong", "favorite"]),
    ("turbo", &["turbo"]),
];

pub const MODES: &[(ModeInstance, ModeBinding)] = &[
    (
        ModeInstance::Thermostat,
        ModeBinding {
            domain: domain::CLIMATE,
            features: 0,
            current: Source::State,
            list_attr: attr::HVAC_MODES,
            service: service::SET_HVAC_MODE,
            service_attr: attr::HVAC_MODE,
            mapping: ModeMapping::Exact(HVAC_MODES),
        },
    ),
    (
        ModeInstance::FanSpeed,
        ModeBinding {
            domain: domain::CLIMATE,
            features: ClimateFeatures::FAN_MODE.bits(),
            current: Source::Attribute(attr::FAN_MODE),
            list_attr: attr::FAN_MODES,
            service: service::SET_FAN_MODE,
            service_attr: attr::FAN_MODE,
            mapping: ModeMapping::Keywords(FAN_SPEED_KEYWORDS),
        },
    ),
    (
        ModeInstance::FanSpeed,
        ModeBinding {
            domain: domain::FAN,
            features: FanFeatures::SET_SPEED.bits(),
            current: Source::Attribute(attr::SPEED),
            list_attr: attr::SPEED_LIST,
            service: service::SET_SPEED,
            service_attr: attr::SPEED,
            mapping: ModeMapping::Keywords(FAN_SPEED_KEYWORDS),
        },
    ),
    (
        ModeInstance::Swing,
        ModeBinding {
            domain: domain::CLIMATE,
            features: ClimateFeatures::SWING_MODE.bits(),
            current: Source::Attribute(attr::SWING_MODE),
            list_attr: attr::SWING_MODES,
            service: service::SET_SWING_MODE,
            service_attr: attr::SWING_MODE,
            mapping: ModeMapping::Exact(SWING_MODES),
        },
    ),
    (
        ModeInstance::Program,
        ModeBinding {
            domain: domain::CLIMATE,
            features: ClimateFeatures::PRESET_MODE.bits(),
            current: Source::Attribute(attr::PRESET_MODE),
            list_attr: attr::PRESET_MODES,
            service: service::SET_PRESET_MODE,
            service_attr: attr::PRESET_MODE,
            mapping: ModeMapping::Numeric,
        },
    ),
    (
        ModeInstance::Program,
        ModeBinding {
            domain: domain::LIGHT,
            features: LightFeatures::EFFECT.bits(),
            current: Source::Attribute(attr::EFFECT),
            list_attr: attr::EFFECT_LIST,
            service: service::TURN_ON,
            service_attr: attr::EFFECT,
            mapping: ModeMapping::Numeric,
        },
    ),
    (
        ModeInstance::InputSource,
        ModeBinding {
            domain: domain::MEDIA_PLAYER,
            features: MediaPlayerFeatures::SELECT_SOURCE.bits(),
            current: Source::Attribute(attr::INPUT_SOURCE),
            list_attr: attr::INPUT_SOURCE_LIST,
            service: service::SELECT_SOURCE,
            service_attr: attr::INPUT_SOURCE,
            mapping: ModeMapping::Numeric,
        },
    ),
];

pub fn mode_binding(instance: ModeInstance, entity: &EntitySnapshot) -> Option<&'static ModeBinding> {
    MODES
        .iter()
        .find(|(i, b)| *i == instance && applies(entity, b.domain, b.features))
        .map(|(_, b)| b)
}

/// Absolute numeric setting read from one attribute and written through one service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeBinding {
    pub domain: &'static str,
    pub features: u32,
    /// Attributes that must all be present for the binding to apply.
    pub requires: &'static [&'static str],
    pub value_attr: &'static str,
    pub min_attr: &'static str,
    pub max_attr: &'static str,
    pub default_min: f64,
    pub default_max: f64,
    pub precision: f64,
    pub service: &'static str,
    pub service_attr: &'static str,
}

pub const RANGES: &[(RangeInstance, RangeBinding)] = &[
    (
        RangeInstance::Temperature,
        RangeBinding {
            domain: domain::CLIMATE,
            features: ClimateFeatures::TARGET_TEMPERATURE.bits(),
            requires: &[],
            value_attr: attr::TEMPERATURE,
            min_attr: attr::MIN_TEMP,
            max_attr: attr::MAX_TEMP,
            default_min: 7.0,
            default_max: 35.0,
            precision: 0.5,
            service: service::SET_TEMPERATURE,
            service_attr: attr::TEMPERATURE,
        },
    ),
    (
        RangeInstance::Temperature,
        RangeBinding {
            domain: domain::WATER_HEATER,
            features: WaterHeaterFeatures::TARGET_TEMPERATURE.bits(),
            requires: &[],
            value_attr: attr::TEMPERATURE,
            min_attr: attr::MIN_TEMP,
            max_attr: attr::MAX_TEMP,
            default_min: 0.0,
            default_max: 100.0,
            precision: 0.5,
            service: service::SET_TEMPERATURE,
            service_attr: attr::TEMPERATURE,
        },
    ),
    (
        RangeInstance::Humidity,
        RangeBinding {
            domain: domain::CLIMATE,
            features: 0,
            requires: &[attr::CURRENT_HUMIDITY, attr::HUMIDITY],
            value_attr: attr::CURRENT_HUMIDITY,
            min_attr: attr::MIN_HUMIDITY,
            max_attr: attr::MAX_HUMIDITY,
            default_min: 0.0,
            default_max: 100.0,
            precision: 1.0,
            service: service::SET_HUMIDITY,
            service_attr: attr::HUMIDITY,
        },
    ),
];

pub fn range_binding(instance: RangeInstance, entity: &EntitySnapshot) -> Option<&'static RangeBinding> {
    RANGES
        .iter()
        .find(|(i, b)| {
            *i == instance
                && applies(entity, b.domain, b.features)
                && b.requires.iter().all(|a| entity.attr(a).is_some())
        })
        .map(|(_, b)| b)
}
