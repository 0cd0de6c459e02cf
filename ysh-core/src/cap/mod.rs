//! Capability engine: which controls an entity exposes and how to read and drive them.

pub mod color;
pub mod mode;
pub mod on_off;
pub mod range;
pub mod toggle;

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

use crate::config::{EntityConfig, ModeOverride, RangeOverride};
use crate::error::{Result, SmartHomeError};
use crate::home::Home;
use crate::model::{Context, EntitySnapshot};
use crate::protocol::{ActionState, CapabilityDescription, CapabilityParameters, StateValue};

pub const MODES_NUMERIC: [&str; 10] =
    ["one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityType {
    #[serde(rename = "devices.capabilities.on_off")]
    OnOff,
    #[serde(rename = "devices.capabilities.toggle")]
    Toggle,
    #[serde(rename = "devices.capabilities.range")]
    Range,
    #[serde(rename = "devices.capabilities.mode")]
    Mode,
    #[serde(rename = "devices.capabilities.color_setting")]
    ColorSetting,
}

impl CapabilityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnOff => "devices.capabilities.on_off",
            Self::Toggle => "devices.capabilities.toggle",
            Self::Range => "devices.capabilities.range",
            Self::Mode => "devices.capabilities.mode",
            Self::ColorSetting => "devices.capabilities.color_setting",
        }
    }
}

impl Display for CapabilityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! instance_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),*
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

instance_enum!(ToggleInstance {
    Mute => "mute",
    Backlight => "backlight",
    ControlsLocked => "controls_locked",
    Ionization => "ionization",
    KeepWarm => "keep_warm",
    Oscillation => "oscillation",
    Pause => "pause",
});

instance_enum!(ModeInstance {
    Thermostat => "thermostat",
    FanSpeed => "fan_speed",
    Swing => "swing",
    Program => "program",
    InputSource => "input_source",
    CleanupMode => "cleanup_mode",
});

instance_enum!(RangeInstance {
    Temperature => "temperature",
    Humidity => "humidity",
    Brightness => "brightness",
    Volume => "volume",
    Channel => "channel",
    Open => "open",
});

instance_enum!(ColorInstance {
    Rgb => "rgb",
    TemperatureK => "temperature_k",
});

impl ModeInstance {
    /// Platform-facing mode tags in canonical order.
    pub fn internal_modes(&self) -> &'static [&'static str] {
        match self {
            Self::Thermostat => &["auto", "cool", "dry", "fan_only", "heat", "preheat"],
            Self::FanSpeed => &["auto", "low", "medium", "high", "turbo"],
            Self::Swing => &["auto", "horizontal", "stationary", "vertical"],
            Self::Program | Self::InputSource => &MODES_NUMERIC,
            Self::CleanupMode => &["auto", "eco", "express", "normal", "quiet"],
        }
    }
}

impl RangeInstance {
    pub fn unit(&self) -> Option<&'static str> {
        match self {
            Self::Temperature => Some("unit.temperature.celsius"),
            Self::Humidity | Self::Brightness | Self::Open => Some("unit.percent"),
            Self::Volume | Self::Channel => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityKind {
    OnOff,
    Toggle(ToggleInstance),
    Mode(ModeInstance),
    Range(RangeInstance),
    Color(ColorInstance),
}

impl CapabilityKind {
    pub fn capability_type(&self) -> CapabilityType {
        match self {
            Self::OnOff => CapabilityType::OnOff,
            Self::Toggle(_) => CapabilityType::Toggle,
            Self::Mode(_) => CapabilityType::Mode,
            Self::Range(_) => CapabilityType::Range,
            Self::Color(_) => CapabilityType::ColorSetting,
        }
    }

    pub fn instance(&self) -> &'static str {
        match self {
            Self::OnOff => "on",
            Self::Toggle(i) => i.as_str(),
            Self::Mode(i) => i.as_str(),
            Self::Range(i) => i.as_str(),
            Self::Color(i) => i.as_str(),
        }
    }
}

/// Every capability kind, in resolution order.
pub const CAPABILITIES: &[CapabilityKind] = &[
    CapabilityKind::OnOff,
    CapabilityKind::Toggle(ToggleInstance::Mute),
    CapabilityKind::Toggle(ToggleInstance::Backlight),
    CapabilityKind::Toggle(ToggleInstance::ControlsLocked),
    CapabilityKind::Toggle(ToggleInstance::Ionization),
    CapabilityKind::Toggle(ToggleInstance::KeepWarm),
    CapabilityKind::Toggle(ToggleInstance::Oscillation),
    CapabilityKind::Toggle(ToggleInstance::Pause),
    CapabilityKind::Mode(ModeInstance::Thermostat),
    CapabilityKind::Mode(ModeInstance::FanSpeed),
    CapabilityKind::Mode(ModeInstance::Swing),
    CapabilityKind::Mode(ModeInstance::Program),
    CapabilityKind::Mode(ModeInstance::InputSource),
    CapabilityKind::Mode(ModeInstance::CleanupMode),
    CapabilityKind::Range(RangeInstance::Temperature),
    CapabilityKind::Range(RangeInstance::Humidity),
    CapabilityKind::Range(RangeInstance::Brightness),
    CapabilityKind::Range(RangeInstance::Volume),
    CapabilityKind::Range(RangeInstance::Channel),
    CapabilityKind::Range(RangeInstance::Open),
    CapabilityKind::Color(ColorInstance::Rgb),
    CapabilityKind::Color(ColorInstance::TemperatureK),
];

/// Which mechanism drives a resolved capability; fixed once resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Path<O> {
    Default,
    Override(O),
}

impl<O> Path<O> {
    pub fn is_override(&self) -> bool {
        matches!(self, Path::Override(_))
    }
}

/// The entity a capability or property is evaluated against.
#[derive(Clone, Copy)]
pub struct Target<'a> {
    pub entity: &'a EntitySnapshot,
    pub config: &'a EntityConfig,
    pub home: &'a dyn Home,
}

/// A capability kind bound to one entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Capability<'a> {
    OnOff,
    /// Override path carries the entity id that stands in for the toggle.
    Toggle(ToggleInstance, Path<&'a str>),
    Mode(ModeInstance, Path<&'a ModeOverride>),
    Range(RangeInstance, Path<&'a RangeOverride>),
    Color(ColorInstance),
}

/// Every capability the entity exposes; an override always wins over the default path.
pub fn resolve<'a>(entity: &EntitySnapshot, config: &'a EntityConfig) -> Vec<Capability<'a>> {
    CAPABILITIES.iter().filter_map(|kind| Capability::bind(*kind, entity, config)).collect()
}

impl<'a> Capability<'a> {
    pub fn bind(
        kind: CapabilityKind,
        entity: &EntitySnapshot,
        config: &'a EntityConfig,
    ) -> Option<Self> {
        match kind {
            CapabilityKind::OnOff => on_off::supported(entity).then_some(Self::OnOff),
            CapabilityKind::Toggle(i) => match config.toggles.get(&i) {
                Some(entity_id) => Some(Self::Toggle(i, Path::Override(entity_id.as_str()))),
                None => toggle::supported(i, entity).then_some(Self::Toggle(i, Path::Default)),
            },
            CapabilityKind::Mode(i) => match config.modes.get(&i) {
                Some(o) => Some(Self::Mode(i, Path::Override(o))),
                None => mode::supported(i, entity, config).then_some(Self::Mode(i, Path::Default)),
            },
            CapabilityKind::Range(i) => match config.ranges.get(&i) {
                Some(o) => Some(Self::Range(i, Path::Override(o))),
                None => {
                    range::supported(i, entity, config).then_some(Self::Range(i, Path::Default))
                }
            },
            CapabilityKind::Color(i) => color::supported(i, entity).then_some(Self::Color(i)),
        }
    }

    pub fn kind(&self) -> CapabilityKind {
        match self {
            Self::OnOff => CapabilityKind::OnOff,
            Self::Toggle(i, _) => CapabilityKind::Toggle(*i),
            Self::Mode(i, _) => CapabilityKind::Mode(*i),
            Self::Range(i, _) => CapabilityKind::Range(*i),
            Self::Color(i) => CapabilityKind::Color(*i),
        }
    }

    pub fn capability_type(&self) -> CapabilityType {
        self.kind().capability_type()
    }

    pub fn instance(&self) -> &'static str {
        self.kind().instance()
    }

    pub fn is_override(&self) -> bool {
        match self {
            Self::Toggle(_, p) => p.is_override(),
            Self::Mode(_, p) => p.is_override(),
            Self::Range(_, p) => p.is_override(),
            Self::OnOff | Self::Color(_) => false,
        }
    }

    pub fn retrievable(&self, entity: &EntitySnapshot, config: &EntityConfig) -> bool {
        match self {
            Self::OnOff => on_off::retrievable(entity),
            Self::Toggle(i, Path::Default) => toggle::retrievable(*i, entity),
            Self::Range(i, path) => range::retrievable(*i, path.is_override(), entity, config),
            Self::Toggle(..) | Self::Mode(..) | Self::Color(_) => true,
        }
    }

    pub fn parameters(
        &self,
        entity: &EntitySnapshot,
        config: &EntityConfig,
    ) -> Option<CapabilityParameters> {
        match self {
            Self::OnOff => None,
            Self::Toggle(i, _) => Some(CapabilityParameters::Toggle { instance: *i }),
            Self::Mode(i, Path::Default) => Some(mode::parameters_default(*i, entity, config)),
            Self::Mode(i, Path::Override(o)) => Some(mode::parameters_override(*i, o)),
            Self::Range(i, Path::Default) => Some(range::parameters_default(*i, entity, config)),
            Self::Range(i, Path::Override(o)) => Some(range::parameters_override(*i, o)),
            Self::Color(_) => Some(color::parameters(entity)),
        }
    }

    pub fn describe(&self, entity: &EntitySnapshot, config: &EntityConfig) -> CapabilityDescription {
        CapabilityDescription {
            kind: self.capability_type(),
            retrievable: self.retrievable(entity, config),
            parameters: self.parameters(entity, config),
        }
    }

    /// Current value; never changes anything.
    pub async fn get_value(&self, t: Target<'_>) -> Result<StateValue> {
        let value = match self {
            Self::OnOff => StateValue::Bool(on_off::is_on(t.entity)),
            Self::Toggle(i, Path::Default) => StateValue::Bool(toggle::get_default(*i, t.entity)),
            Self::Toggle(_, Path::Override(id)) => {
                StateValue::Bool(toggle::get_override(t.home, id).await?)
            }
            Self::Mode(i, Path::Default) => {
                StateValue::Str(mode::get_default(*i, t.entity, t.config).into())
            }
            Self::Mode(i, Path::Override(o)) => {
                StateValue::Str(mode::get_override(*i, o, t.home).await?)
            }
            Self::Range(i, Path::Default) => range::get_default(*i, t.entity, t.config),
            Self::Range(_, Path::Override(o)) => {
                StateValue::number(range::get_override(o, t.home).await?)
            }
            Self::Color(i) => StateValue::Int(color::get(*i, t.entity)),
        };
        Ok(value)
    }

    pub async fn set_value(&self, t: Target<'_>, state: &ActionState, ctx: &Context) -> Result<()> {
        match self {
            Self::OnOff => on_off::turn(t.home, t.entity, state.bool_value()?, ctx).await,
            Self::Toggle(i, Path::Default) => {
                toggle::set_default(*i, t.home, t.entity, state.bool_value()?, ctx).await
            }
            Self::Toggle(_, Path::Override(id)) => {
                toggle::set_override(t.home, id, state.bool_value()?, ctx).await
            }
            Self::Mode(i, Path::Default) => {
                mode::set_default(*i, t.entity, t.config, t.home, state.str_value()?, ctx).await
            }
            Self::Mode(i, Path::Override(o)) => {
                mode::set_override(*i, o, t.home, state.str_value()?, ctx).await
            }
            Self::Range(i, Path::Default) => range::set_default(*i, t, state, ctx).await,
            Self::Range(_, Path::Override(o)) => range::set_override(o, t.home, state, ctx).await,
            Self::Color(i) => color::set(*i, t.home, t.entity, state, ctx).await,
        }
    }
}

pub(crate) fn unsupported_value(what: impl Display) -> SmartHomeError {
    SmartHomeError::invalid_value(format!("unsupported value: {what}"))
}
