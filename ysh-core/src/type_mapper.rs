//! Maps an entity to the device type the platform shows it as.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use tracing::debug;

use crate::config::{ConfigError, EntityConfig};
use crate::features::ClimateFeatures;
use crate::hass::{attr, device_class, domain};
use crate::model::EntitySnapshot;

const PREFIX: &str = "devices.types.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DeviceType {
    Light,
    Socket,
    Switch,
    Thermostat,
    ThermostatAc,
    MediaDevice,
    MediaDeviceTv,
    MediaDeviceTvBox,
    MediaDeviceReceiver,
    Cooking,
    CookingCoffeeMaker,
    CookingKettle,
    Openable,
    OpenableCurtain,
    Humidifier,
    Purifier,
    VacuumCleaner,
    WashingMachine,
    Other,
}

impl DeviceType {
    pub const ALL: &'static [DeviceType] = &[
        Self::Light,
        Self::Socket,
        Self::Switch,
        Self::Thermostat,
        Self::ThermostatAc,
        Self::MediaDevice,
        Self::MediaDeviceTv,
        Self::MediaDeviceTvBox,
        Self::MediaDeviceReceiver,
        Self::Cooking,
        Self::CookingCoffeeMaker,
        Self::CookingKettle,
        Self::Openable,
        Self::OpenableCurtain,
        Self::Humidifier,
        Self::Purifier,
        Self::VacuumCleaner,
        Self::WashingMachine,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "devices.types.light",
            Self::Socket => "devices.types.socket",
            Self::Switch => "devices.types.switch",
            Self::Thermostat => "devices.types.thermostat",
            Self::ThermostatAc => "devices.types.thermostat.ac",
            Self::MediaDevice => "devices.types.media_device",
            Self::MediaDeviceTv => "devices.types.media_device.tv",
            Self::MediaDeviceTvBox => "devices.types.media_device.tv_box",
            Self::MediaDeviceReceiver => "devices.types.media_device.receiver",
            Self::Cooking => "devices.types.cooking",
            Self::CookingCoffeeMaker => "devices.types.cooking.coffee_maker",
            Self::CookingKettle => "devices.types.cooking.kettle",
            Self::Openable => "devices.types.openable",
            Self::OpenableCurtain => "devices.types.openable.curtain",
            Self::Humidifier => "devices.types.humidifier",
            Self::Purifier => "devices.types.purifier",
            Self::VacuumCleaner => "devices.types.vacuum_cleaner",
            Self::WashingMachine => "devices.types.washing_machine",
            Self::Other => "devices.types.other",
        }
    }
}

impl Display for DeviceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts both `devices.types.light` and the short `light`.
impl FromStr for DeviceType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let short = s.strip_prefix(PREFIX).unwrap_or(s);
        Self::ALL
            .iter()
            .copied()
            .find(|t| &t.as_str()[PREFIX.len()..] == short)
            .ok_or_else(|| ConfigError::UnknownDeviceType(s.to_string()))
    }
}

impl TryFrom<String> for DeviceType {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DeviceType> for String {
    fn from(value: DeviceType) -> Self {
        value.as_str().to_string()
    }
}

enum Predicate {
    DeviceClass(&'static [&'static str]),
    Check(fn(&EntitySnapshot, &EntityConfig) -> bool),
}

impl Predicate {
    fn matches(&self, entity: &EntitySnapshot, config: &EntityConfig) -> bool {
        match self {
            Self::DeviceClass(classes) => entity
                .attr_str(attr::DEVICE_CLASS)
                .is_some_and(|class| classes.contains(&class)),
            Self::Check(f) => f(entity, config),
        }
    }
}

enum DomainType {
    Fixed(DeviceType),
    /// Subtypes are tried in order; the first match wins.
    Subtyped { default: DeviceType, subtypes: &'static [(DeviceType, Predicate)] },
}

fn supports_swing(entity: &EntitySnapshot, _config: &EntityConfig) -> bool {
    ClimateFeatures::of(entity).contains(ClimateFeatures::SWING_MODE)
}

fn looks_like_humidifier(entity: &EntitySnapshot, _config: &EntityConfig) -> bool {
    entity.attr_str(attr::MODEL).is_some_and(|m| m.starts_with("zhimi.humidifier."))
        || entity.attr(attr::TARGET_HUMIDITY).is_some()
}

const DOMAIN_TYPES: &[(&str, DomainType)] = &[
    (domain::AUTOMATION, DomainType::Fixed(DeviceType::Other)),
    (domain::BINARY_SENSOR, DomainType::Fixed(DeviceType::Other)),
    (domain::CAMERA, DomainType::Fixed(DeviceType::Other)),
    (
        domain::CLIMATE,
        DomainType::Subtyped {
            default: DeviceType::Thermostat,
            subtypes: &[(DeviceType::ThermostatAc, Predicate::Check(supports_swing))],
        },
    ),
    (
        domain::COVER,
        DomainType::Subtyped {
            default: DeviceType::Openable,
            subtypes: &[(
                DeviceType::OpenableCurtain,
                Predicate::DeviceClass(&[
                    device_class::SHADE,
                    device_class::SHUTTER,
                    device_class::CURTAIN,
                    device_class::BLIND,
                    device_class::AWNING,
                ]),
            )],
        },
    ),
    (
        domain::FAN,
        DomainType::Subtyped {
            default: DeviceType::Thermostat,
            subtypes: &[(DeviceType::Humidifier, Predicate::Check(looks_like_humidifier))],
        },
    ),
    (domain::GROUP, DomainType::Fixed(DeviceType::Switch)),
    (domain::INPUT_BOOLEAN, DomainType::Fixed(DeviceType::Switch)),
    (domain::LIGHT, DomainType::Fixed(DeviceType::Light)),
    (domain::LOCK, DomainType::Fixed(DeviceType::Openable)),
    (
        domain::MEDIA_PLAYER,
        DomainType::Subtyped {
            default: DeviceType::MediaDevice,
            subtypes: &[
                (DeviceType::MediaDeviceTv, Predicate::DeviceClass(&[device_class::TV])),
                (
                    DeviceType::MediaDeviceTvBox,
                    Predicate::DeviceClass(&[device_class::ANDROIDTV, device_class::FIRETV]),
                ),
            ],
        },
    ),
    (domain::SCENE, DomainType::Fixed(DeviceType::Other)),
    (domain::SCRIPT, DomainType::Fixed(DeviceType::Other)),
    (
        domain::SWITCH,
        DomainType::Subtyped {
            default: DeviceType::Switch,
            subtypes: &[(DeviceType::Socket, Predicate::DeviceClass(&[device_class::OUTLET]))],
        },
    ),
    (domain::VACUUM, DomainType::Fixed(DeviceType::VacuumCleaner)),
    (domain::WATER_HEATER, DomainType::Fixed(DeviceType::CookingKettle)),
];

/// Configured type, then the `yandex_type` attribute, then the domain table.
pub fn determine_type(entity: &EntitySnapshot, config: &EntityConfig) -> DeviceType {
    if let Some(forced) = config.device_type {
        return forced;
    }

    if let Some(raw) = entity.attr_str(attr::YANDEX_TYPE) {
        match raw.parse() {
            Ok(forced) => return forced,
            Err(err) => debug!(entity_id = %entity.entity_id, %err, "ignoring yandex_type attribute"),
        }
    }

    let Some((_, mapping)) = DOMAIN_TYPES.iter().find(|(d, _)| *d == entity.domain()) else {
        return DeviceType::Other;
    };

    match mapping {
        DomainType::Fixed(t) => *t,
        DomainType::Subtyped { default, subtypes } => subtypes
            .iter()
            .find(|(_, predicate)| predicate.matches(entity, config))
            .map(|(t, _)| *t)
            .unwrap_or(*default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_names() {
        assert_eq!("devices.types.media_device.tv".parse::<DeviceType>().unwrap(), DeviceType::MediaDeviceTv);
        assert_eq!("openable.curtain".parse::<DeviceType>().unwrap(), DeviceType::OpenableCurtain);
        assert!(matches!(
            "toaster".parse::<DeviceType>(),
            Err(ConfigError::UnknownDeviceType(t)) if t == "toaster"
        ));
    }

    #[test]
    fn serializes_with_prefix() {
        let json = serde_json::to_value(DeviceType::CookingKettle).unwrap();
        assert_eq!(json, "devices.types.cooking.kettle");
        let back: DeviceType = serde_json::from_value(json).unwrap();
        assert_eq!(back, DeviceType::CookingKettle);
    }

    #[test]
    fn subtype_checks_see_the_entity_config() {
        fn named_kettle(_: &EntitySnapshot, config: &EntityConfig) -> bool {
            config.name.as_deref() == Some("Kettle")
        }
        let check = Predicate::Check(named_kettle);
        let entity = EntitySnapshot::new("switch.k", "on");

        let config: EntityConfig = serde_json::from_value(serde_json::json!({"name": "Kettle"})).unwrap();
        assert!(check.matches(&entity, &config));
        assert!(!check.matches(&entity, &EntityConfig::default()));
    }
}
