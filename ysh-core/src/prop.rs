//! Read-only telemetry exposed next to capabilities.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

use crate::cap::{Path, Target};
use crate::config::{EntityConfig, PropertyOverride};
use crate::error::{Result, SmartHomeError};
use crate::hass::{attr, device_class, domain};
use crate::model::{AttrValue, EntitySnapshot};
use crate::protocol::{PropertyDescription, PropertyParameters};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    #[serde(rename = "devices.properties.float")]
    Float,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyInstance {
    Temperature,
    Humidity,
    WaterLevel,
    Co2Level,
    Power,
    Voltage,
    Amperage,
    BatteryLevel,
}

impl PropertyInstance {
    /// Resolution order.
    pub const ALL: &'static [PropertyInstance] = &[
        Self::Temperature,
        Self::Humidity,
        Self::WaterLevel,
        Self::Co2Level,
        Self::Power,
        Self::Voltage,
        Self::Amperage,
        Self::BatteryLevel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::WaterLevel => "water_level",
            Self::Co2Level => "co2_level",
            Self::Power => "power",
            Self::Voltage => "voltage",
            Self::Amperage => "amperage",
            Self::BatteryLevel => "battery_level",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::Temperature => "unit.temperature.celsius",
            Self::Humidity | Self::WaterLevel | Self::BatteryLevel => "unit.percent",
            Self::Co2Level => "unit.ppm",
            Self::Power => "unit.watt",
            Self::Voltage => "unit.volt",
            Self::Amperage => "unit.ampere",
        }
    }
}

impl Display for PropertyInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const POWER_UNITS: &[(&str, f64)] = &[("W", 1.0), ("kW", 1_000.0)];
const VOLTAGE_UNITS: &[(&str, f64)] = &[("V", 1.0), ("kV", 1_000.0), ("MV", 1_000_000.0), ("mV", 0.001)];

fn unit_scale(entity: &EntitySnapshot, units: &[(&str, f64)]) -> Option<f64> {
    let unit = entity.attr_str(attr::UNIT_OF_MEASUREMENT)?;
    units.iter().find(|(u, _)| *u == unit).map(|(_, scale)| *scale)
}

fn is_sensor_of_class(entity: &EntitySnapshot, class: &str) -> bool {
    entity.domain() == domain::SENSOR && entity.attr_str(attr::DEVICE_CLASS) == Some(class)
}

fn has_attr(entity: &EntitySnapshot, name: &str) -> bool {
    entity.attr(name).is_some()
}

/// Whether the entity publishes this value without any configuration.
pub fn supported(instance: PropertyInstance, entity: &EntitySnapshot) -> bool {
    let is_sensor = entity.domain() == domain::SENSOR;
    match instance {
        PropertyInstance::Temperature => {
            is_sensor_of_class(entity, device_class::TEMPERATURE)
                || (entity.domain() == domain::CLIMATE && has_attr(entity, attr::CURRENT_TEMPERATURE))
        }
        PropertyInstance::Humidity => {
            is_sensor_of_class(entity, device_class::HUMIDITY)
                || (entity.domain() == domain::CLIMATE && has_attr(entity, attr::CURRENT_HUMIDITY))
        }
        PropertyInstance::WaterLevel => has_attr(entity, attr::WATER_LEVEL),
        PropertyInstance::Co2Level => {
            entity.domain() == domain::AIR_QUALITY && has_attr(entity, attr::CO2)
        }
        PropertyInstance::Power if is_sensor => unit_scale(entity, POWER_UNITS).is_some(),
        PropertyInstance::Power => has_attr(entity, attr::CURRENT_POWER_W),
        PropertyInstance::Voltage => is_sensor && unit_scale(entity, VOLTAGE_UNITS).is_some(),
        PropertyInstance::Amperage => {
            is_sensor && entity.attr_str(attr::UNIT_OF_MEASUREMENT) == Some("A")
        }
        PropertyInstance::BatteryLevel => {
            is_sensor_of_class(entity, device_class::BATTERY)
                || (!is_sensor && has_attr(entity, attr::BATTERY_LEVEL))
        }
    }
}

fn parse_number(raw: &str, origin: &str) -> Result<f64> {
    raw.trim()
        .parse()
        .map_err(|_| SmartHomeError::internal(format!("{origin}: `{raw}` is not a number")))
}

fn value_number(value: &AttrValue, origin: &str) -> Result<f64> {
    match value {
        AttrValue::Str(s) => parse_number(s, origin),
        other => other
            .as_f64()
            .ok_or_else(|| SmartHomeError::internal(format!("{origin}: value is not a number"))),
    }
}

/// Missing attributes read as zero.
fn attr_number(entity: &EntitySnapshot, name: &str) -> Result<f64> {
    match entity.attr(name) {
        Some(value) => value_number(value, &format!("{}.{name}", entity.entity_id)),
        None => Ok(0.0),
    }
}

fn state_number(entity: &EntitySnapshot) -> Result<f64> {
    parse_number(&entity.state, &entity.entity_id)
}

fn get_default(instance: PropertyInstance, entity: &EntitySnapshot) -> Result<f64> {
    let is_sensor = entity.domain() == domain::SENSOR;
    match instance {
        PropertyInstance::Temperature if is_sensor => state_number(entity),
        PropertyInstance::Temperature => attr_number(entity, attr::CURRENT_TEMPERATURE),
        PropertyInstance::Humidity if is_sensor => state_number(entity),
        PropertyInstance::Humidity => attr_number(entity, attr::CURRENT_HUMIDITY),
        PropertyInstance::WaterLevel => attr_number(entity, attr::WATER_LEVEL),
        PropertyInstance::Co2Level => attr_number(entity, attr::CO2),
        PropertyInstance::Power if is_sensor => {
            let scale = unit_scale(entity, POWER_UNITS).unwrap_or(1.0);
            Ok(state_number(entity)? * scale)
        }
        PropertyInstance::Power => attr_number(entity, attr::CURRENT_POWER_W),
        PropertyInstance::Voltage => {
            let scale = unit_scale(entity, VOLTAGE_UNITS).unwrap_or(1.0);
            Ok(state_number(entity)? * scale)
        }
        PropertyInstance::Amperage => state_number(entity),
        PropertyInstance::BatteryLevel if is_sensor => state_number(entity),
        PropertyInstance::BatteryLevel => attr_number(entity, attr::BATTERY_LEVEL),
    }
}

/// A property kind bound to one entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Property<'a> {
    pub instance: PropertyInstance,
    pub path: Path<&'a PropertyOverride>,
}

/// Properties the entity reports; a configured override always wins.
pub fn resolve<'a>(entity: &EntitySnapshot, config: &'a EntityConfig) -> Vec<Property<'a>> {
    PropertyInstance::ALL
        .iter()
        .filter_map(|&instance| match config.properties.get(&instance) {
            Some(o) => Some(Property { instance, path: Path::Override(o) }),
            None => supported(instance, entity).then_some(Property { instance, path: Path::Default }),
        })
        .collect()
}

impl Property<'_> {
    pub fn describe(&self) -> PropertyDescription {
        PropertyDescription {
            kind: PropertyType::Float,
            retrievable: true,
            parameters: PropertyParameters {
                instance: self.instance,
                unit: self.instance.unit().to_string(),
            },
        }
    }

    pub async fn get_value(&self, t: Target<'_>) -> Result<f64> {
        match self.path {
            Path::Default if t.entity.is_unknown_or_unavailable() => Ok(0.0),
            Path::Default => get_default(self.instance, t.entity),
            Path::Override(o) => {
                let fetched;
                let source = match &o.entity_id {
                    Some(id) => match t.home.get_state(id).await? {
                        Some(s) => {
                            fetched = s;
                            &fetched
                        }
                        None => return Ok(0.0),
                    },
                    None => t.entity,
                };
                if source.is_unknown_or_unavailable() {
                    return Ok(0.0);
                }
                match &o.attribute {
                    Some(name) => attr_number(source, name),
                    None => state_number(source),
                }
            }
        }
    }
}
