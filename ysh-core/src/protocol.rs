//! Wire shapes of the smart home platform API.

use serde::{Deserialize, Serialize};

use crate::cap::{CapabilityType, ModeInstance, RangeInstance, ToggleInstance};
use crate::error::{ErrorCode, Result, SmartHomeError};
use crate::prop::{PropertyInstance, PropertyType};
use crate::type_mapper::DeviceType;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StateValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl StateValue {
    /// Integral numbers go out without a fraction.
    pub fn number(v: f64) -> Self {
        if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
            Self::Int(v as i64)
        } else {
            Self::Float(v)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModeValue {
    pub value: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RangeBounds {
    pub min: f64,
    pub max: f64,
    pub precision: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TemperatureKBounds {
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CapabilityParameters {
    Toggle {
        instance: ToggleInstance,
    },
    Mode {
        instance: ModeInstance,
        modes: Vec<ModeValue>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ordered: Option<bool>,
    },
    Range {
        instance: RangeInstance,
        random_access: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<RangeBounds>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    Color {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color_model: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        temperature_k: Option<TemperatureKBounds>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CapabilityDescription {
    #[serde(rename = "type")]
    pub kind: CapabilityType,
    pub retrievable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<CapabilityParameters>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyParameters {
    pub instance: PropertyInstance,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyDescription {
    #[serde(rename = "type")]
    pub kind: PropertyType,
    pub retrievable: bool,
    pub parameters: PropertyParameters,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeviceInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sw_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hw_version: Option<String>,
}

impl DeviceInfo {
    pub fn is_empty(&self) -> bool {
        self.manufacturer.is_none()
            && self.model.is_none()
            && self.sw_version.is_none()
            && self.hw_version.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceDescription {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub capabilities: Vec<CapabilityDescription>,
    pub properties: Vec<PropertyDescription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_info: Option<DeviceInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstanceValue {
    pub instance: String,
    pub value: StateValue,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CapabilityState {
    #[serde(rename = "type")]
    pub kind: CapabilityType,
    pub state: InstanceValue,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyState {
    #[serde(rename = "type")]
    pub kind: PropertyType,
    pub state: InstanceValue,
}

/// Query result for one device: either its values or an error code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceState {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Vec<CapabilityState>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<PropertyState>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
}

impl DeviceState {
    pub fn error(id: impl Into<String>, code: ErrorCode) -> Self {
        Self { id: id.into(), capabilities: None, properties: None, error_code: Some(code) }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueryTarget {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueryRequest {
    #[serde(default)]
    pub devices: Vec<QueryTarget>,
}

/// Requested value of one capability instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ActionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub relative: bool,
}

impl ActionState {
    pub fn new(instance: &str, value: impl Into<serde_json::Value>) -> Self {
        Self { instance: Some(instance.into()), value: value.into(), relative: false }
    }

    pub fn relative(instance: &str, value: impl Into<serde_json::Value>) -> Self {
        Self { relative: true, ..Self::new(instance, value) }
    }

    pub fn bool_value(&self) -> Result<bool> {
        self.value.as_bool().ok_or_else(|| SmartHomeError::invalid_value("value is not boolean"))
    }

    pub fn number_value(&self) -> Result<f64> {
        self.value.as_f64().ok_or_else(|| SmartHomeError::invalid_value("value is not a number"))
    }

    pub fn int_value(&self) -> Result<i64> {
        self.value.as_i64().ok_or_else(|| SmartHomeError::invalid_value("value is not an integer"))
    }

    pub fn str_value(&self) -> Result<&str> {
        self.value.as_str().ok_or_else(|| SmartHomeError::invalid_value("value is not a string"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionCapability {
    /// Kept as sent; unknown types fail per operation, not per request.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub state: Option<ActionState>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionDevice {
    pub id: String,
    #[serde(default)]
    pub capabilities: Vec<ActionCapability>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ActionPayload {
    #[serde(default)]
    pub devices: Vec<ActionDevice>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ActionRequest {
    pub payload: ActionPayload,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionStatus {
    Done,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionResult {
    pub status: ActionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
}

impl ActionResult {
    pub fn done() -> Self {
        Self { status: ActionStatus::Done, error_code: None }
    }

    pub fn error(code: ErrorCode) -> Self {
        Self { status: ActionStatus::Error, error_code: Some(code) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstanceResult {
    pub instance: String,
    pub action_result: ActionResult,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CapabilityResult {
    #[serde(rename = "type")]
    pub kind: String,
    pub state: InstanceResult,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceActionResult {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Vec<CapabilityResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
}

impl DeviceActionResult {
    pub fn error(id: impl Into<String>, code: ErrorCode) -> Self {
        Self { id: id.into(), capabilities: None, error_code: Some(code) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DevicesPayload {
    pub user_id: String,
    pub devices: Vec<DeviceDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryPayload {
    pub devices: Vec<DeviceState>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionResponsePayload {
    pub devices: Vec<DeviceActionResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorPayload {
    pub error_code: ErrorCode,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Payload {
    Devices(DevicesPayload),
    Query(QueryPayload),
    Action(ActionResponsePayload),
    Error(ErrorPayload),
}

impl Payload {
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Error(e) => Some(e.error_code),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Envelope {
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}
