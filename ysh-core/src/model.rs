use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::hass::{attr, state};

/// Attribute value as reported by the entity store.
///
/// Deserializes from any JSON; nested objects have no typed reading and become `Null`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<AttrValue>),
}

impl AttrValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttrValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// String members of a list attribute; non-string members are skipped.
    pub fn as_str_list(&self) -> Option<Vec<&str>> {
        self.as_list().map(|items| items.iter().filter_map(AttrValue::as_str).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map(Self::Float).unwrap_or(Self::Null),
            },
            serde_json::Value::String(s) => Self::Str(s.clone()),
            serde_json::Value::Array(items) => {
                Self::List(items.iter().map(Self::from_json).collect())
            }
            serde_json::Value::Null | serde_json::Value::Object(_) => Self::Null,
        }
    }
}

impl<'de> Deserialize<'de> for AttrValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(|v| Self::from_json(&v))
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<u32> for AttrValue {
    fn from(v: u32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl<T: Into<AttrValue>> From<Vec<T>> for AttrValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

pub type Attributes = BTreeMap<String, AttrValue>;

/// Read-only view of one entity at the moment it was fetched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntitySnapshot {
    pub entity_id: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

impl EntitySnapshot {
    pub fn new(entity_id: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            state: state.into(),
            attributes: BTreeMap::new(),
            last_updated: Utc::now(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn with_features(self, bits: u32) -> Self {
        self.with_attr(attr::SUPPORTED_FEATURES, bits)
    }

    pub fn domain(&self) -> &str {
        self.entity_id.split_once('.').map(|(domain, _)| domain).unwrap_or_default()
    }

    pub fn object_id(&self) -> &str {
        self.entity_id.split_once('.').map(|(_, object)| object).unwrap_or(&self.entity_id)
    }

    pub fn feature_bits(&self) -> u32 {
        self.attr(attr::SUPPORTED_FEATURES).and_then(AttrValue::as_i64).unwrap_or(0) as u32
    }

    /// Present, non-null attribute.
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name).filter(|v| !v.is_null())
    }

    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(AttrValue::as_str)
    }

    pub fn attr_f64(&self, name: &str) -> Option<f64> {
        self.attr(name).and_then(AttrValue::as_f64)
    }

    pub fn name(&self) -> String {
        match self.attr_str(attr::FRIENDLY_NAME) {
            Some(name) => name.to_string(),
            None => self.object_id().replace('_', " "),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.state == state::UNAVAILABLE
    }

    pub fn is_unknown_or_unavailable(&self) -> bool {
        self.state == state::UNAVAILABLE || self.state == state::UNKNOWN
    }

    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AreaEntry {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DeviceEntry {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sw_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hw_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_id: Option<String>,
    #[serde(default)]
    pub entities: Vec<String>,
}

/// Who asked for a change; carried on every service call and script run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Context {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Context {
    pub fn with_user(user_id: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), user_id: Some(user_id.into()) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceCall {
    pub domain: String,
    pub service: String,
    pub data: serde_json::Map<String, serde_json::Value>,
    pub context: Context,
}

impl ServiceCall {
    pub fn new(domain: &str, service: &str, entity_id: &str, context: &Context) -> Self {
        let mut data = serde_json::Map::new();
        data.insert(attr::ENTITY_ID.into(), entity_id.into());
        Self { domain: domain.into(), service: service.into(), data, context: context.clone() }
    }

    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.data.get(attr::ENTITY_ID).and_then(|v| v.as_str())
    }

    pub fn service_id(&self) -> String {
        format!("{}.{}", self.domain, self.service)
    }
}

/// Script definition as configured by the user; executed by the entity store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Script(pub serde_json::Value);
