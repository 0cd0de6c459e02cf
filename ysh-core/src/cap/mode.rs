use serde_json::{Map, Value};
use tracing::debug;

use crate::cap::{MODES_NUMERIC, ModeInstance, unsupported_value};
use crate::compat::{ModeBinding, ModeMapping, mode_binding};
use crate::config::{EntityConfig, ModeOverride, NumericModes};
use crate::error::{Result, SmartHomeError};
use crate::hass::attr;
use crate::home::Home;
use crate::model::{AttrValue, Context, EntitySnapshot, ServiceCall};
use crate::protocol::{CapabilityParameters, ModeValue};

/// Resolved `(tag, raw)` pairs in canonical tag order; each tag appears once.
pub type ModeMap = Vec<(&'static str, String)>;

fn canonical_index(instance: ModeInstance, tag: &str) -> usize {
    instance.internal_modes().iter().position(|m| *m == tag).unwrap_or(usize::MAX)
}

fn push_unique(map: &mut ModeMap, tag: &'static str, raw: &str) {
    if !map.iter().any(|(t, _)| *t == tag) {
        map.push((tag, raw.to_string()));
    }
}

/// Modes of the entity that translate to a platform tag.
pub fn mode_map(
    instance: ModeInstance,
    binding: &ModeBinding,
    entity: &EntitySnapshot,
    config: &EntityConfig,
) -> ModeMap {
    let list = entity.attr(binding.list_attr).and_then(AttrValue::as_str_list);
    let mut map = ModeMap::new();

    match binding.mapping {
        ModeMapping::Numeric => match config.numeric_modes(instance) {
            Some(NumericModes::Auto(false)) => {}
            None | Some(NumericModes::Auto(true)) => {
                for (tag, raw) in MODES_NUMERIC.into_iter().zip(list.unwrap_or_default()) {
                    push_unique(&mut map, tag, raw);
                }
            }
            Some(NumericModes::Custom(custom)) => {
                for tag in MODES_NUMERIC {
                    let Some(raw) = custom.get(tag) else { continue };
                    if list.as_ref().is_none_or(|l| l.contains(&raw.as_str())) {
                        push_unique(&mut map, tag, raw);
                    }
                }
            }
        },
        mapping => {
            for raw in list.unwrap_or_default() {
                if let Some(tag) = mapping.tag_for(raw) {
                    push_unique(&mut map, tag, raw);
                }
            }
        }
    }

    map.sort_by_key(|(tag, _)| canonical_index(instance, tag));
    map
}

fn resolved(
    instance: ModeInstance,
    entity: &EntitySnapshot,
    config: &EntityConfig,
) -> Option<(&'static ModeBinding, ModeMap)> {
    let binding = mode_binding(instance, entity)?;
    Some((binding, mode_map(instance, binding, entity, config)))
}

pub fn supported(instance: ModeInstance, entity: &EntitySnapshot, config: &EntityConfig) -> bool {
    resolved(instance, entity, config).is_some_and(|(_, map)| !map.is_empty())
}

fn parameters(instance: ModeInstance, tags: impl IntoIterator<Item = String>) -> CapabilityParameters {
    CapabilityParameters::Mode {
        instance,
        modes: tags.into_iter().map(|value| ModeValue { value }).collect(),
        ordered: (instance == ModeInstance::FanSpeed).then_some(true),
    }
}

pub fn parameters_default(
    instance: ModeInstance,
    entity: &EntitySnapshot,
    config: &EntityConfig,
) -> CapabilityParameters {
    let map = resolved(instance, entity, config).map(|(_, m)| m).unwrap_or_default();
    parameters(instance, map.into_iter().map(|(tag, _)| tag.to_string()))
}

/// An unmapped current value reads as the first mapped tag in capability order, which is
/// also the first advertised mode; only an entity with no mapped modes reads as the first internal mode.
pub fn get_default(
    instance: ModeInstance,
    entity: &EntitySnapshot,
    config: &EntityConfig,
) -> &'static str {
    let fallback = instance.internal_modes()[0];
    let Some((binding, map)) = resolved(instance, entity, config) else {
        return fallback;
    };

    let current = binding.current.read(entity);
    map.iter()
        .find(|(_, raw)| Some(raw.as_str()) == current)
        .or(map.first())
        .map(|(tag, _)| *tag)
        .unwrap_or(fallback)
}

pub async fn set_default(
    instance: ModeInstance,
    entity: &EntitySnapshot,
    config: &EntityConfig,
    home: &dyn Home,
    tag: &str,
    ctx: &Context,
) -> Result<()> {
    let (binding, map) = resolved(instance, entity, config).ok_or_else(|| {
        SmartHomeError::not_supported(format!("{instance} is not available for {}", entity.entity_id))
    })?;
    let (_, raw) = map.iter().find(|(t, _)| *t == tag).ok_or_else(|| unsupported_value(tag))?;

    let call = ServiceCall::new(entity.domain(), binding.service, &entity.entity_id, ctx)
        .with(binding.service_attr, raw.as_str());
    home.call_service(call, true).await?;
    Ok(())
}

fn override_modes(instance: ModeInstance, o: &ModeOverride) -> Vec<String> {
    match &o.mapping {
        Some(mapping) => {
            let mut tags: Vec<String> = mapping.keys().cloned().collect();
            tags.sort_by_key(|t| canonical_index(instance, t));
            tags
        }
        None => instance.internal_modes().iter().map(|m| m.to_string()).collect(),
    }
}

pub fn parameters_override(instance: ModeInstance, o: &ModeOverride) -> CapabilityParameters {
    parameters(instance, override_modes(instance, o))
}

pub async fn get_override(instance: ModeInstance, o: &ModeOverride, home: &dyn Home) -> Result<String> {
    let modes = override_modes(instance, o);
    let fallback = || modes.first().cloned().unwrap_or_else(|| instance.internal_modes()[0].into());

    let Some(source) = home.get_state(&o.entity_id).await? else {
        return Ok(fallback());
    };

    let tag = match &o.mapping {
        Some(mapping) => mapping
            .iter()
            .find(|(_, states)| states.iter().any(|s| *s == source.state))
            .map(|(tag, _)| tag.clone()),
        None => modes.iter().find(|m| **m == source.state).cloned(),
    };

    Ok(tag.unwrap_or_else(|| {
        debug!(entity_id = %o.entity_id, state = %source.state, "no mode mapped for state");
        fallback()
    }))
}

pub async fn set_override(
    instance: ModeInstance,
    o: &ModeOverride,
    home: &dyn Home,
    tag: &str,
    ctx: &Context,
) -> Result<()> {
    if !override_modes(instance, o).iter().any(|m| m == tag) {
        return Err(unsupported_value(tag));
    }

    let raw = o
        .mapping
        .as_ref()
        .and_then(|m| m.get(tag))
        .and_then(|states| states.first())
        .map(String::as_str)
        .unwrap_or(tag);

    let mut variables = Map::new();
    variables.insert("value".into(), Value::from(raw));
    variables.insert(attr::ENTITY_ID.into(), Value::from(o.entity_id.as_str()));
    home.run_script(&o.set_script, variables, ctx).await?;
    Ok(())
}
