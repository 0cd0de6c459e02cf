use serde_json::{Map, Value};

use crate::cap::{RangeInstance, Target};
use crate::compat::range_binding;
use crate::config::{EntityConfig, RangeOverride};
use crate::error::{Result, SmartHomeError};
use crate::features::{CoverFeatures, LightFeatures, MediaPlayerFeatures};
use crate::hass::{MEDIA_TYPE_CHANNEL, attr, domain, service};
use crate::home::Home;
use crate::model::{Context, EntitySnapshot, ServiceCall};
use crate::protocol::{ActionState, CapabilityParameters, RangeBounds, StateValue};

const PERCENT: RangeBounds = RangeBounds { min: 0.0, max: 100.0, precision: 1.0 };
const CHANNELS: RangeBounds = RangeBounds { min: 0.0, max: 999.0, precision: 1.0 };

fn media_features(entity: &EntitySnapshot) -> MediaPlayerFeatures {
    MediaPlayerFeatures::of(entity)
}

fn volume_relative_only(entity: &EntitySnapshot, config: &EntityConfig) -> bool {
    !media_features(entity).contains(MediaPlayerFeatures::VOLUME_SET) || config.relative_volume_only
}

fn channel_random_access(entity: &EntitySnapshot, config: &EntityConfig) -> bool {
    media_features(entity).contains(MediaPlayerFeatures::PLAY_MEDIA)
        && config.channel_set_via_media_content_id
}

pub fn supported(instance: RangeInstance, entity: &EntitySnapshot, config: &EntityConfig) -> bool {
    match instance {
        RangeInstance::Temperature | RangeInstance::Humidity => {
            range_binding(instance, entity).is_some()
        }
        RangeInstance::Brightness => {
            entity.domain() == domain::LIGHT
                && LightFeatures::of(entity).contains(LightFeatures::BRIGHTNESS)
        }
        RangeInstance::Volume => {
            entity.domain() == domain::MEDIA_PLAYER
                && media_features(entity)
                    .intersects(MediaPlayerFeatures::VOLUME_STEP | MediaPlayerFeatures::VOLUME_SET)
        }
        RangeInstance::Channel => {
            if entity.domain() != domain::MEDIA_PLAYER {
                return false;
            }
            let f = media_features(entity);
            let down = f.contains(MediaPlayerFeatures::PREVIOUS_TRACK) || config.channel_down.is_some();
            let up = f.contains(MediaPlayerFeatures::NEXT_TRACK) || config.channel_up.is_some();
            (down && up) || channel_random_access(entity, config)
        }
        RangeInstance::Open => {
            entity.domain() == domain::COVER
                && CoverFeatures::of(entity).contains(CoverFeatures::SET_POSITION)
        }
    }
}

pub fn retrievable(
    instance: RangeInstance,
    overridden: bool,
    entity: &EntitySnapshot,
    config: &EntityConfig,
) -> bool {
    if overridden {
        return true;
    }
    match instance {
        RangeInstance::Volume => media_features(entity).contains(MediaPlayerFeatures::VOLUME_SET),
        RangeInstance::Channel => channel_random_access(entity, config),
        _ => true,
    }
}

/// `(random_access, bounds)`; relative-only ranges carry no bounds.
fn access(instance: RangeInstance, entity: &EntitySnapshot, config: &EntityConfig) -> (bool, Option<RangeBounds>) {
    match instance {
        RangeInstance::Temperature | RangeInstance::Humidity => {
            let bounds = range_binding(instance, entity).map(|b| RangeBounds {
                min: entity.attr_f64(b.min_attr).unwrap_or(b.default_min),
                max: entity.attr_f64(b.max_attr).unwrap_or(b.default_max),
                precision: b.precision,
            });
            (true, bounds)
        }
        RangeInstance::Brightness | RangeInstance::Open => (true, Some(PERCENT)),
        RangeInstance::Volume if volume_relative_only(entity, config) => (false, None),
        RangeInstance::Volume => (true, Some(PERCENT)),
        RangeInstance::Channel if channel_random_access(entity, config) => (true, Some(CHANNELS)),
        RangeInstance::Channel => (false, None),
    }
}

pub fn parameters_default(
    instance: RangeInstance,
    entity: &EntitySnapshot,
    config: &EntityConfig,
) -> CapabilityParameters {
    let (random_access, range) = access(instance, entity, config);
    CapabilityParameters::Range {
        instance,
        random_access,
        range,
        unit: instance.unit().map(str::to_string),
    }
}

pub fn parameters_override(instance: RangeInstance, o: &RangeOverride) -> CapabilityParameters {
    CapabilityParameters::Range {
        instance,
        random_access: true,
        range: Some(RangeBounds { min: o.min, max: o.max, precision: o.precision }),
        unit: instance.unit().map(str::to_string),
    }
}

fn current(instance: RangeInstance, entity: &EntitySnapshot, config: &EntityConfig) -> f64 {
    match instance {
        RangeInstance::Temperature | RangeInstance::Humidity => range_binding(instance, entity)
            .and_then(|b| entity.attr_f64(b.value_attr))
            .unwrap_or(0.0),
        RangeInstance::Brightness => match entity.attr_f64(attr::BRIGHTNESS) {
            Some(raw) => (100.0 * raw / 255.0).trunc(),
            None => 0.0,
        },
        RangeInstance::Volume => {
            entity.attr_f64(attr::MEDIA_VOLUME_LEVEL).map(|l| (l * 100.0).trunc()).unwrap_or(0.0)
        }
        RangeInstance::Channel => {
            let on_channel = entity.attr_str(attr::MEDIA_CONTENT_TYPE) == Some(MEDIA_TYPE_CHANNEL);
            if !channel_random_access(entity, config) || !on_channel {
                return 0.0;
            }
            match entity.attr(attr::MEDIA_CONTENT_ID) {
                Some(id) => id
                    .as_i64()
                    .or_else(|| id.as_str().and_then(|s| s.trim().parse().ok()))
                    .unwrap_or(0) as f64,
                None => 0.0,
            }
        }
        RangeInstance::Open => entity.attr_f64(attr::CURRENT_POSITION).unwrap_or(0.0),
    }
}

pub fn get_default(instance: RangeInstance, entity: &EntitySnapshot, config: &EntityConfig) -> StateValue {
    StateValue::number(current(instance, entity, config))
}

fn json_number(v: f64) -> Value {
    if v.fract() == 0.0 { Value::from(v as i64) } else { Value::from(v) }
}

/// Values are passed through unclamped; the device decides what it accepts.
pub async fn set_default(
    instance: RangeInstance,
    t: Target<'_>,
    state: &ActionState,
    ctx: &Context,
) -> Result<()> {
    let (entity, config) = (t.entity, t.config);
    let requested = state.number_value()?;
    let id = entity.entity_id.as_str();

    let call = match instance {
        RangeInstance::Volume if volume_relative_only(entity, config) => {
            let verb = if requested > 0.0 { service::VOLUME_UP } else { service::VOLUME_DOWN };
            ServiceCall::new(domain::MEDIA_PLAYER, verb, id, ctx)
        }
        RangeInstance::Channel if state.relative => {
            let script = if requested > 0.0 { &config.channel_up } else { &config.channel_down };
            if let Some(script) = script {
                let mut variables = Map::new();
                variables.insert(attr::ENTITY_ID.into(), Value::from(id));
                t.home.run_script(script, variables, ctx).await?;
                return Ok(());
            }
            let verb = if requested > 0.0 {
                service::MEDIA_NEXT_TRACK
            } else {
                service::MEDIA_PREVIOUS_TRACK
            };
            ServiceCall::new(domain::MEDIA_PLAYER, verb, id, ctx)
        }
        RangeInstance::Channel => {
            if !channel_random_access(entity, config) {
                return Err(SmartHomeError::not_supported("channel can only be switched relatively"));
            }
            ServiceCall::new(domain::MEDIA_PLAYER, service::PLAY_MEDIA, id, ctx)
                .with(attr::MEDIA_CONTENT_ID, (requested.trunc() as i64).to_string())
                .with(attr::MEDIA_CONTENT_TYPE, MEDIA_TYPE_CHANNEL)
        }
        _ => {
            let value = match state.relative {
                true => current(instance, entity, config) + requested,
                false => requested,
            };
            absolute_call(instance, entity, value, ctx)?
        }
    };

    t.home.call_service(call, true).await?;
    Ok(())
}

fn absolute_call(
    instance: RangeInstance,
    entity: &EntitySnapshot,
    value: f64,
    ctx: &Context,
) -> Result<ServiceCall> {
    let id = entity.entity_id.as_str();
    let call = match instance {
        RangeInstance::Temperature | RangeInstance::Humidity => {
            let b = range_binding(instance, entity).ok_or_else(|| {
                SmartHomeError::not_supported(format!("{instance} is not available for {id}"))
            })?;
            ServiceCall::new(entity.domain(), b.service, id, ctx).with(b.service_attr, json_number(value))
        }
        RangeInstance::Brightness => ServiceCall::new(domain::LIGHT, service::TURN_ON, id, ctx)
            .with(attr::BRIGHTNESS_PCT, json_number(value)),
        RangeInstance::Volume => ServiceCall::new(domain::MEDIA_PLAYER, service::VOLUME_SET, id, ctx)
            .with(attr::MEDIA_VOLUME_LEVEL, value / 100.0),
        RangeInstance::Open => ServiceCall::new(domain::COVER, service::SET_COVER_POSITION, id, ctx)
            .with(attr::POSITION, json_number(value)),
        RangeInstance::Channel => {
            return Err(SmartHomeError::internal("channel has no plain absolute setter"));
        }
    };
    Ok(call)
}

// inverted bounds resolve to `max` instead of panicking
fn bounded(value: f64, o: &RangeOverride) -> f64 {
    value.max(o.min).min(o.max)
}

/// Source entity state scaled down by the multiplier and clamped; a missing source reads as `min`.
pub async fn get_override(o: &RangeOverride, home: &dyn Home) -> Result<f64> {
    let Some(source) = home.get_state(&o.entity_id).await? else {
        return Ok(o.min);
    };
    let raw: f64 = source.state.trim().parse().unwrap_or(0.0);
    Ok(bounded(raw / o.multiplier, o))
}

/// Requested value is clamped to the configured bounds before scaling.
pub async fn set_override(
    o: &RangeOverride,
    home: &dyn Home,
    state: &ActionState,
    ctx: &Context,
) -> Result<()> {
    let requested = state.number_value()?;
    let value = match state.relative {
        true => get_override(o, home).await? + requested,
        false => requested,
    };
    let value = bounded(value, o) * o.multiplier;

    let mut variables = Map::new();
    variables.insert("value".into(), json_number(value));
    variables.insert(attr::ENTITY_ID.into(), Value::from(o.entity_id.as_str()));
    home.run_script(&o.set_script, variables, ctx).await?;
    Ok(())
}
