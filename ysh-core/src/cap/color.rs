use crate::cap::ColorInstance;
use crate::error::{Result, SmartHomeError};
use crate::features::LightFeatures;
use crate::hass::{attr, domain, service};
use crate::home::Home;
use crate::model::{AttrValue, Context, EntitySnapshot, ServiceCall};
use crate::protocol::{ActionState, CapabilityParameters, TemperatureKBounds};

const DEFAULT_MIN_MIREDS: f64 = 153.0;
const DEFAULT_MAX_MIREDS: f64 = 500.0;

fn kelvin(mireds: f64) -> i64 {
    if mireds <= 0.0 {
        return 0;
    }
    (1_000_000.0 / mireds).floor() as i64
}

pub fn supported(instance: ColorInstance, entity: &EntitySnapshot) -> bool {
    if entity.domain() != domain::LIGHT {
        return false;
    }
    let f = LightFeatures::of(entity);
    match instance {
        ColorInstance::Rgb => f.contains(LightFeatures::COLOR),
        ColorInstance::TemperatureK => f.contains(LightFeatures::COLOR_TEMP),
    }
}

/// Both color instances share one parameter block.
pub fn parameters(entity: &EntitySnapshot) -> CapabilityParameters {
    let f = LightFeatures::of(entity);
    let temperature_k = f.contains(LightFeatures::COLOR_TEMP).then(|| {
        let min = entity.attr_f64(attr::MIN_MIREDS).unwrap_or(DEFAULT_MIN_MIREDS);
        let max = entity.attr_f64(attr::MAX_MIREDS).unwrap_or(DEFAULT_MAX_MIREDS);
        TemperatureKBounds { min: kelvin(max), max: kelvin(min) }
    });

    CapabilityParameters::Color {
        color_model: f.contains(LightFeatures::COLOR).then(|| "rgb".to_string()),
        temperature_k,
    }
}

pub fn get(instance: ColorInstance, entity: &EntitySnapshot) -> i64 {
    match instance {
        ColorInstance::Rgb => {
            let Some(rgb) = entity.attr(attr::RGB_COLOR).and_then(AttrValue::as_list) else {
                return 0;
            };
            let channel = |n: usize| rgb.get(n).and_then(AttrValue::as_i64).unwrap_or(0).clamp(0, 255);
            (channel(0) << 16) | (channel(1) << 8) | channel(2)
        }
        ColorInstance::TemperatureK => entity.attr_f64(attr::COLOR_TEMP).map(kelvin).unwrap_or(0),
    }
}

pub async fn set(
    instance: ColorInstance,
    home: &dyn Home,
    entity: &EntitySnapshot,
    state: &ActionState,
    ctx: &Context,
) -> Result<()> {
    let value = state.int_value()?;
    let call = ServiceCall::new(domain::LIGHT, service::TURN_ON, &entity.entity_id, ctx);

    let call = match instance {
        ColorInstance::Rgb => {
            if !(0..=0xFF_FFFF).contains(&value) {
                return Err(SmartHomeError::invalid_value(format!("rgb value {value} out of range")));
            }
            let rgb = vec![(value >> 16) & 0xFF, (value >> 8) & 0xFF, value & 0xFF];
            call.with(attr::RGB_COLOR, rgb)
        }
        ColorInstance::TemperatureK => call.with(attr::KELVIN, value),
    };

    home.call_service(call, true).await?;
    Ok(())
}
