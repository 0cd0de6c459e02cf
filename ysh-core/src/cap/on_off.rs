use tracing::warn;

use crate::error::Result;
use crate::features::{MediaPlayerFeatures, VacuumFeatures, WaterHeaterFeatures};
use crate::hass::{attr, domain, service, state};
use crate::home::Home;
use crate::model::{AttrValue, Context, EntitySnapshot, ServiceCall};

const WATER_HEATER_ON: &[&str] = &[state::ON, "On", "ON", state::ELECTRIC];
const WATER_HEATER_OFF: &[&str] = &[state::OFF, "Off", "OFF"];

/// First candidate present in the heater's operation list.
fn water_heater_operation<'e>(entity: &'e EntitySnapshot, candidates: &[&str]) -> Option<&'e str> {
    let list = entity.attr(attr::OPERATION_LIST).and_then(AttrValue::as_str_list)?;
    candidates.iter().find_map(|c| list.iter().copied().find(|op| op == c))
}

pub fn supported(entity: &EntitySnapshot) -> bool {
    match entity.domain() {
        domain::MEDIA_PLAYER => {
            MediaPlayerFeatures::of(entity)
                .contains(MediaPlayerFeatures::TURN_ON | MediaPlayerFeatures::TURN_OFF)
        }
        domain::VACUUM => {
            let f = VacuumFeatures::of(entity);
            (f.contains(VacuumFeatures::START)
                && f.intersects(VacuumFeatures::RETURN_HOME | VacuumFeatures::STOP))
                || f.contains(VacuumFeatures::TURN_ON | VacuumFeatures::TURN_OFF)
        }
        domain::WATER_HEATER => {
            WaterHeaterFeatures::of(entity).contains(WaterHeaterFeatures::OPERATION_MODE)
                && water_heater_operation(entity, WATER_HEATER_ON).is_some()
                && water_heater_operation(entity, WATER_HEATER_OFF).is_some()
        }
        domain::AUTOMATION
        | domain::CAMERA
        | domain::CLIMATE
        | domain::COVER
        | domain::FAN
        | domain::GROUP
        | domain::INPUT_BOOLEAN
        | domain::LIGHT
        | domain::LOCK
        | domain::SCENE
        | domain::SCRIPT
        | domain::SWITCH => true,
        _ => false,
    }
}

/// Scenes and scripts are fire-and-forget.
pub fn retrievable(entity: &EntitySnapshot) -> bool {
    !matches!(entity.domain(), domain::SCENE | domain::SCRIPT)
}

pub fn is_on(entity: &EntitySnapshot) -> bool {
    let current = entity.state.as_str();
    match entity.domain() {
        domain::COVER => current == state::OPEN,
        domain::VACUUM => current == state::ON || current == state::CLEANING,
        domain::CLIMATE => current != state::OFF,
        domain::LOCK => current == state::UNLOCKED,
        domain::WATER_HEATER => {
            entity.attr_str(attr::OPERATION_MODE) != water_heater_operation(entity, WATER_HEATER_OFF)
        }
        _ => current != state::OFF,
    }
}

pub async fn turn(home: &dyn Home, entity: &EntitySnapshot, on: bool, ctx: &Context) -> Result<()> {
    let entity_domain = entity.domain();
    let verb = if on { service::TURN_ON } else { service::TURN_OFF };

    let call = match entity_domain {
        domain::GROUP => ServiceCall::new(domain::HOMEASSISTANT, verb, &entity.entity_id, ctx),
        domain::COVER => {
            let verb = if on { service::OPEN_COVER } else { service::CLOSE_COVER };
            ServiceCall::new(entity_domain, verb, &entity.entity_id, ctx)
        }
        domain::LOCK => {
            let verb = if on { service::UNLOCK } else { service::LOCK };
            ServiceCall::new(entity_domain, verb, &entity.entity_id, ctx)
        }
        domain::VACUUM => {
            let f = VacuumFeatures::of(entity);
            let verb = match on {
                true if f.contains(VacuumFeatures::START) => service::START,
                true => service::TURN_ON,
                false if f.contains(VacuumFeatures::RETURN_HOME) => service::RETURN_TO_BASE,
                false if f.contains(VacuumFeatures::STOP) => service::STOP,
                false => service::TURN_OFF,
            };
            ServiceCall::new(entity_domain, verb, &entity.entity_id, ctx)
        }
        domain::WATER_HEATER => {
            let candidates = if on { WATER_HEATER_ON } else { WATER_HEATER_OFF };
            let mode = water_heater_operation(entity, candidates);
            ServiceCall::new(entity_domain, service::SET_OPERATION_MODE, &entity.entity_id, ctx)
                .with(attr::OPERATION_MODE, mode)
        }
        domain::SCENE | domain::SCRIPT if !on => {
            warn!(
                entity_id = %entity.entity_id,
                "an 'off' command was issued to a scene or script; check the configuration"
            );
            return Ok(());
        }
        domain::SCENE | domain::SCRIPT => {
            ServiceCall::new(entity_domain, service::TURN_ON, &entity.entity_id, ctx)
        }
        _ => ServiceCall::new(entity_domain, verb, &entity.entity_id, ctx),
    };

    home.call_service(call, entity_domain != domain::SCRIPT).await?;
    Ok(())
}
