use crate::cap::{ToggleInstance, on_off};
use crate::compat::{ToggleRead, ToggleWrite, toggle_binding};
use crate::error::{Result, SmartHomeError};
use crate::features::VacuumFeatures;
use crate::hass::domain;
use crate::home::Home;
use crate::model::{AttrValue, Context, EntitySnapshot, ServiceCall};

pub fn supported(instance: ToggleInstance, entity: &EntitySnapshot) -> bool {
    toggle_binding(instance, entity).is_some()
}

/// A vacuum only reports pause when it publishes its state.
pub fn retrievable(instance: ToggleInstance, entity: &EntitySnapshot) -> bool {
    match (instance, entity.domain()) {
        (ToggleInstance::Pause, domain::VACUUM) => {
            VacuumFeatures::of(entity).contains(VacuumFeatures::STATE)
        }
        _ => true,
    }
}

pub fn get_default(instance: ToggleInstance, entity: &EntitySnapshot) -> bool {
    match toggle_binding(instance, entity).map(|b| b.read) {
        Some(ToggleRead::Attribute(name)) => {
            entity.attr(name).and_then(AttrValue::as_bool).unwrap_or(false)
        }
        Some(ToggleRead::StateIsNot(s)) => entity.state != s,
        None => false,
    }
}

pub async fn set_default(
    instance: ToggleInstance,
    home: &dyn Home,
    entity: &EntitySnapshot,
    value: bool,
    ctx: &Context,
) -> Result<()> {
    let binding = toggle_binding(instance, entity).ok_or_else(|| {
        SmartHomeError::not_supported(format!("{instance} is not available for {}", entity.entity_id))
    })?;

    let call = match binding.write {
        ToggleWrite::Flag { service, attr } => {
            // a player that is off drops its mute attribute
            if instance == ToggleInstance::Mute && entity.attr(attr).is_none() {
                return Err(SmartHomeError::not_supported("device probably turned off"));
            }
            ServiceCall::new(entity.domain(), service, &entity.entity_id, ctx).with(attr, value)
        }
        ToggleWrite::Verbs { on, off } => {
            let verb = if value { on } else { off };
            ServiceCall::new(entity.domain(), verb, &entity.entity_id, ctx)
        }
    };

    home.call_service(call, true).await?;
    Ok(())
}

/// Override entities are read and driven like an on/off device.
pub async fn get_override(home: &dyn Home, entity_id: &str) -> Result<bool> {
    Ok(home.get_state(entity_id).await?.map(|s| on_off::is_on(&s)).unwrap_or(false))
}

pub async fn set_override(
    home: &dyn Home,
    entity_id: &str,
    value: bool,
    ctx: &Context,
) -> Result<()> {
    let target = home
        .get_state(entity_id)
        .await?
        .ok_or_else(|| SmartHomeError::unreachable(format!("entity {entity_id} not found")))?;
    on_off::turn(home, &target, value, ctx).await
}
