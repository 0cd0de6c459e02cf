mod common;

use common::{ctx, entity_config, home_with};
use serde_json::json;
use ysh_core::config::EntityConfig;
use ysh_core::entity::YandexEntity;
use ysh_core::error::ErrorCode;
use ysh_core::features::{ClimateFeatures, LightFeatures};
use ysh_core::home::InMemoryHome;
use ysh_core::model::{AreaEntry, DeviceEntry, EntitySnapshot};
use ysh_core::protocol::ActionState;
use ysh_core::type_mapper::{DeviceType, determine_type};

fn color_light() -> EntitySnapshot {
    let features = LightFeatures::BRIGHTNESS | LightFeatures::COLOR | LightFeatures::COLOR_TEMP;
    EntitySnapshot::new("light.living_room", "on")
        .with_features(features.bits())
        .with_attr("brightness", 255)
        .with_attr("rgb_color", vec![255, 0, 0])
        .with_attr("color_temp", 300)
        .with_attr("manufacturer", "Attr Corp")
        .with_attr("model", "L1")
}

#[tokio::test]
async fn discovery_describes_a_color_light() {
    let light = color_light();
    let config = EntityConfig::default();
    let home = home_with(vec![light.clone()]).await;

    let entity = YandexEntity::new(&home, light, &config);
    let device = entity.devices_serialize(None).await.unwrap().unwrap();
    let v = serde_json::to_value(&device).unwrap();

    assert_eq!(v["id"], "light.living_room");
    assert_eq!(v["name"], "living room");
    assert_eq!(v["type"], "devices.types.light");
    // rgb and temperature_k share one description
    assert_eq!(
        v["capabilities"],
        json!([
            {"type": "devices.capabilities.on_off", "retrievable": true},
            {"type": "devices.capabilities.range", "retrievable": true, "parameters": {
                "instance": "brightness",
                "random_access": true,
                "range": {"min": 0.0, "max": 100.0, "precision": 1.0},
                "unit": "unit.percent"
            }},
            {"type": "devices.capabilities.color_setting", "retrievable": true, "parameters": {
                "color_model": "rgb",
                "temperature_k": {"min": 2000, "max": 6535}
            }}
        ])
    );
    assert_eq!(v["properties"], json!([]));
    assert_eq!(v["device_info"], json!({"manufacturer": "Attr Corp", "model": "L1"}));
    assert!(v.get("room").is_none());
}

#[tokio::test]
async fn registry_data_wins_over_attributes_and_supplies_the_room() {
    let light = color_light();
    let home = home_with(vec![light.clone()]).await;
    home.upsert_device(DeviceEntry {
        id: "dev-1".into(),
        manufacturer: Some("Registry Inc".into()),
        sw_version: Some("2.1".into()),
        area_id: Some("area-1".into()),
        entities: vec!["light.living_room".into()],
        ..DeviceEntry::default()
    })
    .await;
    home.upsert_area(AreaEntry { id: "area-1".into(), name: "Living Room".into() }).await;

    let config = EntityConfig::default();
    let entity = YandexEntity::new(&home, light.clone(), &config);
    let device = entity.devices_serialize(Some(&home)).await.unwrap().unwrap();
    assert_eq!(device.room.as_deref(), Some("Living Room"));
    let info = device.device_info.unwrap();
    assert_eq!(info.manufacturer.as_deref(), Some("Registry Inc"));
    assert_eq!(info.model.as_deref(), Some("L1"));
    assert_eq!(info.sw_version.as_deref(), Some("2.1"));

    let config = entity_config(json!({"room": "Kitchen", "name": "Ceiling"}));
    let entity = YandexEntity::new(&home, light, &config);
    let device = entity.devices_serialize(Some(&home)).await.unwrap().unwrap();
    assert_eq!(device.room.as_deref(), Some("Kitchen"));
    assert_eq!(device.name, "Ceiling");
}

#[tokio::test]
async fn blank_configured_name_falls_back_to_entity_name() {
    let light = EntitySnapshot::new("light.porch", "on").with_attr("friendly_name", "Porch");
    let home = home_with(vec![light.clone()]).await;
    let config = entity_config(json!({"name": "  "}));

    let entity = YandexEntity::new(&home, light, &config);
    assert_eq!(entity.name(), "Porch");
    let device = entity.devices_serialize(None).await.unwrap().unwrap();
    assert_eq!(device.name, "Porch");
}

#[tokio::test]
async fn discovery_omits_entities_with_nothing_to_show() {
    let home = InMemoryHome::new();
    let config = EntityConfig::default();

    let blank = EntitySnapshot::new("switch.blank", "on").with_attr("friendly_name", "   ");
    let uptime = EntitySnapshot::new("sensor.uptime", "1234");
    let gone = EntitySnapshot::new("switch.garage", "unavailable");

    for snapshot in [blank, uptime, gone] {
        let id = snapshot.entity_id.clone();
        let entity = YandexEntity::new(&home, snapshot, &config);
        assert!(entity.devices_serialize(None).await.unwrap().is_none(), "{id} should be omitted");
    }
}

#[tokio::test]
async fn query_reports_retrievable_values_only() {
    let scene = EntitySnapshot::new("scene.movie", "scening");
    let sensor = EntitySnapshot::new("sensor.hall", "20").with_attr("device_class", "temperature");
    let home = home_with(vec![]).await;
    let config = EntityConfig::default();

    let state = YandexEntity::new(&home, scene, &config).query_serialize().await.unwrap();
    assert_eq!(state.capabilities, Some(vec![]));

    let state = YandexEntity::new(&home, sensor, &config).query_serialize().await.unwrap();
    assert_eq!(
        serde_json::to_value(&state).unwrap(),
        json!({
            "id": "sensor.hall",
            "capabilities": [],
            "properties": [{"type": "devices.properties.float", "state": {"instance": "temperature", "value": 20.0}}]
        })
    );
}

#[tokio::test]
async fn unavailable_entity_queries_as_unreachable() {
    let home = InMemoryHome::new();
    let config = EntityConfig::default();
    let light = EntitySnapshot::new("light.porch", "unavailable");

    let state = YandexEntity::new(&home, light, &config).query_serialize().await.unwrap();
    let v = serde_json::to_value(&state).unwrap();
    assert_eq!(v, json!({"id": "light.porch", "error_code": "DEVICE_UNREACHABLE"}));
}

#[tokio::test]
async fn execute_matches_type_and_instance() {
    let light = EntitySnapshot::new("light.desk", "off");
    let home = home_with(vec![light.clone()]).await;
    let config = EntityConfig::default();
    let entity = YandexEntity::new(&home, light, &config);

    let no_instance = ActionState { value: json!(true), ..ActionState::default() };
    let err = entity
        .execute(&ctx(), "devices.capabilities.on_off", &no_instance)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidValue);

    let err = entity
        .execute(&ctx(), "devices.capabilities.range", &ActionState::new("brightness", 10))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotSupportedInCurrentMode);

    entity
        .execute(&ctx(), "devices.capabilities.on_off", &ActionState::new("on", true))
        .await
        .unwrap();
    let calls = home.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].service_id(), "light.turn_on");
    assert_eq!(calls[0].context.user_id.as_deref(), Some("test-user"));
}

#[tokio::test]
async fn refresh_picks_up_service_effects() {
    let light = EntitySnapshot::new("light.desk", "off");
    let home = home_with(vec![light.clone()]).await;
    let config = EntityConfig::default();
    let mut entity = YandexEntity::new(&home, light, &config);

    entity
        .execute(&ctx(), "devices.capabilities.on_off", &ActionState::new("on", true))
        .await
        .unwrap();
    assert_eq!(entity.state().state, "off");

    entity.refresh().await.unwrap();
    assert_eq!(entity.state().state, "on");
}

#[test]
fn device_types_follow_domain_and_subtype_rules() {
    let config = EntityConfig::default();
    let cases = [
        (EntitySnapshot::new("light.a", "on"), DeviceType::Light),
        (EntitySnapshot::new("climate.a", "cool"), DeviceType::Thermostat),
        (
            EntitySnapshot::new("climate.b", "cool").with_features(ClimateFeatures::SWING_MODE.bits()),
            DeviceType::ThermostatAc,
        ),
        (EntitySnapshot::new("cover.a", "open"), DeviceType::Openable),
        (EntitySnapshot::new("cover.b", "open").with_attr("device_class", "blind"), DeviceType::OpenableCurtain),
        (EntitySnapshot::new("fan.a", "on"), DeviceType::Thermostat),
        (EntitySnapshot::new("fan.b", "on").with_attr("model", "zhimi.humidifier.v1"), DeviceType::Humidifier),
        (EntitySnapshot::new("fan.c", "on").with_attr("target_humidity", 45), DeviceType::Humidifier),
        (EntitySnapshot::new("media_player.a", "on"), DeviceType::MediaDevice),
        (EntitySnapshot::new("media_player.b", "on").with_attr("device_class", "tv"), DeviceType::MediaDeviceTv),
        (
            EntitySnapshot::new("media_player.c", "on").with_attr("device_class", "androidtv"),
            DeviceType::MediaDeviceTvBox,
        ),
        (EntitySnapshot::new("switch.a", "on"), DeviceType::Switch),
        (EntitySnapshot::new("switch.b", "on").with_attr("device_class", "outlet"), DeviceType::Socket),
        (EntitySnapshot::new("water_heater.a", "on"), DeviceType::CookingKettle),
        (EntitySnapshot::new("vacuum.a", "docked"), DeviceType::VacuumCleaner),
        (EntitySnapshot::new("sensor.a", "1"), DeviceType::Other),
        (EntitySnapshot::new("weather.a", "sunny"), DeviceType::Other),
    ];

    for (entity, expected) in cases {
        assert_eq!(determine_type(&entity, &config), expected, "{}", entity.entity_id);
    }
}

#[test]
fn forced_types_take_precedence() {
    let switch = EntitySnapshot::new("switch.heater", "on").with_attr("yandex_type", "devices.types.thermostat");
    assert_eq!(determine_type(&switch, &EntityConfig::default()), DeviceType::Thermostat);

    let config = entity_config(json!({"type": "cooking.coffee_maker"}));
    assert_eq!(determine_type(&switch, &config), DeviceType::CookingCoffeeMaker);

    let bogus = EntitySnapshot::new("switch.b", "on").with_attr("yandex_type", "toaster");
    assert_eq!(determine_type(&bogus, &EntityConfig::default()), DeviceType::Switch);
}
