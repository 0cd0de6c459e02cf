mod common;

use common::{ctx, entity_config, fetch, home_with, last_call, target};
use serde_json::json;
use ysh_core::cap::{
    Capability, CapabilityKind, ColorInstance, ModeInstance, Path, RangeInstance, ToggleInstance,
    resolve,
};
use ysh_core::config::EntityConfig;
use ysh_core::error::ErrorCode;
use ysh_core::features::{LightFeatures, MediaPlayerFeatures, VacuumFeatures};
use ysh_core::model::EntitySnapshot;
use ysh_core::protocol::{ActionState, CapabilityParameters, StateValue};

fn bind<'a>(kind: CapabilityKind, entity: &EntitySnapshot, config: &'a EntityConfig) -> Capability<'a> {
    Capability::bind(kind, entity, config).unwrap_or_else(|| panic!("{kind:?} not resolved"))
}

#[tokio::test]
async fn brightness_reads_as_percent_of_raw_value() {
    let light = EntitySnapshot::new("light.desk", "on")
        .with_features(LightFeatures::BRIGHTNESS.bits())
        .with_attr("brightness", 128);
    let config = EntityConfig::default();
    let home = home_with(vec![light.clone()]).await;

    let cap = bind(CapabilityKind::Range(RangeInstance::Brightness), &light, &config);
    let value = cap.get_value(target(&home, &light, &config)).await.unwrap();

    assert_eq!(value, StateValue::Int(50));
}

#[tokio::test]
async fn cover_on_off_follows_open_state() {
    let config = EntityConfig::default();
    let home = home_with(vec![]).await;

    for (state, expected) in [("open", true), ("closed", false)] {
        let cover = EntitySnapshot::new("cover.gate", state);
        let cap = bind(CapabilityKind::OnOff, &cover, &config);
        let value = cap.get_value(target(&home, &cover, &config)).await.unwrap();
        assert_eq!(value, StateValue::Bool(expected), "state {state}");
    }
}

#[tokio::test]
async fn override_takes_precedence_over_default() {
    let player = EntitySnapshot::new("media_player.tv", "on")
        .with_features(MediaPlayerFeatures::VOLUME_MUTE.bits())
        .with_attr("is_volume_muted", false);
    let relay = EntitySnapshot::new("switch.mute_relay", "on");
    let config = entity_config(json!({"toggles": {"mute": "switch.mute_relay"}}));
    let home = home_with(vec![player.clone(), relay]).await;

    let caps = resolve(&player, &config);
    let mute = caps
        .iter()
        .find(|c| c.kind() == CapabilityKind::Toggle(ToggleInstance::Mute))
        .copied()
        .unwrap();
    assert_eq!(mute, Capability::Toggle(ToggleInstance::Mute, Path::Override("switch.mute_relay")));

    let t = target(&home, &player, &config);
    assert_eq!(mute.get_value(t).await.unwrap(), StateValue::Bool(true));

    mute.set_value(t, &ActionState::new("mute", false), &ctx()).await.unwrap();
    let call = last_call(&home).await;
    assert_eq!(call.service_id(), "switch.turn_off");
    assert_eq!(call.entity_id(), Some("switch.mute_relay"));
}

#[tokio::test]
async fn override_only_toggle_resolves_without_default_support() {
    let heater = EntitySnapshot::new("climate.heater", "heat");
    let config = entity_config(json!({"toggles": {"keep_warm": "input_boolean.keep_warm"}}));
    let home = home_with(vec![heater.clone()]).await;

    let cap = bind(CapabilityKind::Toggle(ToggleInstance::KeepWarm), &heater, &config);
    assert!(cap.is_override());

    // a missing override entity reads as off and cannot be driven
    let t = target(&home, &heater, &config);
    assert_eq!(cap.get_value(t).await.unwrap(), StateValue::Bool(false));
    let err = cap.set_value(t, &ActionState::new("keep_warm", true), &ctx()).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::DeviceUnreachable);
}

#[tokio::test]
async fn default_range_passes_out_of_range_values_through() {
    let light = EntitySnapshot::new("light.desk", "on")
        .with_features(LightFeatures::BRIGHTNESS.bits())
        .with_attr("brightness", 255);
    let config = EntityConfig::default();
    let home = home_with(vec![light.clone()]).await;

    let cap = bind(CapabilityKind::Range(RangeInstance::Brightness), &light, &config);
    cap.set_value(target(&home, &light, &config), &ActionState::new("brightness", 150), &ctx())
        .await
        .unwrap();

    let call = last_call(&home).await;
    assert_eq!(call.service_id(), "light.turn_on");
    assert_eq!(call.data["brightness_pct"], json!(150));
}

#[tokio::test]
async fn override_range_clamps_and_scales() {
    let player = EntitySnapshot::new("media_player.amp", "on")
        .with_features(MediaPlayerFeatures::VOLUME_SET.bits());
    let level = EntitySnapshot::new("input_number.amp_level", "80");
    let config = entity_config(json!({"ranges": {"volume": {
        "entity_id": "input_number.amp_level",
        "set_script": {"service": "script.set_amp_level"},
        "min": 0,
        "max": 50,
        "multiplier": 2
    }}}));
    let home = home_with(vec![player.clone(), level]).await;

    let cap = bind(CapabilityKind::Range(RangeInstance::Volume), &player, &config);
    let t = target(&home, &player, &config);
    assert!(cap.retrievable(&player, &config));
    assert_eq!(cap.get_value(t).await.unwrap(), StateValue::Int(40));

    cap.set_value(t, &ActionState::new("volume", 70), &ctx()).await.unwrap();
    cap.set_value(t, &ActionState::relative("volume", -45), &ctx()).await.unwrap();

    let runs = home.scripts().await;
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].variables["value"], json!(100));
    assert_eq!(runs[0].variables["entity_id"], json!("input_number.amp_level"));
    assert_eq!(runs[0].script.0, json!({"service": "script.set_amp_level"}));
    // relative: 40 - 45 clamps to the lower bound
    assert_eq!(runs[1].variables["value"], json!(0));
}

#[tokio::test]
async fn inverted_override_bounds_settle_on_max() {
    let player = EntitySnapshot::new("media_player.amp", "on")
        .with_features(MediaPlayerFeatures::VOLUME_SET.bits());
    let level = EntitySnapshot::new("input_number.amp_level", "80");
    // parsed without Config::validate, so min > max survives
    let config = entity_config(json!({"ranges": {"volume": {
        "entity_id": "input_number.amp_level",
        "set_script": {"service": "script.set_amp_level"},
        "min": 50,
        "max": 10
    }}}));
    let home = home_with(vec![player.clone(), level]).await;

    let cap = bind(CapabilityKind::Range(RangeInstance::Volume), &player, &config);
    let t = target(&home, &player, &config);
    assert_eq!(cap.get_value(t).await.unwrap(), StateValue::Int(10));

    cap.set_value(t, &ActionState::new("volume", 30), &ctx()).await.unwrap();
    assert_eq!(home.scripts().await[0].variables["value"], json!(10));
}

#[tokio::test]
async fn step_only_volume_is_relative() {
    let radio = EntitySnapshot::new("media_player.radio", "playing")
        .with_features(MediaPlayerFeatures::VOLUME_STEP.bits());
    let config = EntityConfig::default();
    let home = home_with(vec![radio.clone()]).await;

    let cap = bind(CapabilityKind::Range(RangeInstance::Volume), &radio, &config);
    let description = cap.describe(&radio, &config);
    assert!(!description.retrievable);
    assert_eq!(
        description.parameters,
        Some(CapabilityParameters::Range {
            instance: RangeInstance::Volume,
            random_access: false,
            range: None,
            unit: None,
        })
    );

    let t = target(&home, &radio, &config);
    cap.set_value(t, &ActionState::new("volume", 30), &ctx()).await.unwrap();
    assert_eq!(last_call(&home).await.service_id(), "media_player.volume_up");

    cap.set_value(t, &ActionState::relative("volume", -3), &ctx()).await.unwrap();
    assert_eq!(last_call(&home).await.service_id(), "media_player.volume_down");
}

#[tokio::test]
async fn absolute_volume_sets_level_fraction() {
    let amp = EntitySnapshot::new("media_player.amp", "on")
        .with_features((MediaPlayerFeatures::VOLUME_SET | MediaPlayerFeatures::VOLUME_STEP).bits())
        .with_attr("volume_level", 0.25);
    let config = EntityConfig::default();
    let home = home_with(vec![amp.clone()]).await;

    let cap = bind(CapabilityKind::Range(RangeInstance::Volume), &amp, &config);
    let t = target(&home, &amp, &config);
    assert_eq!(cap.get_value(t).await.unwrap(), StateValue::Int(25));

    cap.set_value(t, &ActionState::relative("volume", 10), &ctx()).await.unwrap();
    let call = last_call(&home).await;
    assert_eq!(call.service_id(), "media_player.volume_set");
    assert_eq!(call.data["volume_level"], json!(0.35));
}

#[tokio::test]
async fn channel_up_runs_script_and_down_falls_back_to_track() {
    let tv = EntitySnapshot::new("media_player.tv", "on").with_features(
        (MediaPlayerFeatures::PREVIOUS_TRACK | MediaPlayerFeatures::NEXT_TRACK).bits(),
    );
    let config = entity_config(json!({"channel_up": {"service": "remote.send_command"}}));
    let home = home_with(vec![tv.clone()]).await;

    let cap = bind(CapabilityKind::Range(RangeInstance::Channel), &tv, &config);
    assert!(!cap.retrievable(&tv, &config));
    let t = target(&home, &tv, &config);

    cap.set_value(t, &ActionState::relative("channel", 1), &ctx()).await.unwrap();
    let runs = home.scripts().await;
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].variables["entity_id"], json!("media_player.tv"));

    cap.set_value(t, &ActionState::relative("channel", -1), &ctx()).await.unwrap();
    assert_eq!(last_call(&home).await.service_id(), "media_player.media_previous_track");

    let err = cap.set_value(t, &ActionState::new("channel", 5), &ctx()).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotSupportedInCurrentMode);
}

#[tokio::test]
async fn channel_via_content_id_is_random_access() {
    let tv = EntitySnapshot::new("media_player.tv", "on")
        .with_features(MediaPlayerFeatures::PLAY_MEDIA.bits())
        .with_attr("media_content_type", "channel")
        .with_attr("media_content_id", "15");
    let config = entity_config(json!({"channel_set_via_media_content_id": true}));
    let home = home_with(vec![tv.clone()]).await;

    let cap = bind(CapabilityKind::Range(RangeInstance::Channel), &tv, &config);
    let t = target(&home, &tv, &config);
    assert_eq!(cap.get_value(t).await.unwrap(), StateValue::Int(15));

    cap.set_value(t, &ActionState::new("channel", 42), &ctx()).await.unwrap();
    let call = last_call(&home).await;
    assert_eq!(call.service_id(), "media_player.play_media");
    assert_eq!(call.data["media_content_id"], json!("42"));
    assert_eq!(call.data["media_content_type"], json!("channel"));
}

#[tokio::test]
async fn rgb_round_trips_through_the_entity() {
    let light = EntitySnapshot::new("light.strip", "on").with_features(LightFeatures::COLOR.bits());
    let config = EntityConfig::default();
    let home = home_with(vec![light.clone()]).await;

    let cap = bind(CapabilityKind::Color(ColorInstance::Rgb), &light, &config);
    cap.set_value(target(&home, &light, &config), &ActionState::new("rgb", 0x123456), &ctx())
        .await
        .unwrap();
    assert_eq!(last_call(&home).await.data["rgb_color"], json!([0x12, 0x34, 0x56]));

    let updated = fetch(&home, "light.strip").await;
    let value = cap.get_value(target(&home, &updated, &config)).await.unwrap();
    assert_eq!(value, StateValue::Int(0x123456));
}

#[tokio::test]
async fn color_temperature_converts_from_mireds() {
    let light = EntitySnapshot::new("light.lamp", "on")
        .with_features(LightFeatures::COLOR_TEMP.bits())
        .with_attr("color_temp", 250)
        .with_attr("min_mireds", 153)
        .with_attr("max_mireds", 500);
    let config = EntityConfig::default();
    let home = home_with(vec![light.clone()]).await;

    let cap = bind(CapabilityKind::Color(ColorInstance::TemperatureK), &light, &config);
    assert!(Capability::bind(CapabilityKind::Color(ColorInstance::Rgb), &light, &config).is_none());

    let t = target(&home, &light, &config);
    assert_eq!(cap.get_value(t).await.unwrap(), StateValue::Int(4000));

    let params = serde_json::to_value(cap.parameters(&light, &config)).unwrap();
    assert_eq!(params, json!({"temperature_k": {"min": 2000, "max": 6535}}));

    cap.set_value(t, &ActionState::new("temperature_k", 2700), &ctx()).await.unwrap();
    assert_eq!(last_call(&home).await.data["kelvin"], json!(2700));
}

#[tokio::test]
async fn thermostat_mode_round_trips_and_rejects_unmapped_tags() {
    let ac = EntitySnapshot::new("climate.ac", "heat")
        .with_attr("hvac_modes", vec!["off", "heat", "cool", "heat_cool"]);
    let config = EntityConfig::default();
    let home = home_with(vec![ac.clone()]).await;

    let cap = bind(CapabilityKind::Mode(ModeInstance::Thermostat), &ac, &config);
    let params = serde_json::to_value(cap.parameters(&ac, &config)).unwrap();
    assert_eq!(
        params,
        json!({"instance": "thermostat", "modes": [{"value": "auto"}, {"value": "cool"}, {"value": "heat"}]})
    );

    let t = target(&home, &ac, &config);
    cap.set_value(t, &ActionState::new("thermostat", "cool"), &ctx()).await.unwrap();
    let updated = fetch(&home, "climate.ac").await;
    let value = cap.get_value(target(&home, &updated, &config)).await.unwrap();
    assert_eq!(value, StateValue::Str("cool".into()));

    let err = cap.set_value(t, &ActionState::new("thermostat", "dry"), &ctx()).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidValue);

    let err = cap.set_value(t, &ActionState::new("thermostat", true), &ctx()).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidValue);
}

#[tokio::test]
async fn unmapped_current_mode_reads_as_first_mode() {
    let ac = EntitySnapshot::new("climate.ac", "off").with_attr("hvac_modes", vec!["off", "cool", "heat"]);
    let config = EntityConfig::default();
    let home = home_with(vec![ac.clone()]).await;

    let cap = bind(CapabilityKind::Mode(ModeInstance::Thermostat), &ac, &config);
    let value = cap.get_value(target(&home, &ac, &config)).await.unwrap();
    assert_eq!(value, StateValue::Str("cool".into()));
}

#[tokio::test]
async fn input_sources_map_positionally_or_by_config() {
    let tv = EntitySnapshot::new("media_player.tv", "on")
        .with_features(MediaPlayerFeatures::SELECT_SOURCE.bits())
        .with_attr("source_list", vec!["HDMI 1", "HDMI 2"])
        .with_attr("source", "HDMI 2");
    let home = home_with(vec![tv.clone()]).await;

    let config = EntityConfig::default();
    let cap = bind(CapabilityKind::Mode(ModeInstance::InputSource), &tv, &config);
    let t = target(&home, &tv, &config);
    assert_eq!(cap.get_value(t).await.unwrap(), StateValue::Str("two".into()));
    cap.set_value(t, &ActionState::new("input_source", "one"), &ctx()).await.unwrap();
    let call = last_call(&home).await;
    assert_eq!(call.service_id(), "media_player.select_source");
    assert_eq!(call.data["source"], json!("HDMI 1"));

    let custom = entity_config(json!({"sources": {"one": "HDMI 2", "two": "Cable"}}));
    let cap = bind(CapabilityKind::Mode(ModeInstance::InputSource), &tv, &custom);
    let params = serde_json::to_value(cap.parameters(&tv, &custom)).unwrap();
    assert_eq!(params["modes"], json!([{"value": "one"}]));

    let disabled = entity_config(json!({"sources": false}));
    let kind = CapabilityKind::Mode(ModeInstance::InputSource);
    assert!(Capability::bind(kind, &tv, &disabled).is_none());
}

#[tokio::test]
async fn mode_override_runs_script_with_mapped_state() {
    let purifier = EntitySnapshot::new("fan.purifier", "on");
    let level = EntitySnapshot::new("input_select.purifier_speed", "Silent");
    let config = entity_config(json!({"modes": {"fan_speed": {
        "entity_id": "input_select.purifier_speed",
        "set_script": {"service": "script.purifier_speed"},
        "mapping": {"low": ["Silent"], "high": ["Strong", "Max"]}
    }}}));
    let home = home_with(vec![purifier.clone(), level]).await;

    let cap = bind(CapabilityKind::Mode(ModeInstance::FanSpeed), &purifier, &config);
    let t = target(&home, &purifier, &config);
    assert_eq!(cap.get_value(t).await.unwrap(), StateValue::Str("low".into()));

    cap.set_value(t, &ActionState::new("fan_speed", "high"), &ctx()).await.unwrap();
    let run = home.scripts().await.pop().unwrap();
    assert_eq!(run.variables["value"], json!("Strong"));

    let err = cap.set_value(t, &ActionState::new("fan_speed", "turbo"), &ctx()).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidValue);
}

#[tokio::test]
async fn scene_off_is_a_no_op() {
    let scene = EntitySnapshot::new("scene.movie", "scening");
    let config = EntityConfig::default();
    let home = home_with(vec![scene.clone()]).await;

    let cap = bind(CapabilityKind::OnOff, &scene, &config);
    assert!(!cap.retrievable(&scene, &config));

    let t = target(&home, &scene, &config);
    cap.set_value(t, &ActionState::new("on", false), &ctx()).await.unwrap();
    assert!(home.calls().await.is_empty());

    cap.set_value(t, &ActionState::new("on", true), &ctx()).await.unwrap();
    assert_eq!(last_call(&home).await.service_id(), "scene.turn_on");
}

#[tokio::test]
async fn vacuum_starts_and_reports_pause() {
    let features = VacuumFeatures::START | VacuumFeatures::RETURN_HOME | VacuumFeatures::PAUSE;
    let robot = EntitySnapshot::new("vacuum.robot", "docked").with_features(features.bits());
    let config = EntityConfig::default();
    let home = home_with(vec![robot.clone()]).await;

    let on_off = bind(CapabilityKind::OnOff, &robot, &config);
    on_off.set_value(target(&home, &robot, &config), &ActionState::new("on", true), &ctx())
        .await
        .unwrap();
    assert_eq!(last_call(&home).await.service_id(), "vacuum.start");

    let pause = bind(CapabilityKind::Toggle(ToggleInstance::Pause), &robot, &config);
    // no STATE feature: pause is write-only
    assert!(!pause.retrievable(&robot, &config));

    let cleaning = fetch(&home, "vacuum.robot").await;
    let value = pause.get_value(target(&home, &cleaning, &config)).await.unwrap();
    assert_eq!(value, StateValue::Bool(false));
}

#[tokio::test]
async fn mute_without_attribute_is_not_supported() {
    let tv = EntitySnapshot::new("media_player.tv", "off")
        .with_features(MediaPlayerFeatures::VOLUME_MUTE.bits());
    let config = EntityConfig::default();
    let home = home_with(vec![tv.clone()]).await;

    let cap = bind(CapabilityKind::Toggle(ToggleInstance::Mute), &tv, &config);
    let err = cap
        .set_value(target(&home, &tv, &config), &ActionState::new("mute", true), &ctx())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotSupportedInCurrentMode);
}

#[tokio::test]
async fn climate_temperature_uses_entity_bounds() {
    let thermostat = EntitySnapshot::new("climate.hall", "heat")
        .with_features(1)
        .with_attr("temperature", 21.5)
        .with_attr("min_temp", 10)
        .with_attr("max_temp", 30);
    let config = EntityConfig::default();
    let home = home_with(vec![thermostat.clone()]).await;

    let cap = bind(CapabilityKind::Range(RangeInstance::Temperature), &thermostat, &config);
    let params = serde_json::to_value(cap.parameters(&thermostat, &config)).unwrap();
    assert_eq!(
        params,
        json!({
            "instance": "temperature",
            "random_access": true,
            "range": {"min": 10.0, "max": 30.0, "precision": 0.5},
            "unit": "unit.temperature.celsius"
        })
    );

    let t = target(&home, &thermostat, &config);
    assert_eq!(cap.get_value(t).await.unwrap(), StateValue::Float(21.5));

    cap.set_value(t, &ActionState::relative("temperature", 2), &ctx()).await.unwrap();
    let call = last_call(&home).await;
    assert_eq!(call.service_id(), "climate.set_temperature");
    assert_eq!(call.data["temperature"], json!(23.5));
}
