//! Names used by the home-automation platform: domains, states, attributes and services.

pub mod domain {
    pub const AIR_QUALITY: &str = "air_quality";
    pub const AUTOMATION: &str = "automation";
    pub const BINARY_SENSOR: &str = "binary_sensor";
    pub const CAMERA: &str = "camera";
    pub const CLIMATE: &str = "climate";
    pub const COVER: &str = "cover";
    pub const FAN: &str = "fan";
    pub const GROUP: &str = "group";
    pub const HOMEASSISTANT: &str = "homeassistant";
    pub const INPUT_BOOLEAN: &str = "input_boolean";
    pub const LIGHT: &str = "light";
    pub const LOCK: &str = "lock";
    pub const MEDIA_PLAYER: &str = "media_player";
    pub const SCENE: &str = "scene";
    pub const SCRIPT: &str = "script";
    pub const SENSOR: &str = "sensor";
    pub const SWITCH: &str = "switch";
    pub const VACUUM: &str = "vacuum";
    pub const WATER_HEATER: &str = "water_heater";
}

pub mod state {
    pub const ON: &str = "on";
    pub const OFF: &str = "off";
    pub const UNAVAILABLE: &str = "unavailable";
    pub const UNKNOWN: &str = "unknown";
    pub const OPEN: &str = "open";
    pub const CLOSED: &str = "closed";
    pub const CLEANING: &str = "cleaning";
    pub const DOCKED: &str = "docked";
    pub const PAUSED: &str = "paused";
    pub const PLAYING: &str = "playing";
    pub const LOCKED: &str = "locked";
    pub const UNLOCKED: &str = "unlocked";
    pub const ELECTRIC: &str = "electric";
}

pub mod attr {
    pub const ENTITY_ID: &str = "entity_id";
    pub const SUPPORTED_FEATURES: &str = "supported_features";
    pub const FRIENDLY_NAME: &str = "friendly_name";
    pub const DEVICE_CLASS: &str = "device_class";
    pub const UNIT_OF_MEASUREMENT: &str = "unit_of_measurement";

    pub const MANUFACTURER: &str = "manufacturer";
    pub const MODEL: &str = "model";
    pub const SW_VERSION: &str = "sw_version";
    pub const HW_VERSION: &str = "hw_version";

    pub const BRIGHTNESS: &str = "brightness";
    pub const BRIGHTNESS_PCT: &str = "brightness_pct";
    pub const RGB_COLOR: &str = "rgb_color";
    pub const COLOR_TEMP: &str = "color_temp";
    pub const KELVIN: &str = "kelvin";
    pub const MIN_MIREDS: &str = "min_mireds";
    pub const MAX_MIREDS: &str = "max_mireds";
    pub const EFFECT: &str = "effect";
    pub const EFFECT_LIST: &str = "effect_list";

    pub const HVAC_MODE: &str = "hvac_mode";
    pub const HVAC_MODES: &str = "hvac_modes";
    pub const FAN_MODE: &str = "fan_mode";
    pub const FAN_MODES: &str = "fan_modes";
    pub const SWING_MODE: &str = "swing_mode";
    pub const SWING_MODES: &str = "swing_modes";
    pub const PRESET_MODE: &str = "preset_mode";
    pub const PRESET_MODES: &str = "preset_modes";
    pub const TEMPERATURE: &str = "temperature";
    pub const CURRENT_TEMPERATURE: &str = "current_temperature";
    pub const MIN_TEMP: &str = "min_temp";
    pub const MAX_TEMP: &str = "max_temp";
    pub const HUMIDITY: &str = "humidity";
    pub const CURRENT_HUMIDITY: &str = "current_humidity";
    pub const MIN_HUMIDITY: &str = "min_humidity";
    pub const MAX_HUMIDITY: &str = "max_humidity";
    pub const TARGET_HUMIDITY: &str = "target_humidity";

    pub const SPEED: &str = "speed";
    pub const SPEED_LIST: &str = "speed_list";
    pub const OSCILLATING: &str = "oscillating";

    pub const MEDIA_VOLUME_MUTED: &str = "is_volume_muted";
    pub const MEDIA_VOLUME_LEVEL: &str = "volume_level";
    pub const MEDIA_CONTENT_ID: &str = "media_content_id";
    pub const MEDIA_CONTENT_TYPE: &str = "media_content_type";
    pub const INPUT_SOURCE: &str = "source";
    pub const INPUT_SOURCE_LIST: &str = "source_list";

    pub const CURRENT_POSITION: &str = "current_position";
    pub const POSITION: &str = "position";

    pub const OPERATION_MODE: &str = "operation_mode";
    pub const OPERATION_LIST: &str = "operation_list";

    pub const CURRENT_POWER_W: &str = "current_power_w";
    pub const WATER_LEVEL: &str = "water_level";
    pub const CO2: &str = "carbon_dioxide";
    pub const BATTERY_LEVEL: &str = "battery_level";

    /// Forces a device type (string) or hides the entity (`false`).
    pub const YANDEX_TYPE: &str = "yandex_type";
}

pub mod service {
    pub const TURN_ON: &str = "turn_on";
    pub const TURN_OFF: &str = "turn_off";
    pub const OPEN_COVER: &str = "open_cover";
    pub const CLOSE_COVER: &str = "close_cover";
    pub const SET_COVER_POSITION: &str = "set_cover_position";
    pub const LOCK: &str = "lock";
    pub const UNLOCK: &str = "unlock";
    pub const START: &str = "start";
    pub const STOP: &str = "stop";
    pub const PAUSE: &str = "pause";
    pub const RETURN_TO_BASE: &str = "return_to_base";
    pub const SET_OPERATION_MODE: &str = "set_operation_mode";
    pub const SET_TEMPERATURE: &str = "set_temperature";
    pub const SET_HVAC_MODE: &str = "set_hvac_mode";
    pub const SET_FAN_MODE: &str = "set_fan_mode";
    pub const SET_SWING_MODE: &str = "set_swing_mode";
    pub const SET_PRESET_MODE: &str = "set_preset_mode";
    pub const SET_HUMIDITY: &str = "set_humidity";
    pub const SET_SPEED: &str = "set_speed";
    pub const OSCILLATE: &str = "oscillate";
    pub const VOLUME_MUTE: &str = "volume_mute";
    pub const VOLUME_SET: &str = "volume_set";
    pub const VOLUME_UP: &str = "volume_up";
    pub const VOLUME_DOWN: &str = "volume_down";
    pub const MEDIA_PLAY: &str = "media_play";
    pub const MEDIA_PAUSE: &str = "media_pause";
    pub const MEDIA_NEXT_TRACK: &str = "media_next_track";
    pub const MEDIA_PREVIOUS_TRACK: &str = "media_previous_track";
    pub const PLAY_MEDIA: &str = "play_media";
    pub const SELECT_SOURCE: &str = "select_source";
}

pub mod device_class {
    pub const TEMPERATURE: &str = "temperature";
    pub const HUMIDITY: &str = "humidity";
    pub const BATTERY: &str = "battery";
    pub const TV: &str = "tv";
    pub const ANDROIDTV: &str = "androidtv";
    pub const FIRETV: &str = "firetv";
    pub const OUTLET: &str = "outlet";
    pub const SHADE: &str = "shade";
    pub const SHUTTER: &str = "shutter";
    pub const CURTAIN: &str = "curtain";
    pub const BLIND: &str = "blind";
    pub const AWNING: &str = "awning";
}

pub const MEDIA_TYPE_CHANNEL: &str = "channel";

/// Entities the platform never hands to cloud integrations.
pub const NEVER_EXPOSED_ENTITIES: &[&str] = &["group.all_locks"];
