use crate::model::EntitySnapshot;

macro_rules! domain_features {
    ($($name:ident),* $(,)?) => {
        $(
            impl $name {
                pub fn of(entity: &EntitySnapshot) -> Self {
                    Self::from_bits_truncate(entity.feature_bits())
                }
            }
        )*
    };
}

bitflags::bitflags! {
    #[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LightFeatures: u32 {
        const BRIGHTNESS = 1;
        const COLOR_TEMP = 2;
        const EFFECT     = 4;
        const FLASH      = 8;
        const COLOR      = 16;
        const TRANSITION = 32;
    }
}

bitflags::bitflags! {
    #[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MediaPlayerFeatures: u32 {
        const PAUSE          = 1;
        const SEEK           = 2;
        const VOLUME_SET     = 4;
        const VOLUME_MUTE    = 8;
        const PREVIOUS_TRACK = 16;
        const NEXT_TRACK     = 32;
        const TURN_ON        = 128;
        const TURN_OFF       = 256;
        const PLAY_MEDIA     = 512;
        const VOLUME_STEP    = 1024;
        const SELECT_SOURCE  = 2048;
        const STOP           = 4096;
        const PLAY           = 16384;
    }
}

bitflags::bitflags! {
    #[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VacuumFeatures: u32 {
        const TURN_ON     = 1;
        const TURN_OFF    = 2;
        const PAUSE       = 4;
        const STOP        = 8;
        const RETURN_HOME = 16;
        const FAN_SPEED   = 32;
        const BATTERY     = 64;
        const STATUS      = 128;
        const LOCATE      = 512;
        const CLEAN_SPOT  = 1024;
        const STATE       = 4096;
        const START       = 8192;
    }
}

bitflags::bitflags! {
    #[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClimateFeatures: u32 {
        const TARGET_TEMPERATURE       = 1;
        const TARGET_TEMPERATURE_RANGE = 2;
        const TARGET_HUMIDITY          = 4;
        const FAN_MODE                 = 8;
        const PRESET_MODE              = 16;
        const SWING_MODE               = 32;
        const AUX_HEAT                 = 64;
    }
}

bitflags::bitflags! {
    #[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CoverFeatures: u32 {
        const OPEN         = 1;
        const CLOSE        = 2;
        const SET_POSITION = 4;
        const STOP         = 8;
    }
}

bitflags::bitflags! {
    #[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FanFeatures: u32 {
        const SET_SPEED = 1;
        const OSCILLATE = 2;
        const DIRECTION = 4;
    }
}

bitflags::bitflags! {
    #[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WaterHeaterFeatures: u32 {
        const TARGET_TEMPERATURE = 1;
        const OPERATION_MODE     = 2;
        const AWAY_MODE          = 4;
    }
}

domain_features!(
    LightFeatures,
    MediaPlayerFeatures,
    VacuumFeatures,
    ClimateFeatures,
    CoverFeatures,
    FanFeatures,
    WaterHeaterFeatures,
);
