//! Bridge between the smart home platform's device protocol and a home-automation entity store.

pub mod cap;
pub mod compat;
pub mod config;
pub mod dispatch;
pub mod entity;
pub mod error;
pub mod features;
pub mod hass;
pub mod home;
pub mod model;
pub mod prop;
pub mod protocol;
pub mod type_mapper;

pub use config::{Config, EntityConfig};
pub use dispatch::SmartHome;
pub use error::{ErrorCode, SmartHomeError};
pub use home::{Home, InMemoryHome};
