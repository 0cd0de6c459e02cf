use crate::config::AuthConfig;
use ysh_core::SmartHome;

#[derive(Clone)]
pub struct AppState {
    pub smart_home: SmartHome,
    pub auth: AuthConfig,
    pub diagnostics: bool,
}
