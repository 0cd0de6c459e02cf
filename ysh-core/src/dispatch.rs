//! Routes platform requests to entities and aggregates per-device results.

use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::entity::YandexEntity;
use crate::error::{ErrorCode, Result, SmartHomeError};
use crate::hass::{NEVER_EXPOSED_ENTITIES, attr};
use crate::home::{DeviceRegistry, ExposureFilter, Home};
use crate::model::{AttrValue, Context, EntitySnapshot};
use crate::protocol::{
    ActionDevice, ActionRequest, ActionState, ActionResponsePayload, ActionResult, CapabilityResult,
    DeviceActionResult, DeviceState, DevicesPayload, Envelope, ErrorPayload, InstanceResult,
    Payload, QueryPayload, QueryRequest,
};

pub const PATH_DEVICES: &str = "/user/devices";
pub const PATH_QUERY: &str = "/user/devices/query";
pub const PATH_ACTION: &str = "/user/devices/action";
pub const PATH_UNLINK: &str = "/user/unlink";

fn hidden(entity: &EntitySnapshot) -> bool {
    matches!(entity.attr(attr::YANDEX_TYPE), Some(AttrValue::Bool(false)))
}

#[derive(Clone)]
pub struct SmartHome {
    home: Arc<dyn Home>,
    registry: Option<Arc<dyn DeviceRegistry>>,
    filter: Arc<dyn ExposureFilter>,
    config: Arc<Config>,
}

impl SmartHome {
    /// Exposure follows the filter in `config` until replaced with [`SmartHome::with_filter`].
    pub fn new(home: Arc<dyn Home>, config: Arc<Config>) -> Self {
        let filter: Arc<dyn ExposureFilter> = Arc::new(config.filter.clone());
        Self { home, registry: None, filter, config }
    }

    pub fn with_registry(mut self, registry: Arc<dyn DeviceRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_filter(mut self, filter: Arc<dyn ExposureFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetches an exposed, visible entity or says why it cannot be used.
    async fn lookup(&self, entity_id: &str) -> std::result::Result<YandexEntity<'_>, ErrorCode> {
        if !self.filter.is_exposed(entity_id) {
            return Err(ErrorCode::DeviceNotFound);
        }

        let state = match self.home.get_state(entity_id).await {
            Ok(Some(state)) if !hidden(&state) => state,
            Ok(_) => return Err(ErrorCode::DeviceUnreachable),
            Err(err) => {
                error!(entity_id, error = %err, "failed to fetch entity state");
                return Err(ErrorCode::InternalError);
            }
        };

        let config = self.config.entity(entity_id);
        Ok(YandexEntity::new(self.home.as_ref(), state, config))
    }

    pub async fn handle_discovery(&self, user_id: &str) -> Result<DevicesPayload> {
        let registry = self.registry.as_deref();
        let mut devices = Vec::new();

        for state in self.home.all_states().await? {
            let entity_id = state.entity_id.clone();
            if NEVER_EXPOSED_ENTITIES.contains(&entity_id.as_str())
                || hidden(&state)
                || !self.filter.is_exposed(&entity_id)
            {
                continue;
            }

            let entity = YandexEntity::new(self.home.as_ref(), state, self.config.entity(&entity_id));
            match entity.devices_serialize(registry).await {
                Ok(Some(device)) => devices.push(device),
                Ok(None) => {}
                Err(err) => debug!(entity_id, error = %err, "skipping entity in discovery"),
            }
        }

        Ok(DevicesPayload { user_id: user_id.to_string(), devices })
    }

    async fn query_device(&self, entity_id: &str) -> DeviceState {
        let entity = match self.lookup(entity_id).await {
            Ok(entity) => entity,
            Err(code) => return DeviceState::error(entity_id, code),
        };

        match entity.query_serialize().await {
            Ok(state) => state,
            Err(err) => {
                error!(entity_id, code = %err.code(), error = %err, "failed to read device state");
                DeviceState::error(entity_id, err.code())
            }
        }
    }

    pub async fn handle_query(&self, request: &QueryRequest) -> QueryPayload {
        let devices = join_all(request.devices.iter().map(|d| self.query_device(&d.id))).await;
        QueryPayload { devices }
    }

    async fn action_device(&self, device: &ActionDevice, ctx: &Context) -> DeviceActionResult {
        let mut entity = match self.lookup(&device.id).await {
            Ok(entity) => entity,
            Err(code) => return DeviceActionResult::error(&device.id, code),
        };

        // operations run in request order against the snapshot taken above
        let mut failures: HashMap<usize, ErrorCode> = HashMap::new();
        let fallback = ActionState::default();
        for (n, op) in device.capabilities.iter().enumerate() {
            let state = op.state.as_ref().unwrap_or(&fallback);
            if let Err(err) = entity.execute(ctx, &op.kind, state).await {
                error!(
                    entity_id = %device.id,
                    capability = %op.kind,
                    code = %err.code(),
                    error = %err,
                    "action failed"
                );
                failures.insert(n, err.code());
            }
        }

        if let Err(err) = entity.refresh().await {
            warn!(entity_id = %device.id, error = %err, "could not refresh entity after action");
        }

        let capabilities = device
            .capabilities
            .iter()
            .enumerate()
            .filter_map(|(n, op)| {
                let instance = op.state.as_ref()?.instance.clone()?;
                let action_result = match failures.get(&n) {
                    Some(code) => ActionResult::error(*code),
                    None => ActionResult::done(),
                };
                Some(CapabilityResult {
                    kind: op.kind.clone(),
                    state: InstanceResult { instance, action_result },
                })
            })
            .collect();

        DeviceActionResult { id: device.id.clone(), capabilities: Some(capabilities), error_code: None }
    }

    /// Devices run concurrently; operations on one device run in order.
    pub async fn handle_action(&self, request: &ActionRequest, ctx: &Context) -> ActionResponsePayload {
        let devices =
            join_all(request.payload.devices.iter().map(|d| self.action_device(d, ctx))).await;
        ActionResponsePayload { devices }
    }

    async fn route(
        &self,
        path: &str,
        user_id: &str,
        body: &str,
    ) -> Result<Option<Payload>> {
        match path {
            PATH_DEVICES => Ok(Some(Payload::Devices(self.handle_discovery(user_id).await?))),
            PATH_QUERY => {
                let request: QueryRequest = parse_body(body)?;
                Ok(Some(Payload::Query(self.handle_query(&request).await)))
            }
            PATH_ACTION => {
                let request: ActionRequest = parse_body(body)?;
                let ctx = Context::with_user(user_id);
                Ok(Some(Payload::Action(self.handle_action(&request, &ctx).await)))
            }
            PATH_UNLINK => Ok(None),
            other => Err(SmartHomeError::internal(format!("unhandled path {other}"))),
        }
    }

    /// Entry point for the transport: never fails, errors become an error payload.
    pub async fn handle_message(
        &self,
        path: &str,
        user_id: &str,
        request_id: &str,
        body: &str,
    ) -> Envelope {
        let payload = match self.route(path, user_id, body).await {
            Ok(payload) => payload,
            Err(err) => {
                match &err {
                    SmartHomeError::Protocol { .. } => {
                        warn!(path, request_id, code = %err.code(), error = %err, "request rejected")
                    }
                    SmartHomeError::Fault(fault) => {
                        error!(path, request_id, error = ?fault, "request failed")
                    }
                }
                Some(Payload::Error(ErrorPayload { error_code: err.code() }))
            }
        };

        Envelope { request_id: request_id.to_string(), payload }
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &str) -> Result<T> {
    let body = if body.trim().is_empty() { "{}" } else { body };
    serde_json::from_str(body).map_err(|err| SmartHomeError::Fault(err.into()))
}
