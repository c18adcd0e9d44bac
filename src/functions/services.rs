// ABOUTME: Service directory decoded from the `services` environment variable
// ABOUTME: Implements the services and service(name) template functions with best-effort JSON decoding

use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use super::environment::Environment;

/// Environment variable holding the JSON-encoded service list.
pub const SERVICES_VAR: &str = "services";

/// Field used to look services up by name.
pub const NAME_FIELD: &str = "Name";

/// One decoded service description.
pub type ServiceRecord = Map<String, JsonValue>;

/// Queries over the service list in an environment.
///
/// Nothing is cached: every call decodes the variable again, so changes to the
/// environment between calls are visible.
pub struct ServiceDirectory<'a> {
    env: &'a dyn Environment,
}

impl<'a> ServiceDirectory<'a> {
    pub fn new(env: &'a dyn Environment) -> Self {
        Self { env }
    }

    /// All service records, in declaration order.
    ///
    /// An unset variable or a value that is not a JSON array of objects yields
    /// an empty list.
    pub fn services(&self) -> Vec<ServiceRecord> {
        let Some(raw) = self.env.var(SERVICES_VAR) else {
            debug!("{} is not set, no services available", SERVICES_VAR);
            return Vec::new();
        };

        match serde_json::from_str::<Vec<ServiceRecord>>(&raw) {
            Ok(records) => records,
            Err(e) => {
                debug!("Ignoring undecodable {} value: {}", SERVICES_VAR, e);
                Vec::new()
            }
        }
    }

    /// Records whose `Name` field is exactly `name`.
    pub fn service(&self, name: &str) -> Vec<ServiceRecord> {
        self.services()
            .into_iter()
            .filter(|record| {
                matches!(record.get(NAME_FIELD), Some(JsonValue::String(s)) if s == name)
            })
            .collect()
    }
}
