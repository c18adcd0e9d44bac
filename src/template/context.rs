// ABOUTME: Template context management for rendering configuration files
// ABOUTME: Provides template variables and an environment snapshot as the root render data

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use super::error::{Result, TemplateError};
use crate::functions::Environment;

/// Root render data: `{ "vars": {...}, "env": {...} }`.
///
/// Variables keep their declared types, so a config value of `3` reaches
/// templates as a number.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateContext {
    pub vars: HashMap<String, JsonValue>,
    pub env: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a context holding only template variables
    pub fn new(vars: &HashMap<String, JsonValue>) -> Self {
        Self {
            vars: vars.clone(),
            env: HashMap::new(),
        }
    }

    /// Create a context with variables and a snapshot of `env`
    pub fn with_environment(vars: &HashMap<String, JsonValue>, env: &dyn Environment) -> Self {
        Self {
            vars: vars.clone(),
            env: env.vars().into_iter().collect(),
        }
    }

    /// Convert context to JSON for handlebars rendering
    pub fn to_json(&self) -> Result<JsonValue> {
        serde_json::to_value(self).map_err(TemplateError::JsonError)
    }
}
