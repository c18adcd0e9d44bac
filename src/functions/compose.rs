// ABOUTME: Sub-template composition for the include template function
// ABOUTME: Looks up a named fragment in the host engine and renders it with an optional context value

use handlebars::{Handlebars, RenderError};
use serde_json::Value as JsonValue;

use super::error::IncludeError;

/// The parts of a host template engine that `include` relies on.
pub trait TemplateRegistry {
    type Error;

    /// Whether a fragment with this name is registered.
    fn contains_template(&self, name: &str) -> bool;

    /// Render a registered fragment against `context`.
    fn render_template_named(&self, name: &str, context: &JsonValue)
        -> Result<String, Self::Error>;
}

impl<'reg> TemplateRegistry for Handlebars<'reg> {
    type Error = RenderError;

    fn contains_template(&self, name: &str) -> bool {
        self.has_template(name)
    }

    fn render_template_named(&self, name: &str, context: &JsonValue) -> Result<String, RenderError> {
        self.render(name, context)
    }
}

/// Renders named fragments from a borrowed template registry.
///
/// No recursion limit is applied here; nested includes are bounded only by the
/// host engine.
pub struct TemplateComposer<'a, R: TemplateRegistry + ?Sized> {
    registry: &'a R,
}

impl<'a, R: TemplateRegistry + ?Sized> TemplateComposer<'a, R> {
    pub fn new(registry: &'a R) -> Self {
        Self { registry }
    }

    /// Render fragment `name` with zero or one context values.
    ///
    /// With no context value the fragment is rendered against `null`.
    pub fn include(
        &self,
        name: &str,
        contexts: &[JsonValue],
    ) -> Result<String, IncludeError<R::Error>> {
        let context = match contexts {
            [] => &JsonValue::Null,
            [context] => context,
            _ => {
                return Err(IncludeError::InvalidArity {
                    count: contexts.len(),
                })
            }
        };

        if !self.registry.contains_template(name) {
            return Err(IncludeError::NoSuchTemplate {
                name: name.to_string(),
            });
        }

        self.registry
            .render_template_named(name, context)
            .map_err(IncludeError::Render)
    }
}
