// ABOUTME: Main template engine implementation using Handlebars
// ABOUTME: Hosts the template function registry, named fragments for include, and rendering entry points

use handlebars::{Handlebars, RenderError};
use serde_json::Value as JsonValue;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use super::error::{Result, TemplateError};
use super::helpers::FunctionRegistry;
use crate::functions::{IncludeError, TemplateComposer};

/// File extensions picked up when loading a fragment directory.
pub const FRAGMENT_EXTENSIONS: &[&str] = &["tmpl", "tpl", "hbs", "handlebars"];

#[derive(Clone)]
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
    functions: FunctionRegistry,
}

impl TemplateEngine {
    /// Create a new template engine whose functions read the process environment
    pub fn new() -> Self {
        Self::with_functions(FunctionRegistry::process())
    }

    /// Create a template engine with an explicit function registry
    pub fn with_functions(functions: FunctionRegistry) -> Self {
        let mut handlebars = Handlebars::new();

        handlebars.set_strict_mode(false);
        handlebars.set_dev_mode(false);

        // Output is configuration text, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);

        functions.register(&mut handlebars);

        Self {
            handlebars,
            functions,
        }
    }

    /// Fail on missing variables instead of rendering them empty
    pub fn set_strict_mode(&mut self, strict: bool) {
        self.handlebars.set_strict_mode(strict);
    }

    /// Names of the registered template functions
    pub fn function_names(&self) -> Vec<&'static str> {
        self.functions.names()
    }

    /// Register a named fragment that templates can `include`
    pub fn register_fragment(&mut self, name: &str, source: &str) -> Result<()> {
        debug!("Registering template fragment: {}", name);
        self.handlebars.register_template_string(name, source)?;
        Ok(())
    }

    /// Register a template file under its file stem, returning that name
    pub fn register_fragment_file(&mut self, path: &Path) -> Result<String> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| TemplateError::InvalidName(path.display().to_string()))?
            .to_string();

        let source = std::fs::read_to_string(path)?;
        self.register_fragment(&name, &source)?;
        Ok(name)
    }

    /// Register every fragment file found under `dir`
    pub fn register_fragments_dir(&mut self, dir: &Path) -> Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let matches_extension = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| FRAGMENT_EXTENSIONS.contains(&ext))
                .unwrap_or(false);

            if matches_extension {
                names.push(self.register_fragment_file(entry.path())?);
            }
        }

        debug!(
            "Loaded {} fragments from {}",
            names.len(),
            dir.display()
        );
        Ok(names)
    }

    /// Whether a fragment is registered under `name`
    pub fn has_fragment(&self, name: &str) -> bool {
        self.handlebars.has_template(name)
    }

    /// Render a template string with JSON context
    pub fn render_template(&self, template: &str, context: &JsonValue) -> Result<String> {
        self.handlebars
            .render_template(template, context)
            .map_err(TemplateError::HandlebarsError)
    }

    /// Render a registered fragment with JSON context
    pub fn render_fragment(&self, name: &str, context: &JsonValue) -> Result<String> {
        self.handlebars
            .render(name, context)
            .map_err(TemplateError::HandlebarsError)
    }

    /// Render fragment `name` with zero or one context values, as `include` does
    pub fn include(
        &self,
        name: &str,
        contexts: &[JsonValue],
    ) -> std::result::Result<String, IncludeError<RenderError>> {
        TemplateComposer::new(&self.handlebars).include(name, contexts)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}
