// ABOUTME: Template engine module for envplate
// ABOUTME: Wires the template function library into Handlebars and provides rendering entry points

pub mod context;
pub mod engine;
pub mod error;
pub mod helpers;

pub use context::TemplateContext;
pub use engine::TemplateEngine;
pub use error::{Result, TemplateError};
pub use helpers::{register_helpers, FunctionRegistry};
