// ABOUTME: Main library module for envplate, a configuration file renderer
// ABOUTME: Exports the template function library, the Handlebars host engine and the CLI

pub mod cli;
pub mod functions;
pub mod template;

// Re-export commonly used types
pub use cli::{App, Args, Config};
pub use functions::{
    BinaryOp, Environment, FunctionError, IncludeError, MapEnvironment, NumericValue,
    ProcessEnvironment, ServiceDirectory, TemplateComposer, TemplateRegistry,
};
pub use template::{FunctionRegistry, TemplateContext, TemplateEngine, TemplateError};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
