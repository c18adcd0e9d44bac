// ABOUTME: Template function library: numeric operations, environment and service queries, includes
// ABOUTME: Engine-independent implementations wrapped as Handlebars helpers by the template module

pub mod compose;
pub mod environment;
pub mod error;
pub mod numeric;
pub mod services;
pub mod system;

pub use compose::{TemplateComposer, TemplateRegistry};
pub use environment::{
    key, key_or_default, ls, Environment, EnvironmentEntry, MapEnvironment, ProcessEnvironment,
};
pub use error::{FunctionError, IncludeError, Result};
pub use numeric::{
    add, divide, maximum, minimum, modulo, multiply, parse_int, subtract, BinaryOp, NumericKind,
    NumericValue,
};
pub use services::{ServiceDirectory, ServiceRecord, SERVICES_VAR};
