// ABOUTME: Handlebars helper adapters for the template function library
// ABOUTME: Builds the named function registry (add, service, ls, include, ...) installed into the engine

use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext, RenderError,
    ScopedJson,
};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::debug;

use crate::functions::environment::{self, Environment, ProcessEnvironment};
use crate::functions::error::{FunctionError, IncludeError};
use crate::functions::numeric::{self, BinaryOp, NumericValue};
use crate::functions::services::ServiceDirectory;
use crate::functions::system;
use crate::functions::TemplateComposer;

fn render_error(err: FunctionError) -> RenderError {
    RenderError::new(err.to_string())
}

fn string_param<'a>(
    h: &'a Helper,
    idx: usize,
    function: &'static str,
    argument: &'static str,
) -> Result<&'a str, RenderError> {
    h.param(idx)
        .and_then(|v| v.value().as_str())
        .ok_or_else(|| render_error(FunctionError::MissingArgument { function, argument }))
}

fn value_param<'a>(
    h: &'a Helper,
    idx: usize,
    function: &'static str,
    argument: &'static str,
) -> Result<&'a JsonValue, RenderError> {
    h.param(idx)
        .map(|v| v.value())
        .ok_or_else(|| render_error(FunctionError::MissingArgument { function, argument }))
}

/// `{{op b a}}` for every binary numeric operation.
pub struct NumericHelper {
    op: BinaryOp,
}

impl NumericHelper {
    pub fn new(op: BinaryOp) -> Self {
        Self { op }
    }
}

impl NumericHelper {
    fn compute(&self, h: &Helper) -> Result<NumericValue, RenderError> {
        let b = value_param(h, 0, self.op.name(), "b")?;
        let a = value_param(h, 1, self.op.name(), "a")?;

        self.op.apply_json(b, a).map_err(render_error)
    }
}

impl HelperDef for NumericHelper {
    /// Written output uses the number's display form, so a whole float
    /// prints as `2` rather than `2.0`.
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let result = self.compute(h)?;
        out.write(&result.to_string())?;
        Ok(())
    }

    /// Sub-expressions get the JSON value, keeping floats as floats.
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        Ok(ScopedJson::Derived(self.compute(h)?.to_json()))
    }
}

/// `{{parseInt "42"}}`
pub struct ParseIntHelper;

impl HelperDef for ParseIntHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        let input = string_param(h, 0, "parseInt", "string")?;
        let parsed = numeric::parse_int(input).map_err(render_error)?;
        Ok(ScopedJson::Derived(JsonValue::from(parsed)))
    }
}

/// `{{services}}`
pub struct ServicesHelper {
    env: Arc<dyn Environment>,
}

impl HelperDef for ServicesHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        _: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        let records = ServiceDirectory::new(self.env.as_ref()).services();
        Ok(ScopedJson::Derived(JsonValue::Array(
            records.into_iter().map(JsonValue::Object).collect(),
        )))
    }
}

/// `{{service "name"}}`
pub struct ServiceHelper {
    env: Arc<dyn Environment>,
}

impl HelperDef for ServiceHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        let name = string_param(h, 0, "service", "name")?;
        let records = ServiceDirectory::new(self.env.as_ref()).service(name);
        Ok(ScopedJson::Derived(JsonValue::Array(
            records.into_iter().map(JsonValue::Object).collect(),
        )))
    }
}

/// `{{ls "PREFIX_"}}`
pub struct LsHelper {
    env: Arc<dyn Environment>,
}

impl HelperDef for LsHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        let prefix = string_param(h, 0, "ls", "prefix")?;
        let entries = environment::ls(self.env.as_ref(), prefix);
        let value = serde_json::to_value(entries)
            .map_err(|e| RenderError::new(format!("ls: {}", e)))?;
        Ok(ScopedJson::Derived(value))
    }
}

/// `{{key "NAME"}}`, also registered as `env`.
pub struct KeyHelper {
    env: Arc<dyn Environment>,
}

impl HelperDef for KeyHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        let name = string_param(h, 0, "key", "name")?;
        Ok(ScopedJson::Derived(JsonValue::String(environment::key(
            self.env.as_ref(),
            name,
        ))))
    }
}

/// `{{keyOrDefault "NAME" "fallback"}}`
pub struct KeyOrDefaultHelper {
    env: Arc<dyn Environment>,
}

impl HelperDef for KeyOrDefaultHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        let name = string_param(h, 0, "keyOrDefault", "name")?;
        let default = string_param(h, 1, "keyOrDefault", "default")?;
        Ok(ScopedJson::Derived(JsonValue::String(
            environment::key_or_default(self.env.as_ref(), name, default),
        )))
    }
}

/// `{{include "fragment" context}}`
///
/// The registry handed to the helper at call time is the one the fragment is
/// looked up in.
pub struct IncludeHelper;

impl HelperDef for IncludeHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        r: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        let name = string_param(h, 0, "include", "name")?;
        let contexts: Vec<JsonValue> = h
            .params()
            .iter()
            .skip(1)
            .map(|p| p.value().clone())
            .collect();

        match TemplateComposer::new(r).include(name, &contexts) {
            Ok(rendered) => Ok(ScopedJson::Derived(JsonValue::String(rendered))),
            Err(IncludeError::Render(e)) => Err(e),
            Err(other) => Err(RenderError::new(other.to_string())),
        }
    }
}

/// `{{shell "cmd " "args"}}`
pub struct ShellHelper;

impl HelperDef for ShellHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        let parts = h
            .params()
            .iter()
            .map(|p| {
                p.value().as_str().map(str::to_string).ok_or_else(|| {
                    RenderError::new("shell helper requires string arguments")
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let output = system::shell(&parts).map_err(render_error)?;
        Ok(ScopedJson::Derived(JsonValue::String(output)))
    }
}

/// `{{toYaml value}}`
pub struct ToYamlHelper;

impl HelperDef for ToYamlHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        let value = value_param(h, 0, "toYaml", "value")?;
        let yaml = system::to_yaml(value).map_err(render_error)?;
        Ok(ScopedJson::Derived(JsonValue::String(yaml)))
    }
}

/// Uppercase helper
pub fn upper_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let input = string_param(h, 0, "upper", "string")?;
    out.write(&input.to_uppercase())?;
    Ok(())
}

/// Lowercase helper
pub fn lower_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let input = string_param(h, 0, "lower", "string")?;
    out.write(&input.to_lowercase())?;
    Ok(())
}

pub fn trim_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let input = string_param(h, 0, "trim", "string")?;
    out.write(input.trim())?;
    Ok(())
}

/// Default helper - `{{default "fallback" value}}` writes value unless it is empty
pub fn default_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let default = string_param(h, 0, "default", "default")?;
    let given = h.param(1).and_then(|v| v.value().as_str()).unwrap_or("");

    out.write(system::default_value(default, given))?;
    Ok(())
}

/// Base64 encode helper
pub fn b64enc_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let input = string_param(h, 0, "b64enc", "string")?;
    out.write(&system::b64enc(input))?;
    Ok(())
}

/// Base64 decode helper
pub fn b64dec_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let input = string_param(h, 0, "b64dec", "string")?;
    let decoded = system::b64dec(input).map_err(render_error)?;
    out.write(&decoded)?;
    Ok(())
}

/// Join helper - `{{join ", " list}}`
pub fn join_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let separator = string_param(h, 0, "join", "separator")?;
    let items = h
        .param(1)
        .and_then(|v| v.value().as_array())
        .ok_or_else(|| RenderError::new("join helper requires array parameter"))?;

    out.write(&system::join(separator, items))?;
    Ok(())
}

/// The table of template functions handed to the engine at initialization.
///
/// Environment-reading functions share the environment passed to
/// [`FunctionRegistry::new`].
#[derive(Clone)]
pub struct FunctionRegistry {
    env: Arc<dyn Environment>,
}

impl FunctionRegistry {
    pub fn new(env: Arc<dyn Environment>) -> Self {
        Self { env }
    }

    /// Registry reading the live process environment.
    pub fn process() -> Self {
        Self::new(Arc::new(ProcessEnvironment))
    }

    /// Every function name and its helper.
    pub fn helpers(&self) -> Vec<(&'static str, Box<dyn HelperDef + Send + Sync>)> {
        let mut helpers: Vec<(&'static str, Box<dyn HelperDef + Send + Sync>)> = BinaryOp::ALL
            .iter()
            .map(|op| {
                (
                    op.name(),
                    Box::new(NumericHelper::new(*op)) as Box<dyn HelperDef + Send + Sync>,
                )
            })
            .collect();

        helpers.push(("parseInt", Box::new(ParseIntHelper)));
        helpers.push((
            "services",
            Box::new(ServicesHelper {
                env: self.env.clone(),
            }),
        ));
        helpers.push((
            "service",
            Box::new(ServiceHelper {
                env: self.env.clone(),
            }),
        ));
        helpers.push((
            "ls",
            Box::new(LsHelper {
                env: self.env.clone(),
            }),
        ));
        helpers.push(("include", Box::new(IncludeHelper)));
        helpers.push((
            "key",
            Box::new(KeyHelper {
                env: self.env.clone(),
            }),
        ));
        helpers.push((
            "keyOrDefault",
            Box::new(KeyOrDefaultHelper {
                env: self.env.clone(),
            }),
        ));
        helpers.push((
            "env",
            Box::new(KeyHelper {
                env: self.env.clone(),
            }),
        ));
        helpers.push(("shell", Box::new(ShellHelper)));
        helpers.push(("toYaml", Box::new(ToYamlHelper)));
        helpers.push(("upper", Box::new(upper_helper)));
        helpers.push(("lower", Box::new(lower_helper)));
        helpers.push(("trim", Box::new(trim_helper)));
        helpers.push(("default", Box::new(default_helper)));
        helpers.push(("b64enc", Box::new(b64enc_helper)));
        helpers.push(("b64dec", Box::new(b64dec_helper)));
        helpers.push(("join", Box::new(join_helper)));

        helpers
    }

    /// Names of every registered function, in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.helpers().into_iter().map(|(name, _)| name).collect()
    }

    /// Install every function into a Handlebars instance.
    pub fn register(&self, handlebars: &mut Handlebars) {
        for (name, helper) in self.helpers() {
            debug!("Registering template function: {}", name);
            handlebars.register_helper(name, helper);
        }
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::process()
    }
}

/// Register all template functions reading from `env`.
pub fn register_helpers(handlebars: &mut Handlebars, env: Arc<dyn Environment>) {
    FunctionRegistry::new(env).register(handlebars);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::environment::MapEnvironment;
    use crate::functions::services::SERVICES_VAR;
    use serde_json::json;

    fn create_test_handlebars(env: MapEnvironment) -> Handlebars<'static> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        register_helpers(&mut handlebars, Arc::new(env));
        handlebars
    }

    fn render(handlebars: &Handlebars, template: &str) -> Result<String, RenderError> {
        handlebars.render_template(template, &json!({"n": 10, "half": 0.5, "name": "x"}))
    }

    #[test]
    fn test_registry_names() {
        let names = FunctionRegistry::new(Arc::new(MapEnvironment::new())).names();
        for expected in [
            "add",
            "subtract",
            "multiply",
            "divide",
            "modulo",
            "minimum",
            "maximum",
            "parseInt",
            "services",
            "service",
            "ls",
            "include",
        ] {
            assert!(names.contains(&expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_numeric_helpers() {
        let handlebars = create_test_handlebars(MapEnvironment::new());

        assert_eq!(render(&handlebars, "{{add 2 n}}").unwrap(), "12");
        assert_eq!(render(&handlebars, "{{subtract 2 n}}").unwrap(), "8");
        assert_eq!(render(&handlebars, "{{multiply 3 n}}").unwrap(), "30");
        assert_eq!(render(&handlebars, "{{divide 4 n}}").unwrap(), "2");
        assert_eq!(render(&handlebars, "{{modulo 4 n}}").unwrap(), "2");
        assert_eq!(render(&handlebars, "{{minimum 4 n}}").unwrap(), "4");
        assert_eq!(render(&handlebars, "{{maximum 4 n}}").unwrap(), "10");
        assert_eq!(render(&handlebars, "{{add half n}}").unwrap(), "10.5");
    }

    #[test]
    fn test_numeric_helpers_compose() {
        let handlebars = create_test_handlebars(MapEnvironment::new());
        assert_eq!(
            render(&handlebars, "{{subtract 1 (add 2 n)}}").unwrap(),
            "11"
        );
        assert_eq!(
            render(&handlebars, "{{add 1 (parseInt \"41\")}}").unwrap(),
            "42"
        );
    }

    #[test]
    fn test_numeric_helper_errors() {
        let handlebars = create_test_handlebars(MapEnvironment::new());

        let err = render(&handlebars, "{{add 1 name}}").unwrap_err();
        assert!(err.to_string().contains("unsupported operand type"));

        let err = render(&handlebars, "{{modulo half n}}").unwrap_err();
        assert!(err.to_string().contains("unsupported operand type for modulo"));

        let err = render(&handlebars, "{{divide 0 n}}").unwrap_err();
        assert!(err.to_string().contains("integer divide by zero"));

        let err = render(&handlebars, "{{add 1}}").unwrap_err();
        assert!(err.to_string().contains("missing required argument"));
    }

    #[test]
    fn test_float_divide_by_zero_renders_infinity() {
        let handlebars = create_test_handlebars(MapEnvironment::new());
        assert_eq!(render(&handlebars, "{{divide 0 half}}").unwrap(), "+Inf");
    }

    #[test]
    fn test_whole_float_results_print_without_fraction() {
        let handlebars = create_test_handlebars(MapEnvironment::new());
        assert_eq!(
            render(&handlebars, "{{multiply 2 half}}|{{maximum 2.0 1}}").unwrap(),
            "1|2"
        );
        // the float kind survives into the next operation
        assert_eq!(
            render(&handlebars, "{{divide 4 (maximum 2.0 1)}}").unwrap(),
            "0.5"
        );
    }

    #[test]
    fn test_infinity_feeds_later_operations() {
        let handlebars = create_test_handlebars(MapEnvironment::new());
        assert_eq!(
            render(&handlebars, "{{add 1 (divide 0 half)}}").unwrap(),
            "+Inf"
        );
        assert_eq!(
            render(&handlebars, "{{subtract 1 (divide 0 (subtract half 0))}}").unwrap(),
            "-Inf"
        );
    }

    #[test]
    fn test_parse_int_helper() {
        let handlebars = create_test_handlebars(MapEnvironment::new());
        assert_eq!(render(&handlebars, "{{parseInt \"\"}}").unwrap(), "0");

        let err = render(&handlebars, "{{parseInt \"abc\"}}").unwrap_err();
        assert!(err.to_string().contains("parse failure"));
    }

    #[test]
    fn test_service_helpers() {
        let env = MapEnvironment::new().with_var(
            SERVICES_VAR,
            r#"[{"Name":"x","Port":80},{"Name":"y","Port":81}]"#,
        );
        let handlebars = create_test_handlebars(env);

        assert_eq!(
            render(&handlebars, "{{#each (service \"x\")}}{{Name}}:{{Port}};{{/each}}").unwrap(),
            "x:80;"
        );
        assert_eq!(
            render(&handlebars, "{{#each (services)}}{{Name}} {{/each}}").unwrap(),
            "x y "
        );
        assert_eq!(
            render(&handlebars, "{{#each (service \"nope\")}}found{{/each}}").unwrap(),
            ""
        );
    }

    #[test]
    fn test_ls_helper() {
        let env = MapEnvironment::new()
            .with_var("FOO_A", "1")
            .with_var("BAR", "3");
        let handlebars = create_test_handlebars(env);

        assert_eq!(
            render(&handlebars, "{{#each (ls \"FOO_\")}}{{Key}}={{Value}}{{/each}}").unwrap(),
            "A=1"
        );
    }

    #[test]
    fn test_key_helpers() {
        let env = MapEnvironment::new().with_var("PORT", "8080");
        let handlebars = create_test_handlebars(env);

        assert_eq!(render(&handlebars, "{{key \"PORT\"}}").unwrap(), "8080");
        assert_eq!(render(&handlebars, "{{env \"PORT\"}}").unwrap(), "8080");
        assert_eq!(render(&handlebars, "{{key \"HOST\"}}").unwrap(), "");
        assert_eq!(
            render(&handlebars, "{{keyOrDefault \"HOST\" \"localhost\"}}").unwrap(),
            "localhost"
        );
        assert_eq!(
            render(&handlebars, "{{default \"localhost\" (key \"HOST\")}}").unwrap(),
            "localhost"
        );
    }

    #[test]
    fn test_include_helper() {
        let mut handlebars = create_test_handlebars(MapEnvironment::new());
        handlebars
            .register_template_string("greet", "hello {{this}}")
            .unwrap();
        handlebars
            .register_template_string("twice", "{{include \"greet\" this}}|{{include \"greet\" this}}")
            .unwrap();

        assert_eq!(
            render(&handlebars, "{{include \"greet\" \"world\"}}").unwrap(),
            "hello world"
        );
        assert_eq!(
            render(&handlebars, "{{include \"twice\" name}}").unwrap(),
            "hello x|hello x"
        );

        let err = render(&handlebars, "{{include \"missing\"}}").unwrap_err();
        assert!(err.to_string().contains("no such template 'missing'"));

        let err = render(&handlebars, "{{include \"greet\" 1 2}}").unwrap_err();
        assert!(err.to_string().contains("at most one context value"));
    }

    #[test]
    fn test_string_helpers() {
        let handlebars = create_test_handlebars(MapEnvironment::new());

        assert_eq!(render(&handlebars, "{{upper \"hello\"}}").unwrap(), "HELLO");
        assert_eq!(render(&handlebars, "{{lower \"HELLO\"}}").unwrap(), "hello");
        assert_eq!(render(&handlebars, "{{trim \"  x  \"}}").unwrap(), "x");
        assert_eq!(
            render(&handlebars, "{{b64enc \"hello world\"}}").unwrap(),
            "aGVsbG8gd29ybGQ="
        );
        assert_eq!(
            render(&handlebars, "{{b64dec \"aGVsbG8gd29ybGQ=\"}}").unwrap(),
            "hello world"
        );
        assert_eq!(
            render(&handlebars, "{{default \"fallback\" \"value\"}}").unwrap(),
            "value"
        );
    }

    #[test]
    fn test_to_yaml_and_shell_helpers() {
        let handlebars = create_test_handlebars(MapEnvironment::new());

        let yaml = handlebars
            .render_template("{{toYaml this}}", &json!({"port": 80}))
            .unwrap();
        assert_eq!(yaml.trim(), "port: 80");

        assert_eq!(
            render(&handlebars, "{{shell \"echo \" \"hi\"}}").unwrap(),
            "hi"
        );
    }
}
