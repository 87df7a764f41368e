use std::collections::HashMap;
use std::sync::LazyLock;

use minijinja::{Environment, UndefinedBehavior, Value};

use crate::error::SentinelError;

/// Shared minijinja environment with strict undefined behavior.
static JINJA_ENV: LazyLock<Environment<'static>> = LazyLock::new(|| {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env
});

/// Render a configured template string with the given variables.
///
/// `name` only labels log records (e.g. "prompts.pr_review").
pub fn render(
    name: &str,
    template_str: &str,
    vars: HashMap<&str, Value>,
) -> Result<String, SentinelError> {
    let ctx = Value::from_iter(vars);
    render_template(&JINJA_ENV, name, template_str, ctx)
}

fn render_template(
    env: &Environment,
    name: &str,
    template_str: &str,
    ctx: Value,
) -> Result<String, SentinelError> {
    let rendered = env
        .template_from_str(template_str)
        .and_then(|tmpl| tmpl.render(ctx))
        .inspect_err(|e| tracing::warn!(template = name, error = %e, "template failed"))?;
    Ok(rendered)
}
