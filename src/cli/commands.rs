// ABOUTME: Command implementations for the envplate CLI
// ABOUTME: Handles execution of render, check and functions commands

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use super::config::Config;
use crate::functions::ProcessEnvironment;
use crate::template::{TemplateContext, TemplateEngine};

/// Build an engine with fragments loaded and the main template registered
/// under its file stem, returning the engine and that name.
async fn prepare_engine(
    template_path: &Path,
    partials: Option<&Path>,
    strict: bool,
) -> Result<(TemplateEngine, String)> {
    let mut engine = TemplateEngine::new();
    engine.set_strict_mode(strict);

    if let Some(dir) = partials {
        let names = engine
            .register_fragments_dir(dir)
            .with_context(|| format!("Failed to load fragments from {}", dir.display()))?;
        info!("Loaded {} fragments from {}", names.len(), dir.display());
    }

    let source = tokio::fs::read_to_string(template_path)
        .await
        .with_context(|| format!("Failed to read template {}", template_path.display()))?;

    let name = template_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid template path: {}", template_path.display()))?
        .to_string();

    engine
        .register_fragment(&name, &source)
        .with_context(|| format!("Failed to compile template {}", template_path.display()))?;

    Ok((engine, name))
}

/// Render a template file to an output file or stdout
pub async fn render_template(
    template_path: PathBuf,
    output: Option<PathBuf>,
    partials: Option<PathBuf>,
    strict: bool,
    config: &Config,
) -> Result<()> {
    info!("Rendering template: {}", template_path.display());

    let (engine, name) = prepare_engine(&template_path, partials.as_deref(), strict).await?;

    let context = TemplateContext::with_environment(&config.template_vars, &ProcessEnvironment);
    let rendered = engine
        .render_fragment(&name, &context.to_json()?)
        .with_context(|| format!("Failed to render template {}", template_path.display()))?;

    match output {
        Some(output_path) => {
            if let Some(parent) = output_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
            tokio::fs::write(&output_path, &rendered)
                .await
                .with_context(|| format!("Failed to write output file {}", output_path.display()))?;
            info!(
                "Template rendered to {} ({} bytes)",
                output_path.display(),
                rendered.len()
            );
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

/// Check that a template and its fragments compile
pub async fn check_template(template_path: PathBuf, partials: Option<PathBuf>) -> Result<()> {
    info!("Checking template: {}", template_path.display());

    let (engine, _) = prepare_engine(&template_path, partials.as_deref(), false).await?;

    println!("✓ Template '{}' is valid", template_path.display());
    println!("  Functions: {}", engine.function_names().len());

    Ok(())
}

/// Print the functions available to templates
pub fn list_functions() -> Result<()> {
    for name in TemplateEngine::new().function_names() {
        println!("{}", name);
    }
    Ok(())
}
