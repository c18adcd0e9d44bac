// ABOUTME: Main application orchestration for envplate CLI
// ABOUTME: Coordinates between CLI arguments, configuration, and command execution

use anyhow::Result;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use super::commands;
use super::{Args, Commands, Config};

pub struct App {
    config: Config,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Initialize logging based on configuration
    ///
    /// Logs go to stderr so rendered output on stdout stays clean.
    pub fn init_logging(&self, verbose: bool, no_color: bool) -> Result<()> {
        let log_level = if verbose {
            "debug"
        } else {
            &self.config.logging.level
        };

        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        let result = match self.config.logging.format.as_str() {
            "compact" => tracing_subscriber::fmt()
                .compact()
                .with_env_filter(env_filter)
                .with_ansi(!no_color)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init(),
            _ => tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_ansi(!no_color)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init(),
        };
        result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

        debug!("Logging initialized with level: {}", log_level);
        Ok(())
    }

    /// Run the application with parsed arguments
    pub async fn run(&mut self, args: Args) -> Result<()> {
        self.init_logging(args.verbose, args.no_color)?;

        info!("Starting envplate v{}", env!("CARGO_PKG_VERSION"));
        debug!("Configuration loaded from: {:?}", args.config);

        if let Commands::Render { vars, .. } = &args.command {
            let variables = Args::parse_variables(vars)?;
            self.config.merge_variables(variables);
        }

        match args.command {
            Commands::Render {
                template,
                output,
                partials,
                strict,
                ..
            } => {
                let partials = partials.or_else(|| self.config.partials_dir.clone());
                let strict = strict || self.config.strict_mode;
                commands::render_template(template, output, partials, strict, &self.config).await
            }

            Commands::Check { template, partials } => {
                let partials = partials.or_else(|| self.config.partials_dir.clone());
                commands::check_template(template, partials).await
            }

            Commands::Functions => commands::list_functions(),
        }
    }

    /// Create application from command line arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        let config = Config::load(args.config.clone())?;
        Ok(Self::new(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_app_creation() {
        let config = Config::default();
        let app = App::new(config);
        assert!(app.config.template_vars.is_empty());
    }

    #[test]
    fn test_app_from_args_with_config_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("envplate.yaml");

        let config_content = r#"
strict_mode: true
template_vars:
  tier: web
"#;
        fs::write(&config_path, config_content).unwrap();

        let args = Args {
            command: Commands::Functions,
            verbose: false,
            config: Some(config_path),
            no_color: true,
        };
        let app = App::from_args(&args).unwrap();
        assert!(app.config.strict_mode);
        assert_eq!(
            app.config.template_vars.get("tier"),
            Some(&serde_json::json!("web"))
        );
    }
}
