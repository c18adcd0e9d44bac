// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Provides temp directories for template files and engines over a fixed environment

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::fs;

use envplate::functions::MapEnvironment;
use envplate::template::{FunctionRegistry, TemplateEngine};

pub const SERVICES_JSON: &str = r#"[
  {"Name": "db", "Address": "10.0.0.5", "Port": 5432},
  {"Name": "cache", "Address": "10.0.0.9", "Port": 6379},
  {"Name": "db", "Address": "10.0.0.6", "Port": 5432}
]"#;

pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn template_file(&self, name: &str) -> PathBuf {
        self.path().join(format!("{}.tmpl", name))
    }

    pub fn output_file(&self, name: &str) -> PathBuf {
        self.path().join("out").join(format!("{}.conf", name))
    }

    pub fn partials_dir(&self) -> PathBuf {
        self.path().join("partials")
    }

    pub async fn create_template(&self, name: &str, source: &str) -> PathBuf {
        let path = self.template_file(name);
        fs::write(&path, source)
            .await
            .expect("Failed to write template file");
        path
    }

    pub async fn create_partial(&self, name: &str, source: &str) -> PathBuf {
        let dir = self.partials_dir();
        fs::create_dir_all(&dir)
            .await
            .expect("Failed to create partials directory");
        let path = dir.join(format!("{}.tmpl", name));
        fs::write(&path, source)
            .await
            .expect("Failed to write partial file");
        path
    }

    pub async fn create_config(&self, contents: &str) -> PathBuf {
        let path = self.path().join("envplate.yaml");
        fs::write(&path, contents)
            .await
            .expect("Failed to write config file");
        path
    }
}

/// Environment with the sample service list and a few prefixed keys.
pub fn sample_environment() -> MapEnvironment {
    MapEnvironment::new()
        .with_var("services", SERVICES_JSON)
        .with_var("FOO_A", "1")
        .with_var("FOO_B", "2")
        .with_var("BAR_C", "3")
}

pub fn engine_for(env: MapEnvironment) -> TemplateEngine {
    TemplateEngine::with_functions(FunctionRegistry::new(Arc::new(env)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_setup() {
        let env = TestEnvironment::new();
        assert!(env.path().exists());

        let template = env.template_file("app");
        assert!(template.to_string_lossy().ends_with("app.tmpl"));
    }
}
