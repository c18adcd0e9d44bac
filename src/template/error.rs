// ABOUTME: Error types for template engine operations
// ABOUTME: Defines specific error types for template registration, compilation and rendering

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Invalid template name for {0}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Fragment directory error: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("Handlebars error: {0}")]
    HandlebarsError(#[from] handlebars::RenderError),

    #[error("Template compile error: {0}")]
    CompileError(#[from] handlebars::TemplateError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TemplateError>;
