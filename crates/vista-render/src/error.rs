//! Error types for template rendering.
//!
//! This module provides [`RenderError`], the error type for every manager
//! operation. It abstracts over the underlying template engine's errors so
//! callers never match on MiniJinja types directly.

use thiserror::Error;

/// Error type for views manager operations.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Template syntax error or compilation failure.
    #[error("template error: {0}")]
    TemplateError(String),

    /// Template not found in any configured source.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// Template name rejected by the path policy (absolute or `..` segments).
    #[error("invalid template name: {0}")]
    InvalidTemplateName(String),

    /// Data serialization error.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Invalid manager or per-call options.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Error while assembling the render context.
    #[error("context error: {0}")]
    ContextError(String),

    /// I/O error (e.g., reading a template from disk).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Other operational error.
    #[error("{0}")]
    OperationError(String),
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for RenderError {
    fn from(err: serde_yaml::Error) -> Self {
        RenderError::ConfigError(err.to_string())
    }
}

impl From<minijinja::Error> for RenderError {
    fn from(err: minijinja::Error) -> Self {
        use minijinja::ErrorKind;

        match err.kind() {
            ErrorKind::TemplateNotFound => RenderError::TemplateNotFound(err.to_string()),
            ErrorKind::SyntaxError
            | ErrorKind::BadEscape
            | ErrorKind::UndefinedError
            | ErrorKind::UnknownTest
            | ErrorKind::UnknownFunction
            | ErrorKind::UnknownFilter
            | ErrorKind::UnknownMethod => RenderError::TemplateError(err.to_string()),
            ErrorKind::BadSerialization => RenderError::SerializationError(err.to_string()),
            _ => RenderError::OperationError(err.to_string()),
        }
    }
}
