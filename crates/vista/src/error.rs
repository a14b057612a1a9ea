//! Error types for registration, resolution and dispatch.

use thiserror::Error;
use vista_render::RenderError;

/// Errors raised by the views layer.
///
/// Configuration errors and invariant violations are programmer errors and
/// surface at setup or at the first offending call. Render failures are the
/// manager's own errors, passed through unchanged.
#[derive(Debug, Error)]
pub enum ViewsError {
    /// `views()` was called without options.
    #[error("Missing views options")]
    MissingOptions,

    /// The manager could not be built from the given options.
    #[error("Invalid views options: {0}")]
    InvalidOptions(#[source] RenderError),

    /// A manager is already registered on this realm.
    #[error("Cannot set views manager more than once")]
    AlreadyConfigured,

    /// The plugin namespace holds state of a different type.
    #[error("Plugin namespace '{namespace}' is owned by another plugin")]
    NamespaceConflict { namespace: String },

    /// A render was attempted with no resolvable manager.
    #[error("Missing views manager")]
    MissingManager,

    /// A route's view handler configuration failed validation.
    #[error("Invalid view handler options ({path}): {reason}")]
    InvalidHandlerConfig { path: String, reason: String },

    /// The manager failed to render.
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl ViewsError {
    /// Returns true for errors that originate in the manager.
    pub fn is_render(&self) -> bool {
        matches!(self, ViewsError::Render(_))
    }

    /// The manager error, if this is a pass-through render failure.
    pub fn as_render(&self) -> Option<&RenderError> {
        match self {
            ViewsError::Render(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(ViewsError::MissingOptions.to_string(), "Missing views options");
        assert_eq!(
            ViewsError::AlreadyConfigured.to_string(),
            "Cannot set views manager more than once"
        );
        assert_eq!(ViewsError::MissingManager.to_string(), "Missing views manager");

        let err = ViewsError::InvalidHandlerConfig {
            path: "/home".into(),
            reason: "bad".into(),
        };
        assert!(err.to_string().starts_with("Invalid view handler options (/home)"));
    }

    #[test]
    fn test_render_is_transparent() {
        let err: ViewsError = RenderError::TemplateNotFound("home".into()).into();
        assert!(err.is_render());
        assert_eq!(err.to_string(), "template not found: home");
        assert!(matches!(
            err.as_render(),
            Some(RenderError::TemplateNotFound(name)) if name == "home"
        ));
    }
}
