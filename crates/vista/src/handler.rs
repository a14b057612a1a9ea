//! Declarative view route handlers.
//!
//! A route can be configured to render a view directly instead of running
//! custom handler code. Two configuration shapes are accepted:
//!
//! ```text
//! "home"                                              shorthand
//! { "template": "home", "context": {..}, "options": {..} }
//! ```
//!
//! [`build_view_handler`] validates and normalizes the configuration once,
//! at route registration. The resulting [`ViewHandler`] builds a fresh
//! render context for every request:
//!
//! | Key | Value |
//! |-----|-------|
//! | `params` | route parameters |
//! | `payload` | request body (`null` when absent) |
//! | `query` | query parameters |
//! | `pre` | pre-handler results |
//!
//! Keys of the configured static context are then copied over the top,
//! replacing request-derived keys of the same name.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;
use vista_render::{Context, Options};

use crate::dispatch::{toolkit_view, RequestScope, ToolkitScope};
use crate::error::ViewsError;
use crate::response::Response;

/// Normalized view configuration of a route.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandlerConfig {
    pub template: String,
    pub context: Option<Context>,
    pub options: Option<Options>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawHandlerConfig {
    template: Option<String>,
    #[serde(default, deserialize_with = "present_map")]
    context: Option<Context>,
    #[serde(default, deserialize_with = "present_map")]
    options: Option<Options>,
}

/// An absent key is `None`; an explicit `null` is an error.
fn present_map<'de, D>(deserializer: D) -> Result<Option<Context>, D::Error>
where
    D: Deserializer<'de>,
{
    Context::deserialize(deserializer).map(Some)
}

fn non_empty(template: String) -> Result<String, String> {
    if template.is_empty() {
        Err("\"template\" must not be empty".to_string())
    } else {
        Ok(template)
    }
}

impl HandlerConfig {
    /// Config rendering `template` with no static context or options.
    pub fn template(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            ..Self::default()
        }
    }

    /// Validates and normalizes a raw route configuration.
    ///
    /// Returns a human-readable reason on failure.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::String(template) => Ok(Self::template(non_empty(template.clone())?)),
            Value::Object(_) => {
                let raw = RawHandlerConfig::deserialize(value).map_err(|e| e.to_string())?;
                let template = raw
                    .template
                    .ok_or_else(|| "\"template\" is required".to_string())
                    .and_then(non_empty)?;
                Ok(Self {
                    template,
                    context: raw.context,
                    options: raw.options,
                })
            }
            other => Err(format!(
                "expected a template name or an object, found {}",
                kind_of(other)
            )),
        }
    }
}

impl From<&str> for HandlerConfig {
    fn from(template: &str) -> Self {
        Self::template(template)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Builds the per-request render context for `config`.
pub fn build_render_context<R: RequestScope + ?Sized>(
    request: &R,
    config: &HandlerConfig,
) -> Context {
    let mut context = Context::new();
    context.insert("params".into(), Value::Object(request.params().clone()));
    context.insert("payload".into(), request.payload().clone());
    context.insert("query".into(), Value::Object(request.query().clone()));
    context.insert("pre".into(), Value::Object(request.pre().clone()));

    if let Some(statics) = &config.context {
        for (key, value) in statics {
            context.insert(key.clone(), value.clone());
        }
    }
    context
}

/// A request handler a host installs on a route.
#[async_trait]
pub trait RouteHandler: Send + Sync {
    async fn handle(
        &self,
        request: &dyn RequestScope,
        toolkit: &dyn ToolkitScope,
    ) -> Result<Response, ViewsError>;
}

/// Route handler that renders a configured view.
#[derive(Debug, Clone)]
pub struct ViewHandler {
    config: Arc<HandlerConfig>,
}

impl ViewHandler {
    pub fn new(config: HandlerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// The render context this handler would use for `request`.
    pub fn context_for<R: RequestScope + ?Sized>(&self, request: &R) -> Context {
        build_render_context(request, &self.config)
    }
}

#[async_trait]
impl RouteHandler for ViewHandler {
    async fn handle(
        &self,
        request: &dyn RequestScope,
        toolkit: &dyn ToolkitScope,
    ) -> Result<Response, ViewsError> {
        let context = self.context_for(request);
        toolkit_view(
            toolkit,
            &self.config.template,
            Some(&context),
            self.config.options.as_ref(),
        )
        .await
    }
}

/// Validates `config` for the route at `path` and builds its handler.
///
/// # Errors
///
/// [`ViewsError::InvalidHandlerConfig`] naming `path` when `config` is
/// neither a template name nor a `{ template, context?, options? }` object.
pub fn build_view_handler(path: &str, config: &Value) -> Result<ViewHandler, ViewsError> {
    let config = HandlerConfig::from_value(config).map_err(|reason| {
        ViewsError::InvalidHandlerConfig {
            path: path.to_string(),
            reason,
        }
    })?;
    debug!(route = path, template = %config.template, "view handler built");
    Ok(ViewHandler::new(config))
}
