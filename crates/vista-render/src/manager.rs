//! The views manager contract and its MiniJinja-backed implementation.
//!
//! A realm stores one [`ViewsManager`] and every render call resolved to
//! that realm goes through it. Managers are shared across concurrent
//! requests, so the trait requires `Send + Sync` and takes `&self`.
//!
//! [`TemplateManager`] is the default implementation. It renders in two
//! steps when a layout is configured:
//!
//! ```text
//! template + context      -> view body
//! layout + context + body -> output      (body under `layout_keyword`)
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::RenderError;
use crate::options::{CallOptions, ManagerOptions};
use crate::template::{MiniJinjaEngine, TemplateEngine, TemplateSource};

/// Key/value data handed to a template.
pub type Context = serde_json::Map<String, serde_json::Value>;

/// Per-call render options, passed through to the manager untouched.
pub type Options = serde_json::Map<String, serde_json::Value>;

/// Result of a successful render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOutput {
    pub body: String,
    pub content_type: String,
}

impl RenderedOutput {
    pub fn new(body: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: content_type.into(),
        }
    }
}

/// Renders `(template, context, options)` to output.
///
/// Implementations own compilation and caching. Errors are returned to the
/// caller unchanged by everything layered on top of the manager.
#[async_trait]
pub trait ViewsManager: Send + Sync {
    async fn render(
        &self,
        template: &str,
        context: Option<&Context>,
        options: &Options,
    ) -> Result<RenderedOutput, RenderError>;
}

enum EngineSlot {
    /// One engine for the manager's lifetime; compiled templates are reused.
    Cached(Box<dyn TemplateEngine>),
    /// A fresh engine per render so template edits are picked up.
    Fresh(Arc<TemplateSource>),
}

/// MiniJinja-backed [`ViewsManager`].
///
/// ```rust
/// use serde_json::json;
/// use vista_render::{ManagerOptions, Options, TemplateManager};
///
/// let manager = TemplateManager::new(
///     ManagerOptions::new().with_template("hello", "Hello, {{ name }}!"),
/// ).unwrap();
///
/// let context = json!({ "name": "World" }).as_object().cloned().unwrap();
/// let output = manager.render_now("hello", Some(&context), &Options::new()).unwrap();
/// assert_eq!(output.body, "Hello, World!");
/// assert_eq!(output.content_type, "text/html");
/// ```
pub struct TemplateManager {
    options: ManagerOptions,
    engine: EngineSlot,
}

impl TemplateManager {
    /// Creates a manager from options, validating them first.
    pub fn new(options: ManagerOptions) -> Result<Self, RenderError> {
        options.validate()?;
        let source = Arc::new(TemplateSource::from_options(&options));
        let engine = if options.is_cached {
            EngineSlot::Cached(Box::new(MiniJinjaEngine::new(source)))
        } else {
            EngineSlot::Fresh(source)
        };

        debug!(
            dirs = ?options.search_dirs(),
            cached = options.is_cached,
            layout = ?options.layout.template_name(),
            "template manager created"
        );
        Ok(Self { options, engine })
    }

    /// Creates a manager around a caller-supplied engine.
    ///
    /// The engine is used for every render regardless of `is_cached`.
    pub fn with_engine(
        options: ManagerOptions,
        engine: Box<dyn TemplateEngine>,
    ) -> Result<Self, RenderError> {
        options.validate()?;
        Ok(Self {
            options,
            engine: EngineSlot::Cached(engine),
        })
    }

    /// Renders synchronously. [`ViewsManager::render`] delegates here.
    pub fn render_now(
        &self,
        template: &str,
        context: Option<&Context>,
        options: &Options,
    ) -> Result<RenderedOutput, RenderError> {
        let call = CallOptions::parse(options)?;
        let allow_absolute = self.options.allow_absolute_paths;
        let allow_insecure = self.options.allow_insecure_access;

        if let Err(err) = crate::template::check_name(template, allow_absolute, allow_insecure) {
            warn!(template, "template name rejected");
            return Err(err);
        }

        let layout = call
            .layout
            .as_ref()
            .unwrap_or(&self.options.layout)
            .template_name();
        let keyword = call
            .layout_keyword
            .as_deref()
            .unwrap_or(&self.options.layout_keyword);

        let data = self.merge_context(context);
        if layout.is_some() && data.contains_key(keyword) {
            return Err(RenderError::ContextError(format!(
                "context already contains the layout keyword '{}'",
                keyword
            )));
        }
        let data = serde_json::Value::Object(data);

        let body = match &self.engine {
            EngineSlot::Cached(engine) => render_with(engine.as_ref(), template, layout, keyword, &data)?,
            EngineSlot::Fresh(source) => {
                let engine = MiniJinjaEngine::new(Arc::clone(source));
                render_with(&engine, template, layout, keyword, &data)?
            }
        };

        let content_type = call
            .content_type
            .unwrap_or_else(|| self.options.content_type.clone());
        Ok(RenderedOutput { body, content_type })
    }

    /// Global context with the per-call context laid over it.
    fn merge_context(&self, context: Option<&Context>) -> Context {
        let mut merged = self.options.context.clone().unwrap_or_default();
        if let Some(context) = context {
            for (key, value) in context {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }
}

fn render_with(
    engine: &dyn TemplateEngine,
    template: &str,
    layout: Option<&str>,
    keyword: &str,
    data: &serde_json::Value,
) -> Result<String, RenderError> {
    let body = engine.render_named(template, data)?;
    match layout {
        Some(layout) => engine.render_layout(layout, data, keyword, body),
        None => Ok(body),
    }
}

#[async_trait]
impl ViewsManager for TemplateManager {
    async fn render(
        &self,
        template: &str,
        context: Option<&Context>,
        options: &Options,
    ) -> Result<RenderedOutput, RenderError> {
        self.render_now(template, context, options)
    }
}
