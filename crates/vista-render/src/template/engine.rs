//! Template engine abstraction.
//!
//! This module defines the [`TemplateEngine`] trait which keeps the manager
//! independent of the template backend. The default implementation is
//! [`MiniJinjaEngine`], which loads templates lazily through a
//! [`TemplateSource`] and caches them once compiled.

use std::collections::BTreeMap;
use std::sync::Arc;

use minijinja::{default_auto_escape_callback, Environment, Error, ErrorKind, Value};

use super::registry::TemplateSource;
use crate::error::RenderError;

/// A template engine that renders named templates with JSON data.
pub trait TemplateEngine: Send + Sync {
    /// Renders the template registered or loadable under `name`.
    fn render_named(&self, name: &str, data: &serde_json::Value) -> Result<String, RenderError>;

    /// Renders `layout` with `data` plus `content` exposed under `keyword`.
    ///
    /// `content` is already rendered output and must not be escaped again.
    fn render_layout(
        &self,
        layout: &str,
        data: &serde_json::Value,
        keyword: &str,
        content: String,
    ) -> Result<String, RenderError>;

    /// Checks if a template with the given name can be loaded.
    fn has_template(&self, name: &str) -> bool;
}

/// MiniJinja-based template engine.
///
/// Templates are pulled from the [`TemplateSource`] on first use and kept
/// in the environment afterwards. Auto-escaping follows MiniJinja's
/// extension rules applied to the resolved file name, so `page` backed by
/// `page.html` escapes its values.
///
/// ```rust
/// use std::sync::Arc;
/// use serde_json::json;
/// use vista_render::{ManagerOptions, MiniJinjaEngine, TemplateEngine, TemplateSource};
///
/// let options = ManagerOptions::new().with_template("greeting", "Hello, {{ name }}!");
/// let engine = MiniJinjaEngine::new(Arc::new(TemplateSource::from_options(&options)));
///
/// let output = engine.render_named("greeting", &json!({ "name": "World" })).unwrap();
/// assert_eq!(output, "Hello, World!");
/// ```
pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    /// Creates an engine that loads templates from `source`.
    pub fn new(source: Arc<TemplateSource>) -> Self {
        let mut env = Environment::new();
        let escape_source = Arc::clone(&source);
        env.set_auto_escape_callback(move |name| {
            let resolved = escape_source
                .resolved_name(name)
                .unwrap_or_else(|| name.to_string());
            default_auto_escape_callback(&resolved)
        });
        env.set_loader(move |name| {
            source.load(name).map_err(|err| {
                Error::new(ErrorKind::InvalidOperation, format!("cannot load template {}", name))
                    .with_source(err)
            })
        });
        Self { env }
    }

    /// Returns a mutable reference to the underlying MiniJinja environment.
    ///
    /// This allows registering custom filters and functions.
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render_named(&self, name: &str, data: &serde_json::Value) -> Result<String, RenderError> {
        let tmpl = self.env.get_template(name)?;
        Ok(tmpl.render(Value::from_serialize(data))?)
    }

    fn render_layout(
        &self,
        layout: &str,
        data: &serde_json::Value,
        keyword: &str,
        content: String,
    ) -> Result<String, RenderError> {
        let mut combined: BTreeMap<String, Value> = BTreeMap::new();
        if let serde_json::Value::Object(map) = data {
            for (key, value) in map {
                combined.insert(key.clone(), Value::from_serialize(value));
            }
        }
        combined.insert(keyword.to_string(), Value::from_safe_string(content));

        let tmpl = self.env.get_template(layout)?;
        Ok(tmpl.render(&combined)?)
    }

    fn has_template(&self, name: &str) -> bool {
        self.env.get_template(name).is_ok()
    }
}
