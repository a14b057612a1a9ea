//! Manager configuration.
//!
//! [`ManagerOptions`] is the configuration a realm hands to
//! [`TemplateManager::new`](crate::TemplateManager::new). It can be built in
//! code with the `with_*` methods or loaded from JSON / YAML:
//!
//! ```rust
//! use vista_render::{Layout, ManagerOptions};
//!
//! let options = ManagerOptions::from_yaml(r#"
//! path: views
//! layout: true
//! default_extension: html
//! "#).unwrap();
//!
//! assert_eq!(options.path, vec![std::path::PathBuf::from("views")]);
//! assert_eq!(options.layout, Layout::Enabled);
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use crate::error::RenderError;
use crate::manager::{Context, Options};

/// Name used for the layout template when layouts are enabled without a name.
pub const DEFAULT_LAYOUT: &str = "layout";

/// Context key the rendered view is injected under inside a layout.
pub const DEFAULT_LAYOUT_KEYWORD: &str = "content";

/// Content type reported for rendered output unless overridden.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html";

/// Layout selection.
///
/// Deserializes from `false`, `true` or a template name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawLayout")]
pub enum Layout {
    /// Views render on their own.
    #[default]
    Disabled,
    /// Views render inside the [`DEFAULT_LAYOUT`] template.
    Enabled,
    /// Views render inside the named template.
    Named(String),
}

impl Layout {
    /// The layout template to wrap views in, if any.
    pub fn template_name(&self) -> Option<&str> {
        match self {
            Layout::Disabled => None,
            Layout::Enabled => Some(DEFAULT_LAYOUT),
            Layout::Named(name) => Some(name),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLayout {
    Flag(bool),
    Name(String),
}

impl From<RawLayout> for Layout {
    fn from(raw: RawLayout) -> Self {
        match raw {
            RawLayout::Flag(true) => Layout::Enabled,
            RawLayout::Flag(false) => Layout::Disabled,
            RawLayout::Name(name) => Layout::Named(name),
        }
    }
}

/// Configuration for a [`TemplateManager`](crate::TemplateManager).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManagerOptions {
    /// Base path that relative `path` / `layout_path` entries resolve against.
    pub relative_to: Option<PathBuf>,

    /// Template directories, searched in order. Accepts a single path or a list.
    #[serde(deserialize_with = "one_or_many")]
    pub path: Vec<PathBuf>,

    /// Extra directory searched for layout templates.
    pub layout_path: Option<PathBuf>,

    /// Inline templates by name. These shadow directory templates.
    pub templates: BTreeMap<String, String>,

    /// Extension appended to template names that have none.
    pub default_extension: Option<String>,

    /// Layout wrapping for every view.
    pub layout: Layout,

    /// Key the rendered view is exposed under inside the layout.
    pub layout_keyword: String,

    /// Context merged beneath every per-call context.
    pub context: Option<Context>,

    /// Keep compiled templates between renders.
    pub is_cached: bool,

    /// Content type reported with rendered output.
    pub content_type: String,

    /// Allow absolute template names.
    pub allow_absolute_paths: bool,

    /// Allow `..` segments in template names.
    pub allow_insecure_access: bool,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            relative_to: None,
            path: Vec::new(),
            layout_path: None,
            templates: BTreeMap::new(),
            default_extension: None,
            layout: Layout::Disabled,
            layout_keyword: DEFAULT_LAYOUT_KEYWORD.to_string(),
            context: None,
            is_cached: true,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            allow_absolute_paths: false,
            allow_insecure_access: false,
        }
    }
}

impl ManagerOptions {
    /// Creates options with every setting at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses options from a JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, RenderError> {
        serde_json::from_value(value).map_err(|e| RenderError::ConfigError(e.to_string()))
    }

    /// Parses options from a YAML document.
    pub fn from_yaml(source: &str) -> Result<Self, RenderError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn with_relative_to(mut self, base: impl Into<PathBuf>) -> Self {
        self.relative_to = Some(base.into());
        self
    }

    /// Appends a template directory.
    pub fn with_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.path.push(dir.into());
        self
    }

    pub fn with_layout_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.layout_path = Some(dir.into());
        self
    }

    /// Registers an inline template.
    pub fn with_template(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.templates.insert(name.into(), source.into());
        self
    }

    pub fn with_default_extension(mut self, ext: impl Into<String>) -> Self {
        self.default_extension = Some(ext.into());
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_layout_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.layout_keyword = keyword.into();
        self
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.is_cached = enabled;
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_absolute_paths(mut self, allowed: bool) -> Self {
        self.allow_absolute_paths = allowed;
        self
    }

    pub fn with_insecure_access(mut self, allowed: bool) -> Self {
        self.allow_insecure_access = allowed;
        self
    }

    /// Template directories with `relative_to` applied, in search order.
    ///
    /// The layout directory comes last. With no directories configured the
    /// base path itself (or the working directory) is searched.
    pub fn search_dirs(&self) -> Vec<PathBuf> {
        let base = self.relative_to.as_deref();
        let mut dirs: Vec<PathBuf> = self.path.iter().map(|p| resolve(base, p)).collect();

        if dirs.is_empty() {
            dirs.push(base.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(".")));
        }
        if let Some(layout_dir) = &self.layout_path {
            dirs.push(resolve(base, layout_dir));
        }
        dirs
    }

    pub(crate) fn validate(&self) -> Result<(), RenderError> {
        if self.layout_keyword.is_empty() {
            return Err(RenderError::ConfigError(
                "layout_keyword must not be empty".to_string(),
            ));
        }
        if let Some(ext) = &self.default_extension {
            if ext.trim_start_matches('.').is_empty() {
                return Err(RenderError::ConfigError(
                    "default_extension must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn resolve(base: Option<&Path>, path: &Path) -> PathBuf {
    match base {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(PathBuf),
        Many(Vec<PathBuf>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(path) => vec![path],
        OneOrMany::Many(paths) => paths,
    })
}

/// Per-call overrides read out of the render options mapping.
///
/// Keys this manager does not know are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CallOptions {
    pub layout: Option<Layout>,
    pub layout_keyword: Option<String>,
    pub content_type: Option<String>,
}

impl CallOptions {
    pub(crate) fn parse(options: &Options) -> Result<Self, RenderError> {
        if options.is_empty() {
            return Ok(Self::default());
        }
        Self::deserialize(&serde_json::Value::Object(options.clone()))
            .map_err(|e| RenderError::ConfigError(format!("invalid render options: {}", e)))
    }
}
