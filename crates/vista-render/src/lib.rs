//! # Vista Render - Views Manager
//!
//! `vista-render` provides the [`ViewsManager`] contract that realm-scoped
//! view rendering talks to, plus [`TemplateManager`], a MiniJinja-backed
//! implementation covering template directories, inline templates, layouts,
//! global context and an optional no-cache mode for development.
//!
//! The `vista` crate owns the realm tree and the render entry points; this
//! crate only knows how to turn `(template, context, options)` into output.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use vista_render::{Layout, ManagerOptions, Options, TemplateManager};
//!
//! let manager = TemplateManager::new(
//!     ManagerOptions::new()
//!         .with_template("layout", "<body>{{ content }}</body>")
//!         .with_template("home", "Hi {{ user }}")
//!         .with_layout(Layout::Enabled),
//! ).unwrap();
//!
//! let context = json!({ "user": "ana" }).as_object().cloned().unwrap();
//! let output = manager.render_now("home", Some(&context), &Options::new()).unwrap();
//! assert_eq!(output.body, "<body>Hi ana</body>");
//! ```
//!
//! ## Configuration
//!
//! See [`ManagerOptions`] for every setting. Options deserialize from JSON or
//! YAML with the same field names.

mod error;
mod manager;
pub mod options;
pub mod template;

pub use error::RenderError;

pub use manager::{Context, Options, RenderedOutput, TemplateManager, ViewsManager};

pub use options::{
    Layout, ManagerOptions, DEFAULT_CONTENT_TYPE, DEFAULT_LAYOUT, DEFAULT_LAYOUT_KEYWORD,
};

pub use template::{check_name, MiniJinjaEngine, TemplateEngine, TemplateSource, TEMPLATE_EXTENSIONS};
