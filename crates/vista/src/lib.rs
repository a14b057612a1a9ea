//! # Vista - Realm-Scoped View Rendering
//!
//! `vista` attaches view rendering to a hierarchical server configuration
//! tree. A server and each of its isolated sub-applications own a
//! [`Realm`]; any realm may register one views manager, and every render
//! call resolves to the manager of the nearest realm that has one.
//!
//! ## Core Concepts
//!
//! - [`Realm`]: node of the configuration tree with settings and plugin state
//! - [`register_views`]: one-shot manager registration per realm
//! - [`resolve_manager`]: nearest-ancestor manager lookup
//! - [`ServerViews`], [`RequestViews`], [`ToolkitViews`]: render entry points
//!   for the server, request and response-builder call sites
//! - [`build_view_handler`]: declarative view routes
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use vista::{host::Server, RealmSettings, ServerViews};
//! use vista_render::ManagerOptions;
//!
//! # tokio_test_block(async {
//! let server = Server::new(RealmSettings::new().name("app"));
//! server
//!     .views(Some(ManagerOptions::new().with_template("hello", "Hello {{ query.name }}")))
//!     .unwrap();
//!
//! // A plugin without its own manager inherits the server's.
//! let blog = server.plugin(RealmSettings::new().name("blog"));
//! let route = blog.view_route("/hello", &json!("hello")).unwrap();
//!
//! let request = route.request().query_param("name", "ana");
//! let response = route.handle(&request).await.unwrap();
//! assert_eq!(response.body, "Hello ana");
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```
//!
//! ## Error Classes
//!
//! All operations return [`ViewsError`]. Missing options, malformed route
//! configuration, double registration and rendering without a manager are
//! programmer errors reported at the offending call. Manager failures come
//! back as [`ViewsError::Render`] carrying the manager's error unchanged.

mod dispatch;
mod error;
mod handler;
pub mod host;
mod realm;
mod registration;
mod resolve;
mod response;

pub use error::ViewsError;

pub use realm::{Ancestors, PluginState, Realm, RealmSettings};

pub use registration::{
    register_manager, register_views, views_state, ManagerHandle, ViewsState, PLUGIN_NAMESPACE,
};

pub use resolve::{own_manager, resolve_manager};

pub use dispatch::{
    request_render, server_render, toolkit_manager, toolkit_render, toolkit_view, RequestScope,
    RequestViews, ServerScope, ServerViews, ToolkitScope, ToolkitViews,
};

pub use handler::{build_render_context, build_view_handler, HandlerConfig, RouteHandler, ViewHandler};

pub use response::{Response, ViewSource};

// Manager contract, re-exported so hosts need only this crate.
pub use vista_render::{Context, ManagerOptions, Options, RenderError, RenderedOutput, ViewsManager};
