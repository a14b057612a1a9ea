//! Render entry points for the three call sites.
//!
//! The host exposes its server, request and response-builder objects through
//! [`ServerScope`], [`RequestScope`] and [`ToolkitScope`]. Each call site has
//! one adapter that picks the manager and then renders through it:
//!
//! | Call site | Manager lookup |
//! |-----------|----------------|
//! | [`server_render`] | ancestor walk from the server's realm |
//! | [`request_render`] | ancestor walk from the matched route's realm |
//! | [`toolkit_render`] / [`toolkit_view`] | current realm's own state, else the server realm's own state |
//!
//! The toolkit lookup is flat: it does not walk ancestors.
//!
//! Every adapter fails with [`ViewsError::MissingManager`] before calling
//! anything when no manager is found, and returns the manager's result
//! unchanged otherwise. The extension traits [`ServerViews`],
//! [`RequestViews`] and [`ToolkitViews`] expose the adapters as methods on
//! any scope implementation.

use async_trait::async_trait;
use tracing::debug;
use vista_render::{Context, ManagerOptions, Options, RenderedOutput};

use crate::error::ViewsError;
use crate::realm::Realm;
use crate::registration::{register_views, views_state, ManagerHandle};
use crate::resolve::resolve_manager;
use crate::response::{Response, ViewSource};

/// A server as seen by the views layer.
pub trait ServerScope: Send + Sync {
    /// The realm this server object was handed out for.
    fn realm(&self) -> &Realm;
}

/// An in-flight request as seen by the views layer.
pub trait RequestScope: Send + Sync {
    /// Realm the matched route was registered in.
    fn route_realm(&self) -> &Realm;

    /// Root realm of the server handling the request.
    fn server_realm(&self) -> &Realm;

    /// Path of the matched route.
    fn route_path(&self) -> &str;

    fn params(&self) -> &Context;

    /// Parsed request body, `Null` when there is none.
    fn payload(&self) -> &serde_json::Value;

    fn query(&self) -> &Context;

    /// Results of pre-handler steps, by assignment name.
    fn pre(&self) -> &Context;
}

/// The response builder handed to route handlers.
pub trait ToolkitScope: Send + Sync {
    /// Realm the builder is currently rendering in, if the host tracks one.
    fn realm(&self) -> Option<&Realm>;

    fn request(&self) -> &dyn RequestScope;
}

async fn render_with(
    manager: Option<ManagerHandle>,
    route: Option<&str>,
    template: &str,
    context: Option<&Context>,
    options: Option<&Options>,
) -> Result<RenderedOutput, ViewsError> {
    let manager = manager.ok_or(ViewsError::MissingManager)?;
    let empty = Options::new();
    let options = options.unwrap_or(&empty);

    manager
        .render(template, context, options)
        .await
        .map_err(|err| {
            debug!(template, route, error = %err, "view render failed");
            ViewsError::Render(err)
        })
}

/// Renders through the manager resolved from the server's realm.
pub async fn server_render<S: ServerScope + ?Sized>(
    server: &S,
    template: &str,
    context: Option<&Context>,
    options: Option<&Options>,
) -> Result<RenderedOutput, ViewsError> {
    render_with(resolve_manager(server.realm()), None, template, context, options).await
}

/// Renders through the manager resolved from the request's route realm.
pub async fn request_render<R: RequestScope + ?Sized>(
    request: &R,
    template: &str,
    context: Option<&Context>,
    options: Option<&Options>,
) -> Result<RenderedOutput, ViewsError> {
    render_with(
        resolve_manager(request.route_realm()),
        Some(request.route_path()),
        template,
        context,
        options,
    )
    .await
}

/// The manager a toolkit renders with.
///
/// The current realm's views state is used when it exists; otherwise the
/// server realm's. Neither lookup walks ancestors.
pub fn toolkit_manager<T: ToolkitScope + ?Sized>(toolkit: &T) -> Option<ManagerHandle> {
    let state = toolkit
        .realm()
        .and_then(views_state)
        .or_else(|| views_state(toolkit.request().server_realm()))?;
    state.manager().cloned()
}

/// Renders through the toolkit's manager.
pub async fn toolkit_render<T: ToolkitScope + ?Sized>(
    toolkit: &T,
    template: &str,
    context: Option<&Context>,
    options: Option<&Options>,
) -> Result<RenderedOutput, ViewsError> {
    render_with(
        toolkit_manager(toolkit),
        Some(toolkit.request().route_path()),
        template,
        context,
        options,
    )
    .await
}

/// Renders through the toolkit's manager and wraps the output in a response.
pub async fn toolkit_view<T: ToolkitScope + ?Sized>(
    toolkit: &T,
    template: &str,
    context: Option<&Context>,
    options: Option<&Options>,
) -> Result<Response, ViewsError> {
    let output = toolkit_render(toolkit, template, context, options).await?;
    let source = ViewSource {
        template: template.to_string(),
        context: context.cloned(),
        options: options.cloned().unwrap_or_default(),
    };
    Ok(Response::view(output, source))
}

/// Views capabilities of a server object.
#[async_trait]
pub trait ServerViews: ServerScope {
    /// Registers a template manager on this server's realm.
    fn views(&self, options: Option<ManagerOptions>) -> Result<ManagerHandle, ViewsError> {
        register_views(self.realm(), options)
    }

    async fn render(
        &self,
        template: &str,
        context: Option<&Context>,
        options: Option<&Options>,
    ) -> Result<RenderedOutput, ViewsError> {
        server_render(self, template, context, options).await
    }
}

impl<S: ServerScope + ?Sized> ServerViews for S {}

/// Views capabilities of a request object.
#[async_trait]
pub trait RequestViews: RequestScope {
    async fn render(
        &self,
        template: &str,
        context: Option<&Context>,
        options: Option<&Options>,
    ) -> Result<RenderedOutput, ViewsError> {
        request_render(self, template, context, options).await
    }
}

impl<R: RequestScope + ?Sized> RequestViews for R {}

/// Views capabilities of a response builder.
#[async_trait]
pub trait ToolkitViews: ToolkitScope {
    async fn render(
        &self,
        template: &str,
        context: Option<&Context>,
        options: Option<&Options>,
    ) -> Result<RenderedOutput, ViewsError> {
        toolkit_render(self, template, context, options).await
    }

    async fn view(
        &self,
        template: &str,
        context: Option<&Context>,
        options: Option<&Options>,
    ) -> Result<Response, ViewsError> {
        toolkit_view(self, template, context, options).await
    }
}

impl<T: ToolkitScope + ?Sized> ToolkitViews for T {}
