//! Minimal host objects.
//!
//! A real web server implements [`ServerScope`], [`RequestScope`] and
//! [`ToolkitScope`] on its own types. The types here implement them with
//! plain data so the views layer can be embedded directly or exercised in
//! tests without a server.
//!
//! ```rust,ignore
//! let server = Server::new(RealmSettings::new().name("app"));
//! server.views(Some(ManagerOptions::new().with_path("views")))?;
//!
//! let route = server.view_route("/", &json!("home"))?;
//! let response = route.handle(&route.request()).await?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use vista_render::Context;

use crate::dispatch::{RequestScope, ServerScope, ToolkitScope};
use crate::error::ViewsError;
use crate::handler::{build_view_handler, RouteHandler};
use crate::realm::{Realm, RealmSettings};
use crate::response::Response;

/// A server object bound to one realm.
///
/// Plugin servers created with [`Server::plugin`] share the root realm but
/// carry their own child realm, the way sub-applications are isolated.
#[derive(Debug, Clone)]
pub struct Server {
    realm: Realm,
    root: Realm,
}

impl Server {
    /// Creates a server with a fresh root realm.
    pub fn new(settings: RealmSettings) -> Self {
        let root = Realm::root(settings);
        Self {
            realm: root.clone(),
            root,
        }
    }

    /// Creates a sub-application server in a child realm of this one.
    pub fn plugin(&self, settings: RealmSettings) -> Server {
        Server {
            realm: self.realm.child(settings),
            root: self.root.clone(),
        }
    }

    pub fn root_realm(&self) -> &Realm {
        &self.root
    }

    /// Registers a route whose handler renders a configured view.
    pub fn view_route(&self, path: &str, config: &Value) -> Result<Route, ViewsError> {
        let handler = build_view_handler(path, config)?;
        Ok(self.route(path, Arc::new(handler)))
    }

    /// Registers a route with an arbitrary handler in this server's realm.
    pub fn route(&self, path: &str, handler: Arc<dyn RouteHandler>) -> Route {
        Route {
            path: path.to_string(),
            realm: self.realm.clone(),
            server_realm: self.root.clone(),
            handler,
        }
    }
}

impl ServerScope for Server {
    fn realm(&self) -> &Realm {
        &self.realm
    }
}

/// A registered route.
#[derive(Clone)]
pub struct Route {
    path: String,
    realm: Realm,
    server_realm: Realm,
    handler: Arc<dyn RouteHandler>,
}

impl Route {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    /// An empty request matched to this route.
    pub fn request(&self) -> Request {
        Request {
            route_path: self.path.clone(),
            route_realm: self.realm.clone(),
            server_realm: self.server_realm.clone(),
            params: Context::new(),
            payload: Value::Null,
            query: Context::new(),
            pre: Context::new(),
        }
    }

    /// Runs the route handler with a toolkit scoped to the route's realm.
    pub async fn handle(&self, request: &Request) -> Result<Response, ViewsError> {
        let toolkit = Toolkit::new(Some(self.realm.clone()), request);
        self.handler.handle(request, &toolkit).await
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("realm", &self.realm.display_name())
            .finish_non_exhaustive()
    }
}

/// A request carrying plain data.
#[derive(Debug, Clone)]
pub struct Request {
    route_path: String,
    route_realm: Realm,
    server_realm: Realm,
    params: Context,
    payload: Value,
    query: Context,
    pre: Context,
}

impl Request {
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_query(mut self, query: BTreeMap<String, Value>) -> Self {
        self.query.extend(query);
        self
    }

    pub fn with_payload(mut self, payload: impl Into<Value>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn pre_result(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.pre.insert(key.into(), value.into());
        self
    }
}

impl RequestScope for Request {
    fn route_realm(&self) -> &Realm {
        &self.route_realm
    }

    fn server_realm(&self) -> &Realm {
        &self.server_realm
    }

    fn route_path(&self) -> &str {
        &self.route_path
    }

    fn params(&self) -> &Context {
        &self.params
    }

    fn payload(&self) -> &Value {
        &self.payload
    }

    fn query(&self) -> &Context {
        &self.query
    }

    fn pre(&self) -> &Context {
        &self.pre
    }
}

/// A response builder bound to one request.
pub struct Toolkit<'a> {
    realm: Option<Realm>,
    request: &'a dyn RequestScope,
}

impl<'a> Toolkit<'a> {
    pub fn new(realm: Option<Realm>, request: &'a dyn RequestScope) -> Self {
        Self { realm, request }
    }
}

impl ToolkitScope for Toolkit<'_> {
    fn realm(&self) -> Option<&Realm> {
        self.realm.as_ref()
    }

    fn request(&self) -> &dyn RequestScope {
        self.request
    }
}
