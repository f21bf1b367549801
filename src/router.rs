//! [`Router`](crate::Router) resolves requests against a tree of routes.
//!
//! Routes are tried in the order they were registered. A route with children
//! matches a prefix of the path and hands the rest to its children; if none of
//! them accepts it, the walk backtracks and tries the next sibling:
//! ```ignore
//!  /admin            under, to admin#check
//!    /users          to users#list
//!    /reports        to reports#list
//!  /files/*path      to files#serve
//!
//!   /admin/users              match: controller="users", action="list"
//!   /files/a/b/c.txt          match: path="a/b/c.txt"
//!   /admin/unknown            no match
//! ```
//!
//! The router can be served directly with hyper:
//!
//! ```rust,no_run
//! use routeplan::{Router, Target, Captures};
//! use hyper::{Request, Response, Body, Error};
//!
//! async fn hello(req: Request<Body>) -> Result<Response<Body>, Error> {
//!     let captures = req.extensions().get::<Captures>().unwrap();
//!     Ok(Response::new(format!("Hello, {}", captures.str("user").unwrap()).into()))
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut router = Router::new();
//!     router.root().get("/hello/:user").to(Target::handler(hello));
//!
//!     hyper::Server::bind(&([127, 0, 0, 1], 3000).into())
//!         .serve(router.into_service())
//!         .await;
//! }
//! ```
use crate::condition::{Condition, HeaderCondition};
use crate::constraint::Constraint;
use crate::error::{self, Error};
use crate::path;
use crate::pattern::Types;
use crate::plan::{Frame, Plan};
use crate::route::{RootMut, Route, RouteId, RouteMut, Url};
use crate::value::{Captures, Value};

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::num::NonZeroUsize;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use futures_util::{future, ready};
use hyper::header::UPGRADE;
use hyper::service::Service;
use hyper::{Body, Method, Request, Response, StatusCode};
use lru::LruCache;
use once_cell::sync::OnceCell;

const DEFAULT_CACHE_CAPACITY: usize = 100;

/// The shape of a request as far as routing is concerned.
///
/// Routes with conditions need the request itself; without it they never match.
#[derive(Debug, Clone)]
pub struct Shape<'a> {
    pub method: Method,
    pub path: &'a str,
    pub websocket: bool,
    pub request: Option<&'a Request<Body>>,
}

impl<'a> Shape<'a> {
    pub fn new(method: Method, path: &'a str) -> Self {
        Shape {
            method,
            path,
            websocket: false,
            request: None,
        }
    }

    /// Marks the request as asking for a protocol upgrade.
    pub fn websocket(mut self, websocket: bool) -> Self {
        self.websocket = websocket;
        self
    }

    pub fn request(mut self, request: &'a Request<Body>) -> Self {
        self.request = Some(request);
        self
    }

    /// Derives the shape of a live request. An `Upgrade: websocket` header
    /// marks it as an upgrade.
    pub fn from_request(req: &'a Request<Body>) -> Self {
        let websocket = req
            .headers()
            .get(UPGRADE)
            .and_then(|h| h.to_str().ok())
            .map_or(false, |h| h.eq_ignore_ascii_case("websocket"));

        Shape {
            method: req.method().clone(),
            path: req.uri().path(),
            websocket,
            request: Some(req),
        }
    }
}

/// What a dispatch resolved to, read from the merged stash.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The handler stored under `cb`.
    Handler(Value),
    /// A `controller` and `action` pair, looked up by whoever serves the request.
    Controller { controller: String, action: String },
}

impl Action {
    /// A handler takes precedence over a controller and action.
    pub fn resolve(stash: &Captures) -> Option<Action> {
        if let Some(handler) = stash.get("cb").filter(|v| v.as_handler().is_some()) {
            return Some(Action::Handler(handler.clone()));
        }

        match (stash.str("controller"), stash.str("action")) {
            (Some(controller), Some(action)) => Some(Action::Controller {
                controller: controller.to_owned(),
                action: action.to_owned(),
            }),
            _ => None,
        }
    }
}

/// Router dispatches requests through a tree of routes.
///
/// ```rust
/// use routeplan::{Router, Shape, Captures};
/// use hyper::Method;
///
/// let mut router = Router::new();
/// router.root().get("/test/<controller>/:action").with_default("action", "index");
///
/// let mut stash = Captures::new();
/// let plan = router.dispatch(&Shape::new(Method::GET, "/test/widgets"), &mut stash);
///
/// assert!(plan.is_some());
/// assert_eq!(stash.str("controller"), Some("widgets"));
/// assert_eq!(stash.str("action"), Some("index"));
/// ```
pub struct Router {
    pub(crate) nodes: Vec<Route>,
    pub(crate) types: Arc<Types>,
    pub(crate) conditions: HashMap<String, Arc<dyn Condition>>,
    // set once any route requires a condition, plans then bypass the cache
    pub(crate) conditional: bool,
    cache: Option<Mutex<LruCache<String, Plan>>>,
    index: OnceCell<HashMap<String, RouteId>>,
    actions: HashMap<(String, String), Box<dyn Handler>>,
    not_found: Option<Box<dyn Handler>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle on the root of the tree, to register top level routes.
    pub fn root(&mut self) -> RootMut<'_> {
        RootMut::new(self)
    }

    /// A handle on any route, to add children or change it.
    pub fn route(&mut self, id: RouteId) -> RouteMut<'_> {
        RouteMut::new(self, id)
    }

    pub fn node(&self, id: RouteId) -> &Route {
        &self.nodes[id.0]
    }

    pub(crate) fn add_child(&mut self, parent: RouteId, mut route: Route) -> RouteId {
        let id = RouteId(self.nodes.len());

        route.parent = Some(parent);
        route.root = RouteId(0);
        route.pattern.set_types(self.types.clone());

        self.nodes.push(route);
        self.nodes[parent.0].children.push(id);
        self.touch();
        id
    }

    /// Drops everything derived from the shape of the tree.
    pub(crate) fn touch(&mut self) {
        self.index = OnceCell::new();
        self.clear_cache();
    }

    /// Enables the plan cache with room for `capacity` entries. Zero disables it.
    pub fn cache(mut self, capacity: usize) -> Self {
        self.cache = NonZeroUsize::new(capacity).map(|c| Mutex::new(LruCache::new(c)));
        self
    }

    pub fn without_cache(self) -> Self {
        self.cache(0)
    }

    /// Configurable handler which is called when no matching route is found.
    pub fn not_found(mut self, handler: impl Handler + 'static) -> Self {
        self.not_found = Some(Box::new(handler));
        self
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            if let Ok(mut cache) = cache.lock() {
                cache.clear();
            }
        }
    }

    /// Registers a placeholder type, usable in patterns as `<name:type>`.
    ///
    /// ```rust
    /// use routeplan::{Router, Shape, Captures, Constraint};
    /// use hyper::Method;
    ///
    /// let mut router = Router::new();
    /// router.add_type("num", Constraint::regex(r"\d+").unwrap());
    /// router.root().get("/user/<id:num>");
    ///
    /// let mut stash = Captures::new();
    /// assert!(router.dispatch(&Shape::new(Method::GET, "/user/42"), &mut stash).is_some());
    /// assert!(router.dispatch(&Shape::new(Method::GET, "/user/bob"), &mut stash).is_none());
    /// ```
    pub fn add_type(&mut self, name: &str, constraint: impl Into<Constraint>) {
        let mut types = (*self.types).clone();
        types.insert(name.to_owned(), constraint.into());
        self.types = Arc::new(types);

        for node in &mut self.nodes {
            node.pattern.set_types(self.types.clone());
        }
        self.clear_cache();
    }

    pub fn add_condition(&mut self, name: &str, condition: impl Condition + 'static) {
        self.conditions.insert(name.to_owned(), Arc::new(condition));
        self.clear_cache();
    }

    /// Registers the handler serving a `controller#action` target.
    pub fn add_action(&mut self, controller: &str, action: &str, handler: impl Handler + 'static) {
        self.actions
            .insert((controller.to_owned(), action.to_owned()), Box::new(handler));
    }

    /// True if the route or one of its ancestors only answers upgrades.
    pub fn is_websocket(&self, id: RouteId) -> bool {
        let mut current = Some(id);
        while let Some(id) = current {
            let route = self.node(id);
            if route.websocket {
                return true;
            }
            current = route.parent;
        }
        false
    }

    /// Finds the route named `name`. Custom names take precedence over the
    /// names derived from patterns; otherwise the first route in breadth
    /// first order wins.
    pub fn lookup(&self, name: &str) -> Option<RouteId> {
        self.index.get_or_init(|| self.build_index()).get(name).copied()
    }

    fn build_index(&self) -> HashMap<String, RouteId> {
        let mut custom = HashMap::new();
        let mut derived = HashMap::new();

        let mut queue: VecDeque<RouteId> = self.nodes[0].children.iter().copied().collect();
        while let Some(id) = queue.pop_front() {
            let route = self.node(id);
            match &route.name {
                Some(name) => {
                    custom.entry(name.clone()).or_insert(id);
                }
                None if !route.default_name.is_empty() => {
                    derived.entry(route.default_name.clone()).or_insert(id);
                }
                None => {}
            }
            queue.extend(route.children.iter().copied());
        }

        for (name, id) in derived {
            custom.entry(name).or_insert(id);
        }
        custom
    }

    /// Renders the path of a route, from the root down.
    pub fn render(&self, id: RouteId, values: &Captures) -> Url {
        let mut path = String::new();

        let mut current = Some(id);
        while let Some(id) = current {
            let route = self.node(id);
            path.insert_str(0, &route.pattern.render(values, route.is_endpoint()));
            current = route.parent;
        }

        if path.is_empty() {
            path.push('/');
        }

        Url {
            path,
            websocket: self.is_websocket(id),
        }
    }

    /// Renders the route named `name`.
    ///
    /// ```rust
    /// use routeplan::{Router, Captures};
    /// use std::iter::FromIterator;
    ///
    /// let mut router = Router::new();
    /// router.root().get("/users/:id").name("user");
    ///
    /// let url = router.url_for("user", &Captures::from_iter(vec![("id", "42")])).unwrap();
    /// assert_eq!(url.path, "/users/42");
    /// assert!(!url.websocket);
    /// ```
    pub fn url_for(&self, name: &str, values: &Captures) -> error::Result<Url> {
        let id = self
            .lookup(name)
            .ok_or_else(|| Error::UnknownRoute(name.to_owned()))?;
        Ok(self.render(id, values))
    }

    /// Walks the tree for `shape` and returns the plan of the first endpoint
    /// that accepts it.
    pub fn plot(&self, shape: &Shape<'_>) -> Option<Plan> {
        let mut plan = Plan::default();

        for &child in &self.nodes[0].children {
            if self.walk(&mut plan, child, shape.path, shape) {
                return Some(plan);
            }
        }

        None
    }

    fn walk(&self, plan: &mut Plan, id: RouteId, path: &str, shape: &Shape<'_>) -> bool {
        let route = self.node(id);
        let endpoint = route.is_endpoint();

        let mut frame = Frame::enter(plan);
        frame.stops.push(endpoint || route.under);

        let matched = match route.pattern.match_partial(path, endpoint) {
            Some(matched) => matched,
            None => {
                frame.steps.push(Captures::new());
                return false;
            }
        };
        frame.steps.push(matched.captures);

        if endpoint && !path::is_exhausted(matched.remainder) {
            tracing::trace!(route = id.0, pattern = route.pattern.raw(), "path not exhausted");
            return false;
        }

        if !route.allows(&shape.method) {
            tracing::trace!(route = id.0, method = %shape.method, "method not allowed");
            return false;
        }

        if route.websocket && !shape.websocket {
            tracing::trace!(route = id.0, "upgrade required");
            return false;
        }

        if !self.satisfies(route, shape) {
            tracing::trace!(route = id.0, "conditions not met");
            return false;
        }

        if endpoint {
            frame.endpoint = Some(id);
            return frame.commit();
        }

        for &child in &route.children {
            if self.walk(&mut frame, child, matched.remainder, shape) {
                return frame.commit();
            }
        }

        false
    }

    fn satisfies(&self, route: &Route, shape: &Shape<'_>) -> bool {
        if route.conditions.is_empty() {
            return true;
        }

        let req = match shape.request {
            Some(req) => req,
            None => return false,
        };

        route.conditions.iter().all(|(name, requirement)| {
            self.conditions
                .get(name)
                .map_or(false, |condition| condition.check(req, requirement))
        })
    }

    /// Resolves `shape` and merges every step of the resulting plan into
    /// `stash`. `HEAD` requests are routed like `GET`.
    ///
    /// Returns `None` if no endpoint accepts the request. Failed lookups are
    /// not cached.
    pub fn dispatch(&self, shape: &Shape<'_>, stash: &mut Captures) -> Option<Plan> {
        let mut shape = shape.clone();
        if shape.method == Method::HEAD {
            shape.method = Method::GET;
        }

        let cache = self.cache.as_ref().filter(|_| !self.conditional);
        let key = format!("{}:{}:{}", shape.method, shape.path, shape.websocket);

        let cached = cache.and_then(|cache| cache.lock().ok()?.get(&key).cloned());
        let plan = match cached {
            Some(plan) => {
                tracing::trace!(%key, "plan cache hit");
                plan
            }
            None => {
                if cache.is_some() {
                    tracing::trace!(%key, "plan cache miss");
                }
                let plan = match self.plot(&shape) {
                    Some(plan) => plan,
                    None => {
                        tracing::debug!(method = %shape.method, path = shape.path, "no route found");
                        return None;
                    }
                };

                if let Some(mut cache) = cache.and_then(|cache| cache.lock().ok()) {
                    cache.put(key, plan.clone());
                }
                plan
            }
        };

        for step in &plan.steps {
            stash.merge(step);
        }

        match Action::resolve(stash) {
            Some(Action::Controller { controller, action }) => {
                tracing::debug!(%controller, %action, "routing to controller");
            }
            Some(Action::Handler(_)) => tracing::debug!(path = shape.path, "routing to a callback"),
            None => tracing::debug!(path = shape.path, "route has no target"),
        }

        Some(plan)
    }
}

impl Default for Router {
    fn default() -> Self {
        let mut conditions: HashMap<String, Arc<dyn Condition>> = HashMap::new();
        conditions.insert("host".to_owned(), Arc::new(HeaderCondition::host()));
        conditions.insert("agent".to_owned(), Arc::new(HeaderCondition::agent()));

        Self {
            nodes: vec![Route::new("")],
            types: Arc::new(Types::new()),
            conditions,
            conditional: false,
            cache: None,
            index: OnceCell::new(),
            actions: HashMap::new(),
            not_found: None,
        }
        .cache(DEFAULT_CACHE_CAPACITY)
    }
}

/// Represents a HTTP handler function.
/// This trait is implemented for asynchronous functions that take a `Request` and return a
/// `Result<Response<Body>, hyper::Error>`
/// ```rust
/// # use routeplan::Handler;
/// # use hyper::{Request, Response, Body};
/// async fn hello(_: Request<Body>) -> Result<Response<Body>, hyper::Error> {
///     Ok(Response::new(Body::empty()))
/// }
///
/// let handler: Box<dyn Handler> = Box::new(hello);
/// ```
pub trait Handler: Send + Sync {
    fn handle(
        &self,
        req: Request<Body>,
    ) -> Pin<Box<dyn Future<Output = hyper::Result<Response<Body>>> + Send + Sync>>;
}

impl<F, R> Handler for F
where
    F: Fn(Request<Body>) -> R + Send + Sync,
    R: Future<Output = Result<Response<Body>, hyper::Error>> + Send + Sync + 'static,
{
    fn handle(
        &self,
        req: Request<Body>,
    ) -> Pin<Box<dyn Future<Output = hyper::Result<Response<Body>>> + Send + Sync>> {
        Box::pin(self(req))
    }
}

#[doc(hidden)]
pub struct MakeRouterService(RouterService);

impl<T> Service<T> for MakeRouterService {
    type Response = RouterService;
    type Error = hyper::Error;
    type Future = future::Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _: T) -> Self::Future {
        let service = self.0.clone();
        future::ok(service)
    }
}

#[doc(hidden)]
#[derive(Clone)]
pub struct RouterService(Arc<Router>);

impl RouterService {
    fn new(router: Router) -> Self {
        RouterService(Arc::new(router))
    }
}

impl Service<Request<Body>> for RouterService {
    type Response = Response<Body>;
    type Error = hyper::Error;
    type Future = ResponseFut;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        self.0.serve(req)
    }
}

impl Router {
    /// Converts the `Router` into a `Service` which you can serve directly with `Hyper`.
    /// If you have an existing `Service` that you want to incorporate a `Router` into, see
    /// [`Router::serve`](crate::Router::serve).
    /// ```rust,no_run
    /// # use routeplan::Router;
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// // Our router...
    /// let router = Router::default();
    ///
    /// // Convert it into a service...
    /// let service = router.into_service();
    ///
    /// // Serve with hyper
    /// hyper::Server::bind(&([127, 0, 0, 1], 3030).into())
    ///     .serve(service)
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn into_service(self) -> MakeRouterService {
        MakeRouterService(RouterService::new(self))
    }

    /// An asynchronous function from a `Request` to a `Response`.
    ///
    /// The merged captures are inserted into the request extensions as
    /// [`Captures`] before the target is called. Targets given as
    /// `controller#action` are looked up among the handlers registered with
    /// [`Router::add_action`].
    pub fn serve(&self, mut req: Request<Body>) -> ResponseFut {
        let mut stash = Captures::new();
        let plan = self.dispatch(&Shape::from_request(&req), &mut stash);

        if plan.is_some() {
            let action = Action::resolve(&stash);
            req.extensions_mut().insert(stash);

            match action {
                Some(Action::Handler(handler)) => {
                    if let Some(handler) = handler.as_handler() {
                        return ResponseFutKind::Boxed(handler.handle(req)).into();
                    }
                }
                Some(Action::Controller { controller, action }) => {
                    if let Some(handler) = self.actions.get(&(controller.clone(), action.clone())) {
                        return ResponseFutKind::Boxed(handler.handle(req)).into();
                    }
                    tracing::warn!(%controller, %action, "no handler registered for action");
                }
                None => {}
            }
        }

        match self.not_found {
            Some(ref handler) => ResponseFutKind::Boxed(handler.handle(req)).into(),
            None => ResponseFutKind::NotFound.into(),
        }
    }
}

pub struct ResponseFut {
    kind: ResponseFutKind,
}

impl From<ResponseFutKind> for ResponseFut {
    fn from(kind: ResponseFutKind) -> Self {
        Self { kind }
    }
}

enum ResponseFutKind {
    Boxed(Pin<Box<dyn Future<Output = hyper::Result<Response<Body>>> + Send + Sync>>),
    NotFound,
}

impl Future for ResponseFut {
    type Output = hyper::Result<Response<Body>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let ready = match self.kind {
            ResponseFutKind::Boxed(ref mut fut) => ready!(fut.as_mut().poll(cx)),
            ResponseFutKind::NotFound => Ok(Response::builder()
                .status(StatusCode::NOT_FOUND)
                .body(Body::empty())
                .unwrap()),
        };

        Poll::Ready(ready)
    }
}
