use crate::constraint::Constraint;
use crate::error::{Error, Result};
use crate::pattern::Pattern;
use crate::router::{Handler, Router};
use crate::value::{Captures, Value};

use std::sync::Arc;

use hyper::Method;

/// Identifies a route within the arena of its [`Router`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(pub(crate) usize);

/// A node of the route tree.
///
/// A route without children is an *endpoint*, the only kind of route a
/// dispatch can end on. Routes are created through [`RouteMut`] and are
/// read-only once the router starts serving.
#[derive(Debug)]
pub struct Route {
    pub(crate) pattern: Pattern,
    pub(crate) children: Vec<RouteId>,
    pub(crate) parent: Option<RouteId>,
    pub(crate) root: RouteId,
    pub(crate) methods: Vec<Method>,
    pub(crate) websocket: bool,
    pub(crate) under: bool,
    pub(crate) name: Option<String>,
    pub(crate) default_name: String,
    pub(crate) conditions: Vec<(String, Constraint)>,
}

impl Route {
    pub(crate) fn new(pattern: &str) -> Self {
        // "/users/:id" is known as "usersid" unless named otherwise
        let default_name = pattern
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_')
            .collect();

        Route {
            pattern: Pattern::new(pattern),
            children: Vec::new(),
            parent: None,
            root: RouteId(0),
            methods: Vec::new(),
            websocket: false,
            under: false,
            name: None,
            default_name,
            conditions: Vec::new(),
        }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn children(&self) -> &[RouteId] {
        &self.children
    }

    pub fn parent(&self) -> Option<RouteId> {
        self.parent
    }

    pub fn root(&self) -> RouteId {
        self.root
    }

    /// Allowed methods, empty if any method is allowed.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// The custom name if one was given, the name derived from the pattern otherwise.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.default_name)
    }

    pub fn has_custom_name(&self) -> bool {
        self.name.is_some()
    }

    pub fn conditions(&self) -> &[(String, Constraint)] {
        &self.conditions
    }

    pub fn is_endpoint(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_under(&self) -> bool {
        self.under
    }

    /// True if this route itself is upgrade-only. See [`Router::is_websocket`]
    /// for the inherited flag.
    pub fn is_websocket(&self) -> bool {
        self.websocket
    }

    pub(crate) fn allows(&self, method: &Method) -> bool {
        self.methods.is_empty() || self.methods.contains(method)
    }
}

/// What a route dispatches to, attached with [`RouteMut::to`].
///
/// ```rust
/// use routeplan::Target;
///
/// let target = Target::from("users#list");
/// assert_eq!(target, Target::action("users", "list"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// A `controller#action` pair, resolved by whoever serves the request.
    Action {
        controller: Option<String>,
        action: Option<String>,
    },
    /// A handler called directly, stored under `cb`.
    Handler(Value),
    /// Arbitrary default values.
    Values(Captures),
}

impl Target {
    pub fn action(controller: &str, action: &str) -> Self {
        Target::Action {
            controller: Some(controller.to_owned()),
            action: Some(action.to_owned()),
        }
    }

    pub fn handler(handler: impl Handler + 'static) -> Self {
        let handler: Arc<dyn Handler> = Arc::new(handler);
        Target::Handler(Value::Handler(handler))
    }

    fn into_values(self) -> Captures {
        let mut values = Captures::new();
        match self {
            Target::Action { controller, action } => {
                if let Some(controller) = controller {
                    values.insert("controller", controller);
                }
                if let Some(action) = action {
                    values.insert("action", action);
                }
            }
            Target::Handler(handler) => values.insert("cb", handler),
            Target::Values(v) => values = v,
        }
        values
    }
}

/// `"controller#action"`, `"#action"` or a bare `"controller"`.
impl From<&str> for Target {
    fn from(s: &str) -> Self {
        let non_empty = |s: &str| Some(s.to_owned()).filter(|s| !s.is_empty());

        match s.split_once('#') {
            Some((controller, action)) => Target::Action {
                controller: non_empty(controller),
                action: non_empty(action),
            },
            None => Target::Action {
                controller: non_empty(s),
                action: None,
            },
        }
    }
}

impl From<Captures> for Target {
    fn from(values: Captures) -> Self {
        Target::Values(values)
    }
}

/// A mutable handle on one route of a router, used to build the tree.
///
/// Methods creating a child (`any`, `get`, `under`, ...) return a handle on
/// that child. Everything else configures the current route and returns it.
///
/// ```rust
/// use routeplan::{Router, Shape, Captures};
/// use hyper::Method;
///
/// let mut router = Router::new();
/// let admin = router.root().under("/admin").to("admin#check").id();
/// router.route(admin).get("/users").to("users#list");
/// router.route(admin).get("/reports").to("reports#list");
///
/// let mut stash = Captures::new();
/// let plan = router.dispatch(&Shape::new(Method::GET, "/admin/users"), &mut stash).unwrap();
///
/// assert_eq!(plan.steps().len(), 2);
/// assert_eq!(stash.str("controller"), Some("users"));
/// ```
pub struct RouteMut<'r> {
    router: &'r mut Router,
    id: RouteId,
}

impl<'r> RouteMut<'r> {
    pub(crate) fn new(router: &'r mut Router, id: RouteId) -> Self {
        RouteMut { router, id }
    }

    pub fn id(&self) -> RouteId {
        self.id
    }

    fn node(&mut self) -> &mut Route {
        self.router.touch();
        &mut self.router.nodes[self.id.0]
    }

    fn child(self, pattern: &str, methods: &[Method]) -> RouteMut<'r> {
        let RouteMut { router, id } = self;

        let mut route = Route::new(pattern);
        route.methods = methods.to_vec();
        let child = router.add_child(id, route);

        RouteMut { router, id: child }
    }

    /// Adds a child route matching any method.
    pub fn any(self, pattern: &str) -> RouteMut<'r> {
        self.child(pattern, &[])
    }

    /// Adds a child route matching one of `methods`.
    pub fn via(self, methods: &[Method], pattern: &str) -> RouteMut<'r> {
        self.child(pattern, methods)
    }

    pub fn get(self, pattern: &str) -> RouteMut<'r> {
        self.child(pattern, &[Method::GET])
    }

    pub fn post(self, pattern: &str) -> RouteMut<'r> {
        self.child(pattern, &[Method::POST])
    }

    pub fn put(self, pattern: &str) -> RouteMut<'r> {
        self.child(pattern, &[Method::PUT])
    }

    pub fn patch(self, pattern: &str) -> RouteMut<'r> {
        self.child(pattern, &[Method::PATCH])
    }

    pub fn delete(self, pattern: &str) -> RouteMut<'r> {
        self.child(pattern, &[Method::DELETE])
    }

    pub fn options(self, pattern: &str) -> RouteMut<'r> {
        self.child(pattern, &[Method::OPTIONS])
    }

    /// Adds a prefix route. Its captures and defaults are kept for every
    /// request routed through its children.
    pub fn under(self, pattern: &str) -> RouteMut<'r> {
        let mut child = self.child(pattern, &[]);
        child.node().under = true;
        child
    }

    /// Adds a child route that only matches protocol upgrade requests.
    pub fn websocket(self, pattern: &str) -> RouteMut<'r> {
        let mut child = self.child(pattern, &[Method::GET]);
        child.node().websocket = true;
        child
    }

    /// Merges `target` into the defaults of this route.
    pub fn to(mut self, target: impl Into<Target>) -> Self {
        let values = target.into().into_values();
        self.node().pattern.merge_defaults(&values);
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.node().name = Some(name.to_owned());
        self
    }

    /// Restricts this route to `methods`. An empty list allows any method.
    pub fn methods(mut self, methods: &[Method]) -> Self {
        self.node().methods = methods.to_vec();
        self
    }

    /// Restricts what the placeholder `name` (or the extension, `ext`) matches.
    pub fn constraint(mut self, name: &str, constraint: impl Into<Constraint>) -> Self {
        self.node().pattern.set_constraint(name, constraint.into());
        self
    }

    /// Sets a default value, making the placeholder `name` optional.
    pub fn with_default(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.node().pattern.set_default(name, value);
        self
    }

    /// Attaches a condition registered on the router. The route only matches
    /// while `condition` holds for the request against `requirement`.
    pub fn requires(mut self, condition: &str, requirement: impl Into<Constraint>) -> Result<Self> {
        if !self.router.conditions.contains_key(condition) {
            return Err(Error::UnknownCondition(condition.to_owned()));
        }

        self.router.conditional = true;
        self.node()
            .conditions
            .push((condition.to_owned(), requirement.into()));
        Ok(self)
    }
}

/// A handle on the root of the tree.
///
/// The root is never matched itself, only its children are, so it can
/// register routes but carries no target, defaults or conditions:
/// ```rust,compile_fail
/// let mut router = routeplan::Router::new();
/// router.root().to("home#index");
/// ```
pub struct RootMut<'r>(RouteMut<'r>);

impl<'r> RootMut<'r> {
    pub(crate) fn new(router: &'r mut Router) -> Self {
        RootMut(RouteMut::new(router, RouteId(0)))
    }

    pub fn any(self, pattern: &str) -> RouteMut<'r> {
        self.0.any(pattern)
    }

    pub fn via(self, methods: &[Method], pattern: &str) -> RouteMut<'r> {
        self.0.via(methods, pattern)
    }

    pub fn get(self, pattern: &str) -> RouteMut<'r> {
        self.0.get(pattern)
    }

    pub fn post(self, pattern: &str) -> RouteMut<'r> {
        self.0.post(pattern)
    }

    pub fn put(self, pattern: &str) -> RouteMut<'r> {
        self.0.put(pattern)
    }

    pub fn patch(self, pattern: &str) -> RouteMut<'r> {
        self.0.patch(pattern)
    }

    pub fn delete(self, pattern: &str) -> RouteMut<'r> {
        self.0.delete(pattern)
    }

    pub fn options(self, pattern: &str) -> RouteMut<'r> {
        self.0.options(pattern)
    }

    pub fn under(self, pattern: &str) -> RouteMut<'r> {
        self.0.under(pattern)
    }

    pub fn websocket(self, pattern: &str) -> RouteMut<'r> {
        self.0.websocket(pattern)
    }
}

/// A rendered route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    pub path: String,
    /// The route only answers protocol upgrades, so `ws`/`wss` applies.
    pub websocket: bool,
}
