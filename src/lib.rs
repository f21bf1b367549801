//! # RoutePlan
//!
//! RoutePlan is a tree router with optional segments, typed placeholders,
//! conditions and reverse routing.
//!
//! Routes form a tree. Every route owns a pattern, an optional method filter
//! and any number of children. A request is resolved by walking the tree depth
//! first, in registration order, and the result is a [`Plan`]: the captures of
//! every route on the way down to the endpoint that accepted the request.
//!
//! ## Features
//!
//! **First registered, first matched:** Overlapping routes are fine. Whatever
//! was registered first wins, and a branch that matches a prefix but fails
//! further down is abandoned cleanly so the next sibling gets its turn.
//!
//! **Optional segments:** Placeholders with a default value may be left out of
//! the path, together with the slash in front of them.
//!
//! **Typed placeholders:** Register a type once with [`Router::add_type`] and
//! use it in any pattern as `<name:type>`. Unknown types never match.
//!
//! **Conditions:** Routes can require named predicates over the request, such
//! as the built-in `host` and `agent` conditions.
//!
//! **Reverse routing:** Any route, looked up by name or taken from a plan, can
//! be rendered back into a path.
//!
//! **Plan cache:** Resolved plans are kept in an LRU cache keyed by method, path
//! and upgrade flag.
//!
//! ## Usage
//!
//! ```rust
//! use routeplan::{Router, Shape, Captures};
//! use hyper::Method;
//!
//! let mut router = Router::new();
//! router.root().get("/").to("home#index");
//! router.root().get("/files/*path").to("files#serve").name("file");
//!
//! let mut stash = Captures::new();
//! let plan = router
//!     .dispatch(&Shape::new(Method::GET, "/files/a/b/c.txt"), &mut stash)
//!     .unwrap();
//!
//! assert_eq!(stash.str("path"), Some("a/b/c.txt"));
//! assert_eq!(plan.render(&router, &Captures::new()).unwrap().path, "/files/a/b/c.txt");
//! ```
//!
//! ### Patterns
//!
//! ```ignore
//!  Syntax              Type
//!  :name   <name>      placeholder, one segment without '/' and '.'
//!  #name   <#name>     relaxed placeholder, one segment without '/'
//!  *name   <*name>     wildcard, anything including '/'
//!  <name:type>         placeholder restricted to a registered type
//! ```
//!
//! Endpoints also detect a file extension, captured as `ext`:
//!
//! ```ignore
//! Pattern: /user/:name
//!
//!  /user/gordon              match: name="gordon"
//!  /user/gordon.json         match: name="gordon", ext="json"
//!  /user/gordon/profile      no match
//! ```
//!
//! ### Under routes
//!
//! A route registered with [`RouteMut::under`] only matches a prefix. Its
//! defaults are merged into the stash of every request routed through it:
//!
//! ```rust
//! use routeplan::{Router, Shape, Captures};
//! use hyper::Method;
//!
//! let mut router = Router::new();
//! let admin = router.root().under("/admin").with_default("layout", "admin").id();
//! router.route(admin).get("/users").to("users#list");
//!
//! let mut stash = Captures::new();
//! router.dispatch(&Shape::new(Method::GET, "/admin/users"), &mut stash).unwrap();
//!
//! assert_eq!(stash.str("layout"), Some("admin"));
//! assert_eq!(stash.str("action"), Some("list"));
//! ```

#![forbid(unsafe_code)]

pub mod path;

mod condition;
mod constraint;
mod error;
mod pattern;
mod plan;
mod route;
mod value;

#[doc(hidden)]
pub mod router;

#[doc(inline)]
pub use router::{Action, Handler, Router, Shape};

pub use condition::{Condition, HeaderCondition};
pub use constraint::Constraint;
pub use error::{Error, Result};
pub use pattern::{PartialMatch, Pattern, Token, Types};
pub use plan::Plan;
pub use route::{RootMut, Route, RouteId, RouteMut, Target, Url};
pub use value::{Captures, Value};

// test the code examples in README.md
#[cfg(doctest)]
mod test_readme {
  macro_rules! doc_comment {
    ($x:expr) => {
        #[doc = $x]
        extern {}
    };
  }

  doc_comment!(include_str!("../README.md"));
}
