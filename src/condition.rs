use crate::constraint::Constraint;

use hyper::header::{HeaderName, HOST, USER_AGENT};
use hyper::{Body, Request};

/// A named predicate a route can require in addition to its pattern and methods.
///
/// Conditions are registered on the [`Router`](crate::Router) by name and
/// attached to routes with [`RouteMut::requires`](crate::RouteMut::requires),
/// which also supplies the `requirement` the condition is evaluated against.
///
/// This trait is implemented for closures:
/// ```rust
/// use routeplan::{Condition, Constraint};
/// use hyper::{Body, Request};
///
/// let secure = |req: &Request<Body>, _: &Constraint| req.uri().scheme_str() == Some("https");
/// let condition: Box<dyn Condition> = Box::new(secure);
/// ```
pub trait Condition: Send + Sync {
    fn check(&self, req: &Request<Body>, requirement: &Constraint) -> bool;
}

impl<F> Condition for F
where
    F: Fn(&Request<Body>, &Constraint) -> bool + Send + Sync,
{
    fn check(&self, req: &Request<Body>, requirement: &Constraint) -> bool {
        self(req, requirement)
    }
}

/// Matches a request header against the requirement.
///
/// The router registers two of these by default: `host` and `agent`.
#[derive(Debug, Clone)]
pub struct HeaderCondition {
    header: HeaderName,
}

impl HeaderCondition {
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }

    pub fn host() -> Self {
        Self::new(HOST)
    }

    pub fn agent() -> Self {
        Self::new(USER_AGENT)
    }
}

impl Condition for HeaderCondition {
    fn check(&self, req: &Request<Body>, requirement: &Constraint) -> bool {
        let value = match req.headers().get(&self.header).and_then(|h| h.to_str().ok()) {
            Some(value) => value,
            None => return false,
        };

        if self.header == HOST {
            // ignore the port and letter case
            let host = value.split(':').next().unwrap_or(value).to_lowercase();
            return requirement.is_match(&host);
        }

        requirement.is_match(value)
    }
}
