use crate::error::{Error, Result};
use crate::route::{RouteId, Url};
use crate::router::Router;
use crate::value::Captures;

use std::ops::{Deref, DerefMut};

/// The path a dispatch took through the route tree.
///
/// `steps` holds the captures of every route on the winning path, root side
/// first, and `stops` tells whether the route at the same position is an
/// endpoint or an `under` route rather than a transparent intermediate one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub(crate) steps: Vec<Captures>,
    pub(crate) stops: Vec<bool>,
    pub(crate) endpoint: Option<RouteId>,
}

impl Plan {
    pub fn steps(&self) -> &[Captures] {
        &self.steps
    }

    pub fn stops(&self) -> &[bool] {
        &self.stops
    }

    pub fn endpoint(&self) -> Option<RouteId> {
        self.endpoint
    }

    /// All steps merged in order, later routes overriding earlier ones.
    pub fn stash(&self) -> Captures {
        let mut stash = Captures::new();
        for step in &self.steps {
            stash.merge(step);
        }
        stash
    }

    /// Renders the endpoint of this plan again, with `values` replacing what
    /// was captured.
    ///
    /// The captured extension is dropped unless the endpoint constrains it.
    pub fn render(&self, router: &Router, values: &Captures) -> Result<Url> {
        let endpoint = self.endpoint.ok_or(Error::NoEndpoint)?;

        let mut merged = self.stash();
        if router.node(endpoint).pattern().constraint("ext").is_none() {
            merged.remove("ext");
        }
        merged.merge(values);

        Ok(router.render(endpoint, &merged))
    }
}

/// One level of the tree walk. Whatever the level pushed onto the plan is
/// popped again when the frame drops, unless it was committed.
pub(crate) struct Frame<'a> {
    plan: &'a mut Plan,
    depth: usize,
    keep: bool,
}

impl<'a> Frame<'a> {
    pub(crate) fn enter(plan: &'a mut Plan) -> Self {
        let depth = plan.stops.len();
        Frame {
            plan,
            depth,
            keep: false,
        }
    }

    pub(crate) fn commit(mut self) -> bool {
        self.keep = true;
        true
    }
}

impl Deref for Frame<'_> {
    type Target = Plan;

    fn deref(&self) -> &Plan {
        self.plan
    }
}

impl DerefMut for Frame<'_> {
    fn deref_mut(&mut self) -> &mut Plan {
        self.plan
    }
}

impl Drop for Frame<'_> {
    fn drop(&mut self) {
        if !self.keep {
            self.plan.steps.truncate(self.depth);
            self.plan.stops.truncate(self.depth);
        }
    }
}
