use thiserror::Error;

/// Errors raised while building a route tree or generating URLs.
///
/// Failing to match a request is not an error: dispatch returns `None`.
#[derive(Error, Debug)]
pub enum Error {
    /// A route requires a condition that was never registered on the router.
    #[error("unknown condition: {0}")]
    UnknownCondition(String),
    /// A regular expression constraint or placeholder type failed to compile.
    #[error("invalid regex constraint: {0}")]
    InvalidRegex(#[from] regex::Error),
    /// No route is registered under the given name.
    #[error("no route named {0:?}")]
    UnknownRoute(String),
    /// The plan never reached an endpoint, so there is nothing to render.
    #[error("plan has no endpoint")]
    NoEndpoint,
}

pub type Result<T> = std::result::Result<T, Error>;
