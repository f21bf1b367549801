use crate::error::Result;

use regex::Regex;

/// Restricts what a placeholder (or a condition) accepts.
///
/// ```rust
/// use routeplan::Constraint;
///
/// let num = Constraint::regex(r"\d+").unwrap();
/// assert!(num.is_match("42"));
///
/// let format = Constraint::from(vec!["html", "json"]);
/// assert!(format.is_match("json"));
/// assert!(!format.is_match("xml"));
/// ```
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Any value the regular expression matches.
    Regex(Regex),
    /// Exactly this string.
    Literal(String),
    /// Exactly one of these strings.
    OneOf(Vec<String>),
}

impl Constraint {
    /// Compiles `src` into a regex constraint.
    pub fn regex(src: &str) -> Result<Self> {
        Ok(Constraint::Regex(Regex::new(src)?))
    }

    /// Builds a finite set of alternatives.
    pub fn one_of<I, S>(alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Constraint::OneOf(alternatives.into_iter().map(Into::into).collect())
    }

    /// The regex fragment embedded into a compiled pattern. Never contains
    /// a capture group of its own at the top level.
    pub(crate) fn fragment(&self) -> String {
        match self {
            Constraint::Regex(re) => format!("(?:{})", re.as_str()),
            Constraint::Literal(s) => regex::escape(s),
            Constraint::OneOf(alternatives) => {
                // longest alternative first, so `html` wins over `htm`
                let mut sorted = alternatives.clone();
                sorted.sort();
                sorted.reverse();

                let escaped = sorted
                    .iter()
                    .map(|s| regex::escape(s))
                    .collect::<Vec<_>>();

                format!("(?:{})", escaped.join("|"))
            }
        }
    }

    /// Checks a standalone value. Regex constraints search the value, the
    /// others compare it exactly.
    pub fn is_match(&self, value: &str) -> bool {
        match self {
            Constraint::Regex(re) => re.is_match(value),
            Constraint::Literal(s) => s == value,
            Constraint::OneOf(alternatives) => alternatives.iter().any(|s| s == value),
        }
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Constraint::Regex(a), Constraint::Regex(b)) => a.as_str() == b.as_str(),
            (Constraint::Literal(a), Constraint::Literal(b)) => a == b,
            (Constraint::OneOf(a), Constraint::OneOf(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Regex> for Constraint {
    fn from(re: Regex) -> Self {
        Constraint::Regex(re)
    }
}

impl From<&str> for Constraint {
    fn from(s: &str) -> Self {
        Constraint::Literal(s.to_owned())
    }
}

impl From<String> for Constraint {
    fn from(s: String) -> Self {
        Constraint::Literal(s)
    }
}

impl From<Vec<&str>> for Constraint {
    fn from(alternatives: Vec<&str>) -> Self {
        Constraint::one_of(alternatives)
    }
}

impl From<Vec<String>> for Constraint {
    fn from(alternatives: Vec<String>) -> Self {
        Constraint::OneOf(alternatives)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_fragment_is_escaped() {
        let c = Constraint::from("a.b");
        assert_eq!(c.fragment(), r"a\.b");
        assert!(c.is_match("a.b"));
        assert!(!c.is_match("axb"));
    }

    #[test]
    fn alternatives_prefer_longest() {
        let c = Constraint::from(vec!["htm", "html", "json"]);
        assert_eq!(c.fragment(), "(?:json|html|htm)");
    }

    #[test]
    fn regex_fragment_is_grouped() {
        let c = Constraint::regex(r"\d+|x").unwrap();
        assert_eq!(c.fragment(), r"(?:\d+|x)");
    }

    #[test]
    fn invalid_regex() {
        assert!(Constraint::regex("(").is_err());
    }
}
