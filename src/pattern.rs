//! Route patterns.
//!
//! A pattern is a path template made of literal text, slashes and three kinds
//! of placeholders:
//! ```ignore
//!  Syntax              Type
//!  :name   <name>      placeholder, one segment without '/' and '.'
//!  #name   <#name>     relaxed placeholder, one segment without '/'
//!  *name   <*name>     wildcard, anything including '/'
//!  <name:type>         placeholder restricted to a type registered on the router
//! ```
//!
//! Placeholders with a default value are optional. A trailing segment made of
//! optional placeholders only may be left out entirely:
//! ```ignore
//!  Pattern: /test/<controller>/:action      defaults: action="index"
//!
//!   /test/widgets              match: controller="widgets", action="index"
//!   /test/widgets/list         match: controller="widgets", action="list"
//!   /test                      no match
//! ```
//!
//! Endpoint patterns additionally detect a file extension such as `.html`,
//! which is captured as `ext`.
use crate::constraint::Constraint;
use crate::path;
use crate::value::{Captures, Value};

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use regex::Regex;

/// Placeholder types shared by every pattern of a router.
pub type Types = HashMap<String, Constraint>;

// Matches nothing: a position cannot be both a word boundary and not one.
const NEVER: &str = r"\b\B";

const EXT: &str = "ext";

/// A single element of a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Slash,
    Text(String),
    Placeholder { name: String, ty: Option<String> },
    Relaxed { name: String, ty: Option<String> },
    Wildcard { name: String, ty: Option<String> },
}

impl Token {
    fn placeholder(&self) -> Option<(&str, Option<&str>)> {
        match self {
            Token::Placeholder { name, ty }
            | Token::Relaxed { name, ty }
            | Token::Wildcard { name, ty } => Some((name, ty.as_deref())),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Matcher {
    regex: Regex,
    // capture group index for every placeholder, in declaration order
    slots: Vec<Option<usize>>,
    ext: Option<usize>,
}

/// The result of matching a pattern against the beginning of a path.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialMatch<'p> {
    /// Whatever the pattern did not consume.
    pub remainder: &'p str,
    pub captures: Captures,
}

/// A compiled route pattern.
///
/// ```rust
/// use routeplan::Pattern;
///
/// let pattern = Pattern::new("/foo/:bar/baz");
/// let captures = pattern.matches("/foo/anything/baz", true).unwrap();
/// assert_eq!(captures.str("bar"), Some("anything"));
///
/// assert!(pattern.matches("/foo/baz", true).is_none());
/// assert!(pattern.matches("/foo/a/b/baz", true).is_none());
/// ```
#[derive(Debug, Default)]
pub struct Pattern {
    raw: String,
    // stored right to left
    tokens: Vec<Token>,
    placeholders: Vec<String>,
    constraints: HashMap<String, Constraint>,
    defaults: Captures,
    types: Arc<Types>,
    endpoint: OnceCell<Matcher>,
    partial: OnceCell<Matcher>,
}

impl Pattern {
    pub fn new(raw: &str) -> Self {
        let mut pattern = Pattern {
            raw: raw.to_owned(),
            ..Pattern::default()
        };
        pattern.parse();
        pattern
    }

    /// The pattern as it was registered.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Tokens in reverse declaration order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Placeholder names in declaration order.
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    pub fn defaults(&self) -> &Captures {
        &self.defaults
    }

    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.get(name)
    }

    pub fn set_constraint(&mut self, name: impl Into<String>, constraint: Constraint) {
        self.constraints.insert(name.into(), constraint);
        self.invalidate();
    }

    pub fn set_default(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.defaults.insert(name, value);
        self.invalidate();
    }

    pub fn merge_defaults(&mut self, values: &Captures) {
        self.defaults.merge(values);
        self.invalidate();
    }

    pub fn set_types(&mut self, types: Arc<Types>) {
        self.types = types;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.endpoint = OnceCell::new();
        self.partial = OnceCell::new();
    }

    fn parse(&mut self) {
        let normalized = path::normalize(&self.raw);

        let mut tokens = Vec::new();
        // the token being accumulated: (sigil, buffer), sigil '\0' for text
        let mut current: Option<(char, String)> = None;
        let mut inside = false;

        fn flush(tokens: &mut Vec<Token>, current: &mut Option<(char, String)>) {
            match current.take() {
                Some(('\0', text)) => tokens.push(Token::Text(text)),
                Some((sigil, name)) => tokens.push(classify(sigil, &name)),
                None => {}
            }
        }

        for c in normalized.chars() {
            if inside {
                if c == '>' {
                    flush(&mut tokens, &mut current);
                    inside = false;
                } else if let Some((_, buf)) = current.as_mut() {
                    buf.push(c);
                }
                continue;
            }

            match c {
                '<' => {
                    flush(&mut tokens, &mut current);
                    current = Some(('<', String::new()));
                    inside = true;
                }
                ':' | '#' | '*' => {
                    flush(&mut tokens, &mut current);
                    current = Some((c, String::new()));
                }
                '/' => {
                    flush(&mut tokens, &mut current);
                    tokens.push(Token::Slash);
                }
                _ => match current.as_mut() {
                    Some(('\0', text)) => text.push(c),
                    Some((sigil, name)) if *sigil != '<' && is_word(c) => name.push(c),
                    _ => {
                        flush(&mut tokens, &mut current);
                        current = Some(('\0', c.to_string()));
                    }
                },
            }
        }
        flush(&mut tokens, &mut current);

        self.placeholders = tokens
            .iter()
            .filter_map(Token::placeholder)
            .map(|(name, _)| name.to_owned())
            .collect();

        tokens.reverse();
        self.tokens = tokens;
    }

    fn matcher(&self, endpoint: bool) -> &Matcher {
        let cell = if endpoint { &self.endpoint } else { &self.partial };
        cell.get_or_init(|| self.compile(endpoint))
    }

    fn compile(&self, endpoint: bool) -> Matcher {
        let mut regex = String::new();
        let mut block = String::new();
        let mut optional = true;
        let mut index = self.placeholders.len();

        for token in &self.tokens {
            let (name, ty) = match token {
                Token::Text(text) => {
                    block.insert_str(0, &regex::escape(text));
                    optional = false;
                    continue;
                }
                Token::Slash => {
                    let segment = if optional {
                        format!("(?:/{})?", block)
                    } else {
                        format!("/{}", block)
                    };
                    regex.insert_str(0, &segment);
                    block.clear();
                    optional = true;
                    continue;
                }
                _ => match token.placeholder() {
                    Some(placeholder) => placeholder,
                    None => continue,
                },
            };

            index -= 1;
            let fragment = match ty {
                Some(ty) => self
                    .types
                    .get(ty)
                    .map(Constraint::fragment)
                    .unwrap_or_else(|| NEVER.to_owned()),
                None => match self.constraints.get(name) {
                    Some(constraint) => constraint.fragment(),
                    None => match token {
                        Token::Wildcard { .. } => "(?s:.*)".to_owned(),
                        Token::Relaxed { .. } => "[^/]+".to_owned(),
                        _ => "[^/.]+".to_owned(),
                    },
                },
            };

            let mut part = format!("(?P<__p{}>{})", index, fragment);
            if self.defaults.contains_key(name) {
                part.push('?');
            } else {
                optional = false;
            }
            block.insert_str(0, &part);
        }

        // not rooted with a slash
        regex.insert_str(0, &block);

        if endpoint {
            let ext = match self.constraints.get(EXT) {
                Some(constraint) => {
                    let ext = format!(r"\.(?P<__ext>{})", constraint.fragment());
                    if self.defaults.contains_key(EXT) {
                        format!("(?:{})?", ext)
                    } else {
                        ext
                    }
                }
                None => r"(?:\.(?P<__ext>[^/]+))?".to_owned(),
            };
            regex.push_str(&ext);
        }

        let regex = Regex::new(&format!("^{}", regex)).unwrap_or_else(|err| {
            tracing::warn!(pattern = %self.raw, %err, "pattern does not compile, it will never match");
            Regex::new(NEVER).expect("constant regex")
        });

        let slot = |name: &str| regex.capture_names().position(|n| n == Some(name));
        let slots = (0..self.placeholders.len())
            .map(|i| slot(&format!("__p{}", i)))
            .collect();
        let ext = slot("__ext");

        Matcher { regex, slots, ext }
    }

    /// Matches the beginning of `path`, returning the captures (defaults
    /// included) and the rest of the path.
    pub fn match_partial<'p>(&self, path: &'p str, endpoint: bool) -> Option<PartialMatch<'p>> {
        let matcher = self.matcher(endpoint);
        let caps = matcher.regex.captures(path)?;

        let mut captures = self.defaults.clone();
        for (name, slot) in self.placeholders.iter().zip(&matcher.slots) {
            if let Some(m) = slot.and_then(|i| caps.get(i)) {
                captures.insert(name.as_str(), m.as_str());
            }
        }
        if let Some(m) = matcher.ext.and_then(|i| caps.get(i)) {
            captures.insert(EXT, m.as_str());
        }

        let end = caps.get(0).map_or(0, |m| m.end());
        Some(PartialMatch {
            remainder: &path[end..],
            captures,
        })
    }

    /// Matches the whole of `path`. A single trailing slash is tolerated.
    pub fn matches(&self, path: &str, endpoint: bool) -> Option<Captures> {
        self.match_partial(path, endpoint)
            .filter(|m| path::is_exhausted(m.remainder))
            .map(|m| m.captures)
    }

    /// Renders the pattern back into a path.
    ///
    /// Missing values fall back to defaults. Trailing segments whose values
    /// all equal their defaults are left out:
    /// ```rust
    /// use routeplan::{Captures, Pattern};
    /// use std::iter::FromIterator;
    ///
    /// let mut pattern = Pattern::new("/test/<controller>/:action");
    /// pattern.set_default("action", "index");
    ///
    /// let values = Captures::from_iter(vec![("controller", "widgets")]);
    /// assert_eq!(pattern.render(&values, true), "/test/widgets");
    ///
    /// let values = Captures::from_iter(vec![("controller", "widgets"), ("action", "list")]);
    /// assert_eq!(pattern.render(&values, true), "/test/widgets/list");
    /// ```
    pub fn render(&self, values: &Captures, endpoint: bool) -> String {
        let ext = if endpoint { values.str(EXT) } else { None };

        // placeholders can only be left out without an extension
        let mut optional = ext.is_none();
        let mut parts: Vec<&str> = Vec::with_capacity(self.tokens.len());

        for token in &self.tokens {
            match token {
                Token::Text(text) => {
                    parts.push(text);
                    optional = false;
                }
                Token::Slash => {
                    if !optional {
                        parts.push("/");
                    }
                }
                _ => {
                    let name = match token.placeholder() {
                        Some((name, _)) => name,
                        None => continue,
                    };
                    let default = self.defaults.str(name);
                    let value = values.str(name).or(default).unwrap_or("");

                    if default != Some(value) {
                        optional = false;
                    }
                    if !optional {
                        parts.push(value);
                    }
                }
            }
        }

        parts.reverse();
        let mut rendered = parts.concat();
        if let Some(ext) = ext {
            rendered.push('.');
            rendered.push_str(ext);
        }
        rendered
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn classify(sigil: char, name: &str) -> Token {
    let (sigil, name) = match sigil {
        '<' => match name.chars().next() {
            Some(c @ '#') | Some(c @ '*') | Some(c @ ':') => (c, &name[1..]),
            _ => (':', name),
        },
        _ => (sigil, name),
    };

    let (name, ty) = match name.split_once(':') {
        Some((name, ty)) => (name.to_owned(), Some(ty.to_owned())),
        None => (name.to_owned(), None),
    };

    match sigil {
        '#' => Token::Relaxed { name, ty },
        '*' => Token::Wildcard { name, ty },
        _ => Token::Placeholder { name, ty },
    }
}
