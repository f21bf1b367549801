use routeplan::{Captures, Constraint, Pattern};
use std::iter::FromIterator;

fn values(pairs: &[(&str, &str)]) -> Captures {
    Captures::from_iter(pairs.iter().copied())
}

macro_rules! match_tests {
    ($($name:ident {
        pattern = $pattern:expr,
        $( $path:literal =>
            $( $(@$none:tt)? None )?
            $( $(@$some:tt)? { $( $key:literal => $val:literal ),* $(,)? } )?
        ),* $(,)?
    }),* $(,)?) => { $(
        #[test]
        fn $name() {
            let pattern = Pattern::new($pattern);

            $(match pattern.matches($path, true) {
                None => {
                    $($( @$some )?
                        panic!("Expected '{}' to match '{}'", $path, $pattern)
                    )?
                }
                Some(captures) => {
                    $($( @$some )?
                        let expected: Vec<(&str, &str)> = vec![$(($key, $val)),*];
                        let got = captures
                            .iter()
                            .map(|(k, v)| (k, v.as_str().unwrap_or_default()))
                            .collect::<Vec<_>>();

                        assert_eq!(got, expected, "Wrong captures for '{}'", $path);
                    )?

                    $($( @$none )?
                        panic!("Unexpected match of '{}' against '{}': {:?}", $path, $pattern, captures)
                    )?
                }
            })*
        }
    )* };
}

match_tests! {
    placeholders {
        pattern = "/foo/:bar/baz",
        "/foo/anything/baz" => { "bar" => "anything" },
        "/foo/anything/baz/" => { "bar" => "anything" },
        "/foo/baz" => None,
        "/foo/a/b/baz" => None,
        "/foo//baz" => None,
    },
    placeholders_exclude_dots {
        pattern = "/user/:name",
        "/user/gordon" => { "name" => "gordon" },
        "/user/gordon.json" => { "name" => "gordon", "ext" => "json" },
        "/user/gordon/profile" => None,
        "/user" => None,
    },
    relaxed {
        pattern = "/user/#name",
        "/user/gordon.json" => { "name" => "gordon.json" },
        "/user/gordon/profile" => None,
    },
    relaxed_in_brackets {
        pattern = "/user/<#name>/edit",
        "/user/a.b/edit" => { "name" => "a.b" },
    },
    wildcard {
        pattern = "/files/*path",
        "/files/a/b/c.txt" => { "path" => "a/b/c.txt" },
        "/files/LICENSE" => { "path" => "LICENSE" },
        "/files/" => { "path" => "" },
        "/files" => None,
    },
    wildcard_in_the_middle {
        pattern = "/src/<*path>/edit",
        "/src/a/b/edit" => { "path" => "a/b" },
        "/src/edit" => None,
    },
    text_around_placeholders {
        pattern = "/v<version>-:id",
        "/v2-abc" => { "version" => "2", "id" => "abc" },
        "/x2-abc" => None,
    },
    static_only {
        pattern = "/about/team",
        "/about/team" => {},
        "/about/team.html" => { "ext" => "html" },
        "/about" => None,
        "/about/teams" => None,
    },
    empty {
        pattern = "/",
        "/" => {},
        "" => {},
        "/foo" => None,
    },
}

#[test]
fn render_round_trip() {
    let pattern = Pattern::new("/foo/:bar/baz/#qux/*rest");

    for path in &["/foo/a/baz/b.c/d/e", "/foo/x-y/baz/z/0", "/foo/1/baz/2/3/4/5"] {
        let captures = pattern.matches(path, false).unwrap();
        assert_eq!(pattern.render(&captures, false), *path);
    }
}

#[test]
fn defaults_make_trailing_segments_optional() {
    let mut pattern = Pattern::new("/test/<controller>/:action");
    pattern.set_default("action", "index");

    let captures = pattern.matches("/test/widgets", true).unwrap();
    assert_eq!(captures.str("controller"), Some("widgets"));
    assert_eq!(captures.str("action"), Some("index"));

    let captures = pattern.matches("/test/widgets/list", true).unwrap();
    assert_eq!(captures.str("action"), Some("list"));

    assert!(pattern.matches("/test", true).is_none());

    assert_eq!(
        pattern.render(&values(&[("controller", "widgets")]), true),
        "/test/widgets"
    );
    assert_eq!(
        pattern.render(&values(&[("controller", "widgets"), ("action", "index")]), true),
        "/test/widgets"
    );
    assert_eq!(
        pattern.render(&values(&[("controller", "widgets"), ("action", "list")]), true),
        "/test/widgets/list"
    );
}

#[test]
fn all_defaults_render_shortest_path() {
    let mut pattern = Pattern::new("/:lang/:page");
    pattern.set_default("lang", "en");
    pattern.set_default("page", "home");

    assert_eq!(pattern.render(&Captures::new(), true), "");
    assert_eq!(pattern.render(&values(&[("page", "faq")]), true), "/en/faq");
    assert_eq!(pattern.render(&values(&[("lang", "de")]), true), "/de");

    let captures = pattern.matches("/", true).unwrap();
    assert_eq!(captures.str("lang"), Some("en"));
    assert_eq!(captures.str("page"), Some("home"));
}

#[test]
fn extension_keeps_optional_segments() {
    let mut pattern = Pattern::new("/foo/:bar");
    pattern.set_default("bar", "x");

    assert_eq!(pattern.render(&Captures::new(), true), "/foo");
    assert_eq!(pattern.render(&values(&[("ext", "json")]), true), "/foo/x.json");
    assert_eq!(
        pattern.render(&values(&[("bar", "y"), ("ext", "json")]), true),
        "/foo/y.json"
    );
    // only endpoints render an extension
    assert_eq!(pattern.render(&values(&[("bar", "y"), ("ext", "json")]), false), "/foo/y");
}

#[test]
fn placeholder_constraints() {
    let mut pattern = Pattern::new("/article/:id/:lang");
    pattern.set_constraint("id", Constraint::regex(r"\d+").unwrap());
    pattern.set_constraint("lang", Constraint::from(vec!["en", "de"]));

    assert!(pattern.matches("/article/12/en", true).is_some());
    assert!(pattern.matches("/article/12/fr", true).is_none());
    assert!(pattern.matches("/article/ab/en", true).is_none());
    assert!(pattern.matches("/article/12/english", true).is_none());
}

#[test]
fn regex_constraints_may_contain_groups() {
    let mut pattern = Pattern::new("/:first/:second");
    pattern.set_constraint("first", Constraint::regex(r"(a|b)(c)").unwrap());

    let captures = pattern.matches("/ac/zzz", true).unwrap();
    assert_eq!(captures.str("first"), Some("ac"));
    assert_eq!(captures.str("second"), Some("zzz"));
}

#[test]
fn extension_constraint() {
    let mut pattern = Pattern::new("/:page");
    pattern.set_constraint("ext", Constraint::from(vec!["html", "json"]));

    let captures = pattern.matches("/index.json", true).unwrap();
    assert_eq!(captures.str("ext"), Some("json"));
    assert!(pattern.matches("/index.xml", true).is_none());
    assert!(pattern.matches("/index", true).is_none());

    pattern.set_default("ext", "html");
    let captures = pattern.matches("/index", true).unwrap();
    assert_eq!(captures.str("ext"), Some("html"));
}

#[test]
fn unknown_type_never_matches() {
    let pattern = Pattern::new("/user/<id:nope>");
    assert!(pattern.matches("/user/1", true).is_none());
    assert!(pattern.matches("/user/1", false).is_none());
}

#[test]
fn partial_matches() {
    let pattern = Pattern::new("/shop/:section");

    let matched = pattern.match_partial("/shop/books/42", false).unwrap();
    assert_eq!(matched.remainder, "/42");
    assert_eq!(matched.captures.str("section"), Some("books"));

    // the same pattern as an endpoint stops at the extension
    let matched = pattern.match_partial("/shop/books.html/42", true).unwrap();
    assert_eq!(matched.remainder, "/42");
    assert_eq!(matched.captures.str("ext"), Some("html"));
}

#[test]
fn endpoint_and_partial_matchers_are_independent() {
    let pattern = Pattern::new("/page/:name");

    assert!(pattern.matches("/page/a.html", false).is_none());
    assert!(pattern.matches("/page/a.html", true).is_some());
    assert!(pattern.matches("/page/a.html", false).is_none());
}
