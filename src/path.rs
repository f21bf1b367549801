/// Normalizes a route pattern before it is tokenized.
///
/// The following rules are applied:
///  1. Replace multiple slashes with a single slash.
///  2. Make sure the path begins with a slash, unless it is empty.
///  3. Strip one trailing slash, so `/` itself becomes the empty pattern.
///
/// ```ignore
///  normalize("//foo///bar/") == "/foo/bar"
///  normalize("foo")          == "/foo"
///  normalize("/")            == ""
/// ```
pub fn normalize(raw: &str) -> String {
    let mut buf = String::with_capacity(raw.len() + 1);

    for segment in raw.split('/').filter(|s| !s.is_empty()) {
        buf.push('/');
        buf.push_str(segment);
    }

    buf
}

/// Returns true if `remainder` is all that is left after a complete match.
pub fn is_exhausted(remainder: &str) -> bool {
    remainder.is_empty() || remainder == "/"
}

#[cfg(test)]
mod tests {
    use super::*;

    // path, result
    fn normalize_tests() -> Vec<(&'static str, &'static str)> {
        vec![
            // Already clean
            ("", ""),
            ("/abc", "/abc"),
            ("/a/b/c", "/a/b/c"),
            // Trailing slash
            ("/", ""),
            ("/abc/", "/abc"),
            ("/a/b/c/", "/a/b/c"),
            // Missing root
            ("a/", "/a"),
            ("abc", "/abc"),
            ("abc/def", "/abc/def"),
            // Remove doubled slash
            ("//", ""),
            ("/abc//", "/abc"),
            ("/abc//def//ghi", "/abc/def/ghi"),
            ("//abc", "/abc"),
            ("///abc", "/abc"),
            // Placeholders survive untouched
            ("/:foo//<bar:num>/", "/:foo/<bar:num>"),
            ("*path", "/*path"),
        ]
    }

    #[test]
    fn test_normalize() {
        for (raw, expected) in normalize_tests() {
            assert_eq!(normalize(raw), expected, "normalize({:?})", raw);
        }
    }

    #[test]
    fn test_is_exhausted() {
        assert!(is_exhausted(""));
        assert!(is_exhausted("/"));
        assert!(!is_exhausted("//"));
        assert!(!is_exhausted("/foo"));
    }
}
