//! Path normalization and datasite splitting (distilled spec §4.1).

use dsite_buildcfg::MAX_PATH_DEPTH;

/// Normalizes a path: backslashes become forward slashes, leading slashes
/// are stripped, and `.`/empty segments are dropped. Segment *case* is left
/// untouched — only datasite-identity comparisons are case-insensitive
/// (distilled spec §4.1 step 3), not the path text itself.
///
/// `normalize(normalize(x)) == normalize(x)` for all `x` (distilled spec §8).
pub fn normalize(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    let unified = path.replace('\\', "/");
    let segments: Vec<&str> = unified
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect();
    segments.join("/")
}

/// Splits a normalized path into its datasite identity (first segment) and
/// the remainder (possibly empty).
pub fn split_datasite(path: &str) -> (&str, &str) {
    match path.split_once('/') {
        Some((datasite, rest)) => (datasite, rest),
        None => (path, ""),
    }
}

/// Splits a normalized, non-empty path into its segments.
pub fn segments(path: &str) -> Vec<&str> {
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').collect()
    }
}

/// Returns an error message if `path`, once normalized, would exceed
/// [`MAX_PATH_DEPTH`] segments. `Ok(())` otherwise.
pub fn check_depth(path: &str) -> Result<(), String> {
    let depth = segments(path).len();
    if depth > MAX_PATH_DEPTH {
        return Err(format!(
            "path depth {depth} exceeds maximum of {MAX_PATH_DEPTH}"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn strips_leading_and_collapses_dots() {
        assert_eq!(normalize("/a/./b//c"), "a/b/c");
        assert_eq!(normalize("a/b/c"), "a/b/c");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn replaces_backslashes() {
        assert_eq!(normalize(r"a\b\c"), "a/b/c");
    }

    #[test]
    fn idempotent() {
        for p in ["/a/./b//c", "", "a/b/c", r"x\y\\z/./"] {
            let once = normalize(p);
            let twice = normalize(&once);
            assert_eq!(once, twice, "not idempotent for {p:?}");
        }
    }

    #[test]
    fn splits_datasite_and_remainder() {
        assert_eq!(
            split_datasite("alice@example.com/public/a.txt"),
            ("alice@example.com", "public/a.txt")
        );
        assert_eq!(split_datasite("alice@example.com"), ("alice@example.com", ""));
        assert_eq!(split_datasite(""), ("", ""));
    }

    #[test]
    fn rejects_excessive_depth() {
        let deep = (0..300).map(|i| i.to_string()).collect::<Vec<_>>().join("/");
        assert!(check_depth(&deep).is_err());
        assert!(check_depth("a/b/c").is_ok());
    }
}
