//! The glob dialect shared by the ACL Tree and the Subscription Engine
//! (distilled spec §4.1): `*` matches within one segment, `**` matches any
//! number of segments. Built on [`globset`], the same crate the closest
//! prior art in the retrieval pack (a Rust port of the subscription engine)
//! reaches for.

use globset::{GlobBuilder, GlobMatcher};

use crate::path::normalize;

/// A precompiled glob pattern. Implementations MAY precompile patterns once
/// per rule (distilled spec §4.1) — this is that precompiled form.
#[derive(Clone)]
pub struct CompiledGlob {
    matcher: GlobMatcher,
}

impl CompiledGlob {
    /// Compiles `pattern`. Returns `None` on a malformed pattern — matching
    /// against a malformed pattern must never fail loudly, it must just
    /// never match (distilled spec §4.1).
    pub fn compile(pattern: &str) -> Option<Self> {
        let pattern = normalize(pattern);
        // `literal_separator(true)` keeps a single `*` from crossing a `/`
        // boundary — globset's default lets it, which would make `a/*/b`
        // match `a/x/y/b` (distilled spec §4.1).
        let glob = GlobBuilder::new(&pattern)
            .literal_separator(true)
            .build()
            .ok()?;
        Some(CompiledGlob {
            matcher: glob.compile_matcher(),
        })
    }

    pub fn is_match(&self, target: &str) -> bool {
        self.matcher.is_match(normalize(target))
    }
}

/// Convenience one-shot match, for callers that don't need to reuse a
/// compiled pattern (e.g. ad hoc checks, tests). On a malformed pattern,
/// returns `false`.
pub fn glob_match(pattern: &str, target: &str) -> bool {
    match CompiledGlob::compile(pattern) {
        Some(compiled) => compiled.is_match(target),
        None => false,
    }
}

/// Specificity of a pattern, used to break ties between same-effect rules
/// (distilled spec §4.3 step 5): primarily the length of the literal
/// (non-wildcard) prefix, secondarily the number of `**` wildcards (fewer
/// is more specific). Compared with ordinary tuple ordering — larger wins.
///
/// Returns `(literal_prefix_len, wildcard_count)`. Callers comparing two
/// patterns should prefer the larger `literal_prefix_len`, and among ties
/// there, the *smaller* `wildcard_count` (wrap in `Reverse` for `Ord`).
pub fn specificity(pattern: &str) -> (usize, usize) {
    let literal_prefix_len = pattern.find('*').unwrap_or(pattern.len());
    let wildcard_count = pattern
        .split('/')
        .filter(|segment| *segment == "**")
        .count();
    (literal_prefix_len, wildcard_count)
}
