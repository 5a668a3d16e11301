//! # URL Canonicalizer
//!
//! Collapses the clone-URL forms seen across provider payloads (`https://`,
//! `git://`, `ssh://`, `git@host:org/repo`, trailing `.git`, trailing `/`,
//! `raw.githubusercontent.com`) down to a single `host/org/repo` form so that
//! projects can be looked up regardless of which form a webhook happened to
//! carry.

/// Canonicalize a clone URL to `host/org/repo` form.
///
/// Idempotent: `canonicalize(canonicalize(u)) == canonicalize(u)` for every
/// input `u`. Empty input returns empty.
///
/// # Examples
///
/// ```rust
/// use reactorcide_core::url_canon::canonicalize;
///
/// assert_eq!(canonicalize("https://github.com/org/repo.git"), "github.com/org/repo");
/// assert_eq!(canonicalize("git@github.com:org/repo.git"), "github.com/org/repo");
/// assert_eq!(
///     canonicalize("https://raw.githubusercontent.com/org/repo/"),
///     "github.com/org/repo"
/// );
/// ```
pub fn canonicalize(s: &str) -> String {
    let mut rest = s.trim().to_string();
    if rest.is_empty() {
        return rest;
    }

    for prefix in ["https://", "http://", "git://", "ssh://"] {
        if let Some(stripped) = rest.strip_prefix(prefix) {
            rest = stripped.to_string();
            break;
        }
    }

    if let Some(stripped) = rest.strip_prefix("git@") {
        rest = stripped.to_string();
        if let Some(idx) = rest.find(':') {
            rest.replace_range(idx..=idx, "/");
        }
    }

    if let Some(stripped) = rest.strip_suffix(".git") {
        rest = stripped.to_string();
    }

    rest = rest.replace("raw.githubusercontent.com", "github.com");

    while rest.ends_with('/') {
        rest.pop();
    }

    rest
}

/// Compare two clone-URL strings after canonicalizing both sides.
///
/// # Examples
///
/// ```rust
/// use reactorcide_core::url_canon::matches;
///
/// assert!(matches("git@github.com:org/repo.git", "https://github.com/org/repo"));
/// assert!(!matches("https://github.com/org/repo", "https://github.com/org/other"));
/// ```
pub fn matches(a: &str, b: &str) -> bool {
    canonicalize(a) == canonicalize(b)
}

#[cfg(test)]
#[path = "url_canon_tests.rs"]
mod tests;
