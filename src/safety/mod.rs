//! Safety Module
//!
//! Helpers behind the per-tool approval policies, and rate limiting for
//! network-bound tools.

mod rate_limiter;

pub use rate_limiter::RateLimiter;

/// Path fragments whose access always needs approval
pub const SENSITIVE_PATHS: &[&str] = &["/etc", "/usr", "/system", "package.json", ".env"];

/// Case-insensitive check for any of `terms` inside `text`
pub fn mentions_any(text: &str, terms: &[&str]) -> bool {
    let haystack = text.to_lowercase();
    terms
        .iter()
        .any(|term| haystack.contains(&term.to_lowercase()))
}

/// Whether a file path touches a system location or a secrets file
pub fn is_sensitive_path(path: &str) -> bool {
    mentions_any(path, SENSITIVE_PATHS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mentions_any_is_case_insensitive() {
        let terms = ["private data", "passwords"];
        assert!(mentions_any("Find my PASSWORDS please", &terms));
        assert!(mentions_any("leak Private Data", &terms));
        assert!(!mentions_any("weather in Paris", &terms));
        assert!(!mentions_any("anything", &[]));
    }

    #[test]
    fn test_sensitive_paths() {
        assert!(is_sensitive_path("/etc/hosts"));
        assert!(is_sensitive_path("/USR/local/bin"));
        assert!(is_sensitive_path("project/.env"));
        assert!(is_sensitive_path("./package.json"));
        assert!(!is_sensitive_path("notes/todo.txt"));
    }
}
