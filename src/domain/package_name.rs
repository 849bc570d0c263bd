//! Package name validation
//!
//! Names reach shell-invoking services, so anything outside the npm name
//! alphabet is rejected before a process is spawned. A leading `-` would
//! be read as a flag by the package manager.

use regex::Regex;
use std::sync::LazyLock;

static PACKAGE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[@a-z0-9._/-]+$").unwrap());

/// Returns true if `name` only contains characters allowed in package names
pub fn is_valid_package_name(name: &str) -> bool {
    !name.starts_with('-') && PACKAGE_NAME_RE.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_and_scoped_names() {
        assert!(is_valid_package_name("lodash"));
        assert!(is_valid_package_name("@scope/pkg-name"));
        assert!(is_valid_package_name("@babel/core"));
        assert!(is_valid_package_name("lodash.merge"));
        assert!(is_valid_package_name("React_DOM"));
    }

    #[test]
    fn test_rejects_shell_metacharacters() {
        assert!(!is_valid_package_name("pkg; rm -rf /"));
        assert!(!is_valid_package_name("pkg && echo"));
        assert!(!is_valid_package_name("$(whoami)"));
        assert!(!is_valid_package_name("pkg`id`"));
        assert!(!is_valid_package_name("pkg|cat"));
        assert!(!is_valid_package_name("pkg\nnext"));
    }

    #[test]
    fn test_rejects_leading_dash() {
        assert!(!is_valid_package_name("-g"));
        assert!(!is_valid_package_name("--prefix=/tmp"));
        assert!(is_valid_package_name("left-pad"));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(!is_valid_package_name(""));
    }
}
