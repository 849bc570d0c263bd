//! yarn.lock adapter
//!
//! Handles both the classic format:
//!
//! ```text
//! "react@^18.0.0", react@^18.2.0:
//!   version "18.2.0"
//! ```
//!
//! and the Berry format (`"react@npm:^18.0.0, react@npm:^18.2.0":` with
//! `version: 18.2.0`).

use crate::domain::{LockedVersions, PackageManager};
use crate::error::LockfileError;
use crate::lockfile::LockfileAdapter;

const METADATA_BLOCK: &str = "__metadata";

/// Adapter for yarn.lock
pub struct YarnLockAdapter;

impl LockfileAdapter for YarnLockAdapter {
    fn parse(&self, content: &str) -> Result<LockedVersions, LockfileError> {
        let mut versions = LockedVersions::new();
        let mut names: Vec<String> = Vec::new();
        let mut field_indent: Option<usize> = None;

        for (index, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let indent = line.len() - line.trim_start().len();
            if indent == 0 {
                let Some(header) = trimmed.strip_suffix(':') else {
                    return Err(LockfileError::malformed(format!(
                        "line {}: expected a block header, found '{}'",
                        index + 1,
                        trimmed
                    )));
                };
                names = parse_header(header);
                field_indent = None;
                continue;
            }

            // Only the block's own fields count; nested maps sit deeper
            let block_indent = *field_indent.get_or_insert(indent);
            if indent != block_indent || names.is_empty() {
                continue;
            }

            if let Some(version) = parse_version_field(trimmed) {
                for name in &names {
                    versions.insert(name.clone(), version.to_string());
                }
            }
        }

        Ok(versions)
    }

    fn package_manager(&self) -> PackageManager {
        PackageManager::Yarn
    }
}

/// Splits a block header into the distinct package names it covers
fn parse_header(header: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for spec in header.split(',') {
        let spec = spec.trim().trim_matches('"').trim();
        let name = strip_range(spec);
        if name.is_empty() || name == METADATA_BLOCK {
            continue;
        }
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Truncates `name@range` to `name`, keeping a scope's leading `@`
fn strip_range(spec: &str) -> &str {
    let separator = if let Some(scoped) = spec.strip_prefix('@') {
        scoped.find('@').map(|i| i + 1)
    } else {
        spec.find('@')
    };

    match separator {
        Some(i) => &spec[..i],
        None => spec,
    }
}

/// Reads `version "1.2.3"` (classic) or `version: 1.2.3` (Berry)
fn parse_version_field(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("version")?;
    if !rest.starts_with([' ', ':', '"']) {
        return None;
    }

    let value = rest
        .trim_start_matches(':')
        .trim()
        .trim_matches(|c| c == '"' || c == '\'');
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<LockedVersions, LockfileError> {
        YarnLockAdapter.parse(content)
    }

    #[test]
    fn test_parse_classic_lockfile() {
        let content = r#"# THIS IS AN AUTOGENERATED FILE. DO NOT EDIT THIS FILE DIRECTLY.
# yarn lockfile v1


"@babel/core@^7.20.0":
  version "7.20.0"
  resolved "https://registry.yarnpkg.com/@babel/core/-/core-7.20.0.tgz"
  dependencies:
    debug "^4.1.0"

debug@^4.1.0:
  version "4.3.4"
  resolved "https://registry.yarnpkg.com/debug/-/debug-4.3.4.tgz"
"#;

        let versions = parse(content).unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions["@babel/core"], "7.20.0");
        assert_eq!(versions["debug"], "4.3.4");
    }

    #[test]
    fn test_multiple_headers_for_one_name_yield_one_entry() {
        let content = r#"
"react@^18.0.0", react@^18.2.0:
  version "18.2.0"
"#;

        let versions = parse(content).unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions["react"], "18.2.0");
    }

    #[test]
    fn test_block_may_populate_several_names() {
        let content = r#"
string-width@^4.1.0, "string-width-cjs@npm:string-width@^4.2.0":
  version "4.2.3"
"#;

        let versions = parse(content).unwrap();
        assert_eq!(versions["string-width"], "4.2.3");
        assert_eq!(versions["string-width-cjs"], "4.2.3");
    }

    #[test]
    fn test_nested_version_named_dependency_is_ignored() {
        let content = r#"
foo@^1.0.0:
  version "1.0.0"
  dependencies:
    version "^2.0.0"
"#;

        let versions = parse(content).unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions["foo"], "1.0.0");
    }

    #[test]
    fn test_parse_berry_lockfile() {
        let content = r#"# This file is generated by running "yarn install" inside your project.

__metadata:
  version: 6
  cacheKey: 8

"@babel/core@npm:^7.20.0":
  version: 7.20.0
  resolution: "@babel/core@npm:7.20.0"

"react@npm:^18.0.0, react@npm:^18.2.0":
  version: 18.2.0
  resolution: "react@npm:18.2.0"
  dependencies:
    loose-envify: ^1.1.0
"#;

        let versions = parse(content).unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions["@babel/core"], "7.20.0");
        assert_eq!(versions["react"], "18.2.0");
    }

    #[test]
    fn test_block_without_version_is_skipped() {
        let content = "left-pad@^1.0.0:\n  resolved \"https://example.com\"\n";
        assert!(parse(content).unwrap().is_empty());
    }

    #[test]
    fn test_garbage_is_a_parse_failure() {
        let result = parse("this is not a lockfile\n");
        assert!(matches!(result, Err(LockfileError::Malformed { .. })));
    }

    #[test]
    fn test_strip_range() {
        assert_eq!(strip_range("react@^18.0.0"), "react");
        assert_eq!(strip_range("@babel/core@^7.0.0"), "@babel/core");
        assert_eq!(strip_range("@babel/core"), "@babel/core");
        assert_eq!(strip_range("lodash"), "lodash");
        assert_eq!(strip_range("@^1.0.0"), "@^1.0.0");
    }

    #[test]
    fn test_parse_version_field() {
        assert_eq!(parse_version_field("version \"1.2.3\""), Some("1.2.3"));
        assert_eq!(parse_version_field("version: 1.2.3"), Some("1.2.3"));
        assert_eq!(parse_version_field("versions \"1.2.3\""), None);
        assert_eq!(parse_version_field("resolved \"x\""), None);
    }
}
