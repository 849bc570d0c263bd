//! package-lock.json adapter
//!
//! Reads the nested `dependencies` tree (lockfile v1/v2). Lockfiles that only
//! carry the flat `packages` section (v3) are read from that section instead.

use crate::domain::{LockedVersions, PackageManager};
use crate::error::LockfileError;
use crate::lockfile::LockfileAdapter;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Hard bound on nesting depth of the dependency tree
pub const MAX_DEPTH: usize = 100;

/// Bound on JSON nesting accepted by the parser.
///
/// Each tree level costs two JSON levels, so this stays well above
/// `MAX_DEPTH` while keeping the recursive deserializer off the stack limit.
const MAX_JSON_NESTING: usize = 1024;

/// Separates names in visited-set keys; cannot occur in a package name
const PATH_SEPARATOR: char = '\0';

const NODE_MODULES: &str = "node_modules/";

/// Adapter for npm's package-lock.json
pub struct NpmLockAdapter;

/// One node of the nested dependency tree
struct LockNode<'a> {
    name: &'a str,
    version: Option<&'a str>,
    children: Option<&'a Map<String, Value>>,
}

impl<'a> LockNode<'a> {
    /// Reads a node, tolerating missing or mistyped fields
    fn from_value(name: &'a str, value: &'a Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(Self {
            name,
            version: object.get("version").and_then(Value::as_str),
            children: object.get("dependencies").and_then(Value::as_object),
        })
    }
}

/// Stack frame for the iterative traversal
struct Frame<'a> {
    path: String,
    name: &'a str,
    value: &'a Value,
    depth: usize,
}

impl LockfileAdapter for NpmLockAdapter {
    fn parse(&self, content: &str) -> Result<LockedVersions, LockfileError> {
        let json = parse_json(content)?;

        let root = json
            .as_object()
            .ok_or_else(|| LockfileError::malformed("package-lock.json is not an object"))?;

        let mut versions = LockedVersions::new();
        if let Some(tree) = root.get("dependencies").and_then(Value::as_object) {
            flatten_tree(tree, MAX_DEPTH, &mut versions);
        } else if let Some(packages) = root.get("packages").and_then(Value::as_object) {
            flatten_packages(packages, &mut versions);
        }

        Ok(versions)
    }

    fn package_manager(&self) -> PackageManager {
        PackageManager::Npm
    }
}

/// Parses the document without serde_json's default recursion limit,
/// which would reject trees far shallower than `MAX_DEPTH`.
fn parse_json(content: &str) -> Result<Value, LockfileError> {
    if json_nesting(content) > MAX_JSON_NESTING {
        return Err(LockfileError::malformed(format!(
            "JSON nested deeper than {} levels",
            MAX_JSON_NESTING
        )));
    }

    let to_error = |e: serde_json::Error| LockfileError::JsonParseError {
        message: e.to_string(),
    };
    let mut deserializer = serde_json::Deserializer::from_str(content);
    deserializer.disable_recursion_limit();
    let json = Value::deserialize(&mut deserializer).map_err(to_error)?;
    deserializer.end().map_err(to_error)?;
    Ok(json)
}

/// Maximum bracket nesting outside string literals
fn json_nesting(content: &str) -> usize {
    let mut depth = 0usize;
    let mut max = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for byte in content.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                max = max.max(depth);
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    max
}

/// Depth-first walk of the nested tree.
///
/// Uses an explicit stack, a visited set keyed by the accumulated path and a
/// depth cap. Every node with a version writes `name -> version`; the last
/// node visited for a name wins.
fn flatten_tree(tree: &Map<String, Value>, max_depth: usize, output: &mut LockedVersions) {
    let mut visited: HashSet<String> = HashSet::new();
    let mut stack: Vec<Frame<'_>> = Vec::new();
    push_children(&mut stack, "", tree, 0);

    while let Some(frame) = stack.pop() {
        if frame.depth >= max_depth || !visited.insert(frame.path.clone()) {
            continue;
        }

        let Some(node) = LockNode::from_value(frame.name, frame.value) else {
            continue;
        };

        if let Some(version) = node.version {
            output.insert(node.name.to_string(), version.to_string());
        }

        if let Some(children) = node.children {
            push_children(&mut stack, &frame.path, children, frame.depth + 1);
        }
    }
}

/// Pushes children in reverse so they pop in document (sorted key) order
fn push_children<'a>(
    stack: &mut Vec<Frame<'a>>,
    parent: &str,
    children: &'a Map<String, Value>,
    depth: usize,
) {
    for (name, value) in children.iter().rev() {
        stack.push(Frame {
            path: format!("{}{}{}", parent, PATH_SEPARATOR, name),
            name,
            value,
            depth,
        });
    }
}

/// Reads the flat `packages` section keyed by install path.
///
/// Deeper installs are written first so the top-level install wins.
fn flatten_packages(packages: &Map<String, Value>, output: &mut LockedVersions) {
    let mut entries: Vec<(usize, &str, &str)> = packages
        .iter()
        .filter_map(|(path, value)| {
            let start = path.rfind(NODE_MODULES)? + NODE_MODULES.len();
            let name = &path[start..];
            let version = value.get("version").and_then(Value::as_str)?;
            if name.is_empty() {
                return None;
            }
            Some((path.matches(NODE_MODULES).count(), name, version))
        })
        .collect();

    entries.sort_by(|a, b| b.0.cmp(&a.0));

    for (_, name, version) in entries {
        output.insert(name.to_string(), version.to_string());
    }
}
