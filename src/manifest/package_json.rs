//! package.json reader
//!
//! Handles:
//! - name (required)
//! - dependencies
//! - devDependencies
//! - optionalDependencies
//! - peerDependencies

use crate::domain::{DependencyClass, ManifestDependency};
use crate::error::ManifestError;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Manifest filename looked up in the project root
pub const MANIFEST_FILENAME: &str = "package.json";

/// The parts of package.json the auditor cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Path the manifest was read from
    pub path: PathBuf,
    /// Package name
    pub name: String,
    /// Package version, if declared
    pub version: Option<String>,
    /// Declarations across all four classes, in class order
    pub dependencies: Vec<ManifestDependency>,
}

impl Manifest {
    /// Parse manifest content.
    ///
    /// Non-string range values are skipped with a warning; a missing or
    /// empty `name` is an error.
    pub fn parse(
        content: &str,
        path: &Path,
        warnings: &mut Vec<String>,
    ) -> Result<Self, ManifestError> {
        let json: Value = serde_json::from_str(content)
            .map_err(|e| ManifestError::json_parse_error(path, e.to_string()))?;

        let object = json.as_object().ok_or_else(|| ManifestError::NotAnObject {
            path: path.to_path_buf(),
        })?;

        let name = object
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ManifestError::MissingName {
                path: path.to_path_buf(),
            })?
            .to_string();

        let version = object
            .get("version")
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut dependencies = Vec::new();
        for class in DependencyClass::all() {
            match object.get(class.manifest_key()) {
                None | Some(Value::Null) => {}
                Some(Value::Object(deps)) => {
                    parse_dependency_object(deps, *class, &mut dependencies, warnings)
                }
                Some(_) => warnings.push(format!(
                    "ignoring \"{}\" in {}: expected an object",
                    class.manifest_key(),
                    path.display()
                )),
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            name,
            version,
            dependencies,
        })
    }

    /// Read and parse `package.json` from a project directory
    pub fn read(dir: &Path, warnings: &mut Vec<String>) -> Result<Self, ManifestError> {
        let path = dir.join(MANIFEST_FILENAME);
        if !path.is_file() {
            return Err(ManifestError::not_found(path));
        }

        let content =
            std::fs::read_to_string(&path).map_err(|e| ManifestError::read_error(&path, e))?;
        Self::parse(&content, &path, warnings)
    }
}

fn parse_dependency_object(
    deps: &Map<String, Value>,
    class: DependencyClass,
    output: &mut Vec<ManifestDependency>,
    warnings: &mut Vec<String>,
) {
    for (name, range_value) in deps {
        match range_value.as_str() {
            Some(range) => output.push(ManifestDependency::new(name.clone(), range.trim(), class)),
            None => warnings.push(format!(
                "ignoring {} in {}: range is not a string",
                name,
                class.manifest_key()
            )),
        }
    }
}
