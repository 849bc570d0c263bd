//! Project manifest (package.json) loading
//!
//! Manifest problems are fatal: without a valid manifest there is nothing
//! to reconcile.

mod package_json;

pub use package_json::{Manifest, MANIFEST_FILENAME};
