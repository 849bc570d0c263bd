//! depaudit - Dependency auditor library for JavaScript projects
//!
//! This library provides the core functionality for auditing the
//! dependencies of a package.json project:
//! - Package manager detection (npm, yarn, pnpm)
//! - Lockfile parsing (nested npm tree, flat yarn text, flat pnpm YAML)
//! - Reconciliation of declared ranges against locked versions
//! - Reports built on registry and package manager data

pub mod cli;
pub mod commands;
pub mod detector;
pub mod domain;
pub mod error;
pub mod lockfile;
pub mod lookup;
pub mod manifest;
pub mod output;
pub mod progress;
pub mod project;
pub mod reconcile;
pub mod service;
