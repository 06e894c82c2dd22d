//! Process environment for the validator and the launched server
//!
//! The manifest's `[env]` table is applied to both the configuration
//! validator and the final exec'd server, so the validator observes exactly
//! the environment the server will run under.

use std::collections::BTreeMap;

/// An ordered map of environment variables.
///
/// `BTreeMap` keeps iteration deterministic, which keeps logs and tests
/// stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Create an empty environment
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an environment from an existing map
    #[must_use]
    pub fn from_map(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }

    /// Get a variable's value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Set a variable
    pub fn set(&mut self, key: String, value: String) {
        self.vars.insert(key, value);
    }

    /// Whether a variable is present
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Number of variables
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether the environment holds no variables
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate over variables in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.vars.iter()
    }

    /// Merge with the current process environment.
    ///
    /// Manifest values win over inherited process values, so a container
    /// cannot accidentally shadow the configuration reference the manifest
    /// establishes.
    #[must_use]
    pub fn merge_with_system(&self) -> BTreeMap<String, String> {
        let mut merged: BTreeMap<String, String> = std::env::vars().collect();
        for (key, value) in &self.vars {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}

impl FromIterator<(String, String)> for Environment {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}
