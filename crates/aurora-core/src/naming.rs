//! Model file naming

use std::collections::{HashMap, HashSet};

/// Identifier used when a name sanitizes to nothing
pub const PLACEHOLDER_NAME: &str = "Object";

/// Make a name safe for use as a file stem.
///
/// Alphanumerics, `-` and `_` are kept; every other character becomes `_`.
/// Leading and trailing underscores are stripped.
pub fn sanitize_name(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = safe.trim_matches('_');
    if trimmed.is_empty() {
        PLACEHOLDER_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Assigns unique identifiers for one export run.
///
/// The first use of a base name is returned as is, later uses get `_2`,
/// `_3`, ... Results depend on call order. Names are compared ignoring case.
#[derive(Debug, Clone, Default)]
pub struct AssetNamer {
    counts: HashMap<String, usize>,
    issued: HashSet<String>,
}

impl AssetNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sanitize `name` and make it unique within this run
    pub fn assign(&mut self, name: &str) -> String {
        let base = sanitize_name(name);
        let key = base.to_lowercase();

        loop {
            let count = self.counts.entry(key.clone()).or_insert(0);
            *count += 1;
            let candidate = if *count == 1 {
                base.clone()
            } else {
                format!("{}_{}", base, count)
            };

            // An authored name like "Prop_2" may already hold the suffixed form
            if self.issued.insert(candidate.to_lowercase()) {
                return candidate;
            }
        }
    }

    /// Unique file name `<identifier>.<extension>`
    pub fn assign_file(&mut self, name: &str, extension: &str) -> String {
        let id = self.assign(name);
        let extension = extension.trim_start_matches('.');
        if extension.is_empty() {
            id
        } else {
            format!("{}.{}", id, extension)
        }
    }

    /// Number of identifiers issued so far
    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }
}
