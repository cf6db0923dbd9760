use glob::{MatchOptions, Pattern};

use crate::config::is_namespace;

const MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    // `*` may cross directories: "*.psd" drops sources anywhere in a namespace.
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
struct Entry {
    /// `None` → any namespace.
    namespace: Option<String>,
    raw: String,
    pattern: Pattern,
}

/// Asset paths excluded from the relocation pass.
///
/// Each pattern is `glob` or `namespace:glob`; the glob part is matched against
/// the path relative to the namespace root. An exact path is a valid glob.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    entries: Vec<Entry>,
}

impl Blacklist {
    /// Compile patterns, dropping (with a warning) the ones that do not parse.
    pub fn compile(patterns: &[String]) -> Self {
        let mut entries = Vec::with_capacity(patterns.len());
        for raw in patterns {
            let (namespace, glob) = match raw.split_once(':') {
                Some((ns, rest)) if is_namespace(ns) => (Some(ns.to_string()), rest),
                _ => (None, raw.as_str()),
            };
            match Pattern::new(glob.trim_start_matches('/')) {
                Ok(pattern) => entries.push(Entry {
                    namespace,
                    raw: raw.clone(),
                    pattern,
                }),
                Err(e) => tracing::warn!(pattern = %raw, error = %e, "ignoring invalid blacklist pattern"),
            }
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First pattern excluding `path`, if any. `namespace` is `None` for files
    /// outside the assets tree; only unqualified patterns apply to those.
    pub fn find(&self, namespace: Option<&str>, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| {
                let ns_ok = match (&e.namespace, namespace) {
                    (None, _) => true,
                    (Some(want), Some(have)) => want == have,
                    (Some(_), None) => false,
                };
                ns_ok && (e.pattern.as_str() == path || e.pattern.matches_with(path, MATCH))
            })
            .map(|e| e.raw.as_str())
    }

    pub fn is_blocked(&self, namespace: Option<&str>, path: &str) -> bool {
        self.find(namespace, path).is_some()
    }
}
