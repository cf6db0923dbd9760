//! Namespaced asset path relocation.
//!
//! Rules are grouped by source namespace and kept in registration order.
//! A pattern is either a literal path (matching itself and everything below it)
//! or contains `*` markers, each matching any substring including `/`.

use std::collections::HashMap;

use crate::config::AssetRuleConfig;

pub const WILDCARD: char = '*';

/// Result of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub namespace: String,
    pub path: String,
}

#[derive(Debug, Clone)]
enum Pattern {
    Literal(String),
    /// Literal text between markers; `markers + 1` parts.
    Wildcard(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct ConversionRule {
    source_pattern: String,
    target_namespace: String,
    target_template: String,
    /// Pattern length without markers; longer wins.
    literal_len: usize,
    pattern: Pattern,
}

enum Matched<'p> {
    Exact,
    Below(&'p str),
    Captures(Vec<(usize, usize)>),
}

impl ConversionRule {
    fn new(source_pattern: &str, target_namespace: &str, target_template: &str) -> Self {
        let trimmed = source_pattern.trim_matches('/');
        let pattern = if trimmed.contains(WILDCARD) {
            Pattern::Wildcard(trimmed.split(WILDCARD).map(str::to_string).collect())
        } else {
            Pattern::Literal(trimmed.to_string())
        };
        Self {
            source_pattern: trimmed.to_string(),
            target_namespace: target_namespace.to_string(),
            target_template: target_template.trim_matches('/').to_string(),
            literal_len: trimmed.chars().filter(|c| *c != WILDCARD).count(),
            pattern,
        }
    }

    pub fn source_pattern(&self) -> &str {
        &self.source_pattern
    }

    fn matches<'p>(&self, path: &'p str) -> Option<Matched<'p>> {
        match &self.pattern {
            Pattern::Literal(literal) => {
                if path == literal {
                    Some(Matched::Exact)
                } else {
                    path.strip_prefix(literal.as_str())
                        .and_then(|rest| rest.strip_prefix('/'))
                        .map(Matched::Below)
                }
            }
            Pattern::Wildcard(parts) => match_wildcard(path, parts).map(Matched::Captures),
        }
    }

    fn build(&self, path: &str, matched: Matched<'_>) -> Relocation {
        let target = match matched {
            Matched::Exact => self.target_template.clone(),
            Matched::Below(rest) => join(&self.target_template, rest),
            Matched::Captures(captures) => {
                if self.target_template.contains(WILDCARD) {
                    let mut values = captures.iter().map(|&(s, e)| &path[s..e]);
                    let mut out = String::with_capacity(self.target_template.len() + path.len());
                    for c in self.target_template.chars() {
                        if c == WILDCARD {
                            out.push_str(values.next().unwrap_or(""));
                        } else {
                            out.push(c);
                        }
                    }
                    out
                } else {
                    // Several markers: the span from the first capture to the last.
                    let start = captures.first().map(|&(s, _)| s).unwrap_or(path.len());
                    let end = captures.last().map(|&(_, e)| e).unwrap_or(path.len());
                    join(&self.target_template, &path[start..end])
                }
            }
        };
        Relocation {
            namespace: self.target_namespace.clone(),
            path: target,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PathRemapper {
    rules: HashMap<String, Vec<ConversionRule>>,
}

impl PathRemapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rules(rules: &[AssetRuleConfig]) -> Self {
        let mut remapper = Self::new();
        for rule in rules {
            remapper.register(
                &rule.source_namespace,
                &rule.source_path,
                &rule.target_namespace,
                &rule.target_path,
            );
        }
        remapper
    }

    pub fn register(
        &mut self,
        source_namespace: &str,
        source_pattern: &str,
        target_namespace: &str,
        target_template: &str,
    ) {
        self.rules
            .entry(source_namespace.to_string())
            .or_default()
            .push(ConversionRule::new(source_pattern, target_namespace, target_template));
    }

    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Best rule for `path`: longest literal text, then earliest registered.
    pub fn resolve(&self, source_namespace: &str, path: &str) -> Option<Relocation> {
        let rules = self.rules.get(source_namespace)?;
        let mut best: Option<(&ConversionRule, Matched<'_>)> = None;
        for rule in rules {
            let Some(matched) = rule.matches(path) else { continue };
            // Strictly longer only: ties keep the earlier rule.
            if best.as_ref().is_none_or(|(b, _)| rule.literal_len > b.literal_len) {
                best = Some((rule, matched));
            }
        }
        best.map(|(rule, matched)| rule.build(path, matched))
    }

    /// [`PathRemapper::resolve`], falling back to the unchanged location.
    pub fn relocate(&self, source_namespace: &str, path: &str) -> Relocation {
        self.resolve(source_namespace, path).unwrap_or_else(|| Relocation {
            namespace: source_namespace.to_string(),
            path: path.to_string(),
        })
    }
}

fn join(base: &str, rest: &str) -> String {
    let rest = rest.trim_start_matches('/');
    match (base.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!("{}/{rest}", base.trim_end_matches('/')),
    }
}

/// Whole-path match; each marker takes the longest span that still lets the
/// rest of the pattern match. Returns `(start, end)` byte spans per marker.
fn match_wildcard(path: &str, parts: &[String]) -> Option<Vec<(usize, usize)>> {
    let (head, rest) = parts.split_first()?;
    if !path.starts_with(head.as_str()) {
        return None;
    }
    let mut captures = Vec::with_capacity(rest.len());
    capture_from(path, head.len(), rest, &mut captures).then_some(captures)
}

fn capture_from(path: &str, pos: usize, rest: &[String], captures: &mut Vec<(usize, usize)>) -> bool {
    let Some((literal, tail)) = rest.split_first() else {
        return pos == path.len();
    };

    if tail.is_empty() {
        if path.len() >= pos + literal.len() && path.ends_with(literal.as_str()) {
            captures.push((pos, path.len() - literal.len()));
            return true;
        }
        return false;
    }

    let hay = &path[pos..];
    let starts: Vec<usize> = hay
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(hay.len()))
        .filter(|&i| hay[i..].starts_with(literal.as_str()))
        .collect();

    for &start in starts.iter().rev() {
        captures.push((pos, pos + start));
        if capture_from(path, pos + start + literal.len(), tail, captures) {
            return true;
        }
        captures.pop();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reloc(ns: &str, path: &str) -> Relocation {
        Relocation {
            namespace: ns.into(),
            path: path.into(),
        }
    }

    #[test]
    fn test_longest_literal_wins() {
        let mut r = PathRemapper::new();
        r.register("ns", "a/*", "t", "x");
        r.register("ns", "a/b/*", "t", "y");
        assert_eq!(r.resolve("ns", "a/b/c"), Some(reloc("t", "y/c")));
        assert_eq!(r.resolve("ns", "a/z"), Some(reloc("t", "x/z")));
    }

    #[test]
    fn test_registration_order_breaks_ties() {
        let mut r = PathRemapper::new();
        r.register("ns", "a/*", "first", "one");
        r.register("ns", "*/b", "second", "two");
        assert_eq!(r.resolve("ns", "a/b").unwrap().namespace, "first");
    }

    #[test]
    fn test_literal_exact_and_subtree() {
        let mut r = PathRemapper::new();
        r.register("pack", "textures/furniture", "converted", "textures/item/furniture");
        assert_eq!(
            r.resolve("pack", "textures/furniture"),
            Some(reloc("converted", "textures/item/furniture"))
        );
        assert_eq!(
            r.resolve("pack", "textures/furniture/chairs/oak.png"),
            Some(reloc("converted", "textures/item/furniture/chairs/oak.png"))
        );
        assert_eq!(r.resolve("pack", "textures/furniture_extra.png"), None);
    }

    #[test]
    fn test_namespaces_are_independent() {
        let mut r = PathRemapper::new();
        r.register("a", "models", "b", "models");
        assert!(r.resolve("other", "models/x.json").is_none());
        assert_eq!(r.relocate("other", "models/x.json"), reloc("other", "models/x.json"));
    }

    #[test]
    fn test_capture_placeholder() {
        let mut r = PathRemapper::new();
        r.register("ns", "textures/*.png", "out", "textures/item/*.png");
        assert_eq!(
            r.resolve("ns", "textures/gems/ruby.png"),
            Some(reloc("out", "textures/item/gems/ruby.png"))
        );
        assert_eq!(r.resolve("ns", "textures/gems/ruby.json"), None);
    }

    #[test]
    fn test_wildcard_is_greedy() {
        let mut r = PathRemapper::new();
        r.register("ns", "*/*", "out", "*|*");
        assert_eq!(r.resolve("ns", "a/b/c").unwrap().path, "a/b|c");
    }

    #[test]
    fn test_wildcard_must_cover_whole_path() {
        let mut r = PathRemapper::new();
        r.register("ns", "sounds/*/loop", "out", "s");
        assert!(r.resolve("ns", "sounds/a/loop/extra").is_none());
        assert_eq!(r.resolve("ns", "sounds/a/b/loop").unwrap().path, "s/a/b");
    }

    #[test]
    fn test_empty_template_keeps_remainder() {
        let mut r = PathRemapper::new();
        r.register("ns", "legacy", "modern", "");
        assert_eq!(r.resolve("ns", "legacy/a.png"), Some(reloc("modern", "a.png")));
    }

    #[test]
    fn test_resolution_does_not_mutate() {
        let mut r = PathRemapper::new();
        r.register("ns", "a/*", "t", "x");
        let first = r.resolve("ns", "a/q");
        let second = r.resolve("ns", "a/q");
        assert_eq!(first, second);
        assert_eq!(r.len(), 1);
    }
}
