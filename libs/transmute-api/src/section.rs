use crate::node::{Node, Shape};

/// Insertion-ordered map of string keys to nodes.
///
/// Backs both source documents (read through the typed `*_or` accessors, which
/// never fail) and target documents (written through [`Section::section_mut`]
/// and [`Section::set`], which create intermediate sections on demand).
///
/// Paths are dotted: `"Components.food.nutrition"`. A key that itself contains
/// a dot can only be reached through [`Section::get`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    entries: Vec<(String, Node)>,
}

impl Section {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Direct child lookup, no path splitting.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Set a direct child. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Node>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    // ── Reads ──

    pub fn lookup(&self, path: &str) -> Option<&Node> {
        let mut current = self;
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            let node = current.get(segment)?;
            if segments.peek().is_none() {
                return Some(node);
            }
            current = node.as_section()?;
        }
        None
    }

    pub fn shape(&self, path: &str) -> Shape<'_> {
        match self.lookup(path) {
            Some(node) => node.shape(),
            None => Shape::Absent,
        }
    }

    pub fn section(&self, path: &str) -> Option<&Section> {
        self.lookup(path).and_then(Node::as_section)
    }

    pub fn str_or<'a>(&'a self, path: &str, default: &'a str) -> &'a str {
        self.lookup(path).and_then(Node::as_str).unwrap_or(default)
    }

    /// Like [`Section::str_or`] but accepts any scalar (`custom_model_data: 1001`).
    pub fn string_or(&self, path: &str, default: &str) -> String {
        self.lookup(path)
            .and_then(Node::scalar_string)
            .unwrap_or_else(|| default.to_string())
    }

    pub fn i64_or(&self, path: &str, default: i64) -> i64 {
        self.lookup(path).and_then(Node::as_i64).unwrap_or(default)
    }

    pub fn f64_or(&self, path: &str, default: f64) -> f64 {
        self.lookup(path).and_then(Node::as_f64).unwrap_or(default)
    }

    pub fn bool_or(&self, path: &str, default: bool) -> bool {
        self.lookup(path).and_then(Node::as_bool).unwrap_or(default)
    }

    /// A single scalar becomes a one-element list; maps and absence are empty.
    pub fn string_list(&self, path: &str) -> Vec<String> {
        match self.shape(path) {
            Shape::Scalar(node) => node.scalar_string().into_iter().collect(),
            Shape::Sequence(items) => items.iter().filter_map(Node::scalar_string).collect(),
            Shape::Mapping(_) | Shape::Absent => Vec::new(),
        }
    }

    // ── Writes ──

    /// Get-or-create the section at `path`. Calling it twice yields the same
    /// section; an existing section is never replaced. A scalar sitting on the
    /// path is replaced by an empty section.
    pub fn section_mut(&mut self, path: &str) -> &mut Section {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let child = self.child_section_mut(head);
        match rest {
            Some(rest) => child.section_mut(rest),
            None => child,
        }
    }

    /// Write `value` at `path`, creating parents.
    pub fn set(&mut self, path: &str, value: impl Into<Node>) {
        match path.rsplit_once('.') {
            Some((parent, key)) => self.section_mut(parent).insert(key, value),
            None => self.insert(path, value),
        }
    }

    /// Write only when `value` differs from the schema default.
    pub fn set_unless<T>(&mut self, path: &str, value: T, default: T)
    where
        T: PartialEq + Into<Node>,
    {
        if value != default {
            self.set(path, value);
        }
    }

    fn child_section_mut(&mut self, key: &str) -> &mut Section {
        let idx = match self.entries.iter().position(|(k, _)| k == key) {
            Some(idx) => idx,
            None => {
                self.entries.push((key.to_string(), Node::Map(Section::new())));
                self.entries.len() - 1
            }
        };
        let slot = &mut self.entries[idx].1;
        if !matches!(slot, Node::Map(_)) {
            *slot = Node::Map(Section::new());
        }
        let Node::Map(section) = slot else {
            unreachable!("slot holds a map after replacement");
        };
        section
    }
}

impl FromIterator<(String, Node)> for Section {
    fn from_iter<I: IntoIterator<Item = (String, Node)>>(iter: I) -> Self {
        let mut section = Section::new();
        for (k, v) in iter {
            section.insert(k, v);
        }
        section
    }
}

impl IntoIterator for Section {
    type Item = (String, Node);
    type IntoIter = std::vec::IntoIter<(String, Node)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Section {
        let mut food = Section::new();
        food.insert("nutrition", 4);
        food.insert("saturation", 1.5);
        let mut components = Section::new();
        components.insert("food", food);
        let mut root = Section::new();
        root.insert("material", "APPLE");
        root.insert("Components", components);
        root.insert("lore", "single line");
        root
    }

    #[test]
    fn test_dotted_reads() {
        let s = sample();
        assert_eq!(s.i64_or("Components.food.nutrition", 0), 4);
        assert_eq!(s.f64_or("Components.food.saturation", 0.0), 1.5);
        assert_eq!(s.str_or("material", "paper"), "APPLE");
    }

    #[test]
    fn test_defaults_on_absence_and_mismatch() {
        let s = sample();
        assert_eq!(s.i64_or("Components.food.missing", 9), 9);
        assert_eq!(s.i64_or("material", 9), 9);
        assert_eq!(s.str_or("material.deeper", "x"), "x");
        assert!(!s.bool_or("nope", false));
    }

    #[test]
    fn test_string_list_accepts_scalar() {
        let s = sample();
        assert_eq!(s.string_list("lore"), vec!["single line".to_string()]);
        assert!(s.string_list("Components").is_empty());
        assert!(s.string_list("missing").is_empty());
    }

    #[test]
    fn test_section_mut_is_idempotent() {
        let mut t = Section::new();
        t.section_mut("data.components").insert("a", 1);
        t.section_mut("data.components").insert("b", 2);
        let components = t.section("data.components").unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_set_preserves_insertion_order() {
        let mut t = Section::new();
        t.set("material", "paper");
        t.set("data.item-name", "x");
        t.set("material", "stone");
        let keys: Vec<&str> = t.keys().collect();
        assert_eq!(keys, vec!["material", "data"]);
        assert_eq!(t.str_or("material", ""), "stone");
    }

    #[test]
    fn test_set_unless_default() {
        let mut t = Section::new();
        t.set_unless("a", 64, 64);
        t.set_unless("b", 16, 64);
        assert!(t.lookup("a").is_none());
        assert_eq!(t.i64_or("b", 0), 16);
    }
}
