//! Parameterized document fragments.
//!
//! Templates are plain document trees holding `%placeholder%` tokens. They are
//! loaded once and never change afterwards; [`TemplateLibrary::render`] builds a
//! fresh tree on every call.

use std::collections::HashMap;
use std::path::Path;

use transmute_api::{ConvertError, DocumentCodec, Node, Section};

const BUNDLED: &str = include_str!("../resources/templates.yml");

/// Ordered placeholder → replacement pairs. Applied in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Substitutions {
    pairs: Vec<(String, String)>,
}

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn apply(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (key, value) in &self.pairs {
            if out.contains(key.as_str()) {
                out = out.replace(key.as_str(), value);
            }
        }
        out
    }
}

#[derive(Debug, Default)]
pub struct TemplateLibrary {
    templates: HashMap<String, Node>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Templates shipped inside the binary.
    pub fn bundled(codec: &dyn DocumentCodec) -> Result<Self, ConvertError> {
        let mut library = Self::new();
        library.load_bytes(BUNDLED.as_bytes(), codec)?;
        Ok(library)
    }

    /// Every top-level key of the document becomes one template; existing ids
    /// are replaced.
    pub fn load_bytes(&mut self, bytes: &[u8], codec: &dyn DocumentCodec) -> Result<usize, ConvertError> {
        let doc = codec.decode(bytes)?;
        let count = doc.len();
        for (id, node) in doc {
            self.templates.insert(id, node);
        }
        Ok(count)
    }

    pub fn load_file(&mut self, path: &Path, codec: &dyn DocumentCodec) -> Result<usize, ConvertError> {
        let bytes = std::fs::read(path)
            .map_err(|e| ConvertError::from(e).with_context(path.display()))?;
        self.load_bytes(&bytes, codec)
            .map_err(|e| e.with_context(path.display()))
    }

    pub fn insert(&mut self, id: impl Into<String>, template: Node) {
        self.templates.insert(id.into(), template);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Deep copy of template `id` with every substitution applied to every
    /// string and map key. An unknown id yields an empty map.
    pub fn render(&self, id: &str, subs: &Substitutions) -> Node {
        match self.templates.get(id) {
            Some(template) => substitute(template, subs),
            None => {
                tracing::warn!(template = %id, "unknown template, rendering empty fragment");
                Node::Map(Section::new())
            }
        }
    }
}

fn substitute(node: &Node, subs: &Substitutions) -> Node {
    match node {
        Node::Str(s) => Node::Str(subs.apply(s)),
        Node::Map(section) => Node::Map(
            section
                .iter()
                .map(|(k, v)| (subs.apply(k), substitute(v, subs)))
                .collect(),
        ),
        Node::List(items) => Node::List(items.iter().map(|n| substitute(n, subs)).collect()),
        scalar => scalar.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transmute_format_yaml::YamlCodec;

    fn library() -> TemplateLibrary {
        let mut lib = TemplateLibrary::new();
        lib.load_bytes(
            br#"
t:
  path: "%model%"
  count: 3
  flag: true
  "%key%": value
  mixed:
    - "%model%/a"
    - 7
    - nested: "%texture%"
    - ["%texture%", null]
"#,
            &YamlCodec,
        )
        .unwrap();
        lib
    }

    #[test]
    fn test_render_substitutes_everywhere() {
        let lib = library();
        let out = lib.render(
            "t",
            &Substitutions::new()
                .with("%model%", "ns:item/sword")
                .with("%texture%", "ns:item/sword_tex")
                .with("%key%", "layer0"),
        );
        let section = out.as_section().unwrap();
        assert_eq!(section.str_or("path", ""), "ns:item/sword");
        assert_eq!(section.i64_or("count", 0), 3);
        assert!(section.bool_or("flag", false));
        assert_eq!(section.str_or("layer0", ""), "value");

        let mixed = section.get("mixed").and_then(Node::as_list).unwrap();
        assert_eq!(mixed[0], Node::from("ns:item/sword/a"));
        assert_eq!(mixed[1], Node::Int(7));
        assert_eq!(mixed[2].as_section().unwrap().str_or("nested", ""), "ns:item/sword_tex");
        assert_eq!(mixed[3], Node::List(vec![Node::from("ns:item/sword_tex"), Node::Null]));
    }

    #[test]
    fn test_renders_are_isolated() {
        let lib = library();
        let a = lib.render("t", &Substitutions::new().with("%model%", "a"));
        let b = lib.render("t", &Substitutions::new().with("%model%", "b"));
        assert_eq!(a.as_section().unwrap().str_or("path", ""), "a");
        assert_eq!(b.as_section().unwrap().str_or("path", ""), "b");

        let raw = lib.render("t", &Substitutions::new());
        assert_eq!(raw.as_section().unwrap().str_or("path", ""), "%model%");
    }

    #[test]
    fn test_substitution_order() {
        let mut lib = TemplateLibrary::new();
        lib.insert("o", Node::from("%a%"));
        let out = lib.render("o", &Substitutions::new().with("%a%", "%b%").with("%b%", "done"));
        assert_eq!(out, Node::from("done"));
    }

    #[test]
    fn test_missing_template_is_empty() {
        let lib = library();
        let out = lib.render("nope", &Substitutions::new());
        assert_eq!(out, Node::Map(Section::new()));
    }

    #[test]
    fn test_bundled_templates_load() {
        let lib = TemplateLibrary::bundled(&YamlCodec).unwrap();
        assert!(lib.contains("default:model/generated"));
        assert!(lib.contains("default:model/handheld"));
        assert!(lib.contains("default:model/cube_all"));
    }
}
