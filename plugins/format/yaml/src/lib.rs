use serde_yaml::{Mapping, Number, Value};
use transmute_api::{ConvertError, DocumentCodec, Node, Section};

/// YAML documents. Mapping order is preserved in both directions.
pub struct YamlCodec;

impl DocumentCodec for YamlCodec {
    fn extensions(&self) -> &[&str] {
        &["yml", "yaml"]
    }

    fn decode(&self, bytes: &[u8]) -> Result<Section, ConvertError> {
        let s = std::str::from_utf8(bytes)?;
        if s.trim().is_empty() {
            return Ok(Section::new());
        }
        let value: Value =
            serde_yaml::from_str(s).map_err(|e| ConvertError::format(format!("yaml decode: {e}")))?;
        match from_yaml(value) {
            Node::Map(section) => Ok(section),
            Node::Null => Ok(Section::new()),
            _ => Err(ConvertError::format("yaml decode: document root is not a mapping")),
        }
    }

    fn encode(&self, doc: &Section) -> Result<Vec<u8>, ConvertError> {
        let value = to_yaml(&Node::Map(doc.clone()));
        serde_yaml::to_string(&value)
            .map(String::into_bytes)
            .map_err(|e| ConvertError::format(format!("yaml encode: {e}")))
    }
}

// ---- Value ↔ Node ----

fn from_yaml(value: Value) -> Node {
    match value {
        Value::Null => Node::Null,
        Value::Bool(b) => Node::Bool(b),
        Value::Number(n) => from_number(&n),
        Value::String(s) => Node::Str(s),
        Value::Sequence(items) => Node::List(items.into_iter().map(from_yaml).collect()),
        Value::Mapping(map) => {
            let mut section = Section::new();
            for (k, v) in map {
                // Non-scalar keys have no dotted-path form.
                let Some(key) = key_string(&k) else { continue };
                section.insert(key, from_yaml(v));
            }
            Node::Map(section)
        }
        Value::Tagged(tagged) => {
            let tagged = *tagged;
            from_yaml(tagged.value)
        }
    }
}

fn from_number(n: &Number) -> Node {
    if let Some(i) = n.as_i64() {
        Node::Int(i)
    } else if let Some(f) = n.as_f64() {
        Node::Float(f)
    } else {
        Node::Null
    }
}

fn key_string(k: &Value) -> Option<String> {
    match k {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn to_yaml(node: &Node) -> Value {
    match node {
        Node::Null => Value::Null,
        Node::Bool(b) => Value::Bool(*b),
        Node::Int(i) => Value::Number(Number::from(*i)),
        Node::Float(f) => Value::Number(Number::from(*f)),
        Node::Str(s) => Value::String(s.clone()),
        Node::List(items) => Value::Sequence(items.iter().map(to_yaml).collect()),
        Node::Map(section) => {
            let mut map = Mapping::new();
            for (k, v) in section.iter() {
                map.insert(Value::String(k.to_string()), to_yaml(v));
            }
            Value::Mapping(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_keeps_order_and_types() {
        let doc = YamlCodec
            .decode(b"zeta: 1\nalpha: 2.5\nmid: [a, 3, {k: v}]\n7: seven\n")
            .unwrap();
        let keys: Vec<&str> = doc.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid", "7"]);
        assert_eq!(doc.get("zeta"), Some(&Node::Int(1)));
        assert_eq!(doc.get("alpha"), Some(&Node::Float(2.5)));
        let mid = doc.get("mid").and_then(Node::as_list).unwrap();
        assert_eq!(mid.len(), 3);
        assert!(mid[2].as_section().is_some());
    }

    #[test]
    fn test_empty_document() {
        assert!(YamlCodec.decode(b"   \n").unwrap().is_empty());
        assert!(YamlCodec.decode(b"~\n").unwrap().is_empty());
    }

    #[test]
    fn test_scalar_root_is_rejected() {
        assert!(YamlCodec.decode(b"just text").is_err());
    }

    #[test]
    fn test_encode_then_decode_preserves_order() {
        let mut doc = Section::new();
        doc.set("items.b:second.material", "stone");
        doc.set("items.a:first.material", "paper");
        let bytes = YamlCodec.encode(&doc).unwrap();
        let back = YamlCodec.decode(&bytes).unwrap();
        let keys: Vec<&str> = back.section("items").unwrap().keys().collect();
        assert_eq!(keys, vec!["b:second", "a:first"]);
    }
}
