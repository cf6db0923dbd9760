use serde_json::{Map, Number, Value};
use transmute_api::{ConvertError, DocumentCodec, Node, Section};

/// JSON documents (`sounds.json`, language files exported by other tools).
pub struct JsonCodec;

impl DocumentCodec for JsonCodec {
    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn decode(&self, bytes: &[u8]) -> Result<Section, ConvertError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Section::new());
        }
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| ConvertError::format(format!("json decode: {e}")))?;
        match from_json(value) {
            Node::Map(section) => Ok(section),
            Node::Null => Ok(Section::new()),
            _ => Err(ConvertError::format("json decode: document root is not an object")),
        }
    }

    fn encode(&self, doc: &Section) -> Result<Vec<u8>, ConvertError> {
        serde_json::to_vec_pretty(&section_to_json(doc))
            .map_err(|e| ConvertError::format(format!("json encode: {e}")))
    }
}

fn from_json(value: Value) -> Node {
    match value {
        Value::Null => Node::Null,
        Value::Bool(b) => Node::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Node::Int(i),
            None => n.as_f64().map(Node::Float).unwrap_or(Node::Null),
        },
        Value::String(s) => Node::Str(s),
        Value::Array(items) => Node::List(items.into_iter().map(from_json).collect()),
        Value::Object(map) => Node::Map(map.into_iter().map(|(k, v)| (k, from_json(v))).collect()),
    }
}

fn section_to_json(section: &Section) -> Value {
    let mut map = Map::new();
    for (k, v) in section.iter() {
        map.insert(k.to_string(), to_json(v));
    }
    Value::Object(map)
}

fn to_json(node: &Node) -> Value {
    match node {
        Node::Null => Value::Null,
        Node::Bool(b) => Value::Bool(*b),
        Node::Int(i) => Value::Number(Number::from(*i)),
        // NaN and infinities have no JSON form.
        Node::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        Node::Str(s) => Value::String(s.clone()),
        Node::List(items) => Value::Array(items.iter().map(to_json).collect()),
        Node::Map(section) => section_to_json(section),
    }
}
