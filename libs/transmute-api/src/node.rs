use crate::section::Section;

/// Canonical document tree value.
///
/// Every document format (YAML, JSON) decodes into this tree and every target
/// document is built out of it before being encoded back.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Node {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Elements keep their authored order and may mix types.
    List(Vec<Node>),
    Map(Section),
}

/// Read-side view of a value whose authored shape is not fixed.
///
/// Source documents are written by hand: one field may hold a single string,
/// a list of strings or a map depending on who wrote the file. Call sites
/// `match` on the shape instead of probing the node.
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    Scalar(&'a Node),
    Sequence(&'a [Node]),
    Mapping(&'a Section),
    /// Missing key or explicit null.
    Absent,
}

impl Node {
    pub fn shape(&self) -> Shape<'_> {
        match self {
            Node::Null => Shape::Absent,
            Node::List(items) => Shape::Sequence(items),
            Node::Map(section) => Shape::Mapping(section),
            scalar => Shape::Scalar(scalar),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integers, plus floats without a fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Node::Int(v) => Some(*v),
            Node::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            Node::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Float(v) => Some(*v),
            Node::Int(v) => Some(*v as f64),
            Node::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Bool(v) => Some(*v),
            Node::Str(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Node::Str(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    pub fn as_section(&self) -> Option<&Section> {
        match self {
            Node::Map(section) => Some(section),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(items) => Some(items),
            _ => None,
        }
    }

    /// Text form of a scalar. `None` for null, lists and maps.
    pub fn scalar_string(&self) -> Option<String> {
        match self {
            Node::Str(s) => Some(s.clone()),
            Node::Int(v) => Some(v.to_string()),
            Node::Float(v) => Some(v.to_string()),
            Node::Bool(v) => Some(v.to_string()),
            Node::Null | Node::List(_) | Node::Map(_) => None,
        }
    }
}

impl From<&str> for Node {
    fn from(v: &str) -> Self {
        Node::Str(v.to_string())
    }
}

impl From<String> for Node {
    fn from(v: String) -> Self {
        Node::Str(v)
    }
}

impl From<bool> for Node {
    fn from(v: bool) -> Self {
        Node::Bool(v)
    }
}

impl From<i64> for Node {
    fn from(v: i64) -> Self {
        Node::Int(v)
    }
}

impl From<i32> for Node {
    fn from(v: i32) -> Self {
        Node::Int(i64::from(v))
    }
}

impl From<u32> for Node {
    fn from(v: u32) -> Self {
        Node::Int(i64::from(v))
    }
}

impl From<f64> for Node {
    fn from(v: f64) -> Self {
        Node::Float(v)
    }
}

impl From<Section> for Node {
    fn from(v: Section) -> Self {
        Node::Map(v)
    }
}

impl From<Vec<Node>> for Node {
    fn from(v: Vec<Node>) -> Self {
        Node::List(v)
    }
}

impl From<Vec<String>> for Node {
    fn from(v: Vec<String>) -> Self {
        Node::List(v.into_iter().map(Node::Str).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_of_null_is_absent() {
        assert!(matches!(Node::Null.shape(), Shape::Absent));
        assert!(matches!(Node::from("x").shape(), Shape::Scalar(_)));
        assert!(matches!(Node::List(vec![]).shape(), Shape::Sequence(_)));
    }

    #[test]
    fn test_lenient_numbers() {
        assert_eq!(Node::Float(3.0).as_i64(), Some(3));
        assert_eq!(Node::Float(3.5).as_i64(), None);
        assert_eq!(Node::from(" 7 ").as_i64(), Some(7));
        assert_eq!(Node::Int(2).as_f64(), Some(2.0));
        assert_eq!(Node::from("TRUE").as_bool(), Some(true));
    }
}
