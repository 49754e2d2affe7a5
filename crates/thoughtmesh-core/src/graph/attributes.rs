//! Attribute names and values carried by dependent links.

use crate::error::{EngineError, EngineResult};
use crate::shapes::SerializableColor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Attributes a node can publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeAttr {
    X,
    Y,
    Color,
    Text,
}

/// Attributes a shape can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeAttr {
    X,
    Y,
    X1,
    Y1,
    X2,
    Y2,
    Color,
    Text,
}

impl FromStr for NodeAttr {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        match s {
            "x" => Ok(NodeAttr::X),
            "y" => Ok(NodeAttr::Y),
            "color" => Ok(NodeAttr::Color),
            "text" => Ok(NodeAttr::Text),
            other => Err(EngineError::UnknownAttribute(other.to_string())),
        }
    }
}

impl FromStr for ShapeAttr {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        match s {
            "x" => Ok(ShapeAttr::X),
            "y" => Ok(ShapeAttr::Y),
            "x1" => Ok(ShapeAttr::X1),
            "y1" => Ok(ShapeAttr::Y1),
            "x2" => Ok(ShapeAttr::X2),
            "y2" => Ok(ShapeAttr::Y2),
            "color" => Ok(ShapeAttr::Color),
            "text" => Ok(ShapeAttr::Text),
            other => Err(EngineError::UnknownAttribute(other.to_string())),
        }
    }
}

/// A value copied from a node attribute into a shape attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Number(f64),
    Color(SerializableColor),
    Text(String),
}

impl AttrValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<SerializableColor> {
        match self {
            AttrValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Which shape attribute each node attribute drives.
pub type AttributeMap = BTreeMap<NodeAttr, ShapeAttr>;

/// Parse a map from attribute names, e.g. `[("x", "x2"), ("y", "y2")]`.
pub fn parse_attribute_map(pairs: &[(&str, &str)]) -> EngineResult<AttributeMap> {
    pairs
        .iter()
        .map(|(from, to)| -> EngineResult<(NodeAttr, ShapeAttr)> {
            Ok((from.parse()?, to.parse()?))
        })
        .collect()
}

/// A controller jot mirrors its node's position, color and text.
pub fn controller_map() -> AttributeMap {
    BTreeMap::from([
        (NodeAttr::X, ShapeAttr::X),
        (NodeAttr::Y, ShapeAttr::Y),
        (NodeAttr::Color, ShapeAttr::Color),
        (NodeAttr::Text, ShapeAttr::Text),
    ])
}

/// The first endpoint of a line follows the node.
pub fn line_start_map() -> AttributeMap {
    BTreeMap::from([(NodeAttr::X, ShapeAttr::X1), (NodeAttr::Y, ShapeAttr::Y1)])
}

/// The second endpoint of a line follows the node.
pub fn line_end_map() -> AttributeMap {
    BTreeMap::from([(NodeAttr::X, ShapeAttr::X2), (NodeAttr::Y, ShapeAttr::Y2)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attribute_map() {
        let map = parse_attribute_map(&[("x", "x2"), ("y", "y2")]).unwrap();
        assert_eq!(map, line_end_map());
    }

    #[test]
    fn test_unknown_attribute_rejected() {
        let err = parse_attribute_map(&[("x", "z9")]).unwrap_err();
        assert!(matches!(err, EngineError::UnknownAttribute(name) if name == "z9"));
        assert!("radius".parse::<NodeAttr>().is_err());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(AttrValue::Number(2.0).as_number(), Some(2.0));
        assert_eq!(AttrValue::Number(2.0).as_text(), None);
        assert_eq!(AttrValue::Text("hi".into()).as_text(), Some("hi"));
    }
}
