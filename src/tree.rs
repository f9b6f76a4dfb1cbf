//! The persisted settings tree.
//!
//! A setting is a tree of sections whose leaves are previously resolved
//! values, keyed by the declared names (markers stripped from leaf keys).
//! The walker reshapes it to follow the declaration, see
//! [`PersistedNode::coerce_section`].

use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// One node of a persisted setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersistedNode {
    Leaf(String),
    Section(PersistedSection),
}

/// A mapping from segment name to node, in stored order.
///
/// New names are appended; replacing a value keeps its position. Equality
/// compares contents, not order.
#[derive(Debug, Clone, Default)]
pub struct PersistedSection(Vec<(String, PersistedNode)>);

impl PersistedNode {
    /// Turn this node into a section and return it.
    ///
    /// A stored leaf value is discarded: when the declaration turns a leaf
    /// into a section, the old value is lost.
    pub fn coerce_section(&mut self) -> &mut PersistedSection {
        if let PersistedNode::Leaf(_) = self {
            *self = PersistedNode::Section(PersistedSection::default());
        }
        match self {
            PersistedNode::Section(section) => section,
            PersistedNode::Leaf(_) => unreachable!("leaf replaced by a section above"),
        }
    }
}

impl PersistedSection {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|(existing, _)| existing == name)
    }

    /// Walk down `path`, creating missing sections and coercing leaves on the way.
    pub fn descend<S: AsRef<str>>(&mut self, path: &[S]) -> &mut PersistedSection {
        let mut head = self;
        for segment in path {
            let segment = segment.as_ref();
            let index = match head.position(segment) {
                Some(index) => index,
                None => {
                    head.0.push((
                        segment.to_string(),
                        PersistedNode::Section(PersistedSection::default()),
                    ));
                    head.0.len() - 1
                }
            };
            let node = &mut head.0[index].1;
            if let PersistedNode::Leaf(_) = node {
                tracing::warn!(segment, "stored value replaced by a section");
            }
            head = node.coerce_section();
        }
        head
    }

    /// The stored string value at `name`, if there is one.
    pub fn value(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(PersistedNode::Leaf(value)) => Some(value),
            _ => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&PersistedNode> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, node)| node)
    }

    pub fn set_value(&mut self, name: &str, value: String) {
        match self.position(name) {
            Some(index) => self.0[index].1 = PersistedNode::Leaf(value),
            None => self.0.push((name.to_string(), PersistedNode::Leaf(value))),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<PersistedNode> {
        let index = self.position(name)?;
        Some(self.0.remove(index).1)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for PersistedSection {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .all(|(name, node)| other.get(name) == Some(node))
    }
}

impl Eq for PersistedSection {}

impl Serialize for PersistedSection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, node) in &self.0 {
            map.serialize_entry(name, node)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PersistedSection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SectionVisitor;

        impl<'de> Visitor<'de> for SectionVisitor {
            type Value = PersistedSection;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of strings and nested maps")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut section = PersistedSection::default();
                while let Some((name, node)) = access.next_entry::<String, PersistedNode>()? {
                    match section.position(&name) {
                        Some(index) => section.0[index].1 = node,
                        None => section.0.push((name, node)),
                    }
                }
                Ok(section)
            }
        }

        deserializer.deserialize_map(SectionVisitor)
    }
}
