use std::collections::HashMap;

use crate::error::{EngineError, Result};

/// An ordered attribute name → index map, plus an optional primary-key
/// attribute list. Frozen once built (via `SchemaBuilder`).
#[derive(Debug, Clone)]
pub struct Schema {
    attributes: Vec<String>,
    index: HashMap<String, usize>,
    key: Vec<String>,
}

impl Schema {
    pub(crate) fn new(attributes: Vec<String>, key: Vec<String>) -> Self {
        let index = attributes
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            attributes,
            index,
            key,
        }
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn key(&self) -> &[String] {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The intersection of attribute names between `self` and `other`, in `self`'s order.
    pub fn common_attributes(&self, other: &Schema) -> Vec<String> {
        self.attributes
            .iter()
            .filter(|name| other.contains(name))
            .cloned()
            .collect()
    }

    /// The union schema used as a NaturalJoin's output: every attribute of `self`,
    /// then every attribute of `other` not already present, preserving `other`'s
    /// internal order among those.
    pub fn natural_join(&self, other: &Schema) -> Schema {
        let mut attributes = self.attributes.clone();
        for name in &other.attributes {
            if !self.contains(name) {
                attributes.push(name.clone());
            }
        }
        Schema::new(attributes, Vec::new())
    }
}

/// Fluent builder returned by `Database::create_table`.
pub struct SchemaBuilder {
    attributes: Vec<String>,
    key: Vec<String>,
}

impl SchemaBuilder {
    pub(crate) fn new() -> Self {
        Self {
            attributes: Vec::new(),
            key: Vec::new(),
        }
    }

    pub fn attribute(mut self, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if self.attributes.contains(&name) {
            return Err(EngineError::DuplicateAttribute(name));
        }
        self.attributes.push(name);
        Ok(self)
    }

    pub fn key<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key = names.into_iter().map(Into::into).collect();
        self
    }

    /// Validates the key list against the declared attributes and freezes the schema.
    pub(crate) fn build(self) -> Result<Schema> {
        for key_attr in &self.key {
            if !self.attributes.contains(key_attr) {
                return Err(EngineError::UnboundVariable(key_attr.clone()));
            }
        }
        Ok(Schema::new(self.attributes, self.key))
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }
}
