use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smol_str::SmolStr;

use crate::input::Input;
use crate::mutation::Mutation;
use crate::num::number_value;
use crate::sprite::{BlockId, Resolver};
use crate::{Error, Result};

/// A deferred `next`/`parent` edge of the script graph.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Link {
    #[default]
    None,
    Pending(SmolStr),
    Resolved(BlockId),
}

impl Link {
    pub fn id(&self) -> Option<&str> {
        match self {
            Link::None => None,
            Link::Pending(id) => Some(id),
            Link::Resolved(id) => Some(id.as_str()),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Link::Pending(_))
    }

    fn from_opt(id: Option<SmolStr>) -> Self {
        id.map_or(Link::None, Link::Pending)
    }

    fn link(&mut self, resolver: &Resolver) {
        if let Link::Pending(id) = self {
            if let Some(block_id) = resolver.find_block(id) {
                *self = Link::Resolved(block_id);
            }
        }
    }
}

/// A non-input argument slot, `[value, id?]`. The id points at a variable
/// or broadcast when the field names one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Field {
    pub value: Value,
    pub id: Option<SmolStr>,
}

impl Field {
    pub fn new(value: impl Into<Value>) -> Self {
        Field {
            value: value.into(),
            id: None,
        }
    }

    pub fn from_encoded(encoded: &Value) -> Result<Self> {
        let items = encoded
            .as_array()
            .ok_or_else(|| Error::decode("field must be an array"))?;
        Ok(Field {
            value: items.first().cloned().unwrap_or(Value::Null),
            id: items.get(1).and_then(Value::as_str).map(SmolStr::new),
        })
    }

    pub fn to_encoded(&self) -> Value {
        Value::Array(vec![
            self.value.clone(),
            self.id.as_deref().map_or(Value::Null, Value::from),
        ])
    }
}

/// The rigid object shell of a block; the positional members inside it are
/// decoded by hand.
#[derive(Debug, Serialize, Deserialize)]
struct RawBlock {
    opcode: SmolStr,
    #[serde(default)]
    next: Option<SmolStr>,
    #[serde(default)]
    parent: Option<SmolStr>,
    #[serde(default)]
    inputs: Map<String, Value>,
    #[serde(default)]
    fields: Map<String, Value>,
    #[serde(default)]
    shadow: bool,
    #[serde(rename = "topLevel", default)]
    top_level: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    y: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mutation: Option<Value>,
}

/// One executable unit: an opcode plus its argument slots and its place in
/// the script graph.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub opcode: SmolStr,
    pub next: Link,
    pub parent: Link,
    pub inputs: IndexMap<SmolStr, Input>,
    pub fields: IndexMap<SmolStr, Field>,
    /// Whether this block is a shadow default rather than a user block.
    pub shadow: bool,
    pub top_level: bool,
    pub pos: Option<(f64, f64)>,
    pub mutation: Option<Mutation>,
}

impl Block {
    pub fn new(opcode: impl Into<SmolStr>) -> Self {
        Block {
            opcode: opcode.into(),
            ..Block::default()
        }
    }

    pub fn add_input(&mut self, name: impl Into<SmolStr>, input: Input) -> &mut Self {
        self.inputs.insert(name.into(), input);
        self
    }

    pub fn add_field(&mut self, name: impl Into<SmolStr>, field: Field) -> &mut Self {
        self.fields.insert(name.into(), field);
        self
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let raw: RawBlock = serde_json::from_value(value.clone())?;

        let mut inputs = IndexMap::new();
        for (name, encoded) in &raw.inputs {
            let input = Input::from_encoded(encoded)
                .map_err(|err| Error::decode(format!("input {name:?}: {err}")))?;
            inputs.insert(SmolStr::new(name), input);
        }

        let mut fields = IndexMap::new();
        for (name, encoded) in &raw.fields {
            let field = Field::from_encoded(encoded)
                .map_err(|err| Error::decode(format!("field {name:?}: {err}")))?;
            fields.insert(SmolStr::new(name), field);
        }

        let pos = match (
            raw.x.as_ref().and_then(Value::as_f64),
            raw.y.as_ref().and_then(Value::as_f64),
        ) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        };

        Ok(Block {
            opcode: raw.opcode,
            next: Link::from_opt(raw.next),
            parent: Link::from_opt(raw.parent),
            inputs,
            fields,
            shadow: raw.shadow,
            top_level: raw.top_level,
            pos,
            mutation: raw.mutation.as_ref().map(Mutation::from_json).transpose()?,
        })
    }

    pub fn to_json(&self) -> Result<Value> {
        let mut inputs = Map::new();
        for (name, input) in &self.inputs {
            inputs.insert(name.to_string(), input.to_encoded());
        }
        let mut fields = Map::new();
        for (name, field) in &self.fields {
            fields.insert(name.to_string(), field.to_encoded());
        }

        let raw = RawBlock {
            opcode: self.opcode.clone(),
            next: self.next.id().map(SmolStr::new),
            parent: self.parent.id().map(SmolStr::new),
            inputs,
            fields,
            shadow: self.shadow,
            top_level: self.top_level,
            x: self.pos.map(|(x, _)| number_value(x)),
            y: self.pos.map(|(_, y)| number_value(y)),
            mutation: self.mutation.as_ref().map(Mutation::to_json).transpose()?,
        };
        Ok(serde_json::to_value(raw)?)
    }

    /// Resolves the `next`/`parent` edges, then links every input. Inputs
    /// of nested blocks are not touched here; the table driver reaches
    /// their own entries.
    pub fn link(&mut self, resolver: &Resolver) {
        self.next.link(resolver);
        self.parent.link(resolver);
        for input in self.inputs.values_mut() {
            input.link(resolver);
        }
    }

    /// No deferred identifiers remain on this block or its inputs.
    pub fn is_linked(&self) -> bool {
        !self.next.is_pending()
            && !self.parent.is_pending()
            && self.inputs.values().all(Input::is_linked)
    }
}
