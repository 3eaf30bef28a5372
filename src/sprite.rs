use std::collections::{HashMap, HashSet};
use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use smol_str::SmolStr;
use tracing::warn;

use crate::block::Block;
use crate::input::Slot;
use crate::options::DecodeOptions;
use crate::prim::Prim;
use crate::{Error, Result};

/// A table-validated block identifier. Minted only by a [`Resolver`]
/// lookup or a table insertion, so holding one is proof the id was present
/// when the reference was made.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockId(SmolStr);

impl BlockId {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for BlockId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// The id-lookup collaborator the linking pass consumes: block-id
/// membership plus name→id maps for the named primitive kinds. A snapshot
/// of a completed table — linking only ever reads it.
#[derive(Debug, Default)]
pub struct Resolver {
    blocks: HashSet<SmolStr>,
    variables: HashMap<SmolStr, SmolStr>,
    lists: HashMap<SmolStr, SmolStr>,
    broadcasts: HashMap<SmolStr, SmolStr>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_block(&self, id: &str) -> Option<BlockId> {
        self.blocks.get(id).map(|id| BlockId(id.clone()))
    }

    pub fn variable_id(&self, name: &str) -> Option<&SmolStr> {
        self.variables.get(name)
    }

    pub fn list_id(&self, name: &str) -> Option<&SmolStr> {
        self.lists.get(name)
    }

    pub fn broadcast_id(&self, name: &str) -> Option<&SmolStr> {
        self.broadcasts.get(name)
    }

    pub fn add_block(&mut self, id: impl Into<SmolStr>) {
        self.blocks.insert(id.into());
    }

    pub fn add_variable(&mut self, name: impl Into<SmolStr>, id: impl Into<SmolStr>) {
        self.variables.insert(name.into(), id.into());
    }

    pub fn add_list(&mut self, name: impl Into<SmolStr>, id: impl Into<SmolStr>) {
        self.lists.insert(name.into(), id.into());
    }

    pub fn add_broadcast(&mut self, name: impl Into<SmolStr>, id: impl Into<SmolStr>) {
        self.broadcasts.insert(name.into(), id.into());
    }
}

/// A variable entry, `[name, value]` with an optional cloud marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: SmolStr,
    pub value: Value,
    pub cloud: bool,
}

impl Variable {
    fn from_json(value: &Value) -> Result<Self> {
        let items = value
            .as_array()
            .ok_or_else(|| Error::decode("variable must be an array"))?;
        let name = items
            .first()
            .and_then(Value::as_str)
            .map(SmolStr::new)
            .ok_or_else(|| Error::decode("variable missing name"))?;
        Ok(Variable {
            name,
            value: items.get(1).cloned().unwrap_or(Value::Null),
            cloud: items.get(2).and_then(Value::as_bool).unwrap_or(false),
        })
    }

    fn to_json(&self) -> Value {
        let mut items = vec![Value::from(self.name.as_str()), self.value.clone()];
        if self.cloud {
            items.push(Value::Bool(true));
        }
        Value::Array(items)
    }
}

/// A list entry, `[name, [values...]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub name: SmolStr,
    pub values: Vec<Value>,
}

impl List {
    fn from_json(value: &Value) -> Result<Self> {
        let items = value
            .as_array()
            .ok_or_else(|| Error::decode("list must be an array"))?;
        let name = items
            .first()
            .and_then(Value::as_str)
            .map(SmolStr::new)
            .ok_or_else(|| Error::decode("list missing name"))?;
        let values = items
            .get(1)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(List { name, values })
    }

    fn to_json(&self) -> Value {
        Value::Array(vec![
            Value::from(self.name.as_str()),
            Value::Array(self.values.clone()),
        ])
    }
}

/// One entry of the block table: a full block object, or a floating
/// reporter stored as a bare primitive array.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockEntry {
    Block(Block),
    Prim(Prim),
}

impl BlockEntry {
    pub fn as_block(&self) -> Option<&Block> {
        match self {
            BlockEntry::Block(block) => Some(block),
            BlockEntry::Prim(_) => None,
        }
    }

    fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Object(_) => Ok(BlockEntry::Block(Block::from_json(value)?)),
            Value::Array(items) => Ok(BlockEntry::Prim(Prim::from_encoded(items)?)),
            other => Err(Error::decode(format!(
                "block table entry must be an object or an array, got {other}"
            ))),
        }
    }

    fn to_json(&self) -> Result<Value> {
        match self {
            BlockEntry::Block(block) => block.to_json(),
            BlockEntry::Prim(prim) => Ok(prim.to_encoded()),
        }
    }

    fn link(&mut self, resolver: &Resolver) {
        match self {
            BlockEntry::Block(block) => block.link(resolver),
            BlockEntry::Prim(prim) => prim.link(resolver),
        }
    }
}

/// An owning container ("target"): the block table the linking pass
/// resolves against, plus the variable, list and broadcast registries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sprite {
    pub name: SmolStr,
    pub blocks: IndexMap<SmolStr, BlockEntry>,
    pub variables: IndexMap<SmolStr, Variable>,
    pub lists: IndexMap<SmolStr, List>,
    pub broadcasts: IndexMap<SmolStr, SmolStr>,
}

impl Sprite {
    pub fn from_json(value: &Value) -> Result<Self> {
        Self::from_json_with_options(value, &DecodeOptions::default())
    }

    pub fn from_json_with_options(value: &Value, options: &DecodeOptions) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::decode("target must be an object"))?;

        let mut sprite = Sprite {
            name: object
                .get("name")
                .and_then(Value::as_str)
                .map(SmolStr::new)
                .unwrap_or_default(),
            ..Sprite::default()
        };

        if let Some(entries) = object.get("variables").and_then(Value::as_object) {
            for (id, entry) in entries {
                sprite
                    .variables
                    .insert(SmolStr::new(id), Variable::from_json(entry)?);
            }
        }
        if let Some(entries) = object.get("lists").and_then(Value::as_object) {
            for (id, entry) in entries {
                sprite.lists.insert(SmolStr::new(id), List::from_json(entry)?);
            }
        }
        if let Some(entries) = object.get("broadcasts").and_then(Value::as_object) {
            for (id, name) in entries {
                let name = name
                    .as_str()
                    .ok_or_else(|| Error::decode("broadcast name must be a string"))?;
                sprite.broadcasts.insert(SmolStr::new(id), SmolStr::new(name));
            }
        }

        if let Some(entries) = object.get("blocks").and_then(Value::as_object) {
            for (id, entry) in entries {
                match BlockEntry::from_json(entry) {
                    Ok(entry) => {
                        sprite.blocks.insert(SmolStr::new(id), entry);
                    }
                    Err(err) if options.lenient => {
                        warn!(block = %id, %err, "skipping malformed block table entry");
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        Ok(sprite)
    }

    pub fn to_json(&self) -> Result<Value> {
        let mut object = Map::new();
        object.insert("name".into(), Value::from(self.name.as_str()));

        let mut variables = Map::new();
        for (id, variable) in &self.variables {
            variables.insert(id.to_string(), variable.to_json());
        }
        object.insert("variables".into(), Value::Object(variables));

        let mut lists = Map::new();
        for (id, list) in &self.lists {
            lists.insert(id.to_string(), list.to_json());
        }
        object.insert("lists".into(), Value::Object(lists));

        let mut broadcasts = Map::new();
        for (id, name) in &self.broadcasts {
            broadcasts.insert(id.to_string(), Value::from(name.as_str()));
        }
        object.insert("broadcasts".into(), Value::Object(broadcasts));

        let mut blocks = Map::new();
        for (id, entry) in &self.blocks {
            blocks.insert(id.to_string(), entry.to_json()?);
        }
        object.insert("blocks".into(), Value::Object(blocks));

        Ok(Value::Object(object))
    }

    pub fn find_block(&self, id: &str) -> Option<&Block> {
        self.blocks.get(id).and_then(BlockEntry::as_block)
    }

    /// Inserts `block` under `id` and returns the validated reference.
    pub fn insert_block(&mut self, id: impl Into<SmolStr>, block: Block) -> BlockId {
        let id = id.into();
        self.blocks.insert(id.clone(), BlockEntry::Block(block));
        BlockId(id)
    }

    /// Snapshot of the lookup tables a linking pass reads.
    pub fn resolver(&self) -> Resolver {
        let mut resolver = Resolver::new();
        for id in self.blocks.keys() {
            resolver.blocks.insert(id.clone());
        }
        for (id, variable) in &self.variables {
            resolver.variables.insert(variable.name.clone(), id.clone());
        }
        for (id, list) in &self.lists {
            resolver.lists.insert(list.name.clone(), id.clone());
        }
        for (id, name) in &self.broadcasts {
            resolver.broadcasts.insert(name.clone(), id.clone());
        }
        resolver
    }

    /// The second phase: resolve every deferred identifier in the table.
    /// Must run only once all block decodes for this sprite are complete;
    /// re-running is harmless and picks up ids that arrived in between.
    pub fn link_blocks(&mut self) {
        let resolver = self.resolver();
        for entry in self.blocks.values_mut() {
            entry.link(&resolver);
        }
    }

    /// No deferred identifiers remain anywhere in the table.
    pub fn is_linked(&self) -> bool {
        self.blocks.values().all(|entry| match entry {
            BlockEntry::Block(block) => block.is_linked(),
            BlockEntry::Prim(_) => true,
        })
    }

    /// Editing helper: plug the block `obscurer_id` in over `input_name` of
    /// `owner`, flipping the shadow-default flags per the format
    /// convention (the displaced unit becomes the shadow default).
    pub fn obscure_input(&mut self, owner: &str, input_name: &str, obscurer_id: &str) -> Result<()> {
        if !self.blocks.contains_key(obscurer_id) {
            return Err(Error::decode(format!("unknown obscurer block {obscurer_id:?}")));
        }

        let displaced = {
            let block = self
                .find_block(owner)
                .ok_or_else(|| Error::decode(format!("unknown block {owner:?}")))?;
            block.inputs.get(input_name).and_then(|input| match &input.value {
                Slot::Pending(id) => Some(id.clone()),
                Slot::Block(id) => Some(id.0.clone()),
                _ => None,
            })
        };

        if let Some(BlockEntry::Block(block)) = self.blocks.get_mut(owner) {
            let input = block.inputs.entry(SmolStr::new(input_name)).or_default();
            input.set_obscurer(Slot::Block(BlockId(SmolStr::new(obscurer_id))));
        }
        if let Some(BlockEntry::Block(block)) = self.blocks.get_mut(obscurer_id) {
            block.shadow = false;
        }
        if let Some(id) = displaced {
            if let Some(BlockEntry::Block(block)) = self.blocks.get_mut(id.as_str()) {
                block.shadow = true;
            }
        }
        Ok(())
    }
}
