use serde_json::Value;
use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::prim::{Prim, PrimKind};
use crate::shadow::ShadowStatus;
use crate::sprite::{BlockId, Resolver};
use crate::{Error, Result};

/// Contents of one side of an input slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Slot {
    #[default]
    Absent,
    /// A deferred block identifier, not yet checked against the table.
    Pending(SmolStr),
    /// A table-validated block reference.
    Block(BlockId),
    /// A nested literal.
    Prim(Prim),
    /// A scalar that was neither an array nor an identifier string. Kept so
    /// decode is lossless; skipped with a warning on encode.
    Raw(Value),
}

impl Slot {
    pub fn from_encoded(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Slot::Absent),
            Value::Array(items) => Ok(Slot::Prim(Prim::from_encoded(items)?)),
            Value::String(id) => Ok(Slot::Pending(SmolStr::new(id))),
            other => Ok(Slot::Raw(other.clone())),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Slot::Absent)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Slot::Pending(_))
    }

    pub fn block_id(&self) -> Option<&BlockId> {
        match self {
            Slot::Block(id) => Some(id),
            _ => None,
        }
    }

    pub fn prim(&self) -> Option<&Prim> {
        match self {
            Slot::Prim(prim) => Some(prim),
            _ => None,
        }
    }

    fn encode_into(&self, items: &mut Vec<Value>) {
        match self {
            Slot::Absent => {}
            Slot::Pending(id) => items.push(Value::from(id.as_str())),
            Slot::Block(id) => items.push(Value::from(id.as_str())),
            Slot::Prim(prim) => items.push(prim.to_encoded()),
            Slot::Raw(value) => warn!(%value, "skipping malformed input slot"),
        }
    }

    fn link(&mut self, resolver: &Resolver) {
        match self {
            Slot::Pending(id) => match resolver.find_block(id) {
                Some(block_id) => *self = Slot::Block(block_id),
                None => debug!(id = %id, "input identifier left pending"),
            },
            Slot::Prim(prim) => prim.link(resolver),
            _ => {}
        }
    }
}

/// One argument slot of a block: a shadow status, the current value, and an
/// optional obscurer plugged in over the shadow default.
#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    /// `None` defers status inference to a later pass; encode falls back to
    /// obscurer presence.
    pub shadow: Option<ShadowStatus>,
    pub value: Slot,
    pub obscurer: Slot,
}

impl Default for Input {
    fn default() -> Self {
        Input {
            shadow: Some(ShadowStatus::HasShadow),
            value: Slot::Absent,
            obscurer: Slot::Absent,
        }
    }
}

impl Input {
    pub fn new() -> Self {
        Input::default()
    }

    /// Wraps any literal into a string primitive, the catch-all used when a
    /// caller supplies a bare value instead of a primitive or a block.
    pub fn of(value: impl Into<Value>) -> Self {
        Input {
            value: Slot::Prim(Prim {
                kind: PrimKind::String,
                value: Some(value.into()),
                ..Prim::default()
            }),
            ..Input::default()
        }
    }

    pub fn with_prim(prim: Prim) -> Self {
        Input {
            value: Slot::Prim(prim),
            ..Input::default()
        }
    }

    pub fn with_block(id: impl Into<SmolStr>) -> Self {
        Input {
            shadow: Some(ShadowStatus::NoShadow),
            value: Slot::Pending(id.into()),
            ..Input::default()
        }
    }

    pub fn with_shadow(mut self, status: ShadowStatus) -> Self {
        self.shadow = Some(status);
        self
    }

    /// Plugs `obscurer` in over the current value. A non-absent obscurer
    /// forces the obscured status.
    pub fn set_obscurer(&mut self, slot: Slot) {
        if !slot.is_absent() {
            self.shadow = Some(ShadowStatus::Obscured);
        }
        self.obscurer = slot;
    }

    /// Decodes the 2-or-3-element wire tuple `[shadowCode, slot, slot?]`.
    /// The shadow code is trusted as encoded; no reconciliation with the
    /// obscurer's presence happens here.
    pub fn from_encoded(encoded: &Value) -> Result<Self> {
        let items = encoded
            .as_array()
            .ok_or_else(|| Error::decode("input must be an array"))?;
        let code = items
            .first()
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::decode("input missing shadow code"))?;
        let shadow = ShadowStatus::from_code(code)?;

        let first = match items.get(1) {
            Some(value) => Slot::from_encoded(value)?,
            None => Slot::Absent,
        };
        let second = match items.get(2) {
            Some(value) => Slot::from_encoded(value)?,
            None => Slot::Absent,
        };

        // On the wire the obscuring unit precedes the obscured shadow, so
        // under OBSCURED the first slot is the obscurer.
        let (value, obscurer) = if shadow == ShadowStatus::Obscured {
            (second, first)
        } else {
            (first, second)
        };

        Ok(Input {
            shadow: Some(shadow),
            value,
            obscurer,
        })
    }

    /// Encodes `[code]`, then the obscurer strictly before the value when
    /// both are present. A malformed slot is skipped, never fatal to its
    /// siblings.
    pub fn to_encoded(&self) -> Value {
        let shadow = self.shadow.unwrap_or(if self.obscurer.is_absent() {
            ShadowStatus::HasShadow
        } else {
            ShadowStatus::Obscured
        });
        let mut items = vec![Value::from(shadow.code())];
        self.obscurer.encode_into(&mut items);
        self.value.encode_into(&mut items);
        Value::Array(items)
    }

    /// Second-pass resolution against a completed block table. Each slot
    /// independently steps `Pending` to `Block` when the table knows the
    /// id; a miss stays pending so a later pass can finish the job, and
    /// re-running is free of side effects.
    pub fn link(&mut self, resolver: &Resolver) {
        self.value.link(resolver);
        self.obscurer.link(resolver);
    }

    /// No deferred identifiers remain in either slot.
    pub fn is_linked(&self) -> bool {
        !self.value.is_pending() && !self.obscurer.is_pending()
    }
}
