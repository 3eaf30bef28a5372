use serde_json::Value;
use smol_str::SmolStr;

use crate::num::{format_integer, format_number, number_value};
use crate::sprite::Resolver;
use crate::{Error, Result};

/// Kind registry for the compact literal encoding, wire codes 4..=13.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimKind {
    Number,
    PositiveNumber,
    PositiveInteger,
    Integer,
    Angle,
    Color,
    String,
    Broadcast,
    Variable,
    List,
}

impl PrimKind {
    pub const fn code(self) -> u8 {
        match self {
            PrimKind::Number => 4,
            PrimKind::PositiveNumber => 5,
            PrimKind::PositiveInteger => 6,
            PrimKind::Integer => 7,
            PrimKind::Angle => 8,
            PrimKind::Color => 9,
            PrimKind::String => 10,
            PrimKind::Broadcast => 11,
            PrimKind::Variable => 12,
            PrimKind::List => 13,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PrimKind::Number => "number",
            PrimKind::PositiveNumber => "positive number",
            PrimKind::PositiveInteger => "positive integer",
            PrimKind::Integer => "integer",
            PrimKind::Angle => "angle",
            PrimKind::Color => "color",
            PrimKind::String => "string",
            PrimKind::Broadcast => "broadcast",
            PrimKind::Variable => "variable",
            PrimKind::List => "list",
        }
    }

    /// Broadcasts, variables and lists carry a name plus a target id
    /// instead of a literal value.
    pub const fn is_named(self) -> bool {
        matches!(self, PrimKind::Broadcast | PrimKind::Variable | PrimKind::List)
    }

    /// Canonical kind for `code`; anything outside 4..=13 fails.
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            4 => Ok(PrimKind::Number),
            5 => Ok(PrimKind::PositiveNumber),
            6 => Ok(PrimKind::PositiveInteger),
            7 => Ok(PrimKind::Integer),
            8 => Ok(PrimKind::Angle),
            9 => Ok(PrimKind::Color),
            10 => Ok(PrimKind::String),
            11 => Ok(PrimKind::Broadcast),
            12 => Ok(PrimKind::Variable),
            13 => Ok(PrimKind::List),
            _ => Err(Error::UnknownPrimCode { code }),
        }
    }
}

impl Default for PrimKind {
    fn default() -> Self {
        PrimKind::String
    }
}

/// A literal value in its compact array encoding: `[code, value]` for plain
/// kinds, `[code, name, id]` for named kinds, plus a trailing `x, y` when
/// the primitive floats top-level in a block table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Prim {
    pub kind: PrimKind,
    pub value: Option<Value>,
    pub name: Option<SmolStr>,
    pub id: Option<SmolStr>,
    pub pos: Option<(f64, f64)>,
}

impl Prim {
    pub fn string(text: impl Into<String>) -> Self {
        Prim {
            kind: PrimKind::String,
            value: Some(Value::String(text.into())),
            ..Prim::default()
        }
    }

    pub fn number(value: f64) -> Self {
        Prim {
            kind: PrimKind::Number,
            value: Some(Value::String(format_number(value))),
            ..Prim::default()
        }
    }

    pub fn integer(value: i64) -> Self {
        Prim {
            kind: PrimKind::Integer,
            value: Some(Value::String(format_integer(value))),
            ..Prim::default()
        }
    }

    pub fn variable(name: impl Into<SmolStr>, id: Option<SmolStr>) -> Self {
        Prim {
            kind: PrimKind::Variable,
            name: Some(name.into()),
            id,
            ..Prim::default()
        }
    }

    pub fn broadcast(name: impl Into<SmolStr>, id: Option<SmolStr>) -> Self {
        Prim {
            kind: PrimKind::Broadcast,
            name: Some(name.into()),
            id,
            ..Prim::default()
        }
    }

    pub fn from_encoded(items: &[Value]) -> Result<Self> {
        let code = items
            .first()
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::decode("primitive missing kind code"))?;
        let kind = PrimKind::from_code(code)?;

        if kind.is_named() {
            let name = items
                .get(1)
                .and_then(Value::as_str)
                .map(SmolStr::new)
                .ok_or_else(|| {
                    Error::decode(format!("{} primitive missing name", kind.name()))
                })?;
            let id = items.get(2).and_then(Value::as_str).map(SmolStr::new);
            let pos = match (
                items.get(3).and_then(Value::as_f64),
                items.get(4).and_then(Value::as_f64),
            ) {
                (Some(x), Some(y)) => Some((x, y)),
                _ => None,
            };
            return Ok(Prim {
                kind,
                value: None,
                name: Some(name),
                id,
                pos,
            });
        }

        Ok(Prim {
            kind,
            value: items.get(1).cloned(),
            ..Prim::default()
        })
    }

    pub fn to_encoded(&self) -> Value {
        let mut items = vec![Value::from(self.kind.code())];
        if self.kind.is_named() {
            items.push(self.name.as_deref().map_or(Value::Null, Value::from));
            items.push(self.id.as_deref().map_or(Value::Null, Value::from));
            if let Some((x, y)) = self.pos {
                items.push(number_value(x));
                items.push(number_value(y));
            }
        } else {
            items.push(self.value.clone().unwrap_or(Value::Null));
        }
        Value::Array(items)
    }

    /// Refreshes a named primitive's target id from the sprite tables. A
    /// known name overwrites the stored id; an unknown name leaves it
    /// untouched so an unlinked graph re-encodes unchanged.
    pub fn link(&mut self, resolver: &Resolver) {
        if !self.kind.is_named() {
            return;
        }
        let Some(name) = self.name.as_deref() else {
            return;
        };
        let found = match self.kind {
            PrimKind::Variable => resolver.variable_id(name),
            PrimKind::List => resolver.list_id(name),
            PrimKind::Broadcast => resolver.broadcast_id(name),
            _ => None,
        };
        if let Some(id) = found {
            self.id = Some(id.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[rstest::rstest]
    fn kind_codes_round_trip() {
        for code in 4..=13 {
            let kind = PrimKind::from_code(code).unwrap();
            assert_eq!(i64::from(kind.code()), code);
        }
        assert!(PrimKind::from_code(3).is_err());
        assert!(PrimKind::from_code(14).is_err());
    }

    #[rstest::rstest]
    fn plain_primitive_round_trips() {
        let prim = Prim::from_encoded(&[json!(10), json!("hello")]).unwrap();
        assert_eq!(prim.kind, PrimKind::String);
        assert_eq!(prim.to_encoded(), json!([10, "hello"]));
    }

    #[rstest::rstest]
    fn floating_reporter_keeps_position() {
        let items = [json!(12), json!("score"), json!("v1"), json!(240), json!(180)];
        let prim = Prim::from_encoded(&items).unwrap();
        assert_eq!(prim.pos, Some((240.0, 180.0)));
        assert_eq!(prim.to_encoded(), json!([12, "score", "v1", 240, 180]));
    }

    #[rstest::rstest]
    fn number_constructor_formats_canonically() {
        assert_eq!(Prim::number(10.0).value, Some(json!("10")));
        assert_eq!(Prim::number(2.5).value, Some(json!("2.5")));
    }
}
