//! Decoder, linker and encoder for Scratch sb3 block graphs.
//!
//! Blocks reference each other by opaque string ids inside a flat,
//! ID-indexed table, so materialization is a two-phase protocol: decode
//! produces entries holding deferred identifiers, then a linking pass over
//! the completed table turns identifiers into validated references. The
//! [`fragment`] module supplies the embedded-JSON extractor the rest of
//! the format parser leans on.

pub mod block;
pub mod error;
pub mod fragment;
pub mod input;
pub mod mutation;
pub mod num;
pub mod options;
pub mod prim;
pub mod shadow;
pub mod sprite;

use serde_json::Value;

pub use crate::block::{Block, Field, Link};
pub use crate::error::{Error, Result};
pub use crate::input::{Input, Slot};
pub use crate::mutation::Mutation;
pub use crate::options::DecodeOptions;
pub use crate::prim::{Prim, PrimKind};
pub use crate::shadow::ShadowStatus;
pub use crate::sprite::{BlockEntry, BlockId, List, Resolver, Sprite, Variable};

/// Decodes a sprite ("target") object and runs the linking pass over its
/// completed block table.
pub fn sprite_from_str(input: &str) -> Result<Sprite> {
    sprite_from_str_with_options(input, &DecodeOptions::default())
}

pub fn sprite_from_str_with_options(input: &str, options: &DecodeOptions) -> Result<Sprite> {
    let value: Value = serde_json::from_str(input)?;
    let mut sprite = Sprite::from_json_with_options(&value, options)?;
    sprite.link_blocks();
    Ok(sprite)
}

pub fn sprite_to_string(sprite: &Sprite) -> Result<String> {
    Ok(serde_json::to_string(&sprite.to_json()?)?)
}

/// Extracts the single JSON value beginning at `offset` of `text`,
/// ignoring whatever trails it.
pub fn extract_value(text: &str, offset: usize) -> Result<(Value, usize)> {
    fragment::extract(text, offset)
}

/// Whether a complete value can be extracted starting at `offset`.
pub fn is_partial_json(text: &str, offset: usize) -> bool {
    fragment::is_partial_json(text, offset)
}

/// Whether the entire string decodes as one JSON document.
pub fn is_valid_json(text: &str) -> bool {
    fragment::is_valid_json(text)
}
