use serde::{Deserialize, Serialize};
use serde_json::Value;
use smol_str::SmolStr;

use crate::fragment;
use crate::{Error, Result};

/// Procedure metadata attached to definition and call blocks. The
/// `argumentids`, `argumentnames` and `argumentdefaults` members embed JSON
/// arrays *inside* JSON strings, and `warp`/`hasnext` arrive as booleans or
/// stringified booleans depending on the producer, so everything embedded
/// goes through the fragment extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    pub tag_name: SmolStr,
    pub children: Vec<Value>,
    pub proc_code: Option<String>,
    pub argument_ids: Option<Vec<SmolStr>>,
    pub argument_names: Option<Vec<SmolStr>>,
    pub argument_defaults: Option<Vec<Value>>,
    pub warp: Option<bool>,
    pub has_next: Option<bool>,
}

impl Default for Mutation {
    fn default() -> Self {
        Mutation {
            tag_name: SmolStr::new_static("mutation"),
            children: Vec::new(),
            proc_code: None,
            argument_ids: None,
            argument_names: None,
            argument_defaults: None,
            warp: None,
            has_next: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RawMutation {
    #[serde(rename = "tagName")]
    tag_name: SmolStr,
    #[serde(default)]
    children: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    proccode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    argumentids: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    argumentnames: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    argumentdefaults: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    warp: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hasnext: Option<Value>,
}

impl Mutation {
    pub fn from_json(value: &Value) -> Result<Self> {
        let raw: RawMutation = serde_json::from_value(value.clone())?;
        Ok(Mutation {
            tag_name: raw.tag_name,
            children: raw.children,
            proc_code: raw.proccode,
            argument_ids: raw.argumentids.as_deref().map(embedded_strings).transpose()?,
            argument_names: raw
                .argumentnames
                .as_deref()
                .map(embedded_strings)
                .transpose()?,
            argument_defaults: raw
                .argumentdefaults
                .as_deref()
                .map(embedded_values)
                .transpose()?,
            warp: raw.warp.as_ref().map(embedded_bool).transpose()?,
            has_next: raw.hasnext.as_ref().map(embedded_bool).transpose()?,
        })
    }

    pub fn to_json(&self) -> Result<Value> {
        let raw = RawMutation {
            tag_name: self.tag_name.clone(),
            children: self.children.clone(),
            proccode: self.proc_code.clone(),
            argumentids: self
                .argument_ids
                .as_ref()
                .map(|ids| serde_json::to_string(ids))
                .transpose()?,
            argumentnames: self
                .argument_names
                .as_ref()
                .map(|names| serde_json::to_string(names))
                .transpose()?,
            argumentdefaults: self
                .argument_defaults
                .as_ref()
                .map(|defaults| serde_json::to_string(defaults))
                .transpose()?,
            warp: self.warp.map(Value::Bool),
            hasnext: self.has_next.map(Value::Bool),
        };
        Ok(serde_json::to_value(raw)?)
    }
}

/// Pulls the leading JSON array out of a string member, ignoring trailing
/// content some producers leave behind.
fn embedded_values(text: &str) -> Result<Vec<Value>> {
    let (value, _) = fragment::extract(text, 0)?;
    match value {
        Value::Array(items) => Ok(items),
        other => Err(Error::decode(format!(
            "expected embedded array, got {other}"
        ))),
    }
}

fn embedded_strings(text: &str) -> Result<Vec<SmolStr>> {
    embedded_values(text)?
        .iter()
        .map(|item| {
            item.as_str()
                .map(SmolStr::new)
                .ok_or_else(|| Error::decode(format!("expected embedded string, got {item}")))
        })
        .collect()
}

fn embedded_bool(value: &Value) -> Result<bool> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::String(text) => {
            let (value, _) = fragment::extract(text, 0)?;
            value
                .as_bool()
                .ok_or_else(|| Error::decode(format!("expected boolean, got {value}")))
        }
        other => Err(Error::decode(format!("expected boolean, got {other}"))),
    }
}
