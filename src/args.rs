//! Entry arguments resolved from overrides or node properties.
//!
//! Each parameter is looked up first in the build's entry-argument overrides
//! (`-a name=value`), then in the same-named property of the entry's node.
use crate::error::{Result, VblockError};
use crate::node::{Node, PropValue};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Str,
    Int,
}

impl ArgKind {
    fn label(self) -> &'static str {
        match self {
            ArgKind::Str => "string",
            ArgKind::Int => "integer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
}

/// A named parameter an entry reads at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryArg {
    pub name: &'static str,
    pub kind: ArgKind,
    pub required: bool,
}

impl EntryArg {
    pub const fn required(name: &'static str, kind: ArgKind) -> Self {
        EntryArg {
            name,
            kind,
            required: true,
        }
    }
}

/// Entry-argument overrides supplied for one build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryArgs {
    values: BTreeMap<String, String>,
}

impl EntryArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `name=value` strings; later values replace earlier ones.
    pub fn parse<I, S>(raw: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut args = EntryArgs::new();
        for item in raw {
            let item = item.as_ref();
            let (name, value) = item
                .split_once('=')
                .filter(|(name, _)| !name.trim().is_empty())
                .ok_or_else(|| VblockError::BadEntryArg {
                    raw: item.to_string(),
                })?;
            args.insert(name.trim(), value);
        }
        Ok(args)
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Overlay `other` on top of these arguments.
    pub fn merge(&mut self, other: &EntryArgs) {
        for (name, value) in &other.values {
            self.values.insert(name.clone(), value.clone());
        }
    }
}

impl From<BTreeMap<String, String>> for EntryArgs {
    fn from(values: BTreeMap<String, String>) -> Self {
        EntryArgs { values }
    }
}

/// Resolve `specs` for `node`, one slot per spec in the same order.
///
/// Optional parameters that are absent from both sources resolve to `None`;
/// required ones fail with [`VblockError::MissingArg`].
pub fn resolve_args_or_props(
    node: &Node,
    overrides: &EntryArgs,
    specs: &[EntryArg],
) -> Result<Vec<Option<ArgValue>>> {
    let mut values = Vec::with_capacity(specs.len());
    for spec in specs {
        let value = if let Some(raw) = overrides.get(spec.name) {
            Some(coerce_text(node, spec, raw)?)
        } else if let Some(prop) = node.prop(spec.name) {
            Some(coerce_prop(node, spec, prop)?)
        } else {
            None
        };
        if value.is_none() && spec.required {
            return Err(VblockError::MissingArg {
                node: node.path.clone(),
                name: spec.name.to_string(),
            });
        }
        values.push(value);
    }
    Ok(values)
}

fn coerce_text(node: &Node, spec: &EntryArg, raw: &str) -> Result<ArgValue> {
    match spec.kind {
        ArgKind::Str => Ok(ArgValue::Str(raw.to_string())),
        ArgKind::Int => parse_int(raw)
            .map(ArgValue::Int)
            .ok_or_else(|| bad_type(node, spec, raw)),
    }
}

fn coerce_prop(node: &Node, spec: &EntryArg, prop: &PropValue) -> Result<ArgValue> {
    match (spec.kind, prop) {
        (ArgKind::Str, PropValue::Str(value)) => Ok(ArgValue::Str(value.clone())),
        (ArgKind::Int, PropValue::Int(value)) => Ok(ArgValue::Int(*value)),
        (ArgKind::Int, PropValue::Cells(cells)) if cells.len() == 1 => {
            Ok(ArgValue::Int(i64::from(cells[0])))
        }
        (ArgKind::Int, PropValue::Str(value)) => coerce_text(node, spec, value),
        (_, other) => Err(bad_type(node, spec, &other.describe())),
    }
}

fn bad_type(node: &Node, spec: &EntryArg, value: &str) -> VblockError {
    VblockError::BadArgType {
        node: node.path.clone(),
        name: spec.name.to_string(),
        value: value.to_string(),
        expected: spec.kind.label(),
    }
}

/// Parse a decimal or `0x`-prefixed hexadecimal integer.
pub fn parse_int(raw: &str) -> Option<i64> {
    let text = raw.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (radix, body) = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => (16, hex),
        None => (10, digits),
    };
    if body.is_empty() || !body.chars().all(|ch| ch.is_digit(radix)) {
        return None;
    }
    let magnitude = i64::from_str_radix(body, radix).ok()?;
    if negative {
        magnitude.checked_neg()
    } else {
        Some(magnitude)
    }
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;
