// src/foundry/options.rs

use std::fmt;

/// Value attached to a named command-line option.
///
/// Booleans toggle bare flags; everything else is carried in its string form
/// and emitted as a separate argument-vector element after the flag. Values
/// are never shell-interpreted, so no quoting or escaping happens here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptValue {
    Bool(bool),
    Text(String),
}

/// Insertion-ordered set of named options for one subprocess invocation.
///
/// Serialization is deterministic: options are emitted in the order they
/// were added, single-character names become short flags (`-x`), all other
/// names become long flags (`--name`).
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    entries: Vec<(String, OptValue)>,
}

impl CommandOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a boolean flag. `false` is recorded but serializes to nothing.
    pub fn flag(mut self, name: &str, on: bool) -> Self {
        self.entries.push((name.to_string(), OptValue::Bool(on)));
        self
    }

    /// Adds a valued option; the value is stringified once, here.
    pub fn arg<V: fmt::Display>(mut self, name: &str, value: V) -> Self {
        self.entries
            .push((name.to_string(), OptValue::Text(value.to_string())));
        self
    }

    /// Adds a valued option only when a value is present.
    pub fn arg_opt<V: fmt::Display>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.arg(name, v),
            None => self,
        }
    }

    /// Serializes the set into argument-vector tokens.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for (name, value) in &self.entries {
            let flag = if name.chars().count() == 1 {
                format!("-{}", name)
            } else {
                format!("--{}", name)
            };
            match value {
                OptValue::Bool(false) => {}
                OptValue::Bool(true) => args.push(flag),
                OptValue::Text(text) => {
                    args.push(flag);
                    args.push(text.clone());
                }
            }
        }
        args
    }
}
