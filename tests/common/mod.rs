#![allow(dead_code)]

use hyperion::{Backend, BackendError, CompiledProgram, Program, UserError};
use std::cell::RefCell;

/// In-process stand-in for the Helios compiler.
///
/// A program must start with `<purpose> <name>` and may declare
/// `const NAME = ...` lines; params can only target declared constants.
/// The artifact's `cborHex` is the hex of the source with params applied.
#[derive(Default)]
pub struct FakeHelios {
    /// Every `(name, value)` handed to `change_param`, in call order
    pub params_seen: RefCell<Vec<(String, String)>>,
    /// When set, any source containing this marker fails internally
    pub crash_on: Option<&'static str>,
}

pub struct FakeProgram<'a> {
    owner: &'a FakeHelios,
    name: String,
    source: String,
}

const PURPOSES: [&str; 4] = ["spending", "minting", "staking", "testing"];

impl<'a> Backend for &'a FakeHelios {
    type Program = FakeProgram<'a>;

    fn load(&self, source: &str) -> Result<FakeProgram<'a>, BackendError> {
        if let Some(marker) = self.crash_on {
            if source.contains(marker) {
                return Err(BackendError::Internal("out of memory".to_string()));
            }
        }

        let mut header = source.split_whitespace();
        match (header.next(), header.next()) {
            (Some(purpose), Some(name)) if PURPOSES.contains(&purpose) => Ok(FakeProgram {
                owner: *self,
                name: name.to_string(),
                source: source.to_string(),
            }),
            _ => Err(BackendError::User(UserError::new(
                "SyntaxError: expected script purpose",
            ))),
        }
    }
}

impl Program for FakeProgram<'_> {
    fn change_param(&mut self, name: &str, value: &str) -> Result<(), BackendError> {
        self.owner
            .params_seen
            .borrow_mut()
            .push((name.to_string(), value.to_string()));

        let declaration = format!("const {} = ", name);
        let Some(start) = self.source.find(&declaration) else {
            return Err(BackendError::User(UserError::new(format!(
                "ReferenceError: param '{}' not found",
                name
            ))));
        };
        let value_start = start + declaration.len();
        let value_end = self.source[value_start..]
            .find('\n')
            .map_or(self.source.len(), |i| value_start + i);
        self.source.replace_range(value_start..value_end, value);
        Ok(())
    }

    fn compile(&self, optimize: bool) -> Result<CompiledProgram, BackendError> {
        assert!(optimize, "hyperion always compiles optimized");
        let cbor_hex: String = self.source.bytes().map(|b| format!("{:02x}", b)).collect();
        let serialized = serde_json::json!({
            "type": "PlutusScriptV2",
            "description": "",
            "cborHex": cbor_hex,
        })
        .to_string();
        Ok(CompiledProgram { name: self.name.clone(), serialized })
    }
}

pub fn hex(text: &str) -> String {
    text.bytes().map(|b| format!("{:02x}", b)).collect()
}
