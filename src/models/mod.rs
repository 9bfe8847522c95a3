use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Template parameters applied to a program before compilation.
///
/// Keyed by parameter name. A `BTreeMap` keeps the order in which values are
/// handed to the compiler stable from run to run.
pub type Params = BTreeMap<String, String>;

/// A program that went through the external compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledProgram {
    /// Name declared in the program header
    pub name: String,
    /// Serialized artifact, written to disk verbatim
    pub serialized: String,
}

/// The part of a serialized artifact this tool looks inside.
///
/// Everything else in the document is opaque and passed through untouched.
#[derive(Deserialize, Debug)]
pub struct ArtifactHeader {
    /// Hex-encoded CBOR of the compiled script
    #[serde(rename = "cborHex")]
    pub cbor_hex: String,
}

/// Request sent to the external compiler process on stdin.
#[derive(Serialize, Debug)]
pub struct BridgeRequest<'a> {
    pub source: &'a str,
    pub params: &'a Params,
    pub optimize: bool,
}

/// Response read back from the external compiler process on stdout.
#[derive(Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BridgeResponse {
    /// Compilation succeeded
    Ok { name: String, serialized: String },
    /// The program itself is invalid (syntax, types, unknown parameter)
    UserError { message: String },
    /// The compiler broke for reasons unrelated to the program
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_response_tags() {
        let ok: BridgeResponse =
            serde_json::from_str(r#"{"status":"ok","name":"vault","serialized":"{}"}"#).unwrap();
        assert_eq!(
            ok,
            BridgeResponse::Ok { name: "vault".into(), serialized: "{}".into() }
        );

        let user: BridgeResponse =
            serde_json::from_str(r#"{"status":"user_error","message":"SyntaxError"}"#).unwrap();
        assert_eq!(user, BridgeResponse::UserError { message: "SyntaxError".into() });
    }

    #[test]
    fn test_artifact_header_ignores_other_fields() {
        let header: ArtifactHeader = serde_json::from_str(
            r#"{"type":"PlutusScriptV2","description":"","cborHex":"4e4d01"}"#,
        )
        .unwrap();
        assert_eq!(header.cbor_hex, "4e4d01");
    }
}
