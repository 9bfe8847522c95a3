//! The seam between this tool and the external Helios compiler.
//!
//! The orchestrator only needs four things from a compiler: build a program
//! from source, set a named parameter, compile it, and tell user mistakes
//! apart from everything else. [`Backend`] and [`Program`] capture exactly
//! that; [`ProcessBackend`] implements them by talking JSON to a compiler
//! process.

use std::fmt;
use std::io::Write;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::models::{BridgeRequest, BridgeResponse, CompiledProgram, Params};

/// Argv used when nothing else names a compiler.
pub const DEFAULT_COMPILER: &str = "helios-bridge";

/// A mistake in the user's program, reported by the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserError {
    pub message: String,
}

impl UserError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Errors surfaced by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The program is invalid; a batch keeps going
    User(UserError),
    /// The compiler itself failed; the run stops
    Internal(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::User(err) => write!(f, "{}", err),
            BackendError::Internal(msg) => write!(f, "internal compiler error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

/// A compiler able to turn source text into programs.
pub trait Backend {
    type Program: Program;

    /// Construct a program from source text.
    fn load(&self, source: &str) -> Result<Self::Program, BackendError>;
}

/// A program that has been loaded but not compiled yet.
pub trait Program {
    /// Set the value of a named template parameter.
    fn change_param(&mut self, name: &str, value: &str) -> Result<(), BackendError>;

    /// Compile and serialize the program.
    fn compile(&self, optimize: bool) -> Result<CompiledProgram, BackendError>;
}

/// Runs an external compiler process once per compilation.
///
/// The process receives a [`BridgeRequest`] on stdin and must print a single
/// [`BridgeResponse`] on stdout.
#[derive(Debug, Clone)]
pub struct ProcessBackend {
    argv: Vec<String>,
}

impl ProcessBackend {
    pub fn new(argv: Vec<String>) -> Self {
        let argv = if argv.is_empty() { vec![DEFAULT_COMPILER.to_string()] } else { argv };
        Self { argv }
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }
}

impl Backend for ProcessBackend {
    type Program = ProcessProgram;

    fn load(&self, source: &str) -> Result<ProcessProgram, BackendError> {
        Ok(ProcessProgram {
            argv: self.argv.clone(),
            source: source.to_string(),
            params: Params::new(),
        })
    }
}

/// Source plus parameters, held until the process is asked to compile them.
#[derive(Debug, Clone)]
pub struct ProcessProgram {
    argv: Vec<String>,
    source: String,
    params: Params,
}

impl Program for ProcessProgram {
    fn change_param(&mut self, name: &str, value: &str) -> Result<(), BackendError> {
        self.params.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn compile(&self, optimize: bool) -> Result<CompiledProgram, BackendError> {
        let request = BridgeRequest { source: &self.source, params: &self.params, optimize };
        let payload = serde_json::to_vec(&request)
            .map_err(|e| BackendError::Internal(format!("encoding request: {}", e)))?;

        let (program, args) = self
            .argv
            .split_first()
            .ok_or_else(|| BackendError::Internal("empty compiler command".to_string()))?;
        debug!(compiler = %program, ?args, "spawning compiler");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| BackendError::Internal(format!("cannot run '{}': {}", program, e)))?;

        // The request goes in from its own thread so a compiler that fills
        // stdout or stderr before draining stdin cannot stall both sides.
        let writer = child.stdin.take().map(|mut stdin| {
            std::thread::spawn(move || stdin.write_all(&payload))
        });

        let output = child
            .wait_with_output()
            .map_err(|e| BackendError::Internal(format!("waiting for '{}': {}", program, e)))?;

        if let Some(writer) = writer {
            let written = writer
                .join()
                .map_err(|_| BackendError::Internal("request writer panicked".to_string()))?;
            // A compiler that exits before reading everything shows up below
            // through its exit status, so a broken pipe is not reported here.
            if let Err(e) = written {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(BackendError::Internal(format!("writing request: {}", e)));
                }
            }
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();

        let response: Result<BridgeResponse, _> = serde_json::from_slice(&output.stdout);
        match response {
            Ok(BridgeResponse::UserError { message }) => Err(BackendError::User(UserError::new(message))),
            Ok(BridgeResponse::Error { message }) => Err(BackendError::Internal(message)),
            Ok(BridgeResponse::Ok { name, serialized }) if output.status.success() => {
                Ok(CompiledProgram { name, serialized })
            }
            Ok(BridgeResponse::Ok { .. }) => Err(BackendError::Internal(format!(
                "'{}' reported success but exited with {}: {}",
                program, output.status, stderr
            ))),
            Err(e) if output.status.success() => Err(BackendError::Internal(format!(
                "unreadable response from '{}': {}",
                program, e
            ))),
            Err(_) => Err(BackendError::Internal(format!(
                "'{}' exited with {}: {}",
                program, output.status, stderr
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_argv_falls_back_to_default() {
        let backend = ProcessBackend::new(Vec::new());
        assert_eq!(backend.argv(), &[DEFAULT_COMPILER.to_string()]);
    }

    #[test]
    fn test_params_are_collected_until_compile() {
        let backend = ProcessBackend::new(vec!["true".into()]);
        let mut program = backend.load("spending always_true").unwrap();
        program.change_param("OWNER", "#abcd").unwrap();
        program.change_param("DEADLINE", "100").unwrap();
        assert_eq!(program.params.len(), 2);
        assert_eq!(program.params["OWNER"], "#abcd");
    }

    #[test]
    fn test_missing_compiler_is_internal_error() {
        let backend = ProcessBackend::new(vec!["hyperion-no-such-compiler-on-path".into()]);
        let program = backend.load("spending x").unwrap();
        match program.compile(true) {
            Err(BackendError::Internal(msg)) => assert!(msg.contains("cannot run")),
            other => panic!("expected internal error, got {:?}", other),
        }
    }
}
