//! Single-file compilation: read, parameterize, compile, write.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::backend::{Backend, BackendError, Program, UserError};
use crate::error::{Error, Result};
use crate::models::{ArtifactHeader, CompiledProgram, Params};
use crate::paths;

/// Everything needed to compile one source file.
#[derive(Debug, Clone, Default)]
pub struct CompileRequest {
    /// Helios source file
    pub source: PathBuf,
    /// Optional JSON object of template parameters
    pub params: Option<PathBuf>,
    /// Overrides the artifact location; its extension is replaced by `.json`
    pub output: Option<PathBuf>,
    /// Print the program name and script hex after compiling
    pub verbose: bool,
}

impl CompileRequest {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self { source: source.into(), ..Self::default() }
    }

    pub fn with_params(mut self, params: Option<PathBuf>) -> Self {
        self.params = params;
        self
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Where the artifact ends up.
    pub fn output_path(&self) -> PathBuf {
        paths::artifact_path(self.output.as_deref().unwrap_or(&self.source))
    }
}

/// How a single compilation ended, short of a fatal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    /// The artifact was written to `output`
    Compiled { name: String, output: PathBuf },
    /// The compiler rejected the program; nothing was written
    Rejected(UserError),
}

/// Parse a parameter file: a JSON object of string to string.
pub fn load_params(path: &Path) -> Result<Params> {
    let content = paths::read_file(path)?;
    serde_json::from_str(&content).map_err(|source| Error::Params {
        path: path.to_path_buf(),
        source,
    })
}

/// Compile one file with `backend`.
///
/// Compile errors in the program come back as [`CompileOutcome::Rejected`]
/// after being printed. I/O, parameter-file and compiler failures are
/// returned as `Err` and should end the run.
pub fn compile_file<B: Backend>(backend: &B, request: &CompileRequest) -> Result<CompileOutcome> {
    println!("Compiling '{}'", paths::display_name(&request.source));

    let source = paths::read_file(&request.source)?;
    let output = request.output_path();
    debug!(source = %request.source.display(), output = %output.display(), "resolved paths");

    let params = match &request.params {
        Some(path) => load_params(path)?,
        None => Params::new(),
    };

    let compiled = match build(backend, &source, &params) {
        Ok(compiled) => compiled,
        Err(BackendError::User(err)) => {
            println!("error: {}", err);
            return Ok(CompileOutcome::Rejected(err));
        }
        Err(err) => return Err(err.into()),
    };

    if request.verbose {
        let header: ArtifactHeader = serde_json::from_str(&compiled.serialized)
            .map_err(|e| Error::Artifact(format!("{} has no cborHex: {}", compiled.name, e)))?;
        println!("'{}' address: {}", compiled.name, header.cbor_hex);
    }

    paths::write_file(&output, &compiled.serialized)?;
    debug!(output = %output.display(), bytes = compiled.serialized.len(), "artifact written");

    Ok(CompileOutcome::Compiled { name: compiled.name, output })
}

fn build<B: Backend>(
    backend: &B,
    source: &str,
    params: &Params,
) -> std::result::Result<CompiledProgram, BackendError> {
    let mut program = backend.load(source)?;
    for (name, value) in params {
        debug!(%name, %value, "setting param");
        program.change_param(name, value)?;
    }
    program.compile(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::tempdir;

    /// Echoes its input back as the artifact, rejecting sources containing `!`.
    /// Sources starting with `raw ` are serialized as an empty object.
    struct Echo {
        params_seen: RefCell<Vec<(String, String)>>,
    }

    struct EchoProgram<'a> {
        owner: &'a Echo,
        source: String,
    }

    impl Echo {
        fn new() -> Self {
            Self { params_seen: RefCell::new(Vec::new()) }
        }
    }

    struct EchoBackend<'a>(&'a Echo);

    impl<'a> Backend for EchoBackend<'a> {
        type Program = EchoProgram<'a>;

        fn load(&self, source: &str) -> std::result::Result<EchoProgram<'a>, BackendError> {
            if source.contains('!') {
                return Err(BackendError::User(UserError::new("SyntaxError: unexpected '!'")));
            }
            Ok(EchoProgram { owner: self.0, source: source.to_string() })
        }
    }

    impl Program for EchoProgram<'_> {
        fn change_param(&mut self, name: &str, value: &str) -> std::result::Result<(), BackendError> {
            self.owner.params_seen.borrow_mut().push((name.to_string(), value.to_string()));
            Ok(())
        }

        fn compile(&self, optimize: bool) -> std::result::Result<CompiledProgram, BackendError> {
            assert!(optimize);
            let serialized = if self.source.starts_with("raw ") {
                "{}".to_string()
            } else {
                serde_json::json!({ "cborHex": self.source.trim() }).to_string()
            };
            Ok(CompiledProgram { name: "echo".to_string(), serialized })
        }
    }

    #[test]
    fn test_output_path_prefers_override() {
        let request = CompileRequest::new("src/vault.hl").with_output(Some("out/custom.txt".into()));
        assert_eq!(request.output_path(), PathBuf::from("out/custom.json"));

        let request = CompileRequest::new("src/vault.hl");
        assert_eq!(request.output_path(), PathBuf::from("src/vault.json"));
    }

    #[test]
    fn test_compile_writes_artifact_and_applies_params() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("vault.hl");
        let params = dir.path().join("vault.params.json");
        std::fs::write(&source, "abcd").unwrap();
        std::fs::write(&params, r##"{"OWNER": "#01", "LIMIT": "10"}"##).unwrap();

        let echo = Echo::new();
        let request = CompileRequest::new(&source).with_params(Some(params)).verbose(true);
        let outcome = compile_file(&EchoBackend(&echo), &request).unwrap();

        let output = dir.path().join("vault.json");
        assert_eq!(outcome, CompileOutcome::Compiled { name: "echo".into(), output: output.clone() });
        assert_eq!(std::fs::read_to_string(output).unwrap(), r#"{"cborHex":"abcd"}"#);
        assert_eq!(
            *echo.params_seen.borrow(),
            vec![("LIMIT".to_string(), "10".to_string()), ("OWNER".to_string(), "#01".to_string())]
        );
    }

    #[test]
    fn test_user_error_is_rejected_without_output() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("broken.hl");
        std::fs::write(&source, "spending !").unwrap();

        let echo = Echo::new();
        let outcome = compile_file(&EchoBackend(&echo), &CompileRequest::new(&source)).unwrap();
        assert!(matches!(outcome, CompileOutcome::Rejected(ref e) if e.message.starts_with("SyntaxError")));
        assert!(!dir.path().join("broken.json").exists());
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let dir = tempdir().unwrap();
        let echo = Echo::new();
        let request = CompileRequest::new(dir.path().join("absent.hl"));
        assert!(matches!(compile_file(&EchoBackend(&echo), &request), Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_malformed_params_is_fatal() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("vault.hl");
        let params = dir.path().join("vault.params.json");
        std::fs::write(&source, "abcd").unwrap();
        std::fs::write(&params, r#"{"OWNER": 1}"#).unwrap();

        let echo = Echo::new();
        let request = CompileRequest::new(&source).with_params(Some(params));
        assert!(matches!(compile_file(&EchoBackend(&echo), &request), Err(Error::Params { .. })));
    }

    #[test]
    fn test_verbose_artifact_without_cbor_hex_is_fatal() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("opaque.hl");
        std::fs::write(&source, "raw opaque").unwrap();

        let echo = Echo::new();
        let request = CompileRequest::new(&source).verbose(true);
        assert!(matches!(compile_file(&EchoBackend(&echo), &request), Err(Error::Artifact(_))));
        assert!(!dir.path().join("opaque.json").exists());
    }

    #[test]
    fn test_artifact_without_cbor_hex_is_written_when_quiet() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("opaque.hl");
        std::fs::write(&source, "raw opaque").unwrap();

        let echo = Echo::new();
        compile_file(&EchoBackend(&echo), &CompileRequest::new(&source)).unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("opaque.json")).unwrap(), "{}");
    }
}
