pub mod backend;
pub mod compiler;
pub mod config;
pub mod driver;
pub mod error;
pub mod models;
pub mod paths;

pub use backend::{Backend, BackendError, ProcessBackend, Program, UserError};
pub use compiler::{compile_file, load_params, CompileOutcome, CompileRequest};
pub use config::ProjectConfig;
pub use driver::{Driver, Mode, Summary};
pub use error::{Error, Result};
pub use models::{CompiledProgram, Params};

/// Compile a single Helios file with the compiler named by `config`.
///
/// This is the library counterpart of `hyperion compile -i <source>`: the
/// artifact lands next to the source with a `.json` extension, or at
/// `output` (extension replaced) when given.
///
/// # Arguments
///
/// * `config` - Supplies the external compiler command
/// * `source` - Path to the `.hl` file
/// * `params` - Optional JSON object of template parameters
/// * `output` - Optional artifact path override
///
/// # Example
///
/// ```no_run
/// use hyperion::{compile, CompileOutcome, ProjectConfig};
/// use std::path::Path;
///
/// let config = ProjectConfig::default();
/// match compile(&config, Path::new("src/vault.hl"), None, None).unwrap() {
///     CompileOutcome::Compiled { output, .. } => println!("wrote {}", output.display()),
///     CompileOutcome::Rejected(err) => eprintln!("{}", err),
/// }
/// ```
pub fn compile(
    config: &ProjectConfig,
    source: &std::path::Path,
    params: Option<std::path::PathBuf>,
    output: Option<std::path::PathBuf>,
) -> Result<CompileOutcome> {
    let backend = ProcessBackend::new(config.compiler_command());
    let request = CompileRequest::new(source).with_params(params).with_output(output);
    compile_file(&backend, &request)
}
