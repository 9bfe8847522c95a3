//! Batch modes: one file, a directory, or the whole project.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::backend::{Backend, UserError};
use crate::compiler::{compile_file, CompileOutcome, CompileRequest};
use crate::config::ProjectConfig;
use crate::error::Result;
use crate::paths::{self, PARAMS_SUFFIX, SOURCE_EXTENSION};

/// What a `compile` invocation should do.
#[derive(Debug, Clone)]
pub enum Mode {
    /// Compile one file, optionally with params and a custom output path
    File { input: PathBuf, params: Option<PathBuf>, output: Option<PathBuf> },
    /// Compile every `.hl` file directly inside a directory
    Directory(PathBuf),
    /// Compile the project described by the config
    Project(ProjectConfig),
}

impl Mode {
    /// An input file wins over a directory, which wins over project mode.
    pub fn select(
        input: Option<PathBuf>,
        params: Option<PathBuf>,
        output: Option<PathBuf>,
        directory: Option<PathBuf>,
        config: ProjectConfig,
    ) -> Self {
        match (input, directory) {
            (Some(input), _) => Mode::File { input, params, output },
            (None, Some(dir)) => Mode::Directory(dir),
            (None, None) => Mode::Project(config),
        }
    }
}

/// Results of a batch, in compilation order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Artifacts written
    pub compiled: Vec<PathBuf>,
    /// Sources the compiler rejected, with its message
    pub rejected: Vec<(PathBuf, UserError)>,
}

impl Summary {
    fn record(&mut self, source: &Path, outcome: CompileOutcome) {
        match outcome {
            CompileOutcome::Compiled { output, .. } => self.compiled.push(output),
            CompileOutcome::Rejected(err) => self.rejected.push((source.to_path_buf(), err)),
        }
    }

    pub fn total(&self) -> usize {
        self.compiled.len() + self.rejected.len()
    }
}

/// Runs compile requests against one backend, stopping only on fatal errors.
pub struct Driver<'a, B: Backend> {
    backend: &'a B,
    verbose: bool,
}

impl<'a, B: Backend> Driver<'a, B> {
    pub fn new(backend: &'a B, verbose: bool) -> Self {
        Self { backend, verbose }
    }

    pub fn run(&self, mode: &Mode) -> Result<Summary> {
        match mode {
            Mode::File { input, params, output } => {
                self.compile_single(input, params.clone(), output.clone())
            }
            Mode::Directory(dir) => self.compile_directory(dir),
            Mode::Project(config) => self.compile_project(config),
        }
    }

    pub fn compile_single(
        &self,
        input: &Path,
        params: Option<PathBuf>,
        output: Option<PathBuf>,
    ) -> Result<Summary> {
        let request = CompileRequest::new(input)
            .with_params(params)
            .with_output(output)
            .verbose(self.verbose);
        self.compile_all(std::iter::once(request))
    }

    pub fn compile_directory(&self, dir: &Path) -> Result<Summary> {
        println!("Compiling files in '{}'", dir.display());

        let files = paths::files_in_dir(dir, SOURCE_EXTENSION)?;
        info!(dir = %dir.display(), count = files.len(), "found sources");

        let verbose = self.verbose;
        self.compile_all(files.into_iter().map(|file| CompileRequest::new(file).verbose(verbose)))
    }

    /// Compile `<srcDir>/<name>.hl` into `<buildDir>/<name>.json`, using
    /// `<paramsDir>/<name>.params.json` when it exists.
    pub fn compile_project(&self, config: &ProjectConfig) -> Result<Summary> {
        let names = paths::file_names_in_dir(&config.src_dir, SOURCE_EXTENSION)?;

        if !paths::exists(&config.build_dir) {
            println!("Creating {} to store builds.", config.build_dir.display());
        }
        paths::ensure_dir(&config.build_dir)?;

        println!("Compiling all files in '{}'.", config.src_dir.display());
        info!(dir = %config.src_dir.display(), count = names.len(), "found sources");

        let requests = names.iter().map(|name| {
            let params = paths::join_name(&config.params_dir, name, PARAMS_SUFFIX);
            CompileRequest::new(paths::join_name(&config.src_dir, name, &format!(".{}", SOURCE_EXTENSION)))
                .with_params(paths::exists(&params).then_some(params))
                .with_output(Some(paths::join_name(&config.build_dir, name, ".json")))
                .verbose(self.verbose)
        });
        self.compile_all(requests)
    }

    fn compile_all(&self, requests: impl IntoIterator<Item = CompileRequest>) -> Result<Summary> {
        let mut summary = Summary::default();
        for request in requests {
            let outcome = compile_file(self.backend, &request)?;
            summary.record(&request.source, outcome);
        }
        Ok(summary)
    }
}
