//! LESS compilation
//!
//! The LESS language itself is compiled by the external `lessc` executable. This
//! module wraps it behind [`LessCompiler`] with the fixed configuration the theme
//! pipeline needs, and compiles the caller's custom style files in bulk.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use futures::future::join_all;
use log::{debug, error, warn};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use walkdir::WalkDir;

use super::constants::LESS_EXTENSION;
use super::error::{ThemeError, ThemeResult};

/// Compiles LESS source text to CSS
#[allow(async_fn_in_trait)]
pub trait LessCompiler {
    /// Compile `source`, resolving `@import`s against `include_paths`
    async fn compile(&self, source: &str, include_paths: &[PathBuf]) -> ThemeResult<String>;
}

/// Runs `lessc` with inline JavaScript enabled and the npm-import plugin, so
/// `@import "~pkg/file"` resolves from the package root.
#[derive(Debug, Clone)]
pub struct LesscCompiler {
    executable: PathBuf,
    import_prefix: String,
}

impl LesscCompiler {
    pub fn new(executable: impl Into<PathBuf>, import_prefix: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            import_prefix: import_prefix.into(),
        }
    }

    /// Command line arguments for one compilation reading from stdin
    pub(crate) fn arguments(&self, include_paths: &[PathBuf]) -> ThemeResult<Vec<OsString>> {
        let mut args = Vec::new();
        if !include_paths.is_empty() {
            let joined = std::env::join_paths(include_paths).map_err(|e| ThemeError::Compile {
                message: format!("Invalid include path: {}", e),
            })?;
            let mut include = OsString::from("--include-path=");
            include.push(joined);
            args.push(include);
        }
        args.push(OsString::from("--js"));
        args.push(OsString::from(format!("--npm-import=prefix={}", self.import_prefix)));
        args.push(OsString::from("-"));
        Ok(args)
    }
}

impl Default for LesscCompiler {
    fn default() -> Self {
        Self::new("lessc", "~")
    }
}

impl LessCompiler for LesscCompiler {
    async fn compile(&self, source: &str, include_paths: &[PathBuf]) -> ThemeResult<String> {
        let args = self.arguments(include_paths)?;
        debug!("Running {} {:?}", self.executable.display(), args);

        let mut child = Command::new(&self.executable)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ThemeError::Compile {
                message: format!("Failed to start {}: {}", self.executable.display(), e),
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| ThemeError::Compile {
            message: "Compiler stdin is not available".to_string(),
        })?;
        let input = source.as_bytes().to_vec();
        let feed = async move {
            let result = stdin.write_all(&input).await;
            drop(stdin);
            result
        };

        // stdin has to be fed while stdout is drained
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(|e| ThemeError::Compile {
            message: format!("Failed to wait for {}: {}", self.executable.display(), e),
        })?;

        if !output.status.success() {
            return Err(ThemeError::Compile {
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        fed.map_err(|e| ThemeError::Compile {
            message: format!("Failed to write compiler input: {}", e),
        })?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Compile every LESS file under `styles_dir` and join the results.
///
/// Files are compiled concurrently and concatenated in discovery order. A file that
/// fails to compile contributes nothing; if the directory cannot be walked the whole
/// result is empty. Neither case is an error.
pub async fn compile_custom_styles<C: LessCompiler>(
    compiler: &C,
    styles_dir: &Path,
    library_styles_dir: &Path,
) -> String {
    let files = match find_less_files(styles_dir) {
        Ok(files) => files,
        Err(e) => {
            error!("Failed to scan custom styles in {}: {}", styles_dir.display(), e);
            return String::new();
        }
    };

    let compiles = files.iter().map(|path| async move {
        let source = match tokio::fs::read_to_string(path).await {
            Ok(source) => source,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                return String::new();
            }
        };

        let mut include_paths = Vec::with_capacity(3);
        if let Some(parent) = path.parent() {
            include_paths.push(parent.to_path_buf());
        }
        include_paths.push(styles_dir.to_path_buf());
        include_paths.push(library_styles_dir.to_path_buf());

        match compiler.compile(&source, &include_paths).await {
            Ok(css) => css,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                String::new()
            }
        }
    });

    join_all(compiles).await.join("\n")
}

/// All `*.less` files under `dir` in walk order, sorted by file name within each directory
pub fn find_less_files(dir: &Path) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == LESS_EXTENSION)
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
