//! Test utilities shared across the codebase

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use regex::{Captures, Regex};

use crate::theme::compiler::LessCompiler;
use crate::theme::error::{ThemeError, ThemeResult};

/// Write `content` to `root/relative`, creating parent directories
pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    fs::write(&path, content).expect("Failed to write fixture file");
    path
}

/// Stands in for `lessc` in tests.
///
/// Understands just enough LESS for the fixtures: `@import` through the include
/// paths, single-line variable declarations, variable references and flat rules.
/// A `colorPalette` call with index `n` compiles to `#0n0n0n`. Output follows lessc's
/// formatting (`selector {\n  prop: value;\n}\n`). Unbalanced braces fail to compile.
#[derive(Debug, Default)]
pub struct FakeLessCompiler {
    calls: AtomicUsize,
}

impl FakeLessCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of compilations requested so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LessCompiler for FakeLessCompiler {
    async fn compile(&self, source: &str, include_paths: &[PathBuf]) -> ThemeResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let source = inline_imports(source, include_paths, 0)?;
        if source.matches('{').count() != source.matches('}').count() {
            return Err(ThemeError::Compile {
                message: "Unrecognised input. Possibly missing something".to_string(),
            });
        }

        let palette = Regex::new(r#"color\(~`colorPalette\("@\{[^}]*\}", (\d+)\)`\)"#).unwrap();
        let source = palette.replace_all(&source, |c: &Captures| format!("#0{0}0{0}0{0}", &c[1]));

        let declaration = Regex::new(r"^\s*(@[\w-]+)\s*:\s*(.+?);\s*$").unwrap();
        let mut variables = HashMap::new();
        let mut body = String::new();
        for line in source.lines() {
            if line.trim_start().starts_with("//") {
                continue;
            }
            if let Some(c) = declaration.captures(line) {
                variables.insert(c[1].to_string(), c[2].to_string());
            } else {
                body.push_str(line);
                body.push('\n');
            }
        }

        let rule = Regex::new(r"([^{}]+)\{([^{}]*)\}").unwrap();
        let mut css = String::new();
        for c in rule.captures_iter(&body) {
            css.push_str(&format!("{} {{\n", c[1].trim()));
            for item in c[2].split(';').map(str::trim).filter(|d| !d.is_empty()) {
                let Some((property, value)) = item.split_once(':') else {
                    return Err(ThemeError::Compile {
                        message: format!("Unrecognised declaration '{}'", item),
                    });
                };
                css.push_str(&format!("  {}: {};\n", property.trim(), evaluate(value.trim(), &variables)));
            }
            css.push_str("}\n");
        }
        Ok(css)
    }
}

fn inline_imports(source: &str, include_paths: &[PathBuf], depth: usize) -> ThemeResult<String> {
    if depth > 8 {
        return Err(ThemeError::Compile {
            message: "Imports nested too deeply".to_string(),
        });
    }

    let import = Regex::new(r#"(?m)^[ \t]*@import\s+["']([^"']+)["'];[ \t]*$"#).unwrap();
    let mut result = String::new();
    let mut last = 0;
    for c in import.captures_iter(source) {
        let statement = c.get(0).unwrap();
        let target = &c[1];
        let path = find_import(target, include_paths).ok_or_else(|| ThemeError::Compile {
            message: format!("'{}' wasn't found", target),
        })?;
        let content = fs::read_to_string(&path).map_err(|e| ThemeError::Compile {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;

        result.push_str(&source[last..statement.start()]);
        result.push_str(&inline_imports(&content, include_paths, depth + 1)?);
        last = statement.end();
    }
    result.push_str(&source[last..]);
    Ok(result)
}

fn find_import(target: &str, include_paths: &[PathBuf]) -> Option<PathBuf> {
    let candidates = |base: &Path| {
        let path = base.join(target);
        let with_extension = PathBuf::from(format!("{}.less", path.display()));
        [path, with_extension]
    };

    let direct = Path::new(target);
    if direct.is_absolute() && direct.is_file() {
        return Some(direct.to_path_buf());
    }
    include_paths
        .iter()
        .flat_map(|base| candidates(base.as_path()))
        .find(|path| path.is_file())
}

fn evaluate(value: &str, variables: &HashMap<String, String>) -> String {
    let reference = Regex::new(r"@[\w-]+").unwrap();
    let mut value = value.to_string();
    for _ in 0..16 {
        let next = reference
            .replace_all(&value, |c: &Captures| {
                variables.get(&c[0]).cloned().unwrap_or_else(|| c[0].to_string())
            })
            .into_owned();
        if next == value {
            break;
        }
        value = next;
    }
    value
}
