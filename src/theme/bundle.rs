//! Flattens a LESS file and its relative imports into a single text.
//!
//! The variable file of the component library is split across several files
//! (`themes/default.less` importing `color/colors.less`, and so on). The probe bundle
//! needs all of those declarations inline, so every `@import` of a local LESS file
//! is replaced by the imported content. Package imports (`~pkg/...`), remote URLs and
//! `.css` files are left in place for the compiler to handle.
//!
//! A file is inlined at most once, like LESS's default `(once)` import behavior. An
//! import that leads back to a file currently being inlined is an error.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::debug;

use super::constants::{IMPORT_RE, LESS_EXTENSION};
use super::error::{ThemeError, ThemeResult};

/// Read `entry` and inline its imports recursively
pub async fn bundle_less_file(entry: &Path) -> ThemeResult<String> {
    let mut seen = HashSet::new();
    let mut stack = Vec::new();
    flatten(entry, &mut seen, &mut stack).await
}

async fn flatten(path: &Path, seen: &mut HashSet<PathBuf>, stack: &mut Vec<PathBuf>) -> ThemeResult<String> {
    let canonical = tokio::fs::canonicalize(path).await.map_err(|e| ThemeError::Bundle {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if stack.contains(&canonical) {
        let mut chain: Vec<String> = stack.iter().map(|p| p.display().to_string()).collect();
        chain.push(canonical.display().to_string());
        return Err(ThemeError::Bundle {
            file: canonical,
            message: format!("import cycle: {}", chain.join(" -> ")),
        });
    }
    if !seen.insert(canonical.clone()) {
        debug!("Already inlined {}, skipping", canonical.display());
        return Ok(String::new());
    }

    let content = tokio::fs::read_to_string(&canonical)
        .await
        .map_err(|e| ThemeError::Bundle {
            file: canonical.clone(),
            message: e.to_string(),
        })?;
    let base_dir = canonical.parent().map(Path::to_path_buf).unwrap_or_default();

    stack.push(canonical);
    let mut output = String::with_capacity(content.len());
    let mut last = 0;
    for captures in IMPORT_RE.captures_iter(&content) {
        let (Some(statement), Some(target)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let Some(import_path) = local_import_path(&base_dir, target.as_str()) else {
            continue;
        };
        output.push_str(&content[last..statement.start()]);
        output.push_str(&Box::pin(flatten(&import_path, seen, stack)).await?);
        last = statement.end();
    }
    output.push_str(&content[last..]);
    stack.pop();

    Ok(output)
}

/// Path of an import that should be inlined, or `None` if the compiler resolves it
fn local_import_path(base_dir: &Path, target: &str) -> Option<PathBuf> {
    if target.starts_with('~') || target.contains("://") || target.ends_with(".css") {
        return None;
    }
    let path = base_dir.join(target);
    if path.extension().is_some_and(|ext| ext == LESS_EXTENSION) {
        Some(path)
    } else {
        let mut with_extension = path.into_os_string();
        with_extension.push(".");
        with_extension.push(LESS_EXTENSION);
        Some(PathBuf::from(with_extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_inlines_relative_imports() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("themes")).unwrap();
        fs::create_dir_all(dir.path().join("color")).unwrap();
        fs::write(dir.path().join("color/colors.less"), "@blue-6: #1890ff;\n").unwrap();
        fs::write(
            dir.path().join("themes/default.less"),
            "@import \"../color/colors\";\n@primary-color: @blue-6;\n",
        )
        .unwrap();

        let bundled = bundle_less_file(&dir.path().join("themes/default.less")).await.unwrap();
        assert!(!bundled.contains("@import"));
        let blue = bundled.find("@blue-6: #1890ff;").unwrap();
        let primary = bundled.find("@primary-color: @blue-6;").unwrap();
        assert!(blue < primary, "Imported declarations must precede the importer's");
    }

    #[tokio::test]
    async fn test_keeps_package_and_css_imports() {
        let dir = tempfile::tempdir().unwrap();
        let source = "@import \"~antd/lib/style/index\";\n@import 'reset.css';\n@link-color: #000;\n";
        fs::write(dir.path().join("vars.less"), source).unwrap();

        let bundled = bundle_less_file(&dir.path().join("vars.less")).await.unwrap();
        assert_eq!(bundled, source);
    }

    #[tokio::test]
    async fn test_imports_each_file_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("colors.less"), "@red-6: #f5222d;\n").unwrap();
        fs::write(
            dir.path().join("vars.less"),
            "@import \"colors.less\";\n@import \"colors\";\n",
        )
        .unwrap();

        let bundled = bundle_less_file(&dir.path().join("vars.less")).await.unwrap();
        assert_eq!(bundled.matches("@red-6").count(), 1);
    }

    #[tokio::test]
    async fn test_import_cycle_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.less"), "@import \"b\";\n").unwrap();
        fs::write(dir.path().join("b.less"), "@import \"a\";\n").unwrap();

        let result = bundle_less_file(&dir.path().join("a.less")).await;
        match result {
            Err(ThemeError::Bundle { message, .. }) => assert!(message.contains("import cycle")),
            other => panic!("Expected bundle error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_import_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("vars.less"), "@import \"missing\";\n").unwrap();

        let result = bundle_less_file(&dir.path().join("vars.less")).await;
        assert!(matches!(result, Err(ThemeError::Bundle { .. })));
    }
}
