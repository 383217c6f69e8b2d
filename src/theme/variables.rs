//! LESS variable extraction and alias resolution.
//!
//! Builds the name -> color mapping the theme is derived from. Declarations are read
//! line by line in source order:
//!
//! ```less
//! @blue-6: #1890ff;
//! @primary-color: @blue-6;
//! @link-color: @primary-color;
//! ```
//!
//! yields `@link-color -> #1890ff`. An alias is only resolved against declarations
//! that appear *before* it, so forward references are skipped. A declaration that
//! does not end up as a color is skipped without affecting the rest of the scan.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use log::debug;
use regex::Regex;

use super::color::is_valid_color;
use super::constants::{DECLARATION_RE, LITERAL_SEPARATOR_RE, LITERAL_VARIABLE_RE};
use super::error::{IoContext, ThemeError, ThemeResult};

/// Variable name (including `@`) to concrete color value
pub type ColorMap = HashMap<String, String>;

/// Build a color map from LESS source text.
///
/// Only entries whose resolved value passes [`is_valid_color`] are kept.
pub fn build_color_map(content: &str, extra_patterns: &[Regex]) -> ColorMap {
    let mut declarations: HashMap<String, String> = HashMap::new();
    let mut colors = ColorMap::new();

    for line in content.lines() {
        if !line.starts_with('@') || !line.contains(':') {
            continue;
        }
        let Some((name, value)) = parse_declaration(line) else {
            debug!("Skipping unrecognized declaration: {}", line);
            continue;
        };

        let resolved = if value.starts_with('@') {
            match resolve_alias(&value, &declarations) {
                Ok(resolved) => resolved,
                Err(e) => {
                    debug!("Skipping {}: {}", name, e);
                    declarations.insert(name, value);
                    continue;
                }
            }
        } else {
            value.clone()
        };

        if is_valid_color(&resolved, extra_patterns) {
            colors.insert(name.clone(), resolved);
        }
        declarations.insert(name, value);
    }

    colors
}

/// Split a single `@name: value;` line. The name must contain `-` or `'`.
fn parse_declaration(line: &str) -> Option<(String, String)> {
    let captures = DECLARATION_RE.captures(line)?;
    let name = captures.get(1)?.as_str();
    if !name.contains('-') && !name.contains('\'') {
        return None;
    }
    let value = captures.get(2)?.as_str().trim();
    Some((name.to_string(), value.to_string()))
}

/// Follow an alias chain until it reaches a value that is not a variable reference.
///
/// `declarations` maps names to their raw (unresolved) values. Every name visited by
/// this call is tracked, so a chain that loops fails with [`ThemeError::CyclicAlias`]
/// instead of recursing forever.
pub fn resolve_alias(name: &str, declarations: &HashMap<String, String>) -> ThemeResult<String> {
    let mut visited = HashSet::new();
    let mut chain = vec![name.to_string()];
    let mut current = name;

    loop {
        if !visited.insert(current) {
            return Err(ThemeError::CyclicAlias { chain });
        }
        let value = declarations
            .get(current)
            .ok_or_else(|| ThemeError::UnresolvedAlias { name: current.to_string() })?;
        if !value.starts_with('@') {
            return Ok(value.clone());
        }
        chain.push(value.clone());
        current = value;
    }
}

/// Read a variable file and split every `@name: value` literally.
///
/// No alias resolution and no color validation: values are returned exactly as
/// written (up to the `;`), names have their quotes removed.
pub async fn read_less_vars(path: &Path) -> ThemeResult<HashMap<String, String>> {
    let sheet = tokio::fs::read_to_string(path)
        .await
        .with_io_context(&format!("Failed to read variable file {}", path.display()))?;
    Ok(parse_less_vars(&sheet))
}

/// Literal variable splitting over already loaded text
pub fn parse_less_vars(sheet: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    for found in LITERAL_VARIABLE_RE.find_iter(sheet) {
        let mut parts = LITERAL_SEPARATOR_RE.split(found.as_str());
        let Some(raw_name) = parts.next() else {
            continue;
        };
        let name = raw_name.replace(['\'', '"'], "").trim().to_string();
        let value = parts.collect::<Vec<_>>().join(":");
        vars.insert(name, value);
    }
    vars
}
