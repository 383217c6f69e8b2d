//! Theme Generator Constants
//!
//! Every regular expression used by the LESS/CSS micro-parsers lives here, along
//! with the fixed layout of the component library. None of these patterns is a
//! grammar: each one recognizes a single line-oriented shape, so anything outside
//! that shape (multi-line declarations, nested comments, `@@var` lookups) is not
//! matched and is silently skipped by the callers.

use regex::Regex;
use std::sync::LazyLock;

// Component library layout

/// Directory under the library styles root holding the global styles
pub const STYLE_DIR: &str = "style";
/// Entry file of every style directory
pub const STYLE_ENTRY_FILE: &str = "index.less";
/// Default variable file, relative to the library styles root
pub const DEFAULT_VAR_FILE: &str = "style/themes/default.less";
/// Subdirectory of `antd_dir` holding the precompiled library styles
pub const LIBRARY_LIB_DIR: &str = "lib";
/// Extension of the files picked up by the custom styles walk
pub const LESS_EXTENSION: &str = "less";

// Theme variables

/// The canonical primary variable; `primary-<n>` shades always resolve against it
pub const PRIMARY_COLOR_VARIABLE: &str = "@primary-color";
/// Prefix used for the primary palette probes (`@primary-1`, ...)
pub const PRIMARY_SHADE_PREFIX: &str = "@primary";
/// Palette indices probed for every theme variable. 1-5 are tints, 7 is a shade.
pub const SHADE_INDICES: [u8; 6] = [1, 2, 3, 4, 5, 7];

// Color-only reduction

/// A declaration is kept only if its property contains one of these
pub const COLOR_PROPERTY_MARKERS: [&str; 4] = ["color", "background", "border", "box-shadow"];
/// Rules of the library's palette preview page
pub const PREVIEW_SELECTOR_PREFIX: &str = ".main-color .palatte-";
/// Legacy IE hack token stripped from the final output
pub const IE_HACK_TOKEN: &str = "\\9";
/// Compiled values the probe extraction trusts as concrete colors
pub const PROBE_VALUE_PREFIXES: [&str; 2] = ["#", "rgba"];

// Patterns

/// `@name: value;` on a single line. The name may contain letters, digits, `-` and `'`.
/// Group 1 is the name (with `@`), group 2 the value without the semicolon.
pub static DECLARATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(@[A-Za-z0-9'-]+)[^:]*:\s+(.*);").expect("declaration pattern")
});

/// Functional color notation: `rgb[a]`, `hsl[a]`, `hsv[a]` with 2-3 components and an
/// optional alpha. Components may carry `%` or an angle unit.
pub static FUNCTIONAL_COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(rgb|hsl|hsv)a?\((\d+%?(deg|rad|grad|turn)?[,\s]+){2,3}[\s/]*[\d.]+%?\)$")
        .expect("functional color pattern")
});

/// Palette and fade calls that are colors once the compiler evaluates them
pub static PALETTE_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"colorPalette|fade").expect("palette call pattern"));

/// Length units disqualify a value from being a color
pub static LENGTH_UNIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"px").expect("length unit pattern"));

/// `<base>-<digit>` at the end of a variable name, the shape of a palette shade
pub static SHADE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)-(\d)$").expect("shade name pattern"));

/// Any name of the primary palette, whatever prefix it carries
pub static PRIMARY_SHADE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"primary-\d").expect("primary shade pattern"));

/// `@name: value` occurrences for the literal variable reader (value runs up to `;`)
pub static LITERAL_VARIABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(.*:[^;]*)").expect("literal variable pattern"));

/// Separator between name and value for the literal variable reader
pub static LITERAL_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\s*").expect("literal separator pattern"));

/// Single-line comments and anything else that looks like a path, stripped from
/// the compiled probe CSS before extraction
pub static PATH_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/.*/").expect("path comment pattern"));

/// A compiled probe rule in lessc's output format:
/// `.<selector> {\n  color: <value>;`
pub static PROBE_RULE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.([A-Za-z0-9'-]*[-'][A-Za-z0-9'-]*) \{\n  color: (.*);")
        .expect("probe rule pattern")
});

/// `@import "path";` or `@import (options) 'path';` in a LESS file
pub static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*@import\s*(?:\([^)]*\)\s*)?["']([^"']+)["'][^;\n]*;[ \t]*$"#)
        .expect("import pattern")
});
