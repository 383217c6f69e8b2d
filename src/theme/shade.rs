//! Palette shade naming.
//!
//! The component library derives tints and shades of a base color with its
//! `colorPalette` LESS function. These helpers produce the probe names for each
//! shade and the symbolic expression a compiled shade literal is replaced with.

use super::constants::{PRIMARY_COLOR_VARIABLE, PRIMARY_SHADE_PREFIX, PRIMARY_SHADE_RE, SHADE_NAME_RE};

/// Symbolic palette expression for a `<base>-<digit>` name.
///
/// `@link-color-3` becomes ``color(~`colorPalette("@{link-color}", 3)`)``. Every
/// `primary-<digit>` name resolves against `@primary-color`. Returns `None` if the
/// name has no trailing `-<digit>`.
pub fn shade_expression(name: &str) -> Option<String> {
    let captures = SHADE_NAME_RE.captures(name)?;
    let index = captures.get(2)?.as_str();
    let base = if PRIMARY_SHADE_RE.is_match(name) {
        PRIMARY_COLOR_VARIABLE
    } else {
        captures.get(1)?.as_str()
    };
    Some(palette_call(base.trim_start_matches('@'), index))
}

fn palette_call(bare_name: &str, index: &str) -> String {
    format!("color(~`colorPalette(\"@{{{}}}\", {})`)", bare_name, index)
}

/// Name of the probe variable for one shade of `variable`
pub fn shade_variable_name(variable: &str, index: u8) -> String {
    if variable == PRIMARY_COLOR_VARIABLE {
        format!("{}-{}", PRIMARY_SHADE_PREFIX, index)
    } else {
        format!("{}-{}", variable, index)
    }
}
