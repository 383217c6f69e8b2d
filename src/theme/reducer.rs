//! Color-only reduction of compiled CSS
//!
//! Parses the compiled stylesheet with tree-sitter-css and cuts away everything a
//! runtime theme switch does not need:
//! - every at-rule (`@media`, `@font-face`, `@keyframes`, ...) and every comment
//! - every declaration whose property is not color, background, border or box-shadow
//! - rules left without any such declaration
//! - the library's palette preview rules (`.main-color .palatte-*`)
//!
//! Removal works on byte ranges of the input, so whatever is kept keeps its
//! formatting.

use log::warn;
use tree_sitter::{Node, Parser};

use super::constants::{COLOR_PROPERTY_MARKERS, PREVIEW_SELECTOR_PREFIX};
use super::error::{ThemeError, ThemeResult};

const NODE_RULE_SET: &str = "rule_set";
const NODE_SELECTORS: &str = "selectors";
const NODE_BLOCK: &str = "block";
const NODE_DECLARATION: &str = "declaration";
const NODE_PROPERTY_NAME: &str = "property_name";
const NODE_COMMENT: &str = "comment";
const NODE_JS_COMMENT: &str = "js_comment";
const NODE_AT_RULE: &str = "at_rule";
const NODE_ERROR: &str = "ERROR";
/// Suffix of the specialized at-rule kinds (`media_statement`, `import_statement`, ...)
const STATEMENT_SUFFIX: &str = "_statement";

/// Reduces compiled CSS to its color declarations
pub struct ColorReducer {
    parser: Parser,
}

impl ColorReducer {
    /// Create a reducer with its own CSS parser
    pub fn new() -> ThemeResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_css::LANGUAGE.into())
            .map_err(|e| ThemeError::Parser { message: e.to_string() })?;
        Ok(Self { parser })
    }

    /// Strip `css` down to color related rules
    pub fn reduce(&mut self, css: &str) -> ThemeResult<String> {
        let tree = self.parser.parse(css, None).ok_or_else(|| ThemeError::Parser {
            message: "CSS parsing did not produce a tree".to_string(),
        })?;

        let mut removals = Vec::new();
        collect_removals(tree.root_node(), css, &mut removals);
        Ok(apply_removals(css, removals))
    }
}

/// Convenience wrapper creating a one-off [`ColorReducer`]
pub fn reduce_to_colors(css: &str) -> ThemeResult<String> {
    ColorReducer::new()?.reduce(css)
}

/// Walk the children of a stylesheet or block, recording byte ranges to delete
fn collect_removals(node: Node, source: &str, removals: &mut Vec<(usize, usize)>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        let kind = child.kind();
        if kind == NODE_COMMENT || kind == NODE_JS_COMMENT || is_at_rule(kind) {
            removals.push(node_range(child));
        } else if kind == NODE_RULE_SET {
            collect_rule_removals(child, source, removals);
        } else if kind == NODE_DECLARATION {
            if !is_color_declaration(child, source) {
                removals.push(node_range(child));
            }
        } else if kind == NODE_ERROR {
            warn!(
                "Dropping unparsable CSS at line {}: {}",
                child.start_position().row + 1,
                node_text(child, source).lines().next().unwrap_or_default()
            );
            removals.push(node_range(child));
        }
    }
}

fn collect_rule_removals(rule: Node, source: &str, removals: &mut Vec<(usize, usize)>) {
    let block = child_of_kind(rule, NODE_BLOCK);
    let keep = !is_preview_rule(rule, source) && block.is_some_and(|b| has_color_declaration(b, source));
    match block {
        Some(block) if keep => collect_removals(block, source, removals),
        _ => removals.push(node_range(rule)),
    }
}

/// True if the block, or any rule nested in it, keeps at least one declaration
fn has_color_declaration(block: Node, source: &str) -> bool {
    let mut cursor = block.walk();
    let found = block.children(&mut cursor).any(|child| match child.kind() {
        NODE_DECLARATION => is_color_declaration(child, source),
        NODE_RULE_SET => {
            !is_preview_rule(child, source)
                && child_of_kind(child, NODE_BLOCK).is_some_and(|b| has_color_declaration(b, source))
        }
        _ => false,
    });
    found
}

fn is_color_declaration(declaration: Node, source: &str) -> bool {
    child_of_kind(declaration, NODE_PROPERTY_NAME).is_some_and(|property| {
        let name = node_text(property, source);
        COLOR_PROPERTY_MARKERS.iter().any(|marker| name.contains(marker))
    })
}

fn is_preview_rule(rule: Node, source: &str) -> bool {
    child_of_kind(rule, NODE_SELECTORS)
        .is_some_and(|selectors| node_text(selectors, source).starts_with(PREVIEW_SELECTOR_PREFIX))
}

fn is_at_rule(kind: &str) -> bool {
    kind == NODE_AT_RULE || kind.ends_with(STATEMENT_SUFFIX)
}

fn child_of_kind<'tree>(node: Node<'tree>, kind: &str) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

fn node_range(node: Node) -> (usize, usize) {
    (node.start_byte(), node.end_byte())
}

/// Delete the given ranges from `source`.
///
/// A range that is alone on its line(s) takes the whole lines with it, otherwise it
/// takes the spaces that follow it.
fn apply_removals(source: &str, removals: Vec<(usize, usize)>) -> String {
    let mut ranges: Vec<(usize, usize)> = removals
        .into_iter()
        .map(|(start, end)| expand_range(source, start, end))
        .collect();
    ranges.sort_unstable();

    let mut output = String::with_capacity(source.len());
    let mut position = 0;
    for (start, end) in ranges {
        if end <= position {
            continue;
        }
        if start > position {
            output.push_str(&source[position..start]);
        }
        position = end;
    }
    output.push_str(&source[position..]);
    output
}

fn expand_range(source: &str, start: usize, end: usize) -> (usize, usize) {
    let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
    let leading_blank = source[line_start..start].chars().all(|c| c == ' ' || c == '\t');

    let rest = &source[end..];
    let after = end + (rest.len() - rest.trim_start_matches([' ', '\t']).len());
    let tail = &source[after..];

    if leading_blank {
        if tail.is_empty() {
            return (line_start, after);
        }
        if tail.starts_with("\r\n") {
            return (line_start, after + 2);
        }
        if tail.starts_with('\n') {
            return (line_start, after + 1);
        }
    }
    (start, after)
}
