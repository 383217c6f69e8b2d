//! Color theme generation for LESS component libraries
//!
//! Provides the pieces of the theme pipeline:
//! - regex micro-parsers for LESS variables and compiled probe rules
//! - `lessc` as the external compiler
//! - tree-sitter-css for reducing compiled CSS to its colors

pub mod bundle;
pub mod color;
pub mod compiler;
pub mod constants;
pub mod error;
pub mod generator;
pub mod reducer;
pub mod shade;
pub mod variables;


pub use error::{ThemeError, ThemeResult};
pub use generator::ThemeGenerator;
