//! LESS Theme Generator Library
//!
//! Derives a runtime-switchable color stylesheet from a component library's LESS
//! sources: compiled colors are traced back to the variables that produced them, and
//! everything unrelated to color is dropped.

pub mod config;
pub mod logging;
pub mod theme;
#[cfg(test)]
pub mod test_utils;
