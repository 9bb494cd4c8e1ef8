//! Rare router CLI library.
//!
//! This crate provides the command implementations behind the `rare-router`
//! binary, including terminal styling and output formatting.

pub mod commands;
pub mod output;
pub mod terminal;

#[cfg(test)]
pub(crate) mod test_helpers;
