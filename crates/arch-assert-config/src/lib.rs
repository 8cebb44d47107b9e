//! # arch-assert-config
//!
//! Input adapters for the `arch-assert` compiler core.
//!
//! Two ruleset document shapes are in use in practice — flat named
//! groups and layers of named sub-units — and both are accepted; each
//! is an adapter feeding the same core, not a separate compiler.
//!
//! # Architecture
//!
//! ```text
//! TOML text (or any serde format)
//!   ↓ serde (DTO layer)
//! RulesetDto
//!   ↓ validate + convert
//! Vec<Group> (core domain)
//!   ↓ Compiler::compile
//! AssertionStream
//! ```

use arch_assert_core::{AssertionStream, CompileError, Compiler, Group};

pub mod dto;
pub mod loader;

/// Errors from parsing a document and compiling its ruleset.
#[derive(Debug, thiserror::Error)]
pub enum RulesetError {
    /// TOML deserialization failed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Document shape validation failed.
    #[error("{0}")]
    Load(#[from] loader::LoadError),

    /// The compiler core rejected the ruleset.
    #[error("{0}")]
    Compile(#[from] CompileError),
}

/// Parses TOML content into validated core groups.
///
/// # Errors
///
/// Returns an error if TOML parsing or document validation fails.
pub fn load_groups_from_toml(content: &str) -> Result<Vec<Group>, RulesetError> {
    let dto: dto::RulesetDto = toml::from_str(content)?;
    Ok(loader::load(dto)?)
}

/// Parses TOML content and compiles it into an assertion stream.
///
/// # Errors
///
/// Returns an error if parsing, validation, or compilation fails.
pub fn compile_from_toml(content: &str) -> Result<AssertionStream, RulesetError> {
    let groups = load_groups_from_toml(content)?;
    Ok(Compiler::compile(groups)?)
}
