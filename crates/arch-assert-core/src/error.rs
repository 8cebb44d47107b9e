//! Error taxonomy for the compilation pipeline.
//!
//! Compilation either fully succeeds or fails fast with one of these
//! errors before the assertion stream yields anything. Cyclic group
//! references are deliberately *not* errors; the resolver truncates the
//! cyclic branch and emits a `tracing` warning instead.

use miette::Diagnostic;

use crate::selector::ElementKind;

/// Errors surfaced by registration, resolution, and rule synthesis.
#[derive(Debug, Clone, thiserror::Error, Diagnostic)]
pub enum CompileError {
    /// A name was resolved as a group but was never registered.
    #[error("unknown group `{name}`")]
    #[diagnostic(code(arch_assert::unknown_group))]
    UnknownGroup {
        /// The unregistered group name.
        name: String,
    },

    /// A selector pattern could not be compiled.
    #[error("invalid selector pattern `{pattern}`")]
    #[diagnostic(code(arch_assert::invalid_pattern))]
    InvalidPattern {
        /// The rejected pattern, verbatim.
        pattern: String,
    },

    /// A constraint target resolved to the wrong element kind,
    /// e.g. an `extends` target that names an interface.
    #[error("invalid target `{target}`: expected {expected} kind, found {found}")]
    #[diagnostic(code(arch_assert::invalid_target_kind))]
    InvalidTargetKind {
        /// The kind the constraint requires.
        expected: ElementKind,
        /// The kind the target actually resolved to.
        found: ElementKind,
        /// The offending target token.
        target: String,
    },

    /// A required key is absent from the in-memory ruleset shape.
    #[error("missing required key `{key}` in {context}")]
    #[diagnostic(code(arch_assert::missing_key))]
    MissingRequiredKey {
        /// The absent key.
        key: String,
        /// Where the key was expected (e.g. a group or unit name).
        context: String,
    },
}
