//! # arch-assert-core
//!
//! Compiles a declarative description of a codebase's intended
//! module/dependency structure into concrete, machine-checkable
//! structural assertions.
//!
//! Given groups of code elements (named collections of selector tokens,
//! possibly referencing other groups) carrying structural-constraint
//! declarations, the compiler produces a lazy sequence of fully-resolved
//! [`Assertion`]s ready for an external verification engine. The
//! compiler itself never inspects real source code; it only manipulates
//! names, patterns, and sets.
//!
//! ## Example
//!
//! ```
//! use arch_assert_core::{Compiler, Constraints, Group};
//!
//! let domain = Group::new(
//!     "domain",
//!     vec![r"App\Domain\*".to_string()],
//!     vec![],
//!     Constraints {
//!         is_final: true,
//!         ..Constraints::default()
//!     },
//! );
//!
//! let stream = Compiler::compile(vec![domain])?;
//! for assertion in stream {
//!     let assertion = assertion?;
//!     println!("{}", assertion.justification());
//! }
//! # Ok::<(), arch_assert_core::CompileError>(())
//! ```

mod assertion;
mod error;
mod group;
mod pipeline;
mod resolver;
mod selector;
mod synthesize;

pub use assertion::{Assertion, AssertionKind};
pub use error::CompileError;
pub use group::{Constraints, Group, GroupRegistry, RegistryBuilder};
pub use pipeline::{AssertionStream, Compiler};
pub use resolver::{ResolvedGroup, Resolver};
pub use selector::{
    classify, is_interface_token, token_kind, ElementKind, NamePattern, Selector,
    NAMESPACE_SEPARATOR,
};
pub use synthesize::RuleSynthesizer;
