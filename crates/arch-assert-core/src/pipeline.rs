//! The compilation pipeline: groups in, lazy assertion stream out.
//!
//! Every group is registered before any resolution starts, so forward
//! references between groups resolve regardless of declaration order.
//! A fail-fast validation pass then resolves each group and runs the
//! synthesizer's checks; only after that does [`compile`] hand back a
//! lazy [`AssertionStream`], so the consuming engine can short-circuit
//! without ever hitting a mid-stream failure.
//!
//! [`compile`]: Compiler::compile

use std::collections::VecDeque;
use std::sync::Arc;

use crate::assertion::Assertion;
use crate::error::CompileError;
use crate::group::{Group, GroupRegistry, RegistryBuilder};
use crate::resolver::Resolver;
use crate::synthesize::RuleSynthesizer;

/// Compiles a ruleset's groups into structural assertions.
#[derive(Debug, Default)]
pub struct Compiler;

impl Compiler {
    /// Creates a compiler.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Registers, validates, and compiles the given groups.
    ///
    /// # Errors
    ///
    /// Fails fast with the first [`CompileError`] found during
    /// registration or validation; no assertions are yielded on
    /// failure.
    pub fn compile(groups: Vec<Group>) -> Result<AssertionStream, CompileError> {
        let mut builder = RegistryBuilder::new();
        for group in groups {
            builder.register(group);
        }
        let registry = Arc::new(builder.build());

        let resolver = Resolver::new(Arc::clone(&registry));
        let synthesizer = RuleSynthesizer::new(resolver);
        for group in registry.iter() {
            synthesizer.validate(group)?;
        }
        tracing::debug!(groups = registry.len(), "ruleset validated");

        Ok(AssertionStream {
            registry,
            synthesizer,
            position: 0,
            pending: VecDeque::new(),
            failed: false,
        })
    }
}

/// Lazy sequence of assertions, in group declaration order.
///
/// Consumed exactly once; each pull synthesizes at most one further
/// group. Validation during [`Compiler::compile`] makes a mid-stream
/// `Err` unreachable in practice, but the resolver's failure channel
/// is propagated rather than swallowed.
#[derive(Debug)]
pub struct AssertionStream {
    registry: Arc<GroupRegistry>,
    synthesizer: RuleSynthesizer,
    position: usize,
    pending: VecDeque<Assertion>,
    failed: bool,
}

impl Iterator for AssertionStream {
    type Item = Result<Assertion, CompileError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(assertion) = self.pending.pop_front() {
                return Some(Ok(assertion));
            }
            if self.failed {
                return None;
            }
            let group = self.registry.get_index(self.position)?;
            self.position += 1;
            match self.synthesizer.synthesize(group) {
                Ok(batch) => self.pending.extend(batch),
                Err(error) => {
                    self.failed = true;
                    return Some(Err(error));
                }
            }
        }
    }
}
