//! Recursive expansion of group references into flat token sets.
//!
//! Group references form a graph, not a tree: the same group may be
//! reached along several include paths, and reference cycles are legal
//! input. Flattening is a depth-first traversal carrying a path-scoped
//! `visiting` set — a token already on the current path contributes
//! nothing (the cyclic branch is truncated with a warning, never an
//! error), while a token reached again along a different path expands
//! normally, so diamond-shaped graphs are not mistaken for cycles.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use crate::error::CompileError;
use crate::group::{Group, GroupRegistry};

/// The fully-flattened form of one group, memoized per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGroup {
    includes: Vec<String>,
    excludes: Option<BTreeSet<String>>,
}

impl ResolvedGroup {
    /// Flattened include tokens in first-encountered order.
    ///
    /// Not deduplicated: consumers need different dedup scopes, so
    /// deduplication is deferred to them.
    #[must_use]
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// Flattened exclude tokens, with the includes subtracted.
    ///
    /// Tri-state by construction: `None` means no exclusion filter is
    /// applied at all; `Some(set)` is always non-empty. A group whose
    /// excludes fully overlap its includes resolves to `None`, never to
    /// an empty set — the external engine could read an empty set as
    /// "match nothing", which is a different and wrong outcome.
    #[must_use]
    pub fn excludes(&self) -> Option<&BTreeSet<String>> {
        self.excludes.as_ref()
    }
}

/// Which token list of a group is being flattened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenList {
    Includes,
    Excludes,
}

/// Resolves group names to [`ResolvedGroup`]s against a sealed registry.
///
/// Results are memoized for the duration of one compilation run. The
/// resolver is single-threaded by design; the cache uses interior
/// mutability so that resolution can recurse through shared references.
#[derive(Debug)]
pub struct Resolver {
    registry: Arc<GroupRegistry>,
    cache: RefCell<HashMap<String, ResolvedGroup>>,
}

impl Resolver {
    /// Creates a resolver over a sealed registry.
    #[must_use]
    pub fn new(registry: Arc<GroupRegistry>) -> Self {
        Self {
            registry,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Returns the sealed registry this resolver reads from.
    #[must_use]
    pub fn registry(&self) -> &GroupRegistry {
        &self.registry
    }

    /// Resolves a group name to its flattened form.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::UnknownGroup`] if the name was never
    /// registered.
    pub fn resolve(&self, name: &str) -> Result<ResolvedGroup, CompileError> {
        if let Some(hit) = self.cache.borrow().get(name) {
            return Ok(hit.clone());
        }

        let group = self
            .registry
            .get(name)
            .ok_or_else(|| CompileError::UnknownGroup {
                name: name.to_string(),
            })?;

        // One guard set per outermost resolution, seeded with the group
        // itself so a direct self-reference truncates immediately.
        let mut visiting = HashSet::from([name.to_string()]);
        let includes = self.flatten(group, TokenList::Includes, &mut visiting);

        let mut visiting = HashSet::from([name.to_string()]);
        let raw_excludes = self.flatten(group, TokenList::Excludes, &mut visiting);

        // An element that is both included and excluded stays included:
        // exclusion never wins over an explicit include.
        let include_set: HashSet<&String> = includes.iter().collect();
        let excludes: BTreeSet<String> = raw_excludes
            .into_iter()
            .filter(|token| !include_set.contains(token))
            .collect();

        let resolved = ResolvedGroup {
            includes,
            excludes: if excludes.is_empty() {
                None
            } else {
                Some(excludes)
            },
        };
        self.cache
            .borrow_mut()
            .insert(name.to_string(), resolved.clone());
        Ok(resolved)
    }

    fn flatten(
        &self,
        group: &Group,
        list: TokenList,
        visiting: &mut HashSet<String>,
    ) -> Vec<String> {
        let tokens = match list {
            TokenList::Includes => group.includes(),
            TokenList::Excludes => group.excludes(),
        };

        let mut flattened = Vec::new();
        for token in tokens {
            match self.registry.get(token) {
                Some(_) if visiting.contains(token) => {
                    tracing::warn!(
                        group = group.name(),
                        reference = token.as_str(),
                        "cyclic group reference truncated"
                    );
                }
                Some(nested) => {
                    visiting.insert(token.clone());
                    flattened.extend(self.flatten(nested, list, visiting));
                    visiting.remove(token);
                }
                None => flattened.push(token.clone()),
            }
        }
        flattened
    }

    /// Resolves a rule's raw target tokens into a deduplicated set.
    ///
    /// Group-name tokens are replaced by that group's flattened
    /// includes; literal tokens pass through unchanged. With
    /// `include_group_own_rules` (used for depends-only-on rules) the
    /// group's own includes and its resolved `extends`/`implements`
    /// constraint targets are unioned in as well.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::UnknownGroup`] if resolution of a
    /// referenced group fails.
    pub fn resolve_targets(
        &self,
        group: &Group,
        raw_tokens: &[String],
        include_group_own_rules: bool,
    ) -> Result<BTreeSet<String>, CompileError> {
        let mut targets = BTreeSet::new();
        for token in raw_tokens {
            self.collect_token(&mut targets, token)?;
        }

        if include_group_own_rules {
            targets.extend(self.resolve(group.name())?.includes.iter().cloned());
            if let Some(parent) = &group.constraints().extends {
                self.collect_token(&mut targets, parent)?;
            }
            for contract in &group.constraints().implements {
                self.collect_token(&mut targets, contract)?;
            }
        }
        Ok(targets)
    }

    /// Collects the exclusion set for a rule's target list.
    ///
    /// Unions the flattened excludes of every group named in
    /// `raw_tokens`, then subtracts `resolved_targets`: an element
    /// explicitly named as a target must never simultaneously be
    /// excluded from that same target set.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::UnknownGroup`] if resolution of a
    /// referenced group fails.
    pub fn find_target_excludes(
        &self,
        raw_tokens: &[String],
        resolved_targets: &BTreeSet<String>,
    ) -> Result<BTreeSet<String>, CompileError> {
        let mut excluded = BTreeSet::new();
        for token in raw_tokens {
            if self.registry.contains(token) {
                if let Some(excludes) = self.resolve(token)?.excludes() {
                    excluded.extend(excludes.iter().cloned());
                }
            }
        }
        Ok(&excluded - resolved_targets)
    }

    fn collect_token(
        &self,
        targets: &mut BTreeSet<String>,
        token: &str,
    ) -> Result<(), CompileError> {
        if self.registry.contains(token) {
            targets.extend(self.resolve(token)?.includes.iter().cloned());
        } else {
            targets.insert(token.to_string());
        }
        Ok(())
    }
}
