//! Named groups of code elements and the sealed group registry.
//!
//! A [`Group`] is parsed once from the ruleset document and never
//! mutated. Its `includes`/`excludes` lists hold raw *tokens*: each is
//! either a literal selector string or the name of another group,
//! disambiguated at resolution time against the registry.

use std::collections::HashMap;

/// Structural-constraint declarations carried by a group.
///
/// Every field is optional; the rule synthesizer emits one assertion
/// per present declaration.
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    /// Parent the group's elements must extend.
    pub extends: Option<String>,
    /// Interfaces the group's elements must implement.
    pub implements: Vec<String>,
    /// Elements must be declared final.
    pub is_final: bool,
    /// Elements must be declared readonly.
    pub is_readonly: bool,
    /// The only targets the group's elements may depend on.
    pub depends_on: Option<Vec<String>>,
    /// Targets the group's elements must never depend on.
    pub must_not_depend_on: Option<Vec<String>>,
    /// Elements must expose exactly one public method with this name.
    pub sole_public_method: Option<String>,
    /// Dependency whitelist for a single-selector unit (layered shape).
    pub dependency_whitelist: Option<Vec<String>>,
}

impl Constraints {
    /// Returns true if no constraint declaration is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extends.is_none()
            && self.implements.is_empty()
            && !self.is_final
            && !self.is_readonly
            && self.depends_on.is_none()
            && self.must_not_depend_on.is_none()
            && self.sole_public_method.is_none()
            && self.dependency_whitelist.is_none()
    }
}

/// A named, immutable collection of selector tokens and constraints.
#[derive(Debug, Clone)]
pub struct Group {
    name: String,
    includes: Vec<String>,
    excludes: Vec<String>,
    constraints: Constraints,
}

impl Group {
    /// Creates a new group.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        includes: Vec<String>,
        excludes: Vec<String>,
        constraints: Constraints,
    ) -> Self {
        Self {
            name: name.into(),
            includes,
            excludes,
            constraints,
        }
    }

    /// Returns the group name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw include tokens, in declaration order.
    #[must_use]
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// Returns the raw exclude tokens, in declaration order.
    #[must_use]
    pub fn excludes(&self) -> &[String] {
        &self.excludes
    }

    /// Returns the structural-constraint declarations.
    #[must_use]
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }
}

/// Write-phase collector for groups.
///
/// The registry is populated once and then sealed by [`build`]; the
/// resulting [`GroupRegistry`] is read-only, which keeps the
/// single-writer phase separation explicit.
///
/// [`build`]: RegistryBuilder::build
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    groups: Vec<Group>,
    index: HashMap<String, usize>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a group, preserving registration order.
    ///
    /// A name registered twice keeps its first definition; the input
    /// adapters reject duplicates before they reach the registry, so a
    /// collision here only warrants a warning.
    pub fn register(&mut self, group: Group) -> &mut Self {
        if self.index.contains_key(group.name()) {
            tracing::warn!(group = group.name(), "duplicate group registration ignored");
            return self;
        }
        self.index.insert(group.name().to_string(), self.groups.len());
        self.groups.push(group);
        self
    }

    /// Seals the registry; no further registration is possible.
    #[must_use]
    pub fn build(self) -> GroupRegistry {
        GroupRegistry {
            groups: self.groups,
            index: self.index,
        }
    }
}

/// Sealed, read-only registry of groups.
#[derive(Debug)]
pub struct GroupRegistry {
    groups: Vec<Group>,
    index: HashMap<String, usize>,
}

impl GroupRegistry {
    /// Looks up a group by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Group> {
        self.index.get(name).map(|&i| &self.groups[i])
    }

    /// Tests whether a token names a registered group.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns the group at a registration-order position.
    #[must_use]
    pub fn get_index(&self, position: usize) -> Option<&Group> {
        self.groups.get(position)
    }

    /// Iterates groups in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    /// Returns the number of registered groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if no groups are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
