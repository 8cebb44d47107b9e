//! Rule synthesis: one assertion per present constraint declaration.
//!
//! The synthesizer inspects which structural-constraint keys a group
//! carries and builds a fully-resolved [`Assertion`] for each. All set
//! algebra goes through the [`Resolver`]; this module only decides
//! which sets feed which side of each relation.

use std::collections::{BTreeSet, HashSet};

use crate::assertion::{Assertion, AssertionKind};
use crate::error::CompileError;
use crate::group::Group;
use crate::resolver::Resolver;
use crate::selector::{
    classify, is_interface_token, token_kind, ElementKind, Selector, NAMESPACE_SEPARATOR,
};

/// Builds assertions from a group's constraint declarations.
#[derive(Debug)]
pub struct RuleSynthesizer {
    resolver: Resolver,
}

impl RuleSynthesizer {
    /// Creates a synthesizer over the given resolver.
    #[must_use]
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }

    /// Returns the underlying resolver.
    #[must_use]
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Runs every fallible check synthesis would run, without building
    /// assertions. Used by the pipeline's fail-fast validation pass so
    /// the lazy assertion stream cannot fail mid-pull.
    ///
    /// # Errors
    ///
    /// Same error surface as [`synthesize`](Self::synthesize).
    pub fn validate(&self, group: &Group) -> Result<(), CompileError> {
        let constraints = group.constraints();
        self.subject_parts(group, false)?;
        if let Some(parent) = &constraints.extends {
            self.checked_target(parent, ElementKind::Class)?;
        }
        for contract in &constraints.implements {
            self.checked_target(contract, ElementKind::Interface)?;
        }
        if constraints.dependency_whitelist.is_some() {
            unit_token(group)?;
        }
        Ok(())
    }

    /// Emits one assertion per constraint key present on the group.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::UnknownGroup`] on resolution failure,
    /// [`CompileError::InvalidTargetKind`] when an `extends` target is
    /// an interface or an `implements` target is not, and
    /// [`CompileError::MissingRequiredKey`] for a whitelist unit
    /// without exactly one selector.
    pub fn synthesize(&self, group: &Group) -> Result<Vec<Assertion>, CompileError> {
        let constraints = group.constraints();
        let mut assertions = Vec::new();
        if constraints.is_empty() {
            return Ok(assertions);
        }

        let (subjects, subject_excludes) = self.subject_parts(group, false)?;

        if let Some(parent) = &constraints.extends {
            let (target_tokens, target_excludes) =
                self.checked_target(parent, ElementKind::Class)?;
            assertions.push(Assertion::new(
                group.name(),
                AssertionKind::MustExtend,
                subjects.clone(),
                subject_excludes.clone(),
                classify_unique(&target_tokens)?,
                classify_optional(target_excludes.as_ref())?,
            ));
        }

        if !constraints.implements.is_empty() {
            let mut target_tokens = Vec::new();
            let mut target_excludes = BTreeSet::new();
            for contract in &constraints.implements {
                let (tokens, excludes) = self.checked_target(contract, ElementKind::Interface)?;
                target_tokens.extend(tokens);
                if let Some(excludes) = excludes {
                    target_excludes.extend(excludes);
                }
            }
            let (concrete_subjects, concrete_excludes) = self.subject_parts(group, true)?;
            assertions.push(Assertion::new(
                group.name(),
                AssertionKind::MustImplement,
                concrete_subjects,
                concrete_excludes,
                classify_unique(&target_tokens)?,
                classify_optional(Some(&target_excludes).filter(|set| !set.is_empty()))?,
            ));
        }

        if constraints.is_final {
            let (concrete_subjects, concrete_excludes) = self.subject_parts(group, true)?;
            assertions.push(Assertion::new(
                group.name(),
                AssertionKind::MustBeFinal,
                concrete_subjects,
                concrete_excludes,
                vec![],
                None,
            ));
        }

        if constraints.is_readonly {
            let (concrete_subjects, concrete_excludes) = self.subject_parts(group, true)?;
            assertions.push(Assertion::new(
                group.name(),
                AssertionKind::MustBeReadonly,
                concrete_subjects,
                concrete_excludes,
                vec![],
                None,
            ));
        }

        if let Some(targets) = &constraints.depends_on {
            let resolved = self.resolver.resolve_targets(group, targets, true)?;
            let excluded = self.resolver.find_target_excludes(targets, &resolved)?;
            assertions.push(Assertion::new(
                group.name(),
                AssertionKind::MustOnlyDependOn,
                subjects.clone(),
                subject_excludes.clone(),
                classify_tokens(resolved.iter())?,
                classify_optional(Some(&excluded).filter(|set| !set.is_empty()))?,
            ));
        }

        if let Some(targets) = &constraints.must_not_depend_on {
            let resolved = self.resolver.resolve_targets(group, targets, false)?;
            let excluded = self.resolver.find_target_excludes(targets, &resolved)?;
            assertions.push(Assertion::new(
                group.name(),
                AssertionKind::MustNotDependOn,
                subjects.clone(),
                subject_excludes.clone(),
                classify_tokens(resolved.iter())?,
                classify_optional(Some(&excluded).filter(|set| !set.is_empty()))?,
            ));
        }

        if let Some(method) = &constraints.sole_public_method {
            assertions.push(Assertion::new(
                group.name(),
                AssertionKind::MustHaveSolePublicMethod(method.clone()),
                subjects.clone(),
                subject_excludes.clone(),
                vec![],
                None,
            ));
        }

        if let Some(whitelist) = &constraints.dependency_whitelist {
            // The subject is the unit's own single selector, never a
            // flattened group.
            let own = unit_token(group)?;
            let resolved = self.resolver.resolve_targets(group, whitelist, false)?;
            let mut objects = classify_tokens(resolved.iter())?;
            // Code may always depend on elements declared in its own
            // immediate namespace without whitelisting them.
            objects.push(sibling_selector(own)?);
            assertions.push(Assertion::new(
                group.name(),
                AssertionKind::MustOnlyDependOnWhitelist,
                vec![classify(own)?],
                None,
                objects,
                None,
            ));
        }

        Ok(assertions)
    }

    /// Compiles the group's flattened includes/excludes into subject
    /// selectors. With `drop_interfaces`, interface-kind include
    /// tokens are filtered out (interfaces cannot implement, nor be
    /// final or readonly).
    fn subject_parts(
        &self,
        group: &Group,
        drop_interfaces: bool,
    ) -> Result<(Vec<Selector>, Option<Vec<Selector>>), CompileError> {
        let resolved = self.resolver.resolve(group.name())?;
        let mut seen = HashSet::new();
        let mut subjects = Vec::new();
        for token in resolved.includes() {
            if drop_interfaces && is_interface_token(token) {
                continue;
            }
            if seen.insert(token.as_str()) {
                subjects.push(classify(token)?);
            }
        }
        let excludes = classify_optional(resolved.excludes())?;
        Ok((subjects, excludes))
    }

    /// Resolves a single constraint target (group name or literal) and
    /// checks every resolved token against the expected element kind.
    fn checked_target(
        &self,
        token: &str,
        expected: ElementKind,
    ) -> Result<(Vec<String>, Option<BTreeSet<String>>), CompileError> {
        let (tokens, excludes) = if self.resolver.registry().contains(token) {
            let resolved = self.resolver.resolve(token)?;
            (resolved.includes().to_vec(), resolved.excludes().cloned())
        } else {
            (vec![token.to_string()], None)
        };

        for resolved_token in &tokens {
            let found = token_kind(resolved_token);
            let mismatch = match expected {
                ElementKind::Interface => found != ElementKind::Interface,
                _ => found == ElementKind::Interface,
            };
            if mismatch {
                return Err(CompileError::InvalidTargetKind {
                    expected,
                    found,
                    target: resolved_token.clone(),
                });
            }
        }
        Ok((tokens, excludes))
    }
}

/// Returns the sole include token of a single-selector unit.
fn unit_token(group: &Group) -> Result<&str, CompileError> {
    match group.includes() {
        [single] => Ok(single),
        _ => Err(CompileError::MissingRequiredKey {
            key: "selector".to_string(),
            context: format!("unit `{}`", group.name()),
        }),
    }
}

/// Builds the implicit same-namespace sibling selector for a unit.
fn sibling_selector(token: &str) -> Result<Selector, CompileError> {
    let pattern = match token.rfind(NAMESPACE_SEPARATOR) {
        Some(split) => format!("{}{}*", &token[..split], NAMESPACE_SEPARATOR),
        None => "*".to_string(),
    };
    Selector::compile(&pattern, ElementKind::Namespace)
}

fn classify_tokens<'a>(
    tokens: impl Iterator<Item = &'a String>,
) -> Result<Vec<Selector>, CompileError> {
    tokens.map(|token| classify(token)).collect()
}

fn classify_unique(tokens: &[String]) -> Result<Vec<Selector>, CompileError> {
    let mut seen = HashSet::new();
    let mut selectors = Vec::new();
    for token in tokens {
        if seen.insert(token.as_str()) {
            selectors.push(classify(token)?);
        }
    }
    Ok(selectors)
}

fn classify_optional(
    tokens: Option<&BTreeSet<String>>,
) -> Result<Option<Vec<Selector>>, CompileError> {
    match tokens {
        None => Ok(None),
        Some(set) => Ok(Some(classify_tokens(set.iter())?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{Constraints, GroupRegistry, RegistryBuilder};
    use std::sync::Arc;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    fn synthesizer(groups: Vec<Group>) -> (Arc<GroupRegistry>, RuleSynthesizer) {
        let mut builder = RegistryBuilder::new();
        for group in groups {
            builder.register(group);
        }
        let registry = Arc::new(builder.build());
        let resolver = Resolver::new(Arc::clone(&registry));
        (registry, RuleSynthesizer::new(resolver))
    }

    fn display_names(selectors: &[Selector]) -> Vec<&str> {
        selectors.iter().map(Selector::display_name).collect()
    }

    #[test]
    fn unconstrained_group_emits_nothing() {
        let (registry, synth) = synthesizer(vec![Group::new(
            "domain",
            tokens(&[r"App\Domain\*"]),
            vec![],
            Constraints::default(),
        )]);
        let group = registry.get("domain").unwrap();
        assert!(synth.synthesize(group).unwrap().is_empty());
    }

    // -- extends --

    #[test]
    fn extends_emits_must_extend() {
        let (registry, synth) = synthesizer(vec![Group::new(
            "entities",
            tokens(&[r"App\Domain\Order", r"App\Domain\Invoice"]),
            vec![],
            Constraints {
                extends: Some(r"App\Shared\AggregateRoot".to_string()),
                ..Constraints::default()
            },
        )]);
        let group = registry.get("entities").unwrap();

        let assertions = synth.synthesize(group).unwrap();
        assert_eq!(assertions.len(), 1);
        let assertion = &assertions[0];
        assert_eq!(*assertion.kind(), AssertionKind::MustExtend);
        assert_eq!(
            display_names(assertion.subjects()),
            [r"App\Domain\Order", r"App\Domain\Invoice"]
        );
        assert_eq!(
            display_names(assertion.objects()),
            [r"App\Shared\AggregateRoot"]
        );
        assert!(assertion.subject_excludes().is_none());
        assert!(assertion.object_excludes().is_none());
    }

    #[test]
    fn extends_target_must_not_be_interface() {
        let (registry, synth) = synthesizer(vec![Group::new(
            "entities",
            tokens(&[r"App\Domain\Order"]),
            vec![],
            Constraints {
                extends: Some(r"App\Shared\EntityInterface".to_string()),
                ..Constraints::default()
            },
        )]);
        let group = registry.get("entities").unwrap();

        let result = synth.synthesize(group);
        assert!(matches!(
            result,
            Err(CompileError::InvalidTargetKind {
                expected: ElementKind::Class,
                found: ElementKind::Interface,
                ..
            })
        ));
    }

    #[test]
    fn extends_group_target_carries_its_excludes() {
        let (registry, synth) = synthesizer(vec![
            Group::new(
                "bases",
                tokens(&[r"App\Base\Model"]),
                tokens(&[r"App\Base\Deprecated"]),
                Constraints::default(),
            ),
            Group::new(
                "entities",
                tokens(&[r"App\Domain\Order"]),
                vec![],
                Constraints {
                    extends: Some("bases".to_string()),
                    ..Constraints::default()
                },
            ),
        ]);
        let group = registry.get("entities").unwrap();

        let assertions = synth.synthesize(group).unwrap();
        let assertion = &assertions[0];
        assert_eq!(display_names(assertion.objects()), [r"App\Base\Model"]);
        assert_eq!(
            display_names(assertion.object_excludes().unwrap()),
            [r"App\Base\Deprecated"]
        );
    }

    // -- implements --

    #[test]
    fn implements_emits_must_implement_without_interface_subjects() {
        let (registry, synth) = synthesizer(vec![Group::new(
            "domain",
            tokens(&[r"App\Domain\Order", r"App\Domain\OrderInterface"]),
            vec![],
            Constraints {
                implements: tokens(&[r"App\Shared\EntityInterface"]),
                ..Constraints::default()
            },
        )]);
        let group = registry.get("domain").unwrap();

        let assertions = synth.synthesize(group).unwrap();
        assert_eq!(assertions.len(), 1);
        let assertion = &assertions[0];
        assert_eq!(*assertion.kind(), AssertionKind::MustImplement);
        // Interface-kind includes are filtered from the subject side.
        assert_eq!(display_names(assertion.subjects()), [r"App\Domain\Order"]);
        assert_eq!(
            display_names(assertion.objects()),
            [r"App\Shared\EntityInterface"]
        );
    }

    #[test]
    fn implements_target_must_be_interface() {
        let (registry, synth) = synthesizer(vec![Group::new(
            "domain",
            tokens(&[r"App\Domain\Order"]),
            vec![],
            Constraints {
                implements: tokens(&["SomeClass"]),
                ..Constraints::default()
            },
        )]);
        let group = registry.get("domain").unwrap();

        let result = synth.synthesize(group);
        assert!(matches!(
            result,
            Err(CompileError::InvalidTargetKind {
                expected: ElementKind::Interface,
                found: ElementKind::Class,
                target,
            }) if target == "SomeClass"
        ));
    }

    // -- final / readonly --

    #[test]
    fn final_and_readonly_have_no_objects() {
        let (registry, synth) = synthesizer(vec![Group::new(
            "values",
            tokens(&[r"App\Domain\Money", r"App\Domain\MoneyInterface"]),
            vec![],
            Constraints {
                is_final: true,
                is_readonly: true,
                ..Constraints::default()
            },
        )]);
        let group = registry.get("values").unwrap();

        let assertions = synth.synthesize(group).unwrap();
        assert_eq!(assertions.len(), 2);
        assert_eq!(*assertions[0].kind(), AssertionKind::MustBeFinal);
        assert_eq!(*assertions[1].kind(), AssertionKind::MustBeReadonly);
        for assertion in &assertions {
            assert_eq!(display_names(assertion.subjects()), [r"App\Domain\Money"]);
            assert!(assertion.objects().is_empty());
        }
    }

    // -- depends_on / must_not_depend_on --

    #[test]
    fn depends_on_unions_own_includes_and_contracts() {
        let (registry, synth) = synthesizer(vec![
            Group::new(
                "infra",
                tokens(&[r"App\Infra\Db"]),
                vec![],
                Constraints::default(),
            ),
            Group::new(
                "domain",
                tokens(&[r"App\Domain\*"]),
                vec![],
                Constraints {
                    extends: Some(r"App\Shared\AggregateRoot".to_string()),
                    depends_on: Some(tokens(&["infra"])),
                    ..Constraints::default()
                },
            ),
        ]);
        let group = registry.get("domain").unwrap();

        let assertions = synth.synthesize(group).unwrap();
        let depends = assertions
            .iter()
            .find(|a| *a.kind() == AssertionKind::MustOnlyDependOn)
            .unwrap();
        let objects = display_names(depends.objects());
        assert!(objects.contains(&r"App\Infra\Db"));
        assert!(objects.contains(&r"App\Domain\*"));
        assert!(objects.contains(&r"App\Shared\AggregateRoot"));
    }

    #[test]
    fn depends_on_explicit_target_beats_group_exclusion() {
        let (registry, synth) = synthesizer(vec![
            Group::new(
                "group1",
                tokens(&[r"App\G1\Service"]),
                tokens(&[r"App\X"]),
                Constraints::default(),
            ),
            Group::new(
                "g",
                tokens(&[r"App\G\*"]),
                vec![],
                Constraints {
                    depends_on: Some(tokens(&["group1", r"App\X"])),
                    ..Constraints::default()
                },
            ),
        ]);
        let group = registry.get("g").unwrap();

        let assertions = synth.synthesize(group).unwrap();
        let depends = &assertions[0];
        assert!(display_names(depends.objects()).contains(&r"App\X"));
        assert!(depends.object_excludes().is_none());
    }

    #[test]
    fn must_not_depend_on_skips_own_rules() {
        let (registry, synth) = synthesizer(vec![
            Group::new(
                "infra",
                tokens(&[r"App\Infra\Db"]),
                vec![],
                Constraints::default(),
            ),
            Group::new(
                "domain",
                tokens(&[r"App\Domain\*"]),
                vec![],
                Constraints {
                    must_not_depend_on: Some(tokens(&["infra"])),
                    ..Constraints::default()
                },
            ),
        ]);
        let group = registry.get("domain").unwrap();

        let assertions = synth.synthesize(group).unwrap();
        let forbidden = &assertions[0];
        assert_eq!(*forbidden.kind(), AssertionKind::MustNotDependOn);
        assert_eq!(display_names(forbidden.objects()), [r"App\Infra\Db"]);
    }

    // -- sole public method --

    #[test]
    fn sole_public_method_carries_name_in_kind() {
        let (registry, synth) = synthesizer(vec![Group::new(
            "handlers",
            tokens(&[r"App\Handler\*"]),
            vec![],
            Constraints {
                sole_public_method: Some("__invoke".to_string()),
                ..Constraints::default()
            },
        )]);
        let group = registry.get("handlers").unwrap();

        let assertions = synth.synthesize(group).unwrap();
        assert_eq!(
            *assertions[0].kind(),
            AssertionKind::MustHaveSolePublicMethod("__invoke".to_string())
        );
        assert!(assertions[0].objects().is_empty());
    }

    // -- dependency whitelist --

    #[test]
    fn whitelist_adds_implicit_sibling_namespace() {
        let (registry, synth) = synthesizer(vec![Group::new(
            "app.handlers",
            tokens(&[r"App\Foo\Handler"]),
            vec![],
            Constraints {
                dependency_whitelist: Some(tokens(&[r"App\Bar\Service"])),
                ..Constraints::default()
            },
        )]);
        let group = registry.get("app.handlers").unwrap();

        let assertions = synth.synthesize(group).unwrap();
        let assertion = &assertions[0];
        assert_eq!(*assertion.kind(), AssertionKind::MustOnlyDependOnWhitelist);
        assert_eq!(display_names(assertion.subjects()), [r"App\Foo\Handler"]);

        let objects = display_names(assertion.objects());
        assert!(objects.contains(&r"App\Bar\Service"));
        // The unit may depend on any sibling in App\Foo without
        // whitelisting it.
        assert!(objects.contains(&r"App\Foo\*"));
        let sibling = assertion
            .objects()
            .iter()
            .find(|s| s.display_name() == r"App\Foo\*")
            .unwrap();
        assert!(sibling.matches(r"App\Foo\OtherThing"));
        assert!(!sibling.matches(r"App\Baz\Thing"));
    }

    #[test]
    fn whitelist_requires_single_selector() {
        let (registry, synth) = synthesizer(vec![Group::new(
            "app.handlers",
            tokens(&[r"App\Foo\A", r"App\Foo\B"]),
            vec![],
            Constraints {
                dependency_whitelist: Some(tokens(&[r"App\Bar\Service"])),
                ..Constraints::default()
            },
        )]);
        let group = registry.get("app.handlers").unwrap();

        assert!(matches!(
            synth.synthesize(group),
            Err(CompileError::MissingRequiredKey { key, .. }) if key == "selector"
        ));
    }

    // -- validation parity --

    #[test]
    fn validate_catches_kind_mismatch_without_emitting() {
        let (registry, synth) = synthesizer(vec![Group::new(
            "domain",
            tokens(&[r"App\Domain\Order"]),
            vec![],
            Constraints {
                implements: tokens(&["SomeClass"]),
                ..Constraints::default()
            },
        )]);
        let group = registry.get("domain").unwrap();

        assert!(matches!(
            synth.validate(group),
            Err(CompileError::InvalidTargetKind { .. })
        ));
    }

    #[test]
    fn subject_excludes_flow_into_assertions() {
        let (registry, synth) = synthesizer(vec![Group::new(
            "domain",
            tokens(&[r"App\Domain\*"]),
            tokens(&[r"App\Domain\Legacy"]),
            Constraints {
                is_final: true,
                ..Constraints::default()
            },
        )]);
        let group = registry.get("domain").unwrap();

        let assertions = synth.synthesize(group).unwrap();
        assert_eq!(
            display_names(assertions[0].subject_excludes().unwrap()),
            [r"App\Domain\Legacy"]
        );
    }
}
