//! DTO → core [`Group`] conversion with validation.
//!
//! Both document shapes feed the same compiler core: flat groups map
//! one-to-one, layered sub-units become single-selector groups named
//! `<layer>.<unit>`.

use std::collections::HashSet;

use arch_assert_core::{Constraints, Group};

use crate::dto::{GroupDto, LayerDto, RulesetDto, UnitDto};

/// Errors during DTO → domain conversion.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    /// A required key is absent from the document.
    #[error("missing required key `{key}` in {context}")]
    MissingRequiredKey {
        /// The absent key.
        key: String,
        /// Where the key was expected (e.g. `groups[0]`).
        context: String,
    },

    /// Two groups (or derived unit groups) share a name.
    #[error("duplicate group name `{name}`")]
    DuplicateGroup {
        /// The colliding name.
        name: String,
    },
}

/// Converts a raw ruleset document into validated core groups, in
/// document order (flat groups first, then layers).
///
/// # Errors
///
/// Returns the first [`LoadError`] encountered.
pub fn load(dto: RulesetDto) -> Result<Vec<Group>, LoadError> {
    let mut groups = Vec::new();

    for (index, group) in dto.groups.into_iter().enumerate() {
        groups.push(convert_group(group, index)?);
    }
    for (index, layer) in dto.layers.into_iter().enumerate() {
        groups.extend(convert_layer(layer, index)?);
    }

    let mut seen = HashSet::new();
    for group in &groups {
        if !seen.insert(group.name().to_string()) {
            return Err(LoadError::DuplicateGroup {
                name: group.name().to_string(),
            });
        }
    }

    tracing::debug!(groups = groups.len(), "ruleset document loaded");
    Ok(groups)
}

fn require(value: Option<String>, key: &str, context: &str) -> Result<String, LoadError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(LoadError::MissingRequiredKey {
            key: key.to_string(),
            context: context.to_string(),
        }),
    }
}

fn convert_group(dto: GroupDto, index: usize) -> Result<Group, LoadError> {
    let context = format!("groups[{index}]");
    let name = require(dto.name, "name", &context)?;

    let constraints = Constraints {
        extends: dto.extends,
        implements: dto.implements,
        is_final: dto.is_final,
        is_readonly: dto.is_readonly,
        depends_on: dto.depends_on,
        must_not_depend_on: dto.must_not_depend_on,
        sole_public_method: dto.must_only_have_one_public_method_named,
        dependency_whitelist: None,
    };

    Ok(Group::new(name, dto.includes, dto.excludes, constraints))
}

fn convert_layer(dto: LayerDto, index: usize) -> Result<Vec<Group>, LoadError> {
    let context = format!("layers[{index}]");
    let layer_name = require(dto.name, "name", &context)?;

    dto.units
        .into_iter()
        .enumerate()
        .map(|(unit_index, unit)| {
            convert_unit(unit, &layer_name, &format!("{context}.units[{unit_index}]"))
        })
        .collect()
}

fn convert_unit(dto: UnitDto, layer_name: &str, context: &str) -> Result<Group, LoadError> {
    let unit_name = require(dto.name, "name", context)?;
    let selector = require(dto.selector, "selector", context)?;

    let constraints = Constraints {
        extends: dto.extends,
        implements: dto.implements,
        is_final: dto.is_final,
        is_readonly: dto.is_readonly,
        depends_on: dto.depends_on,
        must_not_depend_on: dto.must_not_depend_on,
        sole_public_method: dto.must_only_have_one_public_method_named,
        dependency_whitelist: dto.dependency_whitelist,
    };

    Ok(Group::new(
        format!("{layer_name}.{unit_name}"),
        vec![selector],
        dto.excludes,
        constraints,
    ))
}
