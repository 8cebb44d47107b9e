//! Deserialization types (DTO layer) for ruleset documents.
//!
//! These types exist solely for serde deserialization and make no
//! validity promises; the loader converts them into core [`Group`]s
//! with full validation. Keys that the document format requires are
//! still `Option` here so that the loader, not serde, owns the
//! missing-key error with a useful context string.
//!
//! [`Group`]: arch_assert_core::Group

use serde::Deserialize;

/// Raw representation of a whole ruleset document.
///
/// Two document shapes are in use and both are accepted: flat named
/// groups (`[[groups]]`) and layers of named sub-units (`[[layers]]`
/// with `[[layers.units]]`). A document may carry both.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RulesetDto {
    /// Flat named groups.
    #[serde(default)]
    pub groups: Vec<GroupDto>,

    /// Layers of named sub-units.
    #[serde(default)]
    pub layers: Vec<LayerDto>,
}

/// Raw representation of a flat named group.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupDto {
    /// Group name, unique within the document.
    #[serde(default)]
    pub name: Option<String>,

    /// Selector tokens or group names.
    #[serde(default)]
    pub includes: Vec<String>,

    /// Selector tokens or group names to exclude.
    #[serde(default)]
    pub excludes: Vec<String>,

    /// Parent the group's elements must extend.
    #[serde(default)]
    pub extends: Option<String>,

    /// Interfaces the group's elements must implement.
    #[serde(default)]
    pub implements: Vec<String>,

    /// Elements must be declared final.
    #[serde(default, rename = "final")]
    pub is_final: bool,

    /// Elements must be declared readonly.
    #[serde(default, rename = "readonly")]
    pub is_readonly: bool,

    /// The only targets the group's elements may depend on.
    #[serde(default)]
    pub depends_on: Option<Vec<String>>,

    /// Targets the group's elements must never depend on.
    #[serde(default)]
    pub must_not_depend_on: Option<Vec<String>>,

    /// Elements must expose exactly one public method with this name.
    #[serde(default)]
    pub must_only_have_one_public_method_named: Option<String>,
}

/// Raw representation of a layer of sub-units.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayerDto {
    /// Layer name.
    #[serde(default)]
    pub name: Option<String>,

    /// The layer's sub-units.
    #[serde(default)]
    pub units: Vec<UnitDto>,
}

/// Raw representation of a single-selector sub-unit.
///
/// Units carry the same constraint keys as groups plus
/// `dependency_whitelist`, which only exists in the layered shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnitDto {
    /// Unit name, unique within its layer.
    #[serde(default)]
    pub name: Option<String>,

    /// The unit's single selector token.
    #[serde(default)]
    pub selector: Option<String>,

    /// Selector tokens or group names to exclude.
    #[serde(default)]
    pub excludes: Vec<String>,

    /// Parent the unit's elements must extend.
    #[serde(default)]
    pub extends: Option<String>,

    /// Interfaces the unit's elements must implement.
    #[serde(default)]
    pub implements: Vec<String>,

    /// Elements must be declared final.
    #[serde(default, rename = "final")]
    pub is_final: bool,

    /// Elements must be declared readonly.
    #[serde(default, rename = "readonly")]
    pub is_readonly: bool,

    /// The only targets the unit's elements may depend on.
    #[serde(default)]
    pub depends_on: Option<Vec<String>>,

    /// Targets the unit's elements must never depend on.
    #[serde(default)]
    pub must_not_depend_on: Option<Vec<String>>,

    /// Elements must expose exactly one public method with this name.
    #[serde(default)]
    pub must_only_have_one_public_method_named: Option<String>,

    /// Explicit dependency whitelist for the unit.
    #[serde(default)]
    pub dependency_whitelist: Option<Vec<String>>,
}
