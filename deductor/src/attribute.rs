//! Attribute descriptors
//!
//! One descriptor per named quantity of a schema. Every kind other than
//! `Base` implies derivation rules that link it to the attributes it is
//! defined from.

use crate::rule::{DerivationRule, Formula, Names};
use serde::Serialize;

/// Group tag automatically attached to stored attributes
pub const BASE_GROUP: &str = "base";

/// How an attribute obtains its value
#[derive(Debug, Clone)]
pub enum AttributeKind {
    /// Stored directly on the model
    Base { default: Option<f64> },
    /// Recomputed from other attributes on every read
    Derived { inputs: Vec<String>, formula: Formula },
    /// 1:1 synonym of another attribute
    Alias { target: String },
    /// Equal to `scale * target`
    ScaledAlias { scale: f64, target: String },
}

impl AttributeKind {
    pub fn name(&self) -> &'static str {
        match self {
            AttributeKind::Base { .. } => "base",
            AttributeKind::Derived { .. } => "derived",
            AttributeKind::Alias { .. } => "alias",
            AttributeKind::ScaledAlias { .. } => "scaled alias",
        }
    }
}

/// Schema entry describing one named quantity
#[derive(Debug, Clone)]
pub struct Attribute {
    name: String,
    units: Option<String>,
    description: Option<String>,
    groups: Vec<String>,
    kind: AttributeKind,
}

impl Attribute {
    fn with_kind(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            units: None,
            description: None,
            groups: Vec::new(),
            kind,
        }
    }

    /// A stored attribute, tagged with the `base` group
    pub fn base(name: impl Into<String>) -> Self {
        Self::with_kind(name, AttributeKind::Base { default: None }).with_group(BASE_GROUP)
    }

    /// A read-only attribute computed from `inputs`
    pub fn derived(name: impl Into<String>, inputs: impl Names, formula: Formula) -> Self {
        Self::with_kind(
            name,
            AttributeKind::Derived {
                inputs: inputs.into_names(),
                formula,
            },
        )
    }

    /// A synonym of `target`
    ///
    /// Units and description default to those of the target.
    pub fn alias(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            AttributeKind::Alias {
                target: target.into(),
            },
        )
    }

    /// An attribute equal to `scale * target`
    pub fn scaled(name: impl Into<String>, scale: f64, target: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            AttributeKind::ScaledAlias {
                scale,
                target: target.into(),
            },
        )
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a group tag
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        let group = group.into();
        if !self.groups.contains(&group) {
            self.groups.push(group);
        }
        self
    }

    /// Add several group tags
    pub fn with_groups(self, groups: impl Names) -> Self {
        groups
            .into_names()
            .into_iter()
            .fold(self, |attr, group| attr.with_group(group))
    }

    /// Value stored when deduction leaves a base attribute unknown
    ///
    /// Has no effect on other kinds.
    pub fn with_default(mut self, value: f64) -> Self {
        if let AttributeKind::Base { default } = &mut self.kind {
            *default = Some(value);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Default of a base attribute, if any
    pub fn base_default(&self) -> Option<f64> {
        match self.kind {
            AttributeKind::Base { default } => default,
            _ => None,
        }
    }

    pub fn kind(&self) -> &AttributeKind {
        &self.kind
    }

    pub fn is_base(&self) -> bool {
        matches!(self.kind, AttributeKind::Base { .. })
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }

    /// Names this attribute is defined from
    pub fn dependencies(&self) -> Vec<&str> {
        match &self.kind {
            AttributeKind::Base { .. } => Vec::new(),
            AttributeKind::Derived { inputs, .. } => inputs.iter().map(String::as_str).collect(),
            AttributeKind::Alias { target } | AttributeKind::ScaledAlias { target, .. } => {
                vec![target.as_str()]
            }
        }
    }

    /// Rules linking this attribute to its dependencies
    pub fn implied_rules(&self) -> Vec<DerivationRule> {
        match &self.kind {
            AttributeKind::Base { .. } => Vec::new(),
            AttributeKind::Derived { inputs, formula } => vec![DerivationRule::new(
                self.name.as_str(),
                inputs.clone(),
                formula.clone(),
            )
            .labeled(format!("{} = f({})", self.name, inputs.join(", ")))],
            AttributeKind::Alias { target } => vec![
                DerivationRule::new(self.name.as_str(), target.as_str(), Formula::identity())
                    .labeled(format!("{} = {}", self.name, target)),
                DerivationRule::new(target.as_str(), self.name.as_str(), Formula::identity())
                    .labeled(format!("{} = {}", target, self.name)),
            ],
            AttributeKind::ScaledAlias { scale, target } => {
                let scale = *scale;
                vec![
                    DerivationRule::new(self.name.as_str(), target.as_str(), Formula::scale(scale))
                        .labeled(format!("{} = {} * {}", self.name, scale, target)),
                    DerivationRule::new(
                        target.as_str(),
                        self.name.as_str(),
                        Formula::scalar(move |[x]| x / scale),
                    )
                    .labeled(format!("{} = {} / {}", target, self.name, scale)),
                ]
            }
        }
    }

    /// Fill missing units and description from the alias target
    pub(crate) fn inherit_metadata(&mut self, target: &Attribute) {
        if self.units.is_none() {
            self.units = target.units.clone();
        }
        if self.description.is_none() {
            self.description = target.description.clone();
        }
    }

    pub fn summary(&self) -> AttributeSummary {
        AttributeSummary {
            name: self.name.clone(),
            kind: self.kind.name(),
            units: self.units.clone(),
            description: self.description.clone(),
            groups: self.groups.clone(),
            depends_on: self.dependencies().into_iter().map(String::from).collect(),
        }
    }
}

/// Serializable description of an attribute, for listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeSummary {
    pub name: String,
    pub kind: &'static str,
    pub units: Option<String>,
    pub description: Option<String>,
    pub groups: Vec<String>,
    pub depends_on: Vec<String>,
}
