//! Schema composition
//!
//! A schema is the fully resolved set of attributes, derivation rules and
//! validators of one model type. It is composed once, optionally on top of a
//! parent schema, and shared read-only by every model of that type.

use crate::attribute::{Attribute, AttributeKind};
use crate::rule::{DerivationRule, Formula};
use crate::{DeductorError, DeductorResult, Validator};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

const NAME_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9_]*$";

/// Check that a name is a valid attribute identifier
pub fn is_valid_name(name: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(NAME_PATTERN).expect("attribute name pattern is valid"))
        .is_match(name)
}

/// How a model reads and writes one attribute
///
/// Resolved once at composition time; indices refer to the schema's
/// attribute list, slots to the model's base storage.
#[derive(Debug, Clone)]
pub(crate) enum Accessor {
    Stored {
        slot: usize,
    },
    Computed {
        inputs: Vec<usize>,
        formula: Formula,
    },
    Alias {
        target: usize,
        settable: bool,
    },
    Scaled {
        scale: f64,
        target: usize,
        settable: bool,
    },
}

impl Accessor {
    fn is_settable(&self) -> bool {
        match self {
            Accessor::Stored { .. } => true,
            Accessor::Computed { .. } => false,
            Accessor::Alias { settable, .. } | Accessor::Scaled { settable, .. } => *settable,
        }
    }
}

/// The composed, immutable description of a model type
#[derive(Debug, Clone, Default)]
pub struct Schema {
    name: String,
    parent: Option<String>,
    attributes: Vec<Attribute>,
    accessors: Vec<Accessor>,
    index: HashMap<String, usize>,
    base_names: Vec<String>,
    rules: Vec<DerivationRule>,
    validators: Vec<Validator>,
    recognized: HashSet<String>,
}

impl Schema {
    /// Start building a schema
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    /// Compose a schema from a parent and the descriptors declared on top of it
    ///
    /// Inherited entries come first, then own entries in declaration order.
    /// Each attribute may only refer to attributes declared before it.
    pub fn compose(
        name: impl Into<String>,
        parent: Option<&Schema>,
        attributes: Vec<Attribute>,
        rules: Vec<DerivationRule>,
        validators: Vec<Validator>,
    ) -> DeductorResult<Schema> {
        let name = name.into();
        let mut schema = match parent {
            Some(parent) => Schema {
                name: name.clone(),
                parent: Some(parent.name.clone()),
                ..parent.clone()
            },
            None => Schema {
                name: name.clone(),
                ..Schema::default()
            },
        };

        let mut implied = Vec::new();
        for attribute in attributes {
            implied.extend(attribute.implied_rules());
            schema.add_attribute(attribute)?;
        }

        for rule in rules.into_iter().chain(implied) {
            rule.check_arity()?;
            schema.recognized.extend(rule.inputs().iter().cloned());
            schema.recognized.extend(rule.outputs().iter().cloned());
            schema.rules.push(rule);
        }

        for validator in validators {
            if let Some(missing) = validator
                .inputs()
                .iter()
                .find(|input| !schema.index.contains_key(input.as_str()))
            {
                return Err(DeductorError::schema(format!(
                    "{}: validator '{}' requires attribute '{}' to exist",
                    name,
                    validator.description(),
                    missing
                )));
            }
            schema.validators.push(validator);
        }

        tracing::debug!(
            schema = %schema.name,
            attributes = schema.attributes.len(),
            rules = schema.rules.len(),
            validators = schema.validators.len(),
            "composed schema"
        );

        Ok(schema)
    }

    fn add_attribute(&mut self, mut attribute: Attribute) -> DeductorResult<()> {
        let name = attribute.name().to_string();
        if !is_valid_name(&name) {
            return Err(DeductorError::schema(format!(
                "{}: attribute name '{}' must start with a letter and contain only letters, digits and underscores",
                self.name, name
            )));
        }
        if self.index.contains_key(&name) {
            return Err(DeductorError::schema(format!(
                "{}: duplicate attribute '{}'",
                self.name, name
            )));
        }

        let mut dependencies = Vec::new();
        for dependency in attribute.dependencies() {
            match self.index.get(dependency) {
                Some(&idx) => dependencies.push(idx),
                None => {
                    return Err(DeductorError::schema(format!(
                        "{}: {} attribute '{}' requires attribute '{}' to exist",
                        self.name,
                        attribute.kind().name(),
                        name,
                        dependency
                    )))
                }
            }
        }

        let accessor = match attribute.kind() {
            AttributeKind::Base { .. } => {
                self.base_names.push(name.clone());
                self.recognized.insert(name.clone());
                Accessor::Stored {
                    slot: self.base_names.len() - 1,
                }
            }
            AttributeKind::Derived { formula, .. } => {
                if formula.arity() != dependencies.len() || formula.outputs() != 1 {
                    return Err(DeductorError::schema(format!(
                        "{}: derived attribute '{}' declares {} inputs but its formula takes {} and returns {}",
                        self.name,
                        name,
                        dependencies.len(),
                        formula.arity(),
                        formula.outputs()
                    )));
                }
                Accessor::Computed {
                    inputs: dependencies,
                    formula: formula.clone(),
                }
            }
            AttributeKind::Alias { .. } => {
                let target = dependencies[0];
                attribute.inherit_metadata(&self.attributes[target]);
                Accessor::Alias {
                    target,
                    settable: self.accessors[target].is_settable(),
                }
            }
            AttributeKind::ScaledAlias { scale, .. } => {
                if !scale.is_finite() || *scale == 0.0 {
                    return Err(DeductorError::schema(format!(
                        "{}: scaled alias '{}' needs a finite non-zero scale, got {}",
                        self.name, name, scale
                    )));
                }
                let target = dependencies[0];
                Accessor::Scaled {
                    scale: *scale,
                    target,
                    settable: self.accessors[target].is_settable(),
                }
            }
        };

        self.index.insert(name, self.attributes.len());
        self.attributes.push(attribute);
        self.accessors.push(accessor);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the schema this one was composed on, if any
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// All attributes, inherited first
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Names of the stored attributes, in declaration order
    pub fn base_names(&self) -> &[String] {
        &self.base_names
    }

    /// Explicit and implied rules, in evaluation order
    pub fn rules(&self) -> &[DerivationRule] {
        &self.rules
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.index.get(name).map(|&idx| &self.attributes[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Attributes tagged with `group`
    pub fn attributes_by_group(&self, group: &str) -> Vec<&Attribute> {
        self.attributes
            .iter()
            .filter(|attr| attr.has_group(group))
            .collect()
    }

    /// Every name a seed may use: base attributes and all rule inputs and outputs
    pub fn recognized_names(&self) -> &HashSet<String> {
        &self.recognized
    }

    pub fn is_recognized(&self, name: &str) -> bool {
        self.recognized.contains(name)
    }

    /// Whether the attribute has a setter
    pub fn is_settable(&self, name: &str) -> bool {
        self.index
            .get(name)
            .is_some_and(|&idx| self.accessors[idx].is_settable())
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn accessor(&self, idx: usize) -> &Accessor {
        &self.accessors[idx]
    }
}

/// Incremental construction of a [`Schema`]
pub struct SchemaBuilder {
    name: String,
    parent: Option<Arc<Schema>>,
    attributes: Vec<Attribute>,
    rules: Vec<DerivationRule>,
    validators: Vec<Validator>,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            attributes: Vec::new(),
            rules: Vec::new(),
            validators: Vec::new(),
        }
    }

    /// Inherit everything declared by `parent`
    pub fn extends(mut self, parent: &Arc<Schema>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn rule(mut self, rule: DerivationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn build(self) -> DeductorResult<Arc<Schema>> {
        Schema::compose(
            self.name,
            self.parent.as_deref(),
            self.attributes,
            self.rules,
            self.validators,
        )
        .map(Arc::new)
    }
}
