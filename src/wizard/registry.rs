use std::collections::{BTreeMap, HashMap, HashSet};

use crate::errors::ConfigurationError;

use super::step::{StepDefinition, StepId};
use super::values::{FieldPath, FormValues};

/// Ordered, validated list of step definitions.
#[derive(Debug, Clone)]
pub struct StepRegistry {
    steps: Vec<StepDefinition>,
}

impl StepRegistry {
    /// Checks the definitions and sorts them by `order`.
    ///
    /// Ids, orders and field keys must be unique across steps, and every field key must be
    /// a well-formed dot path. No key may sit under another (`contact` and `contact.email`),
    /// since writing the nested one would replace the other's value.
    pub fn register(mut steps: Vec<StepDefinition>) -> Result<Self, ConfigurationError> {
        check_definitions(&steps)?;
        steps.sort_by_key(StepDefinition::order);
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, id: &StepId) -> Option<&StepDefinition> {
        self.steps.iter().find(|step| step.id() == id)
    }

    pub fn contains(&self, id: &StepId) -> bool {
        self.step(id).is_some()
    }

    /// Steps whose predicate holds for `values`, in `order`.
    pub fn visible_steps(&self, values: &FormValues) -> Vec<&StepDefinition> {
        self.steps
            .iter()
            .filter(|step| step.is_visible(values))
            .collect()
    }

    pub fn index_of(step_id: &StepId, visible: &[&StepDefinition]) -> Option<usize> {
        visible.iter().position(|step| step.id() == step_id)
    }
}

fn check_definitions(steps: &[StepDefinition]) -> Result<(), ConfigurationError> {
    if steps.is_empty() {
        return Err(ConfigurationError::NoSteps);
    }

    let mut ids: HashSet<&StepId> = HashSet::new();
    let mut orders: BTreeMap<u32, &StepId> = BTreeMap::new();
    let mut fields: HashMap<&str, &StepId> = HashMap::new();

    for step in steps {
        if step.id().as_str().trim().is_empty() {
            return Err(ConfigurationError::EmptyStepId);
        }
        if !ids.insert(step.id()) {
            return Err(ConfigurationError::DuplicateStepId(step.id().clone()));
        }
        if let Some(first) = orders.insert(step.order(), step.id()) {
            return Err(ConfigurationError::DuplicateOrder {
                order: step.order(),
                first: first.clone(),
                second: step.id().clone(),
            });
        }
        for field in step.fields() {
            if FieldPath::parse(field.key).is_err() {
                return Err(ConfigurationError::InvalidFieldPath {
                    step: step.id().clone(),
                    path: field.key.to_string(),
                });
            }
            if let Some(first) = fields.get(field.key) {
                return Err(ConfigurationError::DuplicateField {
                    field: field.key.to_string(),
                    first: (*first).clone(),
                    second: step.id().clone(),
                });
            }
            for (existing, owner) in &fields {
                let (parent, nested) = if is_nested_under(field.key, existing) {
                    (*existing, field.key)
                } else if is_nested_under(existing, field.key) {
                    (field.key, *existing)
                } else {
                    continue;
                };
                return Err(ConfigurationError::OverlappingField {
                    parent: parent.to_string(),
                    nested: nested.to_string(),
                    first: (*owner).clone(),
                    second: step.id().clone(),
                });
            }
            fields.insert(field.key, step.id());
        }
    }
    Ok(())
}

fn is_nested_under(key: &str, parent: &str) -> bool {
    key.strip_prefix(parent)
        .is_some_and(|rest| rest.starts_with('.'))
}
