//! Derived values: pure functions of the form values, recomputed on every read.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::values::FormValues;

/// A value computed from other fields rather than entered by the user.
pub trait DerivedField: Send + Sync {
    fn key(&self) -> &str;

    fn compute(&self, values: &FormValues) -> Value;
}

/// What to count in the source field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Words,
    Characters,
    Items,
}

impl Quantity {
    pub fn count(self, value: Option<&Value>) -> usize {
        match (self, value) {
            (Quantity::Words, Some(Value::String(text))) => text.split_whitespace().count(),
            (Quantity::Characters, Some(Value::String(text))) => text.trim().chars().count(),
            (Quantity::Items, Some(Value::Array(items))) => items.len(),
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceTier {
    /// Inclusive upper bound of the tier.
    pub up_to: usize,
    pub price: u64,
}

/// Tiered pricing by a counted quantity: the first tier whose `up_to` is >= the count
/// wins, anything above the last tier costs `overflow`.
#[derive(Debug, Clone)]
pub struct TieredPrice {
    key: String,
    source: String,
    quantity: Quantity,
    tiers: Vec<PriceTier>,
    overflow: u64,
}

impl TieredPrice {
    pub fn new(
        key: impl Into<String>,
        source: impl Into<String>,
        quantity: Quantity,
        overflow: u64,
    ) -> Self {
        Self {
            key: key.into(),
            source: source.into(),
            quantity,
            tiers: Vec::new(),
            overflow,
        }
    }

    pub fn tier(mut self, up_to: usize, price: u64) -> Self {
        self.tiers.push(PriceTier { up_to, price });
        self.tiers.sort_by_key(|tier| tier.up_to);
        self
    }

    pub fn price_for(&self, count: usize) -> u64 {
        self.tiers
            .iter()
            .find(|tier| count <= tier.up_to)
            .map_or(self.overflow, |tier| tier.price)
    }

    pub fn count(&self, values: &FormValues) -> usize {
        self.quantity.count(values.get(&self.source))
    }

    pub fn price(&self, values: &FormValues) -> u64 {
        self.price_for(self.count(values))
    }
}

impl DerivedField for TieredPrice {
    fn key(&self) -> &str {
        &self.key
    }

    fn compute(&self, values: &FormValues) -> Value {
        Value::from(self.price(values))
    }
}

type DeriveCallback = dyn Fn(&FormValues) -> Value + Send + Sync;

/// Derived field backed by a closure.
#[derive(Clone)]
pub struct DerivedFn {
    key: String,
    compute: Arc<DeriveCallback>,
}

impl DerivedFn {
    pub fn new<F>(key: impl Into<String>, compute: F) -> Self
    where
        F: Fn(&FormValues) -> Value + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            compute: Arc::new(compute),
        }
    }

    /// Count of `quantity` in `source`.
    pub fn count(key: impl Into<String>, source: &'static str, quantity: Quantity) -> Self {
        Self::new(key, move |values| Value::from(quantity.count(values.get(source))))
    }
}

impl DerivedField for DerivedFn {
    fn key(&self) -> &str {
        &self.key
    }

    fn compute(&self, values: &FormValues) -> Value {
        (self.compute)(values)
    }
}

impl fmt::Debug for DerivedFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedFn").field("key", &self.key).finish()
    }
}

/// The set of derived fields attached to a wizard.
#[derive(Default, Clone)]
pub struct DerivedCalculator {
    fields: Vec<Arc<dyn DerivedField>>,
}

impl DerivedCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl DerivedField + 'static) {
        self.fields.push(Arc::new(field));
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.key())
    }

    pub fn recompute(&self, values: &FormValues) -> BTreeMap<String, Value> {
        self.fields
            .iter()
            .map(|field| (field.key().to_string(), field.compute(values)))
            .collect()
    }

    pub fn value(&self, key: &str, values: &FormValues) -> Option<Value> {
        self.fields
            .iter()
            .find(|field| field.key() == key)
            .map(|field| field.compute(values))
    }
}

impl fmt::Debug for DerivedCalculator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}
