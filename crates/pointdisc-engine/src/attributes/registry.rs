use std::collections::BTreeMap;

use crate::accessor::AccessorSet;

use super::{Attribute, AttributeSpec};

/// Name-keyed set of per-instance attributes.
///
/// Adding or removing an attribute is a map operation; the surrounding code
/// never changes shape when the attribute set does. Iteration order is the
/// sorted attribute name, so buffer binding order is stable across frames.
#[derive(Debug)]
pub struct AttributeRegistry<R> {
    attributes: BTreeMap<String, Attribute<R>>,
    instance_count: usize,
}

impl<R> Default for AttributeRegistry<R> {
    fn default() -> Self {
        Self { attributes: BTreeMap::new(), instance_count: 0 }
    }
}

impl<R> AttributeRegistry<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers attributes and marks them dirty.
    ///
    /// Buffers are allocated for the last known instance count. Re-adding an
    /// existing name replaces it.
    pub fn add<N>(&mut self, specs: impl IntoIterator<Item = (N, AttributeSpec<R>)>)
    where
        N: Into<String>,
    {
        for (name, spec) in specs {
            let name = name.into();
            log::debug!("attribute `{name}` added ({spec:?})");
            let attr = Attribute::new(name.clone(), spec, self.instance_count);
            self.attributes.insert(name, attr);
        }
    }

    /// Deregisters attributes and drops their buffers. Absent names are ignored.
    pub fn remove<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        for name in names {
            if self.attributes.remove(name).is_some() {
                log::debug!("attribute `{name}` removed");
            }
        }
    }

    /// Marks every attribute dirty without resizing or removing anything.
    pub fn invalidate_all(&mut self) {
        for attr in self.attributes.values_mut() {
            attr.mark_dirty();
        }
    }

    /// Marks one attribute dirty. Returns `false` if it is not registered.
    pub fn invalidate(&mut self, name: &str) -> bool {
        match self.attributes.get_mut(name) {
            Some(attr) => {
                attr.mark_dirty();
                true
            }
            None => {
                log::debug!("invalidate: unknown attribute `{name}`");
                false
            }
        }
    }

    /// Recomputes every dirty attribute over the full dataset.
    ///
    /// Each attribute is handled independently: a compute function that
    /// produces a malformed buffer leaves only its own attribute stale and
    /// dirty. Returns the names that were rebuilt; a call with nothing dirty
    /// returns an empty list and touches no buffer.
    pub fn recompute_dirty(&mut self, data: &[R], accessors: &AccessorSet<R>) -> Vec<String> {
        self.instance_count = data.len();

        let mut updated = Vec::new();
        for attr in self.attributes.values_mut().filter(|a| a.is_dirty()) {
            if attr.recompute(data, accessors) {
                updated.push(attr.name().to_owned());
            }
        }

        if !updated.is_empty() {
            log::debug!("recomputed {:?} for {} instances", updated, data.len());
        }
        updated
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Attribute<R>> {
        self.attributes.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Attributes in binding order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Attribute<R>> {
        self.attributes.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Dataset size seen by the last recompute.
    #[inline]
    pub fn instance_count(&self) -> usize {
        self.instance_count
    }

    #[inline]
    pub fn any_dirty(&self) -> bool {
        self.attributes.values().any(|a| a.is_dirty())
    }
}
