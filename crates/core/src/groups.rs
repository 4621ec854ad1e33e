use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VertexGroup {
    name: String,
    weights: BTreeMap<usize, f32>,
}

impl VertexGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weights: BTreeMap::new(),
        }
    }

    pub fn with_weights(
        name: impl Into<String>,
        weights: impl IntoIterator<Item = (usize, f32)>,
    ) -> Self {
        Self {
            name: name.into(),
            weights: weights.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self, vertex: usize) -> Option<f32> {
        self.weights.get(&vertex).copied()
    }

    pub fn weight_or_zero(&self, vertex: usize) -> f32 {
        self.weight(vertex).unwrap_or(0.0)
    }

    pub fn assign(&mut self, vertex: usize, weight: f32) {
        self.weights.insert(vertex, weight);
    }

    pub fn remove(&mut self, vertex: usize) -> bool {
        self.weights.remove(&vertex).is_some()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.weights.iter().map(|(vertex, weight)| (*vertex, *weight))
    }
}

pub trait VertexGroupSink {
    fn has_channel(&self, name: &str) -> bool;

    /// Creates the channel if absent. Returns `true` when it was created.
    fn ensure_channel(&mut self, name: &str) -> bool;

    fn set_weight(&mut self, vertex: usize, channel: &str, weight: f32);

    /// Removes the assignment of `vertex` in `channel`. Returns `true` when an
    /// assignment existed.
    fn remove_weight(&mut self, vertex: usize, channel: &str) -> bool;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexGroups {
    groups: Vec<VertexGroup>,
    lookup: HashMap<String, usize>,
}

impl VertexGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&VertexGroup> {
        self.lookup.get(name).map(|idx| &self.groups[*idx])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut VertexGroup> {
        let idx = *self.lookup.get(name)?;
        self.groups.get_mut(idx)
    }

    pub fn insert(&mut self, group: VertexGroup) -> Result<(), VertexGroup> {
        if self.lookup.contains_key(group.name()) {
            return Err(group);
        }
        self.lookup.insert(group.name().to_string(), self.groups.len());
        self.groups.push(group);
        Ok(())
    }

    pub fn weight(&self, vertex: usize, name: &str) -> Option<f32> {
        self.get(name).and_then(|group| group.weight(vertex))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.groups.iter().map(VertexGroup::name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VertexGroup> {
        self.groups.iter()
    }

    pub fn into_vec(self) -> Vec<VertexGroup> {
        self.groups
    }
}

impl<'a> IntoIterator for &'a VertexGroups {
    type Item = &'a VertexGroup;
    type IntoIter = std::slice::Iter<'a, VertexGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

impl VertexGroupSink for VertexGroups {
    fn has_channel(&self, name: &str) -> bool {
        self.contains(name)
    }

    fn ensure_channel(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.lookup.insert(name.to_string(), self.groups.len());
        self.groups.push(VertexGroup::new(name));
        true
    }

    fn set_weight(&mut self, vertex: usize, channel: &str, weight: f32) {
        if let Some(group) = self.get_mut(channel) {
            group.assign(vertex, weight);
        } else {
            tracing::warn!("set_weight on missing vertex group '{}'", channel);
        }
    }

    fn remove_weight(&mut self, vertex: usize, channel: &str) -> bool {
        self.get_mut(channel)
            .is_some_and(|group| group.remove(vertex))
    }
}
