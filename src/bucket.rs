//! Ordered, duplicate-free list of item names assigned to one category.

use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bucket {
    names: Vec<String>,
    members: HashSet<String>,
}

impl Bucket {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from names, dropping repeats but keeping first-seen order.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut bucket = Self::new();
        for name in names {
            bucket.push(name.as_ref());
        }
        bucket
    }

    /// Append `name` unless already present. Returns whether it was added.
    pub fn push(&mut self, name: &str) -> bool {
        if self.members.contains(name) {
            return false;
        }
        self.members.insert(name.to_string());
        self.names.push(name.to_string());
        true
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.members.contains(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn into_names(self) -> Vec<String> {
        self.names
    }

    /// Keep only the first `len` names.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.names.len() {
            return;
        }
        for dropped in self.names.drain(len..) {
            self.members.remove(&dropped);
        }
    }
}
