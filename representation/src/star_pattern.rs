use crate::triple::Triple;
use indexmap::IndexMap;
use log::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarPatternEntry {
    pub triple: Triple,
    /// Name of the star pattern whose subject is this triple's object.
    pub dependency: Option<String>,
}

/// Triples sharing one subject, keyed by predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarPattern {
    pub name: String,
    pub is_variable: bool,
    pub entries: IndexMap<String, StarPatternEntry>,
}

impl StarPattern {
    pub fn new(name: impl Into<String>, is_variable: bool) -> StarPattern {
        StarPattern {
            name: name.into(),
            is_variable,
            entries: IndexMap::new(),
        }
    }

    /// Adds a triple. A second triple with the same predicate replaces the first.
    pub fn insert(&mut self, triple: Triple, dependency: Option<String>) {
        let predicate = triple.predicate.clone();
        if let Some(previous) = self
            .entries
            .insert(predicate, StarPatternEntry { triple, dependency })
        {
            warn!(
                "Star pattern {} already had a triple for predicate {}, replacing {}",
                self.name, previous.triple.predicate, previous.triple
            );
        }
    }

    pub fn with_triple(mut self, triple: Triple, dependency: Option<&str>) -> StarPattern {
        self.insert(triple, dependency.map(|d| d.to_string()));
        self
    }

    pub fn get(&self, predicate: &str) -> Option<&StarPatternEntry> {
        self.entries.get(predicate)
    }

    pub fn triples(&self) -> impl Iterator<Item = &Triple> {
        self.entries.values().map(|e| &e.triple)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A new star pattern holding this pattern's triples followed by `other`'s.
    /// On shared predicates, `other` wins.
    pub fn merged_with(&self, other: &StarPattern) -> StarPattern {
        let mut entries = self.entries.clone();
        for (p, e) in &other.entries {
            entries.insert(p.clone(), e.clone());
        }
        StarPattern {
            name: self.name.clone(),
            is_variable: self.is_variable,
            entries,
        }
    }
}
