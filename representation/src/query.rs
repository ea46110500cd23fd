use crate::star_pattern::StarPattern;
use crate::triple::Triple;
use indexmap::{IndexMap, IndexSet};

/// Star patterns of one UNION branch, keyed by name.
pub type UnionBranch = IndexMap<String, StarPattern>;

/// A query flattened into star patterns.
///
/// Star patterns point at each other by name through
/// [`crate::StarPatternEntry::dependency`], so cyclic queries need no cyclic
/// ownership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub star_patterns: IndexMap<String, StarPattern>,
    /// One element per UNION, each holding one entry per branch.
    pub union: Vec<Vec<UnionBranch>>,
}

impl Query {
    pub fn new(star_patterns: IndexMap<String, StarPattern>, union: Vec<Vec<UnionBranch>>) -> Query {
        let mut q = Query {
            star_patterns,
            union,
        };
        q.link_dependencies();
        q
    }

    pub fn from_star_patterns(star_patterns: Vec<StarPattern>) -> Query {
        Query::new(
            star_patterns
                .into_iter()
                .map(|sp| (sp.name.clone(), sp))
                .collect(),
            vec![],
        )
    }

    pub fn with_union(mut self, branches: Vec<Vec<StarPattern>>) -> Query {
        self.union.push(
            branches
                .into_iter()
                .map(|b| b.into_iter().map(|sp| (sp.name.clone(), sp)).collect())
                .collect(),
        );
        self.link_dependencies();
        self
    }

    /// A star pattern outside of any UNION.
    pub fn main_star_pattern(&self, name: &str) -> Option<&StarPattern> {
        self.star_patterns.get(name)
    }

    /// Every UNION branch fragment registered under `name`, in declaration order.
    pub fn union_alternatives(&self, name: &str) -> Vec<&StarPattern> {
        self.union
            .iter()
            .flat_map(|u| u.iter())
            .filter_map(|branch| branch.get(name))
            .collect()
    }

    /// Main star patterns first, then names only found inside UNION branches.
    pub fn star_pattern_names(&self) -> IndexSet<&str> {
        let mut names: IndexSet<&str> = self.star_patterns.keys().map(|k| k.as_str()).collect();
        for u in &self.union {
            for branch in u {
                for k in branch.keys() {
                    names.insert(k.as_str());
                }
            }
        }
        names
    }

    pub fn contains_star_pattern(&self, name: &str) -> bool {
        self.star_patterns.contains_key(name) || !self.union_alternatives(name).is_empty()
    }

    /// Triples of each star pattern, UNION alternatives included.
    pub fn triples_by_subject(&self) -> IndexMap<&str, Vec<&Triple>> {
        let mut out: IndexMap<&str, Vec<&Triple>> = IndexMap::new();
        for name in self.star_pattern_names() {
            let mut triples = vec![];
            if let Some(sp) = self.star_patterns.get(name) {
                triples.extend(sp.triples());
            }
            for alt in self.union_alternatives(name) {
                triples.extend(alt.triples());
            }
            out.insert(name, triples);
        }
        out
    }

    /// Points every entry whose object names a known star pattern at it.
    /// Entries with an explicit dependency are left alone.
    fn link_dependencies(&mut self) {
        let main_names: IndexSet<String> = self.star_patterns.keys().cloned().collect();
        let mut union_names = IndexSet::new();
        for u in &self.union {
            for branch in u {
                union_names.extend(branch.keys().cloned());
            }
        }
        for sp in self.star_patterns.values_mut() {
            link_star_pattern(sp, |n| main_names.contains(n) || union_names.contains(n));
        }
        for u in self.union.iter_mut() {
            for branch in u.iter_mut() {
                let branch_names: IndexSet<String> = branch.keys().cloned().collect();
                for sp in branch.values_mut() {
                    link_star_pattern(sp, |n| branch_names.contains(n) || main_names.contains(n));
                }
            }
        }
    }
}

fn link_star_pattern(sp: &mut StarPattern, is_known: impl Fn(&str) -> bool) {
    for entry in sp.entries.values_mut() {
        if entry.dependency.is_some() {
            continue;
        }
        if let Some(name) = entry.triple.object.star_pattern_name() {
            if is_known(&name) {
                entry.dependency = Some(name);
            }
        }
    }
}
