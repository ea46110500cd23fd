use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathEntry {
    Bgp,
    Path,
    JoinLeftSide,
    JoinRightSide,
    LeftJoinLeftSide,
    LeftJoinRightSide,
    UnionBranch(usize),
    MinusLeftSide,
    MinusRightSide,
    FilterInner,
    GraphInner,
    ExtendInner,
    OrderByInner,
    ProjectInner,
    DistinctInner,
    ReducedInner,
    SliceInner,
    GroupInner,
}

impl Display for PathEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PathEntry::Bgp => write!(f, "BGP"),
            PathEntry::Path => write!(f, "Path"),
            PathEntry::JoinLeftSide => write!(f, "JoinLeftSide"),
            PathEntry::JoinRightSide => write!(f, "JoinRightSide"),
            PathEntry::LeftJoinLeftSide => write!(f, "LeftJoinLeftSide"),
            PathEntry::LeftJoinRightSide => write!(f, "LeftJoinRightSide"),
            PathEntry::UnionBranch(i) => write!(f, "UnionBranch{}", i),
            PathEntry::MinusLeftSide => write!(f, "MinusLeftSide"),
            PathEntry::MinusRightSide => write!(f, "MinusRightSide"),
            PathEntry::FilterInner => write!(f, "FilterInner"),
            PathEntry::GraphInner => write!(f, "GraphInner"),
            PathEntry::ExtendInner => write!(f, "ExtendInner"),
            PathEntry::OrderByInner => write!(f, "OrderByInner"),
            PathEntry::ProjectInner => write!(f, "ProjectInner"),
            PathEntry::DistinctInner => write!(f, "DistinctInner"),
            PathEntry::ReducedInner => write!(f, "ReducedInner"),
            PathEntry::SliceInner => write!(f, "SliceInner"),
            PathEntry::GroupInner => write!(f, "GroupInner"),
        }
    }
}

/// Position of a graph pattern inside the query algebra, root first.
#[derive(Debug, Clone, Default)]
pub struct Context {
    string_rep: String,
    path: Vec<PathEntry>,
}

impl Context {
    pub fn new() -> Context {
        Context::default()
    }

    pub fn as_str(&self) -> &str {
        &self.string_rep
    }

    pub fn extension_with(&self, p: PathEntry) -> Context {
        let mut path = self.path.clone();
        let string_rep = if self.string_rep.is_empty() {
            p.to_string()
        } else {
            format!("{}_{}", self.string_rep, p)
        };
        path.push(p);
        Context { string_rep, path }
    }

    /// Inside the optional side of a left join.
    pub fn in_optional(&self) -> bool {
        self.path.contains(&PathEntry::LeftJoinRightSide)
    }
}
