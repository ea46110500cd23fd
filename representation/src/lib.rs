mod query;
mod star_pattern;
mod term;
mod triple;

pub use query::{Query, UnionBranch};
pub use star_pattern::{StarPattern, StarPatternEntry};
pub use term::Term;
pub use triple::Triple;

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDF_FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
pub const RDF_REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
pub const RDF_NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
