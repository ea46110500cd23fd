use crate::term::Term;
use crate::RDF_TYPE;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: Term,
    pub is_optional: bool,
}

impl Triple {
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: Term) -> Triple {
        Triple {
            subject: subject.into(),
            predicate: predicate.into(),
            object,
            is_optional: false,
        }
    }

    pub fn new_optional(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: Term,
    ) -> Triple {
        Triple {
            is_optional: true,
            ..Triple::new(subject, predicate, object)
        }
    }

    pub fn is_rdf_type(&self) -> bool {
        self.predicate == RDF_TYPE
    }
}

impl Display for Triple {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}> {}", self.subject, self.predicate, self.object)?;
        if self.is_optional {
            write!(f, " (optional)")?;
        }
        Ok(())
    }
}
