use oxrdf::{BlankNode, Literal, NamedNode, NamedNodeRef, Variable};
use std::fmt::{Display, Formatter};

/// The object position of a [`crate::Triple`].
///
/// Query triples may carry variables, so this is wider than an RDF term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    NamedNode(NamedNode),
    BlankNode(BlankNode),
    Literal(Literal),
    Variable(Variable),
}

impl Term {
    pub fn named_node(iri: impl Into<String>) -> Term {
        Term::NamedNode(NamedNode::new_unchecked(iri))
    }

    pub fn blank_node(id: impl Into<String>) -> Term {
        Term::BlankNode(BlankNode::new_unchecked(id))
    }

    pub fn variable(name: impl Into<String>) -> Term {
        Term::Variable(Variable::new_unchecked(name))
    }

    pub fn simple_literal(value: impl Into<String>) -> Term {
        Term::Literal(Literal::new_simple_literal(value))
    }

    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Term {
        Term::Literal(Literal::new_typed_literal(
            value,
            NamedNode::new_unchecked(datatype),
        ))
    }

    pub fn language_literal(value: impl Into<String>, language: impl Into<String>) -> Term {
        Term::Literal(Literal::new_language_tagged_literal_unchecked(
            value, language,
        ))
    }

    pub fn as_named_node(&self) -> Option<&NamedNode> {
        if let Term::NamedNode(nn) = self {
            Some(nn)
        } else {
            None
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        if let Term::Literal(l) = self {
            Some(l)
        } else {
            None
        }
    }

    /// Datatype IRI when the term is a literal.
    pub fn datatype(&self) -> Option<NamedNodeRef<'_>> {
        self.as_literal().map(|l| l.datatype())
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }

    /// Name under which a star pattern for this term would be registered.
    ///
    /// Literals can never be the subject of a star pattern.
    pub fn star_pattern_name(&self) -> Option<String> {
        match self {
            Term::NamedNode(nn) => Some(nn.as_str().to_string()),
            Term::BlankNode(bn) => Some(format!("_:{}", bn.as_str())),
            Term::Variable(v) => Some(v.as_str().to_string()),
            Term::Literal(_) => None,
        }
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::NamedNode(nn) => write!(f, "{}", nn),
            Term::BlankNode(bn) => write!(f, "{}", bn),
            Term::Literal(l) => write!(f, "{}", l),
            Term::Variable(v) => write!(f, "{}", v),
        }
    }
}

impl From<NamedNode> for Term {
    fn from(nn: NamedNode) -> Self {
        Term::NamedNode(nn)
    }
}

impl From<Literal> for Term {
    fn from(l: Literal) -> Self {
        Term::Literal(l)
    }
}

impl From<BlankNode> for Term {
    fn from(bn: BlankNode) -> Self {
        Term::BlankNode(bn)
    }
}

impl From<Variable> for Term {
    fn from(v: Variable) -> Self {
        Term::Variable(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_pattern_name() {
        assert_eq!(Term::variable("x").star_pattern_name(), Some("x".to_string()));
        assert_eq!(
            Term::blank_node("b0").star_pattern_name(),
            Some("_:b0".to_string())
        );
        assert_eq!(
            Term::named_node("http://example.com/a").star_pattern_name(),
            Some("http://example.com/a".to_string())
        );
        assert_eq!(Term::simple_literal("abc").star_pattern_name(), None);
    }

    #[test]
    fn test_literal_datatype() {
        let t = Term::typed_literal("1", "http://www.w3.org/2001/XMLSchema#integer");
        assert_eq!(
            t.datatype().map(|d| d.as_str().to_string()),
            Some("http://www.w3.org/2001/XMLSchema#integer".to_string())
        );
        assert!(Term::variable("x").datatype().is_none());
    }
}
