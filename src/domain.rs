//! Search domains: the server's prefix-notation filter expressions.
//!
//! A domain is a flat sequence of terms. A term is either a leaf condition
//! `(field, operator, value)` or one of the logical operators `&`, `|`
//! (binary) and `!` (unary), which apply to the terms that follow them in
//! Polish notation. Adjacent expressions without an explicit operator are
//! AND-ed by the server.
//!
//! ```
//! use odoo_connector::Domain;
//!
//! // type = 'lead' AND (stage = 'New' OR stage = 'Qualified')
//! let domain = Domain::new()
//!     .filter("type", "=", "lead")
//!     .or()
//!     .filter("stage_id.name", "=", "New")
//!     .filter("stage_id.name", "=", "Qualified");
//! assert_eq!(domain.terms().len(), 4);
//! ```
//!
//! The client never interprets operators or checks arity; terms are sent in
//! exactly the order they were added. Common operators are `=`, `!=`, `>`,
//! `>=`, `<`, `<=`, `like`, `ilike`, `in`, `not in`, `child_of` and
//! `parent_of`.

use crate::value::Value;

/// One element of a domain.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// `(field, operator, value)` condition. `field` may be a dotted path.
    Leaf {
        field: String,
        operator: String,
        value: Value,
    },
    /// `&`, consumes the next two expressions.
    And,
    /// `|`, consumes the next two expressions.
    Or,
    /// `!`, consumes the next expression.
    Not,
    /// The always-true leaf `(1, '=', 1)`.
    True,
    /// The always-false leaf `(0, '=', 1)`.
    False,
}

impl Term {
    pub fn leaf(field: impl Into<String>, operator: impl Into<String>, value: impl Into<Value>) -> Self {
        Term::Leaf {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// Number of expressions this term consumes.
    fn arity(&self) -> usize {
        match self {
            Term::And | Term::Or => 2,
            Term::Not => 1,
            _ => 0,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Term::Leaf {
                field,
                operator,
                value,
            } => Value::Array(vec![
                Value::String(field.clone()),
                Value::String(operator.clone()),
                value.clone(),
            ]),
            Term::And => Value::from("&"),
            Term::Or => Value::from("|"),
            Term::Not => Value::from("!"),
            Term::True => Value::Array(vec![Value::Int(1), Value::from("="), Value::Int(1)]),
            Term::False => Value::Array(vec![Value::Int(0), Value::from("="), Value::Int(1)]),
        }
    }
}

/// An ordered filter expression. The empty domain matches every record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Domain {
    terms: Vec<Term>,
}

impl Domain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_terms(terms: Vec<Term>) -> Self {
        Self { terms }
    }

    /// Append a leaf condition.
    pub fn filter(
        mut self,
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.terms.push(Term::leaf(field, operator, value));
        self
    }

    /// Append `&`.
    pub fn and(mut self) -> Self {
        self.terms.push(Term::And);
        self
    }

    /// Append `|`.
    pub fn or(mut self) -> Self {
        self.terms.push(Term::Or);
        self
    }

    /// Append `!`.
    pub fn not(mut self) -> Self {
        self.terms.push(Term::Not);
        self
    }

    pub fn push(&mut self, term: Term) {
        self.terms.push(term);
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Rewrite the domain as a single prefix expression by making the
    /// server's implicit ANDs explicit.
    ///
    /// An empty domain becomes `[True]`.
    pub fn normalize(&self) -> Domain {
        if self.terms.is_empty() {
            return Domain::from_terms(vec![Term::True]);
        }

        let mut result = Vec::with_capacity(self.terms.len());
        let mut expected = 1usize;
        for term in &self.terms {
            if expected == 0 {
                result.insert(0, Term::And);
                expected = 1;
            }
            // A leaf satisfies one pending slot, an operator opens `arity - 1` more.
            expected = expected + term.arity() - 1;
            result.push(term.clone());
        }
        Domain::from_terms(result)
    }

    /// AND of all given domains. Empty domains are skipped.
    pub fn all(domains: impl IntoIterator<Item = Domain>) -> Domain {
        Self::combine(Term::And, Term::True, domains)
    }

    /// OR of all given domains. An empty domain matches everything, so it
    /// makes the whole result `[True]`.
    pub fn any(domains: impl IntoIterator<Item = Domain>) -> Domain {
        Self::combine(Term::Or, Term::False, domains)
    }

    fn combine(operator: Term, unit: Term, domains: impl IntoIterator<Item = Domain>) -> Domain {
        let mut body = Vec::new();
        let mut count = 0usize;

        for domain in domains {
            if domain.is_empty() {
                if operator == Term::And {
                    continue;
                }
                return Domain::from_terms(vec![Term::True]);
            }
            body.extend(domain.normalize().terms);
            count += 1;
        }

        if count == 0 {
            return Domain::from_terms(vec![unit]);
        }

        let mut terms = vec![operator; count - 1];
        terms.extend(body);
        Domain::from_terms(terms)
    }

    /// Wire form: an array of terms.
    pub fn to_value(&self) -> Value {
        Value::Array(self.terms.iter().map(Term::to_value).collect())
    }
}

impl From<Domain> for Value {
    fn from(domain: Domain) -> Self {
        domain.to_value()
    }
}

impl From<Vec<Term>> for Domain {
    fn from(terms: Vec<Term>) -> Self {
        Domain::from_terms(terms)
    }
}
