//! Engine-agnostic query tree.
//!
//! The compiler produces one [`QueryNode`] per request; the gateway lowers it
//! to the engine's own query language. The two free-text ranking laws are
//! explicit variants ([`QueryNode::SumOfShould`] and
//! [`QueryNode::BestBranch`]) rather than inline scoring, so they cannot be
//! conflated.

/// A literal value compared against a raw (untokenized) field.
#[derive(Debug, Clone, PartialEq)]
pub enum TermValue {
    Text(String),
    Int(i64),
}

/// One node of a compiled query tree.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    /// Matches every document, without ranking.
    All,

    /// Exact term comparison against a raw field. Case folding has already
    /// been applied by the compiler.
    Term {
        field: &'static str,
        value: TermValue,
        boost: Option<f32>,
    },

    /// Edit-distance-tolerant text match; tolerance scales with token
    /// length. Malformed or empty input lowers to a no-match clause instead
    /// of failing the query.
    Fuzzy {
        field: &'static str,
        text: String,
        boost: Option<f32>,
    },

    /// At least one of the supplied values present in an array field.
    AnyOf {
        field: &'static str,
        values: Vec<TermValue>,
        boost: Option<f32>,
    },

    /// Every supplied value present in the document's array field
    /// (set containment, order-insensitive).
    AllOf {
        field: &'static str,
        values: Vec<TermValue>,
    },

    /// Conjunction; every child must hold.
    And(Vec<QueryNode>),

    /// Disjunction where a document's score is the sum of every satisfied
    /// branch's score.
    SumOfShould {
        branches: Vec<QueryNode>,
        boost: Option<f32>,
    },

    /// Disjunction where a document's score is its best branch's score plus
    /// `tie_breaker` times the sum of the other satisfied branches.
    BestBranch {
        branches: Vec<QueryNode>,
        tie_breaker: f32,
    },
}

/// Result page requested from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Page {
    pub fn first(limit: usize) -> Self {
        Self { limit, offset: 0 }
    }
}
