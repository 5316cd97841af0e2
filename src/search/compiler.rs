//! Per-field matching strategies and query compilation.
//!
//! Each searchable field is statically bound to exactly one matching
//! strategy. The bindings are data ([`COURSE_FILTERS`], [`TIMETABLE_FILTERS`]):
//! adding a searchable field is a table row, not new control flow. The
//! free-text fan-out differs per entity (courses combine branches by
//! summed-OR, timetables by best-branch-plus-fraction) and both laws are
//! built here as explicit tree nodes.

use crate::error::{AppError, Result};
use crate::search::query::{QueryNode, TermValue};

/// Fixed result page size per search call.
pub const PAGE_SIZE: usize = 10;

/// Fraction of non-best branch scores added under the timetable free-text
/// ranking law.
const TIE_BREAKER: f32 = 0.7;

/// Case folding applied to a raw parameter before exact comparison.
#[derive(Debug, Clone, Copy)]
enum CaseFold {
    Upper,
    Lower,
    None,
}

impl CaseFold {
    fn apply(self, s: &str) -> String {
        match self {
            CaseFold::Upper => s.to_uppercase(),
            CaseFold::Lower => s.to_lowercase(),
            CaseFold::None => s.to_string(),
        }
    }
}

/// How a single searchable field turns an input value into a clause.
#[derive(Debug, Clone, Copy)]
enum Strategy {
    /// Case-folded exact-term match.
    Exact { fold: CaseFold },
    /// Approximate text match with length-scaled edit tolerance.
    FuzzyText,
    /// At least one element of an embedded list matches fuzzily; a
    /// list-valued parameter expands to one such clause per value.
    NestedFuzzy,
    /// Every supplied value present in a single array field occurrence.
    NestedAll,
}

/// Binding of one recognized parameter name to a field and its strategy.
struct FilterBinding {
    param: &'static str,
    field: &'static str,
    strategy: Strategy,
}

const fn bind(param: &'static str, field: &'static str, strategy: Strategy) -> FilterBinding {
    FilterBinding {
        param,
        field,
        strategy,
    }
}

static COURSE_FILTERS: &[FilterBinding] = &[
    bind("name", "name", Strategy::FuzzyText),
    bind("code", "code", Strategy::Exact { fold: CaseFold::Upper }),
    bind("dept", "dept", Strategy::Exact { fold: CaseFold::Upper }),
    bind("instructors", "sections.instructors", Strategy::NestedFuzzy),
    bind("time", "sections.time", Strategy::NestedAll),
];

static TIMETABLE_FILTERS: &[FilterBinding] = &[
    bind("name", "name", Strategy::FuzzyText),
    bind(
        "authorId",
        "authorId",
        Strategy::Exact {
            fold: CaseFold::Lower,
        },
    ),
    bind("year", "year", Strategy::Exact { fold: CaseFold::None }),
    bind(
        "acadYear",
        "acadYear",
        Strategy::Exact { fold: CaseFold::None },
    ),
    bind(
        "semester",
        "semester",
        Strategy::Exact { fold: CaseFold::None },
    ),
    bind("degrees", "degrees", Strategy::NestedAll),
    bind("instructors", "sections.instructors", Strategy::NestedFuzzy),
    bind("courses", "courses.name", Strategy::NestedFuzzy),
];

/// A usable (non-empty) parameter value.
enum ParamValue {
    One(String),
    Many(Vec<String>),
    Int(i64),
}

/// Recognized course search parameters. Empty strings and empty lists are
/// treated as absent.
#[derive(Debug, Clone, Default)]
pub struct CourseSearchParams {
    pub query: Option<String>,
    pub name: Option<String>,
    pub code: Option<String>,
    pub dept: Option<String>,
    pub instructors: Vec<String>,
    pub time: Vec<String>,
}

impl CourseSearchParams {
    fn entries(&self) -> Vec<(&'static str, ParamValue)> {
        let mut entries = Vec::new();
        push_one(&mut entries, "name", &self.name);
        push_one(&mut entries, "code", &self.code);
        push_one(&mut entries, "dept", &self.dept);
        push_many(&mut entries, "instructors", &self.instructors);
        push_many(&mut entries, "time", &self.time);
        entries
    }
}

/// Recognized timetable search parameters.
#[derive(Debug, Clone, Default)]
pub struct TimetableSearchParams {
    pub query: Option<String>,
    pub name: Option<String>,
    pub author_id: Option<String>,
    pub year: Option<i64>,
    pub acad_year: Option<i64>,
    pub semester: Option<i64>,
    pub degrees: Vec<String>,
    pub instructors: Vec<String>,
    pub courses: Vec<String>,
    /// Zero-based result offset; timetable search paginates, course search
    /// does not.
    pub offset: usize,
}

impl TimetableSearchParams {
    fn entries(&self) -> Vec<(&'static str, ParamValue)> {
        let mut entries = Vec::new();
        push_one(&mut entries, "name", &self.name);
        push_one(&mut entries, "authorId", &self.author_id);
        push_int(&mut entries, "year", self.year);
        push_int(&mut entries, "acadYear", self.acad_year);
        push_int(&mut entries, "semester", self.semester);
        push_many(&mut entries, "degrees", &self.degrees);
        push_many(&mut entries, "instructors", &self.instructors);
        push_many(&mut entries, "courses", &self.courses);
        entries
    }
}

fn push_one(out: &mut Vec<(&'static str, ParamValue)>, param: &'static str, value: &Option<String>) {
    if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
        out.push((param, ParamValue::One(v.to_string())));
    }
}

fn push_many(out: &mut Vec<(&'static str, ParamValue)>, param: &'static str, values: &[String]) {
    let kept: Vec<String> = values.iter().filter(|v| !v.is_empty()).cloned().collect();
    if !kept.is_empty() {
        out.push((param, ParamValue::Many(kept)));
    }
}

fn push_int(out: &mut Vec<(&'static str, ParamValue)>, param: &'static str, value: Option<i64>) {
    if let Some(v) = value {
        out.push((param, ParamValue::Int(v)));
    }
}

/// Compile course search parameters into one query tree.
///
/// Courses reject a request with no usable parameter at all; this asymmetry
/// with timetable search is deliberate and load-bearing.
pub fn compile_course(params: &CourseSearchParams) -> Result<QueryNode> {
    let mut clauses = Vec::new();

    if let Some(q) = usable(params.query.as_deref()) {
        clauses.push(course_free_text(q));
    }
    append_filters(&mut clauses, COURSE_FILTERS, &params.entries());

    match clauses.len() {
        0 => Err(AppError::BadRequest(
            "At least one valid query parameter required".to_string(),
        )),
        1 => Ok(clauses.swap_remove(0)),
        _ => Ok(QueryNode::And(clauses)),
    }
}

/// Compile timetable search parameters into one query tree.
///
/// With no usable parameter this compiles to a match-everything page rather
/// than an error.
pub fn compile_timetable(params: &TimetableSearchParams) -> QueryNode {
    let mut clauses = Vec::new();

    if let Some(q) = usable(params.query.as_deref()) {
        clauses.push(timetable_free_text(q));
    }
    append_filters(&mut clauses, TIMETABLE_FILTERS, &params.entries());

    match clauses.len() {
        0 => QueryNode::All,
        1 => clauses.swap_remove(0),
        _ => QueryNode::And(clauses),
    }
}

fn usable(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn append_filters(
    clauses: &mut Vec<QueryNode>,
    table: &[FilterBinding],
    entries: &[(&'static str, ParamValue)],
) {
    for binding in table {
        let Some((_, value)) = entries.iter().find(|(param, _)| *param == binding.param) else {
            continue;
        };
        match (&binding.strategy, value) {
            (Strategy::Exact { fold }, ParamValue::One(v)) => clauses.push(QueryNode::Term {
                field: binding.field,
                value: TermValue::Text(fold.apply(v)),
                boost: None,
            }),
            (Strategy::Exact { .. }, ParamValue::Int(v)) => clauses.push(QueryNode::Term {
                field: binding.field,
                value: TermValue::Int(*v),
                boost: None,
            }),
            (Strategy::FuzzyText, ParamValue::One(v)) => clauses.push(QueryNode::Fuzzy {
                field: binding.field,
                text: v.clone(),
                boost: None,
            }),
            (Strategy::NestedFuzzy, ParamValue::One(v)) => clauses.push(QueryNode::Fuzzy {
                field: binding.field,
                text: v.clone(),
                boost: None,
            }),
            // One clause per value: each value may be satisfied by a
            // different list element, but all values must hold.
            (Strategy::NestedFuzzy, ParamValue::Many(vs)) => {
                for v in vs {
                    clauses.push(QueryNode::Fuzzy {
                        field: binding.field,
                        text: v.clone(),
                        boost: None,
                    });
                }
            }
            // Set containment within a single array field occurrence.
            (Strategy::NestedAll, ParamValue::Many(vs)) => clauses.push(QueryNode::AllOf {
                field: binding.field,
                values: vs.iter().cloned().map(TermValue::Text).collect(),
            }),
            // Type-mismatched input is ignored, not an error.
            _ => {}
        }
    }
}

/// Course free-text fan-out: scores of all satisfied branches add up, so a
/// document matching on both code and name outranks one matching either
/// alone.
fn course_free_text(q: &str) -> QueryNode {
    QueryNode::SumOfShould {
        branches: vec![
            QueryNode::Term {
                field: "code",
                value: TermValue::Text(q.to_uppercase()),
                boost: Some(2.0),
            },
            QueryNode::Term {
                field: "dept",
                value: TermValue::Text(q.to_uppercase()),
                boost: Some(2.5),
            },
            QueryNode::Fuzzy {
                field: "name",
                text: q.to_string(),
                boost: Some(2.0),
            },
            QueryNode::Fuzzy {
                field: "sections.instructors",
                text: q.to_string(),
                boost: None,
            },
        ],
        boost: None,
    }
}

/// Timetable free-text fan-out: the best branch dominates and the others
/// contribute a fixed fraction, rewarding a strong single-field match over
/// weak matches spread across many fields.
fn timetable_free_text(q: &str) -> QueryNode {
    let branches = vec![
        QueryNode::SumOfShould {
            branches: audience_bundle(q),
            boost: Some(1.5),
        },
        QueryNode::SumOfShould {
            branches: vec![
                QueryNode::Fuzzy {
                    field: "courses.code",
                    text: q.to_string(),
                    boost: Some(2.0),
                },
                QueryNode::Fuzzy {
                    field: "courses.name",
                    text: q.to_string(),
                    boost: Some(2.0),
                },
            ],
            boost: Some(2.0),
        },
        QueryNode::Fuzzy {
            field: "sections.instructors",
            text: q.to_string(),
            boost: Some(1.5),
        },
        QueryNode::Fuzzy {
            field: "name",
            text: q.to_string(),
            boost: None,
        },
        QueryNode::Term {
            field: "authorId",
            value: TermValue::Text(q.to_lowercase()),
            boost: Some(2.0),
        },
    ];

    QueryNode::BestBranch {
        branches,
        tie_breaker: TIE_BREAKER,
    }
}

/// Degree and year candidates derived from a free-text phrase.
///
/// A 4-character alphanumeric token is split into two 2-character degree
/// codes ("A7B4" carries both halves of a dual degree); every token doubles
/// as a literal degree candidate, and purely numeric tokens double as year
/// candidates.
fn audience_bundle(q: &str) -> Vec<QueryNode> {
    let degree_pairs: Vec<TermValue> = q
        .split_whitespace()
        .filter(|t| t.len() == 4 && t.chars().all(|c| c.is_ascii_alphanumeric()))
        .flat_map(|t| [&t[0..2], &t[2..4]])
        .map(|half| TermValue::Text(half.to_uppercase()))
        .collect();

    let literals: Vec<TermValue> = q
        .split_whitespace()
        .map(|t| TermValue::Text(t.to_uppercase()))
        .collect();

    let years: Vec<TermValue> = q
        .split_whitespace()
        .filter(|t| t.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|t| t.parse::<i64>().ok())
        .map(TermValue::Int)
        .collect();

    let mut bundle = Vec::new();
    if !degree_pairs.is_empty() {
        bundle.push(QueryNode::AnyOf {
            field: "degrees",
            values: degree_pairs,
            boost: Some(2.0),
        });
    }
    if !literals.is_empty() {
        bundle.push(QueryNode::AnyOf {
            field: "degrees",
            values: literals,
            boost: Some(1.0),
        });
    }
    if !years.is_empty() {
        bundle.push(QueryNode::AnyOf {
            field: "year",
            values: years,
            boost: Some(4.0),
        });
    }
    bundle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_requires_a_usable_parameter() {
        let err = compile_course(&CourseSearchParams::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "At least one valid query parameter required"
        );

        // Empty strings and empty lists do not count as usable.
        let err = compile_course(&CourseSearchParams {
            query: Some(String::new()),
            instructors: vec![String::new()],
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err.error_code(), "BAD_REQUEST");
    }

    #[test]
    fn test_timetable_without_parameters_matches_everything() {
        let node = compile_timetable(&TimetableSearchParams::default());
        assert_eq!(node, QueryNode::All);
    }

    #[test]
    fn test_single_clause_is_unwrapped() {
        let node = compile_course(&CourseSearchParams {
            code: Some("cs f111".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            node,
            QueryNode::Term {
                field: "code",
                value: TermValue::Text("CS F111".to_string()),
                boost: None,
            }
        );
    }

    #[test]
    fn test_free_text_joins_filters_as_one_clause() {
        let node = compile_course(&CourseSearchParams {
            query: Some("programming".to_string()),
            dept: Some("cs".to_string()),
            ..Default::default()
        })
        .unwrap();
        let QueryNode::And(clauses) = node else {
            panic!("expected a conjunction");
        };
        assert_eq!(clauses.len(), 2);
        assert!(matches!(clauses[0], QueryNode::SumOfShould { .. }));
        assert!(matches!(
            clauses[1],
            QueryNode::Term { field: "dept", .. }
        ));
    }

    #[test]
    fn test_course_free_text_branches_and_boosts() {
        let node = compile_course(&CourseSearchParams {
            query: Some("CS F111".to_string()),
            ..Default::default()
        })
        .unwrap();
        let QueryNode::SumOfShould { branches, boost } = node else {
            panic!("expected summed-OR fan-out");
        };
        assert_eq!(boost, None);
        assert_eq!(branches.len(), 4);
        assert_eq!(
            branches[0],
            QueryNode::Term {
                field: "code",
                value: TermValue::Text("CS F111".to_string()),
                boost: Some(2.0),
            }
        );
        assert_eq!(
            branches[1],
            QueryNode::Term {
                field: "dept",
                value: TermValue::Text("CS F111".to_string()),
                boost: Some(2.5),
            }
        );
        assert!(matches!(
            branches[2],
            QueryNode::Fuzzy {
                field: "name",
                boost: Some(b),
                ..
            } if b == 2.0
        ));
        assert!(matches!(
            branches[3],
            QueryNode::Fuzzy {
                field: "sections.instructors",
                boost: None,
                ..
            }
        ));
    }

    #[test]
    fn test_list_filters_expand_per_value() {
        let node = compile_course(&CourseSearchParams {
            instructors: vec!["Rahul".to_string(), "Meera".to_string()],
            ..Default::default()
        })
        .unwrap();
        let QueryNode::And(clauses) = node else {
            panic!("expected a conjunction");
        };
        // Both instructors must appear, each possibly on a different section.
        assert_eq!(clauses.len(), 2);
        assert!(clauses
            .iter()
            .all(|c| matches!(c, QueryNode::Fuzzy { field: "sections.instructors", .. })));
    }

    #[test]
    fn test_time_filter_requires_all_values() {
        let node = compile_course(&CourseSearchParams {
            time: vec!["08:09".to_string(), "10:11".to_string()],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            node,
            QueryNode::AllOf {
                field: "sections.time",
                values: vec![
                    TermValue::Text("08:09".to_string()),
                    TermValue::Text("10:11".to_string()),
                ],
            }
        );
    }

    #[test]
    fn test_degrees_filter_requires_all_values() {
        let node = compile_timetable(&TimetableSearchParams {
            degrees: vec!["CS".to_string(), "EC".to_string()],
            ..Default::default()
        });
        assert_eq!(
            node,
            QueryNode::AllOf {
                field: "degrees",
                values: vec![
                    TermValue::Text("CS".to_string()),
                    TermValue::Text("EC".to_string()),
                ],
            }
        );
    }

    #[test]
    fn test_author_id_is_lowercased() {
        let node = compile_timetable(&TimetableSearchParams {
            author_id: Some("User-42".to_string()),
            ..Default::default()
        });
        assert_eq!(
            node,
            QueryNode::Term {
                field: "authorId",
                value: TermValue::Text("user-42".to_string()),
                boost: None,
            }
        );
    }

    #[test]
    fn test_timetable_free_text_shape() {
        let node = compile_timetable(&TimetableSearchParams {
            query: Some("csec 2022".to_string()),
            ..Default::default()
        });
        let QueryNode::BestBranch {
            branches,
            tie_breaker,
        } = node
        else {
            panic!("expected best-branch fan-out");
        };
        assert_eq!(tie_breaker, 0.7);
        assert_eq!(branches.len(), 5);
        assert!(matches!(
            branches[4],
            QueryNode::Term {
                field: "authorId",
                boost: Some(b),
                ..
            } if b == 2.0
        ));
    }

    #[test]
    fn test_derived_degree_and_year_tokens() {
        let bundle = audience_bundle("csec 2022 a7");
        // "csec" splits into its two degree halves; every token doubles as a
        // literal candidate; "2022" doubles as a year candidate.
        assert_eq!(
            bundle[0],
            QueryNode::AnyOf {
                field: "degrees",
                values: vec![
                    TermValue::Text("CS".to_string()),
                    TermValue::Text("EC".to_string()),
                    TermValue::Text("20".to_string()),
                    TermValue::Text("22".to_string()),
                ],
                boost: Some(2.0),
            }
        );
        assert_eq!(
            bundle[1],
            QueryNode::AnyOf {
                field: "degrees",
                values: vec![
                    TermValue::Text("CSEC".to_string()),
                    TermValue::Text("2022".to_string()),
                    TermValue::Text("A7".to_string()),
                ],
                boost: Some(1.0),
            }
        );
        assert_eq!(
            bundle[2],
            QueryNode::AnyOf {
                field: "year",
                values: vec![TermValue::Int(2022)],
                boost: Some(4.0),
            }
        );
    }
}
