//! Search engine access.
//!
//! [`IndexGateway`] is the only surface the rest of the crate talks to:
//! ranked search over a compiled query tree, upsert with the configured
//! write-visibility mode, lookup and delete by logical id. The tantivy
//! implementation keeps one index per collection under the configured data
//! directory and lowers query trees to engine queries privately.

use crate::config::{RefreshMode, SearchConfig};
use crate::error::{AppError, Result};
use crate::search::document::{CollectionMapping, CourseMapping, FieldKind, TimetableMapping};
use crate::search::query::{Page, QueryNode, TermValue};
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use tantivy::collector::TopDocs;
use tantivy::query::{
    AllQuery, BooleanQuery, BoostQuery, DisjunctionMaxQuery, EmptyQuery, FuzzyTermQuery, Occur,
    Query, TermQuery,
};
use tantivy::schema::{IndexRecordOption, Value as _};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tokio::sync::RwLock;

/// Document collections served by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Collection {
    Courses,
    Timetables,
}

/// One ranked hit: the stored document plus its relevance score.
#[derive(Debug, Clone)]
pub struct Hit {
    pub document: Value,
    pub score: f32,
}

/// Abstraction over the document search engine.
#[async_trait]
pub trait IndexGateway: Send + Sync {
    /// Execute a compiled query and return one ranked result page.
    async fn search(&self, collection: Collection, query: &QueryNode, page: Page)
        -> Result<Vec<Hit>>;

    /// Upsert a document. Visibility of the write follows the configured
    /// refresh mode.
    async fn index_document(&self, collection: Collection, doc: &Value) -> Result<()>;

    /// Delete the document with the given logical id. Returns `false` when
    /// no such document existed.
    async fn delete_by_id(&self, collection: Collection, id: &str) -> Result<bool>;

    /// Look up a document by its logical id.
    async fn find_by_id(&self, collection: Collection, id: &str) -> Result<Option<Value>>;
}

/// Tantivy-backed gateway holding one index per collection.
pub struct TantivyGateway {
    courses: IndexHandle,
    timetables: IndexHandle,
    refresh: RefreshMode,
}

impl TantivyGateway {
    /// Open (or create) both collection indexes under the configured data
    /// directory.
    pub fn open(config: &SearchConfig) -> Result<Self> {
        Ok(Self {
            courses: IndexHandle::open(
                &config.data_dir.join("courses"),
                Box::new(CourseMapping::new()),
                config,
            )?,
            timetables: IndexHandle::open(
                &config.data_dir.join("timetables"),
                Box::new(TimetableMapping::new()),
                config,
            )?,
            refresh: config.refresh,
        })
    }

    fn handle(&self, collection: Collection) -> &IndexHandle {
        match collection {
            Collection::Courses => &self.courses,
            Collection::Timetables => &self.timetables,
        }
    }
}

#[async_trait]
impl IndexGateway for TantivyGateway {
    async fn search(
        &self,
        collection: Collection,
        query: &QueryNode,
        page: Page,
    ) -> Result<Vec<Hit>> {
        let handle = self.handle(collection);
        let engine_query = lower(query, handle.mapping.as_ref())?;
        let searcher = handle.reader.searcher();

        let top_docs = searcher.search(
            &*engine_query,
            &TopDocs::with_limit(page.limit).and_offset(page.offset),
        )?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address)?;
            hits.push(Hit {
                document: handle.stored_source(&doc)?,
                score,
            });
        }

        tracing::debug!(
            collection = %collection,
            hits = hits.len(),
            offset = page.offset,
            "Search executed"
        );
        Ok(hits)
    }

    async fn index_document(&self, collection: Collection, doc: &Value) -> Result<()> {
        let handle = self.handle(collection);
        let id = doc
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::Backend("document is missing its 'id'".to_string()))?;

        let engine_doc = handle.mapping.to_doc(doc);
        let mut writer = handle.writer.write().await;

        // Upsert: drop any previous document carrying the same logical id.
        writer.delete_term(Term::from_field_text(handle.mapping.id_field(), id));
        writer.add_document(engine_doc)?;
        handle.commit(&mut writer, self.refresh)?;

        tracing::info!(collection = %collection, id = %id, "Document indexed");
        Ok(())
    }

    async fn delete_by_id(&self, collection: Collection, id: &str) -> Result<bool> {
        let handle = self.handle(collection);
        if handle.find(id)?.is_none() {
            return Ok(false);
        }

        let mut writer = handle.writer.write().await;
        writer.delete_term(Term::from_field_text(handle.mapping.id_field(), id));
        handle.commit(&mut writer, self.refresh)?;

        tracing::info!(collection = %collection, id = %id, "Document deleted");
        Ok(true)
    }

    async fn find_by_id(&self, collection: Collection, id: &str) -> Result<Option<Value>> {
        self.handle(collection).find(id)
    }
}

/// One collection's index, writer and reader.
struct IndexHandle {
    mapping: Box<dyn CollectionMapping>,
    writer: RwLock<IndexWriter>,
    reader: IndexReader,
}

impl IndexHandle {
    fn open(
        path: &Path,
        mapping: Box<dyn CollectionMapping>,
        config: &SearchConfig,
    ) -> Result<Self> {
        std::fs::create_dir_all(path).map_err(|e| {
            AppError::Backend(format!("failed to create index directory: {e}"))
        })?;

        let index = if path.join("meta.json").exists() {
            Index::open_in_dir(path)?
        } else {
            Index::create_in_dir(path, mapping.schema())?
        };

        let writer = index.writer(config.writer_heap_bytes)?;

        // With wait_for visibility the reader is reloaded explicitly after
        // every commit; otherwise it trails commits on its own schedule.
        let reader = index
            .reader_builder()
            .reload_policy(match config.refresh {
                RefreshMode::WaitFor => ReloadPolicy::Manual,
                RefreshMode::Async => ReloadPolicy::OnCommitWithDelay,
            })
            .try_into()?;

        Ok(Self {
            mapping,
            writer: RwLock::new(writer),
            reader,
        })
    }

    fn commit(&self, writer: &mut IndexWriter, refresh: RefreshMode) -> Result<()> {
        writer.commit()?;
        if refresh == RefreshMode::WaitFor {
            self.reader.reload()?;
        }
        Ok(())
    }

    fn find(&self, id: &str) -> Result<Option<Value>> {
        let searcher = self.reader.searcher();
        let query = TermQuery::new(
            Term::from_field_text(self.mapping.id_field(), id),
            IndexRecordOption::Basic,
        );
        let top_docs = searcher.search(&query, &TopDocs::with_limit(1))?;

        let Some((_, address)) = top_docs.into_iter().next() else {
            return Ok(None);
        };
        let doc: TantivyDocument = searcher.doc(address)?;
        Ok(Some(self.stored_source(&doc)?))
    }

    fn stored_source(&self, doc: &TantivyDocument) -> Result<Value> {
        let source = doc
            .get_first(self.mapping.source_field())
            .and_then(|v| v.as_str())
            .ok_or_else(|| AppError::Backend("stored document has no source".to_string()))?;
        serde_json::from_str(source)
            .map_err(|e| AppError::Backend(format!("stored document is not valid JSON: {e}")))
    }
}

/// Lower a compiled query tree to an engine query.
fn lower(node: &QueryNode, mapping: &dyn CollectionMapping) -> Result<Box<dyn Query>> {
    match node {
        QueryNode::All => Ok(Box::new(AllQuery)),

        QueryNode::Term {
            field,
            value,
            boost,
        } => {
            let query: Box<dyn Query> = match raw_term(mapping, field, value)? {
                Some(term) => Box::new(TermQuery::new(term, IndexRecordOption::Basic)),
                None => Box::new(EmptyQuery),
            };
            Ok(boosted(query, *boost))
        }

        QueryNode::Fuzzy { field, text, boost } => {
            let (engine_field, kind) = resolve(mapping, field)?;
            let tokens = analyze(text);
            if kind != FieldKind::Text || tokens.is_empty() {
                // Lenient contract: malformed input matches nothing rather
                // than failing the whole query.
                return Ok(boosted(Box::new(EmptyQuery), *boost));
            }

            let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::with_capacity(tokens.len());
            for token in &tokens {
                let term = Term::from_field_text(engine_field, token);
                clauses.push((
                    Occur::Should,
                    Box::new(FuzzyTermQuery::new(term, edit_distance(token), true)),
                ));
            }
            let query: Box<dyn Query> = if clauses.len() == 1 {
                clauses.remove(0).1
            } else {
                Box::new(BooleanQuery::new(clauses))
            };
            Ok(boosted(query, *boost))
        }

        QueryNode::AnyOf {
            field,
            values,
            boost,
        } => {
            let clauses = term_clauses(mapping, field, values, Occur::Should)?;
            if clauses.is_empty() {
                return Ok(boosted(Box::new(EmptyQuery), *boost));
            }
            Ok(boosted(Box::new(BooleanQuery::new(clauses)), *boost))
        }

        QueryNode::AllOf { field, values } => {
            let clauses = term_clauses(mapping, field, values, Occur::Must)?;
            if clauses.is_empty() {
                return Ok(Box::new(EmptyQuery));
            }
            Ok(Box::new(BooleanQuery::new(clauses)))
        }

        QueryNode::And(children) => {
            let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::with_capacity(children.len());
            for child in children {
                clauses.push((Occur::Must, lower(child, mapping)?));
            }
            Ok(Box::new(BooleanQuery::new(clauses)))
        }

        QueryNode::SumOfShould { branches, boost } => {
            let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::with_capacity(branches.len());
            for branch in branches {
                clauses.push((Occur::Should, lower(branch, mapping)?));
            }
            Ok(boosted(Box::new(BooleanQuery::new(clauses)), *boost))
        }

        QueryNode::BestBranch {
            branches,
            tie_breaker,
        } => {
            let mut disjuncts: Vec<Box<dyn Query>> = Vec::with_capacity(branches.len());
            for branch in branches {
                disjuncts.push(lower(branch, mapping)?);
            }
            Ok(Box::new(DisjunctionMaxQuery::with_tie_breaker(
                disjuncts,
                *tie_breaker,
            )))
        }
    }
}

fn resolve(mapping: &dyn CollectionMapping, field: &str) -> Result<(tantivy::schema::Field, FieldKind)> {
    mapping
        .resolve(field)
        .ok_or_else(|| AppError::Backend(format!("unknown search field '{field}'")))
}

/// Build the raw term for an exact comparison, or `None` when the value's
/// type does not fit the field.
fn raw_term(
    mapping: &dyn CollectionMapping,
    field: &str,
    value: &TermValue,
) -> Result<Option<Term>> {
    let (engine_field, kind) = resolve(mapping, field)?;
    Ok(match (kind, value) {
        (FieldKind::Raw, TermValue::Text(text)) => {
            Some(Term::from_field_text(engine_field, text))
        }
        (FieldKind::Int, TermValue::Int(int)) => Some(Term::from_field_i64(engine_field, *int)),
        _ => None,
    })
}

fn term_clauses(
    mapping: &dyn CollectionMapping,
    field: &str,
    values: &[TermValue],
    occur: Occur,
) -> Result<Vec<(Occur, Box<dyn Query>)>> {
    let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::with_capacity(values.len());
    for value in values {
        if let Some(term) = raw_term(mapping, field, value)? {
            clauses.push((
                occur,
                Box::new(TermQuery::new(term, IndexRecordOption::Basic)),
            ));
        }
    }
    Ok(clauses)
}

fn boosted(query: Box<dyn Query>, boost: Option<f32>) -> Box<dyn Query> {
    match boost {
        Some(boost) => Box::new(BoostQuery::new(query, boost)),
        None => query,
    }
}

/// Tokenize query text the way the text fields' analyzer does: split on
/// non-alphanumeric characters and lowercase.
fn analyze(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Edit-distance tolerance scaled with term length.
fn edit_distance(token: &str) -> u8 {
    match token.chars().count() {
        0..=2 => 0,
        3..=5 => 1,
        _ => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_gateway(dir: &TempDir) -> TantivyGateway {
        let config = SearchConfig {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        TantivyGateway::open(&config).unwrap()
    }

    fn course(id: &str, code: &str, name: &str) -> Value {
        json!({
            "id": id,
            "code": code,
            "dept": code.split_whitespace().next().unwrap_or_default(),
            "name": name,
            "sections": [],
            "acadYear": 2024,
            "semester": 1
        })
    }

    #[test]
    fn test_edit_distance_scales_with_length() {
        assert_eq!(edit_distance("cs"), 0);
        assert_eq!(edit_distance("f111"), 1);
        assert_eq!(edit_distance("basic"), 1);
        assert_eq!(edit_distance("programming"), 2);
    }

    #[test]
    fn test_analyze_matches_field_tokenization() {
        assert_eq!(analyze("CS F111"), vec!["cs", "f111"]);
        assert_eq!(analyze("  John   Doe "), vec!["john", "doe"]);
        assert!(analyze(" :: ").is_empty());
    }

    #[tokio::test]
    async fn test_index_and_find_round_trip() {
        let dir = TempDir::new().unwrap();
        let gateway = test_gateway(&dir);

        let doc = course("c1", "CS F111", "Computer Programming");
        gateway
            .index_document(Collection::Courses, &doc)
            .await
            .unwrap();

        let found = gateway
            .find_by_id(Collection::Courses, "c1")
            .await
            .unwrap()
            .expect("document should be visible after a wait_for write");
        assert_eq!(found["code"], "CS F111");

        assert!(gateway
            .find_by_id(Collection::Courses, "missing")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_reports_absence() {
        let dir = TempDir::new().unwrap();
        let gateway = test_gateway(&dir);

        assert!(!gateway
            .delete_by_id(Collection::Courses, "c1")
            .await
            .unwrap());

        let doc = course("c1", "CS F111", "Computer Programming");
        gateway
            .index_document(Collection::Courses, &doc)
            .await
            .unwrap();
        assert!(gateway
            .delete_by_id(Collection::Courses, "c1")
            .await
            .unwrap());
        assert!(gateway
            .find_by_id(Collection::Courses, "c1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_search_with_exact_term() {
        let dir = TempDir::new().unwrap();
        let gateway = test_gateway(&dir);

        gateway
            .index_document(
                Collection::Courses,
                &course("c1", "CS F111", "Computer Programming"),
            )
            .await
            .unwrap();
        gateway
            .index_document(
                Collection::Courses,
                &course("c2", "CS F211", "Data Structures"),
            )
            .await
            .unwrap();

        let node = QueryNode::Term {
            field: "code",
            value: TermValue::Text("CS F111".to_string()),
            boost: None,
        };
        let hits = gateway
            .search(Collection::Courses, &node, Page::first(10))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document["id"], "c1");
    }
}
