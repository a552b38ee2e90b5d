//! Document queries, mutations and find options.
//!
//! Paths are dotted (`body.email`) and address nested JSON objects.

use std::cmp::Ordering;

use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};

use crate::model::ListParams;

/// Looks up a dotted path inside a document.
pub fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(document, |current, segment| current.get(segment))
}

#[derive(Debug, Clone)]
pub enum Condition {
    /// The value at the path equals this one exactly.
    Equals(Value),
    /// The value at the path is a string matching this pattern.
    Pattern(Regex),
}

impl Condition {
    fn matches(&self, value: Option<&Value>) -> bool {
        match self {
            Condition::Equals(expected) => value == Some(expected),
            Condition::Pattern(regex) => value
                .and_then(Value::as_str)
                .map(|s| regex.is_match(s))
                .unwrap_or(false),
        }
    }
}

/// A conjunction of conditions. The empty query matches every document.
#[derive(Debug, Clone, Default)]
pub struct Query {
    conditions: Vec<(String, Condition)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new().eq("id", Value::String(id.into()))
    }

    pub fn eq(mut self, path: impl Into<String>, value: Value) -> Self {
        self.conditions.push((path.into(), Condition::Equals(value)));
        self
    }

    /// Adds a case-insensitive pattern condition.
    pub fn pattern(mut self, path: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        self.conditions.push((path.into(), Condition::Pattern(regex)));
        Ok(self)
    }

    pub fn conditions(&self) -> &[(String, Condition)] {
        &self.conditions
    }

    pub fn matches(&self, document: &Value) -> bool {
        self.conditions
            .iter()
            .all(|(path, condition)| condition.matches(lookup(document, path)))
    }
}

/// Assignments applied to every matched document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mutation {
    set: Vec<(String, Value)>,
}

impl Mutation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, path: impl Into<String>, value: Value) -> Self {
        self.set.push((path.into(), value));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Applies every assignment, creating intermediate objects as needed.
    /// Returns whether the document changed.
    pub fn apply(&self, document: &mut Value) -> bool {
        let mut changed = false;
        for (path, value) in &self.set {
            let mut current = &mut *document;
            let mut segments = path.split('.').peekable();
            while let Some(segment) = segments.next() {
                if !current.is_object() {
                    *current = Value::Object(Map::new());
                }
                let Value::Object(map) = current else { break };
                if segments.peek().is_none() {
                    if map.get(segment) != Some(value) {
                        map.insert(segment.to_string(), value.clone());
                        changed = true;
                    }
                    break;
                }
                current = map.entry(segment.to_string()).or_insert_with(|| Value::Object(Map::new()));
            }
        }
        changed
    }
}

/// Sorting and paging applied after matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub sort_by: Option<String>,
    pub descending: bool,
    pub skip: usize,
    pub limit: Option<usize>,
}

impl From<&ListParams> for FindOptions {
    fn from(params: &ListParams) -> Self {
        Self {
            sort_by: params.sort_by.as_ref().map(|field| format!("body.{}", field)),
            descending: params.descending,
            skip: params.skip,
            limit: params.limit,
        }
    }
}

impl FindOptions {
    pub fn apply(&self, mut documents: Vec<Value>) -> Vec<Value> {
        if let Some(path) = &self.sort_by {
            documents.sort_by(|a, b| {
                let ordering = compare(lookup(a, path), lookup(b, path));
                if self.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
        let documents = documents.into_iter().skip(self.skip);
        match self.limit {
            Some(limit) => documents.take(limit).collect(),
            None => documents.collect(),
        }
    }
}

/// Missing and null values sort first, then booleans, numbers and strings.
fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
