//! Configured queries
//!
//! The query set is derived from configuration once and never changes for the
//! life of the process. Each query is addressed by a synthetic identifier
//! assigned from its configuration position.

use indexmap::IndexMap;


/// Prefix of the synthetic query identifiers (`custom_0`, `custom_1`, ...)
pub const QUERY_ID_PREFIX: &str = "custom_";

/// How a query's rows become metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitMode {
    /// One metric per row whose only field is the `value` column
    Row,
    /// One metric per row carrying every `field_` column
    #[default]
    Aggregate,
}

impl EmitMode {
    /// Map the `result_by_row` configuration flag to an emit mode
    pub fn from_result_by_row(result_by_row: bool) -> Self {
        if result_by_row {
            EmitMode::Row
        } else {
            EmitMode::Aggregate
        }
    }
}

impl std::fmt::Display for EmitMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmitMode::Row => write!(f, "row"),
            EmitMode::Aggregate => write!(f, "aggregate"),
        }
    }
}

/// A compiled query: preamble plus user text, and its emit mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    id: String,
    script: String,
    emit_mode: EmitMode,
}

impl Query {
    /// Create a query from an already-assembled script
    pub fn new(id: impl Into<String>, script: impl Into<String>, emit_mode: EmitMode) -> Self {
        Self {
            id: id.into(),
            script: script.into(),
            emit_mode,
        }
    }

    /// Synthetic identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Full script sent to the server
    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn emit_mode(&self) -> EmitMode {
        self.emit_mode
    }
}

/// Ordered set of queries keyed by identifier
#[derive(Debug, Clone, Default)]
pub struct QuerySet {
    queries: IndexMap<String, Query>,
}

impl QuerySet {
    /// Compile raw query strings into a query set.
    ///
    /// Every entry gets the identifier `custom_<position>`, the preamble
    /// prepended to its text, and the shared emit mode. SQL is not validated
    /// here; malformed statements fail when executed.
    pub fn build<S: AsRef<str>>(preamble: &str, raw_queries: &[S], emit_mode: EmitMode) -> Self {
        let queries = raw_queries
            .iter()
            .enumerate()
            .map(|(position, raw)| {
                let id = format!("{}{}", QUERY_ID_PREFIX, position);
                let script = format!("{}{}", preamble, raw.as_ref());
                (id.clone(), Query::new(id, script, emit_mode))
            })
            .collect();

        Self { queries }
    }

    /// Look up a query by identifier
    pub fn get(&self, id: &str) -> Option<&Query> {
        self.queries.get(id)
    }

    /// Iterate queries in configuration order
    pub fn iter(&self) -> impl Iterator<Item = &Query> {
        self.queries.values()
    }

    /// Identifiers in configuration order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.queries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}
