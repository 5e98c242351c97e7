use tracing::debug;

use crate::{
    executor::{predicate::Predicate, scan::ScanIterator},
    planner::query_intent::{Projection, QueryIntent},
    storage::{
        btree::BTreeWalker,
        page_store::PageStore,
        schema::{SchemaCatalog, TableSchema},
    },
    types::{
        error::{DatabaseError, Result},
        row::ColumnFormat,
    },
};

/// Complete answer to one query: either all of it or an error, never part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl QueryResult {
    /// Output lines, fields joined with `|`.
    pub fn lines(&self) -> Vec<String> {
        self.rows.iter().map(|row| row.join("|")).collect()
    }
}

pub struct QueryExecutor<'a> {
    store: &'a mut PageStore,
    catalog: &'a SchemaCatalog,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(store: &'a mut PageStore, catalog: &'a SchemaCatalog) -> Self {
        Self { store, catalog }
    }

    pub fn execute(&mut self, intent: &QueryIntent) -> Result<QueryResult> {
        let entry = self
            .catalog
            .lookup(&intent.from_table)
            .ok_or_else(|| DatabaseError::TableNotFound {
                name: intent.from_table.clone(),
            })?;
        let root_page_id = entry.root_page_index()?;

        // COUNT(*) without a filter never needs the DDL
        let schema = match (&intent.projection, &intent.predicate) {
            (Projection::CountStar, None) => None,
            _ => Some(entry.table_schema()?),
        };

        let predicate = match (&intent.predicate, &schema) {
            (Some(predicate), Some(schema)) => Some(Predicate::bind(predicate, schema)?),
            _ => None,
        };

        let (columns, outputs) = match (&intent.projection, &schema) {
            (Projection::ColumnList(names), Some(schema)) => {
                let outputs = names
                    .iter()
                    .map(|name| resolve_column(schema, name))
                    .collect::<Result<Vec<_>>>()?;
                (names.clone(), outputs)
            }
            (Projection::AllColumns, Some(schema)) => {
                let outputs = schema
                    .column_names()
                    .iter()
                    .map(|name| resolve_column(schema, name))
                    .collect::<Result<Vec<_>>>()?;
                (schema.column_names(), outputs)
            }
            _ => (vec!["COUNT(*)".to_string()], Vec::new()),
        };

        debug!(
            table = %intent.from_table,
            root_page_id,
            projection = ?intent.projection,
            filtered = predicate.is_some(),
            "executing query"
        );

        let mut count: u64 = 0;
        let mut rows = Vec::new();
        for row in ScanIterator::new(BTreeWalker::new(&mut *self.store, root_page_id)) {
            let row = row?;
            if let Some(predicate) = &predicate {
                if !predicate.evaluate(&row) {
                    continue;
                }
            }
            count += 1;
            if !outputs.is_empty() {
                rows.push(
                    outputs
                        .iter()
                        .map(|column| row.render(column))
                        .collect(),
                );
            }
        }

        if intent.projection == Projection::CountStar {
            rows = vec![vec![count.to_string()]];
        }

        Ok(QueryResult { columns, rows })
    }
}

fn resolve_column(schema: &TableSchema, name: &str) -> Result<ColumnFormat> {
    let index = schema
        .get_column_index(name)
        .ok_or_else(|| DatabaseError::ColumnNotFound {
            name: name.to_string(),
            table: schema.table_name.clone(),
        })?;
    Ok(schema.column_format(index))
}
