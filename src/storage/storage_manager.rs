use std::path::Path;

use crate::{
    executor::query::{QueryExecutor, QueryResult},
    planner::{parser::SqlParser, query_intent::QueryIntent},
    storage::{page_store::PageStore, schema::SchemaCatalog},
    types::error::Result,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseInfo {
    pub page_size: u32,
    pub table_count: usize,
}

/// An open database file together with its schema catalog.
pub struct StorageManager {
    pub page_store: PageStore,
    pub schema: SchemaCatalog,
}

impl StorageManager {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut page_store = PageStore::open(path)?;
        let schema = SchemaCatalog::build(&mut page_store)?;
        Ok(Self { page_store, schema })
    }

    pub fn database_info(&self) -> DatabaseInfo {
        DatabaseInfo {
            page_size: self.page_store.page_size(),
            table_count: self.schema.table_names().len(),
        }
    }

    /// Get all user table names, sorted
    pub fn get_table_names(&self) -> Vec<String> {
        self.schema.table_names()
    }

    pub fn execute_intent(&mut self, intent: &QueryIntent) -> Result<QueryResult> {
        QueryExecutor::new(&mut self.page_store, &self.schema).execute(intent)
    }

    pub fn execute_sql(&mut self, sql: &str) -> Result<QueryResult> {
        let intent = SqlParser::new().parse_sql(sql)?;
        self.execute_intent(&intent)
    }

    pub fn close(self) {
        self.page_store.close();
    }
}
