use serde::{Deserialize, Serialize};
use sqlparser::{
    ast::{ColumnOption, Statement, TableConstraint},
    dialect::SQLiteDialect,
    parser::Parser,
};
use tracing::debug;

use crate::{
    storage::{btree::rows_of, page_store::PageStore},
    types::{
        PageId, RESERVED_NAME_PREFIX, SCHEMA_ROOT_PAGE,
        error::{DatabaseError, Result},
        row::{ColumnFormat, Row},
        value::Value,
    },
};

/// One row of the schema table: `(type, name, tbl_name, rootpage, sql)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaEntry {
    pub object_type: String,
    pub name: String,
    pub table_name: String,
    /// 1-based page number as stored; 0 for objects without a B-tree.
    pub root_page: i64,
    pub sql: String,
}

impl SchemaEntry {
    pub fn from_row(row: &Row) -> Result<Self> {
        if row.values.len() < 5 {
            return Err(DatabaseError::MalformedSchema {
                table: "sqlite_schema".to_string(),
                reason: format!(
                    "schema row {} has {} columns, expected 5",
                    row.row_id,
                    row.values.len()
                ),
            });
        }

        let text = |index: usize| match &row.values[index] {
            Value::Text(s) => Ok(s.clone()),
            Value::Null => Ok(String::new()),
            other => Err(DatabaseError::MalformedSchema {
                table: "sqlite_schema".to_string(),
                reason: format!("schema row {} column {} is {:?}", row.row_id, index, other),
            }),
        };

        let root_page = match &row.values[3] {
            Value::Integer(page) => *page,
            Value::Null => 0,
            other => {
                return Err(DatabaseError::MalformedSchema {
                    table: "sqlite_schema".to_string(),
                    reason: format!("schema row {} has root page {:?}", row.row_id, other),
                });
            }
        };

        Ok(Self {
            object_type: text(0)?,
            name: text(1)?,
            table_name: text(2)?,
            root_page,
            sql: text(4)?,
        })
    }

    pub fn is_user_table(&self) -> bool {
        self.object_type == "table" && !self.name.starts_with(RESERVED_NAME_PREFIX)
    }

    /// 0-based index of the entry's root page.
    pub fn root_page_index(&self) -> Result<PageId> {
        match u32::try_from(self.root_page) {
            Ok(page_number) if page_number >= 1 => Ok(page_number - 1),
            _ => Err(DatabaseError::MalformedSchema {
                table: self.name.clone(),
                reason: format!("invalid root page {}", self.root_page),
            }),
        }
    }

    /// Parse the entry's `CREATE TABLE` text.
    pub fn table_schema(&self) -> Result<TableSchema> {
        TableSchema::from_sql(&self.name, &self.sql)
    }
}

/// Column as declared in a table's DDL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub declared_type: String,
    pub position: usize,
    pub primary_key: bool,
}

impl ColumnSchema {
    /// REAL affinity by SQLite's declared-type rules: no INT, CHAR, CLOB,
    /// TEXT or BLOB in the name, and one of REAL, FLOA or DOUB.
    pub fn has_real_affinity(&self) -> bool {
        let declared = self.declared_type.to_ascii_uppercase();
        let contains_any = |needles: &[&str]| needles.iter().any(|n| declared.contains(n));
        !contains_any(&["INT", "CHAR", "CLOB", "TEXT", "BLOB"])
            && contains_any(&["REAL", "FLOA", "DOUB"])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn from_sql(table_name: &str, sql: &str) -> Result<Self> {
        let malformed = |reason: String| DatabaseError::MalformedSchema {
            table: table_name.to_string(),
            reason,
        };

        // SQLiteDialect takes AUTOINCREMENT as a column option
        let statements =
            Parser::parse_sql(&SQLiteDialect {}, sql).map_err(|e| malformed(e.to_string()))?;

        let create = match statements.as_slice() {
            [Statement::CreateTable(create)] => create,
            _ => return Err(malformed("expected a single CREATE TABLE statement".to_string())),
        };

        // PRIMARY KEY (col) as a table constraint marks that column too
        let constraint_key = create.constraints.iter().find_map(|constraint| match constraint {
            TableConstraint::PrimaryKey { columns, .. } if columns.len() == 1 => {
                Some(columns[0].value.clone())
            }
            _ => None,
        });

        let columns = create
            .columns
            .iter()
            .enumerate()
            .map(|(position, column)| {
                let inline_key = column.options.iter().any(|option| {
                    matches!(option.option, ColumnOption::Unique { is_primary: true, .. })
                });
                ColumnSchema {
                    name: column.name.value.clone(),
                    declared_type: column.data_type.to_string(),
                    position,
                    primary_key: inline_key
                        || constraint_key.as_deref() == Some(column.name.value.as_str()),
                }
            })
            .collect();

        Ok(Self {
            table_name: table_name.to_string(),
            columns,
        })
    }

    /// 0-based position of the first column with exactly this name.
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|col| col.name.clone()).collect()
    }

    /// How the column at `index` turns stored fields into text.
    pub fn column_format(&self, index: usize) -> ColumnFormat {
        ColumnFormat {
            index,
            rowid_alias: self.rowid_alias() == Some(index),
            real_affinity: self.columns.get(index).is_some_and(ColumnSchema::has_real_affinity),
        }
    }

    /// Column whose values live in the rowid: declared `INTEGER PRIMARY KEY`.
    pub fn rowid_alias(&self) -> Option<usize> {
        self.columns
            .iter()
            .position(|col| col.primary_key && col.declared_type.eq_ignore_ascii_case("INTEGER"))
    }
}

/// The decoded schema table, built once per open file.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    entries: Vec<SchemaEntry>,
}

impl SchemaCatalog {
    pub fn build(store: &mut PageStore) -> Result<Self> {
        let entries = rows_of(store, SCHEMA_ROOT_PAGE)?
            .iter()
            .map(SchemaEntry::from_row)
            .collect::<Result<Vec<_>>>()?;
        debug!(entries = entries.len(), "loaded schema catalog");
        Ok(Self { entries })
    }

    pub fn from_entries(entries: Vec<SchemaEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[SchemaEntry] {
        &self.entries
    }

    /// First table entry named `name`.
    pub fn lookup(&self, name: &str) -> Option<&SchemaEntry> {
        self.entries
            .iter()
            .find(|entry| entry.object_type == "table" && entry.name == name)
    }

    pub fn column_index(
        &self,
        entry: &SchemaEntry,
        column_name: &str,
    ) -> Result<Option<usize>> {
        Ok(entry.table_schema()?.get_column_index(column_name))
    }

    /// User table names, sorted ascending.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.is_user_table())
            .map(|entry| entry.name.clone())
            .collect();
        names.sort();
        names
    }
}
