use sqlparser::parser::ParserError;
use thiserror::Error;

/// Why a piece of SQL could not become a [`QueryIntent`](super::query_intent::QueryIntent).
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("SQL syntax error: {0}")]
    SqlParser(#[from] ParserError),

    /// Anything other than a plain `SELECT`, or a `SELECT` with ordering,
    /// limits, CTEs or set operations.
    #[error("Only plain SELECT queries are supported, got: {0}")]
    UnsupportedStatement(String),

    #[error("Unsupported in a single-table query: {0}")]
    UnsupportedExpression(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}
