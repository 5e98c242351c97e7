use sqlparser::{
    ast::{
        BinaryOperator, Expr, FunctionArg, FunctionArgExpr, FunctionArguments, GroupByExpr, Query,
        Select, SelectItem, SetExpr, Statement, TableFactor, UnaryOperator, Value as SqlValue,
    },
    dialect::SQLiteDialect,
    parser::Parser,
};
use tracing::debug;

use crate::planner::{
    error::PlannerError,
    query_intent::{EqualityPredicate, Projection, QueryIntent},
};

enum ProjectionItem {
    Wildcard,
    Column(String),
    CountStar,
}

/// Translates SQL text into a [`QueryIntent`]. This is the only place the
/// external AST is inspected; anything outside the supported shape is
/// rejected here.
pub struct SqlParser;

impl Default for SqlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_sql(&self, sql: &str) -> Result<QueryIntent, PlannerError> {
        let dialect = SQLiteDialect {};
        let statements = Parser::parse_sql(&dialect, sql)?;

        if statements.len() != 1 {
            return Err(PlannerError::InvalidQuery(
                "Expected exactly one statement".to_string(),
            ));
        }

        let intent = self.to_intent(&statements[0])?;
        debug!(?intent, "translated query");
        Ok(intent)
    }

    fn to_intent(&self, statement: &Statement) -> Result<QueryIntent, PlannerError> {
        match statement {
            Statement::Query(query) => self.query_to_intent(query),
            _ => Err(PlannerError::UnsupportedStatement(statement.to_string())),
        }
    }

    fn query_to_intent(&self, query: &Query) -> Result<QueryIntent, PlannerError> {
        if query.with.is_some()
            || query.order_by.is_some()
            || query.limit.is_some()
            || query.offset.is_some()
            || query.fetch.is_some()
        {
            return Err(PlannerError::UnsupportedStatement(query.to_string()));
        }

        match query.body.as_ref() {
            SetExpr::Select(select) => self.select_to_intent(select),
            other => Err(PlannerError::UnsupportedStatement(other.to_string())),
        }
    }

    fn select_to_intent(&self, select: &Select) -> Result<QueryIntent, PlannerError> {
        if select.distinct.is_some() {
            return Err(PlannerError::UnsupportedExpression("DISTINCT".to_string()));
        }
        if !matches!(&select.group_by, GroupByExpr::Expressions(exprs, _) if exprs.is_empty())
            || select.having.is_some()
        {
            return Err(PlannerError::UnsupportedExpression(
                "GROUP BY / HAVING".to_string(),
            ));
        }

        let from_table = self.from_table(select)?;
        let projection = self.projection(select, &from_table)?;
        let predicate = match &select.selection {
            Some(expr) => Some(self.predicate(expr, &from_table)?),
            None => None,
        };

        Ok(QueryIntent {
            from_table,
            projection,
            predicate,
        })
    }

    fn from_table(&self, select: &Select) -> Result<String, PlannerError> {
        let table = match select.from.as_slice() {
            [table] if table.joins.is_empty() => table,
            [] => {
                return Err(PlannerError::InvalidQuery(
                    "No from table specified in select query".to_string(),
                ));
            }
            _ => {
                return Err(PlannerError::UnsupportedExpression(format!(
                    "FROM {}",
                    select
                        .from
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                )));
            }
        };

        match &table.relation {
            TableFactor::Table {
                name, args: None, ..
            } => name
                .0
                .last()
                .map(|ident| ident.value.clone())
                .ok_or_else(|| PlannerError::InvalidQuery("empty table name".to_string())),
            other => Err(PlannerError::UnsupportedExpression(format!("FROM {}", other))),
        }
    }

    fn projection(&self, select: &Select, table: &str) -> Result<Projection, PlannerError> {
        let items = select
            .projection
            .iter()
            .map(|item| self.projection_item(item, table))
            .collect::<Result<Vec<_>, _>>()?;

        match items.as_slice() {
            [ProjectionItem::Wildcard] => Ok(Projection::AllColumns),
            [ProjectionItem::CountStar] => Ok(Projection::CountStar),
            _ => {
                let mut columns = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        ProjectionItem::Column(name) => columns.push(name),
                        ProjectionItem::Wildcard | ProjectionItem::CountStar => {
                            return Err(PlannerError::UnsupportedExpression(format!(
                                "mixed projection: {}",
                                select
                                    .projection
                                    .iter()
                                    .map(ToString::to_string)
                                    .collect::<Vec<_>>()
                                    .join(", ")
                            )));
                        }
                    }
                }
                Ok(Projection::ColumnList(columns))
            }
        }
    }

    fn projection_item(&self, item: &SelectItem, table: &str) -> Result<ProjectionItem, PlannerError> {
        match item {
            SelectItem::Wildcard(_) => Ok(ProjectionItem::Wildcard),
            SelectItem::UnnamedExpr(expr) | SelectItem::ExprWithAlias { expr, .. } => {
                if let Some(column) = column_name(expr, table) {
                    return Ok(ProjectionItem::Column(column));
                }
                if is_count_star(expr) {
                    return Ok(ProjectionItem::CountStar);
                }
                Err(PlannerError::UnsupportedExpression(expr.to_string()))
            }
            other => Err(PlannerError::UnsupportedExpression(other.to_string())),
        }
    }

    fn predicate(&self, expr: &Expr, table: &str) -> Result<EqualityPredicate, PlannerError> {
        match expr {
            Expr::Nested(inner) => self.predicate(inner, table),
            Expr::BinaryOp {
                left,
                op: BinaryOperator::Eq,
                right,
            } => {
                let column = column_name(left, table)
                    .ok_or_else(|| PlannerError::UnsupportedExpression(left.to_string()))?;
                let literal = literal_text(right)
                    .ok_or_else(|| PlannerError::UnsupportedExpression(right.to_string()))?;
                Ok(EqualityPredicate { column, literal })
            }
            _ => Err(PlannerError::UnsupportedExpression(format!(
                "WHERE {}",
                expr
            ))),
        }
    }
}

/// Bare or `table.column` identifier.
fn column_name(expr: &Expr, table: &str) -> Option<String> {
    match expr {
        Expr::Identifier(ident) => Some(ident.value.clone()),
        Expr::CompoundIdentifier(parts) => match parts.as_slice() {
            [qualifier, column] if qualifier.value == table => Some(column.value.clone()),
            _ => None,
        },
        Expr::Nested(inner) => column_name(inner, table),
        _ => None,
    }
}

fn is_count_star(expr: &Expr) -> bool {
    let Expr::Function(function) = expr else {
        return false;
    };
    if !function.name.to_string().eq_ignore_ascii_case("count")
        || function.filter.is_some()
        || function.over.is_some()
    {
        return false;
    }
    match &function.args {
        FunctionArguments::List(list) => {
            list.duplicate_treatment.is_none()
                && list.clauses.is_empty()
                && matches!(
                    list.args.as_slice(),
                    [FunctionArg::Unnamed(FunctionArgExpr::Wildcard)]
                )
        }
        _ => false,
    }
}

fn literal_text(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Value(SqlValue::SingleQuotedString(s))
        | Expr::Value(SqlValue::DoubleQuotedString(s)) => Some(s.clone()),
        Expr::Value(SqlValue::Number(n, _)) => Some(n.clone()),
        // SQLite reads an unresolvable "double quoted" name as a string
        Expr::Identifier(ident) if ident.quote_style == Some('"') => Some(ident.value.clone()),
        Expr::UnaryOp {
            op: UnaryOperator::Minus,
            expr,
        } => match expr.as_ref() {
            Expr::Value(SqlValue::Number(n, _)) => Some(format!("-{}", n)),
            _ => None,
        },
        Expr::Nested(inner) => literal_text(inner),
        _ => None,
    }
}
