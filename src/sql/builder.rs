//! sea-query glue.
//!
//! Field values become sea-query expressions, and a rendered statement becomes a
//! [`Statement`] whose bound values are converted back into [`QueryParam`]s for
//! the sqlx binders.

use crate::error::{DbError, DbResult};
use crate::models::{FieldValue, QueryParam, Statement};
use crate::sql::coerce::{Coerced, coerce};
use crate::sql::dialect::Dialect;
use sea_query::{Expr, SimpleExpr, Value, Values};

pub const NULL_KEYWORD: &str = "NULL";

/// Expression for a value written to or compared with a column.
///
/// Dates go through the dialect's date constructor with their text bound, nulls
/// render as the keyword, everything else is bound as-is.
pub fn value_expr(dialect: &dyn Dialect, value: &FieldValue) -> SimpleExpr {
    match coerce(value) {
        Coerced::Null => Expr::cust(NULL_KEYWORD),
        Coerced::Date(text) => Expr::cust_with_values(
            dialect.date_constructor(dialect.template_marker()),
            [text],
        ),
        Coerced::Bind(param) => SimpleExpr::Value(to_value(param)),
    }
}

fn to_value(param: QueryParam) -> Value {
    match param {
        QueryParam::Null => Value::String(None),
        QueryParam::Bool(v) => v.into(),
        QueryParam::Int(v) => v.into(),
        QueryParam::Float(v) => v.into(),
        QueryParam::String(v) => v.into(),
    }
}

fn to_param(value: Value) -> DbResult<QueryParam> {
    let param = match value {
        Value::Bool(Some(v)) => QueryParam::Bool(v),
        Value::TinyInt(Some(v)) => QueryParam::Int(v.into()),
        Value::SmallInt(Some(v)) => QueryParam::Int(v.into()),
        Value::Int(Some(v)) => QueryParam::Int(v.into()),
        Value::BigInt(Some(v)) => QueryParam::Int(v),
        Value::TinyUnsigned(Some(v)) => QueryParam::Int(v.into()),
        Value::SmallUnsigned(Some(v)) => QueryParam::Int(v.into()),
        Value::Unsigned(Some(v)) => QueryParam::Int(v.into()),
        Value::BigUnsigned(Some(v)) => QueryParam::Int(i64::try_from(v).map_err(|_| {
            DbError::invalid_input(format!("Value {} is out of range for a bound integer", v))
        })?),
        Value::Float(Some(v)) => QueryParam::Float(v.into()),
        Value::Double(Some(v)) => QueryParam::Float(v),
        Value::String(Some(v)) => QueryParam::String(v.to_string()),
        Value::Char(Some(v)) => QueryParam::String(v.to_string()),
        Value::Bool(None)
        | Value::TinyInt(None)
        | Value::SmallInt(None)
        | Value::Int(None)
        | Value::BigInt(None)
        | Value::TinyUnsigned(None)
        | Value::SmallUnsigned(None)
        | Value::Unsigned(None)
        | Value::BigUnsigned(None)
        | Value::Float(None)
        | Value::Double(None)
        | Value::String(None)
        | Value::Char(None) => QueryParam::Null,
        other => {
            return Err(DbError::internal(format!(
                "Unsupported bound value: {:?}",
                other
            )));
        }
    };
    Ok(param)
}

/// Turn a `(sql, values)` pair from a sea-query backend into a [`Statement`].
pub fn render((sql, values): (String, Values)) -> DbResult<Statement> {
    let params = values
        .0
        .into_iter()
        .map(to_param)
        .collect::<DbResult<Vec<_>>>()?;
    Ok(Statement::new(sql, params))
}
