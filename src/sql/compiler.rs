//! Statement compiler.
//!
//! Turns an abstract operation on a table descriptor into one or more
//! parameterized statements for a given [`Dialect`]. Compilation is pure: it
//! holds no state besides the dialect and can run from any number of tasks.

use crate::error::{DbError, DbResult};
use crate::models::{
    CompiledStatement, Entity, FieldValue, Operation, QueryOptions, Statement, TableDescriptor,
};
use crate::sql::builder::{render, value_expr};
use crate::sql::dialect::Dialect;
use indexmap::IndexMap;
use sea_query::{Alias, Asterisk, ConditionalStatement, Expr, Query, SimpleExpr};

/// Seed predicate of every filter so conditions can be appended uniformly.
pub const ALWAYS_TRUE: &str = "1=1";

#[derive(Debug, Clone, Copy)]
pub struct StatementCompiler<'d> {
    dialect: &'d dyn Dialect,
}

impl<'d> StatementCompiler<'d> {
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> &'d dyn Dialect {
        self.dialect
    }

    /// Compile `operation` against `table`.
    ///
    /// `entity` is required (and must be non-empty) for `Insert` and `Update`, and
    /// ignored for every other operation. `options.where` applies to `Find`,
    /// `Update` and `Delete`; `limit`/`skip` apply to `Find` only, and `skip` is
    /// dropped when no `limit` is given.
    pub fn compile(
        &self,
        operation: Operation,
        table: &TableDescriptor,
        entity: Option<&Entity>,
        options: Option<&QueryOptions>,
    ) -> DbResult<CompiledStatement> {
        if table.name.trim().is_empty() {
            return Err(DbError::invalid_input("Table name cannot be empty"));
        }

        let empty = Entity::new();
        let entity = if operation.requires_entity() {
            match entity {
                Some(e) if !e.is_empty() => e,
                _ => {
                    return Err(DbError::invalid_input(format!(
                        "Operation '{}' on table '{}' requires at least one field value",
                        operation, table.name
                    )));
                }
            }
        } else {
            &empty
        };
        let filter = options
            .and_then(|o| o.filter.as_ref())
            .filter(|_| operation.accepts_filter());
        let table_name = Alias::new(table.name.as_str());

        let statement = match operation {
            Operation::Define => return self.create_table(table),
            Operation::Alter => return self.alter_table(table),
            Operation::Drop => Statement::new(
                format!("DROP TABLE {}", self.dialect.quote_identifier(&table.name)),
                Vec::new(),
            ),
            Operation::Find => {
                let mut query = Query::select();
                query.column(Asterisk).from(table_name);
                if let Some(filter) = filter {
                    self.push_where(&mut query, filter);
                }
                if let Some(limit) = options.and_then(|o| o.limit) {
                    query.limit(limit);
                    if let Some(skip) = options.and_then(|o| o.skip) {
                        query.offset(skip);
                    }
                }
                render(self.dialect.build_select(&query))?
            }
            Operation::Insert => {
                let mut query = Query::insert();
                query
                    .into_table(table_name)
                    .columns(entity.keys().map(|column| Alias::new(column.as_str())))
                    .values(entity.values().map(|value| self.value(value)))
                    .map_err(|e| DbError::invalid_input(e.to_string()))?;
                render(self.dialect.build_insert(&query))?
            }
            Operation::Update => {
                let mut query = Query::update();
                query.table(table_name);
                for (column, value) in entity {
                    query.value(Alias::new(column.as_str()), self.value(value));
                }
                if let Some(filter) = filter {
                    self.push_where(&mut query, filter);
                }
                render(self.dialect.build_update(&query))?
            }
            Operation::Delete => {
                let mut query = Query::delete();
                query.from_table(table_name);
                if let Some(filter) = filter {
                    self.push_where(&mut query, filter);
                }
                render(self.dialect.build_delete(&query))?
            }
        };

        Ok(CompiledStatement::single(operation, statement))
    }

    fn value(&self, value: &FieldValue) -> SimpleExpr {
        value_expr(self.dialect, value)
    }

    /// `WHERE 1=1 AND <col> = <value> ...`; a null value compares with `IS NULL`.
    fn push_where<Q: ConditionalStatement>(
        &self,
        query: &mut Q,
        filter: &IndexMap<String, FieldValue>,
    ) {
        query.and_where(Expr::cust(ALWAYS_TRUE));
        for (column, value) in filter {
            let column = Expr::col(Alias::new(column.as_str()));
            let condition = if value.is_null() {
                column.is_null()
            } else {
                column.eq(self.value(value))
            };
            query.and_where(condition);
        }
    }

    fn column_clauses(&self, table: &TableDescriptor) -> DbResult<Vec<String>> {
        if table.columns.is_empty() {
            return Err(DbError::invalid_input(format!(
                "Table '{}' must declare at least one column",
                table.name
            )));
        }
        Ok(table
            .columns
            .iter()
            .map(|(name, column)| self.dialect.map_column(name, column))
            .collect())
    }

    fn create_table(&self, table: &TableDescriptor) -> DbResult<CompiledStatement> {
        let sql = format!(
            "CREATE TABLE {} ({})",
            self.dialect.quote_identifier(&table.name),
            self.column_clauses(table)?.join(", ")
        );
        Ok(CompiledStatement::single(
            Operation::Define,
            Statement::new(sql, Vec::new()),
        ))
    }

    fn alter_table(&self, table: &TableDescriptor) -> DbResult<CompiledStatement> {
        let quoted = self.dialect.quote_identifier(&table.name);
        let statements = self
            .column_clauses(table)?
            .into_iter()
            .map(|clause| {
                Statement::new(
                    format!("ALTER TABLE {} {}", quoted, self.dialect.add_column(&clause)),
                    Vec::new(),
                )
            })
            .collect();
        Ok(CompiledStatement {
            operation: Operation::Alter,
            statements,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnDefinition, QueryParam};
    use crate::sql::dialect::{HANA, MYSQL, POSTGRES, SQLITE};
    use chrono::NaiveDate;

    fn users() -> TableDescriptor {
        TableDescriptor::new("users")
            .with_column("id", ColumnDefinition::new("integer").primary_key())
            .with_column("name", ColumnDefinition::new("string"))
    }

    fn entity(pairs: &[(&str, FieldValue)]) -> Entity {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    // The seed predicate may come back parenthesized once conditions follow it.
    fn sql_of(compiled: &CompiledStatement) -> String {
        compiled.sql().replace("(1=1)", "1=1")
    }

    #[test]
    fn test_define_single_create_table() {
        let compiled = StatementCompiler::new(&HANA)
            .compile(Operation::Define, &users(), None, None)
            .unwrap();
        assert_eq!(compiled.statements.len(), 1);
        let sql = &compiled.statements[0].sql;
        assert_eq!(
            sql,
            "CREATE TABLE \"users\" (\"id\" INTEGER(5) PRIMARY KEY, \"name\" VARCHAR(256))"
        );
        assert!(!sql.contains(",)"));
        assert!(!sql.contains(", )"));
        assert!(compiled.statements[0].params.is_empty());
    }

    #[test]
    fn test_define_requires_columns() {
        let err = StatementCompiler::new(&HANA)
            .compile(Operation::Define, &TableDescriptor::new("empty"), None, None)
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidInput { .. }));
    }

    #[test]
    fn test_alter_one_statement_per_column() {
        let table = TableDescriptor::new("users")
            .with_column("born", ColumnDefinition::new("date"))
            .with_column("age", ColumnDefinition::new("integer"));
        let compiled = StatementCompiler::new(&HANA)
            .compile(Operation::Alter, &table, None, None)
            .unwrap();
        let sqls: Vec<&str> = compiled.statements.iter().map(|s| s.sql.as_str()).collect();
        assert_eq!(
            sqls,
            vec![
                "ALTER TABLE \"users\" ADD (\"born\" DATE)",
                "ALTER TABLE \"users\" ADD (\"age\" INTEGER(5))",
            ]
        );

        let compiled = StatementCompiler::new(&POSTGRES)
            .compile(Operation::Alter, &table, None, None)
            .unwrap();
        assert_eq!(
            compiled.statements[1].sql,
            "ALTER TABLE \"users\" ADD COLUMN \"age\" INTEGER"
        );
    }

    #[test]
    fn test_alter_requires_columns() {
        let result = StatementCompiler::new(&SQLITE).compile(
            Operation::Alter,
            &TableDescriptor::new("users"),
            None,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_find_with_where_limit_skip() {
        let options = QueryOptions::new().with_where("id", 5).with_limit(10).with_skip(2);
        let compiled = StatementCompiler::new(&HANA)
            .compile(Operation::Find, &users(), None, Some(&options))
            .unwrap();
        assert_eq!(
            sql_of(&compiled),
            "SELECT * FROM \"users\" WHERE 1=1 AND \"id\" = ? LIMIT ? OFFSET ?"
        );
        assert_eq!(
            compiled.statements[0].params,
            vec![QueryParam::Int(5), QueryParam::Int(10), QueryParam::Int(2)]
        );
    }

    #[test]
    fn test_find_postgres_numbers_placeholders() {
        let options = QueryOptions::new().with_where("id", 5).with_where("name", "Ann");
        let compiled = StatementCompiler::new(&POSTGRES)
            .compile(Operation::Find, &users(), None, Some(&options))
            .unwrap();
        assert_eq!(
            sql_of(&compiled),
            "SELECT * FROM \"users\" WHERE 1=1 AND \"id\" = $1 AND \"name\" = $2"
        );
    }

    #[test]
    fn test_offset_never_without_limit() {
        let options = QueryOptions::new().with_skip(2);
        let compiled = StatementCompiler::new(&HANA)
            .compile(Operation::Find, &users(), None, Some(&options))
            .unwrap();
        assert_eq!(compiled.sql(), "SELECT * FROM \"users\"");
        assert_eq!(compiled.params().count(), 0);
    }

    #[test]
    fn test_empty_where_keeps_seed_predicate() {
        let options = QueryOptions {
            filter: Some(IndexMap::new()),
            ..Default::default()
        };
        let compiled = StatementCompiler::new(&HANA)
            .compile(Operation::Find, &users(), None, Some(&options))
            .unwrap();
        assert_eq!(sql_of(&compiled), "SELECT * FROM \"users\" WHERE 1=1");
    }

    #[test]
    fn test_null_filter_uses_is_null() {
        let options = QueryOptions::new().with_where("name", FieldValue::Null);
        let compiled = StatementCompiler::new(&HANA)
            .compile(Operation::Delete, &users(), None, Some(&options))
            .unwrap();
        assert_eq!(
            sql_of(&compiled),
            "DELETE FROM \"users\" WHERE 1=1 AND \"name\" IS NULL"
        );
        assert!(compiled.statements[0].params.is_empty());
    }

    #[test]
    fn test_insert_binds_text_unmodified() {
        let values = entity(&[("name", "Ann".into())]);
        let compiled = StatementCompiler::new(&HANA)
            .compile(Operation::Insert, &users(), Some(&values), None)
            .unwrap();
        let stmt = &compiled.statements[0];
        assert_eq!(stmt.sql, "INSERT INTO \"users\" (\"name\") VALUES (?)");
        assert_eq!(stmt.params, vec![QueryParam::String("Ann".into())]);
    }

    #[test]
    fn test_insert_date_is_bare_constructor_call() {
        let created = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_milli_opt(7, 8, 9, 500)
            .unwrap();
        let values = entity(&[("created", created.into())]);
        let compiled = StatementCompiler::new(&HANA)
            .compile(Operation::Insert, &users(), Some(&values), None)
            .unwrap();
        let stmt = &compiled.statements[0];
        assert_eq!(
            stmt.sql,
            "INSERT INTO \"users\" (\"created\") VALUES (TO_DATE(?, 'yyyy-mm-dd hh24:mi:ss'))"
        );
        assert!(!stmt.sql.contains("'TO_DATE"));
        assert_eq!(
            stmt.params,
            vec![QueryParam::String("2024-05-06 07:08:09".into())]
        );
    }

    #[test]
    fn test_null_values_render_as_keyword() {
        let values = entity(&[("id", FieldValue::Int(1)), ("name", FieldValue::Null)]);
        let compiler = StatementCompiler::new(&POSTGRES);

        let insert = compiler
            .compile(Operation::Insert, &users(), Some(&values), None)
            .unwrap();
        assert_eq!(
            insert.sql(),
            "INSERT INTO \"users\" (\"id\", \"name\") VALUES ($1, NULL)"
        );
        assert_eq!(insert.statements[0].params, vec![QueryParam::Int(1)]);

        let cleared = entity(&[("name", FieldValue::Null)]);
        let options = QueryOptions::new().with_where("id", 1);
        let update = compiler
            .compile(Operation::Update, &users(), Some(&cleared), Some(&options))
            .unwrap();
        assert_eq!(
            sql_of(&update),
            "UPDATE \"users\" SET \"name\" = NULL WHERE 1=1 AND \"id\" = $1"
        );
        assert_eq!(update.statements[0].params, vec![QueryParam::Int(1)]);
    }

    #[test]
    fn test_insert_requires_entity() {
        let compiler = StatementCompiler::new(&MYSQL);
        assert!(compiler
            .compile(Operation::Insert, &users(), None, None)
            .is_err());
        assert!(compiler
            .compile(Operation::Update, &users(), Some(&Entity::new()), None)
            .is_err());
    }

    #[test]
    fn test_update_sets_fields_and_filters() {
        let values = entity(&[("name", "Bob".into())]);
        let options = QueryOptions::new().with_where("id", 1).with_limit(5);
        let compiled = StatementCompiler::new(&MYSQL)
            .compile(Operation::Update, &users(), Some(&values), Some(&options))
            .unwrap();
        assert_eq!(
            sql_of(&compiled),
            "UPDATE `users` SET `name` = ? WHERE 1=1 AND `id` = ?"
        );
        assert_eq!(
            compiled.statements[0].params,
            vec![QueryParam::String("Bob".into()), QueryParam::Int(1)]
        );
    }

    #[test]
    fn test_delete_ignores_entity() {
        let values = entity(&[("name", "Bob".into())]);
        let compiled = StatementCompiler::new(&SQLITE)
            .compile(Operation::Delete, &users(), Some(&values), None)
            .unwrap();
        assert_eq!(compiled.sql(), "DELETE FROM \"users\"");
        assert_eq!(compiled.params().count(), 0);
    }

    #[test]
    fn test_drop_table() {
        let compiled = StatementCompiler::new(&POSTGRES)
            .compile(Operation::Drop, &users(), None, None)
            .unwrap();
        assert_eq!(compiled.sql(), "DROP TABLE \"users\"");
    }

    #[test]
    fn test_empty_table_name_rejected() {
        let result = StatementCompiler::new(&HANA).compile(
            Operation::Find,
            &TableDescriptor::new(" "),
            None,
            None,
        );
        assert!(matches!(result, Err(DbError::InvalidInput { .. })));
    }

    #[test]
    fn test_hostile_identifier_stays_quoted() {
        let options = QueryOptions::new().with_where("id\" OR \"1\"=\"1", 1);
        let compiled = StatementCompiler::new(&POSTGRES)
            .compile(Operation::Find, &users(), None, Some(&options))
            .unwrap();
        assert_eq!(
            sql_of(&compiled),
            "SELECT * FROM \"users\" WHERE 1=1 AND \"id\"\" OR \"\"1\"\"=\"\"1\" = $1"
        );
    }
}
