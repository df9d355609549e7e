#[macro_use]
mod fmt;
use fmt::ToSql;

mod delim;
use delim::{Comma, Delimited};

mod flavor;

mod ident;
use ident::{Ident, Quoted};

mod params;
pub use params::{Params, Placeholder};

mod validate;

// Fragment serializers
mod expr;
mod source;
mod statement;
mod value;

use relata_core::{
    driver::{operation::Transaction, SqlFlavor},
    stmt::{Expr, Source, Statement, Value},
    Result,
};

/// Serialize a statement to a SQL string
#[derive(Debug, Clone, Copy)]
pub struct Serializer {
    /// The database flavor handles the differences between SQL dialects and
    /// supported features.
    flavor: SqlFlavor,
}

/// A rendered statement together with its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub sql: String,
    pub params: Vec<Value>,
}

struct Formatter<'a, T> {
    /// Handle to the serializer
    serializer: &'a Serializer,

    /// Where to write the serialized SQL
    dst: &'a mut String,

    /// Where to store parameters
    params: &'a mut T,
}

impl Serializer {
    /// Validates and renders `stmt`, pushing one parameter per placeholder.
    pub fn serialize(&self, stmt: &Statement, params: &mut impl Params) -> Result<String> {
        validate::statement(stmt)?;

        let mut ret = String::new();
        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
            params,
        };

        stmt.to_sql(&mut fmt);

        Ok(ret)
    }

    /// Renders `stmt` into SQL text plus its parameter list.
    pub fn compile(&self, stmt: &Statement) -> Result<Compiled> {
        let mut params = vec![];
        let sql = self.serialize(stmt, &mut params)?;

        debug_assert_eq!(
            params,
            crate::extract_values(stmt),
            "placeholder values out of step with extraction; sql={sql}"
        );

        tracing::debug!(
            flavor = ?self.flavor,
            sql = %sql,
            params = params.len(),
            "compiled statement"
        );

        Ok(Compiled { sql, params })
    }

    /// Renders a projected field: identifiers, function calls, aliases and
    /// sub-queries.
    pub fn format_field(&self, expr: &Expr, params: &mut impl Params) -> Result<String> {
        validate::expr(expr)?;
        Ok(self.render(params, |f| expr.to_sql(f)))
    }

    /// Renders a boolean clause.
    pub fn format_clause(&self, expr: &Expr, params: &mut impl Params) -> Result<String> {
        validate::expr(expr)?;
        Ok(self.render(params, |f| expr.to_sql(f)))
    }

    /// Renders a source tree: tables, aliased sub-queries and joins.
    pub fn format_source(&self, source: &Source, params: &mut impl Params) -> Result<String> {
        validate::source(source)?;
        Ok(self.render(params, |f| source.to_sql(f)))
    }

    fn render<P: Params>(&self, params: &mut P, f: impl FnOnce(&mut Formatter<'_, P>)) -> String {
        let mut ret = String::new();
        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
            params,
        };
        f(&mut fmt);
        ret
    }

    /// Serialize a transaction control operation to a SQL string.
    ///
    /// MySQL uses `START TRANSACTION` while the other flavors use `BEGIN`.
    /// Savepoints are named `sp_{n}`.
    pub fn serialize_transaction(&self, op: &Transaction) -> String {
        match op {
            Transaction::Start if self.is_mysql() => "START TRANSACTION".to_string(),
            Transaction::Start => "BEGIN".to_string(),
            Transaction::Commit => "COMMIT".to_string(),
            Transaction::Rollback => "ROLLBACK".to_string(),
            Transaction::Savepoint(id) => format!("SAVEPOINT sp_{id}"),
            Transaction::ReleaseSavepoint(id) => format!("RELEASE SAVEPOINT sp_{id}"),
            Transaction::RollbackToSavepoint(id) => format!("ROLLBACK TO SAVEPOINT sp_{id}"),
        }
    }

    pub fn flavor(&self) -> SqlFlavor {
        self.flavor
    }
}
