use super::{Comma, Formatter, Ident, Params, ToSql};

use relata_core::stmt::{self, Statement};

/// `LIMIT` used when only an offset is given, for flavors that cannot
/// express `OFFSET` on its own.
const SQLITE_NO_LIMIT: &str = "-1";
const MYSQL_NO_LIMIT: &str = "18446744073709551615";

impl ToSql for &Statement {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            Statement::Query(stmt) => stmt.to_sql(f),
            Statement::Insert(stmt) => stmt.to_sql(f),
            Statement::Update(stmt) => stmt.to_sql(f),
            Statement::Delete(stmt) => stmt.to_sql(f),
        }
    }
}

impl ToSql for &stmt::Select {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let distinct = if self.distinct { "DISTINCT " } else { "" };

        fmt!(f, "SELECT " distinct);

        if self.fields.is_empty() {
            fmt!(f, "*");
        } else {
            fmt!(f, Comma(&self.fields));
        }

        let source = &self.source;
        fmt!(f, " FROM " source Filter(&self.filter));

        if !self.order_by.is_empty() {
            fmt!(f, " ORDER BY " Comma(&self.order_by));
        }

        let mut pagination = self.pagination_values();

        match (self.limit, self.offset) {
            (Some(_), offset) => {
                if let Some(ref limit) = pagination.next() {
                    fmt!(f, " LIMIT " limit);
                }
                if offset.is_some() {
                    if let Some(ref offset) = pagination.next() {
                        fmt!(f, " OFFSET " offset);
                    }
                }
            }
            (None, Some(_)) => {
                if f.serializer.is_sqlite() {
                    fmt!(f, " LIMIT " SQLITE_NO_LIMIT);
                } else if f.serializer.is_mysql() {
                    fmt!(f, " LIMIT " MYSQL_NO_LIMIT);
                }
                if let Some(ref offset) = pagination.next() {
                    fmt!(f, " OFFSET " offset);
                }
            }
            (None, None) => {}
        }
    }
}

impl ToSql for &stmt::OrderByExpr {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self.direction {
            Some(stmt::Direction::Asc) => fmt!(f, &self.expr " ASC"),
            Some(stmt::Direction::Desc) => fmt!(f, &self.expr " DESC"),
            None => fmt!(f, &self.expr),
        }
    }
}

impl ToSql for &stmt::Insert {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "INSERT INTO " Ident(&self.table));

        if self.values.is_empty() {
            if f.serializer.is_mysql() {
                fmt!(f, " () VALUES ()");
            } else {
                fmt!(f, " DEFAULT VALUES");
            }
        } else {
            let columns = Comma(self.values.iter().map(|(column, _)| Ident(column)));
            let values = Comma(self.values.iter().map(|(_, value)| value));
            fmt!(f, " (" columns ") VALUES (" values ")");
        }

        if !self.returning.is_empty() && f.serializer.supports_returning() {
            fmt!(f, " RETURNING " Comma(self.returning.iter().map(Ident)));
        }
    }
}

impl ToSql for &stmt::Update {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let assignments = Comma(
            self.assignments
                .iter()
                .map(|(column, value)| (Ident(column), " = ", value)),
        );

        fmt!(f, "UPDATE " Ident(&self.table) " SET " assignments Filter(&self.filter));
    }
}

impl ToSql for &stmt::Delete {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "DELETE FROM " Ident(&self.table) Filter(&self.filter));
    }
}

/// ` WHERE <clause>`, omitted when there is no filter or the filter is the
/// constant `true`.
struct Filter<'a>(&'a Option<stmt::Expr>);

impl ToSql for Filter<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self.0 {
            Some(expr) if !expr.is_true() => fmt!(f, " WHERE " expr),
            _ => {}
        }
    }
}
