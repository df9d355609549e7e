use super::{Formatter, Ident, Params, ToSql};

use relata_core::stmt::Source;

impl ToSql for &Source {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            Source::Table(table) => match &table.alias {
                Some(alias) if *alias != table.name => {
                    fmt!(f, Ident(&table.name) " AS " Ident(alias));
                }
                _ => fmt!(f, Ident(&table.name)),
            },
            Source::Subquery(subquery) => {
                let select = &*subquery.select;
                fmt!(f, "(" select ") AS " Ident(&subquery.alias));
            }
            Source::Join(join) => {
                let right = match &join.right {
                    Source::Join(_) => ("(", &join.right, ")"),
                    _ => ("", &join.right, ""),
                };

                let on = &join.on;
                fmt!(f, &join.left " " join.op.as_sql() " " right " ON " on);
            }
        }
    }
}
