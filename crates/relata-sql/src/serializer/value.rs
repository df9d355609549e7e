use super::{Comma, Formatter, Params, ToSql};

use relata_core::stmt::Value;

impl ToSql for &Value {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            Value::Null => fmt!(f, "NULL"),
            Value::Bool(true) => fmt!(f, "true"),
            Value::Bool(false) => fmt!(f, "false"),
            Value::List(items) => fmt!(f, "(" Comma(items) ")"),
            Value::Record(_) => unreachable!("record values are rejected before rendering"),
            value => {
                let placeholder = f.params.push(value);
                fmt!(f, placeholder);
            }
        }
    }
}
