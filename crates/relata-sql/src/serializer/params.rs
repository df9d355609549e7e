use super::{Formatter, ToSql};

use relata_core::stmt::Value;

/// Receives bound values in placeholder order.
pub trait Params {
    fn push(&mut self, param: &Value) -> Placeholder;
}

/// One-based position of a bound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder(pub usize);

impl Params for Vec<Value> {
    fn push(&mut self, value: &Value) -> Placeholder {
        self.push(value.clone());
        Placeholder(self.len())
    }
}

impl ToSql for Placeholder {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        if f.serializer.is_postgresql() {
            f.dst.push('$');
            f.dst.push_str(&self.0.to_string());
        } else {
            f.dst.push('?');
        }
    }
}
