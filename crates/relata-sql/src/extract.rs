use relata_core::stmt::{visit, Expr, ExprOp, Op, Source, Statement, Value, Visit};

/// The values a statement binds, in placeholder order.
///
/// Walks the tree in the serializer's rendering order. NULLs and booleans
/// are written inline and identifiers are never parameters, so neither shows
/// up here.
pub fn extract_values(stmt: &Statement) -> Vec<Value> {
    let mut extract = Extract::default();
    extract.visit_statement(stmt);
    extract.values
}

pub fn extract_expr_values(expr: &Expr) -> Vec<Value> {
    let mut extract = Extract::default();
    extract.visit_expr(expr);
    extract.values
}

pub fn extract_source_values(source: &Source) -> Vec<Value> {
    let mut extract = Extract::default();
    extract.visit_source(source);
    extract.values
}

#[derive(Default)]
struct Extract {
    values: Vec<Value>,
}

impl Visit for Extract {
    fn visit_expr_op(&mut self, node: &ExprOp) {
        // An empty membership test renders as a constant and binds nothing.
        if matches!(node.op, Op::In | Op::NotIn) && node.operands.get(1).is_some_and(is_empty_list)
        {
            return;
        }

        visit::visit_expr_op(self, node);
    }

    fn visit_value(&mut self, value: &Value) {
        match value {
            Value::Null | Value::Bool(_) => {}
            Value::List(items) => {
                for item in items {
                    self.visit_value(item);
                }
            }
            value => self.values.push(value.clone()),
        }
    }
}

fn is_empty_list(expr: &Expr) -> bool {
    match expr {
        Expr::List(items) => items.is_empty(),
        Expr::Value(Value::List(items)) => items.is_empty(),
        _ => false,
    }
}
