//! Structural checks run before rendering, so a malformed tree is rejected
//! instead of producing SQL whose placeholders do not line up.

use relata_core::{
    stmt::{
        visit, Expr, ExprOp, Insert, Op, Source, Statement, Update, Value, Visit,
    },
    Error, Result,
};

pub(super) fn statement(stmt: &Statement) -> Result<()> {
    run(|v| v.visit_statement(stmt))
}

pub(super) fn expr(expr: &Expr) -> Result<()> {
    run(|v| v.visit_expr(expr))
}

pub(super) fn source(source: &Source) -> Result<()> {
    run(|v| v.visit_source(source))
}

fn run(f: impl FnOnce(&mut Validate)) -> Result<()> {
    let mut validate = Validate { err: None };
    f(&mut validate);

    match validate.err {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct Validate {
    err: Option<Error>,
}

impl Validate {
    fn fail(&mut self, message: String) {
        if self.err.is_none() {
            self.err = Some(Error::invalid_statement(message));
        }
    }

    fn check_scalar(&mut self, value: &Value) {
        if !value.is_scalar() {
            self.fail(format!(
                "{} value in scalar position: {value:?}",
                value.type_name()
            ));
        }
    }
}

impl Visit for Validate {
    fn visit_expr_op(&mut self, node: &ExprOp) {
        let arity = node.op.arity();

        if !arity.accepts(node.operands.len()) {
            self.fail(format!(
                "{} takes {arity} operands; got {}",
                node.op,
                node.operands.len()
            ));
            return;
        }

        match (node.op, &node.operands[..]) {
            (Op::In | Op::NotIn, [lhs, rhs]) => {
                self.visit_expr(lhs);

                match rhs {
                    Expr::List(_) | Expr::Subquery(_) => self.visit_expr(rhs),
                    Expr::Value(Value::List(items)) => {
                        for item in items {
                            self.check_scalar(item);
                        }
                    }
                    other => self.fail(format!(
                        "{} expects a list or a sub-query; got {other:?}",
                        node.op
                    )),
                }
            }
            (Op::Exists, [Expr::Subquery(_)]) => visit::visit_expr_op(self, node),
            (Op::Exists, [other]) => {
                self.fail(format!("EXISTS expects a sub-query; got {other:?}"));
            }
            _ => visit::visit_expr_op(self, node),
        }
    }

    fn visit_value(&mut self, value: &Value) {
        self.check_scalar(value);
    }

    fn visit_insert(&mut self, node: &Insert) {
        if node.table.is_empty() {
            self.fail("INSERT without a target table".to_string());
        }

        visit::visit_insert(self, node);
    }

    fn visit_update(&mut self, node: &Update) {
        if node.assignments.is_empty() {
            self.fail(format!("UPDATE of `{}` has no assignments", node.table));
        }

        visit::visit_update(self, node);
    }
}
