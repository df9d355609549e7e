use super::{Comma, Delimited, Formatter, Ident, Params, Quoted, ToSql};

use relata_core::stmt::{self, Expr, Op, Value};

impl ToSql for &Expr {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            Expr::Field(path) => path.to_sql(f),
            Expr::Value(value) => value.to_sql(f),
            Expr::List(items) => fmt!(f, "(" Comma(items) ")"),
            Expr::Op(expr) => expr.to_sql(f),
            Expr::Func(func) => {
                let name = func.name.to_ascii_uppercase();
                fmt!(f, name.as_str() "(" Comma(&func.args) ")");
            }
            Expr::Alias(alias) => fmt!(f, &*alias.expr " AS " Quoted(&alias.alias)),
            Expr::Subquery(select) => {
                let select = &**select;
                fmt!(f, "(" select ")");
            }
            Expr::Star => fmt!(f, "*"),
        }
    }
}

impl ToSql for &stmt::Path {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        if self.is_qualified() {
            fmt!(f, Ident(self.namespace().alias()) "." Ident(self.name()));
        } else {
            fmt!(f, Ident(self.name()));
        }
    }
}

impl ToSql for &stmt::ExprOp {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let op = self.op;
        let operands = &self.operands[..];
        let operand = |i: usize| Operand::new(op, &operands[i]);

        match op {
            Op::And | Op::Or => {
                let sep = if op == Op::And { " AND " } else { " OR " };
                let operands = operands.iter().map(|expr| Operand { parent: op, expr });
                fmt!(f, Delimited(operands, sep));
            }
            Op::IsEq | Op::IsNe => {
                let token = match (op, inlined_rhs(&operands[1])) {
                    (Op::IsEq, true) => "IS",
                    (Op::IsEq, false) => "=",
                    (_, true) => "IS NOT",
                    (_, false) => "<>",
                };
                fmt!(f, operand(0) " " token " " operand(1));
            }
            Op::In | Op::NotIn if is_empty_list(&operands[1]) => {
                fmt!(f, if op == Op::In { "1 = 0" } else { "1 = 1" });
            }
            Op::In | Op::NotIn => {
                let token = if op == Op::In { " IN " } else { " NOT IN " };
                let list = &operands[1];
                fmt!(f, operand(0) token list);
            }
            Op::ILike if !f.serializer.is_postgresql() => {
                fmt!(f, operand(0) " LIKE " operand(1));
            }
            Op::Between => {
                fmt!(f, operand(0) " BETWEEN " operand(1) " AND " operand(2));
            }
            Op::Exists => {
                let subquery = &operands[0];
                fmt!(f, "EXISTS " subquery);
            }
            Op::Not => {
                let negated = &operands[0];
                fmt!(f, "NOT (" negated ")");
            }
            Op::IsNull => fmt!(f, operand(0) " IS NULL"),
            Op::IsNotNull => fmt!(f, operand(0) " IS NOT NULL"),
            Op::Add | Op::Sub | Op::Mul | Op::Div => {
                let sep = match op {
                    Op::Add => " + ",
                    Op::Sub => " - ",
                    Op::Mul => " * ",
                    _ => " / ",
                };
                let operands = operands.iter().map(|expr| Operand { parent: op, expr });
                fmt!(f, Delimited(operands, sep));
            }
            Op::Eq | Op::Ne | Op::Lt | Op::Gt | Op::Le | Op::Ge | Op::Like | Op::ILike => {
                let token = op.infix().unwrap_or("=");
                fmt!(f, operand(0) " " token " " operand(1));
            }
        }
    }
}

/// An operand rendered under `parent`, parenthesized when precedence would
/// otherwise change its meaning.
struct Operand<'a> {
    parent: Op,
    expr: &'a Expr,
}

impl<'a> Operand<'a> {
    fn new(parent: Op, expr: &'a Expr) -> Operand<'a> {
        Operand { parent, expr }
    }
}

impl ToSql for Operand<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let wrap = match self.expr {
            Expr::Op(child) => match child.op {
                Op::And | Op::Or => child.op != self.parent,
                child_op if child_op.is_arithmetic() => self.parent.is_arithmetic(),
                _ => false,
            },
            _ => false,
        };

        if wrap {
            fmt!(f, "(" self.expr ")");
        } else {
            self.expr.to_sql(f);
        }
    }
}

fn inlined_rhs(expr: &Expr) -> bool {
    matches!(expr, Expr::Value(value) if value.is_inlined())
}

fn is_empty_list(expr: &Expr) -> bool {
    match expr {
        Expr::List(items) => items.is_empty(),
        Expr::Value(Value::List(items)) => items.is_empty(),
        _ => false,
    }
}
