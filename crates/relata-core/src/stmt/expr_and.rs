use super::{Expr, ExprOp, Op};

impl Expr {
    /// Conjoins two clauses. `true` operands disappear and nested `AND` nodes
    /// are flattened, so `and(true, x)` is just `x`.
    pub fn and(lhs: impl Into<Self>, rhs: impl Into<Self>) -> Self {
        conjoin([lhs.into(), rhs.into()]).unwrap_or_default()
    }

    pub fn and_from_vec(operands: Vec<Self>) -> Self {
        conjoin(operands).unwrap_or_default()
    }

    /// Disjunction. Unlike `and`, `true` is not dropped; nested `OR` nodes
    /// are flattened.
    pub fn or(lhs: impl Into<Self>, rhs: impl Into<Self>) -> Self {
        Self::or_from_vec(vec![lhs.into(), rhs.into()])
    }

    pub fn or_from_vec(operands: Vec<Self>) -> Self {
        let mut flat = vec![];

        for operand in operands {
            push_flattened(Op::Or, &mut flat, operand);
        }

        match flat.len() {
            0 => false.into(),
            1 => flat.pop().unwrap_or_default(),
            _ => Expr::op(Op::Or, flat),
        }
    }

    /// The top-level conjuncts of this clause. A non-`AND` clause is its own
    /// single conjunct; `true` has none.
    pub fn into_conjuncts(self) -> Vec<Expr> {
        match self {
            Expr::Op(ExprOp {
                op: Op::And,
                operands,
            }) => operands,
            expr if expr.is_true() => vec![],
            expr => vec![expr],
        }
    }
}

/// Combines clauses with `AND`, skipping absent and `true` operands.
///
/// Returns `None` when nothing is left, and the operand itself when exactly
/// one remains; no `AND` node is ever built around a single clause.
pub fn conjoin<I>(clauses: I) -> Option<Expr>
where
    I: IntoIterator,
    I::Item: Into<Option<Expr>>,
{
    let mut operands = vec![];

    for clause in clauses {
        match clause.into() {
            Some(expr) if !expr.is_true() => push_flattened(Op::And, &mut operands, expr),
            _ => {}
        }
    }

    match operands.len() {
        0 => None,
        1 => operands.pop(),
        _ => Some(Expr::op(Op::And, operands)),
    }
}

fn push_flattened(op: Op, operands: &mut Vec<Expr>, expr: Expr) {
    match expr {
        Expr::Op(nested) if nested.op == op => operands.extend(nested.operands),
        expr => operands.push(expr),
    }
}
