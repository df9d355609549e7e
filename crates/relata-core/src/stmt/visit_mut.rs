#![allow(unused_variables)]

use super::{Expr, OrderByExpr, Path, Select, Source, Value};

/// Mutable traversal over expression trees.
pub trait VisitMut {
    fn visit_expr_mut(&mut self, i: &mut Expr) {
        visit_expr_mut(self, i);
    }

    fn visit_path_mut(&mut self, i: &mut Path) {}

    fn visit_value_mut(&mut self, i: &mut Value) {}

    fn visit_select_mut(&mut self, i: &mut Select) {
        visit_select_mut(self, i);
    }

    fn visit_source_mut(&mut self, i: &mut Source) {
        visit_source_mut(self, i);
    }

    fn visit_order_by_expr_mut(&mut self, i: &mut OrderByExpr) {
        visit_order_by_expr_mut(self, i);
    }
}

pub fn visit_expr_mut<V>(v: &mut V, node: &mut Expr)
where
    V: VisitMut + ?Sized,
{
    match node {
        Expr::Field(path) => v.visit_path_mut(path),
        Expr::Value(value) => v.visit_value_mut(value),
        Expr::List(items) => {
            for item in items {
                v.visit_expr_mut(item);
            }
        }
        Expr::Op(expr) => {
            for operand in &mut expr.operands {
                v.visit_expr_mut(operand);
            }
        }
        Expr::Func(expr) => {
            for arg in &mut expr.args {
                v.visit_expr_mut(arg);
            }
        }
        Expr::Alias(expr) => v.visit_expr_mut(&mut expr.expr),
        Expr::Subquery(select) => v.visit_select_mut(select),
        Expr::Star => {}
    }
}

pub fn visit_select_mut<V>(v: &mut V, node: &mut Select)
where
    V: VisitMut + ?Sized,
{
    for field in &mut node.fields {
        v.visit_expr_mut(field);
    }

    v.visit_source_mut(&mut node.source);

    if let Some(filter) = &mut node.filter {
        v.visit_expr_mut(filter);
    }

    for order_by in &mut node.order_by {
        v.visit_order_by_expr_mut(order_by);
    }
}

pub fn visit_source_mut<V>(v: &mut V, node: &mut Source)
where
    V: VisitMut + ?Sized,
{
    match node {
        Source::Table(_) => {}
        Source::Subquery(subquery) => v.visit_select_mut(&mut subquery.select),
        Source::Join(join) => {
            v.visit_source_mut(&mut join.left);
            v.visit_source_mut(&mut join.right);
            v.visit_expr_mut(&mut join.on);
        }
    }
}

pub fn visit_order_by_expr_mut<V>(v: &mut V, node: &mut OrderByExpr)
where
    V: VisitMut + ?Sized,
{
    v.visit_expr_mut(&mut node.expr);
}

/// Calls `f` on every field path outside nested sub-queries.
pub fn for_each_path_mut<F>(node: &mut Expr, f: F)
where
    F: FnMut(&mut Path),
{
    struct ForEachPath<F> {
        f: F,
    }

    impl<F> VisitMut for ForEachPath<F>
    where
        F: FnMut(&mut Path),
    {
        fn visit_path_mut(&mut self, path: &mut Path) {
            (self.f)(path);
        }

        // Sub-queries carry their own namespaces.
        fn visit_select_mut(&mut self, _: &mut Select) {}
    }

    ForEachPath { f }.visit_expr_mut(node);
}
