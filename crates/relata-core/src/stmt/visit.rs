#![allow(unused_variables)]

use super::{
    Delete, Expr, ExprAlias, ExprFunc, ExprOp, Insert, Join, OrderByExpr, Path, Select, Source,
    Statement, Update, Value,
};

/// Read-only traversal over statement trees.
///
/// Every walker visits children in the same order the SQL serializer renders
/// them, so a visitor collecting values sees them in placeholder order.
pub trait Visit {
    fn visit_expr(&mut self, i: &Expr) {
        visit_expr(self, i);
    }

    fn visit_expr_alias(&mut self, i: &ExprAlias) {
        visit_expr_alias(self, i);
    }

    fn visit_expr_func(&mut self, i: &ExprFunc) {
        visit_expr_func(self, i);
    }

    fn visit_expr_op(&mut self, i: &ExprOp) {
        visit_expr_op(self, i);
    }

    fn visit_path(&mut self, i: &Path) {}

    fn visit_value(&mut self, i: &Value) {}

    fn visit_select(&mut self, i: &Select) {
        visit_select(self, i);
    }

    fn visit_source(&mut self, i: &Source) {
        visit_source(self, i);
    }

    fn visit_join(&mut self, i: &Join) {
        visit_join(self, i);
    }

    fn visit_order_by_expr(&mut self, i: &OrderByExpr) {
        visit_order_by_expr(self, i);
    }

    fn visit_insert(&mut self, i: &Insert) {
        visit_insert(self, i);
    }

    fn visit_update(&mut self, i: &Update) {
        visit_update(self, i);
    }

    fn visit_delete(&mut self, i: &Delete) {
        visit_delete(self, i);
    }

    fn visit_statement(&mut self, i: &Statement) {
        visit_statement(self, i);
    }
}

impl<V: Visit + ?Sized> Visit for &mut V {
    fn visit_expr(&mut self, i: &Expr) {
        Visit::visit_expr(&mut **self, i);
    }

    fn visit_expr_alias(&mut self, i: &ExprAlias) {
        Visit::visit_expr_alias(&mut **self, i);
    }

    fn visit_expr_func(&mut self, i: &ExprFunc) {
        Visit::visit_expr_func(&mut **self, i);
    }

    fn visit_expr_op(&mut self, i: &ExprOp) {
        Visit::visit_expr_op(&mut **self, i);
    }

    fn visit_path(&mut self, i: &Path) {
        Visit::visit_path(&mut **self, i);
    }

    fn visit_value(&mut self, i: &Value) {
        Visit::visit_value(&mut **self, i);
    }

    fn visit_select(&mut self, i: &Select) {
        Visit::visit_select(&mut **self, i);
    }

    fn visit_source(&mut self, i: &Source) {
        Visit::visit_source(&mut **self, i);
    }

    fn visit_join(&mut self, i: &Join) {
        Visit::visit_join(&mut **self, i);
    }

    fn visit_order_by_expr(&mut self, i: &OrderByExpr) {
        Visit::visit_order_by_expr(&mut **self, i);
    }

    fn visit_insert(&mut self, i: &Insert) {
        Visit::visit_insert(&mut **self, i);
    }

    fn visit_update(&mut self, i: &Update) {
        Visit::visit_update(&mut **self, i);
    }

    fn visit_delete(&mut self, i: &Delete) {
        Visit::visit_delete(&mut **self, i);
    }

    fn visit_statement(&mut self, i: &Statement) {
        Visit::visit_statement(&mut **self, i);
    }
}

pub fn visit_expr<V>(v: &mut V, node: &Expr)
where
    V: Visit + ?Sized,
{
    match node {
        Expr::Field(path) => v.visit_path(path),
        Expr::Value(value) => v.visit_value(value),
        Expr::List(items) => {
            for item in items {
                v.visit_expr(item);
            }
        }
        Expr::Op(expr) => v.visit_expr_op(expr),
        Expr::Func(expr) => v.visit_expr_func(expr),
        Expr::Alias(expr) => v.visit_expr_alias(expr),
        Expr::Subquery(select) => v.visit_select(select),
        Expr::Star => {}
    }
}

pub fn visit_expr_alias<V>(v: &mut V, node: &ExprAlias)
where
    V: Visit + ?Sized,
{
    v.visit_expr(&node.expr);
}

pub fn visit_expr_func<V>(v: &mut V, node: &ExprFunc)
where
    V: Visit + ?Sized,
{
    for arg in &node.args {
        v.visit_expr(arg);
    }
}

pub fn visit_expr_op<V>(v: &mut V, node: &ExprOp)
where
    V: Visit + ?Sized,
{
    for operand in &node.operands {
        v.visit_expr(operand);
    }
}

pub fn visit_select<V>(v: &mut V, node: &Select)
where
    V: Visit + ?Sized,
{
    for field in &node.fields {
        v.visit_expr(field);
    }

    v.visit_source(&node.source);

    if let Some(filter) = &node.filter {
        v.visit_expr(filter);
    }

    for order_by in &node.order_by {
        v.visit_order_by_expr(order_by);
    }

    for value in node.pagination_values() {
        v.visit_value(&value);
    }
}

pub fn visit_source<V>(v: &mut V, node: &Source)
where
    V: Visit + ?Sized,
{
    match node {
        Source::Table(_) => {}
        Source::Subquery(subquery) => v.visit_select(&subquery.select),
        Source::Join(join) => v.visit_join(join),
    }
}

pub fn visit_join<V>(v: &mut V, node: &Join)
where
    V: Visit + ?Sized,
{
    v.visit_source(&node.left);
    v.visit_source(&node.right);
    v.visit_expr(&node.on);
}

pub fn visit_order_by_expr<V>(v: &mut V, node: &OrderByExpr)
where
    V: Visit + ?Sized,
{
    v.visit_expr(&node.expr);
}

pub fn visit_insert<V>(v: &mut V, node: &Insert)
where
    V: Visit + ?Sized,
{
    for (_, value) in &node.values {
        v.visit_expr(value);
    }
}

pub fn visit_update<V>(v: &mut V, node: &Update)
where
    V: Visit + ?Sized,
{
    for (_, value) in &node.assignments {
        v.visit_expr(value);
    }

    if let Some(filter) = &node.filter {
        v.visit_expr(filter);
    }
}

pub fn visit_delete<V>(v: &mut V, node: &Delete)
where
    V: Visit + ?Sized,
{
    if let Some(filter) = &node.filter {
        v.visit_expr(filter);
    }
}

pub fn visit_statement<V>(v: &mut V, node: &Statement)
where
    V: Visit + ?Sized,
{
    match node {
        Statement::Query(stmt) => v.visit_select(stmt),
        Statement::Insert(stmt) => v.visit_insert(stmt),
        Statement::Update(stmt) => v.visit_update(stmt),
        Statement::Delete(stmt) => v.visit_delete(stmt),
    }
}

/// Calls `f` for every expression node, parents before children.
pub fn for_each_expr<F>(node: &Expr, f: F)
where
    F: FnMut(&Expr),
{
    struct ForEach<F> {
        f: F,
    }

    impl<F> Visit for ForEach<F>
    where
        F: FnMut(&Expr),
    {
        fn visit_expr(&mut self, node: &Expr) {
            (self.f)(node);
            visit_expr(self, node);
        }
    }

    ForEach { f }.visit_expr(node);
}
