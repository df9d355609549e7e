use super::{visit, visit_mut, Expr, Namespace, OrderByExpr, Path, Select, Visit};

use indexmap::IndexSet;

impl Expr {
    /// Qualifies every unqualified field with `namespace`. Qualified fields,
    /// operators and nested sub-queries are left alone.
    pub fn ensure_prefixed(mut self, namespace: &Namespace) -> Expr {
        visit_mut::for_each_path_mut(&mut self, |path| {
            if !path.is_qualified() {
                *path = path.ensure_prefixed(namespace);
            }
        });
        self
    }

    /// Drops `namespace` from fields qualified with exactly that namespace.
    pub fn strip_namespace(mut self, namespace: &Namespace) -> Expr {
        visit_mut::for_each_path_mut(&mut self, |path| {
            *path = path.strip_namespace(namespace);
        });
        self
    }

    /// Moves fields under `from` to live under `to`.
    pub fn rebase(mut self, from: &Namespace, to: &Namespace) -> Expr {
        visit_mut::for_each_path_mut(&mut self, |path| {
            *path = path.rebase(from, to);
        });
        self
    }

    /// Every namespace referenced by a field of this expression, in first
    /// reference order. Sub-queries are not entered.
    pub fn namespaces(&self) -> IndexSet<Namespace> {
        let mut namespaces = IndexSet::new();
        collect_namespaces([self], &mut namespaces);
        namespaces
    }

    /// True when every field lives in `namespace` (or below it) and there is
    /// at least one field.
    pub fn references_only(&self, namespace: &Namespace) -> bool {
        let mut any = false;
        let mut only = true;

        for_each_path(self, |path| {
            any = true;
            only &= path.is_prefixed(namespace);
        });

        any && only
    }

    /// Partitions the top-level conjuncts: those referencing only `namespace`
    /// on the left, everything else on the right.
    pub fn split_by_namespace(self, namespace: &Namespace) -> (Option<Expr>, Option<Expr>) {
        let (matched, rest): (Vec<_>, Vec<_>) = self
            .into_conjuncts()
            .into_iter()
            .partition(|conjunct| conjunct.references_only(namespace));

        (super::conjoin(matched), super::conjoin(rest))
    }
}

impl OrderByExpr {
    pub fn ensure_prefixed(self, namespace: &Namespace) -> OrderByExpr {
        OrderByExpr {
            expr: self.expr.ensure_prefixed(namespace),
            direction: self.direction,
        }
    }
}

/// Collects the namespaces of a list of expressions into `dst`.
pub fn collect_namespaces<'a>(
    exprs: impl IntoIterator<Item = &'a Expr>,
    dst: &mut IndexSet<Namespace>,
) {
    for expr in exprs {
        for_each_path(expr, |path| {
            if path.is_qualified() {
                dst.insert(path.namespace().clone());
            }
        });
    }
}

/// Calls `f` for every field path outside nested sub-queries.
pub fn for_each_path<F>(expr: &Expr, f: F)
where
    F: FnMut(&Path),
{
    struct ForEachPath<F> {
        f: F,
    }

    impl<F> Visit for ForEachPath<F>
    where
        F: FnMut(&Path),
    {
        fn visit_path(&mut self, path: &Path) {
            (self.f)(path);
        }

        fn visit_select(&mut self, _: &Select) {}
    }

    visit::visit_expr(&mut ForEachPath { f }, expr);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_prefixed_skips_qualified_and_subqueries() {
        let ns = Namespace::root("employee");
        let expr = Expr::and(
            Expr::is_eq(Expr::field("name"), "Jane"),
            Expr::is_eq(Expr::field("employee.person/name"), "Doe"),
        )
        .ensure_prefixed(&ns);

        assert_eq!(
            expr,
            Expr::and(
                Expr::is_eq(Expr::field("employee/name"), "Jane"),
                Expr::is_eq(Expr::field("employee.person/name"), "Doe"),
            )
        );

        let sub = Expr::in_subquery(Expr::field("id"), Select::new("people").filter(Expr::field("x")));
        let prefixed = sub.ensure_prefixed(&ns);
        let Expr::Op(op) = &prefixed else { panic!() };
        assert_eq!(op.operands[0], Expr::field("employee/id"));
        let Expr::Subquery(select) = &op.operands[1] else { panic!() };
        assert_eq!(select.filter, Some(Expr::field("x")));
    }

    #[test]
    fn namespaces_in_reference_order() {
        let expr = Expr::and(
            Expr::is_eq(Expr::field("employee.person/name"), "Jane"),
            Expr::gt(Expr::field("employee/id"), 3),
        );

        let namespaces: Vec<_> = expr.namespaces().into_iter().map(|ns| ns.alias()).collect();
        assert_eq!(namespaces, ["employee.person", "employee"]);
    }

    #[test]
    fn split_by_namespace() {
        let related = Namespace::parse("employee.person");
        let expr = Expr::and_from_vec(vec![
            Expr::is_eq(Expr::field("employee.person/name"), "Jane"),
            Expr::is_eq(Expr::field("employee/active"), true),
            Expr::or(
                Expr::is_eq(Expr::field("employee.person/name"), "A"),
                Expr::is_eq(Expr::field("employee/id"), 1),
            ),
        ]);

        let (matched, rest) = expr.split_by_namespace(&related);

        assert_eq!(
            matched,
            Some(Expr::is_eq(Expr::field("employee.person/name"), "Jane"))
        );
        assert_eq!(
            rest,
            Some(Expr::and(
                Expr::is_eq(Expr::field("employee/active"), true),
                Expr::or(
                    Expr::is_eq(Expr::field("employee.person/name"), "A"),
                    Expr::is_eq(Expr::field("employee/id"), 1),
                ),
            ))
        );
    }

    #[test]
    fn strip_and_rebase() {
        let expr = Expr::is_eq(Expr::field("document/status"), "new");
        assert_eq!(
            expr.clone().strip_namespace(&"document".into()),
            Expr::is_eq(Expr::field("status"), "new")
        );
        assert_eq!(
            expr.rebase(&"document".into(), &"doc".into()),
            Expr::is_eq(Expr::field("doc/status"), "new")
        );
    }
}
