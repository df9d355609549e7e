use super::{conjoin, Expr, Op, Path, Value};

/// The right-hand side of one entry in a clause map.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// NULL-aware equality.
    Value(Value),

    /// Membership in an ordered list of scalars.
    List(Vec<Value>),

    /// An explicit predicate; the field is the first operand.
    Op(Op, Vec<Expr>),

    /// A verbatim function call; the field is the first argument.
    Func(String, Vec<Expr>),
}

impl Constraint {
    pub fn op(op: Op, args: impl IntoIterator<Item = impl Into<Expr>>) -> Self {
        Self::Op(op, args.into_iter().map(Into::into).collect())
    }

    /// Resolves an operator name. Names outside the operator table become
    /// function calls.
    pub fn named(name: &str, args: impl IntoIterator<Item = impl Into<Expr>>) -> Self {
        let args = args.into_iter().map(Into::into).collect();

        match Op::from_symbol(name) {
            Some(op) => Self::Op(op, args),
            None => Self::Func(name.to_string(), args),
        }
    }

    /// Builds the clause for `field <constraint>`.
    pub fn apply(self, field: Path) -> Expr {
        let field = Expr::Field(field);

        match self {
            Self::Value(value) => Expr::is_eq(field, value),
            Self::List(items) => Expr::in_list(field, items),
            Self::Op(op, args) => Expr::op(op, std::iter::once(field).chain(args)),
            Self::Func(name, args) => Expr::func(name, std::iter::once(field).chain(args)),
        }
    }
}

impl From<Value> for Constraint {
    fn from(value: Value) -> Self {
        match value {
            Value::List(items) => Self::List(items),
            value => Self::Value(value),
        }
    }
}

macro_rules! impl_from_scalar {
    ( $($t:ty),+ ) => {
        $(
            impl From<$t> for Constraint {
                fn from(value: $t) -> Self {
                    Self::Value(Value::from(value))
                }
            }
        )+
    };
}

impl_from_scalar!(bool, i32, i64, u32, f64, String, &String, &str);

impl<T: Into<Value>> From<Vec<T>> for Constraint {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl Expr {
    /// Builds a clause from field → constraint entries. Entries are
    /// conjoined; an empty map is `true`.
    pub fn from_map<I, K, C>(entries: I) -> Expr
    where
        I: IntoIterator<Item = (K, C)>,
        K: Into<Path>,
        C: Into<Constraint>,
    {
        conjoin(
            entries
                .into_iter()
                .map(|(field, constraint)| constraint.into().apply(field.into())),
        )
        .unwrap_or_default()
    }
}
