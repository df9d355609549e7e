use super::{Op, Path, Select, Value};

/// An expression tree. Clauses, projected fields and ordering keys are all
/// expressions; a clause is simply an expression of boolean type.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A (possibly namespaced) field reference.
    Field(Path),

    /// A constant. Scalars become parameters, NULL and booleans are inlined.
    Value(Value),

    /// Parenthesized list, the right-hand side of a membership test.
    List(Vec<Expr>),

    /// A recognised operator applied to its operands.
    Op(ExprOp),

    /// A function call, rendered verbatim with an upper-cased name.
    Func(ExprFunc),

    /// `expr AS "alias"`
    Alias(ExprAlias),

    /// A nested query, rendered parenthesized.
    Subquery(Box<Select>),

    /// `*`, only meaningful as a projection or inside `COUNT(*)`.
    Star,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprOp {
    pub op: Op,
    pub operands: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprFunc {
    pub name: String,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprAlias {
    pub expr: Box<Expr>,
    pub alias: String,
}

impl Expr {
    pub fn field(path: impl Into<Path>) -> Self {
        Self::Field(path.into())
    }

    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }

    pub fn op(op: Op, operands: impl IntoIterator<Item = Expr>) -> Self {
        Self::Op(ExprOp {
            op,
            operands: operands.into_iter().collect(),
        })
    }

    pub fn func(name: impl Into<String>, args: impl IntoIterator<Item = Expr>) -> Self {
        Self::Func(ExprFunc {
            name: name.into(),
            args: args.into_iter().collect(),
        })
    }

    pub fn alias(self, alias: impl Into<String>) -> Self {
        Self::Alias(ExprAlias {
            expr: Box::new(self),
            alias: alias.into(),
        })
    }

    pub fn subquery(select: impl Into<Select>) -> Self {
        Self::Subquery(Box::new(select.into()))
    }

    pub fn list(items: impl IntoIterator<Item = impl Into<Expr>>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    pub fn count_star() -> Self {
        Self::func("count", [Expr::Star])
    }

    pub fn eq(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::op(Op::Eq, [lhs.into(), rhs.into()])
    }

    pub fn ne(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::op(Op::Ne, [lhs.into(), rhs.into()])
    }

    /// NULL-aware equality, used for scalar entries of clause maps.
    pub fn is_eq(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::op(Op::IsEq, [lhs.into(), rhs.into()])
    }

    pub fn is_ne(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::op(Op::IsNe, [lhs.into(), rhs.into()])
    }

    pub fn lt(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::op(Op::Lt, [lhs.into(), rhs.into()])
    }

    pub fn gt(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::op(Op::Gt, [lhs.into(), rhs.into()])
    }

    pub fn le(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::op(Op::Le, [lhs.into(), rhs.into()])
    }

    pub fn ge(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::op(Op::Ge, [lhs.into(), rhs.into()])
    }

    pub fn in_list(lhs: impl Into<Expr>, items: impl IntoIterator<Item = impl Into<Expr>>) -> Self {
        Self::op(Op::In, [lhs.into(), Expr::list(items)])
    }

    pub fn not_in_list(
        lhs: impl Into<Expr>,
        items: impl IntoIterator<Item = impl Into<Expr>>,
    ) -> Self {
        Self::op(Op::NotIn, [lhs.into(), Expr::list(items)])
    }

    pub fn in_subquery(lhs: impl Into<Expr>, select: impl Into<Select>) -> Self {
        Self::op(Op::In, [lhs.into(), Expr::subquery(select)])
    }

    pub fn like(lhs: impl Into<Expr>, pattern: impl Into<Expr>) -> Self {
        Self::op(Op::Like, [lhs.into(), pattern.into()])
    }

    pub fn ilike(lhs: impl Into<Expr>, pattern: impl Into<Expr>) -> Self {
        Self::op(Op::ILike, [lhs.into(), pattern.into()])
    }

    pub fn between(
        expr: impl Into<Expr>,
        low: impl Into<Expr>,
        high: impl Into<Expr>,
    ) -> Self {
        Self::op(Op::Between, [expr.into(), low.into(), high.into()])
    }

    pub fn exists(select: impl Into<Select>) -> Self {
        Self::op(Op::Exists, [Expr::subquery(select)])
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(expr: impl Into<Expr>) -> Self {
        Self::op(Op::Not, [expr.into()])
    }

    pub fn is_null(expr: impl Into<Expr>) -> Self {
        Self::op(Op::IsNull, [expr.into()])
    }

    pub fn is_not_null(expr: impl Into<Expr>) -> Self {
        Self::op(Op::IsNotNull, [expr.into()])
    }

    #[allow(clippy::should_implement_trait)]
    pub fn add(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::op(Op::Add, [lhs.into(), rhs.into()])
    }

    #[allow(clippy::should_implement_trait)]
    pub fn sub(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::op(Op::Sub, [lhs.into(), rhs.into()])
    }

    #[allow(clippy::should_implement_trait)]
    pub fn mul(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::op(Op::Mul, [lhs.into(), rhs.into()])
    }

    #[allow(clippy::should_implement_trait)]
    pub fn div(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::op(Op::Div, [lhs.into(), rhs.into()])
    }

    /// The boolean constant `true`; the neutral element of conjunction.
    pub fn is_true(&self) -> bool {
        matches!(self, Self::Value(Value::Bool(true)))
    }

    pub fn is_false(&self) -> bool {
        matches!(self, Self::Value(Value::Bool(false)))
    }

    pub fn as_field(&self) -> Option<&Path> {
        match self {
            Self::Field(path) => Some(path),
            _ => None,
        }
    }

    pub fn as_op(&self) -> Option<&ExprOp> {
        match self {
            Self::Op(op) => Some(op),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// The expression with any alias removed.
    pub fn unaliased(&self) -> &Expr {
        match self {
            Self::Alias(alias) => alias.expr.unaliased(),
            expr => expr,
        }
    }
}

impl Default for Expr {
    fn default() -> Self {
        Expr::Value(Value::Bool(true))
    }
}

impl From<Path> for Expr {
    fn from(value: Path) -> Self {
        Self::Field(value)
    }
}

impl From<&Path> for Expr {
    fn from(value: &Path) -> Self {
        Self::Field(value.clone())
    }
}

impl From<ExprOp> for Expr {
    fn from(value: ExprOp) -> Self {
        Self::Op(value)
    }
}

impl From<ExprFunc> for Expr {
    fn from(value: ExprFunc) -> Self {
        Self::Func(value)
    }
}

impl From<Select> for Expr {
    fn from(value: Select) -> Self {
        Self::Subquery(Box::new(value))
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        match value {
            Value::List(items) => Self::List(items.into_iter().map(Expr::Value).collect()),
            value => Self::Value(value),
        }
    }
}

macro_rules! impl_from_scalar {
    ( $($t:ty),+ ) => {
        $(
            impl From<$t> for Expr {
                fn from(value: $t) -> Self {
                    Self::Value(Value::from(value))
                }
            }
        )+
    };
}

impl_from_scalar!(bool, i32, i64, u32, f64, String, &String, &str);
