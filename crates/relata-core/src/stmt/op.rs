use std::fmt;

/// Operators recognised by the clause language and the compiler.
///
/// Anything outside this table is rendered as a verbatim function call
/// (`Expr::Func`), which is how stored procedures are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Eq,
    Ne,
    /// NULL-aware equality: renders `IS` when the right-hand side is NULL or
    /// a boolean.
    IsEq,
    /// NULL-aware inequality: renders `IS NOT` when the right-hand side is
    /// NULL or a boolean.
    IsNe,
    Lt,
    Gt,
    Le,
    Ge,
    In,
    NotIn,
    Like,
    ILike,
    Between,
    Exists,
    And,
    Or,
    Not,
    IsNull,
    IsNotNull,
    Add,
    Sub,
    Mul,
    Div,
}

/// How many operands an operator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Exactly(expected) => n == expected,
            Arity::AtLeast(min) => n >= min,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "exactly {n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

impl Op {
    /// Looks up an operator by its symbol or name, as written in clause maps.
    pub fn from_symbol(symbol: &str) -> Option<Op> {
        use Op::*;

        Some(match symbol.to_ascii_lowercase().as_str() {
            "=" | "==" | "eq" => Eq,
            "<>" | "!=" | "ne" | "not=" => Ne,
            "is" => IsEq,
            "is-not" | "is_not" => IsNe,
            "<" | "lt" => Lt,
            ">" | "gt" => Gt,
            "<=" | "le" => Le,
            ">=" | "ge" => Ge,
            "in" => In,
            "not-in" | "not_in" => NotIn,
            "like" => Like,
            "ilike" => ILike,
            "between" => Between,
            "exists" => Exists,
            "and" => And,
            "or" => Or,
            "not" => Not,
            "is-null" | "is_null" => IsNull,
            "is-not-null" | "is_not_null" => IsNotNull,
            "+" => Add,
            "-" => Sub,
            "*" => Mul,
            "/" => Div,
            _ => return None,
        })
    }

    pub fn arity(self) -> Arity {
        use Op::*;

        match self {
            Eq | Ne | IsEq | IsNe | Lt | Gt | Le | Ge | In | NotIn | Like | ILike => {
                Arity::Exactly(2)
            }
            Between => Arity::Exactly(3),
            Exists | Not | IsNull | IsNotNull => Arity::Exactly(1),
            And | Or => Arity::AtLeast(1),
            Add | Sub | Mul | Div => Arity::AtLeast(2),
        }
    }

    pub fn is_boolean(self) -> bool {
        !self.is_arithmetic()
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(self, Op::Add | Op::Sub | Op::Mul | Op::Div)
    }

    /// The SQL token for infix operators.
    pub fn infix(self) -> Option<&'static str> {
        use Op::*;

        Some(match self {
            Eq => "=",
            Ne => "<>",
            Lt => "<",
            Gt => ">",
            Le => "<=",
            Ge => ">=",
            Like => "LIKE",
            ILike => "ILIKE",
            And => "AND",
            Or => "OR",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            _ => return None,
        })
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Op::*;

        let name = match self {
            IsEq => "IS",
            IsNe => "IS NOT",
            In => "IN",
            NotIn => "NOT IN",
            Between => "BETWEEN",
            Exists => "EXISTS",
            Not => "NOT",
            IsNull => "IS NULL",
            IsNotNull => "IS NOT NULL",
            op => op.infix().unwrap_or("?"),
        };

        f.write_str(name)
    }
}
