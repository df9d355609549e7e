mod constraint;
pub use constraint::Constraint;

mod delete;
pub use delete::Delete;

mod expr;
pub use expr::{Expr, ExprAlias, ExprFunc, ExprOp};

mod expr_and;
pub use expr_and::conjoin;

mod insert;
pub use insert::Insert;

mod json;

mod namespace;
pub use namespace::{collect_namespaces, for_each_path};

mod op;
pub use op::{Arity, Op};

mod path;
pub use path::{Namespace, Path};

mod record;
pub use record::Record;

mod select;
pub use select::{Direction, OrderByExpr, Select};

mod source;
pub use source::{Join, JoinOp, Source, SourceSubquery, TableRef};

mod statement;
pub use statement::Statement;

mod update;
pub use update::Update;

mod value;
pub use value::Value;

pub mod visit;
pub use visit::Visit;

pub mod visit_mut;
pub use visit_mut::VisitMut;
