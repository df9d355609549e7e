use super::{conjoin, Constraint, Expr, Op, Path, Value};
use crate::{Error, Result};

use serde_json::{Map, Value as Json};

impl Expr {
    /// Parses a JSON clause map.
    ///
    /// Keys are field paths. A scalar value is NULL-aware equality, an array
    /// is membership, and an object maps operator names to their arguments
    /// (`{"qty": {"between": [1, 5]}}`). The keys `or`, `and` and `not` group
    /// a sub-map, or a list of sub-maps, under that operator.
    pub fn from_json(clause: &Json) -> Result<Expr> {
        match clause {
            Json::Object(entries) => Ok(clause_from_map(entries)?.unwrap_or_default()),
            Json::Null => Ok(Expr::default()),
            other => Err(Error::invalid_statement(format!(
                "clause must be a JSON object; got `{other}`"
            ))),
        }
    }
}

fn clause_from_map(entries: &Map<String, Json>) -> Result<Option<Expr>> {
    let mut clauses = vec![];

    for (key, value) in entries {
        let clause = match key.as_str() {
            "and" => group(value)?.map(Expr::and_from_vec),
            "or" => group(value)?.map(Expr::or_from_vec),
            "not" => group(value)?.map(|operands| Expr::not(Expr::and_from_vec(operands))),
            field => Some(field_clause(Path::parse(field), value)?),
        };

        clauses.push(clause);
    }

    Ok(conjoin(clauses))
}

/// A grouped sub-clause: an object contributes one operand per entry, a list
/// contributes one conjunction per element.
fn group(value: &Json) -> Result<Option<Vec<Expr>>> {
    let operands: Vec<Expr> = match value {
        Json::Object(entries) => {
            let mut operands = vec![];
            for (key, value) in entries {
                let single = Map::from_iter([(key.clone(), value.clone())]);
                operands.extend(clause_from_map(&single)?);
            }
            operands
        }
        Json::Array(items) => {
            let mut operands = vec![];
            for item in items {
                operands.extend(match item {
                    Json::Object(entries) => clause_from_map(entries)?,
                    other => {
                        return Err(Error::invalid_statement(format!(
                            "grouped clause must be an object; got `{other}`"
                        )))
                    }
                });
            }
            operands
        }
        other => {
            return Err(Error::invalid_statement(format!(
                "grouped clause must be an object or a list; got `{other}`"
            )))
        }
    };

    Ok(if operands.is_empty() {
        None
    } else {
        Some(operands)
    })
}

fn field_clause(field: Path, value: &Json) -> Result<Expr> {
    let Json::Object(ops) = value else {
        return Ok(Constraint::from(Value::from(value.clone())).apply(field));
    };

    if ops.is_empty() {
        return Err(Error::invalid_statement(format!(
            "empty operator map for field `{field}`"
        )));
    }

    let clauses = ops
        .iter()
        .map(|(name, args)| {
            let args = operator_args(Op::from_symbol(name), args);
            Constraint::named(name, args).apply(field.clone())
        })
        .collect::<Vec<_>>();

    Ok(Expr::and_from_vec(clauses))
}

/// Membership operators take their list whole; every other operator spreads
/// an array into positional arguments.
fn operator_args(op: Option<Op>, args: &Json) -> Vec<Expr> {
    match (op, args) {
        (Some(Op::In | Op::NotIn), args) => vec![Expr::from(Value::from(args.clone()))],
        (_, Json::Array(items)) => items
            .iter()
            .map(|item| Expr::from(Value::from(item.clone())))
            .collect(),
        (_, Json::Null) if matches!(op, Some(Op::IsNull | Op::IsNotNull)) => vec![],
        (_, arg) => vec![Expr::from(Value::from(arg.clone()))],
    }
}
