use super::{Formatter, Params, ToSql};

/// An identifier written by a caller. `-` becomes `_`; the result is
/// written bare when it is a plain lower-case word and not reserved,
/// double-quoted otherwise.
pub(super) struct Ident<S>(pub(super) S);

/// Always double-quoted, written verbatim. Used for column aliases, which
/// carry namespace labels such as `person/name`.
pub(super) struct Quoted<S>(pub(super) S);

impl<S: AsRef<str>> ToSql for Ident<S> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let name = self.0.as_ref().replace('-', "_");

        if is_bare(&name) {
            f.dst.push_str(&name);
        } else {
            Quoted(&name).to_sql(f);
        }
    }
}

impl<S: AsRef<str>> ToSql for Quoted<S> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        f.dst.push('"');
        f.dst.push_str(&self.0.as_ref().replace('"', "\"\""));
        f.dst.push('"');
    }
}

fn is_bare(name: &str) -> bool {
    let mut chars = name.chars();

    let Some(first) = chars.next() else {
        return false;
    };

    (first.is_ascii_lowercase() || first == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !is_reserved(name)
}

fn is_reserved(name: &str) -> bool {
    RESERVED.binary_search(&name).is_ok()
}

/// Sorted; checked with a binary search.
const RESERVED: &[&str] = &[
    "all", "alter", "and", "any", "as", "asc", "begin", "between", "by", "case", "check",
    "column", "commit", "constraint", "create", "cross", "default", "delete", "desc",
    "distinct", "drop", "else", "end", "except", "exists", "false", "foreign", "from", "full",
    "grant", "group", "having", "in", "index", "inner", "insert", "intersect", "into", "is",
    "join", "key", "left", "like", "limit", "natural", "not", "null", "offset", "on", "or",
    "order", "outer", "primary", "references", "right", "rollback", "select", "set", "table",
    "then", "to", "transaction", "true", "union", "unique", "update", "user", "using",
    "values", "when", "where", "with",
];
