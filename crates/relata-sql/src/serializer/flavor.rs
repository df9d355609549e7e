use super::Serializer;

use relata_core::{driver::SqlFlavor, stmt::Statement};

impl Serializer {
    pub fn new(flavor: SqlFlavor) -> Serializer {
        Serializer { flavor }
    }

    pub fn sqlite() -> Serializer {
        Serializer::new(SqlFlavor::Sqlite)
    }

    pub fn postgresql() -> Serializer {
        Serializer::new(SqlFlavor::Postgresql)
    }

    pub fn mysql() -> Serializer {
        Serializer::new(SqlFlavor::Mysql)
    }

    pub(super) fn is_sqlite(&self) -> bool {
        self.flavor == SqlFlavor::Sqlite
    }

    pub(super) fn is_mysql(&self) -> bool {
        self.flavor == SqlFlavor::Mysql
    }

    pub(super) fn is_postgresql(&self) -> bool {
        self.flavor == SqlFlavor::Postgresql
    }

    /// MySQL has no `RETURNING`.
    pub(super) fn supports_returning(&self) -> bool {
        !self.is_mysql()
    }

    /// Whether the rendered statement produces a row set rather than an
    /// affected-row count.
    pub fn returns_rows(&self, stmt: &Statement) -> bool {
        match stmt {
            Statement::Insert(insert) => !insert.returning.is_empty() && self.supports_returning(),
            stmt => stmt.is_query(),
        }
    }
}

impl Default for Serializer {
    fn default() -> Serializer {
        Serializer::sqlite()
    }
}
