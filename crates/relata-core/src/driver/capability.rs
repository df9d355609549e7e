#[derive(Debug)]
pub struct Capability {
    /// Dialect used when compiling statements for this backend.
    pub sql_flavor: SqlFlavor,

    /// Supports `INSERT .. RETURNING`.
    pub insert_returning: bool,

    /// Supports `SAVEPOINT`, used for nested transactions.
    pub savepoints: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlFlavor {
    Sqlite,
    Postgresql,
    Mysql,
}

impl Capability {
    /// SQLite capabilities.
    pub const SQLITE: Self = Self {
        sql_flavor: SqlFlavor::Sqlite,
        insert_returning: true,
        savepoints: true,
    };

    /// PostgreSQL capabilities
    pub const POSTGRESQL: Self = Self {
        sql_flavor: SqlFlavor::Postgresql,
        ..Self::SQLITE
    };

    /// MySQL capabilities
    pub const MYSQL: Self = Self {
        sql_flavor: SqlFlavor::Mysql,
        insert_returning: false,
        ..Self::SQLITE
    };
}
