mod value;
pub(crate) use value::Value;

use relata_core::{
    driver::{
        operation::{Operation, QuerySql, Ret},
        Capability, Driver, Response,
    },
    stmt::Record,
    Error, Result,
};
use relata_sql::Serializer;
use rusqlite::Connection as RusqliteConnection;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone)]
pub enum Sqlite {
    File(PathBuf),
    InMemory,
}

impl Sqlite {
    /// Create a new SQLite driver from a connection URL: `sqlite::memory:`
    /// or `sqlite:<path>`.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str)
            .map_err(|err| Error::invalid_connection_url(&url_str, err.to_string()))?;

        if url.scheme() != "sqlite" {
            return Err(Error::invalid_connection_url(
                &url_str,
                "expected the `sqlite` scheme",
            ));
        }

        if url.path() == ":memory:" {
            Ok(Self::InMemory)
        } else {
            Ok(Self::File(PathBuf::from(url.path())))
        }
    }

    /// Create an in-memory SQLite database
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Open a SQLite database at the specified file path
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }

    pub fn url(&self) -> String {
        match self {
            Sqlite::InMemory => "sqlite::memory:".to_string(),
            Sqlite::File(path) => format!("sqlite:{}", path.display()),
        }
    }
}

impl Driver for Sqlite {
    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }

    fn connect(&self) -> Result<Box<dyn relata_core::driver::Connection>> {
        let connection = match self {
            Sqlite::File(path) => Connection::open(path)?,
            Sqlite::InMemory => Connection::in_memory()?,
        };
        Ok(Box::new(connection))
    }

    /// Every connection to `:memory:` opens a separate database.
    fn max_connections(&self) -> Option<usize> {
        matches!(self, Self::InMemory).then_some(1)
    }
}

#[derive(Debug)]
pub struct Connection {
    connection: RusqliteConnection,
    serializer: Serializer,
}

impl Connection {
    pub fn in_memory() -> Result<Self> {
        let connection =
            RusqliteConnection::open_in_memory().map_err(Error::driver_operation_failed)?;
        Self::init(connection)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = RusqliteConnection::open(path).map_err(Error::driver_operation_failed)?;
        Self::init(connection)
    }

    fn init(connection: RusqliteConnection) -> Result<Self> {
        connection
            .pragma_update(None, "foreign_keys", "ON")
            .map_err(Error::driver_operation_failed)?;

        Ok(Self {
            connection,
            serializer: Serializer::sqlite(),
        })
    }

    /// Runs raw SQL, e.g. schema DDL. Statements are separated by `;`.
    pub fn execute_batch(&mut self, sql: &str) -> Result<()> {
        self.connection
            .execute_batch(sql)
            .map_err(Error::driver_operation_failed)
    }

    fn query_sql(&mut self, op: QuerySql) -> Result<Response> {
        let mut stmt = self
            .connection
            .prepare_cached(&op.sql)
            .map_err(Error::driver_operation_failed)?;

        let params = op.params.into_iter().map(Value::from).collect::<Vec<_>>();

        if op.ret == Ret::Count {
            let count = stmt
                .execute(rusqlite::params_from_iter(params.iter()))
                .map_err(Error::driver_operation_failed)?;

            return Ok(Response::count(count as u64));
        }

        let columns = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        let mut rows = stmt
            .query(rusqlite::params_from_iter(params.iter()))
            .map_err(Error::driver_operation_failed)?;

        let mut ret = vec![];

        loop {
            match rows.next() {
                Ok(Some(row)) => {
                    let mut record = Record::new();

                    for (index, column) in columns.iter().enumerate() {
                        let value = Value::from_sql(row, index)
                            .map_err(Error::driver_operation_failed)?;
                        record.insert(column.as_str(), value.into_inner());
                    }

                    ret.push(record);
                }
                Ok(None) => break,
                Err(err) => return Err(Error::driver_operation_failed(err)),
            }
        }

        Ok(Response::values(ret))
    }
}

impl relata_core::driver::Connection for Connection {
    fn exec(&mut self, op: Operation) -> Result<Response> {
        match op {
            Operation::QuerySql(op) => self.query_sql(op),
            Operation::Transaction(op) => {
                let sql = self.serializer.serialize_transaction(&op);
                tracing::trace!(sql = %sql, "sqlite transaction");

                self.connection
                    .execute_batch(&sql)
                    .map_err(Error::driver_operation_failed)?;

                Ok(Response::empty())
            }
        }
    }
}
