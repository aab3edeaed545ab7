use crate::error::SessionError;
use crate::query::AwrConnection;
use dotenvy::dotenv;
use oracle::sql_type::ToSql;
use oracle::Connection;
use std::env;

/// Opens a connection to the Oracle database from environment configuration.
///
/// This function reads `AWR_DB_USER`, `AWR_DB_PASSWORD`, and
/// `AWR_DB_CONNECT_STRING` from the `.env` file and opens a connection with
/// them. The caller owns the returned handle: binding it to a
/// [`SnapshotSession`] never closes it, and releasing it is the caller's
/// responsibility.
///
/// [`SnapshotSession`]: crate::session::SnapshotSession
pub fn connect() -> Result<Connection, SessionError> {
    // Load environment variables from the .env file.
    dotenv().map_err(|e| SessionError::ConnectionConfig(e.to_string()))?;

    let user = env::var("AWR_DB_USER")
        .map_err(|_e| SessionError::ConnectionConfig("AWR_DB_USER must be set.".to_string()))?;
    let password = env::var("AWR_DB_PASSWORD")
        .map_err(|_e| SessionError::ConnectionConfig("AWR_DB_PASSWORD must be set.".to_string()))?;
    let connect_string = env::var("AWR_DB_CONNECT_STRING").map_err(|_e| {
        SessionError::ConnectionConfig("AWR_DB_CONNECT_STRING must be set.".to_string())
    })?;

    let conn = Connection::connect(user, password, connect_string)?;
    Ok(conn)
}

impl From<oracle::Error> for SessionError {
    fn from(err: oracle::Error) -> Self {
        SessionError::Database(Box::new(err))
    }
}

impl AwrConnection for Connection {
    fn query_scalar(&self, sql: &str, params: &[i64]) -> Result<i64, SessionError> {
        let binds: Vec<&dyn ToSql> = params.iter().map(|p| p as &dyn ToSql).collect();
        let value = self.query_row_as::<i64>(sql, &binds)?;
        Ok(value)
    }

    fn query_text_rows(&self, sql: &str, params: &[i64]) -> Result<Vec<String>, SessionError> {
        let binds: Vec<&dyn ToSql> = params.iter().map(|p| p as &dyn ToSql).collect();
        let rows = self.query_as::<String>(sql, &binds)?;

        let mut fragments = Vec::new();
        for row in rows {
            fragments.push(row?);
        }
        Ok(fragments)
    }
}
