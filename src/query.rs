use crate::error::SessionError;

/// The generic, abstract interface a [`SnapshotSession`] needs from a
/// database connection. This trait is the contract the session core uses,
/// allowing the underlying implementation (a live Oracle connection or an
/// in-memory stub) to be swapped out.
///
/// Only two query shapes exist: a single-row integer lookup and a
/// one-text-column row scan. Every statement the session issues binds nothing
/// but integers, so parameters are a plain `i64` slice bound in positional
/// order.
///
/// [`SnapshotSession`]: crate::session::SnapshotSession
pub trait AwrConnection {
    /// Executes `sql` and returns the integer in the first column of the
    /// single returned row.
    fn query_scalar(&self, sql: &str, params: &[i64]) -> Result<i64, SessionError>;

    /// Executes `sql` and returns the text column of every returned row, in
    /// row-return order.
    ///
    /// Failures surface as [`SessionError::Database`] with the driver error
    /// untouched; implementations must not retry or partially succeed.
    fn query_text_rows(&self, sql: &str, params: &[i64]) -> Result<Vec<String>, SessionError>;
}
