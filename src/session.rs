use crate::error::SessionError;
use crate::query::AwrConnection;

// The three statements the session ever issues. The literal `1` in the report
// statements is the engine-owned snapshot-set identifier.
const CREATE_SNAPSHOT_SQL: &str = "SELECT DBMS_WORKLOAD_REPOSITORY.CREATE_SNAPSHOT() FROM dual";
const DBID_SQL: &str = "SELECT dbid FROM v$database";
const REPORT_TEXT_SQL: &str =
    "SELECT * FROM TABLE(DBMS_WORKLOAD_REPOSITORY.AWR_REPORT_TEXT(:1, 1, :2, :3))";
const REPORT_HTML_SQL: &str =
    "SELECT * FROM TABLE(DBMS_WORKLOAD_REPOSITORY.AWR_REPORT_HTML(:1, 1, :2, :3))";

/// The two report renderings the workload repository exposes.
///
/// The set is closed: the engine ships exactly a plain-text and an
/// HTML-formatted report function, and the plain-text one is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Html,
}

impl ReportFormat {
    /// Maps a format name to a variant. Anything that is not an HTML spelling
    /// falls back to the default plain-text rendering.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("html") {
            ReportFormat::Html
        } else {
            ReportFormat::Text
        }
    }
}

/// A `SnapshotSession` brackets a workload-capture interval against the
/// database's Automatic Workload Repository and renders the diff report
/// between the two bracketing snapshots.
///
/// The session borrows an externally owned connection handle and keeps three
/// pieces of state: the begin and end snapshot identifiers and the lazily
/// cached database identifier. The bracket is reset only by constructing a
/// new session; there is no way to discard the snapshot pair while keeping
/// the connection.
///
/// Every operation performs exactly one blocking database round trip and
/// surfaces any failure to the caller untouched. Mutating operations take
/// `&mut self`, so a session is used from one caller at a time; concurrent
/// report generation needs one session per caller.
#[derive(Debug)]
pub struct SnapshotSession<C> {
    conn: Option<C>,
    begin_snapshot: Option<i64>,
    end_snapshot: Option<i64>,
    dbid: Option<i64>,
}

impl<C> Default for SnapshotSession<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> SnapshotSession<C> {
    /// Creates an unbound session with no snapshots recorded.
    pub fn new() -> Self {
        Self {
            conn: None,
            begin_snapshot: None,
            end_snapshot: None,
            dbid: None,
        }
    }

    /// Stores the connection handle used for all subsequent calls.
    ///
    /// Nothing is validated here; an unbound session simply fails every
    /// other operation with [`SessionError::NotConnected`]. The session
    /// never closes the handle.
    pub fn bind_connection(&mut self, conn: C) {
        self.conn = Some(conn);
    }

    /// The identifier of the snapshot opening the bracket, once created.
    pub fn begin_snapshot(&self) -> Option<i64> {
        self.begin_snapshot
    }

    /// The identifier of the snapshot closing the bracket, once created.
    pub fn end_snapshot(&self) -> Option<i64> {
        self.end_snapshot
    }

    /// The cached database identifier, once resolved.
    pub fn database_id(&self) -> Option<i64> {
        self.dbid
    }
}

impl<C: AwrConnection> SnapshotSession<C> {
    /// Asks the database to create a new workload snapshot and records its
    /// identifier, which is also returned to the caller.
    ///
    /// The first call of the session's lifetime records the identifier as
    /// the begin snapshot and clears any end snapshot; every subsequent call
    /// records it as the end snapshot. A third call therefore replaces the
    /// end bracket while leaving the begin untouched; callers wanting a
    /// fresh begin need a fresh session.
    pub fn create_snapshot(&mut self) -> Result<i64, SessionError> {
        let conn = self.conn.as_ref().ok_or(SessionError::NotConnected)?;
        let id = conn.query_scalar(CREATE_SNAPSHOT_SQL, &[])?;

        if self.begin_snapshot.is_none() {
            self.begin_snapshot = Some(id);
            self.end_snapshot = None;
            tracing::info!(snapshot_id = id, "recorded begin snapshot");
        } else {
            self.end_snapshot = Some(id);
            tracing::info!(snapshot_id = id, "recorded end snapshot");
        }

        Ok(id)
    }

    /// Generates the workload report for the current snapshot bracket.
    ///
    /// Requires a bound connection and a complete bracket, checked in that
    /// order. The report arrives from the engine as a sequence of text
    /// fragments; the result is their concatenation in row-return order,
    /// each fragment followed by a single newline. If the query fails, the
    /// whole call fails and no partial report is returned.
    pub fn report(&mut self, format: ReportFormat) -> Result<String, SessionError> {
        if self.conn.is_none() {
            return Err(SessionError::NotConnected);
        }
        let begin = self.begin_snapshot.ok_or(SessionError::MissingBeginSnapshot)?;
        let end = self.end_snapshot.ok_or(SessionError::MissingEndSnapshot)?;

        let dbid = self.resolve_dbid()?;

        let sql = match format {
            ReportFormat::Text => REPORT_TEXT_SQL,
            ReportFormat::Html => REPORT_HTML_SQL,
        };

        let conn = self.conn.as_ref().ok_or(SessionError::NotConnected)?;
        let fragments = conn.query_text_rows(sql, &[dbid, begin, end])?;

        let mut report = String::with_capacity(fragments.iter().map(|f| f.len() + 1).sum());
        for fragment in &fragments {
            report.push_str(fragment);
            report.push('\n');
        }

        tracing::info!(
            begin_snapshot = begin,
            end_snapshot = end,
            format = ?format,
            "generated workload report"
        );
        Ok(report)
    }

    /// Resolves the database identifier, querying the server at most once
    /// per session. The identifier is immutable for a database instance, so
    /// the cached value is never invalidated.
    fn resolve_dbid(&mut self) -> Result<i64, SessionError> {
        if let Some(dbid) = self.dbid {
            return Ok(dbid);
        }

        let conn = self.conn.as_ref().ok_or(SessionError::NotConnected)?;
        let dbid = conn.query_scalar(DBID_SQL, &[])?;
        tracing::debug!(dbid, "resolved database identifier");
        self.dbid = Some(dbid);
        Ok(dbid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Scripted connection: answers scalar queries from a queue and row
    /// queries with a fixed fragment list, recording everything it is asked.
    struct StubConnection {
        scalars: RefCell<VecDeque<i64>>,
        fragments: Vec<String>,
        issued: RefCell<Vec<(String, Vec<i64>)>>,
    }

    impl StubConnection {
        fn scripted(scalars: &[i64], fragments: &[&str]) -> Self {
            Self {
                scalars: RefCell::new(scalars.iter().copied().collect()),
                fragments: fragments.iter().map(|f| f.to_string()).collect(),
                issued: RefCell::new(Vec::new()),
            }
        }

        fn issued(&self) -> Vec<(String, Vec<i64>)> {
            self.issued.borrow().clone()
        }
    }

    impl AwrConnection for StubConnection {
        fn query_scalar(&self, sql: &str, params: &[i64]) -> Result<i64, SessionError> {
            self.issued
                .borrow_mut()
                .push((sql.to_string(), params.to_vec()));
            self.scalars
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| SessionError::database("stub: scalar queue exhausted"))
        }

        fn query_text_rows(&self, sql: &str, params: &[i64]) -> Result<Vec<String>, SessionError> {
            self.issued
                .borrow_mut()
                .push((sql.to_string(), params.to_vec()));
            Ok(self.fragments.clone())
        }
    }

    #[test]
    fn operations_fail_before_binding_a_connection() {
        let mut session: SnapshotSession<StubConnection> = SnapshotSession::new();

        assert!(matches!(
            session.create_snapshot(),
            Err(SessionError::NotConnected)
        ));
        assert!(matches!(
            session.report(ReportFormat::Text),
            Err(SessionError::NotConnected)
        ));
    }

    #[test]
    fn first_snapshot_opens_the_bracket() {
        let mut session = SnapshotSession::new();
        session.bind_connection(StubConnection::scripted(&[100], &[]));

        assert_eq!(session.create_snapshot().unwrap(), 100);
        assert_eq!(session.begin_snapshot(), Some(100));
        assert_eq!(session.end_snapshot(), None);
    }

    #[test]
    fn second_snapshot_closes_the_bracket() {
        let mut session = SnapshotSession::new();
        session.bind_connection(StubConnection::scripted(&[100, 105], &[]));

        session.create_snapshot().unwrap();
        assert_eq!(session.create_snapshot().unwrap(), 105);
        assert_eq!(session.begin_snapshot(), Some(100));
        assert_eq!(session.end_snapshot(), Some(105));
    }

    #[test]
    fn third_snapshot_replaces_only_the_end() {
        let mut session = SnapshotSession::new();
        session.bind_connection(StubConnection::scripted(&[100, 105, 110], &[]));

        session.create_snapshot().unwrap();
        session.create_snapshot().unwrap();
        session.create_snapshot().unwrap();
        assert_eq!(session.begin_snapshot(), Some(100));
        assert_eq!(session.end_snapshot(), Some(110));
    }

    #[test]
    fn report_requires_a_complete_bracket() {
        let mut session = SnapshotSession::new();
        session.bind_connection(StubConnection::scripted(&[100], &[]));

        assert!(matches!(
            session.report(ReportFormat::Text),
            Err(SessionError::MissingBeginSnapshot)
        ));

        session.create_snapshot().unwrap();
        assert!(matches!(
            session.report(ReportFormat::Text),
            Err(SessionError::MissingEndSnapshot)
        ));
    }

    #[test]
    fn report_concatenates_fragments_with_trailing_newlines() {
        let mut session = SnapshotSession::new();
        session.bind_connection(StubConnection::scripted(&[100, 105, 4242], &["A", "B"]));

        session.create_snapshot().unwrap();
        session.create_snapshot().unwrap();
        assert_eq!(session.report(ReportFormat::Text).unwrap(), "A\nB\n");
    }

    #[test]
    fn scalar_failures_surface_unchanged() {
        let mut session = SnapshotSession::new();
        // Empty scalar queue: the first round trip fails.
        session.bind_connection(StubConnection::scripted(&[], &[]));

        assert!(matches!(
            session.create_snapshot(),
            Err(SessionError::Database(_))
        ));
    }

    #[test]
    fn format_name_falls_back_to_text() {
        assert_eq!(ReportFormat::from_name("html"), ReportFormat::Html);
        assert_eq!(ReportFormat::from_name("HTML"), ReportFormat::Html);
        assert_eq!(ReportFormat::from_name("text"), ReportFormat::Text);
        assert_eq!(ReportFormat::from_name("pdf"), ReportFormat::Text);
        assert_eq!(ReportFormat::default(), ReportFormat::Text);
    }

    #[test]
    fn report_reuses_the_bound_snapshot_ids_across_formats() {
        let mut session = SnapshotSession::new();
        session.bind_connection(StubConnection::scripted(&[100, 105, 4242], &["x"]));

        session.create_snapshot().unwrap();
        session.create_snapshot().unwrap();
        session.report(ReportFormat::Text).unwrap();
        session.report(ReportFormat::Html).unwrap();

        let issued = {
            let conn = session.conn.as_ref().unwrap();
            conn.issued()
        };
        let report_queries: Vec<_> = issued
            .iter()
            .filter(|(sql, _)| sql.contains("AWR_REPORT"))
            .collect();
        assert_eq!(report_queries.len(), 2);
        assert!(report_queries[0].0.contains("AWR_REPORT_TEXT"));
        assert!(report_queries[1].0.contains("AWR_REPORT_HTML"));
        assert_eq!(report_queries[0].1, vec![4242, 100, 105]);
        assert_eq!(report_queries[1].1, vec![4242, 100, 105]);
    }
}
