//! # AWR Session
//!
//! This crate is a thin, session-scoped interface to an Oracle database's
//! Automatic Workload Repository (AWR). It brackets a workload-capture
//! interval with two snapshots and renders the engine-generated diff report
//! between them.
//!
//! ## Architectural Principles
//!
//! - **The database does the work:** all snapshot bookkeeping and report
//!   rendering happen inside the database engine. This crate only sequences
//!   three fixed SQL statements and tracks the pair of snapshot identifiers
//!   that bracket the interval.
//! - **Borrowed connection:** the database connection is an externally owned
//!   resource. A session binds a handle, issues queries over it, and never
//!   opens, closes, commits, or rolls it back.
//! - **Driver-independent core:** the session talks to the database through
//!   the small [`AwrConnection`] port, so tests run against in-memory stubs
//!   and the Oracle adapter stays at the edge of the crate.
//!
//! ## Public API
//!
//! - `SnapshotSession`: the state machine that brackets an interval and
//!   fetches the report.
//! - `ReportFormat`: the two report renderings the engine exposes.
//! - `AwrConnection`: the query port a connection handle must implement.
//! - `connect`: a convenience helper that opens an Oracle connection from
//!   environment configuration.
//! - `SessionError`: the specific error types that can be returned from this
//!   crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod query;
pub mod session;

// Re-export the key components to create a clean, public-facing API.
pub use connection::connect;
pub use error::SessionError;
pub use query::AwrConnection;
pub use session::{ReportFormat, SnapshotSession};
