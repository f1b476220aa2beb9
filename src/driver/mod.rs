//! Minimal capability set over the underlying wide-column driver.
//!
//! This is the only surface the upper layers depend on: a [`Session`] that
//! can open a [`Batch`], a batch that accumulates parameterized statements,
//! and the read-modify-write CAS submission that returns
//! `(applied, losing row, iterator)`. Everything here is object-safe so a
//! real driver and the in-memory test fake plug in identically.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

#[cfg(test)]
pub(crate) mod fake;

/// Opaque driver-level failure, surfaced verbatim to callers. Retryability
/// is decided above this layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct DriverError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchKind {
    #[default]
    Logged,
    Unlogged,
}

/// Columns of one row, keyed by column name. Ordered so that diagnostic
/// renderings of a row are deterministic.
pub type RowColumns = BTreeMap<String, CqlValue>;

/// Key of a CQL map column; the sub-maps key by bigint or text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum CqlMapKey {
    Int(i64),
    Text(String),
}

/// Typed statement argument.
///
/// The [`fmt::Display`] rendering below is the canonical form used by the
/// statement-snapshot tests and by the `columns: (…)` suffix of condition
/// failure messages: timestamps as RFC3339 seconds, blobs as decimal byte
/// lists, collections with sorted map keys. Changing it is a contract change.
#[derive(Debug, Clone, PartialEq)]
pub enum CqlValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    Text(String),
    Uuid(Uuid),
    Blob(Vec<u8>),
    Timestamp(DateTime<Utc>),
    List(Vec<CqlValue>),
    Map(BTreeMap<CqlMapKey, CqlValue>),
    Udt(Vec<(&'static str, CqlValue)>),
}

impl fmt::Display for CqlMapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CqlMapKey::Int(v) => write!(f, "{v}"),
            CqlMapKey::Text(v) => write!(f, "{v}"),
        }
    }
}

impl fmt::Display for CqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CqlValue::Bool(v) => write!(f, "{v}"),
            CqlValue::Int(v) => write!(f, "{v}"),
            CqlValue::Double(v) => write!(f, "{v}"),
            CqlValue::Text(v) => write!(f, "{v}"),
            CqlValue::Uuid(v) => write!(f, "{v}"),
            CqlValue::Blob(bytes) => {
                write!(f, "[")?;
                for (i, byte) in bytes.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{byte}")?;
                }
                write!(f, "]")
            }
            CqlValue::Timestamp(ts) => {
                write!(f, "{}", ts.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
            CqlValue::List(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
            CqlValue::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            CqlValue::Udt(fields) => {
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Renders a parameterized template with its arguments substituted in order.
/// This is the test-side canonicalization helper; surplus placeholders are
/// left untouched so a mismatch is visible in the snapshot.
pub fn render_statement(template: &str, args: &[CqlValue]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args_iter = args.iter();
    for (i, part) in template.split('?').enumerate() {
        if i > 0 {
            match args_iter.next() {
                Some(arg) => out.push_str(&arg.to_string()),
                None => out.push('?'),
            }
        }
        out.push_str(part);
    }
    out
}

/// A batch of statements targeting one partition. Owned by a single logical
/// operation, never shared.
pub trait Batch: Send {
    fn add_query(&mut self, template: &str, args: Vec<CqlValue>);
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result iterator of a CAS submission. `close` must be called exactly once;
/// the transaction executor guards this with an RAII wrapper.
pub trait Iter: Send {
    /// Reads the next returned row into `row`, replacing its contents.
    /// Returns false when exhausted.
    fn map_scan(&mut self, row: &mut RowColumns) -> bool;
    fn close(&mut self);
}

/// Outcome of a batch CAS, mirroring the driver exactly: an iterator may
/// accompany an error and must still be closed by the caller.
pub struct CasResponse {
    pub applied: bool,
    pub iter: Option<Box<dyn Iter>>,
    pub error: Option<DriverError>,
}

#[async_trait]
pub trait Session: Send + Sync {
    fn new_batch(&self, kind: BatchKind) -> Box<dyn Batch>;

    /// Submits the batch atomically; when not applied, the columns of the
    /// losing row are written into `prev`.
    async fn execute_batch_cas(&self, batch: Box<dyn Batch>, prev: &mut RowColumns) -> CasResponse;
}
