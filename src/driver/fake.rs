//! In-memory fake driver: records rendered statements, replays configured
//! CAS outcomes. Behavior tests run against this instead of a mock layer.

use super::{Batch, BatchKind, CasResponse, CqlValue, DriverError, Iter, RowColumns, Session};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub(crate) struct FakeBatch {
    queries: Arc<Mutex<Vec<String>>>,
}

impl FakeBatch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn shared(queries: Arc<Mutex<Vec<String>>>) -> Self {
        Self { queries }
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl Batch for FakeBatch {
    fn add_query(&mut self, template: &str, args: Vec<CqlValue>) {
        self.queries
            .lock()
            .unwrap()
            .push(super::render_statement(template, &args));
    }

    fn len(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

pub(crate) struct FakeIter {
    closed: Arc<AtomicBool>,
    rows: Vec<RowColumns>,
}

impl FakeIter {
    pub(crate) fn new(closed: Arc<AtomicBool>) -> Self {
        Self {
            closed,
            rows: Vec::new(),
        }
    }
}

impl Iter for FakeIter {
    fn map_scan(&mut self, row: &mut RowColumns) -> bool {
        match self.rows.pop() {
            Some(next) => {
                *row = next;
                true
            }
            None => false,
        }
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// CAS outcomes are plain fields; statements land in `recorded` as rendered
/// strings. `iter_closed` observes the executor's close-on-every-path
/// obligation from outside.
#[derive(Debug)]
pub(crate) struct FakeSession {
    pub(crate) applied: bool,
    pub(crate) prev: RowColumns,
    pub(crate) error: Option<DriverError>,
    pub(crate) iter_closed: Arc<AtomicBool>,
    pub(crate) recorded: Arc<Mutex<Vec<String>>>,
}

impl Default for FakeSession {
    fn default() -> Self {
        Self {
            applied: false,
            prev: RowColumns::new(),
            error: None,
            iter_closed: Arc::new(AtomicBool::new(false)),
            recorded: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FakeSession {
    pub(crate) fn applied() -> Self {
        Self {
            applied: true,
            ..Self::default()
        }
    }

    pub(crate) fn rejected_with(prev: RowColumns) -> Self {
        Self {
            prev,
            ..Self::default()
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            error: Some(DriverError(message.into())),
            ..Self::default()
        }
    }

    pub(crate) fn iter_was_closed(&self) -> bool {
        self.iter_closed.load(Ordering::SeqCst)
    }

    pub(crate) fn recorded_queries(&self) -> Vec<String> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait]
impl Session for FakeSession {
    fn new_batch(&self, _kind: BatchKind) -> Box<dyn Batch> {
        Box::new(FakeBatch::shared(self.recorded.clone()))
    }

    async fn execute_batch_cas(
        &self,
        _batch: Box<dyn Batch>,
        prev: &mut RowColumns,
    ) -> CasResponse {
        for (column, value) in &self.prev {
            prev.insert(column.clone(), value.clone());
        }
        CasResponse {
            applied: self.applied,
            iter: Some(Box::new(FakeIter::new(self.iter_closed.clone()))),
            error: self.error.clone(),
        }
    }
}
