//! Scripted warehouse gateways.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use metricdeck_core::WarehouseGateway;
use metricdeck_domain::{DashboardError, QueryText, Result as DomainResult, Row};

/// What the gateway does when a query contains a given marker.
#[derive(Clone, Debug)]
pub enum Reply {
    Rows(Vec<Row>),
    Fail(String),
    Panic(String),
}

/// In-memory gateway answering by substring match on the SQL text.
///
/// Queries matching no script entry return no rows. Every executed query is
/// recorded so tests can assert on what reached the warehouse.
#[derive(Default, Clone)]
pub struct ScriptedGateway {
    script: Arc<Vec<(String, Reply)>>,
    executed: Arc<Mutex<Vec<String>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer queries containing `marker` with `rows`.
    pub fn with_rows(mut self, marker: &str, rows: Vec<Row>) -> Self {
        Arc::make_mut(&mut self.script).push((marker.to_string(), Reply::Rows(rows)));
        self
    }

    /// Fail queries containing `marker` with a query error.
    pub fn with_failure(mut self, marker: &str, message: &str) -> Self {
        let reply = Reply::Fail(message.to_string());
        Arc::make_mut(&mut self.script).push((marker.to_string(), reply));
        self
    }

    /// Panic while executing queries containing `marker`.
    pub fn with_panic(mut self, marker: &str, message: &str) -> Self {
        let reply = Reply::Panic(message.to_string());
        Arc::make_mut(&mut self.script).push((marker.to_string(), reply));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().expect("executed lock").clone()
    }
}

#[async_trait]
impl WarehouseGateway for ScriptedGateway {
    async fn execute(&self, query: &QueryText) -> DomainResult<Vec<Row>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.executed.lock().expect("executed lock").push(query.as_str().to_string());

        let reply = self
            .script
            .iter()
            .find(|(marker, _)| query.as_str().contains(&format!("'{marker}' AS marker")))
            .map(|(_, reply)| reply.clone());

        match reply {
            Some(Reply::Rows(rows)) => Ok(rows),
            Some(Reply::Fail(message)) => Err(DashboardError::Query(message)),
            Some(Reply::Panic(message)) => panic!("{message}"),
            None => Ok(Vec::new()),
        }
    }

    fn backend(&self) -> &'static str {
        "scripted"
    }
}

/// Gateway whose every query fails.
#[derive(Default, Clone)]
pub struct FailingGateway {
    calls: Arc<AtomicUsize>,
}

impl FailingGateway {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WarehouseGateway for FailingGateway {
    async fn execute(&self, _query: &QueryText) -> DomainResult<Vec<Row>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(DashboardError::Network("warehouse unreachable".into()))
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}
