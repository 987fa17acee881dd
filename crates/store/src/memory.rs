//! In-memory coordination store
//!
//! A linearizable, ZooKeeper-shaped node tree held behind a single lock. Every
//! client call is one linearization point; a transaction is evaluated against a
//! staged view and applied only if every operation in it succeeds.
//!
//! Tests can script other actors through [`MemoryStore::interfere`]: an action
//! registered for a given call runs immediately before that call, which is how
//! races between bootstrap phases are reproduced deterministically.

use crate::{Op, Result, StoreError, TransactionOutcome, parent_path, validate_path};
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// When a scripted interference fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Before the n-th transaction submission (0-based)
    BeforeTransaction(usize),
    /// Before the n-th client call of any kind (0-based)
    BeforeCall(usize),
}

impl Trigger {
    fn matches(&self, call: usize, transaction: Option<usize>) -> bool {
        match *self {
            Trigger::BeforeCall(n) => n == call,
            Trigger::BeforeTransaction(n) => transaction == Some(n),
        }
    }
}

/// What another actor does to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interference {
    /// Create a node with empty content, including missing ancestors
    CreateNode(String),
    /// Insert a single node without checking its parent, as a flat-keyed
    /// store would allow
    InsertNode(String),
    /// Delete a node and everything below it
    DeleteNode(String),
    /// Fail the triggering call without touching the tree
    Fail(StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    Transaction,
    Exists,
    Create,
}

struct State {
    /// Node path -> content. The root `/` is implicit.
    nodes: BTreeMap<String, Vec<u8>>,

    /// Client calls served so far
    calls: usize,

    /// Transactions submitted so far
    transactions: usize,

    /// Pending scripted interference
    scripted: Vec<(Trigger, Interference)>,
}

impl State {
    fn contains(&self, path: &str) -> bool {
        path == "/" || self.nodes.contains_key(path)
    }

    fn create_all(&mut self, path: &str) {
        let mut current = String::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current.push('/');
            current.push_str(segment);
            self.nodes.entry(current.clone()).or_default();
        }
    }

    fn delete_subtree(&mut self, path: &str) -> bool {
        let prefix = format!("{}/", path);
        let existed = self.nodes.remove(path).is_some();
        self.nodes.retain(|p, _| !p.starts_with(&prefix));
        existed
    }

    /// Count the call and run any interference scheduled for it
    fn begin_call(&mut self, kind: CallKind) -> Result<()> {
        let call = self.calls;
        self.calls += 1;

        let transaction = if kind == CallKind::Transaction {
            let n = self.transactions;
            self.transactions += 1;
            Some(n)
        } else {
            None
        };

        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.scripted)
            .into_iter()
            .partition(|(trigger, _)| trigger.matches(call, transaction));
        self.scripted = pending;

        let mut failure = None;
        for (trigger, action) in due {
            tracing::debug!("Interference at {:?} ({:?}): {:?}", trigger, kind, action);
            match action {
                Interference::CreateNode(path) => self.create_all(&path),
                Interference::InsertNode(path) => {
                    self.nodes.entry(path).or_default();
                }
                Interference::DeleteNode(path) => {
                    self.delete_subtree(&path);
                }
                Interference::Fail(err) => failure = Some(err),
            }
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn is_present(state: &State, staged: &BTreeMap<String, Vec<u8>>, path: &str) -> bool {
    state.contains(path) || staged.contains_key(path)
}

/// In-memory store shared by any number of [`MemoryClient`](crate::MemoryClient)s
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                nodes: BTreeMap::new(),
                calls: 0,
                transactions: 0,
                scripted: Vec::new(),
            }),
        }
    }

    /// Check whether a node exists (not counted as a client call)
    pub fn exists(&self, path: &str) -> bool {
        self.state.lock().contains(path)
    }

    /// Content of a node
    pub fn data(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().nodes.get(path).cloned()
    }

    /// Names of the direct children of a node, sorted
    pub fn children(&self, path: &str) -> Vec<String> {
        let prefix = if path == "/" {
            "/".to_string()
        } else {
            format!("{}/", path)
        };

        self.state
            .lock()
            .nodes
            .keys()
            .filter_map(|p| p.strip_prefix(&prefix))
            .filter(|rest| !rest.contains('/'))
            .map(str::to_string)
            .collect()
    }

    /// All node paths, sorted
    pub fn paths(&self) -> Vec<String> {
        self.state.lock().nodes.keys().cloned().collect()
    }

    /// Number of nodes, not counting the implicit root
    pub fn len(&self) -> usize {
        self.state.lock().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create a node directly, bypassing call accounting
    pub fn create_node(&self, path: &str, data: &[u8]) -> Result<()> {
        validate_path(path)?;
        let mut state = self.state.lock();

        if state.contains(path) {
            return Err(StoreError::NodeExists(path.to_string()));
        }
        if !state.contains(parent_path(path)) {
            return Err(StoreError::NoParent(path.to_string()));
        }

        state.nodes.insert(path.to_string(), data.to_vec());
        Ok(())
    }

    /// Create a node and any missing ancestors with empty content
    pub fn create_all(&self, path: &str) -> Result<()> {
        validate_path(path)?;
        self.state.lock().create_all(path);
        Ok(())
    }

    /// Delete a node and its subtree; returns whether the node existed
    pub fn delete_node(&self, path: &str) -> bool {
        self.state.lock().delete_subtree(path)
    }

    /// Schedule another actor's action before a future client call
    pub fn interfere(&self, trigger: Trigger, action: Interference) {
        self.state.lock().scripted.push((trigger, action));
    }

    /// Client calls served so far
    pub fn calls(&self) -> usize {
        self.state.lock().calls
    }

    /// Transactions submitted so far
    pub fn transactions(&self) -> usize {
        self.state.lock().transactions
    }

    pub(crate) fn submit_transaction(
        &self,
        client: &str,
        ops: &[Op],
    ) -> Result<Vec<TransactionOutcome>> {
        let mut state = self.state.lock();
        state.begin_call(CallKind::Transaction)?;

        let mut staged: BTreeMap<String, Vec<u8>> = BTreeMap::new();
        let mut failed_at = None;
        let mut outcomes = Vec::with_capacity(ops.len());

        for (idx, op) in ops.iter().enumerate() {
            let outcome = match op {
                // Checks always report what they see, so a failed batch still
                // names every conflicting node
                Op::CheckAbsent(path) => match validate_path(path) {
                    Err(err) => TransactionOutcome::Rejected(err.to_string()),
                    Ok(()) if is_present(&state, &staged, path) => {
                        TransactionOutcome::AlreadyExists
                    }
                    Ok(()) => TransactionOutcome::Absent,
                },
                Op::Create { .. } if failed_at.is_some() => TransactionOutcome::DependentFailure,
                Op::Create { path, data } => {
                    if let Err(err) = validate_path(path) {
                        TransactionOutcome::Rejected(err.to_string())
                    } else if is_present(&state, &staged, path) {
                        TransactionOutcome::AlreadyExists
                    } else if !is_present(&state, &staged, parent_path(path)) {
                        TransactionOutcome::Rejected(StoreError::NoParent(path.clone()).to_string())
                    } else {
                        staged.insert(path.clone(), data.clone());
                        TransactionOutcome::Confirmed
                    }
                }
            };

            let failed = match op {
                Op::CheckAbsent(_) => !matches!(outcome, TransactionOutcome::Absent),
                Op::Create { .. } => !outcome.is_confirmed(),
            };
            if failed && failed_at.is_none() {
                failed_at = Some(idx);
            }
            outcomes.push(outcome);
        }

        match failed_at {
            Some(idx) => {
                // Roll back: nothing staged is applied
                for outcome in outcomes.iter_mut() {
                    if outcome.is_confirmed() {
                        *outcome = TransactionOutcome::DependentFailure;
                    }
                }
                tracing::debug!(
                    "[{}] Transaction of {} ops aborted at op {} ({})",
                    client,
                    ops.len(),
                    idx,
                    ops[idx].path()
                );
            }
            None => {
                let applied = staged.len();
                state.nodes.extend(staged);
                tracing::debug!(
                    "[{}] Transaction of {} ops committed, {} nodes created",
                    client,
                    ops.len(),
                    applied
                );
            }
        }

        Ok(outcomes)
    }

    pub(crate) fn client_exists(&self, client: &str, path: &str) -> Result<bool> {
        let mut state = self.state.lock();
        state.begin_call(CallKind::Exists)?;
        validate_path(path)?;

        let exists = state.contains(path);
        tracing::trace!("[{}] exists({}) = {}", client, path, exists);
        Ok(exists)
    }

    pub(crate) fn client_create(&self, client: &str, path: &str, data: &[u8]) -> Result<()> {
        let mut state = self.state.lock();
        state.begin_call(CallKind::Create)?;
        validate_path(path)?;

        if state.contains(path) {
            return Err(StoreError::NodeExists(path.to_string()));
        }
        if !state.contains(parent_path(path)) {
            return Err(StoreError::NoParent(path.to_string()));
        }

        state.nodes.insert(path.to_string(), data.to_vec());
        tracing::trace!("[{}] created {}", client, path);
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
