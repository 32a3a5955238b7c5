use std::collections::BTreeMap;
use std::fmt;

use tokio::task::AbortHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskTicket(u64);

impl TaskTicket {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Load,
    Action,
}

impl TaskKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Action => "action",
        }
    }
}

/// Spawned simulated-latency work owned by one view.
///
/// A ticket stays registered until its completion is applied or the task is
/// aborted; a completion whose ticket is gone is stale.
#[derive(Debug, Default)]
pub struct PendingTasks {
    next: u64,
    tasks: BTreeMap<TaskTicket, (TaskKind, Option<AbortHandle>)>,
}

impl PendingTasks {
    /// Reserves a ticket before the task exists so the task can carry it.
    pub fn reserve(&mut self, kind: TaskKind) -> TaskTicket {
        self.next += 1;
        let ticket = TaskTicket(self.next);
        self.tasks.insert(ticket, (kind, None));
        ticket
    }

    pub fn attach(&mut self, ticket: TaskTicket, handle: AbortHandle) {
        match self.tasks.get_mut(&ticket) {
            Some((_, slot)) => *slot = Some(handle),
            // Released before the handle arrived.
            None => handle.abort(),
        }
    }

    /// Returns false when the ticket was already aborted or applied.
    pub fn finish(&mut self, ticket: TaskTicket) -> bool {
        self.tasks.remove(&ticket).is_some()
    }

    pub fn abort_kind(&mut self, kind: TaskKind) -> usize {
        let doomed: Vec<TaskTicket> = self
            .tasks
            .iter()
            .filter(|(_, (k, _))| *k == kind)
            .map(|(t, _)| *t)
            .collect();
        for ticket in &doomed {
            if let Some((_, Some(handle))) = self.tasks.remove(ticket) {
                handle.abort();
            }
        }
        doomed.len()
    }

    pub fn abort_all(&mut self) -> usize {
        let count = self.tasks.len();
        for (_, (_, handle)) in std::mem::take(&mut self.tasks) {
            if let Some(handle) = handle {
                handle.abort();
            }
        }
        count
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    #[must_use]
    pub fn count(&self, kind: TaskKind) -> usize {
        self.tasks.values().filter(|(k, _)| *k == kind).count()
    }
}
