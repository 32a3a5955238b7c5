// SPDX-License-Identifier: Apache-2.0

//! One list screen's state: the loaded record set, the active query and the
//! derived visible rows and aggregates.
//!
//! Every filter or sort change and every record replacement recomputes the
//! derived state synchronously, filter → sort → aggregate. Only the
//! simulated-latency work (loads and actions) runs on tokio tasks; their
//! results come back over a channel the view owns and are applied by
//! [`ViewModel::next_completion`] or [`ViewModel::drain_completions`].

use std::collections::HashSet;
use std::sync::Arc;

use adops_model::{ExportFormat, FieldRegistry, HasFields, Tabular};
use adops_query::{Aggregates, FilterSpec, QueryError, QueryPlan, SortSpec, ViewQuery};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::action::{ActionError, RecordAction};
use crate::config::ViewConfig;
use crate::error::{ViewError, ViewErrorCode};
use crate::export::ExportBatch;
use crate::screens::ScreenPreset;
use crate::source::{RecordSource, SourceError, SourceErrorCode};
use crate::task::{PendingTasks, TaskKind, TaskTicket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
    Unmounted,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Unmounted => "unmounted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeStage {
    Sort,
    Aggregate,
}

/// A derived computation that failed and was replaced by its safe default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputationError {
    pub stage: ComputeStage,
    /// Sort field or aggregate name.
    pub target: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionReport {
    Applied(TaskKind),
    /// The task was superseded or its snapshot went out of date.
    Stale(TaskKind),
    Failed(TaskKind, ViewError),
}

enum Outcome<R> {
    Loaded {
        revision: u64,
        result: Result<Vec<R>, ViewError>,
    },
    Acted {
        revision: u64,
        action: String,
        result: Result<Vec<R>, ActionError>,
    },
    /// The task unwound before it could report.
    Panicked(TaskKind),
}

struct Completion<R> {
    ticket: TaskTicket,
    outcome: Outcome<R>,
}

impl<R> Completion<R> {
    fn kind(&self) -> TaskKind {
        match self.outcome {
            Outcome::Loaded { .. } => TaskKind::Load,
            Outcome::Acted { .. } => TaskKind::Action,
            Outcome::Panicked(kind) => kind,
        }
    }
}

/// Lives inside a spawned task. If the task unwinds, the view still hears
/// about the ticket instead of waiting on it forever. An abort drops the
/// guard without panicking and sends nothing.
struct PanicGuard<R> {
    ticket: TaskTicket,
    kind: TaskKind,
    tx: UnboundedSender<Completion<R>>,
}

impl<R> Drop for PanicGuard<R> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let _ = self.tx.send(Completion {
                ticket: self.ticket,
                outcome: Outcome::Panicked(self.kind),
            });
        }
    }
}

pub struct ViewModel<R> {
    screen: String,
    registry: FieldRegistry<R>,
    config: ViewConfig,
    query: ViewQuery,
    plan: QueryPlan<R>,
    phase: Phase,
    records: Arc<Vec<R>>,
    /// Bumped on every record replacement; actions started against an older
    /// revision are stale.
    revision: u64,
    visible: Vec<usize>,
    aggregates: Aggregates,
    computation_errors: Vec<ComputationError>,
    last_error: Option<ViewError>,
    tasks: PendingTasks,
    tx: UnboundedSender<Completion<R>>,
    rx: UnboundedReceiver<Completion<R>>,
}

impl<R: ScreenPreset> ViewModel<R> {
    /// A view over one of the built-in screens with its preset query.
    pub fn for_screen(config: ViewConfig) -> Result<Self, ViewError> {
        let registry = R::field_registry().map_err(|err| ViewError::validation(err.to_string()))?;
        Self::new(<R as HasFields>::SCREEN, registry, R::default_query(), config)
    }
}

impl<R: Tabular> ViewModel<R> {
    pub fn new(
        screen: impl Into<String>,
        registry: FieldRegistry<R>,
        query: ViewQuery,
        config: ViewConfig,
    ) -> Result<Self, ViewError> {
        config.validate()?;
        let plan = QueryPlan::compile(&query, &registry, &config.limits)?;
        let (tx, rx) = unbounded_channel();
        Ok(Self {
            screen: screen.into(),
            registry,
            config,
            query,
            plan,
            phase: Phase::Loading,
            records: Arc::new(Vec::new()),
            revision: 0,
            visible: Vec::new(),
            aggregates: Aggregates::new(),
            computation_errors: Vec::new(),
            last_error: None,
            tasks: PendingTasks::default(),
            tx,
            rx,
        })
    }

    #[must_use]
    pub fn screen(&self) -> &str {
        &self.screen
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    #[must_use]
    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &FieldRegistry<R> {
        &self.registry
    }

    #[must_use]
    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    #[must_use]
    pub fn query_hash(&self) -> &str {
        self.plan.query_hash()
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The whole loaded set, in source order.
    #[must_use]
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Filtered and sorted rows.
    #[must_use]
    pub fn visible_records(&self) -> Vec<&R> {
        self.visible
            .iter()
            .filter_map(|&i| self.records.get(i))
            .collect()
    }

    #[must_use]
    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    #[must_use]
    pub fn aggregates(&self) -> &Aggregates {
        &self.aggregates
    }

    /// `None` means the aggregate was never requested, not zero.
    #[must_use]
    pub fn aggregate(&self, name: &str) -> Option<f64> {
        self.aggregates.get(name)
    }

    #[must_use]
    pub fn computation_errors(&self) -> &[ComputationError] {
        &self.computation_errors
    }

    #[must_use]
    pub fn has_computation_error(&self) -> bool {
        !self.computation_errors.is_empty()
    }

    /// Last failed load or action. Cleared by the next successful one.
    #[must_use]
    pub fn last_error(&self) -> Option<&ViewError> {
        self.last_error.as_ref()
    }

    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Replaces one filter dimension. A rejected query leaves the view as it
    /// was.
    pub fn set_filter(&mut self, spec: FilterSpec) -> Result<(), ViewError> {
        let mut query = self.query.clone();
        query.set_filter(spec);
        self.replan(query)
    }

    pub fn clear_filter(&mut self, dimension: &str) -> Result<bool, ViewError> {
        let mut query = self.query.clone();
        if !query.clear_filter(dimension) {
            self.ensure_mounted()?;
            return Ok(false);
        }
        self.replan(query)?;
        Ok(true)
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) -> Result<(), ViewError> {
        let mut query = self.query.clone();
        query.sort = sort;
        self.replan(query)
    }

    /// Header click: the active field flips direction, another field starts
    /// ascending.
    pub fn toggle_sort(&mut self, field: &str) -> Result<&SortSpec, ViewError> {
        let next = SortSpec::toggle(self.query.sort.as_ref(), field);
        self.set_sort(Some(next))?;
        self.query
            .sort
            .as_ref()
            .ok_or_else(|| ViewError::validation("sort was not applied"))
    }

    pub fn set_query(&mut self, query: ViewQuery) -> Result<(), ViewError> {
        self.replan(query)
    }

    /// Installs a new record set directly, as a record source resolving
    /// would. Identifiers must be unique. Loads started before this call are
    /// discarded when they complete.
    pub fn replace_records(&mut self, records: Vec<R>) -> Result<(), ViewError> {
        self.ensure_mounted()?;
        self.install(records)
    }

    /// Starts loading from `source` after the configured latency. Any load
    /// still in flight is aborted.
    pub fn start_load<S>(&mut self, source: Arc<S>) -> Result<TaskTicket, ViewError>
    where
        S: RecordSource<R> + ?Sized + 'static,
    {
        self.ensure_mounted()?;
        let runtime = runtime()?;
        let superseded = self.tasks.abort_kind(TaskKind::Load);
        if superseded > 0 {
            debug!(screen = %self.screen, superseded, "aborted older loads");
        }
        let ticket = self.tasks.reserve(TaskKind::Load);
        let label = source.describe();
        let revision = self.revision;
        let latency = self.config.load_latency;
        let timeout = self.config.load_timeout;
        let tx = self.tx.clone();
        let guard = PanicGuard {
            ticket,
            kind: TaskKind::Load,
            tx: self.tx.clone(),
        };
        let handle = runtime.spawn(async move {
            let _guard = guard;
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            let loaded = match tokio::time::timeout(timeout, source.load()).await {
                Ok(Ok(records)) => Ok(records),
                Ok(Err(err)) => Err(ViewError::from(err)),
                Err(_) => Err(ViewError::from(SourceError::new(
                    SourceErrorCode::Timeout,
                    format!(
                        "{} did not answer within {}ms",
                        source.describe(),
                        timeout.as_millis()
                    ),
                ))),
            };
            // The view may be gone by now.
            let _ = tx.send(Completion {
                ticket,
                outcome: Outcome::Loaded {
                    revision,
                    result: loaded,
                },
            });
        });
        self.tasks.attach(ticket, handle.abort_handle());
        info!(screen = %self.screen, %ticket, source = %label, revision, "load started");
        Ok(ticket)
    }

    /// Runs `action` against the current record snapshot after the
    /// configured save latency.
    pub fn start_action<A>(&mut self, action: A) -> Result<TaskTicket, ViewError>
    where
        A: RecordAction<R> + 'static,
    {
        self.ensure_mounted()?;
        if self.phase != Phase::Ready {
            return Err(ViewError::new(
                ViewErrorCode::NotReady,
                format!("{} cannot run before records are loaded", action.name()),
                true,
            ));
        }
        let runtime = runtime()?;
        let ticket = self.tasks.reserve(TaskKind::Action);
        let snapshot = Arc::clone(&self.records);
        let revision = self.revision;
        let latency = self.config.save_latency;
        let name = action.name().to_string();
        let tx = self.tx.clone();
        let guard = PanicGuard {
            ticket,
            kind: TaskKind::Action,
            tx: self.tx.clone(),
        };
        let handle = runtime.spawn(async move {
            let _guard = guard;
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            let result = action.apply(&snapshot);
            let _ = tx.send(Completion {
                ticket,
                outcome: Outcome::Acted {
                    revision,
                    action: action.name().to_string(),
                    result,
                },
            });
        });
        self.tasks.attach(ticket, handle.abort_handle());
        info!(screen = %self.screen, %ticket, action = %name, revision, "action started");
        Ok(ticket)
    }

    /// Waits for the next task completion and applies it. Returns `None`
    /// once nothing is pending or the view is unmounted.
    pub async fn next_completion(&mut self) -> Option<CompletionReport> {
        if self.phase == Phase::Unmounted {
            return None;
        }
        let completion = if self.tasks.is_empty() {
            self.rx.try_recv().ok()?
        } else {
            self.rx.recv().await?
        };
        Some(self.apply_completion(completion))
    }

    /// Applies whatever has already completed without waiting.
    pub fn drain_completions(&mut self) -> Vec<CompletionReport> {
        let mut reports = Vec::new();
        while self.phase != Phase::Unmounted {
            let Ok(completion) = self.rx.try_recv() else {
                break;
            };
            reports.push(self.apply_completion(completion));
        }
        reports
    }

    /// Aborts every pending task. The view refuses all further changes.
    pub fn unmount(&mut self) {
        if self.phase == Phase::Unmounted {
            return;
        }
        let aborted = self.tasks.abort_all();
        self.phase = Phase::Unmounted;
        info!(screen = %self.screen, aborted, "view unmounted");
    }

    /// The current visible rows in display order, for a report consumer.
    pub fn export(&self, format: ExportFormat) -> Result<ExportBatch<R>, ViewError> {
        self.ensure_mounted()?;
        if self.phase != Phase::Ready {
            return Err(ViewError::new(
                ViewErrorCode::NotReady,
                "nothing to export before records are loaded",
                true,
            ));
        }
        let records = self.visible_records().into_iter().cloned().collect();
        Ok(ExportBatch::new(
            format,
            &self.screen,
            self.plan.query_hash(),
            records,
        ))
    }

    fn ensure_mounted(&self) -> Result<(), ViewError> {
        if self.phase == Phase::Unmounted {
            Err(ViewError::unmounted())
        } else {
            Ok(())
        }
    }

    fn replan(&mut self, query: ViewQuery) -> Result<(), ViewError> {
        self.ensure_mounted()?;
        let plan = QueryPlan::compile(&query, &self.registry, &self.config.limits)
            .map_err(|err: QueryError| {
                debug!(screen = %self.screen, error = %err, "query rejected");
                ViewError::from(err)
            })?;
        self.query = query;
        self.plan = plan;
        if self.phase == Phase::Ready {
            self.recompute();
        }
        Ok(())
    }

    fn install(&mut self, records: Vec<R>) -> Result<(), ViewError> {
        let duplicate = {
            let mut seen = HashSet::with_capacity(records.len());
            records
                .iter()
                .find(|r| !seen.insert(r.record_id()))
                .map(|r| r.record_id().to_string())
        };
        if let Some(id) = duplicate {
            return Err(ViewError::validation(format!(
                "record id {id} appears more than once"
            )));
        }
        self.records = Arc::new(records);
        self.revision += 1;
        self.phase = Phase::Ready;
        self.recompute();
        Ok(())
    }

    fn recompute(&mut self) {
        let mut errors = Vec::new();
        let filtered = self.plan.filter().apply_indices(&self.records);
        let visible = match self.plan.sorter() {
            Some(sorter) => match sorter.apply_indices(&self.records, filtered.clone()) {
                Ok(sorted) => sorted,
                Err(err) => {
                    warn!(screen = %self.screen, error = %err, "sort failed; keeping insertion order");
                    errors.push(ComputationError {
                        stage: ComputeStage::Sort,
                        target: sorter.spec().field.clone(),
                        message: err.to_string(),
                    });
                    filtered
                }
            },
            None => filtered,
        };

        let visible_refs: Vec<&R> = visible.iter().filter_map(|&i| self.records.get(i)).collect();
        let all: Vec<&R> = if self.plan.aggregates().needs_global() {
            self.records.iter().collect()
        } else {
            Vec::new()
        };
        let mut aggregates = Aggregates::new();
        for (name, value) in self.plan.aggregates().compute_each(&visible_refs, &all) {
            match value {
                Ok(value) => aggregates.insert(name, value),
                Err(err) => {
                    warn!(screen = %self.screen, aggregate = %name, error = %err, "aggregate failed; reporting 0");
                    errors.push(ComputationError {
                        stage: ComputeStage::Aggregate,
                        target: name.clone(),
                        message: err.to_string(),
                    });
                    aggregates.insert(name, 0.0);
                }
            }
        }

        debug!(
            screen = %self.screen,
            query_hash = %self.plan.query_hash(),
            records = self.records.len(),
            visible = visible.len(),
            work_units = self.plan.cost().work_units(self.records.len()),
            degraded = errors.len(),
            "view recomputed"
        );
        self.visible = visible;
        self.aggregates = aggregates;
        self.computation_errors = errors;
    }

    fn apply_completion(&mut self, completion: Completion<R>) -> CompletionReport {
        let kind = completion.kind();
        if !self.tasks.finish(completion.ticket) {
            debug!(screen = %self.screen, ticket = %completion.ticket, kind = kind.as_str(), "discarded completion of an aborted task");
            return CompletionReport::Stale(kind);
        }
        match completion.outcome {
            Outcome::Loaded { revision, .. } if revision != self.revision => {
                info!(
                    screen = %self.screen,
                    started_at = revision,
                    current = self.revision,
                    "discarded load started before records were replaced"
                );
                CompletionReport::Stale(kind)
            }
            Outcome::Loaded {
                result: Ok(records),
                ..
            } => {
                let count = records.len();
                match self.install(records) {
                    Ok(()) => {
                        self.last_error = None;
                        info!(screen = %self.screen, records = count, "load finished");
                        CompletionReport::Applied(kind)
                    }
                    Err(err) => self.fail(kind, err),
                }
            }
            Outcome::Loaded { result: Err(err), .. } => self.fail(kind, err),
            Outcome::Panicked(kind) => {
                let code = match kind {
                    TaskKind::Load => ViewErrorCode::Load,
                    TaskKind::Action => ViewErrorCode::Action,
                };
                self.fail(kind, ViewError::new(code, format!("{} task panicked", kind.as_str()), true))
            }
            Outcome::Acted {
                revision,
                action,
                result,
            } => {
                if revision != self.revision {
                    info!(
                        screen = %self.screen,
                        action = %action,
                        started_at = revision,
                        current = self.revision,
                        "discarded action result computed against replaced records"
                    );
                    return CompletionReport::Stale(kind);
                }
                match result.map_err(ViewError::from).and_then(|records| self.install(records)) {
                    Ok(()) => {
                        self.last_error = None;
                        info!(screen = %self.screen, action = %action, "action applied");
                        CompletionReport::Applied(kind)
                    }
                    Err(err) => self.fail(kind, err),
                }
            }
        }
    }

    fn fail(&mut self, kind: TaskKind, err: ViewError) -> CompletionReport {
        warn!(screen = %self.screen, kind = kind.as_str(), error = %err, "task failed");
        self.last_error = Some(err.clone());
        CompletionReport::Failed(kind, err)
    }
}

impl<R> Drop for ViewModel<R> {
    fn drop(&mut self) {
        let aborted = self.tasks.abort_all();
        if aborted > 0 {
            debug!(screen = %self.screen, aborted, "view dropped with pending tasks");
        }
    }
}

fn runtime() -> Result<Handle, ViewError> {
    Handle::try_current().map_err(|_| {
        ViewError::new(
            ViewErrorCode::NotReady,
            "simulated-latency tasks need a tokio runtime",
            false,
        )
    })
}
