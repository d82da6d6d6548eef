use crate::adjacency::AdjacencyIndex;
use crate::color::ColorMap;
use crate::error::GeneDiveError;
use crate::filter::{TextFilterRule, TextFilters};
use crate::graph_view::GraphViewState;
use crate::history::{ApplicationSnapshot, History, SearchSnapshot, TableSnapshot};
use crate::interaction::{EntityId, EntityName, Interaction};
use crate::pipeline::{self, Highlighter};
use crate::search::{SearchSet, SearchSetManager, Topology};
use crate::table_view::{Grouper, TableState, TableSummaryRow, summarize};
use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, warn};

/// Default minimum interaction probability.
pub const DEFAULT_MIN_PROBABILITY: f64 = 0.5;

/// The display phase of the application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No active search sets; the help/landing view is shown.
    #[default]
    Landing,
    /// An evidence fetch is in flight.
    Loading,
    /// Results are rendered.
    Displaying,
    /// The fetch completed but filtering left nothing to show.
    Empty,
    /// The current sets violate the selected topology; the previous
    /// display, if any, is preserved unredrawn.
    Blocked,
}

/// A ticketed request for evidence, handed to the host event loop to
/// resolve through an [`crate::api::InteractionApi`]. A request is current
/// until a newer one is issued.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub ticket: u64,
    pub ids: Vec<EntityId>,
    pub min_probability: f64,
}

/// What a search-affecting action resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The action was rejected (duplicate set, clique limit); nothing
    /// changed and nothing was snapshotted.
    Rejected,
    /// All sets cleared; back on the landing view.
    Landing,
    /// Topology constraints are violated; the user was notified.
    Blocked,
    /// The graph search produced no candidate ids; the previous display is
    /// kept as-is.
    NoCandidates,
    /// Evidence is needed: resolve this request and hand the result to
    /// [`StateCoordinator::complete_fetch`].
    Fetch(FetchRequest),
}

/// How a delivered fetch result was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDisposition {
    /// The result belonged to a superseded request and was discarded.
    Stale,
    /// The result was applied; the new phase is carried.
    Applied(Phase),
    /// The fetch failed; the prior phase was restored.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

/// User-visible notification sink. The GUI shows toasts; tests record.
pub trait Notifier {
    fn notify(&mut self, kind: NoticeKind, message: &str);
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&mut self, _kind: NoticeKind, _message: &str) {}
}

/// The application state machine. Owns the undo/redo history and the
/// single logical in-flight fetch, drives the search-set manager and the
/// pipeline, and keeps every derived view consistent with its inputs.
///
/// Single-threaded and event-driven: all methods are synchronous, and the
/// only suspension point is the host resolving a [`FetchRequest`].
pub struct StateCoordinator {
    adjacency: AdjacencyIndex,
    search: SearchSetManager,
    colors: ColorMap,
    filters: TextFilters,
    highlighter: Highlighter,
    grouper: Grouper,
    min_probability: f64,
    tablestate: TableState,
    interactions: Option<Vec<Interaction>>,
    filtrate: Option<Vec<Interaction>>,
    graph: GraphViewState,
    history: History,
    phase: Phase,
    phase_before_loading: Phase,
    ticket_counter: u64,
    in_flight: Option<u64>,
    notifier: Box<dyn Notifier>,
}

impl StateCoordinator {
    pub fn new(adjacency: AdjacencyIndex) -> Self {
        Self::with_notifier(adjacency, Box::new(NullNotifier))
    }

    pub fn with_notifier(adjacency: AdjacencyIndex, notifier: Box<dyn Notifier>) -> Self {
        Self {
            adjacency,
            search: SearchSetManager::new(),
            colors: ColorMap::new(),
            filters: TextFilters::new(),
            highlighter: Highlighter::new(),
            grouper: Grouper::default(),
            min_probability: DEFAULT_MIN_PROBABILITY,
            tablestate: TableState::default(),
            interactions: None,
            filtrate: None,
            graph: GraphViewState::default(),
            history: History::new(),
            phase: Phase::Landing,
            phase_before_loading: Phase::Landing,
            ticket_counter: 0,
            in_flight: None,
            notifier,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn sets(&self) -> &[SearchSet] {
        self.search.sets()
    }

    pub fn topology(&self) -> Topology {
        self.search.topology()
    }

    pub fn min_probability(&self) -> f64 {
        self.min_probability
    }

    pub fn filters(&self) -> &TextFilters {
        &self.filters
    }

    pub fn highlight_text(&self) -> &str {
        self.highlighter.text()
    }

    pub fn grouper(&self) -> Grouper {
        self.grouper
    }

    pub fn table_state(&self) -> &TableState {
        &self.tablestate
    }

    pub fn interactions(&self) -> Option<&[Interaction]> {
        self.interactions.as_deref()
    }

    pub fn filtrate(&self) -> Option<&[Interaction]> {
        self.filtrate.as_deref()
    }

    pub fn graph(&self) -> &GraphViewState {
        &self.graph
    }

    pub fn table_summary(&self) -> Vec<TableSummaryRow> {
        summarize(self.filtrate.as_deref().unwrap_or(&[]), self.grouper)
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn has_fetch_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    // ---- search-affecting actions ------------------------------------

    /// Add a search set and re-run the search. A rejected add (duplicate
    /// name, clique limit) notifies the user and changes nothing.
    pub fn add_search_set(&mut self, name: &str, ids: &[EntityId]) -> SearchOutcome {
        if let Err(e) = self.search.add_set(name, ids) {
            self.notifier.notify(NoticeKind::Warning, &e.to_string());
            return SearchOutcome::Rejected;
        }
        self.run_search()
    }

    /// Add a search set without re-running the search, as when graph nodes
    /// are accumulated before one combined search. Returns whether the set
    /// was added.
    pub fn extend_search(&mut self, name: &str, ids: &[EntityId]) -> bool {
        match self.search.add_set(name, ids) {
            Ok(()) => true,
            Err(e) => {
                self.notifier.notify(NoticeKind::Warning, &e.to_string());
                false
            }
        }
    }

    /// Node select behavior: replace the whole search with this entity.
    pub fn select_node(&mut self, name: &str, id: &str) -> SearchOutcome {
        self.search.clear();
        self.add_search_set(name, &[id.to_string()])
    }

    pub fn remove_search_set(&mut self, identifier: &str) -> SearchOutcome {
        self.search.remove_set(identifier);
        self.run_search()
    }

    pub fn clear_search(&mut self) -> SearchOutcome {
        self.search.clear();
        self.run_search()
    }

    pub fn select_topology(&mut self, topology: Topology) -> SearchOutcome {
        self.search.set_topology(topology);
        self.run_search()
    }

    pub fn set_min_probability(&mut self, min_probability: f64) -> SearchOutcome {
        self.min_probability = min_probability.clamp(0.0, 1.0);
        self.run_search()
    }

    /// Validate, derive candidate ids, and issue a fetch. Any prior fetch
    /// is cancelled first; its late result will be discarded.
    pub fn run_search(&mut self) -> SearchOutcome {
        self.cancel_fetch();

        if self.search.is_empty() {
            self.enter_phase(Phase::Landing);
            self.snapshot();
            return SearchOutcome::Landing;
        }

        if let Some(violation) = self.search.topology_violation() {
            self.notifier.notify(NoticeKind::Warning, &violation);
            self.enter_phase(Phase::Blocked);
            self.snapshot();
            return SearchOutcome::Blocked;
        }

        let ids =
            self.search
                .compute_search_ids(self.min_probability, &self.adjacency, &mut self.colors);
        if ids.is_empty() {
            self.snapshot();
            return SearchOutcome::NoCandidates;
        }

        // A new search always starts from the summary table view.
        self.tablestate = TableState::default();
        if self.phase != Phase::Loading {
            self.phase_before_loading = self.phase;
        }
        self.enter_phase(Phase::Loading);
        self.ticket_counter += 1;
        self.in_flight = Some(self.ticket_counter);
        debug!(ticket = self.ticket_counter, ids = ids.len(), "fetch issued");
        SearchOutcome::Fetch(FetchRequest {
            ticket: self.ticket_counter,
            ids,
            min_probability: self.min_probability,
        })
    }

    /// Deliver the outcome of a fetch. Results for superseded tickets are
    /// discarded silently; failures fall back to the phase the search
    /// started from.
    pub fn complete_fetch(
        &mut self,
        ticket: u64,
        result: Result<Vec<Interaction>, GeneDiveError>,
    ) -> FetchDisposition {
        if self.in_flight != Some(ticket) {
            debug!(ticket, "discarding result of superseded fetch");
            return FetchDisposition::Stale;
        }
        self.in_flight = None;

        match result {
            Err(e) => {
                warn!(ticket, error = %e, "fetch failed");
                self.notifier
                    .notify(NoticeKind::Error, &format!("Could not load interactions: {e}"));
                let fallback = match self.phase_before_loading {
                    Phase::Displaying | Phase::Empty => self.phase_before_loading,
                    _ => Phase::Landing,
                };
                self.enter_phase(fallback);
                FetchDisposition::Failed
            }
            Ok(mut interactions) => {
                for interaction in &mut interactions {
                    interaction.normalize();
                }
                self.interactions = Some(interactions);
                self.refresh_views();
                let phase = if self.filtrate.as_ref().is_some_and(|f| !f.is_empty()) {
                    Phase::Displaying
                } else {
                    Phase::Empty
                };
                self.enter_phase(phase);
                self.snapshot();
                FetchDisposition::Applied(phase)
            }
        }
    }

    // ---- pipeline-only actions ---------------------------------------

    pub fn add_filter_rule(&mut self, rule: TextFilterRule) {
        self.filters.add(rule);
        self.after_pipeline_change();
    }

    pub fn remove_filter_rule(&mut self, index: usize) {
        self.filters.remove(index);
        self.after_pipeline_change();
    }

    pub fn set_highlight_text(&mut self, text: &str) {
        self.highlighter.set_text(text);
        self.after_pipeline_change();
    }

    pub fn select_grouping(&mut self, grouper: Grouper) {
        self.grouper = grouper;
        self.tablestate = TableState::default();
        self.snapshot();
    }

    pub fn zoom_into_group(&mut self, key: &str) {
        self.tablestate = TableState {
            zoomed: true,
            zoomgroup: Some(key.to_string()),
        };
        self.snapshot();
    }

    pub fn zoom_out(&mut self) {
        self.tablestate = TableState::default();
        self.snapshot();
    }

    fn after_pipeline_change(&mut self) {
        if self.interactions.is_some() {
            self.refresh_views();
            if matches!(self.phase, Phase::Displaying | Phase::Empty) {
                let phase = if self.filtrate.as_ref().is_some_and(|f| !f.is_empty()) {
                    Phase::Displaying
                } else {
                    Phase::Empty
                };
                self.enter_phase(phase);
            }
        }
        self.snapshot();
    }

    /// Re-run the full transform chain and rebuild the graph view from the
    /// stored raw interactions. Always the same stage order on the same
    /// derived data.
    fn refresh_views(&mut self) {
        let raw = self.interactions.as_deref().unwrap_or(&[]);
        let filtrate = pipeline::run(
            raw,
            &self.filters,
            &self.colors,
            self.search.sets(),
            &self.highlighter,
        );
        self.graph = GraphViewState::build(&filtrate, self.search.sets());
        self.filtrate = Some(filtrate);
    }

    // ---- absent-member reporting -------------------------------------

    /// Search-set member ids with no interactions in the current view.
    pub fn absent_search_members(&self) -> Vec<EntityId> {
        self.graph.absent_members(self.search.sets())
    }

    /// Surface resolved names of absent members as an informational
    /// notification.
    pub fn report_absent_members(&mut self, names: &[EntityName]) {
        if names.is_empty() {
            return;
        }
        let list = names
            .iter()
            .map(|n| format!("{} ({})", n.primary, n.id))
            .join(", ");
        self.notifier.notify(
            NoticeKind::Info,
            &format!("Some members of the search set had no associated interactions: {list}"),
        );
    }

    // ---- history -----------------------------------------------------

    /// Capture the full application state into history, discarding any
    /// redo branch.
    fn snapshot(&mut self) {
        let snapshot = self.current_snapshot();
        self.history.push(snapshot);
        debug!(len = self.history.len(), "state snapshotted");
    }

    fn current_snapshot(&self) -> ApplicationSnapshot {
        ApplicationSnapshot {
            grouper: self.grouper,
            interactions: self.interactions.clone(),
            search: SearchSnapshot {
                sets: self.search.sets().to_vec(),
                topology: self.search.topology(),
            },
            probfilter: self.min_probability,
            textfilter: self.filters.clone(),
            table: TableSnapshot {
                tablestate: self.tablestate.clone(),
                filtrate: self.filtrate.clone(),
            },
            graph: self.graph.clone(),
        }
    }

    pub fn undo(&mut self) -> Result<(), GeneDiveError> {
        let snapshot = self.history.undo()?.clone();
        self.apply_snapshot(snapshot);
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), GeneDiveError> {
        let snapshot = self.history.redo()?.clone();
        self.apply_snapshot(snapshot);
        Ok(())
    }

    /// Serialize the live state for the save boundary.
    pub fn save_state(&self) -> Result<String, GeneDiveError> {
        self.current_snapshot().to_json()
    }

    /// Restore from a stored state string. A malformed snapshot fails the
    /// whole restore; nothing is applied partially.
    pub fn restore_state(&mut self, data: &str) -> Result<(), GeneDiveError> {
        let snapshot = ApplicationSnapshot::from_json(data)?;
        self.apply_snapshot(snapshot);
        self.snapshot();
        Ok(())
    }

    /// Install a snapshot wholesale. Raw interactions come from the
    /// snapshot; no fetch is re-issued.
    fn apply_snapshot(&mut self, snapshot: ApplicationSnapshot) {
        self.cancel_fetch();
        self.grouper = snapshot.grouper;
        self.interactions = snapshot.interactions;
        self.search
            .restore(snapshot.search.sets, snapshot.search.topology);
        self.min_probability = snapshot.probfilter;
        self.filters = snapshot.textfilter;
        self.tablestate = snapshot.table.tablestate;
        self.filtrate = snapshot.table.filtrate;
        self.graph = snapshot.graph;

        let phase = if self.search.is_empty() {
            Phase::Landing
        } else if self.search.topology_violation().is_some() {
            Phase::Blocked
        } else {
            match &self.filtrate {
                Some(f) if !f.is_empty() => Phase::Displaying,
                _ => Phase::Empty,
            }
        };
        self.enter_phase(phase);
    }

    // ---- internals ---------------------------------------------------

    fn enter_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!(from = ?self.phase, to = ?phase, "phase transition");
            self.phase = phase;
        }
    }

    fn cancel_fetch(&mut self) {
        if let Some(ticket) = self.in_flight.take() {
            debug!(ticket, "in-flight fetch cancelled");
        }
    }
}
