use crate::error::GeneDiveError;
use crate::filter::TextFilters;
use crate::graph_view::GraphViewState;
use crate::interaction::Interaction;
use crate::search::{SearchSet, Topology};
use crate::table_view::{Grouper, TableState};
use serde::{Deserialize, Serialize};

/// Search portion of a snapshot: the sets and the topology they were
/// searched under.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchSnapshot {
    pub sets: Vec<SearchSet>,
    pub topology: Topology,
}

/// Table portion of a snapshot: zoom state plus the filtrate backing the
/// rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub tablestate: TableState,
    pub filtrate: Option<Vec<Interaction>>,
}

/// One immutable capture of the full application state. The field layout
/// is the stored-state contract: it round-trips through JSON exactly, both
/// for in-session history and for save/restore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplicationSnapshot {
    pub grouper: Grouper,
    pub interactions: Option<Vec<Interaction>>,
    pub search: SearchSnapshot,
    pub probfilter: f64,
    pub textfilter: TextFilters,
    pub table: TableSnapshot,
    pub graph: GraphViewState,
}

impl ApplicationSnapshot {
    pub fn to_json(&self) -> Result<String, GeneDiveError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a stored snapshot. Any missing or malformed field fails the
    /// whole parse, so a broken snapshot is never partially applied.
    pub fn from_json(data: &str) -> Result<Self, GeneDiveError> {
        serde_json::from_str(data).map_err(GeneDiveError::MalformedState)
    }
}

/// Linear undo/redo history. Pushing after navigating back discards the
/// redo branch; the index is always a valid position once any snapshot
/// exists.
#[derive(Debug, Clone, Default)]
pub struct History {
    snapshots: Vec<ApplicationSnapshot>,
    current: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&ApplicationSnapshot> {
        self.current.and_then(|i| self.snapshots.get(i))
    }

    pub fn can_undo(&self) -> bool {
        self.current.is_some_and(|i| i > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.current
            .is_some_and(|i| i + 1 < self.snapshots.len())
    }

    /// Append a snapshot after the current position, truncating any redo
    /// branch, and advance onto it.
    pub fn push(&mut self, snapshot: ApplicationSnapshot) {
        let keep = self.current.map_or(0, |i| i + 1);
        self.snapshots.truncate(keep);
        self.snapshots.push(snapshot);
        self.current = Some(self.snapshots.len() - 1);
    }

    /// Move to an absolute position. Out-of-bounds targets are a contract
    /// violation, reported as an error.
    pub fn go_to(&mut self, index: isize) -> Result<&ApplicationSnapshot, GeneDiveError> {
        if index < 0 || index as usize >= self.snapshots.len() {
            return Err(GeneDiveError::HistoryOutOfBounds {
                index,
                len: self.snapshots.len(),
            });
        }
        self.current = Some(index as usize);
        Ok(&self.snapshots[index as usize])
    }

    pub fn undo(&mut self) -> Result<&ApplicationSnapshot, GeneDiveError> {
        let target = self.current.map_or(-1, |i| i as isize - 1);
        self.go_to(target)
    }

    pub fn redo(&mut self) -> Result<&ApplicationSnapshot, GeneDiveError> {
        let target = self.current.map_or(0, |i| i as isize + 1);
        self.go_to(target)
    }
}
