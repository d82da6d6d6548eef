use crate::interaction::EntityId;
use std::collections::HashMap;

/// Rotating palette for one-hop search sets.
pub const PALETTE: [&str; 12] = [
    "#4dadf7", "#ff8787", "#748ffc", "#ffd43b", "#69db7c", "#3bc9db", "#38d9a9", "#9775fa",
    "#ffa94d", "#da77f2", "#a9e34b", "#f783ac",
];

/// Fixed color for the user-picked seeds of a multi-hop or clique search.
pub const SEED_COLOR: &str = "#4dadf7";
/// Fixed color for entities discovered by a multi-hop or clique search.
pub const DISCOVERED_COLOR: &str = "#ffa94d";
/// Neutral color for ids without an allocation.
pub const DEFAULT_COLOR: &str = "#aaaaaa";
/// Color a search set carries before any allocation.
pub const UNASSIGNED_SET_COLOR: &str = "#cccccc";

/// Display color assignments for entity ids. Reset at the start of every
/// search-id derivation so colors track the current search only.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    assignments: HashMap<EntityId, String>,
    next_color: usize,
}

impl ColorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.assignments.clear();
        self.next_color = 0;
    }

    pub fn color_of(&self, id: &str) -> &str {
        self.assignments
            .get(id)
            .map(|c| c.as_str())
            .unwrap_or(DEFAULT_COLOR)
    }

    pub fn set_color(&mut self, ids: &[EntityId], color: &str) {
        for id in ids {
            self.assignments.insert(id.clone(), color.to_string());
        }
    }

    /// Assign the next unused palette color to `ids`, cycling when the
    /// palette is exhausted.
    pub fn allocate_color(&mut self, ids: &[EntityId]) -> String {
        let color = PALETTE[self.next_color % PALETTE.len()].to_string();
        self.next_color += 1;
        self.set_color(ids, &color);
        color
    }
}
