use crate::color::ColorMap;
use crate::filter::TextFilters;
use crate::interaction::Interaction;
use crate::search::{SearchSet, SetKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Row highlighting by free text. An empty text highlights nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Highlighter {
    text: String,
}

impl Highlighter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.trim().to_string();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn matches(&self, interaction: &Interaction) -> bool {
        if self.text.is_empty() {
            return false;
        }
        let needle = self.text.to_lowercase();
        [
            interaction.mention1.as_str(),
            interaction.mention2.as_str(),
            interaction.article_id(),
            interaction.journal(),
            interaction.section(),
            interaction.excerpt(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Attach the current display color to both endpoints of every record.
/// Unallocated ids get the neutral default.
pub fn apply_colors(filtrate: &mut [Interaction], colors: &ColorMap) {
    for interaction in filtrate.iter_mut() {
        interaction.mention1_color = Some(colors.color_of(&interaction.geneids1).to_string());
        interaction.mention2_color = Some(colors.color_of(&interaction.geneids2).to_string());
    }
}

/// Attach the searched-as label to an endpoint whose canonical mention
/// differs from the symbol it was searched under; `None` when they agree.
/// Collection sets are skipped: their name labels the group, not a symbol.
pub fn annotate_synonyms(filtrate: &mut [Interaction], sets: &[SearchSet]) {
    let searched_as = |id: &str| -> Option<&str> {
        sets.iter()
            .find(|s| s.kind == SetKind::Gene && s.ids.iter().any(|i| i == id))
            .map(|s| s.name.as_str())
    };

    for interaction in filtrate.iter_mut() {
        interaction.mention1_synonym = searched_as(&interaction.geneids1)
            .filter(|name| *name != interaction.mention1)
            .map(|name| name.to_string());
        interaction.mention2_synonym = searched_as(&interaction.geneids2)
            .filter(|name| *name != interaction.mention2)
            .map(|name| name.to_string());
    }
}

/// Set the highlight flag on every record from the highlighter text.
pub fn apply_highlight(filtrate: &mut [Interaction], highlighter: &Highlighter) {
    for interaction in filtrate.iter_mut() {
        interaction.highlight = highlighter.matches(interaction);
    }
}

/// Run the full transform chain on the raw interactions:
/// text-filter, then color, synonym-annotate, and highlight, in that fixed
/// order (later stages read fields the earlier ones set). Pure given its
/// inputs; re-running on the same inputs yields the same filtrate. The raw
/// records themselves are expected to be normalized at ingestion and are
/// never mutated here.
pub fn run(
    raw: &[Interaction],
    filters: &TextFilters,
    colors: &ColorMap,
    sets: &[SearchSet],
    highlighter: &Highlighter,
) -> Vec<Interaction> {
    let mut filtrate = filters.apply(raw);
    apply_colors(&mut filtrate, colors);
    annotate_synonyms(&mut filtrate, sets);
    apply_highlight(&mut filtrate, highlighter);
    debug!(raw = raw.len(), filtrate = filtrate.len(), "pipeline run");
    filtrate
}
