use crate::interaction::Interaction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How the results table groups the filtrate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grouper {
    /// One row per undirected entity pair.
    #[default]
    Pair,
    /// One row per source article.
    Article,
}

/// Zoom state of the results table: either the summary view, or zoomed
/// into the detail rows of one group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableState {
    pub zoomed: bool,
    pub zoomgroup: Option<String>,
}

/// One summary row, aggregated over every filtrate record in the group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSummaryRow {
    pub key: String,
    pub label: String,
    pub count: usize,
    pub max_probability: f64,
    pub highlighted: bool,
}

fn group_key(interaction: &Interaction, grouper: Grouper) -> String {
    match grouper {
        Grouper::Pair => interaction.pair_key(),
        Grouper::Article => interaction.article_id().to_string(),
    }
}

fn group_label(interaction: &Interaction, grouper: Grouper) -> String {
    match grouper {
        Grouper::Pair => {
            let mut names = [interaction.mention1.as_str(), interaction.mention2.as_str()];
            names.sort_unstable();
            format!("{} - {}", names[0], names[1])
        }
        Grouper::Article => interaction.article_id().to_string(),
    }
}

/// Aggregate the filtrate into summary rows under the chosen grouping,
/// ordered by descending evidence count, then key.
pub fn summarize(filtrate: &[Interaction], grouper: Grouper) -> Vec<TableSummaryRow> {
    let mut groups: BTreeMap<String, TableSummaryRow> = BTreeMap::new();
    for interaction in filtrate {
        let key = group_key(interaction, grouper);
        let row = groups.entry(key.clone()).or_insert_with(|| TableSummaryRow {
            key,
            label: group_label(interaction, grouper),
            count: 0,
            max_probability: 0.0,
            highlighted: false,
        });
        row.count += 1;
        if interaction.probability > row.max_probability {
            row.max_probability = interaction.probability;
        }
        if interaction.highlight {
            row.highlighted = true;
        }
    }

    let mut rows: Vec<TableSummaryRow> = groups.into_values().collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    rows
}

/// The individual evidence records of one summary group, for the zoomed
/// detail view.
pub fn detail_rows<'a>(
    filtrate: &'a [Interaction],
    grouper: Grouper,
    key: &str,
) -> Vec<&'a Interaction> {
    filtrate
        .iter()
        .filter(|i| group_key(i, grouper) == key)
        .collect()
}
