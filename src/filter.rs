use crate::interaction::Interaction;
use serde::{Deserialize, Serialize};

/// Interaction fields a text filter rule can match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterField {
    /// Either endpoint's display name.
    Mention,
    Article,
    Journal,
    Section,
    Excerpt,
}

/// One user-defined predicate: keep records whose `field` contains `text`
/// (include) or does not (exclude). Matching is case-insensitive substring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFilterRule {
    pub field: FilterField,
    pub include: bool,
    pub text: String,
}

impl TextFilterRule {
    pub fn include(field: FilterField, text: &str) -> Self {
        Self {
            field,
            include: true,
            text: text.to_string(),
        }
    }

    pub fn exclude(field: FilterField, text: &str) -> Self {
        Self {
            field,
            include: false,
            text: text.to_string(),
        }
    }

    pub fn passes(&self, interaction: &Interaction) -> bool {
        let needle = self.text.to_lowercase();
        let matched = match self.field {
            FilterField::Mention => {
                interaction.mention1.to_lowercase().contains(&needle)
                    || interaction.mention2.to_lowercase().contains(&needle)
            }
            FilterField::Article => interaction.article_id().to_lowercase().contains(&needle),
            FilterField::Journal => interaction.journal().to_lowercase().contains(&needle),
            FilterField::Section => interaction.section().to_lowercase().contains(&needle),
            FilterField::Excerpt => interaction.excerpt().to_lowercase().contains(&needle),
        };
        matched == self.include
    }
}

/// Ordered rule collection combined with logical AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextFilters {
    rules: Vec<TextFilterRule>,
}

impl TextFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, rule: TextFilterRule) {
        self.rules.push(rule);
    }

    /// Remove the rule at `index`; out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) {
        if index < self.rules.len() {
            self.rules.remove(index);
        }
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[TextFilterRule] {
        &self.rules
    }

    pub fn passes(&self, interaction: &Interaction) -> bool {
        self.rules.iter().all(|rule| rule.passes(interaction))
    }

    /// Produce the filtrate: a fresh copy of every passing record. The raw
    /// interactions are left untouched.
    pub fn apply(&self, raw: &[Interaction]) -> Vec<Interaction> {
        raw.iter().filter(|i| self.passes(i)).cloned().collect()
    }
}
