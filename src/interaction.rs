use serde::{Deserialize, Serialize};

pub type EntityId = String;

/// Sentinel for interactions whose source article is not on record.
pub const UNAVAILABLE_ARTICLE: &str = "N/A";
/// Sentinel for interactions whose article section is not on record.
pub const UNKNOWN_SECTION: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityClass {
    Gene,
    Chemical,
    Disease,
}

impl EntityClass {
    /// Classify an entity id by its leading character. Disease and chemical
    /// ids carry a fixed prefix letter; everything else is a gene.
    pub fn from_id(id: &str) -> Self {
        match id.chars().next() {
            Some('D') => EntityClass::Disease,
            Some('C') => EntityClass::Chemical,
            _ => EntityClass::Gene,
        }
    }
}

/// One evidence record connecting two entities, as returned by the
/// interaction store. The source fields are never rewritten after
/// [`Interaction::normalize`]; the display fields are attached by the
/// pipeline on the filtrate copy only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Interaction {
    pub geneids1: EntityId,
    pub mention1: String,
    pub geneids2: EntityId,
    pub mention2: String,
    pub probability: f64,
    pub pubmed_id: Option<String>,
    pub article_id: Option<String>,
    pub section: Option<String>,
    pub journal: Option<String>,
    pub excerpt: Option<String>,

    // Display fields, attached by the pipeline.
    pub mention1_color: Option<String>,
    pub mention2_color: Option<String>,
    pub mention1_synonym: Option<String>,
    pub mention2_synonym: Option<String>,
    pub highlight: bool,
}

impl Interaction {
    /// Replace missing or blank source values with fixed sentinels.
    ///
    /// A null or zero article id means "not available" and is propagated
    /// identically into the paired article_id field; a null or blank section
    /// label becomes "Unknown". Run once at the ingestion boundary so
    /// filtering sees one spelling per missing value.
    pub fn normalize(&mut self) {
        let article_missing = match self.pubmed_id.as_deref() {
            None => true,
            Some(raw) => raw.trim().is_empty() || raw.trim() == "0",
        };
        if article_missing {
            self.pubmed_id = Some(UNAVAILABLE_ARTICLE.to_string());
            self.article_id = Some(UNAVAILABLE_ARTICLE.to_string());
        } else if self.article_id.as_deref().is_none_or(|a| a.trim().is_empty()) {
            self.article_id = self.pubmed_id.clone();
        }

        if self.section.as_deref().is_none_or(|s| s.trim().is_empty()) {
            self.section = Some(UNKNOWN_SECTION.to_string());
        }
    }

    /// Stable key for the undirected entity pair of this record.
    pub fn pair_key(&self) -> String {
        let mut ids = [self.geneids1.as_str(), self.geneids2.as_str()];
        ids.sort_unstable();
        format!("{}_{}", ids[0], ids[1])
    }

    pub fn pubmed_id(&self) -> &str {
        self.pubmed_id.as_deref().unwrap_or(UNAVAILABLE_ARTICLE)
    }

    pub fn article_id(&self) -> &str {
        self.article_id.as_deref().unwrap_or(UNAVAILABLE_ARTICLE)
    }

    pub fn section(&self) -> &str {
        self.section.as_deref().unwrap_or(UNKNOWN_SECTION)
    }

    pub fn journal(&self) -> &str {
        self.journal.as_deref().unwrap_or("")
    }

    pub fn excerpt(&self) -> &str {
        self.excerpt.as_deref().unwrap_or("")
    }
}

/// Primary display name of an entity, used to report search-set members
/// absent from the results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityName {
    pub id: EntityId,
    pub primary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pubmed: Option<&str>, section: Option<&str>) -> Interaction {
        Interaction {
            geneids1: "30".to_string(),
            mention1: "HER2".to_string(),
            geneids2: "84".to_string(),
            mention2: "EGFR".to_string(),
            probability: 0.91,
            pubmed_id: pubmed.map(|s| s.to_string()),
            section: section.map(|s| s.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_missing_article() {
        let mut i = record(None, Some("abstract"));
        i.normalize();
        assert_eq!(i.pubmed_id(), UNAVAILABLE_ARTICLE);
        assert_eq!(i.article_id(), UNAVAILABLE_ARTICLE);
        assert_eq!(i.section(), "abstract");
    }

    #[test]
    fn test_normalize_zero_article_and_blank_section() {
        let mut i = record(Some("0"), Some("   "));
        i.normalize();
        assert_eq!(i.pubmed_id(), UNAVAILABLE_ARTICLE);
        assert_eq!(i.article_id(), UNAVAILABLE_ARTICLE);
        assert_eq!(i.section(), UNKNOWN_SECTION);
    }

    #[test]
    fn test_normalize_keeps_present_values() {
        let mut i = record(Some("123456"), Some("results"));
        i.normalize();
        assert_eq!(i.pubmed_id(), "123456");
        assert_eq!(i.article_id(), "123456");
        assert_eq!(i.section(), "results");
    }

    #[test]
    fn test_pair_key_is_order_independent() {
        let a = record(Some("1"), None);
        let mut b = a.clone();
        std::mem::swap(&mut b.geneids1, &mut b.geneids2);
        assert_eq!(a.pair_key(), b.pair_key());
        assert_eq!(a.pair_key(), "30_84");
    }

    #[test]
    fn test_entity_class_from_id() {
        assert_eq!(EntityClass::from_id("D003920"), EntityClass::Disease);
        assert_eq!(EntityClass::from_id("C0004057"), EntityClass::Chemical);
        assert_eq!(EntityClass::from_id("672"), EntityClass::Gene);
        assert_eq!(EntityClass::from_id(""), EntityClass::Gene);
    }

    #[test]
    fn test_interaction_json_round_trip() {
        let mut i = record(Some("123"), Some("results"));
        i.normalize();
        let text = serde_json::to_string(&i).unwrap();
        let back: Interaction = serde_json::from_str(&text).unwrap();
        assert_eq!(i, back);
    }
}
