use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeneDiveError {
    #[error("'{0}' is already in the search")]
    DuplicateSearchSet(String),

    #[error("clique searches are limited to a single entity")]
    CliqueSingleEntity,

    #[error("search set must contain at least one entity id")]
    EmptySearchSet,

    #[error("history index {index} out of bounds for {len} snapshot(s)")]
    HistoryOutOfBounds { index: isize, len: usize },

    #[error("interaction fetch failed: {0}")]
    Fetch(String),

    #[error("malformed stored state: {0}")]
    MalformedState(serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
