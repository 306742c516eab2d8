//! HeroSearch trait - what the search pipeline dispatches to

use serde::{Deserialize, Serialize};

use crate::HeroRecord;

/// Search capability consumed by the search pipeline.
///
/// Implementations never fail: a failed lookup resolves to an empty list.
#[trait_variant::make(HeroSearch: Send)]
pub trait LocalHeroSearch {
    /// Heroes whose name matches `term`
    async fn search_heroes(&self, term: &str) -> Vec<HeroRecord>;
}

/// One delivered result set, tagged with the term that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Debounced, de-duplicated term
    pub term: String,

    /// Heroes returned for `term`
    pub heroes: Vec<HeroRecord>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.heroes.is_empty()
    }
}
