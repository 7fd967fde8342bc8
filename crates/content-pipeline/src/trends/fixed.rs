//! Fixed Trend Source
//!
//! For offline runs and tests. Applies the same relevance filter as the live
//! feed.

use async_trait::async_trait;

use super::{RelevanceFilter, TrendSource};
use crate::error::Result;

pub struct FixedTrendSource {
    trends: Vec<String>,
}

impl FixedTrendSource {
    /// Use `trends` verbatim
    pub fn new<I, S>(trends: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            trends: trends.into_iter().map(Into::into).collect(),
        }
    }

    /// Keep only the names `filter` accepts
    pub fn filtered<I, S>(trends: I, filter: &RelevanceFilter) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            trends: trends
                .into_iter()
                .map(Into::into)
                .filter(|t: &String| filter.is_relevant(t))
                .collect(),
        }
    }
}

#[async_trait]
impl TrendSource for FixedTrendSource {
    async fn fetch_trends(&self) -> Result<Vec<String>> {
        Ok(self.trends.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}
