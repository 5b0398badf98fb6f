//! Video generation request payload.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Category;

/// Region prefix used in generated titles when none is configured.
pub const DEFAULT_REGION: &str = "北方地区";

/// Body of a `POST` to the video generation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoRequest {
    /// Human-readable video title
    pub title: String,
    /// Category label
    pub category: Category,
    /// Date the prices refer to, `YYYY-MM-DD`
    pub target_date: String,
}

impl GenerateVideoRequest {
    /// Build the request for one category on one day.
    ///
    /// The title reads "<region> today's <category> prices (<date>)".
    pub fn new(region: &str, category: Category, date: NaiveDate) -> Self {
        let target_date = date.format("%Y-%m-%d").to_string();
        Self {
            title: format!("{}今日{}价格({})", region, category.label(), target_date),
            category,
            target_date,
        }
    }
}
