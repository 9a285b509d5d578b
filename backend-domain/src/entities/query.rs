// Listing filters and paged results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::AnomalyStatus;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnomalyFilter {
    pub status: Option<AnomalyStatus>,
    pub min_risk_score: Option<f64>,
    pub max_risk_score: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub algorithm: Option<String>,
    pub search: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl AnomalyFilter {
    pub fn open_page(limit: usize) -> Self {
        Self {
            status: Some(AnomalyStatus::Open),
            limit: Some(limit),
            offset: Some(0),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PagedResult<T> {
    pub rows: Vec<T>,
    pub total_count: u64,
}
