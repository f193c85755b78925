//! Dashboard statistics. Aggregated by the store; the bucket table lives here.

use serde::Serialize;
use sqlx::FromRow;

use crate::models::job::JobRow;

/// Buckets in display order. Lower bound inclusive.
const SCORE_BUCKETS: [(f64, &str); 5] = [
    (90.0, "90-100"),
    (80.0, "80-89"),
    (70.0, "70-79"),
    (60.0, "60-69"),
    (50.0, "50-59"),
];
const BELOW_BUCKET: &str = "Below 50";

#[derive(Debug, Clone, Default, Serialize, PartialEq, FromRow)]
pub struct JobTotals {
    pub total_jobs: i64,
    pub resumes_generated: i64,
    pub scored: i64,
    pub ineligible: i64,
    pub avg_score: Option<f64>,
    pub max_score: Option<f64>,
    /// Lowest score above zero.
    pub min_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq, FromRow)]
pub struct ScoreBucket {
    pub range: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub totals: JobTotals,
    pub score_distribution: Vec<ScoreBucket>,
    pub recent_jobs: Vec<JobRow>,
}

fn bucket_labels() -> impl Iterator<Item = &'static str> {
    SCORE_BUCKETS
        .iter()
        .map(|(_, label)| *label)
        .chain(std::iter::once(BELOW_BUCKET))
}

/// `CASE` expression over `score` that yields the bucket label.
pub fn bucket_case_sql() -> String {
    let arms: String = SCORE_BUCKETS
        .iter()
        .map(|(floor, label)| format!(" WHEN score >= {floor} THEN '{label}'"))
        .collect();
    format!("CASE{arms} ELSE '{BELOW_BUCKET}' END")
}

/// Puts buckets in display order: highest range first, `Below 50` last.
pub fn order_buckets(mut buckets: Vec<ScoreBucket>) -> Vec<ScoreBucket> {
    buckets.sort_by_key(|bucket| {
        bucket_labels()
            .position(|label| label == bucket.range)
            .unwrap_or(usize::MAX)
    });
    buckets
}
