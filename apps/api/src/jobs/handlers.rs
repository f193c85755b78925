use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::jobs::stats::DashboardStats;
use crate::jobs::status::{InvalidStatus, JobStatus};
use crate::jobs::transition::transition;
use crate::jobs::versions::{latest, versions};
use crate::models::job::{JobFilter, JobRow, JobVersionRow};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;
const RECENT_JOBS: i64 = 5;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Untyped: a missing, null or non-string `status` is an invalid status.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: Option<Value>,
}

impl StatusRequest {
    fn into_status(self) -> Result<String, InvalidStatus> {
        match self.status {
            Some(Value::String(status)) => Ok(status),
            Some(other) => Err(InvalidStatus(other.to_string())),
            None => Err(InvalidStatus(String::new())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub id: i64,
    pub status: JobStatus,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub owner: Option<String>,
    pub status: Option<String>,
    pub min_score: Option<f64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct JobDetailResponse {
    pub job: JobRow,
    pub versions: Vec<JobVersionRow>,
    pub has_resume: bool,
}

#[derive(Debug, Deserialize)]
pub struct VersionsQuery {
    pub owner: String,
    pub company: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct VersionsResponse {
    pub latest: Option<i64>,
    pub versions: Vec<JobVersionRow>,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub owner: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// PUT /jobs/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let Path(id) = path?;
    let Json(request) = payload?;
    let status = request.into_status()?;

    let change = transition(state.jobs.as_ref(), id, &status).await?;
    Ok(Json(StatusResponse {
        success: true,
        id: change.id,
        status: change.status,
        updated_at: change.updated_at,
    }))
}

/// GET /jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    query: Result<Query<ListJobsQuery>, QueryRejection>,
) -> Result<Json<Vec<JobRow>>, AppError> {
    let Query(query) = query?;
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<JobStatus>)
        .transpose()?;

    let filter = JobFilter {
        owner: query.owner,
        status,
        min_score: query.min_score,
        limit: query
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE),
        offset: query.offset.unwrap_or(0).max(0),
    };

    Ok(Json(state.jobs.list_jobs(&filter).await?))
}

/// GET /jobs/:id
///
/// The job plus every attempt sharing its `(owner, company, role)` identity.
pub async fn handle_get_job(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<JobDetailResponse>, AppError> {
    let Path(id) = path?;
    let job = state
        .jobs
        .get_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;

    let versions = versions(state.jobs.as_ref(), &job.owner, &job.company, &job.role).await?;

    Ok(Json(JobDetailResponse {
        has_resume: job.has_resume(),
        job,
        versions,
    }))
}

/// GET /jobs/versions?owner=&company=&role=
pub async fn handle_list_versions(
    State(state): State<AppState>,
    query: Result<Query<VersionsQuery>, QueryRejection>,
) -> Result<Json<VersionsResponse>, AppError> {
    let Query(query) = query?;
    let versions = versions(
        state.jobs.as_ref(),
        &query.owner,
        &query.company,
        &query.role,
    )
    .await?;

    Ok(Json(VersionsResponse {
        latest: latest(&versions).map(|v| v.id),
        versions,
    }))
}

/// GET /stats
pub async fn handle_stats(
    State(state): State<AppState>,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> Result<Json<DashboardStats>, AppError> {
    let Query(query) = query?;
    let owner = query.owner.as_deref();
    let totals = state.jobs.stats_totals(owner).await?;
    let score_distribution = state.jobs.score_buckets(owner).await?;
    let recent_jobs = state
        .jobs
        .list_jobs(&JobFilter {
            owner: query.owner.clone(),
            limit: RECENT_JOBS,
            ..JobFilter::default()
        })
        .await?;

    Ok(Json(DashboardStats {
        totals,
        score_distribution,
        recent_jobs,
    }))
}
