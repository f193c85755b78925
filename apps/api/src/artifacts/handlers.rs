use axum::{
    body::Body,
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::artifacts::reader::ArtifactBody;
use crate::artifacts::resolver::Delivery;
use crate::artifacts::ArtifactFormat;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DeliveryQuery {
    pub format: Option<String>,
}

/// GET /resume/:job_id?format=rendered|source
///
/// Streams the job's resume as an attachment. `pdf`/`tex` are accepted as aliases.
pub async fn handle_get_resume(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<DeliveryQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Path(job_id) = path?;
    let Query(query) = query?;
    let format = match query.format.as_deref() {
        None | Some("") => ArtifactFormat::default(),
        Some(raw) => raw.parse::<ArtifactFormat>().map_err(AppError::Validation)?,
    };

    let job = state
        .jobs
        .get_job(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let delivery = state.resolver.resolve(&job, format).await?;
    Ok(into_attachment(delivery))
}

fn into_attachment(delivery: Delivery) -> Response {
    let content_type = delivery.content_type();
    let disposition = format!(
        "attachment; filename=\"{}\"",
        sanitize_filename(&delivery.filename)
    );
    let length = delivery.content.length;

    let body = match delivery.content.body {
        ArtifactBody::Bytes(bytes) => Body::from(bytes),
        ArtifactBody::Stream(stream) => Body::from_stream(stream),
    };

    let mut response = body.into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    if let Some(len) = length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    }
    response
}

/// Keeps the filename inside the quoted-string and within visible ASCII.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect()
}
