//! Project CRUD. Every project's `repo_url` is stored canonicalized so that
//! [`reactorcide_core::project::ProjectRegistry::lookup_by_repo_url`] never
//! needs to re-canonicalize a stored row.

use crate::auth::require_token;
use crate::errors::ApiError;
use crate::responses::{CreateProjectRequest, ProjectResponse, StatusResponse, UpdateProjectRequest};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use reactorcide_core::project::Project;
use reactorcide_core::{CoreError, ProjectId, Timestamp};
use std::collections::HashSet;
use std::str::FromStr;

pub async fn list(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    require_token(&state, &headers)?;
    let projects = state.projects.list().await?;
    Ok(Json(projects.iter().map(ProjectResponse::from).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateProjectRequest>,
) -> Result<Json<ProjectResponse>, ApiError> {
    require_token(&state, &headers)?;

    let now = Timestamp::now();
    let project = Project {
        project_id: ProjectId::new(),
        repo_url: Project::canonical_repo_url(&request.repo_url),
        name: request.name,
        description: request.description,
        enabled: true,
        target_branches: request.target_branches,
        allowed_event_types: HashSet::new(),
        default_ci_source_type: request.default_ci_source_type,
        default_ci_source_url: request.default_ci_source_url,
        default_ci_source_ref: request.default_ci_source_ref,
        default_image: request.default_image,
        default_job_command: request.default_job_command,
        default_timeout_seconds: request.default_timeout_seconds,
        default_queue_name: request.default_queue_name,
        vcs_token_secret: request.vcs_token_secret,
        webhook_secret: request.webhook_secret,
        created_at: now,
        updated_at: now,
    };

    let project = state.projects.create(project).await?;
    Ok(Json(ProjectResponse::from(&project)))
}

fn parse_project_id(raw: &str) -> Result<ProjectId, ApiError> {
    ProjectId::from_str(raw).map_err(|_| CoreError::InvalidInput(format!("'{raw}' is not a valid project id")).into())
}

async fn fetch(state: &AppState, id: &str) -> Result<Project, ApiError> {
    let project_id = parse_project_id(id)?;
    state
        .projects
        .get(project_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("project '{id}' not found")).into())
}

pub async fn get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ProjectResponse>, ApiError> {
    require_token(&state, &headers)?;
    let project = fetch(&state, &id).await?;
    Ok(Json(ProjectResponse::from(&project)))
}

pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<UpdateProjectRequest>,
) -> Result<Json<ProjectResponse>, ApiError> {
    require_token(&state, &headers)?;
    let mut project = fetch(&state, &id).await?;

    if let Some(name) = request.name {
        project.name = name;
    }
    if let Some(description) = request.description {
        project.description = description;
    }
    if let Some(enabled) = request.enabled {
        project.enabled = enabled;
    }
    if let Some(target_branches) = request.target_branches {
        project.target_branches = target_branches;
    }
    if let Some(v) = request.default_ci_source_type {
        project.default_ci_source_type = v;
    }
    if let Some(v) = request.default_ci_source_url {
        project.default_ci_source_url = v;
    }
    if let Some(v) = request.default_ci_source_ref {
        project.default_ci_source_ref = v;
    }
    if let Some(v) = request.default_image {
        project.default_image = v;
    }
    if let Some(v) = request.default_job_command {
        project.default_job_command = v;
    }
    if let Some(v) = request.default_timeout_seconds {
        project.default_timeout_seconds = v;
    }
    if let Some(v) = request.default_queue_name {
        project.default_queue_name = v;
    }
    if let Some(v) = request.webhook_secret {
        project.webhook_secret = v;
    }
    if let Some(v) = request.vcs_token_secret {
        project.vcs_token_secret = v;
    }
    project.updated_at = Timestamp::now();

    let project = state.projects.update(project).await?;
    Ok(Json(ProjectResponse::from(&project)))
}

pub async fn delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    require_token(&state, &headers)?;
    let project_id = parse_project_id(&id)?;
    state.projects.delete(project_id).await?;
    Ok(Json(StatusResponse::ok()))
}

#[cfg(test)]
#[path = "projects_tests.rs"]
mod tests;
