//! HTTP surface for a rendering layer.
//!
//! JSON in, JSON out. Id-targeted routes answer 204 whether or not the id
//! exists: an unknown id is a no-op, not an error.

use crate::filter::{apply_filters, compute_statistics, CompletionFilter, FilterSpec, Statistics};
use crate::manager::TodoManager;
use crate::persist::DurableStore;
use crate::world::{NewTask, Priority, Task, TaskPatch};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;
use uuid::Uuid;

// ── Shared state ───────────────────────────────────────────────

pub type Store = Box<dyn DurableStore + Send + Sync>;

pub struct AppState {
    pub manager: RwLock<TodoManager<Store>>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn shared(manager: TodoManager<Store>) -> SharedState {
        Arc::new(AppState {
            manager: RwLock::new(manager),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, TodoManager<Store>> {
        self.manager.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TodoManager<Store>> {
        self.manager.write().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/todos", get(list_todos).post(add_todo))
        .route("/api/todos/:id", patch(update_todo).delete(delete_todo))
        .route("/api/todos/:id/toggle", post(toggle_todo))
        .route("/api/stats", get(stats))
        .route("/api/categories", get(categories))
        .route("/api/tags", get(tags))
        .route("/api/health", get(health))
        .with_state(state)
}

// ── Request/response types ─────────────────────────────────────

/// Query string for `GET /api/todos`. `tags` is comma separated;
/// `completed` is `all`, `active` or `completed`.
#[derive(Debug, Default, Deserialize)]
pub struct TodoQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub completed: Option<String>,
    pub tags: Option<String>,
}

impl TodoQuery {
    pub fn into_spec(self) -> Result<FilterSpec, String> {
        let priority = match self.priority.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<Priority>().map_err(|e| e.to_string())?),
        };
        let completed = match self.completed.as_deref() {
            None => None,
            Some(raw) => raw
                .parse::<CompletionFilter>()
                .map_err(|e| e.to_string())?
                .as_completed(),
        };
        let tags = self
            .tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        Ok(FilterSpec {
            search_term: self.search,
            category: self.category,
            priority,
            completed,
            tags,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub ready: bool,
    pub revision: u64,
    pub tasks: usize,
}

// ── Handlers ───────────────────────────────────────────────────

pub async fn list_todos(
    State(state): State<SharedState>,
    Query(query): Query<TodoQuery>,
) -> Result<Json<Vec<Task>>, (StatusCode, String)> {
    let spec = query
        .into_spec()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let manager = state.read();
    let tasks = apply_filters(manager.tasks(), &spec)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(tasks))
}

/// 201 with the new task, or 200 with `null` when the form was dropped
/// (blank title or no priority).
pub async fn add_todo(
    State(state): State<SharedState>,
    Json(form): Json<NewTask>,
) -> (StatusCode, Json<Option<Task>>) {
    let mut manager = state.write();
    let created = manager
        .add_task(form)
        .and_then(|id| manager.get(id).cloned());

    match created {
        Some(task) => {
            info!(id = %task.id, title = %task.title, "created todo");
            (StatusCode::CREATED, Json(Some(task)))
        }
        None => (StatusCode::OK, Json(None)),
    }
}

pub async fn update_todo(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<TaskPatch>,
) -> StatusCode {
    state.write().update_task(id, patch);
    StatusCode::NO_CONTENT
}

pub async fn toggle_todo(State(state): State<SharedState>, Path(id): Path<Uuid>) -> StatusCode {
    state.write().toggle_task(id);
    StatusCode::NO_CONTENT
}

pub async fn delete_todo(State(state): State<SharedState>, Path(id): Path<Uuid>) -> StatusCode {
    state.write().delete_task(id);
    StatusCode::NO_CONTENT
}

pub async fn stats(State(state): State<SharedState>) -> Json<Statistics> {
    Json(compute_statistics(state.read().tasks()))
}

pub async fn categories(State(state): State<SharedState>) -> Json<Vec<String>> {
    Json(state.read().categories())
}

pub async fn tags(State(state): State<SharedState>) -> Json<Vec<String>> {
    Json(state.read().tags())
}

pub async fn health(State(state): State<SharedState>) -> Json<Health> {
    let manager = state.read();
    Json(Health {
        ready: manager.is_ready(),
        revision: manager.revision(),
        tasks: manager.tasks().len(),
    })
}

// ── Tests ──────────────────────────────────────────────────────
