//! Filtered views and statistics over a task slice.
//!
//! Everything here is recomputed from the tasks on every call. Nothing is
//! cached on a task, so overdue counts follow the clock.

use crate::world::{Priority, Task};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// All set fields must match. `tags` matches when the task carries any one
/// of them. Empty strings and an empty tag list constrain nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Add the tag if it isn't selected, remove it if it is.
    pub fn toggle_tag(&mut self, tag: &str) {
        match self.tags.iter().position(|t| t == tag) {
            Some(index) => {
                self.tags.remove(index);
            }
            None => self.tags.push(tag.to_string()),
        }
    }

    pub fn clear(&mut self) {
        *self = FilterSpec::default();
    }

    /// True when at least one field narrows the result.
    pub fn is_active(&self) -> bool {
        self.search_filter().is_some()
            || self.category_filter().is_some()
            || self.priority.is_some()
            || self.completed.is_some()
            || !self.tags.is_empty()
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(term) = self.search_filter() {
            let term = term.to_lowercase();
            let in_title = task.title.to_lowercase().contains(&term);
            let in_description = task
                .description
                .as_ref()
                .is_some_and(|d| d.to_lowercase().contains(&term));
            if !in_title && !in_description {
                return false;
            }
        }

        if let Some(category) = self.category_filter() {
            if task.category.as_deref() != Some(category) {
                return false;
            }
        }

        if self.priority.is_some_and(|p| p != task.priority) {
            return false;
        }

        if self.completed.is_some_and(|c| c != task.completed) {
            return false;
        }

        if !self.tags.is_empty() && !self.tags.iter().any(|tag| task.tags.contains(tag)) {
            return false;
        }

        true
    }

    fn search_filter(&self) -> Option<&str> {
        self.search_term.as_deref().filter(|s| !s.is_empty())
    }

    fn category_filter(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }
}

/// The subsequence of `tasks` matching `spec`, order preserved.
pub fn apply_filters<'a>(tasks: &'a [Task], spec: &FilterSpec) -> Vec<&'a Task> {
    tasks.iter().filter(|task| spec.matches(task)).collect()
}

// ── Completion selector ────────────────────────────────────────

/// The "all / active / completed" selector, as it maps onto
/// `FilterSpec::completed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompletionFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl CompletionFilter {
    pub fn as_completed(self) -> Option<bool> {
        match self {
            CompletionFilter::All => None,
            CompletionFilter::Active => Some(false),
            CompletionFilter::Completed => Some(true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCompletionFilter(pub String);

impl fmt::Display for UnknownCompletionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown completion filter `{}` (expected all, active or completed)", self.0)
    }
}

impl std::error::Error for UnknownCompletionFilter {}

impl FromStr for CompletionFilter {
    type Err = UnknownCompletionFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(CompletionFilter::All),
            "active" => Ok(CompletionFilter::Active),
            "completed" => Ok(CompletionFilter::Completed),
            _ => Err(UnknownCompletionFilter(s.to_string())),
        }
    }
}

// ── Statistics ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
    pub overdue: usize,
}

pub fn compute_statistics(tasks: &[Task]) -> Statistics {
    compute_statistics_at(tasks, Utc::now())
}

pub fn compute_statistics_at(tasks: &[Task], now: DateTime<Utc>) -> Statistics {
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.completed).count();
    let overdue = tasks.iter().filter(|t| t.is_overdue(now)).count();

    Statistics {
        total,
        completed,
        active: total - completed,
        overdue,
    }
}

// ── Tests ──────────────────────────────────────────────────────
