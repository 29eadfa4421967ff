use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ── Entity types ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPriority(pub String);

impl fmt::Display for UnknownPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown priority `{}` (expected low, medium or high)", self.0)
    }
}

impl std::error::Error for UnknownPriority {}

impl FromStr for Priority {
    type Err = UnknownPriority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(UnknownPriority(s.to_string())),
        }
    }
}

/// A todo. Field names on the wire are camelCase (`dueDate`, `createdAt`, ...).
///
/// `due_date` accepts either a full RFC 3339 timestamp or a bare
/// `YYYY-MM-DD` date, which is read as midnight UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub priority: Priority,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_due_date"
    )]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Open, has a due date, and that date is strictly before `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < now)
    }
}

// ── Inputs ─────────────────────────────────────────────────────

/// What the add form submits.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Required. A form without one is dropped like a blank title.
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "deserialize_due_date")]
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    /// A filled-in form at medium priority, the add form's initial choice.
    pub fn titled(title: impl Into<String>) -> Self {
        NewTask {
            title: title.into(),
            priority: Some(Priority::Medium),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
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

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn due(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Partial update. `None` leaves a field alone; for the optional fields
/// `Some(None)` clears the value and `Some(Some(v))` sets it.
///
/// In JSON an absent key means "leave alone" and `null` means "clear".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub category: Option<Option<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "deserialize_present_due_date")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    pub fn clear_description(mut self) -> Self {
        self.description = Some(None);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(Some(category.into()));
        self
    }

    pub fn clear_category(mut self) -> Self {
        self.category = Some(None);
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn due(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(Some(due_date));
        self
    }

    pub fn clear_due(mut self) -> Self {
        self.due_date = Some(None);
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Shallow merge into `task`. Does not touch `id`, `created_at` or `updated_at`.
    fn merge_into(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(tags) = self.tags {
            task.tags = tags;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

/// Raw values from the item editor.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: String,
}

impl EditForm {
    /// Seed the editor from an existing task.
    pub fn from_task(task: &Task) -> Self {
        EditForm {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            category: task.category.clone().unwrap_or_default(),
            priority: task.priority,
            due_date: task
                .due_date
                .map(|due| due.date_naive().format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }

    /// `None` when the title is blank. Blank optional fields clear the value.
    /// An unparseable due date is treated as blank.
    pub fn into_patch(self) -> Option<TaskPatch> {
        let title = self.title.trim();
        if title.is_empty() {
            return None;
        }

        Some(TaskPatch {
            title: Some(title.to_string()),
            description: Some(non_blank(Some(self.description))),
            category: Some(non_blank(Some(self.category))),
            priority: Some(self.priority),
            due_date: Some(parse_due_date(self.due_date.trim())),
            ..Default::default()
        })
    }
}

// ── Commands / Events ─────────────────────────────────────────

/// A requested mutation. `World::apply` validates it and reports what changed.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddTask(NewTask),
    UpdateTask { task_id: Uuid, patch: TaskPatch },
    ToggleTask { task_id: Uuid },
    DeleteTask { task_id: Uuid },
}

/// What actually happened. Every event means the collection changed and
/// must be persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    TaskAdded {
        revision: u64,
        task: Task,
    },
    TaskUpdated {
        revision: u64,
        task_id: Uuid,
    },
    TaskToggled {
        revision: u64,
        task_id: Uuid,
        completed: bool,
    },
    TaskDeleted {
        revision: u64,
        task_id: Uuid,
    },
}

impl Event {
    pub fn revision(&self) -> u64 {
        match self {
            Event::TaskAdded { revision, .. }
            | Event::TaskUpdated { revision, .. }
            | Event::TaskToggled { revision, .. }
            | Event::TaskDeleted { revision, .. } => *revision,
        }
    }

    pub fn task_id(&self) -> Uuid {
        match self {
            Event::TaskAdded { task, .. } => task.id,
            Event::TaskUpdated { task_id, .. }
            | Event::TaskToggled { task_id, .. }
            | Event::TaskDeleted { task_id, .. } => *task_id,
        }
    }
}

// ── Errors ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// Title was empty after trimming
    EmptyTitle,
    MissingPriority,
    TaskNotFound,
}

// ── The World ──────────────────────────────────────────────────

/// The in-memory collection, newest first.
/// All mutations go through apply(), which returns an Event on success and
/// leaves the world untouched on error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct World {
    pub tasks: Vec<Task>,
    pub revision: u64,
}

impl World {
    pub fn new() -> Self {
        World::default()
    }

    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        World { tasks, revision: 0 }
    }

    pub fn apply(&mut self, cmd: Command, now: DateTime<Utc>) -> Result<Event, WorldError> {
        match cmd {
            Command::AddTask(form) => {
                let title = form.title.trim();
                if title.is_empty() {
                    return Err(WorldError::EmptyTitle);
                }
                let priority = form.priority.ok_or(WorldError::MissingPriority)?;

                let task = Task {
                    id: self.fresh_id(),
                    title: title.to_string(),
                    description: non_blank(form.description),
                    completed: false,
                    category: non_blank(form.category),
                    tags: form
                        .tags
                        .iter()
                        .map(|tag| tag.trim())
                        .filter(|tag| !tag.is_empty())
                        .map(str::to_string)
                        .collect(),
                    priority,
                    due_date: form.due_date,
                    created_at: now,
                    updated_at: now,
                };

                self.revision += 1;
                self.tasks.insert(0, task.clone());
                Ok(Event::TaskAdded {
                    revision: self.revision,
                    task,
                })
            }

            Command::UpdateTask { task_id, patch } => {
                let task = self.get_mut(task_id).ok_or(WorldError::TaskNotFound)?;
                patch.merge_into(task);
                touch(task, now);

                self.revision += 1;
                Ok(Event::TaskUpdated {
                    revision: self.revision,
                    task_id,
                })
            }

            Command::ToggleTask { task_id } => {
                let task = self.get_mut(task_id).ok_or(WorldError::TaskNotFound)?;
                task.completed = !task.completed;
                touch(task, now);
                let completed = task.completed;

                self.revision += 1;
                Ok(Event::TaskToggled {
                    revision: self.revision,
                    task_id,
                    completed,
                })
            }

            Command::DeleteTask { task_id } => {
                let index = self.position(task_id).ok_or(WorldError::TaskNotFound)?;
                self.tasks.remove(index);

                self.revision += 1;
                Ok(Event::TaskDeleted {
                    revision: self.revision,
                    task_id,
                })
            }
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: Uuid) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    fn fresh_id(&self) -> Uuid {
        loop {
            let id = Uuid::new_v4();
            if self.position(id).is_none() {
                return id;
            }
        }
    }

    /// Distinct non-empty categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        first_seen(
            self.tasks
                .iter()
                .filter_map(|t| t.category.as_deref())
                .filter(|c| !c.is_empty()),
        )
    }

    /// Distinct tags across all tasks in first-seen order.
    pub fn tags(&self) -> Vec<&str> {
        first_seen(self.tasks.iter().flat_map(|t| t.tags.iter().map(String::as_str)))
    }
}

// ── Helpers ────────────────────────────────────────────────────

/// Stamp a mutation. Never moves updated_at before created_at.
fn touch(task: &mut Task, now: DateTime<Utc>) {
    task.updated_at = now.max(task.created_at);
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn first_seen<'a>(items: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    items.filter(|item| seen.insert(*item)).collect()
}

/// RFC 3339 timestamp, or a bare `YYYY-MM-DD` read as midnight UTC.
pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

fn deserialize_due_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_due_date(s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid due date `{s}`"))),
    }
}

// A key that is present (even as null) becomes Some(..).
fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn deserialize_present_due_date<'de, D>(
    deserializer: D,
) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_due_date(deserializer).map(Some)
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 11, 9, 0, 0).unwrap()
    }

    fn add(w: &mut World, form: NewTask, at: DateTime<Utc>) -> Uuid {
        match w.apply(Command::AddTask(form), at).unwrap() {
            Event::TaskAdded { task, .. } => task.id,
            other => panic!("expected TaskAdded, got {other:?}"),
        }
    }

    #[test]
    fn add_task_starts_open() {
        let mut w = World::new();
        let id = add(&mut w, NewTask::titled("Buy milk").priority(Priority::High), t0());

        let task = w.get(id).unwrap();
        assert_eq!(task.title, "Buy milk");
        assert!(!task.completed);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.created_at, t0());
        assert_eq!(task.updated_at, t0());
        assert_eq!(w.revision, 1);
    }

    #[test]
    fn add_task_prepends() {
        let mut w = World::new();
        let first = add(&mut w, NewTask::titled("first"), t0());
        let second = add(&mut w, NewTask::titled("second"), t0() + Duration::minutes(1));
        let third = add(&mut w, NewTask::titled("third"), t0() + Duration::minutes(2));

        let ids: Vec<Uuid> = w.tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![third, second, first]);
        assert!(w.tasks.windows(2).all(|p| p[0].created_at >= p[1].created_at));
    }

    #[test]
    fn add_task_ids_are_unique() {
        let mut w = World::new();
        for i in 0..200 {
            add(&mut w, NewTask::titled(format!("task {i}")), t0());
        }
        let ids: HashSet<Uuid> = w.tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut w = World::new();
        for title in ["", "   ", "\t\n"] {
            let result = w.apply(Command::AddTask(NewTask::titled(title)), t0());
            assert_eq!(result.unwrap_err(), WorldError::EmptyTitle);
        }
        assert!(w.tasks.is_empty());
        assert_eq!(w.revision, 0);
    }

    #[test]
    fn add_task_normalizes_form_fields() {
        let mut w = World::new();
        let form = NewTask::titled("  Plan trip ")
            .description("   ")
            .category(" travel ")
            .tags(["  x ", "", "y", "y"]);
        let id = add(&mut w, form, t0());

        let task = w.get(id).unwrap();
        assert_eq!(task.title, "Plan trip");
        assert_eq!(task.description, None);
        assert_eq!(task.category.as_deref(), Some("travel"));
        assert_eq!(task.tags, vec!["x", "y", "y"]);
    }

    #[test]
    fn update_changes_only_named_fields() {
        let mut w = World::new();
        let form = NewTask::titled("Write report")
            .description("quarterly")
            .category("work")
            .tags(["x"])
            .priority(Priority::Low);
        let id = add(&mut w, form, t0());
        let before = w.get(id).unwrap().clone();

        let later = t0() + Duration::hours(1);
        w.apply(
            Command::UpdateTask { task_id: id, patch: TaskPatch::new().priority(Priority::High) },
            later,
        )
        .unwrap();

        let after = w.get(id).unwrap();
        assert_eq!(after.priority, Priority::High);
        assert_eq!(after.updated_at, later);
        assert_eq!(
            Task { priority: before.priority, updated_at: before.updated_at, ..after.clone() },
            before
        );
    }

    #[test]
    fn update_can_clear_optional_fields() {
        let mut w = World::new();
        let form = NewTask::titled("x").description("d").category("c").due(t0());
        let id = add(&mut w, form, t0());

        let patch = TaskPatch::new().clear_description().clear_category().clear_due();
        w.apply(Command::UpdateTask { task_id: id, patch }, t0()).unwrap();

        let task = w.get(id).unwrap();
        assert_eq!(task.description, None);
        assert_eq!(task.category, None);
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn update_does_not_validate_title() {
        let mut w = World::new();
        let id = add(&mut w, NewTask::titled("x"), t0());
        w.apply(Command::UpdateTask { task_id: id, patch: TaskPatch::new().title("") }, t0())
            .unwrap();
        assert_eq!(w.get(id).unwrap().title, "");
    }

    #[test]
    fn update_unknown_task() {
        let mut w = World::new();
        add(&mut w, NewTask::titled("x"), t0());
        let snapshot = w.clone();

        let result = w.apply(
            Command::UpdateTask { task_id: Uuid::new_v4(), patch: TaskPatch::new().title("y") },
            t0(),
        );
        assert_eq!(result.unwrap_err(), WorldError::TaskNotFound);
        assert_eq!(w, snapshot);
    }

    #[test]
    fn toggle_twice_restores_completed() {
        let mut w = World::new();
        let id = add(&mut w, NewTask::titled("x"), t0());

        let e1 = w.apply(Command::ToggleTask { task_id: id }, t0() + Duration::seconds(1)).unwrap();
        assert!(matches!(e1, Event::TaskToggled { completed: true, .. }));
        let first_stamp = w.get(id).unwrap().updated_at;

        w.apply(Command::ToggleTask { task_id: id }, t0() + Duration::seconds(2)).unwrap();
        let task = w.get(id).unwrap();
        assert!(!task.completed);
        assert!(task.updated_at > first_stamp);
        assert!(first_stamp > task.created_at);
    }

    #[test]
    fn updated_at_never_precedes_created_at() {
        let mut w = World::new();
        let id = add(&mut w, NewTask::titled("x"), t0());
        w.apply(Command::ToggleTask { task_id: id }, t0() - Duration::days(1)).unwrap();

        let task = w.get(id).unwrap();
        assert!(task.updated_at >= task.created_at);
    }

    #[test]
    fn delete_is_final() {
        let mut w = World::new();
        let id = add(&mut w, NewTask::titled("Doomed"), t0());
        let keep = add(&mut w, NewTask::titled("Keep"), t0());

        w.apply(Command::DeleteTask { task_id: id }, t0()).unwrap();
        assert!(w.get(id).is_none());

        let snapshot = w.clone();
        for cmd in [
            Command::ToggleTask { task_id: id },
            Command::DeleteTask { task_id: id },
            Command::UpdateTask { task_id: id, patch: TaskPatch::new().title("back") },
        ] {
            assert_eq!(w.apply(cmd, t0()).unwrap_err(), WorldError::TaskNotFound);
        }
        assert_eq!(w, snapshot);
        assert!(w.get(keep).is_some());
    }

    #[test]
    fn revision_increments_on_every_mutation() {
        let mut w = World::new();
        let id = add(&mut w, NewTask::titled("x"), t0());
        assert_eq!(w.revision, 1);

        let e = w.apply(Command::ToggleTask { task_id: id }, t0()).unwrap();
        assert_eq!(e.revision(), 2);
        assert_eq!(e.task_id(), id);

        w.apply(Command::UpdateTask { task_id: id, patch: TaskPatch::new() }, t0()).unwrap();
        w.apply(Command::DeleteTask { task_id: id }, t0()).unwrap();
        assert_eq!(w.revision, 4);
    }

    #[test]
    fn categories_first_seen_without_blanks() {
        let mut w = World::new();
        add(&mut w, NewTask::titled("a").category("work"), t0());
        add(&mut w, NewTask::titled("b"), t0());
        add(&mut w, NewTask::titled("c").category("home"), t0());
        add(&mut w, NewTask::titled("d").category("work"), t0());
        // Loaded data may carry an empty category.
        w.tasks[0].category = Some(String::new());

        // newest first: d(""), c(home), b(-), a(work)
        assert_eq!(w.categories(), vec!["home", "work"]);
    }

    #[test]
    fn tags_first_seen() {
        let mut w = World::new();
        add(&mut w, NewTask::titled("a").tags(["x", "y"]), t0());
        add(&mut w, NewTask::titled("b").tags(["z", "x", "z"]), t0());

        assert_eq!(w.tags(), vec!["z", "x", "y"]);
    }

    #[test]
    fn overdue_requires_open_task_with_past_due_date() {
        let mut w = World::new();
        let id = add(&mut w, NewTask::titled("x").due(t0() - Duration::days(1)), t0());
        let task = w.get(id).unwrap();
        assert!(task.is_overdue(t0()));
        assert!(!task.is_overdue(t0() - Duration::days(2)));

        let done = Task { completed: true, ..task.clone() };
        assert!(!done.is_overdue(t0()));

        let undated = Task { due_date: None, ..task.clone() };
        assert!(!undated.is_overdue(t0()));
    }

    #[test]
    fn due_date_accepts_plain_dates() {
        assert_eq!(
            parse_due_date("2026-02-11"),
            Some(Utc.with_ymd_and_hms(2026, 2, 11, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_due_date("2026-02-11T09:00:00.000Z"),
            Some(t0())
        );
        assert_eq!(parse_due_date("next tuesday"), None);
    }

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" low ".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
        assert_eq!(Priority::Medium.to_string(), "medium");
    }

    #[test]
    fn patch_json_distinguishes_absent_from_null() {
        let patch: TaskPatch =
            serde_json::from_str(r#"{"description": null, "priority": "high"}"#).unwrap();
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.category, None);
        assert_eq!(patch.priority, Some(Priority::High));

        let patch: TaskPatch = serde_json::from_str(r#"{"dueDate": "2026-02-11"}"#).unwrap();
        assert_eq!(
            patch.due_date,
            Some(Some(Utc.with_ymd_and_hms(2026, 2, 11, 0, 0, 0).unwrap()))
        );

        let empty: TaskPatch = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, TaskPatch::default());
    }

    #[test]
    fn new_task_json_reads_date_picker_values() {
        let form: NewTask = serde_json::from_str(
            r#"{"title": "Pay rent", "priority": "high", "dueDate": "2026-03-01"}"#,
        )
        .unwrap();
        let mut w = World::new();
        let id = add(&mut w, form, t0());
        let task = w.get(id).unwrap();
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.due_date, Some(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()));

        let form: NewTask =
            serde_json::from_str(r#"{"title": "No date", "priority": "low", "dueDate": ""}"#)
                .unwrap();
        let id = add(&mut w, form, t0());
        assert_eq!(w.get(id).unwrap().due_date, None);
    }

    #[test]
    fn new_task_json_without_priority_or_title_is_not_added() {
        let form: NewTask = serde_json::from_str(r#"{"title": "no priority given"}"#).unwrap();
        assert_eq!(form.priority, None);

        let mut w = World::new();
        let result = w.apply(Command::AddTask(form), t0());
        assert_eq!(result.unwrap_err(), WorldError::MissingPriority);
        assert!(w.tasks.is_empty());
        assert_eq!(w.revision, 0);

        assert!(serde_json::from_str::<NewTask>(r#"{"priority": "high"}"#).is_err());
    }

    #[test]
    fn edit_form_refuses_blank_title() {
        let form = EditForm { title: "   ".into(), ..Default::default() };
        assert_eq!(form.into_patch(), None);
    }

    #[test]
    fn edit_form_round_trips_through_task() {
        let mut w = World::new();
        let id = add(
            &mut w,
            NewTask::titled("x")
                .description("d")
                .due(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()),
            t0(),
        );

        let mut form = EditForm::from_task(w.get(id).unwrap());
        assert_eq!(form.due_date, "2026-03-01");
        assert_eq!(form.category, "");

        form.title = " renamed ".into();
        form.description = "  ".into();
        let patch = form.into_patch().unwrap();
        w.apply(Command::UpdateTask { task_id: id, patch }, t0()).unwrap();

        let task = w.get(id).unwrap();
        assert_eq!(task.title, "renamed");
        assert_eq!(task.description, None);
        assert_eq!(task.due_date, Some(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()));
    }
}
