//! The todo collection manager.
//!
//! Owns the World and the store it is saved to. Every successful command
//! yields an Event; once the initial load has finished, each Event triggers a
//! full overwrite of the stored collection. Nothing here returns an error to
//! the caller: rejected commands are no-ops and storage failures are logged.

use crate::persist::{decode_tasks, encode_tasks, DurableStore, COLLECTION_KEY};
use crate::world::{Command, Event, NewTask, Task, TaskPatch, World};
use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub struct TodoManager<S> {
    world: World,
    store: S,
    ready: bool,
}

impl<S: DurableStore> TodoManager<S> {
    /// An empty, not yet loaded manager. Mutations are kept in memory but not
    /// saved until `load` has run.
    pub fn new(store: S) -> Self {
        TodoManager {
            world: World::new(),
            store,
            ready: false,
        }
    }

    /// `new` followed by `load`.
    pub fn open(store: S) -> Self {
        let mut manager = Self::new(store);
        manager.load();
        manager
    }

    /// Replace the in-memory collection with the stored one.
    ///
    /// A missing blob gives an empty collection. An unreadable or corrupt
    /// blob is logged and also gives an empty collection.
    pub fn load(&mut self) {
        let tasks = match self.store.read(COLLECTION_KEY) {
            Ok(Some(blob)) => match decode_tasks(&blob) {
                Ok(tasks) => tasks,
                Err(e) => {
                    error!(error = %e, "failed to parse stored todos, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                error!(error = %e, "failed to read stored todos, starting empty");
                Vec::new()
            }
        };

        info!(tasks = tasks.len(), "todos loaded");
        self.world = World::from_tasks(tasks);
        self.ready = true;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Current collection, newest first.
    pub fn tasks(&self) -> &[Task] {
        &self.world.tasks
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.world.get(id)
    }

    /// Bumped on every applied mutation since the last load.
    pub fn revision(&self) -> u64 {
        self.world.revision
    }

    // ── Operations ─────────────────────────────────────────────

    /// Returns the new task's id, or `None` when the title was blank or no
    /// priority was chosen.
    pub fn add_task(&mut self, form: NewTask) -> Option<Uuid> {
        self.dispatch(Command::AddTask(form)).map(|event| event.task_id())
    }

    pub fn update_task(&mut self, id: Uuid, patch: TaskPatch) {
        self.dispatch(Command::UpdateTask { task_id: id, patch });
    }

    pub fn toggle_task(&mut self, id: Uuid) {
        self.dispatch(Command::ToggleTask { task_id: id });
    }

    pub fn delete_task(&mut self, id: Uuid) {
        self.dispatch(Command::DeleteTask { task_id: id });
    }

    pub fn categories(&self) -> Vec<String> {
        self.world.categories().into_iter().map(str::to_string).collect()
    }

    pub fn tags(&self) -> Vec<String> {
        self.world.tags().into_iter().map(str::to_string).collect()
    }

    // ── Internals ──────────────────────────────────────────────

    /// Apply, then save if anything changed.
    fn dispatch(&mut self, cmd: Command) -> Option<Event> {
        match self.world.apply(cmd, Utc::now()) {
            Ok(event) => {
                debug!(
                    id = %event.task_id(),
                    revision = event.revision(),
                    "applied {}",
                    event_name(&event)
                );
                self.save();
                Some(event)
            }
            Err(e) => {
                debug!(error = ?e, "command ignored");
                None
            }
        }
    }

    /// Overwrite the stored collection. Skipped until the initial load is done.
    fn save(&self) {
        if !self.ready {
            debug!("not loaded yet, save skipped");
            return;
        }

        let result = encode_tasks(&self.world.tasks)
            .and_then(|blob| self.store.write(COLLECTION_KEY, &blob));
        if let Err(e) = result {
            warn!(error = %e, "failed to save todos, keeping in-memory state");
        }
    }
}

fn event_name(event: &Event) -> &'static str {
    match event {
        Event::TaskAdded { .. } => "add",
        Event::TaskUpdated { .. } => "update",
        Event::TaskToggled { .. } => "toggle",
        Event::TaskDeleted { .. } => "delete",
    }
}

// ── Tests ──────────────────────────────────────────────────────
