
//---------------------------------------
pub mod world;
pub mod manager;
pub mod filter;

pub use world::{EditForm, NewTask, Priority, Task, TaskPatch};
pub use manager::TodoManager;
pub use filter::{apply_filters, compute_statistics, compute_statistics_at, FilterSpec, Statistics};
//---------------------------------------

//---------------------------------------
pub mod persist;

pub use persist::{DurableStore, MemoryStore, SaveFile, StoreError, COLLECTION_KEY};
//---------------------------------------

//---------------------------------------
pub mod settings;
pub mod api;
//---------------------------------------
