/// Progress records, day keys and the grade rule
pub mod model;
/// Repository trait and its JSON file / in-memory implementations
pub mod store;

pub use model::{DayKey, DayRecord, ProgressDb, StudentRecord, UnitResult};
pub use store::{JsonFileStore, MemoryStore, ProgressRepository, StoreError};
