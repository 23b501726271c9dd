//! Repository layer for database persistence.
//!
//! All database access uses Diesel with the SQLite backend, driven through
//! diesel-async so callers never block the runtime.

pub mod context;
pub mod document;
pub mod entity;
pub mod models;
pub mod pool;
pub mod suggestion;
pub mod util;

pub use context::DbContext;
pub use document::DocumentRepository;
pub use entity::EntityRepository;
pub use pool::{AsyncSqlitePool, DieselError};
pub use suggestion::SuggestionRepository;
