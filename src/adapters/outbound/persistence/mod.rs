mod in_memory_repository;
mod sql;

pub use in_memory_repository::InMemoryRepository;
pub use sql::SqlRepository;
