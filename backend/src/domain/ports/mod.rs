//! Domain ports and supporting types for the hexagonal boundary.

mod session_repository;
mod task_repository;
mod user_repository;

#[cfg(test)]
pub use session_repository::MockSessionRepository;
pub use session_repository::{MemorySessionRepository, SessionRepository, SessionRepositoryError};
#[cfg(test)]
pub use task_repository::MockTaskRepository;
pub use task_repository::{MemoryTaskRepository, TaskRepository, TaskRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{MemoryUserRepository, UserRepository, UserRepositoryError};
