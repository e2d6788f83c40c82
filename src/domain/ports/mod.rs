//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that infrastructure adapters must implement:
//! - TaskRepository: owner-filtered task persistence
//! - UserRepository: account persistence
//! - CacheStore: expiring key-value cache in front of the task store
//!
//! These traits define the contracts that allow the domain to be independent
//! of specific infrastructure implementations.

pub mod cache_store;
pub mod task_repository;
pub mod user_repository;

pub use cache_store::CacheStore;
pub use task_repository::TaskRepository;
pub use user_repository::UserRepository;
