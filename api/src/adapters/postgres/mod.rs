//! PostgreSQL adapters
//!
//! Implementations of repository traits using SeaORM and PostgreSQL.

pub mod order_repo;


pub use order_repo::PostgresOrderRepository;
