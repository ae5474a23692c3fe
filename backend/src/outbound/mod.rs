//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: in-process repositories for database-less runs and tests
//!
//! Adapters are thin translators between domain types and storage
//! representations. Business rules live in the domain services.

pub mod memory;
pub mod persistence;
