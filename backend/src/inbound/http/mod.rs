//! HTTP inbound adapter exposing the storefront REST endpoints.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod dto;
pub mod envelope;
pub mod error;
pub mod health;
pub mod orders;
pub mod payments;
pub mod products;
pub mod routes;
pub mod signature;
pub mod state;
#[cfg(test)]
mod test_utils;
pub(crate) mod validation;

pub use crate::domain::ApiResult;
