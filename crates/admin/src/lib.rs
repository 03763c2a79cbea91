//! Tech Store Admin library.
//!
//! Product management for the catalog the storefront serves, exposed as a
//! library so it can be tested and reused by the CLI.
//!
//! # Security
//!
//! This crate holds HIGH PRIVILEGE access:
//! - Read/write access to the `products` table
//! - The object storage service key
//! - The storefront revalidation token

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
