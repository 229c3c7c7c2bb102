//! # Pickup Core Library
//!
//! Per-student weekly pickup schedules, date specific exceptions and free
//! text day notes, resolved into one effective pickup time per student and
//! date.
//!
//! ## Core Modules
//!
//! - [`db`]: Database connection and migration management
//! - [`models`]: Entities, requests and transfer objects
//! - [`repository`]: Data access layer with Repository pattern
//! - [`resolution`]: Effective pickup time engine (exception > schedule > none)
//! - [`access`]: Caller identity, bulk authorization filter and full access guard
//! - [`service`]: Validated, access checked operations for callers
//! - [`validation`]: Request rules and limits
//! - [`timefmt`]: `HH:MM` and `YYYY-MM-DD` encoding
//! - [`error`]: Error taxonomy
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pickup_core::{
//!     access::IdentityProvider, db, repository::SqliteRepository, service,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = db::establish_connection("pickup.db").await?;
//!     let repo = SqliteRepository::new(pool);
//!
//!     let caller = repo.resolve_caller("frau.meier").await?;
//!     let today = service::bulk_effective_pickup_times(&repo, &caller, &[1, 2, 3], None).await?;
//!     for entry in today {
//!         println!("{} {:?}", entry.student_id, entry.pickup_time);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod access;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod resolution;
pub mod service;
pub mod timefmt;
pub mod validation;
