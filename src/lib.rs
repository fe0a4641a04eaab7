//! Member, group and job lineups for volunteer-style rosters.
//!
//! Keeps a set of members, the groups they belong to, and the jobs they can
//! be assigned to, then fills each job with members up to its minimum
//! staffing while spreading the work evenly.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Member`, `Group`, `Job`, `Lineup`,
//!   `Roster`, and their typed ids
//! - **`scheduler`**: The greedy `LineupScheduler` and `StaffingReport`
//! - **`notify`**: Per-entity property change notification
//! - **`validation`**: Integrity checks (duplicate IDs, dangling references,
//!   inverted bounds, overlapping job sets)
//! - **`error`**: Errors returned by lineup operations
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use u_roster::models::Lineup;
//! use u_roster::validation::validate_lineup;
//!
//! let mut lineup = Lineup::new();
//! let ann = lineup.create_member("Ann", "Lee", false);
//! let bob = lineup.create_member("Bob", "Ray", false);
//! let band = lineup.create_group("Band");
//! lineup.add_to_group(band, ann).unwrap();
//! lineup.add_to_group(band, bob).unwrap();
//!
//! let job = lineup.create_job(Utc::now(), "Stage");
//! lineup.job_mut(job).unwrap().set_min_subscriber_count(2);
//! lineup.job_mut(job).unwrap().set_max_subscriber_count(2);
//! lineup.offer(job, ann).unwrap();
//! lineup.offer(job, bob).unwrap();
//!
//! lineup.create_lineup();
//! assert_eq!(lineup.job(job).unwrap().subscribers().len(), 2);
//! assert!(validate_lineup(&lineup).is_ok());
//! ```

pub mod error;
pub mod models;
pub mod notify;
pub mod scheduler;
pub mod validation;

pub use error::LineupError;
