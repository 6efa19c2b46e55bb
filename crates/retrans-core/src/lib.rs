//! Core domain types for the Retrans transmission tracker, plus the
//! [`store::ComplianceStore`] trait that storage backends implement.
//!
//! Deliberately free of HTTP and database dependencies; everything here is
//! plain data, pure scheduling logic, and the store abstraction.

pub mod affiliate;
pub mod error;
pub mod program;
pub mod record;
pub mod reference;
pub mod schedule;
pub mod status;
pub mod store;

pub use error::{Classify, Error, ErrorClass, Result};
