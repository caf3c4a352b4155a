//! Core value types for FreeD ingest.
//!
//! ## Architecture
//!
//! - [`Sample`] is one decoded D1 frame, small and `Copy`
//! - [`Endpoint`] names the transport a receiver listens on
//! - [`Transform`] is the position + orientation handed to a sink
//! - [`SubjectId`] and [`SubjectRole`] name what a sink receives
//!
//! ## Usage Example
//!
//! ```rust
//! use freed_link::types::{Endpoint, SubjectId};
//!
//! let endpoint: Endpoint = "239.0.0.1:6301".parse().unwrap();
//! assert!(endpoint.is_multicast());
//!
//! let subject = SubjectId::new(7, &endpoint);
//! assert_eq!(subject.as_str(), "7@239.0.0.1:6301");
//! ```

mod endpoint;
mod sample;
mod subject;
mod transform;

pub use endpoint::Endpoint;
pub use sample::Sample;
pub use subject::{SubjectId, SubjectRole};
pub use transform::Transform;
