//! Structural compatibility checking of JVM APIs
//!
//! A required API (captured earlier, eg. from a signature file) is compared class by class against
//! a found API (the implementation under test). Both sides are only ever seen as
//! [`model::ClassDescription`]s handed out by a [`hierarchy::ClassDescriptionLoader`], so where the
//! descriptions come from is up to the caller.

pub mod check;
pub mod erasure;
pub mod errors;
pub mod hierarchy;
pub mod model;
pub mod report;
pub mod settings;

pub use check::{RunOutcome, SignatureChecker};
pub use errors::Error;
pub use settings::Settings;
