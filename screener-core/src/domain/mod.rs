//! Core domain types
//!
//! This module contains the structures the client reasons about: the
//! opaque task handle the backend issues, the classified status of a task,
//! and the named job kinds a user can trigger.

pub mod job;
pub mod task;
