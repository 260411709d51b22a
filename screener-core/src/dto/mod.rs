//! Data Transfer Objects for the backend task API
//!
//! DTOs mirror the JSON the backend sends and receives. They are kept
//! separate from the domain types so that wire quirks (field aliases,
//! optional fields, raw state names) never leak into the poller.

pub mod task;
