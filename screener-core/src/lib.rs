//! Screener Core
//!
//! Core types shared by the screener client and CLI.
//!
//! This crate contains:
//! - Domain types: task handles, task statuses and job kinds
//! - DTOs: wire payloads exchanged with the backend task API

pub mod domain;
pub mod dto;
