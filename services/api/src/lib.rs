//! services/api/src/lib.rs
//!
//! The HTTP service for personal calendar events with optional public sharing.

pub mod adapters;
pub mod config;
pub mod error;
pub mod services;
pub mod web;
