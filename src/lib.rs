//! Progress and compliance rules engine for medical residency training
//!
//! This crate computes a trainee's progress against a specialization
//! program's requirement template, validates duty shifts and internship
//! ordering, and produces compliance reports, quality metrics and
//! examination readiness checks from already loaded training records.

#![warn(missing_docs)]

pub mod calculation;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod records;
pub mod service;
