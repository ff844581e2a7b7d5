//! Payroll Computation Engine for Multi-Clinic Dental Practices
//!
//! This crate computes monthly payslips from salary profiles and attendance:
//! day-equivalent attendance counting, base salary and over-standard bonus,
//! overtime, late penalties, allowance and insurance ledgers, family relief
//! and progressive income tax. Computed payslips live in salary cycles that
//! can be finalized to lock them against further edits.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod payroll;
