//! Qogita Deals Export
//!
//! Logs in to the Qogita wholesale API, pages through every variant currently
//! on deal and writes their GTINs to a CSV file.

pub mod config;
pub mod export;
pub mod qogita;
