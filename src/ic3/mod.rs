// src/ic3/mod.rs
pub mod client;
pub mod models;

pub use client::Ic3Client;
pub use models::ReportRequest;
