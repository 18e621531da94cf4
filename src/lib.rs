//! reportes-gps: geotagged incident reports with embedded photos.
//!
//! The HTTP service (`web`) and the offline admin tool (`admin`) are two
//! independent write paths over the same SQLite store (`storage`).

pub mod admin;
pub mod config;
pub mod error;
pub mod logging;
pub mod storage;
pub mod web;
