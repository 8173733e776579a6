//! Listings site for a real-estate agency: catalogue browsing, favorites and
//! comparison, contact fan-out and a small admin console.

pub mod admin;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod mortgage;
pub mod notify;
pub mod repository;
pub mod search;
pub mod state;
pub mod uploads;
