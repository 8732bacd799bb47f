//! Video feedback server library.
//!
//! Students upload videos, supervisors score and annotate them, admins
//! manage users and challenges. This crate holds the HTTP surface, the
//! session and authorization layer, persistence, the upload broker and the
//! chat provider bridge.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
