//! Brightfold - marketing site backend and admin console
//!
//! This library provides the core functionality for the Brightfold
//! backend: blog, service offerings, contact intake, gallery, view
//! analytics, and AI-assisted content drafting.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
