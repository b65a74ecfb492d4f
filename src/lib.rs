//! thermoview: terminal dashboard for thermal capture datasets.
//!
//! Polls a backend for per-dataset temperature summaries and detail
//! matrices, keeps a dataset cursor consistent with the changing dataset
//! count, and renders charts through a pluggable [`render::RenderSink`].

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod navigator;
pub mod render;
pub mod web;
