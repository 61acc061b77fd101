//! Pokedex explorer - generation-scoped Pokedex browser built on tui-dispatch
//!
//! The library exposes the explorer's modules for the binary and for tests.

pub mod action;
pub mod api;
pub mod catalog;
pub mod config;
pub mod effect;
pub mod evolution;
pub mod generation;
pub mod navigator;
pub mod reducer;
pub mod resolver;
pub mod state;
pub mod types;
pub mod ui;
