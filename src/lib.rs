pub mod config;
pub mod controller;
pub mod deriv;
pub mod digit;
pub mod error;
pub mod event;
pub mod input;
pub mod model;
pub mod predictor;
pub mod runtime;
pub mod settlement;
pub mod snapshot;
pub mod stats_store;
pub mod stream_client;
pub mod symbol_catalog;
pub mod tick_buffer;
pub mod ui;
