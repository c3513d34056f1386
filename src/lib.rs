//! Facteur is a La Poste shipment tracking client with an optional relay server.
//!
//! It queries the La Poste "suivi" API for one or more tracking numbers,
//! normalizes the heterogeneous payload, and renders a stable, sorted,
//! human-readable report on the terminal. The relay mode runs a small
//! Axum server that holds the real API key on behalf of anonymous
//! callers, hiding both the credential and the caller's IP, with a
//! fixed-window rate limit per client address.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (track, serve).
//! - [`client`] -- HTTP tracking client: endpoint resolution, direct and
//!   relay request modes, and the upstream non-JSON quirk handling.
//! - [`model`] -- Serde model of the upstream payload and the
//!   single-vs-array boundary resolution into per-identifier results.
//! - [`codes`] -- Static event-code, holder, and delivery-choice tables.
//! - [`output`] -- Presentation formatter: per-identifier text blocks.
//! - [`relay`] -- Relay request handler and the per-address rate limiter.
//! - [`server`] -- Axum server setup, shared application state, and
//!   graceful shutdown.
//! - [`health`] -- `GET /health` endpoint handler returning runtime
//!   diagnostics.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print
//!   output for the relay, and a quiet stderr subscriber for the CLI.

// Binary crate — public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod client;
pub mod cmd;
pub mod codes;
pub mod error;
pub mod health;
pub mod logging;
pub mod model;
pub mod output;
pub mod relay;
pub mod server;
