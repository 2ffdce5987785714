//! # Text Analyzer
//!
//! A small HTTP service that computes text statistics and keeps a
//! best-effort history of results in a table store.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │     HTTP     │──▶│   Analyzer   │──▶│ Table store  │
//! │ /TextAnalyzer│   │ pure metrics │   │ SQLite / mem │
//! └──────────────┘   └──────────────┘   └──────┬───────┘
//!                                              │
//!                    ┌─────────────────────────┘
//!                    ▼
//!            ┌───────────────────┐
//!            │       HTTP        │
//!            │/GetAnalysisHistory│
//!            └───────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export TABLES_CONNECTION_STRING=sqlite:./data/analyzer.sqlite
//! text-analyzer init                        # create the table
//! text-analyzer serve                       # start the HTTP server
//! curl 'http://127.0.0.1:7071/TextAnalyzer?text=Hello%20world.'
//! curl 'http://127.0.0.1:7071/GetAnalysisHistory?limit=5'
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`analyze`] | Text metrics and record assembly |
//! | [`history`] | Reading stored records back |
//! | [`store`] | Table store trait and backends |
//! | [`server`] | HTTP endpoints |
//! | [`config`] | TOML + environment configuration |
//! | [`models`] | Core data types |
//! | [`error`] | Typed errors |
//! | [`db`] | SQLite connection |

pub mod analyze;
pub mod config;
pub mod db;
pub mod error;
pub mod history;
pub mod models;
pub mod server;
pub mod store;
