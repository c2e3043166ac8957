// Library root
// -----------
// This crate exposes the pieces of the `try-sentiment` CLI as a library.
// The binary (`main.rs`) parses arguments, connects an `ApiClient` and hands
// it to `pipeline::run`.
//
// Module responsibilities:
// - `api`: JSON-RPC calls to the Saplo API and the `SaploApi` trait the
//   stages are written against.
// - `collection`, `ingest`, `predict`, `output`: the four stages of a run.
// - `pipeline`: runs the stages in order and reports which one failed.
// - `cli`, `config`: command line parsing into an immutable `Config`.
// - `model`: collections, texts and predicted values.
// - `logging`, `progress`: terminal output.
pub mod api;
pub mod cli;
pub mod collection;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod predict;
pub mod progress;
