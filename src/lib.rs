// Library root
// -----------
// The binary (`main.rs`) wires these modules into an interactive CLI.
//
// Module responsibilities:
// - `api`: blocking client for the hh.ru vacancy and employer searches.
// - `db`: SQLite record store with the fixed analytical queries.
// - `files`: JSON-array file sink for raw API records.
// - `models`: typed views over raw vacancy/employer records.
// - `config`, `logging`, `error`: settings, logger setup, error types.
// - `ui`: the `dialoguer` menu that dispatches to everything above.
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod files;
pub mod logging;
pub mod models;
pub mod ui;
