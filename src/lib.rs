// Library root
// -----------
// The two binaries (`whisperer` and `whisperer-dbcheck`) are thin wrappers
// around these modules.
//
// Module responsibilities:
// - `store`: the SQLite user registry (schema, registration, lookups).
// - `api`: the blocking client for the quotes service.
// - `ui`: the interactive register/login/quote loop.
// - `report`: the read-only table and user listing.
// - `config`, `error`, `logging`: environment, error types, tracing setup.
pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod report;
pub mod store;
pub mod ui;
