// Library root: re-exports all modules so integration tests and the binary
// share one event loop.

pub mod app;
pub mod console;
pub mod protocol;
