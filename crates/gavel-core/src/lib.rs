// Library root: the auction data model, the session state machine and the
// startup plumbing (config, fixtures) shared by front ends and tests.

pub mod auction;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod guard;
pub mod model;
pub mod money;
pub mod query;
