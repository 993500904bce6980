pub mod fixtures;
pub mod server;

pub use server::{AppState, RunningStub, StubConfig, router, run, spawn, test_routes};
