// Service contracts for the contest platform backend.
//
// The engines never talk to the network directly: everything goes through
// the `ContestApi` trait so tests can substitute an in-memory fake.

pub mod client;
pub mod types;

pub use client::{ApiError, ContestApi, HttpApi};
