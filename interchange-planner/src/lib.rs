//! Interchange planner for multi-modal public transport.
//!
//! Precomputes how many vehicle changes separate every pair of routes, then
//! uses that matrix to answer change-count queries between locations and to
//! order a depth-first journey search over the transport network graph.

pub mod availability;
pub mod cache;
pub mod config;
pub mod domain;
pub mod graph;
pub mod routes;
pub mod snapshot;
pub mod transport;
pub mod traverse;
pub mod walkable;
