pub mod api;
pub mod board;
pub mod config;
pub mod consts;
pub mod core_types;
pub mod error;
pub mod evolution;
pub mod search;
pub mod solver;
pub mod verifier;
// cmd and reports belong to the binary (see main.rs).
