//! elm-emaki: scaffold and serve Elm emaki (slide) projects.
//!
//! `init` writes a starter Elm project without clobbering files the operator
//! changed; `serve` compiles it with the Elm compiler and runs a static file
//! server over the output.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
