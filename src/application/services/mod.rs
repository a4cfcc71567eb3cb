//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, CommandRunner,
//! ConfirmationPrompt) but are themselves concrete structs, not traits.

mod build;
mod init;
mod serve;

pub use build::BuildService;
pub use init::InitService;
pub use serve::{build_and_serve, Canceller, ServeExit, ServeHandle, ServeService, Sink};
