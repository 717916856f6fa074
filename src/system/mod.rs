//! # System Interaction Layer
//!
//! Everything that leaves the process: the version manager boundary and the
//! shell it is driven through.
//!
//! ## Modules
//!
//! - **`executor`**: Runs scripts through `bash -c`, answers interactive prompts
//!   with "no", captures the combined output and strips its colour codes.
//! - **`version_manager`**: The `VersionManager` trait the engine depends on, its
//!   error type and, under test, an in-memory fake.
//! - **`sdkman`**: The SDKMAN! implementation of `VersionManager`.
//! - **`jdk_scanner`**: Finds JDKs installed outside of SDKMAN!.

pub mod executor;
pub mod jdk_scanner;
pub mod sdkman;
pub mod version_manager;
