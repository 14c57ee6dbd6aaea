//! Lapse run orchestration
//!
//! Checks the external dependencies, annotates the source images into a
//! scratch folder, encodes them and always removes the scratch folder again.

pub mod env_file;
pub mod logging;
pub mod run;

pub use run::{
    check_dependencies, run, AnnotationProgress, Dependencies, ErrorKind, RunError, RunReport,
    TempDirGuard,
};
