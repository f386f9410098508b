//! Process-backed implementations of the core seams.
//!
//! - [`PlaybookRunner`]: runs the automation binary, tees output to a run log, stages the vault password.
//! - [`GitRepoSync`]: clones or fast-forwards the playbook repository with the `git` CLI.

mod error;
pub use error::{ExecError, ExecResult};

pub mod git;
pub use git::GitRepoSync;

pub mod proc;
pub use proc::{Invocation, PlaybookRunner};

mod util;

pub mod prelude {
    pub use crate::error::{ExecError, ExecResult};
    pub use crate::{GitRepoSync, PlaybookRunner};
}
