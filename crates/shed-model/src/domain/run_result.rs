use std::time::Duration;

/// Outcome of one playbook invocation.
///
/// Produced once per cycle and handed to the output parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunResult {
    /// Process exit code; a run killed by signal `N` reports `-N`.
    pub returncode: i32,
    /// Combined stdout/stderr in arrival order.
    pub output: String,
    /// Wall-clock time between spawn and exit.
    pub duration: Duration,
}

impl RunResult {
    #[inline]
    pub fn success(&self) -> bool {
        self.returncode == 0
    }
}
