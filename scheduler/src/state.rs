/// Scheduler lifecycle (spec §4.8). `Idle` is the state at construction;
/// `WaitingFirstEpoch` covers the initial epoch read and optional startup
/// backoff; `Running` is the steady-state commit ticker loop; `Stopped` is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    WaitingFirstEpoch,
    Running,
    Stopped,
}
