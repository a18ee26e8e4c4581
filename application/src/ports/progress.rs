//! Progress notification port
//!
//! Defines the interface for reporting progress during a planning run.
//! This is also the streaming surface: every completed [`IterationRecord`]
//! is handed to [`PlanningProgressNotifier::on_iteration_complete`] as soon
//! as its vote is known.

use planner_domain::{IterationRecord, OrchestratorState, PlanCandidate, PlanResult, Verdict};

/// Callback for progress updates during a planning run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, progress bars, event streams).
pub trait PlanningProgressNotifier: Send + Sync {
    /// Called when an iteration starts (1-indexed)
    fn on_iteration_start(&self, iteration: usize, max_iterations: usize);

    /// Called when a phase starts; `total_tasks` is the number of provider calls
    fn on_phase_start(&self, state: OrchestratorState, total_tasks: usize);

    /// Called when one critique sample finishes; `None` means the call failed
    fn on_sample_complete(&self, sample_index: usize, verdict: Option<Verdict>);

    /// Called when a phase completes
    fn on_phase_complete(&self, state: OrchestratorState);

    /// Called with the generated plan of the current iteration
    fn on_plan_generated(&self, _iteration: usize, _plan: &PlanCandidate) {}

    /// Called once per completed iteration, in order
    fn on_iteration_complete(&self, _record: &IterationRecord) {}

    /// Called once with the terminal result
    fn on_run_complete(&self, _result: &PlanResult) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl PlanningProgressNotifier for NoProgress {
    fn on_iteration_start(&self, _iteration: usize, _max_iterations: usize) {}
    fn on_phase_start(&self, _state: OrchestratorState, _total_tasks: usize) {}
    fn on_sample_complete(&self, _sample_index: usize, _verdict: Option<Verdict>) {}
    fn on_phase_complete(&self, _state: OrchestratorState) {}
}
