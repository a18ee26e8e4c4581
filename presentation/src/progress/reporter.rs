//! Progress reporting for planning runs

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use planner_application::PlanningProgressNotifier;
use planner_domain::{IterationRecord, OrchestratorState, PlanResult, Verdict};
use std::sync::Mutex;

/// Reports progress with one indicatif bar per phase
pub struct ProgressReporter {
    multi: MultiProgress,
    phase_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            phase_bar: Mutex::new(None),
        }
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn sample_mark(verdict: Option<Verdict>) -> String {
        match verdict {
            Some(Verdict::Correct) => format!("{}", "v correct".green()),
            Some(Verdict::Wrong) => format!("{}", "x wrong".red()),
            Some(Verdict::GoalNotReached) => format!("{}", "~ goal not reached".yellow()),
            None => format!("{}", "! failed".red()),
        }
    }

    fn println(&self, line: String) {
        if self.multi.println(&line).is_err() {
            eprintln!("{}", line);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanningProgressNotifier for ProgressReporter {
    fn on_iteration_start(&self, iteration: usize, max_iterations: usize) {
        self.println(format!(
            "{} {}",
            "->".cyan(),
            format!("Iteration {}/{}", iteration, max_iterations).bold()
        ));
    }

    fn on_phase_start(&self, state: OrchestratorState, total_tasks: usize) {
        let pb = self.multi.add(ProgressBar::new(total_tasks as u64));
        pb.set_style(Self::phase_style());
        pb.set_prefix(state.display_name().to_string());
        pb.set_message("Starting...");

        if let Ok(mut slot) = self.phase_bar.lock() {
            *slot = Some(pb);
        }
    }

    fn on_sample_complete(&self, _sample_index: usize, verdict: Option<Verdict>) {
        if let Ok(slot) = self.phase_bar.lock()
            && let Some(pb) = slot.as_ref()
        {
            pb.set_message(Self::sample_mark(verdict));
            pb.inc(1);
        }
    }

    fn on_phase_complete(&self, state: OrchestratorState) {
        let Ok(mut slot) = self.phase_bar.lock() else {
            return;
        };
        if let Some(pb) = slot.take() {
            if let Some(len) = pb.length() {
                pb.set_position(len);
            }
            pb.finish_with_message(format!("{} complete", state.display_name().green()));
        }
    }

    fn on_iteration_complete(&self, record: &IterationRecord) {
        let vote = &record.vote_result;
        let marker = if vote.is_low_confidence {
            " (low confidence)".yellow().to_string()
        } else {
            String::new()
        };
        self.println(format!(
            "   {} {} {:.0}%{}",
            vote.majority_verdict.display_name().bold(),
            vote.vote_summary(),
            vote.confidence * 100.0,
            marker
        ));
    }

    fn on_run_complete(&self, result: &PlanResult) {
        self.println(format!(
            "{} {} after {} iteration(s)",
            "=>".cyan(),
            result.status.as_str().to_uppercase().bold(),
            result.iterations
        ));
    }
}

/// Simple text-based progress (no fancy UI), written to stderr
pub struct SimpleProgress;

impl PlanningProgressNotifier for SimpleProgress {
    fn on_iteration_start(&self, iteration: usize, max_iterations: usize) {
        eprintln!(
            "{} {}",
            "->".cyan(),
            format!("Iteration {}/{}", iteration, max_iterations).bold()
        );
    }

    fn on_phase_start(&self, state: OrchestratorState, total_tasks: usize) {
        eprintln!("  {} ({} calls)", state.display_name().bold(), total_tasks);
    }

    fn on_sample_complete(&self, sample_index: usize, verdict: Option<Verdict>) {
        eprintln!(
            "    sample {}: {}",
            sample_index + 1,
            ProgressReporter::sample_mark(verdict)
        );
    }

    fn on_phase_complete(&self, _state: OrchestratorState) {}

    fn on_iteration_complete(&self, record: &IterationRecord) {
        eprintln!(
            "  {} {} {:.0}%",
            record.vote_result.majority_verdict.display_name().bold(),
            record.vote_result.vote_summary(),
            record.vote_result.confidence * 100.0
        );
    }
}
