//! Run Self-Critique use case
//!
//! Drives the generate → critique → vote → (accept | revise) planning loop.
//!
//! ```text
//! ┌────────────┐   plan   ┌─────────────┐  N critiques  ┌──────────┐
//! │ GENERATING │ ───────▶ │ CRITIQUING  │ ────────────▶ │ DECIDING │
//! └────────────┘          └─────────────┘   (parallel)  └──────────┘
//!       ▲                                                   │
//!       └────────── revision note (majority ≠ CORRECT) ─────┤
//!                                                           ▼
//!                                     DONE (valid | max_iterations | failed | cancelled)
//! ```
//!
//! Iterations are strictly sequential. Within one iteration the critique
//! samples run concurrently on a [`JoinSet`]; their results are put back
//! into submission order before voting so tie-breaks stay reproducible.

use crate::config::PlanningParams;
use crate::ports::completion_provider::{CompletionProvider, ProviderError};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::progress::{NoProgress, PlanningProgressNotifier};
use planner_domain::{
    CompletionRequest, CompletionResponse, CritiqueResult, IterationRecord, OrchestratorState,
    LOW_CONFIDENCE_THRESHOLD, PlanCandidate, PlanResult, PlanningError, PlanningPrompts,
    TokenUsage, aggregate_votes_with_threshold, parse_critique_response,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Input for the RunSelfCritique use case
#[derive(Debug, Clone)]
pub struct RunSelfCritiqueInput {
    /// Formal domain description (opaque to the planner)
    pub domain_description: String,
    /// Problem description (opaque to the planner)
    pub problem_description: String,
    /// Loop control parameters
    pub params: PlanningParams,
}

impl RunSelfCritiqueInput {
    pub fn new(domain_description: impl Into<String>, problem_description: impl Into<String>) -> Self {
        Self {
            domain_description: domain_description.into(),
            problem_description: problem_description.into(),
            params: PlanningParams::default(),
        }
    }

    pub fn with_params(mut self, params: PlanningParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.params.max_iterations = max;
        self
    }

    pub fn with_samples_per_iteration(mut self, samples: usize) -> Self {
        self.params.samples_per_iteration = samples;
        self
    }
}

/// Successful critiques of one iteration, in submission order.
struct CritiqueBatch {
    critiques: Vec<CritiqueResult>,
    failed: usize,
}

/// Use case for running the self-critique planning loop
pub struct RunSelfCritiqueUseCase {
    provider: Arc<dyn CompletionProvider>,
    prompts: PlanningPrompts,
    conversation_logger: Arc<dyn ConversationLogger>,
    cancellation_token: Option<CancellationToken>,
}

impl RunSelfCritiqueUseCase {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            prompts: PlanningPrompts::default(),
            conversation_logger: Arc::new(NoConversationLogger),
            cancellation_token: None,
        }
    }

    /// Replace the prompt templates (e.g., with test fixtures)
    pub fn with_prompts(mut self, prompts: PlanningPrompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Abort the run (and any in-flight calls) when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Plan with explicit iteration and sample counts, default parameters otherwise
    pub async fn run(
        &self,
        domain_description: &str,
        problem_description: &str,
        max_iterations: usize,
        samples_per_iteration: usize,
    ) -> PlanResult {
        let input = RunSelfCritiqueInput::new(domain_description, problem_description)
            .with_max_iterations(max_iterations)
            .with_samples_per_iteration(samples_per_iteration);
        self.execute(input).await
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: RunSelfCritiqueInput) -> PlanResult {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    ///
    /// Never returns an error: failures and cancellation are terminal
    /// statuses of the returned [`PlanResult`].
    pub async fn execute_with_progress(
        &self,
        input: RunSelfCritiqueInput,
        progress: &dyn PlanningProgressNotifier,
    ) -> PlanResult {
        let params = &input.params;
        if let Err(e) = params.validate() {
            warn!("Invalid planning parameters ({}), clamping to usable values", e);
        }
        let max_iterations = params.max_iterations.max(1);
        let samples = params.samples_per_iteration.max(1);
        let min_successful = params.min_successful_samples.clamp(1, samples);
        let threshold = if params.low_confidence_threshold > 0.0
            && params.low_confidence_threshold <= 1.0
        {
            params.low_confidence_threshold
        } else {
            LOW_CONFIDENCE_THRESHOLD
        };

        info!(
            "Starting self-critique planning: max {} iterations, {} samples per iteration",
            max_iterations, samples
        );

        let mut history: Vec<IterationRecord> = Vec::new();
        let mut critique_history = String::new();
        let mut usage = TokenUsage::default();
        let mut iteration = 0;

        loop {
            iteration += 1;

            if self.is_cancelled() {
                let result = PlanResult::cancelled(None, history).with_usage(usage);
                return self.finish(result, progress);
            }

            info!("Iteration {}/{}", iteration, max_iterations);
            progress.on_iteration_start(iteration, max_iterations);

            // GENERATING
            let plan = match self
                .generate_plan(&input, iteration, &critique_history, progress, &mut usage)
                .await
            {
                Ok(plan) => plan,
                Err(e) => {
                    let result = PlanResult::failed(e, None, history).with_usage(usage);
                    return self.finish(result, progress);
                }
            };
            progress.on_plan_generated(iteration, &plan);

            // CRITIQUING
            let batch = match self
                .run_critiques(&input, iteration, &plan, samples, progress, &mut usage)
                .await
            {
                Ok(batch) => batch,
                Err(e) => {
                    let result = PlanResult::failed(e, Some(plan), history).with_usage(usage);
                    return self.finish(result, progress);
                }
            };

            if batch.critiques.len() < min_successful {
                warn!(
                    "Only {} of {} critique samples succeeded (minimum {})",
                    batch.critiques.len(),
                    samples,
                    min_successful
                );
                let error = PlanningError::InsufficientVotes {
                    requested: samples,
                    succeeded: batch.critiques.len(),
                    minimum: min_successful,
                };
                let result = PlanResult::failed(error, Some(plan), history).with_usage(usage);
                return self.finish(result, progress);
            }

            // DECIDING
            progress.on_phase_start(OrchestratorState::Deciding, 1);
            let vote = match aggregate_votes_with_threshold(&batch.critiques, threshold) {
                    Ok(vote) => vote,
                    Err(e) => {
                        warn!("Vote aggregation failed: {}", e);
                        let error = PlanningError::InsufficientVotes {
                            requested: samples,
                            succeeded: 0,
                            minimum: min_successful,
                        };
                        let result = PlanResult::failed(error, Some(plan), history).with_usage(usage);
                        return self.finish(result, progress);
                    }
                };
            progress.on_phase_complete(OrchestratorState::Deciding);

            info!(
                "Iteration {} vote: {} {} (confidence {:.2}{})",
                iteration,
                vote.majority_verdict,
                vote.vote_summary(),
                vote.confidence,
                if vote.is_low_confidence { ", low" } else { "" }
            );

            let verdict = vote.majority_verdict;
            let revision = self.prompts.revision_note(vote.error_reason());
            let record =
                IterationRecord::new(iteration, plan.clone(), vote).with_failed_samples(batch.failed);

            progress.on_iteration_complete(&record);
            self.log_event("iteration_complete", serde_json::to_value(&record).unwrap_or_default());
            history.push(record);

            if verdict.is_correct() {
                let result = PlanResult::valid(plan, history).with_usage(usage);
                return self.finish(result, progress);
            }

            if iteration >= max_iterations {
                let result = PlanResult::max_iterations(plan, verdict, history).with_usage(usage);
                return self.finish(result, progress);
            }

            debug!("Revising plan: {}", revision.trim());
            critique_history = revision;
        }
    }

    /// GENERATING: one completion call; the text is the plan, verbatim.
    async fn generate_plan(
        &self,
        input: &RunSelfCritiqueInput,
        iteration: usize,
        critique_history: &str,
        progress: &dyn PlanningProgressNotifier,
        usage: &mut TokenUsage,
    ) -> Result<PlanCandidate, PlanningError> {
        progress.on_phase_start(OrchestratorState::Generating, 1);

        let prompt = self.prompts.generation_prompt(
            &input.domain_description,
            &input.problem_description,
            critique_history,
        );
        let request = Self::build_request(prompt, input.params.generation_temperature, &input.params);

        let call = complete_with_timeout(
            Arc::clone(&self.provider),
            request.clone(),
            input.params.sample_timeout,
        );

        let result = match &self.cancellation_token {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        info!("Cancelled during plan generation");
                        return Err(PlanningError::Cancelled);
                    }
                    result = call => result,
                }
            }
            None => call.await,
        };

        progress.on_phase_complete(OrchestratorState::Generating);

        match result {
            Ok(response) => {
                *usage += response.usage;
                info!(
                    "Plan generated by {} in {}ms ({} bytes)",
                    self.provider.name(),
                    response.latency_ms,
                    response.text.len()
                );
                self.log_event(
                    "plan_generated",
                    json!({
                        "iteration": iteration,
                        "prompt": request.prompt,
                        "plan": response.text,
                        "latency_ms": response.latency_ms,
                    }),
                );
                Ok(PlanCandidate::new(response.text))
            }
            Err(e) => {
                warn!("Plan generation failed: {}", e);
                self.log_event(
                    "generation_failed",
                    json!({ "iteration": iteration, "error": e.to_string() }),
                );
                Err(PlanningError::GenerationFailed {
                    message: e.to_string(),
                })
            }
        }
    }

    /// CRITIQUING: fan out `samples` identical requests, fan in by index.
    ///
    /// Failed samples are dropped from the batch. Cancellation aborts every
    /// in-flight call and discards partial results.
    async fn run_critiques(
        &self,
        input: &RunSelfCritiqueInput,
        iteration: usize,
        plan: &PlanCandidate,
        samples: usize,
        progress: &dyn PlanningProgressNotifier,
        usage: &mut TokenUsage,
    ) -> Result<CritiqueBatch, PlanningError> {
        info!("Critiquing plan with {} samples", samples);
        progress.on_phase_start(OrchestratorState::Critiquing, samples);

        let prompt = self.prompts.critique_prompt(
            &input.domain_description,
            &input.problem_description,
            plan.text(),
        );
        let request = Self::build_request(prompt, input.params.critique_temperature, &input.params);

        let mut join_set = JoinSet::new();

        for index in 0..samples {
            let provider = Arc::clone(&self.provider);
            let request = request.clone();
            let timeout = input.params.sample_timeout;

            join_set.spawn(async move {
                let result = complete_with_timeout(provider, request, timeout).await;
                (index, result)
            });
        }

        let mut slots: Vec<Option<CritiqueResult>> = vec![None; samples];

        loop {
            let joined = if let Some(ref token) = self.cancellation_token {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        join_set.abort_all();
                        info!("Cancelled during critique fan-out");
                        return Err(PlanningError::Cancelled);
                    }
                    joined = join_set.join_next() => joined,
                }
            } else {
                join_set.join_next().await
            };

            let Some(joined) = joined else {
                break; // All samples complete
            };

            match joined {
                Ok((index, Ok(response))) => {
                    *usage += response.usage;
                    let critique = parse_critique_response(&response.text);
                    debug!(
                        "Critique sample {} verdict: {}{}",
                        index,
                        critique.verdict,
                        if critique.is_ambiguous { " (ambiguous)" } else { "" }
                    );
                    progress.on_sample_complete(index, Some(critique.verdict));
                    self.log_event(
                        "critique_sample",
                        json!({
                            "iteration": iteration,
                            "sample": index,
                            "verdict": critique.verdict,
                            "ambiguous": critique.is_ambiguous,
                            "error_reason": critique.error_reason,
                            "latency_ms": response.latency_ms,
                            "text": response.text,
                        }),
                    );
                    slots[index] = Some(critique);
                }
                Ok((index, Err(e))) => {
                    warn!("Critique sample {} failed: {}", index, e);
                    progress.on_sample_complete(index, None);
                    self.log_event(
                        "critique_failed",
                        json!({ "iteration": iteration, "sample": index, "error": e.to_string() }),
                    );
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                }
            }
        }

        progress.on_phase_complete(OrchestratorState::Critiquing);

        let critiques: Vec<CritiqueResult> = slots.into_iter().flatten().collect();
        let failed = samples - critiques.len();

        Ok(CritiqueBatch { critiques, failed })
    }

    fn build_request(prompt: String, temperature: f32, params: &PlanningParams) -> CompletionRequest {
        let request = CompletionRequest::new(prompt)
            .with_temperature(temperature)
            .with_max_tokens(params.max_tokens);
        match &params.model {
            Some(model) => request.with_model(model.clone()),
            None => request,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation_token
            .as_ref()
            .is_some_and(|t| t.is_cancelled())
    }

    fn log_event(&self, event_type: &'static str, payload: serde_json::Value) {
        self.conversation_logger
            .log(ConversationEvent::new(event_type, payload));
    }

    fn finish(&self, result: PlanResult, progress: &dyn PlanningProgressNotifier) -> PlanResult {
        match &result.error {
            Some(error) => warn!("Planning ended with status {}: {}", result.status, error),
            None => info!(
                "Planning finished with status {} after {} iteration(s)",
                result.status, result.iterations
            ),
        }

        progress.on_phase_complete(OrchestratorState::Done);
        progress.on_run_complete(&result);
        self.log_event(
            "run_complete",
            json!({
                "status": result.status,
                "iterations": result.iterations,
                "final_verdict": result.final_verdict,
                "error": result.error.as_ref().map(|e| e.to_string()),
                "input_tokens": result.usage.input_tokens,
                "output_tokens": result.usage.output_tokens,
            }),
        );
        result
    }
}

/// One provider call with an optional deadline.
async fn complete_with_timeout(
    provider: Arc<dyn CompletionProvider>,
    request: CompletionRequest,
    timeout: Option<Duration>,
) -> Result<CompletionResponse, ProviderError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, provider.complete(&request))
            .await
            .map_err(|_| ProviderError::Timeout)?,
        None => provider.complete(&request).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use planner_domain::{PlanStatus, Verdict};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // -- Scripted CompletionProvider -------------------------------------------

    type Scripted = Result<String, ProviderError>;

    /// Answers generation and critique prompts from two separate queues.
    ///
    /// Fixture prompts start with "GEN" or "CRIT", so the queue is chosen
    /// by prefix regardless of the order concurrent calls arrive in.
    #[derive(Default)]
    struct ScriptedProvider {
        plans: Mutex<VecDeque<Scripted>>,
        critiques: Mutex<VecDeque<Scripted>>,
        generation_prompts: Mutex<Vec<String>>,
        critique_calls: AtomicUsize,
        critique_delay: Option<Duration>,
    }

    impl ScriptedProvider {
        fn new() -> Self {
            Self::default()
        }

        fn plan(self, text: &str) -> Self {
            self.plans.lock().unwrap().push_back(Ok(text.to_string()));
            self
        }

        fn plan_error(self, error: ProviderError) -> Self {
            self.plans.lock().unwrap().push_back(Err(error));
            self
        }

        fn critiques(self, texts: &[&str]) -> Self {
            {
                let mut queue = self.critiques.lock().unwrap();
                for text in texts {
                    queue.push_back(Ok(text.to_string()));
                }
            }
            self
        }

        fn critique_errors(self, count: usize) -> Self {
            {
                let mut queue = self.critiques.lock().unwrap();
                for _ in 0..count {
                    queue.push_back(Err(ProviderError::ConnectionError("reset".to_string())));
                }
            }
            self
        }

        fn with_critique_delay(mut self, delay: Duration) -> Self {
            self.critique_delay = Some(delay);
            self
        }

        fn critique_calls(&self) -> usize {
            self.critique_calls.load(Ordering::SeqCst)
        }

        fn generation_prompts(&self) -> Vec<String> {
            self.generation_prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, ProviderError> {
            if request.prompt.starts_with("GEN") {
                self.generation_prompts
                    .lock()
                    .unwrap()
                    .push(request.prompt.clone());
                let next = self.plans.lock().unwrap().pop_front();
                return next
                    .unwrap_or_else(|| Err(ProviderError::Other("no scripted plan".to_string())))
                    .map(|text| CompletionResponse::new(text).with_usage(TokenUsage::new(10, 5)));
            }

            self.critique_calls.fetch_add(1, Ordering::SeqCst);
            let next = self.critiques.lock().unwrap().pop_front();
            if let Some(delay) = self.critique_delay {
                tokio::time::sleep(delay).await;
            }
            next.unwrap_or_else(|| Err(ProviderError::Other("no scripted critique".to_string())))
                .map(|text| CompletionResponse::new(text).with_usage(TokenUsage::new(20, 8)))
        }
    }

    fn fixture_prompts() -> PlanningPrompts {
        PlanningPrompts {
            generation: "GEN {domain} | {problem} | {critique_history}".to_string(),
            critique: "CRIT {plan}".to_string(),
            ..Default::default()
        }
    }

    fn use_case(provider: &Arc<ScriptedProvider>) -> RunSelfCritiqueUseCase {
        let provider: Arc<dyn CompletionProvider> = provider.clone();
        RunSelfCritiqueUseCase::new(provider).with_prompts(fixture_prompts())
    }

    const CORRECT: &str = "Step 1: pickup A ok\nStep 2: stack A B ok\nthe plan is correct";
    const WRONG: &str = "Step 1: PRECONDITION FAILED: (clear B) is false\nthe plan is wrong";

    // -- Scenario A: accepted on the first try ---------------------------------

    #[tokio::test]
    async fn test_plan_validates_on_first_try() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .plan("1. pickup A\n2. stack A B")
                .critiques(&[CORRECT; 5]),
        );

        let result = use_case(&provider).run("D", "P", 5, 5).await;

        assert_eq!(result.status, PlanStatus::Valid);
        assert_eq!(result.iterations, 1);
        assert_eq!(result.final_verdict, Some(Verdict::Correct));
        assert_eq!(result.plan, "1. pickup A\n2. stack A B");
        assert_eq!(result.iteration_history.len(), 1);
        assert_eq!(provider.critique_calls(), 5);
        assert!(result.error.is_none());
    }

    // -- Scenario B: rejected once, then accepted ------------------------------

    #[tokio::test]
    async fn test_plan_refines_after_critique() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .plan("1. stack A B")
                .critiques(&[WRONG, WRONG, CORRECT, WRONG, CORRECT])
                .plan("1. pickup A\n2. stack A B")
                .critiques(&[CORRECT; 5]),
        );

        let result = use_case(&provider).run("D", "P", 5, 5).await;

        assert_eq!(result.status, PlanStatus::Valid);
        assert_eq!(result.iterations, 2);
        assert_eq!(result.iteration_history.len(), 2);

        let first = &result.iteration_history[0].vote_result;
        assert_eq!(first.majority_verdict, Verdict::Wrong);
        assert!((first.confidence - 0.6).abs() < f64::EPSILON);
        assert!(first.is_low_confidence);
        assert_eq!(first.breakdown.wrong, 3);
        assert_eq!(first.breakdown.correct, 2);

        // The second generation prompt carries the first iteration's error
        let prompts = provider.generation_prompts();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0], "GEN D | P | ");
        assert!(prompts[1].contains(
            "Previous attempt failed with: PRECONDITION FAILED: (clear B) is false\nPlease fix this issue."
        ));
    }

    // -- Scenario C: iteration budget exhausted --------------------------------

    #[tokio::test]
    async fn test_max_iterations_reached() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .plan("p1")
                .critiques(&[WRONG; 5])
                .plan("p2")
                .critiques(&[WRONG; 5])
                .plan("p3")
                .critiques(&[WRONG; 5]),
        );

        let result = use_case(&provider).run("D", "P", 3, 5).await;

        assert_eq!(result.status, PlanStatus::MaxIterations);
        assert_eq!(result.iterations, 3);
        assert_eq!(result.final_verdict, Some(Verdict::Wrong));
        assert_eq!(result.plan, "p3");
        assert_eq!(result.iteration_history.len(), 3);
        assert!(result.status.has_plan());
    }

    #[tokio::test]
    async fn test_max_iterations_reports_last_verdict() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .plan("p1")
                .critiques(&["goal not reached"; 3]),
        );

        let result = use_case(&provider).run("D", "P", 1, 3).await;

        assert_eq!(result.status, PlanStatus::MaxIterations);
        assert_eq!(result.final_verdict, Some(Verdict::GoalNotReached));
    }

    // -- Scenario D: generation fails ------------------------------------------

    #[tokio::test]
    async fn test_generation_failure_is_fatal() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .plan_error(ProviderError::AuthenticationFailed("bad key".to_string())),
        );

        let result = use_case(&provider).run("D", "P", 5, 5).await;

        assert_eq!(result.status, PlanStatus::Failed);
        assert_eq!(result.iterations, 0);
        assert_eq!(provider.critique_calls(), 0);
        assert!(matches!(
            result.error,
            Some(PlanningError::GenerationFailed { ref message }) if message.contains("bad key")
        ));
    }

    #[tokio::test]
    async fn test_generation_failure_after_first_iteration_keeps_history() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .plan("p1")
                .critiques(&[WRONG; 5])
                .plan_error(ProviderError::Timeout),
        );

        let result = use_case(&provider).run("D", "P", 5, 5).await;

        assert_eq!(result.status, PlanStatus::Failed);
        assert_eq!(result.iterations, 1);
        assert_eq!(result.plan, "p1");
        assert_eq!(result.final_verdict, Some(Verdict::Wrong));
    }

    // -- Scenario E: partial critique failure ----------------------------------

    #[tokio::test]
    async fn test_partial_critique_failure_degrades_batch() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .plan("1. pickup A")
                .critiques(&[CORRECT, WRONG, CORRECT])
                .critique_errors(2),
        );

        let result = use_case(&provider).run("D", "P", 5, 5).await;

        assert_eq!(result.status, PlanStatus::Valid);
        let record = &result.iteration_history[0];
        assert_eq!(record.vote_result.total_votes, 3);
        assert_eq!(record.vote_result.breakdown.total(), 3);
        assert_eq!(record.failed_samples, 2);
        assert_eq!(record.requested_samples(), 5);
        assert!((record.vote_result.confidence - 2.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_all_critiques_failed_is_insufficient_votes() {
        let provider = Arc::new(ScriptedProvider::new().plan("p1").critique_errors(5));

        let result = use_case(&provider).run("D", "P", 5, 5).await;

        assert_eq!(result.status, PlanStatus::Failed);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.plan, "p1");
        assert_eq!(
            result.error,
            Some(PlanningError::InsufficientVotes {
                requested: 5,
                succeeded: 0,
                minimum: 1,
            })
        );
    }

    #[tokio::test]
    async fn test_minimum_viable_batch_gate() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .plan("p1")
                .critiques(&[CORRECT, CORRECT])
                .critique_errors(3),
        );
        let input = RunSelfCritiqueInput::new("D", "P").with_params(
            PlanningParams::default()
                .with_samples_per_iteration(5)
                .with_min_successful_samples(3),
        );

        let result = use_case(&provider).execute(input).await;

        assert_eq!(result.status, PlanStatus::Failed);
        assert!(matches!(
            result.error,
            Some(PlanningError::InsufficientVotes { succeeded: 2, minimum: 3, .. })
        ));
    }

    // -- Ambiguity and tie-break -----------------------------------------------

    #[tokio::test]
    async fn test_unparseable_critiques_never_accept() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .plan("p1")
                .critiques(&["looks fine to me", "seems good", "ok"]),
        );

        let result = use_case(&provider).run("D", "P", 1, 3).await;

        assert_eq!(result.status, PlanStatus::MaxIterations);
        assert_eq!(result.final_verdict, Some(Verdict::Wrong));
        assert!(result.iteration_history[0].vote_result.best_critique.is_ambiguous);
    }

    #[tokio::test]
    async fn test_tied_vote_revises() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .plan("p1")
                .critiques(&[CORRECT, CORRECT, "goal not reached", "goal not reached"])
                .plan("p2")
                .critiques(&[CORRECT; 4]),
        );

        let result = use_case(&provider).run("D", "P", 3, 4).await;

        assert_eq!(result.status, PlanStatus::Valid);
        assert_eq!(
            result.iteration_history[0].vote_result.majority_verdict,
            Verdict::GoalNotReached
        );
        // No error localized: generic rejection reason
        assert!(
            provider.generation_prompts()[1]
                .contains("Previous attempt failed with: the plan was rejected")
        );
    }

    // -- Cancellation and timeouts ---------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_during_critiques() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .plan("p1")
                .critiques(&[CORRECT; 5])
                .with_critique_delay(Duration::from_secs(3600)),
        );
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let result = use_case(&provider)
            .with_cancellation(token)
            .run("D", "P", 5, 5)
            .await;

        assert_eq!(result.status, PlanStatus::Cancelled);
        assert_eq!(result.error, Some(PlanningError::Cancelled));
        assert!(result.iteration_history.is_empty());
        assert_eq!(result.plan, "p1");
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let provider = Arc::new(ScriptedProvider::new().plan("p1"));
        let token = CancellationToken::new();
        token.cancel();

        let result = use_case(&provider)
            .with_cancellation(token)
            .run("D", "P", 5, 5)
            .await;

        assert_eq!(result.status, PlanStatus::Cancelled);
        assert!(provider.generation_prompts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sample_timeout_excludes_slow_samples() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .plan("p1")
                .critiques(&[CORRECT; 3])
                .with_critique_delay(Duration::from_secs(60)),
        );
        let input = RunSelfCritiqueInput::new("D", "P").with_params(
            PlanningParams::default()
                .with_samples_per_iteration(3)
                .with_sample_timeout(Some(Duration::from_secs(1))),
        );

        let result = use_case(&provider).execute(input).await;

        assert_eq!(result.status, PlanStatus::Failed);
        assert!(matches!(
            result.error,
            Some(PlanningError::InsufficientVotes { succeeded: 0, .. })
        ));
    }

    // -- Progress and usage ----------------------------------------------------

    #[derive(Default)]
    struct RecordingProgress {
        iterations: Mutex<Vec<usize>>,
        samples: AtomicUsize,
        failed_samples: AtomicUsize,
        runs: AtomicUsize,
    }

    impl PlanningProgressNotifier for RecordingProgress {
        fn on_iteration_start(&self, _iteration: usize, _max_iterations: usize) {}
        fn on_phase_start(&self, _state: OrchestratorState, _total_tasks: usize) {}
        fn on_sample_complete(&self, _sample_index: usize, verdict: Option<Verdict>) {
            self.samples.fetch_add(1, Ordering::SeqCst);
            if verdict.is_none() {
                self.failed_samples.fetch_add(1, Ordering::SeqCst);
            }
        }
        fn on_phase_complete(&self, _state: OrchestratorState) {}
        fn on_iteration_complete(&self, record: &IterationRecord) {
            self.iterations.lock().unwrap().push(record.iteration);
        }
        fn on_run_complete(&self, _result: &PlanResult) {
            self.runs.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_progress_streams_iteration_records_in_order() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .plan("p1")
                .critiques(&[WRONG, WRONG, WRONG])
                .plan("p2")
                .critiques(&[CORRECT, CORRECT])
                .critique_errors(1),
        );
        let progress = RecordingProgress::default();
        let input = RunSelfCritiqueInput::new("D", "P")
            .with_max_iterations(5)
            .with_samples_per_iteration(3);

        let result = use_case(&provider)
            .execute_with_progress(input, &progress)
            .await;

        assert_eq!(result.status, PlanStatus::Valid);
        assert_eq!(*progress.iterations.lock().unwrap(), vec![1, 2]);
        assert_eq!(progress.samples.load(Ordering::SeqCst), 6);
        assert_eq!(progress.failed_samples.load(Ordering::SeqCst), 1);
        assert_eq!(progress.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_usage_is_summed() {
        let provider = Arc::new(ScriptedProvider::new().plan("p1").critiques(&[CORRECT; 2]));

        let result = use_case(&provider).run("D", "P", 1, 2).await;

        // 1 generation (10/5) + 2 critiques (20/8)
        assert_eq!(result.usage, TokenUsage::new(50, 21));
    }

    #[tokio::test]
    async fn test_zero_counts_are_clamped() {
        let provider = Arc::new(ScriptedProvider::new().plan("p1").critiques(&[CORRECT]));

        let result = use_case(&provider).run("D", "P", 0, 0).await;

        assert_eq!(result.status, PlanStatus::Valid);
        assert_eq!(provider.critique_calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_threshold_falls_back_to_default() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .plan("p1")
                .critiques(&[WRONG, WRONG, WRONG, CORRECT, CORRECT]),
        );
        let params = PlanningParams::default()
            .with_max_iterations(1)
            .with_samples_per_iteration(5)
            .with_low_confidence_threshold(f64::NAN);
        let input = RunSelfCritiqueInput::new("D", "P").with_params(params);

        let result = use_case(&provider).execute(input).await;

        let vote = &result.iteration_history[0].vote_result;
        assert_eq!(vote.confidence, 0.6);
        assert!(vote.is_low_confidence);
    }

    #[tokio::test]
    async fn test_default_prompts_are_sent() {
        struct EchoCheck;

        #[async_trait]
        impl CompletionProvider for EchoCheck {
            fn name(&self) -> &str {
                "echo"
            }
            async fn complete(
                &self,
                request: &CompletionRequest,
            ) -> Result<CompletionResponse, ProviderError> {
                if request.prompt.contains("The suggested solution:\n1. noop") {
                    Ok(CompletionResponse::new("the plan is correct"))
                } else if request.prompt.ends_with("Output only the numbered list of actions.") {
                    Ok(CompletionResponse::new("1. noop"))
                } else {
                    Err(ProviderError::Other("unexpected prompt".to_string()))
                }
            }
        }

        let result = RunSelfCritiqueUseCase::new(Arc::new(EchoCheck))
            .run("(define (domain d))", "(define (problem p))", 2, 3)
            .await;

        assert_eq!(result.status, PlanStatus::Valid);
        assert_eq!(result.plan, "1. noop");
    }
}
