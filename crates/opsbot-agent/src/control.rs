//! Control loop — plan, execute, verify, and retry while the verifier asks to.
//!
//! ```text
//! Planning → Executing → Verifying → Done
//!                            │  ▲
//!                            ▼  │
//!                      RetryExecuting
//! ```
//!
//! A retry runs only when the verifier reports failure, proposes a plan with
//! at least one step, and the retry budget is not spent. Retry records are
//! appended to the trace and the verifier always sees the whole trace.

use std::sync::Arc;

use tracing::info;

use opsbot_providers::StructuredClient;

use crate::error::AgentError;
use crate::executor::Executor;
use crate::plan::{ExecutionRecord, Plan, ResultContext, Verification};
use crate::planner::{PlanProducer, Planner};
use crate::tools::ToolRegistry;
use crate::verifier::{OutcomeVerifier, Verifier};

/// Progress hooks, e.g. for rendering in the CLI. All no-ops by default.
pub trait LoopObserver: Send + Sync {
    fn on_plan(&self, _plan: &Plan) {}

    /// Before each verifier call; `retries` is 0 for the initial verification.
    fn on_verifying(&self, _retries: u32) {}

    /// `attempt` starts at 1.
    fn on_retry(&self, _attempt: u32, _plan: &Plan) {}

    fn on_verification(&self, _verification: &Verification) {}
}

pub struct NoopObserver;

impl LoopObserver for NoopObserver {}

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The planner's plan (retry plans are not included).
    pub plan: Plan,
    /// Records of the initial plan followed by every retry.
    pub trace: Vec<ExecutionRecord>,
    /// The last verification.
    pub verification: Verification,
    /// Number of retry plans executed.
    pub retries: u32,
    /// Why the loop stopped.
    pub stop: StopReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The verifier reported success.
    Satisfied,
    /// Failure without a retry plan that has steps.
    NoRetryPlan,
    /// Failure with a retry plan, but the retry bound was reached.
    RetryBudgetSpent,
}

enum State {
    Planning,
    Executing(Plan),
    Verifying,
    RetryExecuting(Plan),
    Done(Verification, StopReason),
}

pub struct ControlLoop {
    planner: Arc<dyn PlanProducer>,
    executor: Executor,
    verifier: Arc<dyn OutcomeVerifier>,
    max_retries: u32,
    observer: Arc<dyn LoopObserver>,
}

impl ControlLoop {
    pub fn new(
        planner: Arc<dyn PlanProducer>,
        executor: Executor,
        verifier: Arc<dyn OutcomeVerifier>,
        max_retries: u32,
    ) -> Self {
        Self {
            planner,
            executor,
            verifier,
            max_retries,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Planner and verifier share one structured-output client.
    pub fn from_llm(llm: StructuredClient, tools: Arc<ToolRegistry>, max_retries: u32) -> Self {
        Self::new(
            Arc::new(Planner::new(llm.clone(), tools.clone())),
            Executor::new(tools),
            Arc::new(Verifier::new(llm)),
            max_retries,
        )
    }

    pub fn with_observer(mut self, observer: Arc<dyn LoopObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Handle one request end to end.
    ///
    /// Only planner/verifier failures are returned as errors; tool problems
    /// end up in the trace and a failed verification is still `Ok`.
    pub async fn run(&self, query: &str) -> Result<RunOutcome, AgentError> {
        let mut state = State::Planning;
        let mut initial_plan = Plan::default();
        let mut trace: Vec<ExecutionRecord> = Vec::new();
        let mut context = ResultContext::new();
        let mut retries = 0u32;

        loop {
            state = match state {
                State::Planning => {
                    info!("planning");
                    let plan = self.planner.plan(query).await?;
                    self.observer.on_plan(&plan);
                    initial_plan = plan.clone();
                    State::Executing(plan)
                }

                State::Executing(plan) | State::RetryExecuting(plan) => {
                    let records = self.executor.run(&plan, &mut context).await;
                    trace.extend(records);
                    State::Verifying
                }

                State::Verifying => {
                    info!(records = trace.len(), "verifying");
                    self.observer.on_verifying(retries);
                    let verification = self.verifier.verify(query, &trace).await?;

                    if verification.status.is_success() {
                        State::Done(verification, StopReason::Satisfied)
                    } else {
                        match verification.actionable_retry().cloned() {
                            None => {
                                info!("no retry plan offered");
                                State::Done(verification, StopReason::NoRetryPlan)
                            }
                            Some(_) if retries >= self.max_retries => {
                                info!(retries, "retry budget spent");
                                State::Done(verification, StopReason::RetryBudgetSpent)
                            }
                            Some(retry_plan) => {
                                retries += 1;
                                info!(
                                    attempt = retries,
                                    max = self.max_retries,
                                    steps = retry_plan.steps.len(),
                                    "retrying with verifier plan"
                                );
                                self.observer.on_retry(retries, &retry_plan);
                                State::RetryExecuting(retry_plan)
                            }
                        }
                    }
                }

                State::Done(verification, stop) => {
                    info!(status = ?verification.status, retries, ?stop, "run finished");
                    self.observer.on_verification(&verification);
                    return Ok(RunOutcome {
                        plan: initial_plan,
                        trace,
                        verification,
                        retries,
                        stop,
                    });
                }
            };
        }
    }
}
