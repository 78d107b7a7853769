//! Sequential stage runner.

use super::{
    PipelineDefinition, PipelineFailure, PipelineReport, PromptContext, RunState,
    StageDefinition, StageOutput, StageResult,
};
use crate::adapter::{ModelAdapter, Request};
use crate::errors::ModelchainError;
use crate::events::{types, EventSink, NoOpEventSink};
use crate::transport::Transport;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, info_span, warn};
use uuid::Uuid;

/// Book-keeping for one execution. Lives only as long as `run`.
struct PipelineRun {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    clock: Instant,
    results: Vec<StageResult>,
    outputs: Vec<StageOutput>,
    state: RunState,
}

impl PipelineRun {
    fn start() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            clock: Instant::now(),
            results: Vec::new(),
            outputs: Vec::new(),
            state: RunState::NotStarted,
        }
    }

    /// Time charged to a failed stage: everything since the start that is not
    /// already accounted to a successful stage.
    fn failed_stage_duration(&self) -> Duration {
        let accounted: Duration = self
            .results
            .iter()
            .filter(|r| r.success)
            .map(|r| r.duration)
            .sum();
        self.clock.elapsed().saturating_sub(accounted)
    }

    fn into_report(self, pipeline: &str) -> PipelineReport {
        PipelineReport {
            run_id: self.run_id,
            pipeline: pipeline.to_string(),
            started_at: self.started_at,
            total_duration: self.clock.elapsed(),
            results: self.results,
            outputs: self.outputs,
            state: self.state,
        }
    }
}

/// Runs pipelines stage by stage through one transport.
pub struct PipelineRunner<T> {
    transport: T,
    sink: Arc<dyn EventSink>,
}

impl<T: Transport> PipelineRunner<T> {
    /// Creates a runner with no event sink.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            sink: Arc::new(NoOpEventSink),
        }
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs every stage of `pipeline` in order, feeding outputs forward.
    ///
    /// The first failing stage stops the run. The summary is emitted on both
    /// outcomes before this returns.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineFailure`] holding the partial report and the
    /// original error from the failed stage.
    pub fn run(
        &self,
        pipeline: &PipelineDefinition,
        request: &str,
    ) -> Result<PipelineReport, PipelineFailure> {
        let mut run = PipelineRun::start();
        let span = info_span!("pipeline", name = pipeline.name(), run_id = %run.run_id);
        let _guard = span.enter();

        if let Err(err) = pipeline.validate() {
            warn!(error = %err, "Pipeline definition rejected");
            let report = run.into_report(pipeline.name());
            self.emit_outcome(&report, Some(&err.to_string()));
            return Err(PipelineFailure {
                report,
                stage: None,
                source: err.into(),
            });
        }

        self.sink.emit(
            types::PIPELINE_STARTED,
            Some(json!({
                "run_id": run.run_id.to_string(),
                "pipeline": pipeline.name(),
                "stage_count": pipeline.len(),
            })),
        );

        let total = pipeline.len();
        for (index, stage) in pipeline.stages().iter().enumerate() {
            run.state = run.state.advance();
            info!(stage = %stage.label, model_id = %stage.model_id, "[{}/{}] Starting stage", index + 1, total);
            self.sink.emit(
                types::STAGE_STARTED,
                Some(json!({
                    "stage": stage.label,
                    "index": index,
                    "model_id": stage.model_id,
                })),
            );

            let stage_start = Instant::now();
            match self.execute_stage(stage, request, &run.outputs) {
                Ok(text) => {
                    let duration = stage_start.elapsed();
                    info!(
                        stage = %stage.label,
                        seconds = duration.as_secs_f64(),
                        chars = text.len(),
                        "Stage completed"
                    );
                    self.sink.emit(
                        types::STAGE_COMPLETED,
                        Some(json!({
                            "stage": stage.label,
                            "duration_ms": duration_ms(duration),
                            "output_chars": text.len(),
                        })),
                    );
                    run.results
                        .push(StageResult::succeeded(&stage.label, duration));
                    run.outputs.push(StageOutput::new(&stage.label, text));
                }
                Err(err) => {
                    let duration = run.failed_stage_duration();
                    warn!(stage = %stage.label, error = %err, "Stage failed");
                    self.sink.emit(
                        types::STAGE_FAILED,
                        Some(json!({
                            "stage": stage.label,
                            "duration_ms": duration_ms(duration),
                            "error_kind": err.kind(),
                            "error": err.to_string(),
                        })),
                    );
                    run.results.push(StageResult::failed(&stage.label, duration));
                    run.state = run.state.fail();

                    let report = run.into_report(pipeline.name());
                    self.emit_outcome(&report, Some(&err.to_string()));
                    return Err(PipelineFailure {
                        report,
                        stage: Some(stage.label.clone()),
                        source: err,
                    });
                }
            }
        }

        run.state = run.state.complete();
        let report = run.into_report(pipeline.name());
        info!(
            seconds = report.total_duration.as_secs_f64(),
            "Pipeline complete"
        );
        self.emit_outcome(&report, None);
        Ok(report)
    }

    fn execute_stage(
        &self,
        stage: &StageDefinition,
        request: &str,
        outputs: &[StageOutput],
    ) -> Result<String, ModelchainError> {
        let user_text = stage.prompt.build(&PromptContext::new(request, outputs));
        let adapter = ModelAdapter::new(&stage.model_id)?;
        let request = Request::new(user_text).with_system_prompt(&stage.system_prompt);
        adapter.complete(&self.transport, &request)
    }

    fn emit_outcome(&self, report: &PipelineReport, error: Option<&str>) {
        let (event, data) = match error {
            None => (
                types::PIPELINE_COMPLETED,
                json!({
                    "run_id": report.run_id.to_string(),
                    "duration_ms": duration_ms(report.total_duration),
                }),
            ),
            Some(error) => (
                types::PIPELINE_FAILED,
                json!({
                    "run_id": report.run_id.to_string(),
                    "duration_ms": duration_ms(report.total_duration),
                    "failed_stage": report.failed_stage().map(|r| r.name.clone()),
                    "error": error,
                }),
            ),
        };
        self.sink.emit(event, Some(data));
        self.sink.emit(
            types::PIPELINE_SUMMARY,
            Some(json!({
                "run_id": report.run_id.to_string(),
                "state": report.state,
                "results": report.results,
                "table": report.summary_table(),
            })),
        );
    }
}

impl<T> std::fmt::Debug for PipelineRunner<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineRunner").finish_non_exhaustive()
    }
}

fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TransportError;
    use crate::events::CollectingEventSink;
    use crate::pipeline::presets;
    use crate::testing::{claude_reply, nova_reply, titan_reply, ScriptedTransport};
    use pretty_assertions::assert_eq;

    fn game() -> PipelineDefinition {
        presets::game_development()
    }

    fn four_replies() -> ScriptedTransport {
        ScriptedTransport::new()
            .reply(claude_reply("ARCH"))
            .reply(claude_reply("CODE"))
            .reply(nova_reply("TESTS"))
            .reply(titan_reply("DOCS"))
    }

    #[test]
    fn test_all_stages_succeed() {
        let runner = PipelineRunner::new(four_replies());
        let report = runner.run(&game(), "Tic-Tac-Toe").unwrap();

        assert_eq!(report.results.len(), 4);
        assert!(report.results.iter().all(|r| r.success));
        assert_eq!(report.state, RunState::Completed);
        assert_eq!(report.final_output(), Some("DOCS"));
        assert!(report.total_duration >= report.successful_duration());
    }

    #[test]
    fn test_outputs_flow_into_later_prompts() {
        let runner = PipelineRunner::new(four_replies());
        runner.run(&game(), "Tic-Tac-Toe").unwrap();

        let calls = runner.transport().calls();
        assert_eq!(calls.len(), 4);
        assert!(calls[0].user_text().contains("Tic-Tac-Toe"));
        assert!(calls[1].user_text().contains("ARCH"));
        assert!(calls[2].user_text().contains("CODE"));
        let docs_prompt = calls[3].user_text();
        assert!(docs_prompt.contains("ARCH"));
        assert!(docs_prompt.contains("CODE"));
        assert!(docs_prompt.contains("TESTS"));
    }

    #[test]
    fn test_stops_at_first_failure() {
        let transport = ScriptedTransport::new()
            .reply(claude_reply("ARCH"))
            .fail(TransportError::new("Could not connect to the endpoint URL"));
        let runner = PipelineRunner::new(transport);

        let failure = runner.run(&game(), "Tic-Tac-Toe").unwrap_err();

        assert_eq!(failure.stage.as_deref(), Some("Development"));
        assert!(matches!(failure.source, ModelchainError::Transport(_)));
        assert_eq!(failure.report.state, RunState::Failed(1));
        let names: Vec<(&str, bool)> = failure
            .report
            .results
            .iter()
            .map(|r| (r.name.as_str(), r.success))
            .collect();
        assert_eq!(names, vec![("Architecture", true), ("Development", false)]);
        assert_eq!(runner.transport().call_count(), 2);
    }

    #[test]
    fn test_failed_stage_duration_excludes_prior_successes() {
        let transport = ScriptedTransport::new()
            .reply(claude_reply("ARCH"))
            .fail(TransportError::new("boom"));
        let runner = PipelineRunner::new(transport);

        let failure = runner.run(&game(), "x").unwrap_err();
        let report = &failure.report;

        assert!(report.total_duration >= report.results[0].duration + report.results[1].duration);
    }

    #[test]
    fn test_unsupported_model_fails_its_stage() {
        let mut pipeline = game();
        pipeline.set_model("Testing", "meta.llama3-8b-instruct-v1:0");
        let runner = PipelineRunner::new(
            ScriptedTransport::new()
                .reply(claude_reply("ARCH"))
                .reply(claude_reply("CODE")),
        );

        let failure = runner.run(&pipeline, "x").unwrap_err();
        assert_eq!(failure.stage.as_deref(), Some("Testing"));
        assert!(matches!(failure.source, ModelchainError::UnsupportedModel(_)));
        assert_eq!(failure.report.results.len(), 3);
        assert_eq!(runner.transport().call_count(), 2);
    }

    #[test]
    fn test_empty_response_fails_stage() {
        let transport = ScriptedTransport::new().reply(serde_json::json!({"content": []}));
        let runner = PipelineRunner::new(transport);

        let failure = runner.run(&game(), "x").unwrap_err();
        assert!(matches!(failure.source, ModelchainError::EmptyResponse(_)));
        assert_eq!(failure.report.results.len(), 1);
    }

    #[test]
    fn test_invalid_pipeline_never_calls_transport() {
        let runner = PipelineRunner::new(ScriptedTransport::new());
        let failure = runner.run(&PipelineDefinition::new("empty"), "x").unwrap_err();

        assert_eq!(failure.stage, None);
        assert!(matches!(failure.source, ModelchainError::Validation(_)));
        assert_eq!(failure.report.state, RunState::NotStarted);
        assert_eq!(runner.transport().call_count(), 0);
    }

    #[test]
    fn test_event_order_on_success() {
        let sink = Arc::new(CollectingEventSink::new());
        let runner = PipelineRunner::new(four_replies()).with_event_sink(sink.clone());
        runner.run(&game(), "x").unwrap();

        let types = sink.event_types();
        assert_eq!(types.first().map(String::as_str), Some("pipeline.started"));
        assert_eq!(sink.events_of_type("stage.completed").len(), 4);
        assert_eq!(types[types.len() - 2], "pipeline.completed");
        assert_eq!(types.last().map(String::as_str), Some("pipeline.summary"));
    }

    #[test]
    fn test_summary_emitted_on_failure() {
        let sink = Arc::new(CollectingEventSink::new());
        let transport = ScriptedTransport::new().fail(TransportError::new("denied"));
        let runner = PipelineRunner::new(transport).with_event_sink(sink.clone());

        runner.run(&game(), "x").unwrap_err();

        let summary = sink.events_of_type("pipeline.summary");
        assert_eq!(summary.len(), 1);
        let table = summary[0].1.as_ref().unwrap()["table"].as_str().unwrap().to_string();
        assert!(table.contains("Architecture"));
        assert!(table.contains("[FAILED]"));
        assert_eq!(sink.events_of_type("stage.failed").len(), 1);
        assert_eq!(sink.events_of_type("pipeline.failed").len(), 1);
    }
}
