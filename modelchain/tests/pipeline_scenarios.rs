//! End-to-end runs through the public API with in-memory transports.

use modelchain::adapter::{build_payload, extract_text, invoke, ModelFamily};
use modelchain::errors::{ModelchainError, TransportError};
use modelchain::pipeline::{presets, PipelineDefinition, PipelineRunner, StageDefinition};
use modelchain::testing::{claude_reply, nova_reply, titan_reply, EchoTransport, ScriptedTransport};
use pretty_assertions::assert_eq;

const CLAUDE: &str = "anthropic.claude-3-haiku-20240307-v1:0";
const TITAN: &str = "amazon.titan-text-express-v1";
const NOVA: &str = "amazon.nova-lite-v1:0";

#[test]
fn echo_round_trip_recovers_text_for_every_family() {
    let transport = EchoTransport::new();
    for (family, model_id) in [
        (ModelFamily::Claude, CLAUDE),
        (ModelFamily::Titan, TITAN),
        (ModelFamily::Nova, NOVA),
    ] {
        let text = "Line one\nLine \"two\" with unicode: héllo";
        let payload = build_payload(family, "You are terse.", text);
        let response = invoke(&transport, model_id, &payload).unwrap();
        assert_eq!(extract_text(family, model_id, &response).unwrap(), text);
    }
}

#[test]
fn four_stages_all_succeed() {
    let transport = ScriptedTransport::new()
        .reply(claude_reply("architecture doc"))
        .reply(claude_reply("print('x')"))
        .reply(nova_reply("def test_x(): pass"))
        .reply(titan_reply("README"));
    let runner = PipelineRunner::new(transport);

    let report = runner
        .run(&presets::game_development(), "Tic-Tac-Toe")
        .unwrap();

    assert_eq!(report.results.len(), 4);
    assert!(report.results.iter().all(|r| r.success));
    let stage_sum: std::time::Duration = report.results.iter().map(|r| r.duration).sum();
    assert!(report.total_duration >= stage_sum);
    assert_eq!(report.final_output(), Some("README"));
    assert_eq!(report.output("Development"), Some("print('x')"));
}

#[test]
fn development_failure_stops_the_run() {
    let transport = ScriptedTransport::new()
        .reply(claude_reply("architecture doc"))
        .fail(TransportError::new("Could not connect to the endpoint URL"))
        .reply(nova_reply("never used"))
        .reply(titan_reply("never used"));
    let runner = PipelineRunner::new(transport);

    let failure = runner
        .run(&presets::game_development(), "Tic-Tac-Toe")
        .unwrap_err();

    let results: Vec<(&str, bool)> = failure
        .report
        .results
        .iter()
        .map(|r| (r.name.as_str(), r.success))
        .collect();
    assert_eq!(results, vec![("Architecture", true), ("Development", false)]);
    assert_eq!(runner.transport().call_count(), 2);
    assert_eq!(runner.transport().remaining(), 2);
    match &failure.source {
        ModelchainError::Transport(err) => {
            assert_eq!(err.message, "Could not connect to the endpoint URL");
        }
        other => panic!("expected transport error, got {other:?}"),
    }
    assert!(failure.diagnostics("us-east-1").contains("Possible causes"));
}

#[test]
fn empty_system_prompt_is_never_sent() {
    let pipeline = PipelineDefinition::new("no-system")
        .stage(StageDefinition::new("Claude", CLAUDE).with_template("{request}"))
        .stage(StageDefinition::new("Titan", TITAN))
        .stage(StageDefinition::new("Nova", NOVA));
    let transport = ScriptedTransport::new()
        .reply(claude_reply("a"))
        .reply(titan_reply("b"))
        .reply(nova_reply("c"));
    let runner = PipelineRunner::new(transport);

    runner.run(&pipeline, "hello").unwrap();

    for call in runner.transport().calls() {
        let body = call.json().unwrap();
        assert!(body.get("system").is_none(), "{} sent a system field", call.model_id);
    }
}

#[test]
fn echo_pipeline_threads_outputs_forward() {
    let pipeline = PipelineDefinition::new("echo")
        .stage(StageDefinition::new("First", CLAUDE).with_template("start:{request}"))
        .stage(StageDefinition::new("Second", NOVA).with_template("next:{previous}"))
        .stage(StageDefinition::new("Third", TITAN).with_template("end:{stage:First}"));
    let runner = PipelineRunner::new(EchoTransport::new());

    let report = runner.run(&pipeline, "go").unwrap();

    assert_eq!(report.output("First"), Some("start:go"));
    assert_eq!(report.output("Second"), Some("next:start:go"));
    assert_eq!(report.final_output(), Some("end:start:go"));
}

#[test]
fn bundled_pipeline_file_runs_offline() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../pipelines/content-review.json");
    let pipeline = PipelineDefinition::from_json_file(path).unwrap();
    assert!(pipeline.validate().is_ok());

    let runner = PipelineRunner::new(EchoTransport::new());
    let report = runner.run(&pipeline, "launch note").unwrap();

    assert_eq!(report.output("Content"), Some("launch note"));
    assert_eq!(
        report.final_output(),
        Some("Review and improve this content:\nlaunch note")
    );
}
