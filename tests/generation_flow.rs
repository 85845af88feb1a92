//! Integration tests for tool-aware generation.
//!
//! These tests drive `GenerateWithToolsHandler` end to end:
//! 1. Tools are resolved from a YAML catalog on disk
//! 2. The mode is selected and the final prompt composed
//! 3. The final call streams through the tool processor
//! 4. Progress events reach a channel as JSON frames
//!
//! Uses the scripted provider; no model is contacted.

use futures::StreamExt;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

use toolweave::adapters::{
    ChannelToolEventSink, InMemoryToolEventSink, InMemoryToolPromptSource, MockAIProvider,
    MockError, YamlToolCatalog,
};
use toolweave::application::{
    GatingStage, GenerateWithToolsHandler, GenerationCommand, GenerationError, GenerationSettings,
};
use toolweave::config::AppConfig;
use toolweave::domain::foundation::{ChatId, ErrorCode, UserId};
use toolweave::domain::tooling::{ModeReason, ToolEventKind, ToolMode, ToolPrompt};
use toolweave::ports::{CompletionRequest, MessageRole, RequestMetadata, ToolPromptSource};

// =============================================================================
// Test Infrastructure
// =============================================================================

const CATALOG: &str = r#"
- command: /graph
  title: Function Graph
  short_description: Plots functions
  priority: 2
  groups: [math]
  content: GRAPH FULL PROMPT
- command: /diagram
  title: Geometry Diagram
  short_description: Draws geometric figures
  priority: 5
  groups: [math]
  content: DIAGRAM FULL PROMPT
- command: /timeline
  title: Timeline
  priority: 1
  groups: [history]
  content: TIMELINE FULL PROMPT
"#;

fn catalog_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(CATALOG.as_bytes()).unwrap();
    file
}

fn request(question: &str) -> CompletionRequest {
    CompletionRequest::new(RequestMetadata::new(
        UserId::new("user-1").unwrap(),
        ChatId::new(),
        "trace-integration",
    ))
    .with_system_prompt("You are a patient math tutor.")
    .with_message(MessageRole::User, question)
}

fn handler(
    provider: &MockAIProvider,
    source: Arc<dyn ToolPromptSource>,
) -> GenerateWithToolsHandler {
    GenerateWithToolsHandler::new(
        Arc::new(provider.clone()),
        source,
        GenerationSettings::from_config(&AppConfig::default()),
    )
}

// =============================================================================
// Gating
// =============================================================================

#[tokio::test]
async fn gating_selects_tools_from_yaml_catalog_and_tracks_blocks() {
    let file = catalog_file();
    let provider = MockAIProvider::new()
        .with_response("```json\n{\"need_tools\": [\"/graph\"], \"reason\": \"plot\"}\n```")
        .with_stream_chunks([
            "Here is the graph:\n``",
            "`graph\n{\"fn\": \"x^2\"}\n",
            "```\nThe vertex is at the origin.",
        ]);
    let handler = handler(&provider, Arc::new(YamlToolCatalog::new(file.path())));
    let sink = Arc::new(InMemoryToolEventSink::new());

    let prepared = handler
        .prepare(
            GenerationCommand::new(request("Plot y = x^2"))
                .with_tool_mode(ToolMode::Gating)
                .with_tool_group("math"),
        )
        .await
        .unwrap();

    let gating = prepared.gating.clone().unwrap();
    assert_eq!(gating.stage, GatingStage::ToolsSelected);
    assert_eq!(gating.selected_commands, vec!["/graph"]);
    assert_eq!(
        prepared.request.system_prompt.as_deref(),
        Some("You are a patient math tutor.\n\nGRAPH FULL PROMPT")
    );

    let text = handler
        .stream(&prepared, Some(sink.clone()))
        .await
        .unwrap()
        .collect_text()
        .await
        .unwrap();

    assert_eq!(
        text,
        "Here is the graph:\n```graph\n{\"fn\": \"x^2\"}\n```\nThe vertex is at the origin."
    );
    assert_eq!(
        sink.kinds(),
        vec![ToolEventKind::Executing, ToolEventKind::Completed]
    );

    let calls = provider.get_calls();
    assert_eq!(calls.len(), 2);
    assert!(!calls[0].streaming);
    assert!(calls[0].system_prompt().contains("- /graph: Plots functions"));
    assert!(!calls[0].system_prompt().contains("TIMELINE"));
    assert!(calls[1].streaming);
}

#[tokio::test]
async fn gating_falls_back_to_base_prompt_when_stage1_fails() {
    let file = catalog_file();
    let provider = MockAIProvider::new()
        .with_error(MockError::Unavailable {
            message: "overloaded".to_string(),
        })
        .with_response("A parabola opens upward.");
    let handler = handler(&provider, Arc::new(YamlToolCatalog::new(file.path())));

    let prepared = handler
        .prepare(GenerationCommand::new(request("What is a parabola?")).with_tool_mode(ToolMode::Gating))
        .await
        .unwrap();

    assert_eq!(prepared.gating.as_ref().unwrap().stage, GatingStage::Stage1Failed);
    assert_eq!(
        prepared.request.system_prompt.as_deref(),
        Some("You are a patient math tutor.")
    );

    let output = handler.complete(&prepared, None).await.unwrap();
    assert_eq!(output.content, "A parabola opens upward.");
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn gating_discards_stage1_direct_answer() {
    let provider = MockAIProvider::new()
        .with_response(r#"{"need_tools": [], "answer": "Stage one answer"}"#)
        .with_response("Final answer");
    let source = InMemoryToolPromptSource::new()
        .with_tool(ToolPrompt::new("/graph", "Graph", "GRAPH").unwrap());
    let handler = handler(&provider, Arc::new(source));

    let prepared = handler
        .prepare(GenerationCommand::new(request("Hi")).with_tool_mode(ToolMode::Gating))
        .await
        .unwrap();
    let output = handler.complete(&prepared, None).await.unwrap();

    assert_eq!(prepared.gating.unwrap().stage, GatingStage::NoToolsSelected);
    assert_eq!(output.content, "Final answer");
}

// =============================================================================
// Inline
// =============================================================================

#[tokio::test]
async fn inline_stream_delivers_events_as_json_frames() {
    let file = catalog_file();
    let provider = MockAIProvider::new()
        .with_stream_chunks([
            "First the curve. <dia",
            "gram>triangle ABC</diagram>",
            " Then <tool-unsupp",
            "orted tool=\"graph\" reason=\"needs 3D\"/>",
        ])
        .with_response("{\"shape\": \"triangle\"}")
        .with_response("Picture it rotating about the axis.");
    let handler = handler(&provider, Arc::new(YamlToolCatalog::new(file.path())));
    let (sink, mut frames) = ChannelToolEventSink::channel(16);

    let prepared = handler
        .prepare(GenerationCommand::new(request("Show triangle ABC")))
        .await
        .unwrap();
    assert_eq!(prepared.mode(), ToolMode::Inline);
    assert_eq!(prepared.selection.reason, ModeReason::DefaultMode);

    let pieces: Vec<String> = handler
        .stream(&prepared, Some(Arc::new(sink)))
        .await
        .unwrap()
        .map(|piece| piece.unwrap())
        .collect()
        .await;

    assert_eq!(
        pieces.concat(),
        "First the curve. \n{\"shape\": \"triangle\"}\n Then  Picture it rotating about the axis."
    );
    assert!(pieces.iter().all(|p| !p.contains('<')));

    let mut types = Vec::new();
    while let Ok(frame) = frames.try_recv() {
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        types.push(value["type"].as_str().unwrap().to_string());
    }
    assert_eq!(
        types,
        vec![
            "tool_executing",
            "tool_completed",
            "tool_recovery",
            "tool_recovery_completed"
        ]
    );
}

#[tokio::test]
async fn inline_stream_survives_closed_event_channel() {
    let provider = MockAIProvider::new()
        .with_stream_chunks(["<graph>x</graph> end"])
        .with_response("OUT");
    let source = InMemoryToolPromptSource::new()
        .with_tool(ToolPrompt::new("/graph", "Graph", "GRAPH").unwrap());
    let handler = handler(&provider, Arc::new(source));
    let (sink, frames) = ChannelToolEventSink::channel(1);
    drop(frames);

    let prepared = handler
        .prepare(GenerationCommand::new(request("Plot")))
        .await
        .unwrap();
    let text = handler
        .stream(&prepared, Some(Arc::new(sink)))
        .await
        .unwrap()
        .collect_text()
        .await
        .unwrap();

    assert_eq!(text, "\nOUT\n end");
}

#[tokio::test]
async fn upstream_failure_mid_stream_is_reported() {
    let provider = MockAIProvider::new().with_broken_stream(
        ["Partial answer "],
        MockError::Network {
            message: "connection reset".to_string(),
        },
    );
    let source = InMemoryToolPromptSource::new()
        .with_tool(ToolPrompt::new("/graph", "Graph", "GRAPH").unwrap());
    let handler = handler(&provider, Arc::new(source));

    let prepared = handler
        .prepare(GenerationCommand::new(request("Plot")))
        .await
        .unwrap();
    let err = handler
        .stream(&prepared, None)
        .await
        .unwrap()
        .collect_text()
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::Provider(_)));
}

// =============================================================================
// Mode selection and catalog errors
// =============================================================================

#[tokio::test]
async fn title_prompt_never_gets_tools() {
    let file = catalog_file();
    let provider = MockAIProvider::new().with_response("Parabola basics");
    let handler = handler(&provider, Arc::new(YamlToolCatalog::new(file.path())));
    let mut req = request("Plot y = x^2");
    req.system_prompt = Some("Generate a title for this chat.".to_string());

    let prepared = handler
        .prepare(GenerationCommand::new(req).with_tool_mode(ToolMode::Concat))
        .await
        .unwrap();

    assert_eq!(prepared.mode(), ToolMode::None);
    assert_eq!(prepared.selection.reason, ModeReason::UtilityRequest);
    assert_eq!(
        prepared.request.system_prompt.as_deref(),
        Some("Generate a title for this chat.")
    );
}

#[tokio::test]
async fn concat_uses_whole_group_in_priority_order() {
    let file = catalog_file();
    let provider = MockAIProvider::new();
    let handler = handler(&provider, Arc::new(YamlToolCatalog::new(file.path())));

    let prepared = handler
        .prepare(
            GenerationCommand::new(request("Explain"))
                .with_tool_mode(ToolMode::Concat)
                .with_tool_group("math"),
        )
        .await
        .unwrap();

    assert_eq!(
        prepared.request.system_prompt.as_deref(),
        Some("You are a patient math tutor.\n\nDIAGRAM FULL PROMPT\n\nGRAPH FULL PROMPT")
    );
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn duplicate_catalog_commands_are_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(
        b"- command: /graph\n  content: one\n- command: GRAPH\n  content: two\n",
    )
    .unwrap();
    let provider = MockAIProvider::new();
    let handler = handler(&provider, Arc::new(YamlToolCatalog::new(file.path())));

    let err = handler
        .prepare(GenerationCommand::new(request("Plot")))
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::DuplicateToolCommand);
}
