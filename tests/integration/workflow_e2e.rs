//! End-to-end workflow tests.
//!
//! These tests run both call sites against a scripted provider and a
//! recording surface, checking what the user would see and that the busy
//! state is always released.

use mai::{Assistant, ModelCatalog, RenderStyle, WorkflowOutcome};

use crate::fixtures::{RecordingSurface, ScriptedTransport, Step};

const RECOMMENDATION: &str = "For turning quarterly sales data into clear charts, \
**m-4.5 Pro** is the ideal choice: its precision with complex data analysis \
and logical reasoning makes it perfect for the job.";

const TESTIMONIAL: &str = "They cut our deployment cycle from days to minutes.";

/// Test: Recommendation end to end
/// Given a stub returning a paragraph that emphasizes one catalog identifier
/// When the recommendation workflow runs
/// Then the surface shows the paragraph with the identifier emphasized and is idle
#[tokio::test(start_paused = true)]
async fn test_recommendation_end_to_end() {
    let assistant = Assistant::new(ScriptedTransport::new(vec![Step::ok(RECOMMENDATION)]));
    let surface = RecordingSurface::new("Summarize quarterly sales data with charts");

    let outcome = assistant.recommend_model(&surface).await;

    let expected = RECOMMENDATION.replace("**m-4.5 Pro**", "<strong>m-4.5 Pro</strong>");
    assert_eq!(outcome, WorkflowOutcome::Completed(expected.clone()));
    assert_eq!(surface.result_text(), expected);
    assert!(!surface.result_text().contains("**"));
    assert!(!surface.is_busy());
    assert_eq!(surface.busy_history(), vec![true, false]);
    assert!(!surface.error_visible());
    assert_eq!(surface.texts().first().map(String::as_str), Some("Analyzing..."));
}

/// Test: Recommendation request carries the catalog and the task
#[tokio::test(start_paused = true)]
async fn test_recommendation_payload_contents() {
    let assistant = Assistant::new(ScriptedTransport::new(vec![Step::ok(RECOMMENDATION)]));
    let surface = RecordingSurface::new("   Summarize quarterly sales data with charts   ");

    assistant.recommend_model(&surface).await;

    let payloads = assistant.dispatcher().transport().payloads();
    assert_eq!(payloads.len(), 1);
    let content = &payloads[0].contents[0].parts[0].text;
    assert!(content.contains("\"Summarize quarterly sales data with charts\""));
    for entry in ModelCatalog::builtin().entries() {
        assert!(content.contains(entry.identifier));
    }
    assert!(payloads[0].system_instruction.parts[0]
        .text
        .contains("mAI"));
}

/// Test: Terminal surfaces get ANSI emphasis
#[tokio::test(start_paused = true)]
async fn test_recommendation_terminal_style() {
    let assistant = Assistant::new(ScriptedTransport::new(vec![Step::ok(
        "Go with **m-4.9+** today.",
    )]));
    let surface = RecordingSurface::new("Write a haiku").with_style(RenderStyle::Terminal);

    let outcome = assistant.recommend_model(&surface).await;

    assert_eq!(
        outcome,
        WorkflowOutcome::Completed("Go with \x1b[1mm-4.9+\x1b[0m today.".to_string())
    );
}

/// Test: Testimonial end to end
/// Given a stub returning a sentence with or without straight quotes
/// When the testimonial workflow runs
/// Then the surface shows it wrapped in quotation glyphs exactly once
#[tokio::test(start_paused = true)]
async fn test_testimonial_end_to_end_quotes_once() {
    let variants = [
        TESTIMONIAL.to_string(),
        format!("{TESTIMONIAL}\""),
        format!("\"{TESTIMONIAL}\""),
        format!("  \"{TESTIMONIAL}\"\n"),
    ];
    for generated in variants {
        let assistant = Assistant::new(ScriptedTransport::new(vec![Step::ok(&generated)]));
        let surface = RecordingSurface::new("Deployment time dropped from days to minutes")
            .with_option("DevOps Lead");

        let outcome = assistant.synthesize_testimonial(&surface).await;

        let expected = format!("&ldquo;{TESTIMONIAL}&rdquo;");
        assert_eq!(outcome, WorkflowOutcome::Completed(expected.clone()), "{generated:?}");
        assert_eq!(surface.result_text(), expected);
        assert!(!surface.result_text().contains('"'));
        assert!(!surface.is_busy());
        assert_eq!(surface.texts().first().map(String::as_str), Some("Generating..."));

        let payloads = assistant.dispatcher().transport().payloads();
        assert!(payloads[0].system_instruction.parts[0]
            .text
            .contains("\"DevOps Lead\""));
        assert_eq!(
            payloads[0].contents[0].parts[0].text,
            "Deployment time dropped from days to minutes"
        );
    }
}

/// Test: Short task descriptions never reach the provider
#[tokio::test(start_paused = true)]
async fn test_short_task_description_is_rejected_locally() {
    for input in ["", "a", "abcd", "   abcd   ", "\t\n"] {
        let assistant = Assistant::new(ScriptedTransport::new(vec![Step::ok("unused")]));
        let surface = RecordingSurface::new(input);

        let outcome = assistant.recommend_model(&surface).await;

        assert!(
            matches!(outcome, WorkflowOutcome::Rejected { min_length: 5, .. }),
            "{input:?} -> {outcome:?}"
        );
        assert_eq!(assistant.dispatcher().transport().attempt_count(), 0);
        assert!(surface.busy_history().is_empty());
        assert!(!surface.error_visible());
        assert!(surface.result_text().contains("minimum 5 characters"));
    }
}

/// Test: Short feedback never reaches the provider
#[tokio::test(start_paused = true)]
async fn test_short_feedback_is_rejected_locally() {
    for input in ["", "great", "123456789", "  too short  "] {
        let assistant = Assistant::new(ScriptedTransport::new(vec![Step::ok("unused")]));
        let surface = RecordingSurface::new(input).with_option("CTO");

        let outcome = assistant.synthesize_testimonial(&surface).await;

        assert!(
            matches!(outcome, WorkflowOutcome::Rejected { min_length: 10, .. }),
            "{input:?} -> {outcome:?}"
        );
        assert_eq!(assistant.dispatcher().transport().attempt_count(), 0);
        assert!(surface.result_text().contains("minimum 10 characters"));
    }
}

/// Test: Provider rejection shows the generic message and releases busy
#[tokio::test(start_paused = true)]
async fn test_provider_error_reports_generic_failure() {
    let assistant = Assistant::new(ScriptedTransport::new(vec![Step::status(400)]));
    let surface = RecordingSurface::new("Summarize quarterly sales data with charts");

    let outcome = assistant.recommend_model(&surface).await;

    assert_eq!(outcome, WorkflowOutcome::Failed);
    assert!(surface.error_visible());
    assert_eq!(
        surface.result_text(),
        "Unable to generate the recommendation right now."
    );
    assert!(!surface.result_text().contains("400"));
    assert!(!surface.is_busy());
    assert_eq!(surface.busy_history(), vec![true, false]);
}

/// Test: Empty envelope is a failure and is not retried
#[tokio::test(start_paused = true)]
async fn test_empty_response_reports_generic_failure() {
    let assistant = Assistant::new(ScriptedTransport::new(vec![
        Step::Respond(200, r#"{"candidates": []}"#.to_string()),
        Step::ok("never reached"),
    ]));
    let surface = RecordingSurface::new("Deployment time dropped from days to minutes")
        .with_option("DevOps Lead");

    let outcome = assistant.synthesize_testimonial(&surface).await;

    assert_eq!(outcome, WorkflowOutcome::Failed);
    assert_eq!(assistant.dispatcher().transport().attempt_count(), 1);
    assert!(surface.error_visible());
    assert_eq!(
        surface.result_text(),
        "Unable to generate the testimonial right now."
    );
    assert!(!surface.is_busy());
}

/// Test: Exhausted retries report failure after every attempt was made
#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_report_generic_failure() {
    let assistant = Assistant::new(ScriptedTransport::new(vec![Step::status(429)]));
    let surface = RecordingSurface::new("Summarize quarterly sales data with charts");

    let outcome = assistant.recommend_model(&surface).await;

    assert_eq!(outcome, WorkflowOutcome::Failed);
    assert_eq!(assistant.dispatcher().transport().attempt_count(), 5);
    assert!(!surface.is_busy());
}

/// Test: A retried success still completes normally
#[tokio::test(start_paused = true)]
async fn test_rate_limited_workflow_recovers() {
    let assistant = Assistant::new(ScriptedTransport::rate_limited_then_ok(2, RECOMMENDATION));
    let surface = RecordingSurface::new("Summarize quarterly sales data with charts");

    let outcome = assistant.recommend_model(&surface).await;

    assert!(outcome.is_completed());
    assert_eq!(assistant.dispatcher().transport().attempt_count(), 3);
    assert!(!surface.error_visible());
}

/// Test: A previous failure's error indicator is cleared on the next run
#[tokio::test(start_paused = true)]
async fn test_error_indicator_reset_between_runs() {
    let assistant = Assistant::new(ScriptedTransport::new(vec![
        Step::status(500),
        Step::ok(RECOMMENDATION),
    ]));
    let surface = RecordingSurface::new("Summarize quarterly sales data with charts");

    assert_eq!(assistant.recommend_model(&surface).await, WorkflowOutcome::Failed);
    assert!(surface.error_visible());

    assert!(assistant.recommend_model(&surface).await.is_completed());
    assert!(!surface.error_visible());
    assert_eq!(surface.busy_history(), vec![true, false, true, false]);
}
