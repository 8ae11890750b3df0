//! Workflow controller tests against a scripted service.

#![allow(clippy::expect_used)]

mod common;

use common::{Call, Reply, ScriptedService, controller, file_controller, numbered_chunks};
use ragflow::client::{LoadResponse, QueryResponse};
use ragflow::core::{BufferSlot, MemoryChunk, Phase, Settings, SplittingMethod, SubmitLabel};
use ragflow::tokens::{EstimateCounter, TokenCounter};
use ragflow::workflow::LOADING_PLACEHOLDER;
use tempfile::TempDir;

fn query_reply(context: &str, completion: &str, memories: Vec<MemoryChunk>) -> QueryResponse {
    QueryResponse {
        context: context.to_string(),
        completion: completion.to_string(),
        memories,
    }
}

#[tokio::test]
async fn test_new_session_gets_fresh_id() {
    let controller = controller(ScriptedService::new());
    let id = controller.session_id();
    assert!(id.as_str().starts_with("user_"));
    assert_eq!(id.as_str().len(), 17);
    assert_eq!(controller.phase(), Phase::Chunk);
    assert_eq!(controller.submit_label(), SubmitLabel::Process);
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn test_split_replaces_chunks_in_order() {
    let controller = controller(ScriptedService::new().with_chunks(numbered_chunks(4)));
    controller.edit_text(BufferSlot::First, "some source text");

    let outcome = controller.split().await;

    assert!(outcome.is_completed());
    let chunks = controller.chunks();
    assert_eq!(chunks.all(), numbered_chunks(4).as_slice());
    assert!(chunks.used().is_empty());
    assert_eq!(controller.phase(), Phase::Prompt);
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn test_split_clears_used_chunks() {
    let service = ScriptedService::new().with_chunks(numbered_chunks(3));
    service.set_query(Reply::Ok(query_reply("c", "done", numbered_chunks(1))));
    let controller = controller(service);

    controller.split().await;
    controller.query().await;
    assert_eq!(controller.chunks().used().len(), 1);

    controller.split().await;
    assert!(controller.chunks().used().is_empty());
    assert_eq!(controller.chunks().all().len(), 3);
}

#[tokio::test]
async fn test_split_request_payload() {
    let controller = controller(ScriptedService::new());
    controller.edit_text(BufferSlot::First, "first");
    controller.edit_text(BufferSlot::Second, "second");
    controller.update_settings(|s| {
        s.max_tokens_per_line = "64".to_string();
        s.max_tokens_per_paragraph = "256".to_string();
        s.overlap_tokens = "8".to_string();
    });

    controller.split().await;

    let requests = controller.service().split_requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.session_id, controller.session_id());
    assert_eq!(request.files[0].name, "file1");
    assert_eq!(request.files[0].content, "first");
    assert_eq!(request.files[1].name, "file2");
    assert_eq!(request.files[1].content, "second");
    assert_eq!(request.max_tokens_per_line, Some(64));
    assert_eq!(request.max_tokens_per_paragraph, Some(64));
    assert_eq!(request.overlap_tokens, Some(8));
    assert_eq!(request.method, SplittingMethod::SkTiktoken);
}

#[tokio::test]
async fn test_paragraph_split_sends_word_count() {
    let controller = controller(ScriptedService::new());
    controller.update_settings(|s| {
        s.method = SplittingMethod::Paragraph;
        s.max_tokens_per_line = "10".to_string();
        s.word_count = "120".to_string();
    });

    controller.split().await;

    let requests = controller.service().split_requests();
    let request = &requests[0];
    assert_eq!(request.max_tokens_per_paragraph, Some(120));
    assert_eq!(request.method, SplittingMethod::Paragraph);
}

#[tokio::test]
async fn test_paragraph_words_split_sends_line_cap() {
    let controller = controller(ScriptedService::new());
    controller.update_settings(|s| {
        s.method = SplittingMethod::ParagraphWords;
        s.max_tokens_per_line = "10".to_string();
        s.max_tokens_per_paragraph = "300".to_string();
        s.word_count = "80".to_string();
    });

    controller.split().await;

    let requests = controller.service().split_requests();
    assert_eq!(requests[0].max_tokens_per_paragraph, Some(10));
}

#[tokio::test]
async fn test_split_failure_keeps_previous_chunks() {
    let controller = controller(ScriptedService::new().with_chunks(numbered_chunks(2)));
    controller.split().await;
    controller.set_phase(Phase::Context);

    controller.service().set_split(Reply::Fail);
    let outcome = controller.split().await;

    assert!(outcome.error().is_some());
    assert_eq!(controller.chunks().all(), numbered_chunks(2).as_slice());
    assert_eq!(controller.phase(), Phase::Context);
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn test_split_while_busy_is_noop() {
    let controller = controller(ScriptedService::new().with_chunks(numbered_chunks(2)));
    let gate = controller.service().hold_calls();

    let (first, second) = tokio::join!(controller.split(), async {
        tokio::task::yield_now().await;
        assert!(controller.is_busy());
        let outcome = controller.split().await;
        gate.notify_one();
        outcome
    });

    assert!(first.is_completed());
    assert!(second.is_skipped());
    assert_eq!(controller.service().split_requests().len(), 1);
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn test_query_while_split_in_flight_is_noop() {
    let controller = controller(ScriptedService::new().with_chunks(numbered_chunks(2)));
    let gate = controller.service().hold_calls();

    let (split, (query, load)) = tokio::join!(controller.split(), async {
        tokio::task::yield_now().await;
        let query = controller.query().await;
        let load = controller.load_document().await;
        gate.notify_one();
        (query, load)
    });

    assert!(split.is_completed());
    assert!(query.is_skipped());
    assert!(load.is_skipped());
    assert_eq!(controller.service().calls().len(), 1);
    assert_eq!(controller.submit_label(), SubmitLabel::Process);
}

#[tokio::test]
async fn test_split_scenario_token_based() {
    let service = ScriptedService::new().with_chunks(vec![
        MemoryChunk::new("0", "a b c d e f", 6),
        MemoryChunk::new("1", "g h i j k l", 6),
    ]);
    let controller = controller(service);
    controller.update_settings(|s| {
        s.method = SplittingMethod::Sk;
        s.max_tokens_per_line = "10".to_string();
    });
    controller.edit_text(BufferSlot::First, "a b c d e f g h i j k l");
    controller.edit_text(BufferSlot::Second, "");
    let gate = controller.service().hold_calls();

    let (outcome, busy_during) = tokio::join!(controller.split(), async {
        tokio::task::yield_now().await;
        let busy = controller.is_busy();
        gate.notify_one();
        busy
    });

    assert!(outcome.is_completed());
    assert!(busy_during);
    assert!(!controller.is_busy());
    assert_eq!(controller.service().split_requests().len(), 1);
    let texts: Vec<_> = controller
        .chunks()
        .all()
        .iter()
        .map(|c| c.text.clone())
        .collect();
    assert_eq!(texts, vec!["a b c d e f", "g h i j k l"]);
}

#[tokio::test]
async fn test_load_context_takes_first_chunks() {
    let controller = controller(ScriptedService::new().with_chunks(numbered_chunks(5)));
    controller.split().await;
    controller.update_settings(|s| s.chunks = "3".to_string());

    assert!(controller.load_context());

    let buffers = controller.buffers();
    assert_eq!(buffers.context, "chunk-1\n\nchunk-2\n\nchunk-3\n\n");
    let counts = controller.counts();
    assert_eq!(counts.context, EstimateCounter.count(&buffers.context));
}

#[tokio::test]
async fn test_load_context_limit_past_end_takes_all() {
    let controller = controller(ScriptedService::new().with_chunks(numbered_chunks(2)));
    controller.split().await;
    controller.update_settings(|s| s.chunks = "10".to_string());

    assert!(controller.load_context());
    assert_eq!(controller.buffers().context, "chunk-1\n\nchunk-2\n\n");
}

#[tokio::test]
async fn test_load_context_noop_cases() {
    let controller = controller(ScriptedService::new().with_chunks(numbered_chunks(5)));
    controller.edit_context("unchanged");

    // empty store
    assert!(!controller.load_context());

    controller.split().await;
    for limit in ["0", "-2", "abc", ""] {
        controller.update_settings(|s| s.chunks = limit.to_string());
        assert!(!controller.load_context(), "limit {limit:?} should be a no-op");
        assert_eq!(controller.buffers().context, "unchanged");
    }
}

#[tokio::test]
async fn test_split_does_not_load_context() {
    let controller = controller(ScriptedService::new().with_chunks(numbered_chunks(3)));
    controller.split().await;
    assert!(controller.buffers().context.is_empty());
}

#[tokio::test]
async fn test_query_success() {
    let used = vec![MemoryChunk::new("2", "chunk-2", 2)];
    let service = ScriptedService::new().with_chunks(numbered_chunks(3));
    service.set_query(Reply::Ok(query_reply("chunk-2\n\n", "the answer", used.clone())));
    let controller = controller(service);
    controller.split().await;
    controller.edit_prompt("what?");

    let outcome = controller.query().await;

    assert!(outcome.is_completed());
    let buffers = controller.buffers();
    assert_eq!(buffers.context, "chunk-2\n\n");
    assert_eq!(buffers.completion, "the answer");
    assert_eq!(controller.chunks().used(), used.as_slice());
    assert_eq!(controller.chunks().all().len(), 3);
    assert_eq!(controller.phase(), Phase::Completion);
    assert_eq!(controller.submit_label(), SubmitLabel::Submit);

    let counts = controller.counts();
    assert_eq!(counts.completion, EstimateCounter.count("the answer"));
    assert_eq!(counts.prompt, EstimateCounter.count("what?chunk-2\n\n"));
}

#[tokio::test]
async fn test_query_label_busy_while_running() {
    let service = ScriptedService::new();
    service.set_query(Reply::Ok(query_reply("", "ok", Vec::new())));
    let controller = controller(service);
    let gate = controller.service().hold_calls();

    let (_, label) = tokio::join!(controller.query(), async {
        tokio::task::yield_now().await;
        let label = controller.submit_label();
        gate.notify_one();
        label
    });

    assert_eq!(label, SubmitLabel::Busy);
    assert_eq!(controller.submit_label(), SubmitLabel::Submit);
}

#[tokio::test]
async fn test_query_request_parses_numbers() {
    let controller = controller(ScriptedService::new());
    controller.edit_prompt("hello");
    controller.update_settings(|s| {
        s.chunks = "4 chunks".to_string();
        s.relevance = "high".to_string();
        s.max_tokens = "200".to_string();
        s.temperature = ".5".to_string();
    });

    controller.query().await;

    let requests = controller.service().query_requests();
    let request = &requests[0];
    assert_eq!(request.collection, controller.session_id());
    assert_eq!(request.prompt, "hello");
    assert_eq!(request.limit, Some(4));
    assert_eq!(request.relevance, None);
    assert_eq!(request.max_tokens, Some(200));
    assert_eq!(request.temperature, Some(0.5));
}

#[tokio::test]
async fn test_query_failure_mutates_nothing() {
    let service = ScriptedService::new().with_chunks(numbered_chunks(2));
    service.set_query(Reply::Fail);
    let controller = controller(service);
    controller.split().await;
    controller.edit_context("kept context");
    let before = controller.snapshot_state();

    let outcome = controller.query().await;

    assert!(outcome.error().is_some());
    let after = controller.snapshot_state();
    assert_eq!(after.buffers, before.buffers);
    assert_eq!(after.chunks, before.chunks);
    assert_eq!(after.phase, Phase::Prompt);
    assert_eq!(after.submit_label, SubmitLabel::Submit);
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn test_load_document_replaces_first_text() {
    let service = ScriptedService::new();
    service.set_load(Reply::Ok(LoadResponse {
        content: "document body".to_string(),
    }));
    let controller = controller(service);
    controller.edit_text(BufferSlot::Second, "untouched");
    controller.update_settings(|s| s.url = "https://example.com/doc".to_string());
    let gate = controller.service().hold_calls();

    let (outcome, url_during) = tokio::join!(controller.load_document(), async {
        tokio::task::yield_now().await;
        let url = controller.settings().url;
        gate.notify_one();
        url
    });

    assert!(outcome.is_completed());
    assert_eq!(url_during, LOADING_PLACEHOLDER);
    assert_eq!(controller.settings().url, "");
    let buffers = controller.buffers();
    assert_eq!(buffers.text1, "document body");
    assert_eq!(buffers.text2, "untouched");
    assert_eq!(controller.counts().text1, EstimateCounter.count("document body"));

    let calls = controller.service().calls();
    let Call::Load(request) = &calls[0] else {
        unreachable!("expected a load call");
    };
    assert_eq!(request.url, "https://example.com/doc");
}

#[tokio::test]
async fn test_load_document_failure_clears_url() {
    let service = ScriptedService::new();
    service.set_load(Reply::Fail);
    let controller = controller(service);
    controller.edit_text(BufferSlot::First, "original");
    controller.update_settings(|s| s.url = "https://example.com/missing".to_string());

    let outcome = controller.load_document().await;

    assert!(outcome.error().is_some());
    assert_eq!(controller.settings().url, "");
    assert_eq!(controller.buffers().text1, "original");
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn test_load_and_split() {
    let controller = controller(ScriptedService::new().with_chunks(numbered_chunks(2)));

    let outcome = controller.load_and_split("sample one", "sample two").await;

    assert!(outcome.is_completed());
    let requests = controller.service().split_requests();
    let request = &requests[0];
    assert_eq!(request.files[0].content, "sample one");
    assert_eq!(request.files[1].content, "sample two");
    assert_eq!(controller.phase(), Phase::Prompt);
}

#[tokio::test]
async fn test_load_and_split_while_busy_changes_nothing() {
    let controller = controller(ScriptedService::new());
    controller.edit_text(BufferSlot::First, "kept");
    let gate = controller.service().hold_calls();

    let (_, skipped) = tokio::join!(controller.split(), async {
        tokio::task::yield_now().await;
        let outcome = controller.load_and_split("new one", "new two").await;
        gate.notify_one();
        outcome
    });

    assert!(skipped.is_skipped());
    assert_eq!(controller.buffers().text1, "kept");
}

#[tokio::test]
async fn test_reset_reinitializes_everything() {
    let service = ScriptedService::new().with_chunks(numbered_chunks(3));
    service.set_query(Reply::Ok(query_reply("ctx", "done", numbered_chunks(1))));
    let controller = controller(service);
    controller.edit_text(BufferSlot::First, "one");
    controller.edit_text(BufferSlot::Second, "two");
    controller.update_settings(|s| s.chunks = "7".to_string());
    controller.split().await;
    controller.edit_prompt("question");
    controller.query().await;
    let old = controller.session_id();

    let new = controller.reset().await;

    assert_ne!(new, old);
    assert_eq!(controller.session_id(), new);
    assert_eq!(controller.settings(), Settings::default());
    let buffers = controller.buffers();
    assert!(buffers.is_empty());
    assert!(controller.counts().is_zero());
    assert!(controller.chunks().is_empty());
    assert_eq!(controller.phase(), Phase::Chunk);
    assert_eq!(controller.submit_label(), SubmitLabel::Process);
    assert!(!controller.is_busy());

    let calls = controller.service().calls();
    assert_eq!(calls.last(), Some(&Call::Reset(old)));
}

#[tokio::test]
async fn test_reset_twice_differs_only_in_session() {
    let service = ScriptedService::new().with_chunks(numbered_chunks(3));
    service.set_query(Reply::Ok(query_reply("ctx", "done", numbered_chunks(1))));
    let controller = controller(service);
    controller.edit_text(BufferSlot::First, "one");
    controller.edit_text(BufferSlot::Second, "two");
    controller.split().await;
    controller.load_context();
    controller.edit_prompt("question");
    controller.query().await;

    let first_id = controller.reset().await;
    let first = controller.snapshot_state();
    controller.edit_text(BufferSlot::First, "typed after the first reset");
    let second_id = controller.reset().await;
    let mut second = controller.snapshot_state();

    assert_ne!(first_id, second_id);
    assert_eq!(second.session_id, second_id);
    second.session_id = first.session_id.clone();
    assert_eq!(second, first);

    let resets: Vec<_> = controller
        .service()
        .calls()
        .into_iter()
        .filter(|call| matches!(call, Call::Reset(_)))
        .collect();
    assert_eq!(resets.len(), 2);
    assert_eq!(resets[1], Call::Reset(first_id));
}

#[tokio::test]
async fn test_reset_survives_remote_failure() {
    let service = ScriptedService::new().with_chunks(numbered_chunks(2));
    service.fail_reset();
    let controller = controller(service);
    controller.edit_text(BufferSlot::First, "text");
    controller.split().await;
    let old = controller.session_id();

    let new = controller.reset().await;

    assert_ne!(new, old);
    assert!(controller.chunks().is_empty());
    assert!(controller.buffers().is_empty());
    assert_eq!(controller.phase(), Phase::Chunk);
}

#[tokio::test]
async fn test_reset_not_gated_by_busy() {
    let controller = controller(ScriptedService::new().with_chunks(numbered_chunks(2)));
    let gate = controller.service().hold_calls();

    let (_, busy_after_reset) = tokio::join!(controller.split(), async {
        tokio::task::yield_now().await;
        controller.reset().await;
        let busy = controller.is_busy();
        gate.notify_one();
        busy
    });

    assert!(!busy_after_reset);
    assert!(!controller.is_busy());
    // the reset ran even though a split was in flight
    assert!(
        controller
            .service()
            .calls()
            .iter()
            .any(|call| matches!(call, Call::Reset(_)))
    );
}

#[tokio::test]
async fn test_edit_context_leaves_prompt_count_stale() {
    let controller = controller(ScriptedService::new());
    controller.edit_prompt("prompt text");
    let prompt_before = controller.counts().prompt;

    controller.edit_context("a much longer context that adds many tokens to the total");

    let counts = controller.counts();
    assert_eq!(counts.prompt, prompt_before);
    assert_eq!(
        counts.context,
        EstimateCounter.count("a much longer context that adds many tokens to the total")
    );

    controller.edit_prompt("prompt text");
    assert!(controller.counts().prompt > prompt_before);
}

#[tokio::test]
async fn test_update_token_counts_refreshes_all() {
    let controller = controller(ScriptedService::new());
    controller.edit_prompt("abcd");
    controller.edit_context("efgh");

    let counts = controller.update_token_counts();

    assert_eq!(counts.prompt, EstimateCounter.count("abcdefgh"));
    assert_eq!(counts.context, 1);
}

#[tokio::test]
async fn test_edit_text_refreshes_both_source_counts() {
    let controller = controller(ScriptedService::new());
    controller.edit_text(BufferSlot::First, "12345678");
    controller.edit_text(BufferSlot::Second, "1234");

    let counts = controller.counts();
    assert_eq!(counts.text1, 2);
    assert_eq!(counts.text2, 1);
    assert_eq!(counts.source_total(), 3);
}

#[tokio::test]
async fn test_load_sample_prompt_refreshes_counts() {
    let controller = controller(ScriptedService::new());
    controller.edit_context("ctx!");

    controller.load_sample_prompt("sample");

    assert_eq!(controller.settings().prompt, "sample");
    assert_eq!(controller.counts().prompt, EstimateCounter.count("samplectx!"));
}

#[tokio::test]
async fn test_phase_navigation_is_free() {
    let controller = controller(ScriptedService::new());
    for phase in [Phase::Completion, Phase::Chunk, Phase::Context, Phase::Prompt] {
        controller.set_phase(phase);
        assert_eq!(controller.phase(), phase);
    }
}

#[tokio::test]
async fn test_state_survives_reopen() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("state.db");

    let session = {
        let service = ScriptedService::new().with_chunks(numbered_chunks(2));
        let controller = file_controller(service, &path);
        controller.edit_text(BufferSlot::First, "persisted one");
        controller.edit_text(BufferSlot::Second, "persisted two");
        controller.update_settings(|s| s.method = SplittingMethod::Paragraph);
        controller.split().await;
        controller.edit_context("not persisted");
        controller.session_id()
    };

    let reopened = file_controller(ScriptedService::new(), &path);
    assert_eq!(reopened.session_id(), session);
    assert_eq!(reopened.settings().method, SplittingMethod::Paragraph);
    let buffers = reopened.buffers();
    assert_eq!(buffers.text1, "persisted one");
    assert_eq!(buffers.text2, "persisted two");
    assert!(buffers.context.is_empty());
    assert!(reopened.chunks().is_empty());
    assert_eq!(reopened.counts().text1, EstimateCounter.count("persisted one"));
}

#[tokio::test]
async fn test_reset_persists_new_session() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("state.db");

    let new = {
        let controller = file_controller(ScriptedService::new(), &path);
        controller.edit_text(BufferSlot::First, "to be cleared");
        controller.update_settings(|s| s.chunks = "9".to_string());
        controller.reset().await
    };

    let reopened = file_controller(ScriptedService::new(), &path);
    assert_eq!(reopened.session_id(), new);
    assert_eq!(reopened.settings(), Settings::default());
    assert!(reopened.buffers().text1.is_empty());
}

#[tokio::test]
async fn test_status_snapshot() {
    let controller = controller(ScriptedService::new().with_chunks(numbered_chunks(3)));
    controller.split().await;

    let status = controller.status();

    assert_eq!(status.session_id, controller.session_id());
    assert_eq!(status.phase, Phase::Prompt);
    assert!(!status.busy);
    assert_eq!(status.all_chunks.count, 3);
    assert_eq!(status.all_chunks.tokens, 6);
    assert_eq!(status.used_chunks.count, 0);
}
