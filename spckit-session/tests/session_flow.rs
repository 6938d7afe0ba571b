use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream;
use spckit_adapters::recommend::{FAILURE_MESSAGE, RecommendationClient};
use spckit_adapters::traits::{
    AdapterError, AdapterMetadata, AdapterResult, AdapterStream, InferenceChunk, InferenceRequest,
    ModelAdapter,
};
use spckit_primitives::{BuildCategory, ChatRole, ChatTurn, Component, SessionId};
use spckit_session::{
    IgnoreReason, RecommendationSession, SelectedParts, SessionConfig, SessionObserver,
    StageAdvance, SubmitOutcome,
};
use tokio::sync::Notify;

const GAMING_REPLY: &str = r#"{
    "analysis": "150만원 예산이라면 라이젠 7 7800X3D 중심의 구성이 좋습니다.",
    "components": [
        {"category": "CPU", "name": "AMD 라이젠 7 7800X3D", "price": "약 450,000원", "features": ["8코어 16스레드", "3D V-Cache"]},
        {"category": "GPU", "name": "RTX 4070 SUPER", "price": "약 850,000원", "features": ["12GB GDDR6X"]},
        {"category": "RAM", "name": "DDR5 32GB", "price": "약 120,000원"}
    ]
}"#;

type Reply = Result<String, AdapterError>;

/// Adapter that answers from a queue and records every request.
struct ScriptedAdapter {
    metadata: AdapterMetadata,
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<InferenceRequest>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedAdapter {
    fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            metadata: AdapterMetadata::new("scripted", "scripted-model"),
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    fn gated(replies: impl IntoIterator<Item = Reply>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(replies)
        }
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn last_request_text(&self) -> String {
        let requests = self.requests.lock().unwrap();
        requests.last().unwrap().messages()[0].content().to_owned()
    }
}

#[async_trait]
impl ModelAdapter for ScriptedAdapter {
    fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    async fn infer(&self, request: InferenceRequest) -> AdapterResult<AdapterStream> {
        self.requests.lock().unwrap().push(request);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AdapterError::transport("script exhausted")));
        let text = reply?;
        let chunks: Vec<AdapterResult<InferenceChunk>> = vec![Ok(InferenceChunk::new(text, true))];
        Ok(Box::pin(stream::iter(chunks)))
    }
}

#[derive(Default)]
struct RecordingObserver {
    loading: Mutex<Vec<bool>>,
    errors: Mutex<Vec<String>>,
    totals: Mutex<Vec<u64>>,
    stages: Mutex<Vec<(Option<BuildCategory>, bool)>>,
}

impl SessionObserver for RecordingObserver {
    fn on_loading_changed(&self, _session: SessionId, loading: bool) {
        self.loading.lock().unwrap().push(loading);
    }

    fn on_error(&self, _session: SessionId, message: &str) {
        self.errors.lock().unwrap().push(message.to_owned());
    }

    fn on_selected_parts_changed(&self, _session: SessionId, _parts: &SelectedParts, total: u64) {
        self.totals.lock().unwrap().push(total);
    }

    fn on_stage_changed(&self, _session: SessionId, stage: Option<BuildCategory>, complete: bool) {
        self.stages.lock().unwrap().push((stage, complete));
    }
}

fn session_with(
    adapter: Arc<ScriptedAdapter>,
    config: SessionConfig,
) -> (RecommendationSession, Arc<RecordingObserver>) {
    let client = Arc::new(RecommendationClient::new(adapter));
    let observer = Arc::new(RecordingObserver::default());
    let session = RecommendationSession::with_observer(client, config, observer.clone());
    (session, observer)
}

fn ok(text: &str) -> Reply {
    Ok(text.to_owned())
}

#[tokio::test]
async fn gaming_prompt_select_and_remove() {
    let adapter = Arc::new(ScriptedAdapter::new([ok(GAMING_REPLY)]));
    let (session, observer) = session_with(adapter.clone(), SessionConfig::default());

    let outcome = session
        .submit_message("  150만원 예산으로 게이밍 PC를 맞추고 싶어요.  ")
        .await;
    let SubmitOutcome::Answered { candidates } = outcome else {
        panic!("expected an answer, got {outcome:?}");
    };
    // The RAM entry lacks `features` and is dropped.
    assert_eq!(candidates.len(), 2);
    assert_eq!(session.candidates(), candidates);

    let history = session.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0], ChatTurn::user("150만원 예산으로 게이밍 PC를 맞추고 싶어요."));
    assert_eq!(history[1].role(), ChatRole::Model);
    assert!(!history[1].is_pending());
    assert!(history[1].text().contains("7800X3D"));
    assert!(!session.is_loading());
    assert_eq!(*observer.loading.lock().unwrap(), vec![true, false]);

    let cpu = candidates
        .iter()
        .find(|c| c.category() == "CPU")
        .cloned()
        .unwrap();
    session.select_component(cpu);
    assert_eq!(session.total_price(), 450_000);

    assert!(session.remove_component("cpu"));
    assert_eq!(session.total_price(), 0);
    assert!(!session.remove_component("cpu"));
    assert_eq!(*observer.totals.lock().unwrap(), vec![450_000, 0]);
}

#[tokio::test]
async fn blank_messages_are_ignored() {
    let adapter = Arc::new(ScriptedAdapter::new(Vec::<Reply>::new()));
    let (session, _) = session_with(adapter.clone(), SessionConfig::default());

    assert_eq!(
        session.submit_message("   \n").await,
        SubmitOutcome::Ignored(IgnoreReason::Empty)
    );
    assert!(session.history().is_empty());
    assert_eq!(adapter.request_count(), 0);
}

#[tokio::test]
async fn network_failure_appends_localized_message() {
    let adapter = Arc::new(ScriptedAdapter::new([
        ok(GAMING_REPLY),
        Err(AdapterError::transport("connection reset")),
    ]));
    let (session, observer) = session_with(adapter, SessionConfig::default());

    session.submit_message("게이밍 PC").await;
    let first = session.candidates();
    session.select_component(first[0].clone());
    let before = session.selected_parts();

    let outcome = session.submit_message("조금 더 저렴하게").await;
    assert_eq!(
        outcome,
        SubmitOutcome::Failed {
            message: FAILURE_MESSAGE.to_owned()
        }
    );

    let history = session.history();
    assert_eq!(history.len(), 4);
    assert_eq!(history[3], ChatTurn::model(FAILURE_MESSAGE));
    assert!(!session.is_loading());
    assert_eq!(session.selected_parts(), before);
    assert_eq!(session.candidates(), first);
    assert_eq!(*observer.errors.lock().unwrap(), vec![FAILURE_MESSAGE.to_owned()]);
}

#[tokio::test]
async fn malformed_reply_is_reported_like_a_network_failure() {
    let adapter = Arc::new(ScriptedAdapter::new([ok("죄송합니다. 다시 말씀해주세요.")]));
    let (session, _) = session_with(adapter, SessionConfig::default());

    let outcome = session.submit_message("사무용 PC").await;
    assert!(matches!(outcome, SubmitOutcome::Failed { .. }));
    assert_eq!(session.history()[1].text(), FAILURE_MESSAGE);
}

#[tokio::test]
async fn submit_while_awaiting_is_rejected() {
    let gate = Arc::new(Notify::new());
    let adapter = Arc::new(ScriptedAdapter::gated([ok(GAMING_REPLY)], gate.clone()));
    let (session, _) = session_with(adapter.clone(), SessionConfig::default());
    let session = Arc::new(session);

    let first = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.submit_message("첫 번째 요청").await }
    });
    while adapter.request_count() == 0 {
        tokio::task::yield_now().await;
    }
    assert!(session.is_loading());

    let second = session.submit_message("두 번째 요청").await;
    assert_eq!(second, SubmitOutcome::Ignored(IgnoreReason::Busy));
    assert_eq!(session.history().len(), 2);
    assert_eq!(adapter.request_count(), 1);

    gate.notify_one();
    let outcome = first.await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Answered { .. }));
    assert_eq!(session.history().len(), 2);
}

#[tokio::test]
async fn reset_discards_reply_in_flight() {
    let gate = Arc::new(Notify::new());
    let adapter = Arc::new(ScriptedAdapter::gated([ok(GAMING_REPLY)], gate.clone()));
    let (session, observer) = session_with(adapter.clone(), SessionConfig::default());
    let session = Arc::new(session);

    let pending = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.submit_message("게이밍 PC").await }
    });
    while adapter.request_count() == 0 {
        tokio::task::yield_now().await;
    }

    session.reset();
    assert!(session.history().is_empty());
    assert!(!session.is_loading());

    gate.notify_one();
    assert_eq!(pending.await.unwrap(), SubmitOutcome::Discarded);
    assert!(session.history().is_empty());
    assert!(session.candidates().is_empty());
    assert_eq!(observer.loading.lock().unwrap().last(), Some(&false));
}

#[tokio::test]
async fn aborted_submit_returns_session_to_idle() {
    let gate = Arc::new(Notify::new());
    let adapter = Arc::new(ScriptedAdapter::gated([ok(GAMING_REPLY)], gate.clone()));
    let (session, observer) = session_with(adapter.clone(), SessionConfig::default());
    let session = Arc::new(session);

    let task = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.submit_message("첫 번째 요청").await }
    });
    while adapter.request_count() == 0 {
        tokio::task::yield_now().await;
    }
    assert!(session.is_loading());

    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());

    assert!(!session.is_loading());
    let history = session.history();
    assert_eq!(history.len(), 2);
    assert!(!history[1].is_pending());
    assert_eq!(history[1].text(), FAILURE_MESSAGE);
    assert_eq!(*observer.errors.lock().unwrap(), vec![FAILURE_MESSAGE.to_owned()]);
    assert_eq!(*observer.loading.lock().unwrap(), vec![true, false]);

    gate.notify_one();
    let retry = session.submit_message("다시 요청").await;
    assert!(matches!(retry, SubmitOutcome::Answered { .. }));
    assert_eq!(session.history().len(), 4);
    assert_eq!(observer.loading.lock().unwrap().last(), Some(&false));
}

#[tokio::test]
async fn reset_issues_a_fresh_session_id() {
    let gate = Arc::new(Notify::new());
    let adapter = Arc::new(ScriptedAdapter::gated([ok(GAMING_REPLY)], gate.clone()));
    let (session, _) = session_with(adapter.clone(), SessionConfig::default());
    let session = Arc::new(session);
    let before = session.id();

    let pending = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.submit_message("게이밍 PC").await }
    });
    while adapter.request_count() == 0 {
        tokio::task::yield_now().await;
    }

    session.reset();
    let after = session.id();
    assert_ne!(before, after);
    assert_eq!(session.snapshot().id, after);

    gate.notify_one();
    assert_eq!(pending.await.unwrap(), SubmitOutcome::Discarded);
    assert_eq!(session.id(), after);
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn guided_build_walks_stages_and_scopes_requests() {
    let mainboard = r#"{"analysis": "B650 보드를 추천합니다.", "components": [
        {"category": "Motherboard", "name": "B650M 박격포", "price": "약 250,000원", "features": ["mATX"]},
        {"category": "CPU", "name": "라이젠 5 7600", "price": "약 250,000원", "features": []}
    ]}"#;
    let adapter = Arc::new(ScriptedAdapter::new([ok(GAMING_REPLY), ok(mainboard)]));
    let (session, observer) =
        session_with(adapter.clone(), SessionConfig::default().with_guided_build(true));

    assert_eq!(session.current_stage(), Some(BuildCategory::Cpu));
    let SubmitOutcome::Answered { candidates } = session.submit_message("게이밍용 CPU").await else {
        panic!("expected an answer");
    };
    assert!(adapter.last_request_text().contains("CPU 단계"));
    // Only the CPU survives the stage filter.
    assert_eq!(candidates.len(), 1);

    assert_eq!(
        session.advance_stage(),
        StageAdvance::Next(BuildCategory::Mainboard)
    );
    let SubmitOutcome::Answered { candidates } = session.submit_message("메인보드 추천").await
    else {
        panic!("expected an answer");
    };
    assert!(adapter.last_request_text().contains("메인보드 단계"));
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].name(), "B650M 박격포");

    let mut visited = vec![BuildCategory::Cpu, BuildCategory::Mainboard];
    while let StageAdvance::Next(category) = session.advance_stage() {
        visited.push(category);
    }
    assert_eq!(visited, BuildCategory::ALL);
    assert!(session.is_build_complete());
    assert_eq!(session.current_stage(), None);
    assert_eq!(session.advance_stage(), StageAdvance::Complete);
    assert_eq!(observer.stages.lock().unwrap().last(), Some(&(None, true)));

    session.reset();
    assert_eq!(session.current_stage(), Some(BuildCategory::Cpu));
    assert!(!session.is_build_complete());
}

#[tokio::test]
async fn stage_advance_is_disabled_without_guided_build() {
    let adapter = Arc::new(ScriptedAdapter::new(Vec::<Reply>::new()));
    let (session, _) = session_with(adapter, SessionConfig::default());
    assert_eq!(session.advance_stage(), StageAdvance::Disabled);
    assert_eq!(session.current_stage(), None);
}

#[tokio::test]
async fn off_stage_selection_is_allowed() {
    let adapter = Arc::new(ScriptedAdapter::new(Vec::<Reply>::new()));
    let (session, _) =
        session_with(adapter, SessionConfig::default().with_guided_build(true));

    session.select_component(Component::new("케이스", "리안리 O11", "약 180,000원", vec![]));
    session.select_component(Component::new("Case", "NZXT H5", "약 120,000원", vec![]));
    assert_eq!(session.selected_parts().len(), 1);
    assert_eq!(session.total_price(), 120_000);
    assert_eq!(session.current_stage(), Some(BuildCategory::Cpu));
}

#[tokio::test]
async fn snapshot_serializes_state() {
    let adapter = Arc::new(ScriptedAdapter::new([ok(GAMING_REPLY)]));
    let (session, _) = session_with(adapter, SessionConfig::default());
    session.submit_message("게이밍 PC").await;
    session.select_component(session.candidates()[1].clone());

    let snapshot = session.snapshot();
    assert_eq!(snapshot.id, session.id());
    assert_eq!(snapshot.total_price, 850_000);

    let value = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(value["state"], "idle");
    assert_eq!(value["history"][0]["role"], "user");
    assert_eq!(value["selected_parts"]["entries"][0]["name"], "RTX 4070 SUPER");
}
