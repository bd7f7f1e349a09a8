//! End-to-end tests for the reframing pipeline over scripted gateways.
//!
//! The text generator replays canned completions and records every prompt it
//! receives, so the tests can check both results and what was (or was not)
//! sent to the model.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reframe_mind::clients::{CompletionRequest, TextGenerator};
use reframe_mind::config::Config;
use reframe_mind::corpus::{CaseRecord, CaseStore};
use reframe_mind::embeddings::{Embedder, FakeEmbedder};
use reframe_mind::error::{ReframeError, Result};
use reframe_mind::prompts::MISSING_CONTEXT_PLACEHOLDER;
use reframe_mind::server::{ClassifyParams, ControlParams, ReframeParams, ReframeServer, ScoreParams};

struct ScriptedGenerator {
    reply: String,
    fail_on: Option<usize>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail_on: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn failing_on(mut self, call: usize) -> Self {
        self.fail_on = Some(call);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let idx = self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap()
            .push(request.user_prompt.clone());
        if self.fail_on == Some(idx) {
            return Err(ReframeError::Generation {
                message: "gateway unavailable".into(),
            });
        }
        Ok(self.reply.clone())
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

struct DownEmbedder;

#[async_trait]
impl Embedder for DownEmbedder {
    async fn embed(&self, _texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        anyhow::bail!("embedding service unavailable")
    }

    fn dimensions(&self) -> usize {
        0
    }
}

fn exam_record() -> CaseRecord {
    CaseRecord::new("exam", "I will fail", "I can prepare more and try my best")
}

fn server_with(
    records: Vec<CaseRecord>,
    generator: Arc<ScriptedGenerator>,
    embedder: Arc<dyn Embedder>,
) -> ReframeServer {
    ReframeServer::with_gateways(
        Config::default(),
        CaseStore::from_records(records),
        generator,
        embedder,
    )
    .unwrap()
}

#[tokio::test]
async fn exam_scenario_runs_end_to_end() {
    let generator = Arc::new(ScriptedGenerator::new("I can study a little each day."));
    let server = server_with(vec![exam_record()], generator.clone(), Arc::new(DownEmbedder));

    let similar = server.retrieve("I will fail again", "exam", Some(1)).unwrap();
    assert_eq!(similar.cases(), &[exam_record()]);

    let outcome = server
        .reframe(ReframeParams {
            thought: "I will fail again".into(),
            situation: "exam".into(),
            k: Some(1),
        })
        .await
        .unwrap();
    assert_eq!(outcome.candidates.len(), 3);
    assert_eq!(outcome.retrieved_k, 1);
    assert_eq!(outcome.similar_cases.cases(), &[exam_record()]);
    assert_eq!(generator.calls(), 3);
    for prompt in generator.prompts() {
        assert!(prompt.contains("Rational Response: I can prepare more and try my best"));
        assert!(prompt.ends_with("Distorted Thought: I will fail again\nRational Response:"));
    }

    let scores = server
        .score(ScoreParams {
            reframe: "I can prepare more and try my best".into(),
            thought: "I will fail again".into(),
            situation: "exam".into(),
        })
        .await
        .unwrap();
    assert!(scores.actionability >= 0.333);
    assert!(scores.positivity >= 0.25);
    assert_eq!(scores.specificity, 0.5);
}

#[tokio::test]
async fn classify_returns_raw_label() {
    let generator = Arc::new(ScriptedGenerator::new("  Fortune Telling (90%)\n"));
    let server = server_with(vec![], generator.clone(), Arc::new(DownEmbedder));

    let result = server
        .classify(ClassifyParams {
            thought: "I will fail again".into(),
            situation: "exam".into(),
        })
        .await
        .unwrap();
    assert_eq!(result.label_with_confidence, "Fortune Telling (90%)");
    assert_eq!(result.label(), "Fortune Telling");
    assert_eq!(result.confidence_percent(), Some(90.0));
    assert!(generator.prompts()[0].ends_with("Cognitive Distortion:"));
}

#[tokio::test]
async fn one_failed_candidate_fails_the_reframe() {
    let generator = Arc::new(ScriptedGenerator::new("fine").failing_on(2));
    let server = server_with(vec![exam_record()], generator.clone(), Arc::new(DownEmbedder));

    let err = server
        .reframe(ReframeParams {
            thought: "I will fail again".into(),
            situation: "exam".into(),
            k: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ReframeError::Generation { .. }));
}

#[tokio::test]
async fn invalid_input_never_reaches_the_gateway() {
    let generator = Arc::new(ScriptedGenerator::new("unused"));
    let server = server_with(vec![exam_record()], generator.clone(), Arc::new(DownEmbedder));

    let bad_attribute = server
        .control(ControlParams {
            reframe: "I can try".into(),
            attribute: "positivity".into(),
            thought: String::new(),
            situation: String::new(),
        })
        .await
        .unwrap_err();
    assert!(bad_attribute.is_client_error());

    let empty_thought = server
        .reframe(ReframeParams {
            thought: "   ".into(),
            situation: "exam".into(),
            k: None,
        })
        .await
        .unwrap_err();
    assert!(empty_thought.is_client_error());

    let zero_k = server
        .reframe(ReframeParams {
            thought: "I will fail".into(),
            situation: "exam".into(),
            k: Some(0),
        })
        .await
        .unwrap_err();
    assert!(zero_k.is_client_error());

    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn specificity_control_fills_missing_situation() {
    let generator = Arc::new(ScriptedGenerator::new("I can review chapter 3 tonight."));
    let server = server_with(
        vec![exam_record()],
        generator.clone(),
        Arc::new(FakeEmbedder::new(Some(64))),
    );

    let outcome = server
        .control(ControlParams {
            reframe: "I can try".into(),
            attribute: "Specificity".into(),
            thought: "I will fail".into(),
            situation: String::new(),
        })
        .await
        .unwrap();
    assert_eq!(outcome.controlled_reframe, "I can review chapter 3 tonight.");
    assert!((0.0..=1.0).contains(&outcome.attributes.specificity));
    assert_eq!(generator.calls(), 1);

    let prompt = &generator.prompts()[0];
    assert!(prompt.contains(&format!("Situation: {}", MISSING_CONTEXT_PLACEHOLDER)));
    assert!(prompt.contains("Reframe: I can try"));
}

#[tokio::test]
async fn empty_corpus_yields_zero_shot_prompts() {
    let generator = Arc::new(ScriptedGenerator::new("It is one exam, not every exam."));
    let server = server_with(vec![], generator.clone(), Arc::new(DownEmbedder));

    let outcome = server
        .reframe(ReframeParams {
            thought: "I will fail again".into(),
            situation: "exam".into(),
            k: Some(5),
        })
        .await
        .unwrap();
    assert!(outcome.similar_cases.is_empty());
    assert_eq!(outcome.retrieved_k, 5);
    assert_eq!(outcome.candidates.len(), 3);
    assert_eq!(
        generator.prompts()[0],
        "Situation: exam\nDistorted Thought: I will fail again\nRational Response:"
    );
}
