use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use shelfscout_enrich::EnrichError;
use tokio::sync::Semaphore;

use super::*;

const ONE_PRODUCT: &str =
    "```json\n[{\"url\":\"https://a.com\",\"website\":\"A\",\"description\":\"d\"}]\n```";

enum Reply {
    Text(&'static str),
    Status(u16),
}

/// Answers by product name. A gated name blocks until its semaphore gets a permit.
#[derive(Default)]
struct ScriptedSource {
    calls: AtomicUsize,
    replies: HashMap<&'static str, Reply>,
    gates: HashMap<&'static str, Arc<Semaphore>>,
    prompts: std::sync::Mutex<Vec<String>>,
}

impl ScriptedSource {
    fn reply(mut self, name: &'static str, reply: Reply) -> Self {
        self.replies.insert(name, reply);
        self
    }

    fn gated(mut self, name: &'static str, reply: Reply) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gates.insert(name, Arc::clone(&gate));
        (self.reply(name, reply), gate)
    }
}

impl SimilarProductSource for ScriptedSource {
    async fn generate(&self, prompt: &str) -> Result<String, EnrichError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_owned());
        let (name, reply) = self
            .replies
            .iter()
            .find(|(name, _)| prompt.contains(*name))
            .expect("prompt for an unscripted product");
        if let Some(gate) = self.gates.get(name) {
            gate.acquire().await.unwrap().forget();
        }
        match reply {
            Reply::Text(text) => Ok((*text).to_owned()),
            Reply::Status(status) => Err(EnrichError::UnexpectedStatus { status: *status }),
        }
    }
}

async fn wait_until_pending<S: SimilarProductSource>(
    orchestrator: &EnrichmentOrchestrator<S>,
    row: usize,
) {
    while orchestrator.row_state(row).await != Some(RowState::Pending) {
        tokio::task::yield_now().await;
    }
}

fn spawn_request(
    orchestrator: &EnrichmentOrchestrator<ScriptedSource>,
    name: &'static str,
    row: usize,
) -> tokio::task::JoinHandle<EnrichmentOutcome> {
    let orchestrator = orchestrator.clone();
    tokio::spawn(async move { orchestrator.request_enrichment(name, row).await })
}

#[tokio::test]
async fn successful_reply_populates_row() {
    let source = ScriptedSource::default().reply("Alpha Jacket", Reply::Text(ONE_PRODUCT));
    let orchestrator = EnrichmentOrchestrator::new(source, MessageSlot::new());

    let outcome = orchestrator.request_enrichment("Alpha Jacket", 4).await;
    assert_eq!(outcome, EnrichmentOutcome::Populated(1));

    let Some(RowState::Populated(products)) = orchestrator.row_state(4).await else {
        panic!("row 4 should be populated");
    };
    assert_eq!(products[0].url(), "https://a.com");
    assert_eq!(products[0].website(), "A");
    assert_eq!(products[0].description(), "d");
    assert!(orchestrator.message().current().await.is_none());
}

#[tokio::test]
async fn empty_array_reply_leaves_row_empty() {
    let source = ScriptedSource::default().reply("Alpha Jacket", Reply::Text("[]"));
    let orchestrator = EnrichmentOrchestrator::new(source, MessageSlot::new());

    let outcome = orchestrator.request_enrichment("Alpha Jacket", 0).await;
    assert_eq!(outcome, EnrichmentOutcome::Empty);
    assert_eq!(orchestrator.row_state(0).await, Some(RowState::Empty));
}

#[tokio::test]
async fn unparseable_reply_leaves_row_empty_without_message() {
    let source = ScriptedSource::default()
        .reply("Alpha Jacket", Reply::Text("Sorry, I can't help with that."));
    let orchestrator = EnrichmentOrchestrator::new(source, MessageSlot::new());

    let outcome = orchestrator.request_enrichment("Alpha Jacket", 0).await;
    assert_eq!(outcome, EnrichmentOutcome::Empty);
    assert!(orchestrator.message().current().await.is_none());
}

#[tokio::test]
async fn double_trigger_makes_one_service_call() {
    let (source, gate) =
        ScriptedSource::default().gated("Alpha Jacket", Reply::Text(ONE_PRODUCT));
    let orchestrator = EnrichmentOrchestrator::new(source, MessageSlot::new());

    let first = spawn_request(&orchestrator, "Alpha Jacket", 0);
    wait_until_pending(&orchestrator, 0).await;

    let second = orchestrator.request_enrichment("Alpha Jacket", 0).await;
    assert_eq!(second, EnrichmentOutcome::AlreadyPending);

    gate.add_permits(1);
    assert_eq!(first.await.unwrap(), EnrichmentOutcome::Populated(1));
    assert_eq!(orchestrator.source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failure_sets_message_and_spares_sibling_row() {
    let (source, gate) =
        ScriptedSource::default().gated("Alpha Jacket", Reply::Text(ONE_PRODUCT));
    let source = source.reply("Beta Scarf", Reply::Status(503));
    let orchestrator = EnrichmentOrchestrator::new(source, MessageSlot::new());

    let sibling = spawn_request(&orchestrator, "Alpha Jacket", 0);
    wait_until_pending(&orchestrator, 0).await;

    let outcome = orchestrator.request_enrichment("Beta Scarf", 1).await;
    let expected =
        "Failed to fetch similar products: enrichment service returned HTTP 503. Please try again.";
    assert_eq!(outcome, EnrichmentOutcome::Failed(expected.to_owned()));
    assert_eq!(orchestrator.row_state(1).await, Some(RowState::Empty));
    assert_eq!(
        orchestrator.message().current().await.as_deref(),
        Some(expected)
    );
    assert_eq!(orchestrator.row_state(0).await, Some(RowState::Pending));

    gate.add_permits(1);
    assert_eq!(sibling.await.unwrap(), EnrichmentOutcome::Populated(1));
    assert!(matches!(
        orchestrator.row_state(0).await,
        Some(RowState::Populated(_))
    ));
}

#[tokio::test]
async fn starting_a_request_clears_previous_message() {
    let source = ScriptedSource::default().reply("Alpha Jacket", Reply::Text("[]"));
    let message = MessageSlot::new();
    message.set("Failed to fetch similar products: boom. Please try again.").await;
    let orchestrator = EnrichmentOrchestrator::new(source, message.clone());

    orchestrator.request_enrichment("Alpha Jacket", 0).await;
    assert!(message.current().await.is_none());
}

#[tokio::test]
async fn reset_discards_late_response() {
    let (source, gate) =
        ScriptedSource::default().gated("Alpha Jacket", Reply::Text(ONE_PRODUCT));
    let orchestrator = EnrichmentOrchestrator::new(source, MessageSlot::new());

    let in_flight = spawn_request(&orchestrator, "Alpha Jacket", 2);
    wait_until_pending(&orchestrator, 2).await;

    orchestrator.reset_all().await;
    assert!(orchestrator.snapshot().await.is_empty());

    gate.add_permits(1);
    assert_eq!(in_flight.await.unwrap(), EnrichmentOutcome::Discarded);
    assert!(orchestrator.row_state(2).await.is_none());
}

#[tokio::test]
async fn reset_allows_immediate_retrigger_of_pending_row() {
    let (source, gate) =
        ScriptedSource::default().gated("Alpha Jacket", Reply::Text(ONE_PRODUCT));
    let orchestrator = EnrichmentOrchestrator::new(source, MessageSlot::new());

    let stale = spawn_request(&orchestrator, "Alpha Jacket", 0);
    wait_until_pending(&orchestrator, 0).await;
    orchestrator.reset_all().await;

    let fresh = spawn_request(&orchestrator, "Alpha Jacket", 0);
    wait_until_pending(&orchestrator, 0).await;

    gate.add_permits(2);
    let mut outcomes = vec![stale.await.unwrap(), fresh.await.unwrap()];
    outcomes.sort_by_key(|o| matches!(o, EnrichmentOutcome::Discarded));
    assert_eq!(
        outcomes,
        [EnrichmentOutcome::Populated(1), EnrichmentOutcome::Discarded]
    );
    assert_eq!(orchestrator.source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn exclude_site_reaches_the_prompt() {
    let source = ScriptedSource::default().reply("Alpha Jacket", Reply::Text("[]"));
    let orchestrator = EnrichmentOrchestrator::new(source, MessageSlot::new())
        .with_exclude_site(Some("shop.example.com"));

    orchestrator.request_enrichment("Alpha Jacket", 0).await;
    let prompts = orchestrator.source.prompts.lock().unwrap().clone();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("other than shop.example.com"));
}
