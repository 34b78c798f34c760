//! Integration tests for the orchestrator: play outcomes, recovery
//! classes, the mines claim, registration and points.
//!
//! All tests run with `start_paused = true`, so every backend pause
//! (including the 1.8h ban cooldown) resolves instantly.

use std::sync::Arc;
use std::time::Duration;

use arcade_pilot_games::{
    BAN_COOLDOWN, GameBook, GameCall, GameError, MINES_CLAIM_DATA, Orchestrator, PlayOutcome,
    PlaySettings,
};
use arcade_pilot_pace::RetryPolicy;
use arcade_pilot_protocol::RpcRequest;
use arcade_pilot_session::{SessionClient, SessionConfig, SessionError, SessionStore, Signer};
use arcade_pilot_transport::Method;
use arcade_pilot_transport::test_helpers::ScriptedTransport;
use serde_json::{Value, json};
use tokio::time::Instant;

// =========================================================================
// Helpers
// =========================================================================

const OWNER: &str = "0x00000000000000000000000000000000000000aa";
const CONTRACT: &str = "0x00000000000000000000000000000000000000cc";
const SMART: &str = "0x00000000000000000000000000000000000000dd";
const OK: &str = r#"{"jsonrpc":"2.0","result":{"hash":"0x01"}}"#;

struct FixedSigner;

impl Signer for FixedSigner {
    fn address(&self) -> &str {
        OWNER
    }

    async fn sign_message(&self, _message: &[u8]) -> Result<String, SessionError> {
        Ok("0xmessage".into())
    }

    async fn sign_typed_data(&self, _typed: &Value) -> Result<String, SessionError> {
        Ok("0xtyped".into())
    }
}

type Pilot = Orchestrator<Arc<ScriptedTransport>, FixedSigner>;

fn error_reply(message: &str) -> String {
    json!({"jsonrpc": "2.0", "error": {"code": -32000, "message": message}}).to_string()
}

/// Queues the nonce, typed message and permit replies of one `authorize`.
fn push_permit(transport: &ScriptedTransport, part: &str) {
    let doc = json!({"json": {"domain": {}, "types": {}, "message": {}}}).to_string();
    transport
        .push_json(r#"{"jsonrpc":"2.0","result":{}}"#)
        .push_json(json!({"result": {"typedMessage": doc}}).to_string())
        .push_json(json!({"result": {"hashKey": part}}).to_string());
}

fn settings() -> PlaySettings {
    PlaySettings {
        contract: CONTRACT.into(),
        approval_token: "0x4Cc7b0ddCD0597496E57C5325cf4c73dBA30cdc9".into(),
        gateway_url: "https://gateway.test".into(),
        player: Some(SMART.into()),
        register_retry: RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(4),
            jitter: Duration::ZERO,
        },
    }
}

/// An orchestrator whose session already holds a permit (ids 1 to 3).
async fn authorized(transport: &Arc<ScriptedTransport>) -> Pilot {
    authorized_with(transport, settings()).await
}

async fn authorized_with(transport: &Arc<ScriptedTransport>, settings: PlaySettings) -> Pilot {
    let book: GameBook = [
        ("plinko", GameCall::new("0x0000000000000000000000000000000000000001", "0x01")),
        ("mines", GameCall::new("0x0000000000000000000000000000000000000002", "0x02")),
        ("singlewheel", GameCall::new("0x0000000000000000000000000000000000000003", "0x03")),
    ]
    .into_iter()
    .collect();

    let mut session = SessionClient::new(
        Arc::clone(transport),
        "https://hub.test/rpc",
        FixedSigner,
        SessionConfig::default(),
        SessionStore::disabled(),
    );
    push_permit(transport, "part-1");
    session.authorize().await.unwrap();

    Orchestrator::new(session, Arc::new(book), settings)
}

/// Every JSON-RPC envelope sent, skipping plain GETs.
fn envelopes(transport: &ScriptedTransport) -> Vec<RpcRequest> {
    transport
        .requests()
        .iter()
        .filter(|r| r.method == Method::Post)
        .map(|r| serde_json::from_slice(r.body.as_deref().unwrap_or_default()).unwrap())
        .collect()
}

/// Methods sent after the initial permit sequence.
fn methods_after_setup(transport: &ScriptedTransport) -> Vec<String> {
    envelopes(transport)
        .into_iter()
        .skip(3)
        .map(|r| r.method)
        .collect()
}

// =========================================================================
// Plain outcomes
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_play_plinko_success_advances_counter_by_one() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    let before = pilot.session().rpc().ids().issued();
    transport.push_json(r#"{"jsonrpc":"2.0","id":4,"error":null,"result":{}}"#);

    let outcome = pilot.play("plinko").await.unwrap();

    assert_eq!(outcome, PlayOutcome::Played);
    assert_eq!(pilot.session().rpc().ids().issued(), before + 1);
    assert_eq!(methods_after_setup(&transport), ["call"]);
    assert_eq!(
        pilot.board().status("plinko").unwrap().message,
        "Successfully played game: [plinko]"
    );
    assert!(!pilot.board().is_limited("plinko"));
}

#[tokio::test(start_paused = true)]
async fn test_play_sends_permitted_call_params() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    transport.push_json(OK);

    pilot.play("plinko").await.unwrap();

    let call = envelopes(&transport).pop().unwrap();
    assert_eq!(call.id, 4);
    assert_eq!(
        call.params,
        json!({
            "call": {"dest": "0x0000000000000000000000000000000000000001", "data": "0x01", "value": "0n"},
            "owner": OWNER,
            "part": "part-1",
            "permit": "0xtyped",
        })
    );
}

#[tokio::test(start_paused = true)]
async fn test_play_unknown_game_is_configuration_error() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;

    let err = pilot.play("roulette").await.unwrap_err();

    assert!(matches!(err, GameError::UnknownGame(_)));
    assert!(methods_after_setup(&transport).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_play_domain_failure_is_not_raised() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    transport.push_json(
        r#"{"result":{"hash":{"errorTypes":["Revert"],"actualError":{"details":"no funds"}}}}"#,
    );

    let outcome = pilot.play("plinko").await.unwrap();

    assert_eq!(outcome, PlayOutcome::DomainFailure);
    assert_eq!(
        pilot.board().status("plinko").unwrap().message,
        "Play game failed: no funds"
    );
}

#[tokio::test(start_paused = true)]
async fn test_play_empty_error_message_is_unreported() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    transport.push_json(r#"{"error":{"code":1}}"#);

    assert_eq!(pilot.play("plinko").await.unwrap(), PlayOutcome::Unreported);
}

// =========================================================================
// Error classes
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_play_locked_sets_cooldown_without_limiting() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    transport.push_json(error_reply("Account is Locked"));
    let start = Instant::now();

    let outcome = pilot.play("mines").await.unwrap();

    assert_eq!(outcome, PlayOutcome::Banned);
    let status = pilot.board().status("mines").unwrap();
    assert!(status.message.contains("banned"));
    assert_eq!(status.waiting, "1h 48m");
    assert!(!pilot.board().is_limited("mines"));
    assert_eq!(pilot.board().cooldown_remaining("mines"), Some(BAN_COOLDOWN));
    // The ban does not hold the account for 1.8 hours.
    assert!(start.elapsed() < Duration::from_secs(60));
    // No claim after a ban.
    assert_eq!(methods_after_setup(&transport), ["call"]);
}

#[tokio::test(start_paused = true)]
async fn test_play_banned_game_skipped_until_cooldown_ends() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    transport.push_json(error_reply("Locked"));
    pilot.play("plinko").await.unwrap();

    assert_eq!(pilot.play("plinko").await.unwrap(), PlayOutcome::Skipped);
    assert_eq!(methods_after_setup(&transport).len(), 1);

    tokio::time::advance(BAN_COOLDOWN).await;
    transport.push_json(OK);
    assert_eq!(pilot.play("plinko").await.unwrap(), PlayOutcome::Played);
}

#[tokio::test(start_paused = true)]
async fn test_play_locked_and_limit_classifies_as_ban() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    transport.push_json(error_reply("Locked: daily limit"));

    let outcome = pilot.play("plinko").await.unwrap();

    assert_eq!(outcome, PlayOutcome::Banned);
    assert!(!pilot.board().is_limited("plinko"));
}

#[tokio::test(start_paused = true)]
async fn test_play_limit_marks_game_and_stops_attempts() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    transport.push_json(error_reply("daily limit reached"));

    assert_eq!(pilot.play("singlewheel").await.unwrap(), PlayOutcome::Limited);
    assert!(pilot.board().is_limited("singlewheel"));

    assert_eq!(pilot.play("singlewheel").await.unwrap(), PlayOutcome::Skipped);
    assert_eq!(methods_after_setup(&transport), ["call"]);
}

#[tokio::test(start_paused = true)]
async fn test_play_stale_session_refreshes_and_retries_once() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    transport
        .push_json(error_reply("Please refresh or try again later"))
        .push_json(r#"{"result":true}"#)
        .push_json(r#"{"result":{}}"#)
        .push_json(OK);

    let outcome = pilot.play("plinko").await.unwrap();

    assert_eq!(outcome, PlayOutcome::Played);
    assert_eq!(
        methods_after_setup(&transport),
        ["call", "createSession", "createNonce", "call"]
    );
    assert!(pilot.session().session().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_play_stale_session_twice_is_game_play_error() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    transport
        .push_json(error_reply("Please refresh or try again later"))
        .push_json(r#"{"result":true}"#)
        .push_json(r#"{"result":{}}"#)
        .push_json(error_reply("Please refresh or try again later"));

    let err = pilot.play("plinko").await.unwrap_err();

    assert!(matches!(err, GameError::GamePlay { .. }));
    assert_eq!(methods_after_setup(&transport).len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_play_stale_session_with_failing_refresh_propagates() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    transport
        .push_json(error_reply("Please refresh or try again later"))
        .push_status(500, "Internal Server Error");

    let err = pilot.play("plinko").await.unwrap_err();

    assert!(matches!(
        err,
        GameError::Session(SessionError::SessionCreation(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_play_random_number_reiterates() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    transport
        .push_json(error_reply("awaiting random number"))
        .push_json(r#"{"result":{}}"#);

    let outcome = pilot.play("plinko").await.unwrap();

    assert_eq!(outcome, PlayOutcome::Reiterated);
    let sent = envelopes(&transport);
    let last = sent.last().unwrap();
    assert_eq!(last.method, "reIterate");
    assert_eq!(last.params, json!({"game": "plinko", "player": SMART}));
}

#[tokio::test(start_paused = true)]
async fn test_play_random_number_falls_back_to_refund() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    transport
        .push_json(error_reply("awaiting random number"))
        .push_status(500, "Internal Server Error")
        .push_json(r#"{"result":{}}"#);

    let outcome = pilot.play("plinko").await.unwrap();

    assert_eq!(outcome, PlayOutcome::Refunded);
    assert_eq!(methods_after_setup(&transport), ["call", "reIterate", "refund"]);
}

#[tokio::test(start_paused = true)]
async fn test_play_random_number_refund_failure_is_refund_error() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    transport
        .push_json(error_reply("awaiting random number"))
        .push_status(500, "Internal Server Error")
        .push_status(502, "Bad Gateway");

    let err = pilot.play("plinko").await.unwrap_err();

    assert!(matches!(err, GameError::Refund { ref game, .. } if game == "plinko"));
}

#[tokio::test(start_paused = true)]
async fn test_play_random_number_without_smart_address_sends_no_recovery() {
    let transport = Arc::new(ScriptedTransport::new());
    let no_player = PlaySettings {
        player: None,
        ..settings()
    };
    let mut pilot = authorized_with(&transport, no_player).await;
    transport.push_json(error_reply("awaiting random number"));

    let err = pilot.play("plinko").await.unwrap_err();

    assert!(matches!(
        err,
        GameError::Refund { ref game, ref reason } if game == "plinko" && reason.contains("smart address")
    ));
    assert_eq!(methods_after_setup(&transport), ["call"]);
}

#[tokio::test(start_paused = true)]
async fn test_reiterate_without_smart_address_is_reiterate_error() {
    let transport = Arc::new(ScriptedTransport::new());
    let no_player = PlaySettings {
        player: None,
        ..settings()
    };
    let mut pilot = authorized_with(&transport, no_player).await;

    let err = pilot.reiterate("plinko").await.unwrap_err();

    assert!(matches!(err, GameError::Reiterate { ref reason, .. } if reason.contains("smart address")));
    assert!(methods_after_setup(&transport).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_play_permit_not_verified_reauthorizes_then_fails() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    transport.push_json(error_reply("Permit could not verify"));
    push_permit(&transport, "part-2");

    let err = pilot.play("plinko").await.unwrap_err();

    assert!(matches!(err, GameError::GamePlay { ref message, .. } if message.contains("Permit")));
    assert_eq!(
        methods_after_setup(&transport),
        ["call", "createNonce", "permitTypedMessage", "permit"]
    );
    assert_eq!(
        pilot.session().permit().map(|p| p.part.as_str()),
        Some("part-2")
    );
}

#[tokio::test(start_paused = true)]
async fn test_play_unclassified_error_is_game_play() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    transport.push_json(error_reply("execution reverted"));

    let err = pilot.play("plinko").await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "failed to play game [plinko]: execution reverted"
    );
}

#[tokio::test(start_paused = true)]
async fn test_play_transport_error_text_is_classified() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    transport.push_status(500, "Internal Server Error");

    let err = pilot.play("plinko").await.unwrap_err();

    assert!(matches!(err, GameError::GamePlay { ref message, .. } if message.contains("500")));
}

// =========================================================================
// Mines claim
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_play_mines_success_claims_reward() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    transport.push_json(OK).push_json(OK);

    pilot.play("mines").await.unwrap();

    let claim = envelopes(&transport).pop().unwrap();
    assert_eq!(claim.method, "call");
    assert_eq!(claim.params["call"]["dest"], CONTRACT);
    assert_eq!(claim.params["call"]["data"], MINES_CLAIM_DATA);
    assert_eq!(
        pilot.board().status("mines").unwrap().message,
        "Successfully play and claim mine game."
    );
}

#[tokio::test(start_paused = true)]
async fn test_claim_mines_when_limited_sends_nothing() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    transport.push_json(error_reply("limit"));
    pilot.play("mines").await.unwrap();
    let sent = transport.request_count();

    let claimed = pilot.claim_mines().await.unwrap();

    assert!(!claimed);
    assert_eq!(transport.request_count(), sent);
}

#[tokio::test(start_paused = true)]
async fn test_claim_mines_failure_waits_and_reports() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    transport.push_json(error_reply("nothing to claim"));
    let start = Instant::now();

    let claimed = pilot.claim_mines().await.unwrap();

    assert!(!claimed);
    let status = pilot.board().status("mines").unwrap();
    assert_eq!(status.message, "Failed to claim mine game: nothing to claim");
    assert_eq!(status.waiting, "10s");
    assert_eq!(start.elapsed(), Duration::from_millis(600 + 100 + 10_000));
}

#[tokio::test(start_paused = true)]
async fn test_claim_mines_domain_failure_reports_details() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    transport.push_json(
        r#"{"result":{"hash":{"errorTypes":["Revert"],"actualError":{"details":"game not over"}}}}"#,
    );

    assert!(!pilot.claim_mines().await.unwrap());
    assert_eq!(
        pilot.board().status("mines").unwrap().message,
        "Claim failed: game not over"
    );
}

// =========================================================================
// Rounds
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_play_round_stops_limited_game_and_continues_others() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    // Alphabetical order: mines, plinko, singlewheel.
    transport
        .push_json(error_reply("limit"))
        .push_json(OK)
        .push_json(OK)
        .push_json(error_reply("execution reverted"))
        .push_json(OK);

    pilot.play_round(2).await.unwrap();

    assert_eq!(methods_after_setup(&transport).len(), 5);
    assert!(pilot.board().is_limited("mines"));
    assert_eq!(transport.pending_replies(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_play_round_aborts_on_session_failure() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    transport
        .push_json(error_reply("Please refresh or try again later"))
        .push_status(500, "Internal Server Error");

    let err = pilot.play_round(1).await.unwrap_err();

    assert!(matches!(err, GameError::Session(_)));
}

// =========================================================================
// Registration and points
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_register_success_fetches_points() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    transport
        .push_json(OK)
        .push_json(r#"{"today":5,"totalPoints":120}"#);

    assert!(pilot.register().await);

    let approval = envelopes(&transport).pop().unwrap();
    assert_eq!(
        approval.params["call"]["dest"],
        "0x4Cc7b0ddCD0597496E57C5325cf4c73dBA30cdc9"
    );
    assert!(
        approval.params["call"]["data"]
            .as_str()
            .unwrap()
            .starts_with("0x095ea7b3")
    );
    let points = pilot.points().unwrap();
    assert_eq!((points.today, points.total), (5.0, 120.0));
    let get = transport.requests().pop().unwrap();
    assert_eq!(get.method, Method::Get);
    assert_eq!(
        get.url,
        format!("https://gateway.test/game/points-by-player?wallet={SMART}")
    );
}

#[tokio::test(start_paused = true)]
async fn test_register_retries_then_succeeds() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    transport
        .push_status(500, "Internal Server Error")
        .push_json(error_reply("nonce too low"))
        .push_json(OK)
        .push_json(r#"{"today":1,"totalPoints":1}"#);

    assert!(pilot.register().await);
    assert_eq!(methods_after_setup(&transport), ["call", "call", "call"]);
}

#[tokio::test(start_paused = true)]
async fn test_register_exhausted_gives_up_without_error() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    transport
        .push_status(500, "a")
        .push_status(500, "b")
        .push_status(500, "c");
    let start = Instant::now();

    assert!(!pilot.register().await);

    assert_eq!(methods_after_setup(&transport).len(), 3);
    assert!(pilot.points().is_none());
    // 1s + 2s backoff between the three attempts.
    assert_eq!(start.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_get_points_failure_is_soft() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut pilot = authorized(&transport).await;
    transport.push_status(404, "Not Found");

    assert_eq!(pilot.get_points().await, None);
    assert!(pilot.points().is_none());
}
