use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{post, put},
};
use serde_json::{Value, json};
use shard_api::{ApiConfig, HttpApi};
use shard_core::{
    BatchOrchestrator, CaptureBuffer, ClaimApi, ClaimError, ClaimStrategy, Engine, Normalizer,
    RunConfig, RunRequest, UploadJob, Uploader, WorkClaimer, run_till_done,
};
use shard_model::{
    BatchSize, CapturedOutput, ClaimedUnit, NormalizedResult, Platform, RunMeta, RunStatus,
    SpecId, SpecResult, SpecStats,
};

const KEY: &str = "secret";

/// In-memory remote authority.
#[derive(Default)]
struct Authority {
    queue: Mutex<VecDeque<&'static str>>,
    claims: Mutex<Vec<(String, Value)>>,
    results: Mutex<Vec<(String, Value)>>,
    outputs: Mutex<Vec<(String, String)>>,
}

type Shared = Arc<Authority>;

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("x-record-key").and_then(|v| v.to_str().ok()) == Some(KEY)
}

fn unit(spec: &str) -> Value {
    json!({ "spec": spec, "instanceId": format!("inst-{spec}") })
}

async fn create_instance(
    State(auth): State<Shared>,
    Path(run_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "bad record key").into_response();
    }
    auth.claims.lock().unwrap().push((run_id, body));
    let next = auth.queue.lock().unwrap().pop_front();
    let remaining = auth.queue.lock().unwrap().len() as u32;
    let body = match next {
        Some(spec) => json!({
            "spec": spec,
            "instanceId": format!("inst-{spec}"),
            "claimedInstances": 1,
            "totalInstances": remaining + 1,
        }),
        None => json!({ "spec": null, "instanceId": null, "claimedInstances": 0, "totalInstances": 0 }),
    };
    Json(body).into_response()
}

async fn create_batched(
    State(auth): State<Shared>,
    Path(run_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "bad record key").into_response();
    }
    let n = body["batchSize"].as_u64().unwrap_or(1) as usize;
    auth.claims.lock().unwrap().push((run_id, body));
    let mut queue = auth.queue.lock().unwrap();
    let specs: Vec<Value> = (0..n).filter_map(|_| queue.pop_front()).map(unit).collect();
    let claimed = specs.len();
    let total = claimed + queue.len();
    Json(json!({
        "specs": specs,
        "claimedInstances": claimed,
        "totalInstances": total,
    }))
    .into_response()
}

async fn results(
    State(auth): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if id.contains("reject") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "storage down").into_response();
    }
    auth.results.lock().unwrap().push((id, body));
    Json(json!({ "ok": true })).into_response()
}

async fn output(
    State(auth): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let text = body["output"].as_str().unwrap_or_default().to_string();
    auth.outputs.lock().unwrap().push((id, text));
    StatusCode::NO_CONTENT.into_response()
}

async fn garbage() -> &'static str {
    "<html>not json</html>"
}

async fn serve(queue: &[&'static str]) -> (String, Shared) {
    let auth: Shared = Arc::new(Authority {
        queue: Mutex::new(queue.iter().copied().collect()),
        ..Default::default()
    });
    let app = Router::new()
        .route("/runs/{run_id}/instances", post(create_instance))
        .route("/runs/{run_id}/cy/instances", post(create_batched))
        .route("/instances/{id}/results", post(results))
        .route("/instances/{id}/output", put(output))
        .route("/broken/runs/{run_id}/instances", post(garbage))
        .with_state(auth.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), auth)
}

fn meta() -> RunMeta {
    RunMeta::new("run-42", "group-1", "machine-1", Platform::default()).unwrap()
}

fn client(base: &str) -> HttpApi {
    HttpApi::new(ApiConfig::new(base).with_record_key(KEY)).unwrap()
}

#[tokio::test]
async fn single_claim_round_trip() {
    let (base, auth) = serve(&["a.spec"]).await;
    let api = client(&base);

    let first = api.create_instance(&meta()).await.unwrap();
    assert_eq!(first.spec.as_deref(), Some("a.spec"));
    assert_eq!(first.instance_id.as_deref(), Some("inst-a.spec"));

    let second = api.create_instance(&meta()).await.unwrap();
    assert!(second.into_batch().is_empty());

    let claims = auth.claims.lock().unwrap();
    assert_eq!(claims.len(), 2);
    assert_eq!(claims[0].0, "run-42");
    assert_eq!(claims[0].1["machineId"], "machine-1");
    assert_eq!(claims[0].1["groupId"], "group-1");
}

#[tokio::test]
async fn batched_claim_sends_batch_size() {
    let (base, auth) = serve(&["x", "y", "z", "w"]).await;
    let api = client(&base);

    let resp = api
        .create_batched_instances(&meta(), BatchSize::new(3).unwrap())
        .await
        .unwrap();

    let batch = resp.into_batch();
    assert_eq!(batch.joined_specs(), "x,y,z");
    assert_eq!(batch.total_count, 4);
    assert_eq!(auth.claims.lock().unwrap()[0].1["batchSize"], 3);
}

#[tokio::test]
async fn missing_record_key_is_rejected() {
    let (base, _auth) = serve(&["a.spec"]).await;
    let api = HttpApi::new(ApiConfig::new(&base)).unwrap();

    let err = api.create_instance(&meta()).await.unwrap_err();
    assert_eq!(
        err,
        ClaimError::Rejected {
            status: 401,
            message: "bad record key".into()
        }
    );
}

#[tokio::test]
async fn unparsable_claim_response_is_reported() {
    let (base, _auth) = serve(&[]).await;
    let api = client(&format!("{base}/broken"));

    let err = api.create_instance(&meta()).await.unwrap_err();
    assert!(matches!(err, ClaimError::InvalidResponse(ref m) if m.contains("not json")));
}

#[tokio::test]
async fn unreachable_authority_is_a_transport_error() {
    let api = client("http://127.0.0.1:9");
    let err = api.create_instance(&meta()).await.unwrap_err();
    assert!(matches!(err, ClaimError::Transport(_)));
}

fn job(spec: &str, instance: &str, result: NormalizedResult) -> UploadJob {
    UploadJob {
        unit: ClaimedUnit::new(spec, instance),
        result: Arc::new(result),
        output: Arc::new(CapturedOutput::new("engine output\n")),
    }
}

fn finished(specs: &[&str]) -> NormalizedResult {
    NormalizedResult {
        status: RunStatus::Finished,
        total_duration_ms: 12,
        runs: specs
            .iter()
            .map(|s| SpecResult {
                spec: s.to_string(),
                stats: SpecStats {
                    tests: 3,
                    passes: 3,
                    duration_ms: 12,
                    ..Default::default()
                },
                tests: vec![],
                error: None,
            })
            .collect(),
        error: None,
    }
}

#[tokio::test]
async fn upload_ships_results_then_output() {
    let (base, auth) = serve(&[]).await;
    let api = client(&base);

    api.upload(&job("a.spec", "inst-a", finished(&["a.spec", "b.spec"])))
        .await
        .unwrap();

    let results = auth.results.lock().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0, "inst-a");
    assert_eq!(results[0].1["spec"], "a.spec");
    assert_eq!(results[0].1["stats"]["passes"], 3);

    let outputs = auth.outputs.lock().unwrap();
    assert_eq!(outputs[0], ("inst-a".to_string(), "engine output\n".to_string()));
}

#[tokio::test]
async fn instance_id_is_sent_as_one_path_segment() {
    let (base, auth) = serve(&[]).await;
    let api = client(&format!("{base}/"));

    api.upload(&job("a.spec", "a/b?c #1", finished(&["a.spec"])))
        .await
        .unwrap();

    assert_eq!(auth.results.lock().unwrap()[0].0, "a/b?c #1");
    assert_eq!(auth.outputs.lock().unwrap()[0].0, "a/b?c #1");
}

#[tokio::test]
async fn upload_for_missing_spec_carries_error_note() {
    let (base, auth) = serve(&[]).await;
    let api = client(&base);

    api.upload(&job("gone.spec", "inst-gone", finished(&["a.spec"])))
        .await
        .unwrap();

    let results = auth.results.lock().unwrap();
    assert_eq!(results[0].1["spec"], "gone.spec");
    assert_eq!(results[0].1["stats"]["tests"], 0);
    assert!(results[0].1["error"].as_str().unwrap().contains("no result"));
}

#[tokio::test]
async fn rejected_upload_surfaces_status() {
    let (base, auth) = serve(&[]).await;
    let api = client(&base);

    let err = api
        .upload(&job("a.spec", "inst-reject", finished(&["a.spec"])))
        .await
        .unwrap_err();
    assert!(matches!(err, shard_core::UploadError::Rejected { status: 500, .. }));
    assert!(auth.outputs.lock().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Whole loop over HTTP
// ---------------------------------------------------------------------------

struct EchoEngine {
    capture: CaptureBuffer,
}

#[async_trait]
impl Engine for EchoEngine {
    type Raw = String;

    fn name(&self) -> &'static str {
        "echo"
    }

    async fn run_safe(&self, request: RunRequest<'_>) -> String {
        self.capture.write_line(&format!("ran {}", request.specs));
        request.specs.to_string()
    }
}

struct AllPass;

impl Normalizer<String> for AllPass {
    fn normalize(&self, _raw: String, requested: &[SpecId], _config: &RunConfig) -> NormalizedResult {
        let specs: Vec<&str> = requested.iter().map(String::as_str).collect();
        finished(&specs)
    }
}

#[tokio::test]
async fn run_till_done_against_http_authority() {
    let (base, auth) = serve(&["a", "b", "c", "reject"]).await;
    let api = Arc::new(client(&base));
    let capture = CaptureBuffer::new();

    let strategy = ClaimStrategy::Batched {
        batch_size: BatchSize::new(2).unwrap(),
    };
    let mut orchestrator = BatchOrchestrator::new(
        WorkClaimer::new(api.clone(), meta(), strategy),
        EchoEngine {
            capture: capture.clone(),
        },
        AllPass,
        api.clone(),
        capture,
        RunConfig::default(),
    );

    let summary = run_till_done(&mut orchestrator).await.unwrap();

    assert_eq!(summary.specs().collect::<Vec<_>>(), ["a", "b", "c", "reject"]);
    assert_eq!(summary.totals().passes, 12);
    // Three claims: [a, b], [c, reject], [].
    assert_eq!(auth.claims.lock().unwrap().len(), 3);
    // The rejected upload is logged, the others land.
    assert_eq!(auth.results.lock().unwrap().len(), 3);

    let outputs = auth.outputs.lock().unwrap();
    let out_a = &outputs.iter().find(|(id, _)| id == "inst-a").unwrap().1;
    assert_eq!(out_a, "ran a,b\n");
    let out_c = &outputs.iter().find(|(id, _)| id == "inst-c").unwrap().1;
    assert_eq!(out_c, "ran c,reject\n");
}
