//! Request/response operations against a fake daemon.

use std::time::Duration;

use ipfsbridge_core::{Address, Cid, IpfsClient, IpfsError, IpnsId, build_info};
use ipfsbridge_test_utils::{FakeDaemon, TestConfigBuilder};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::json;

const CID_A: &str = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";
const CID_B: &str = "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi";

fn client_for(daemon: &FakeDaemon) -> IpfsClient {
    let config = TestConfigBuilder::new().base_url(daemon.base_url()).build();
    IpfsClient::new(&config)
}

fn cid(text: &str) -> Cid {
    Cid::try_from(text).unwrap()
}

// ── Version & keys ────────────────────────────────────────────────

#[test_log::test(tokio::test)]
async fn test_version() {
    let daemon = FakeDaemon::builder()
        .json("version", json!({"Version": "0.29.0", "Commit": "abc"}))
        .start()
        .await;

    let version = client_for(&daemon).version().await.unwrap();
    assert_eq!(version, "0.29.0");

    let requests = daemon.requests_to("version");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method.as_str(), "GET");
    assert_eq!(
        requests[0].user_agent.as_deref(),
        Some(build_info::user_agent().as_str())
    );
}

#[tokio::test]
async fn test_key_gen_sends_name_and_type() {
    let daemon = FakeDaemon::builder()
        .json("key/gen", json!({"Name": "blog", "Id": "k51qzi5uqu5dblog"}))
        .start()
        .await;

    let id = client_for(&daemon).key_gen("blog").await.unwrap();
    assert_eq!(id, IpnsId::new("k51qzi5uqu5dblog"));

    let req = &daemon.requests_to("key/gen")[0];
    assert_eq!(req.param("arg"), Some("blog"));
    assert_eq!(req.param("type"), Some("ed25519"));
}

// ── DAG & pin ─────────────────────────────────────────────────────

#[test_log::test(tokio::test)]
async fn test_dag_put_posts_json_and_pins() {
    let daemon = FakeDaemon::builder()
        .json("dag/put", json!({"Cid": {"/": CID_A}}))
        .start()
        .await;

    let stored = client_for(&daemon)
        .dag_put(&json!({"title": "hello", "n": 1}))
        .await
        .unwrap();
    assert_eq!(stored, cid(CID_A));

    let req = &daemon.requests_to("dag/put")[0];
    assert_eq!(req.method.as_str(), "POST");
    assert_eq!(req.param("pin"), Some("true"));
    assert_eq!(req.user_agent.as_deref(), Some(build_info::user_agent().as_str()));
    let body = req.body_text();
    assert!(body.contains("name=\"arg\""), "multipart body: {body}");
    assert!(body.contains(r#""title":"hello""#), "multipart body: {body}");
}

#[tokio::test]
async fn test_dag_put_missing_cid_is_invalid_response() {
    let daemon = FakeDaemon::builder()
        .json("dag/put", json!({"Something": "else"}))
        .start()
        .await;

    let err = client_for(&daemon).dag_put(&json!(1)).await.unwrap_err();
    assert!(
        matches!(err, IpfsError::InvalidResponse { ref endpoint, .. } if endpoint == "dag/put"),
        "got {err:?}"
    );
}

#[derive(Debug, Deserialize, PartialEq)]
struct Post {
    title: String,
    tags: Vec<String>,
}

#[tokio::test]
async fn test_dag_get_decodes_into_caller_type() {
    let daemon = FakeDaemon::builder()
        .json("dag/get", json!({"title": "hi", "tags": ["a", "b"]}))
        .start()
        .await;

    let address = Address::Ipfs(cid(CID_A));
    let post: Post = client_for(&daemon).dag_get(&address).await.unwrap();
    assert_eq!(
        post,
        Post {
            title: "hi".to_string(),
            tags: vec!["a".to_string(), "b".to_string()],
        }
    );
    assert_eq!(
        daemon.requests_to("dag/get")[0].param("arg"),
        Some(format!("/ipfs/{CID_A}").as_str())
    );
}

#[tokio::test]
async fn test_dag_get_shape_mismatch_is_ipld_parse_error() {
    let daemon = FakeDaemon::builder()
        .json("dag/get", json!({"title": 5}))
        .start()
        .await;

    let address = Address::Ipns(IpnsId::new("k51qzi5uqu5dblog"));
    let err = client_for(&daemon)
        .dag_get::<Post>(&address)
        .await
        .unwrap_err();
    match err {
        IpfsError::IpldParse { address: a, .. } => assert_eq!(a, address),
        other => panic!("expected IpldParse, got {other:?}"),
    }
}

#[tokio::test]
async fn test_dag_get_non_json_is_invalid_response() {
    let daemon = FakeDaemon::builder()
        .status("dag/get", 200, "\u{1}binary block")
        .start()
        .await;

    let err = client_for(&daemon)
        .dag_get::<serde_json::Value>(&Address::Ipfs(cid(CID_A)))
        .await
        .unwrap_err();
    assert!(matches!(err, IpfsError::InvalidResponse { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_pin_add_returns_pinned_cids() {
    let daemon = FakeDaemon::builder()
        .json("pin/add", json!({"Pins": [CID_A, CID_B]}))
        .start()
        .await;

    let pins = client_for(&daemon)
        .pin_add(&Address::Ipfs(cid(CID_A)))
        .await
        .unwrap();
    assert_eq!(pins, vec![cid(CID_A), cid(CID_B)]);
}

#[tokio::test]
async fn test_pin_add_rejects_bad_cid_in_response() {
    let daemon = FakeDaemon::builder()
        .json("pin/add", json!({"Pins": ["not-a-cid"]}))
        .start()
        .await;

    let err = client_for(&daemon)
        .pin_add(&Address::Ipfs(cid(CID_A)))
        .await
        .unwrap_err();
    assert!(matches!(err, IpfsError::InvalidResponse { .. }), "got {err:?}");
}

// ── Naming ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_name_publish_sends_address_and_key() {
    let daemon = FakeDaemon::builder()
        .json("name/publish", json!({"Name": "k51", "Value": format!("/ipfs/{CID_A}")}))
        .start()
        .await;

    let key = IpnsId::new("k51qzi5uqu5dblog");
    client_for(&daemon)
        .name_publish(&key, &Address::Ipfs(cid(CID_A)))
        .await
        .unwrap();

    let req = &daemon.requests_to("name/publish")[0];
    assert_eq!(req.param("arg"), Some(format!("/ipfs/{CID_A}").as_str()));
    assert_eq!(req.param("key"), Some("k51qzi5uqu5dblog"));
}

#[tokio::test]
async fn test_name_publish_requires_json_body() {
    let daemon = FakeDaemon::builder()
        .status("name/publish", 200, "ok")
        .start()
        .await;

    let err = client_for(&daemon)
        .name_publish(&IpnsId::new("self"), &Address::Ipfs(cid(CID_A)))
        .await
        .unwrap_err();
    assert!(matches!(err, IpfsError::InvalidResponse { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_name_resolve_follows_recursively() {
    let daemon = FakeDaemon::builder()
        .json("name/resolve", json!({"Path": format!("/ipfs/{CID_B}")}))
        .start()
        .await;

    let resolved = client_for(&daemon)
        .name_resolve(&IpnsId::new("k51qzi5uqu5dblog"))
        .await
        .unwrap();
    assert_eq!(resolved, cid(CID_B));

    let req = &daemon.requests_to("name/resolve")[0];
    assert_eq!(req.param("arg"), Some("k51qzi5uqu5dblog"));
    assert_eq!(req.param("recursive"), Some("true"));
}

#[tokio::test]
async fn test_name_resolve_rejects_ipns_path() {
    let daemon = FakeDaemon::builder()
        .json("name/resolve", json!({"Path": "/ipns/k51other"}))
        .start()
        .await;

    let err = client_for(&daemon)
        .name_resolve(&IpnsId::new("k51"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("expected /ipfs path"), "got {err}");
}

#[tokio::test]
async fn test_name_resolve_rejects_unparseable_path() {
    let daemon = FakeDaemon::builder()
        .json("name/resolve", json!({"Path": "/ipfs/garbage"}))
        .start()
        .await;

    let err = client_for(&daemon)
        .name_resolve(&IpnsId::new("k51"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("invalid path"), "got {err}");
}

// ── Failure classification ────────────────────────────────────────

#[test_log::test(tokio::test)]
async fn test_structured_daemon_error_surfaces_message() {
    let daemon = FakeDaemon::builder()
        .status(
            "pin/add",
            500,
            r#"{"Message":"boom","Code":0,"Type":"error"}"#,
        )
        .start()
        .await;

    let err = client_for(&daemon)
        .pin_add(&Address::Ipfs(cid(CID_A)))
        .await
        .unwrap_err();
    assert!(matches!(err, IpfsError::Daemon(ref m) if m == "boom"), "got {err:?}");
}

#[tokio::test]
async fn test_error_status_without_message_is_unclassified() {
    let daemon = FakeDaemon::builder()
        .status("version", 502, "bad gateway")
        .start()
        .await;

    let err = client_for(&daemon).version().await.unwrap_err();
    assert!(
        matches!(err, IpfsError::Unclassified { ref endpoint, .. } if endpoint == "version"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_unknown_endpoint_is_unclassified() {
    let daemon = FakeDaemon::builder().start().await;

    let err = client_for(&daemon).version().await.unwrap_err();
    assert!(matches!(err, IpfsError::Unclassified { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_slow_daemon_times_out_with_endpoint() {
    ipfsbridge_test_utils::tracing_setup::init_test_tracing();
    let daemon = FakeDaemon::builder()
        .delayed("dag/get", Duration::from_secs(5), json!({}))
        .start()
        .await;

    let config = TestConfigBuilder::new()
        .base_url(daemon.base_url())
        .request_timeout_secs(1)
        .build();
    let client = IpfsClient::new(&config);

    let err = client
        .dag_get::<serde_json::Value>(&Address::Ipfs(cid(CID_A)))
        .await
        .unwrap_err();
    assert!(matches!(err, IpfsError::Timeout(ref p) if p == "dag/get"), "got {err:?}");
}

#[tokio::test]
async fn test_refused_connection_is_no_daemon() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = TestConfigBuilder::new()
        .base_url(&format!("http://127.0.0.1:{port}"))
        .build();
    let client = IpfsClient::new(&config);

    let err = client.pin_add(&Address::Ipfs(cid(CID_A))).await.unwrap_err();
    assert!(matches!(err, IpfsError::NoDaemon), "got {err:?}");

    let err = client.publish("topic", b"x").await.unwrap_err();
    assert!(matches!(err, IpfsError::NoDaemon), "got {err:?}");
}

#[tokio::test]
async fn test_concurrent_calls_are_independent() {
    let daemon = FakeDaemon::builder()
        .json("version", json!({"Version": "0.29.0"}))
        .json("pin/add", json!({"Pins": [CID_A]}))
        .start()
        .await;
    let client = client_for(&daemon);

    let address = Address::Ipfs(cid(CID_A));
    let (version, pins) = tokio::join!(client.version(), client.pin_add(&address));
    assert_eq!(version.unwrap(), "0.29.0");
    assert_eq!(pins.unwrap(), vec![cid(CID_A)]);
}
