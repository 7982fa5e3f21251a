mod common;

use common::{BOUNTY_HAT, EXEC_HAT, Holdings, MockMulticall, POC, WALLET, test_config};
use gatekeeper::{TokenGate, server::router};
use serde_json::{Value, json};
use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio::net::TcpListener;

async fn spawn_server(client: MockMulticall) -> SocketAddr {
    let gate = Arc::new(TokenGate::new(test_config(), client));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(gate)).await.unwrap();
    });
    addr
}

fn exec_only() -> MockMulticall {
    MockMulticall::holding(Holdings {
        hats: vec![EXEC_HAT],
        ..Default::default()
    })
}

#[tokio::test]
async fn test_health() {
    let addr = spawn_server(exec_only()).await;
    let response = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_entitlements_endpoint() {
    let addr = spawn_server(exec_only()).await;
    let body: Value = reqwest::get(format!("http://{addr}/entitlements/{WALLET}"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["hasExecutivePod"], true);
    assert_eq!(body["hasDevPod"], false);
    assert_eq!(body["systemBalance"], "0");
}

#[tokio::test]
async fn test_permissions_endpoint_uses_one_round_trip() {
    let client = exec_only();
    let addr = spawn_server(client.clone()).await;
    let body: Value = reqwest::get(format!("http://{addr}/permissions/{WALLET}"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["bounty"]["canCreateBounty"], false);
    assert_eq!(body["bounty"]["isTokenHolder"], true);
    assert_eq!(body["eventManagement"]["canManageEvents"], false);
    assert_eq!(body["canManageMarket"], false);
    assert_eq!(body["heldTokens"], json!(["exec"]));
    assert_eq!(client.round_trips(), 1);
}

#[tokio::test]
async fn test_bad_address_is_400() {
    let addr = spawn_server(exec_only()).await;
    let response = reqwest::get(format!("http://{addr}/entitlements/not-a-wallet")).await.unwrap();
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("not-a-wallet"));
}

#[tokio::test]
async fn test_access_endpoint() {
    let addr = spawn_server(exec_only()).await;
    let check = |query: String| {
        let url = format!("http://{addr}/access/{WALLET}{query}");
        async move {
            let body: Value = reqwest::get(url).await.unwrap().json().await.unwrap();
            body["hasAccess"].as_bool().unwrap()
        }
    };

    assert!(check(String::new()).await);
    assert!(check("?required_token=exec".to_string()).await);
    assert!(!check("?required_token=dev".to_string()).await);
    assert!(!check(format!("?required_token={POC}")).await);
}

async fn get_permissions(addr: SocketAddr) -> Value {
    reqwest::get(format!("http://{addr}/permissions/{WALLET}"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_permissions_spend_one_retry_budget_when_node_is_down() {
    let client = MockMulticall::failing();
    let addr = spawn_server(client.clone()).await;

    let body = get_permissions(addr).await;
    assert_eq!(body["bounty"]["canCreateBounty"], false);
    assert_eq!(body["bounty"]["isTokenHolder"], false);
    assert_eq!(body["canManageMarket"], false);
    assert_eq!(body["heldTokens"], json!([]));
    assert_eq!(client.round_trips(), 3);
}

#[tokio::test]
async fn test_permissions_projections_agree_after_recovery() {
    let failures = Arc::new(AtomicUsize::new(0));
    let counter = failures.clone();
    let holdings = Holdings {
        hats: vec![BOUNTY_HAT],
        ..Default::default()
    };
    let client = MockMulticall::new(move |calls| {
        if counter.fetch_add(1, Ordering::SeqCst) < 3 {
            anyhow::bail!("node unavailable");
        }
        Ok(calls.iter().map(|call| holdings.answer(call)).collect())
    });
    let addr = spawn_server(client.clone()).await;

    let down = get_permissions(addr).await;
    assert_eq!(down["bounty"]["canCreateBounty"], false);
    assert_eq!(down["heldTokens"], json!([]));

    let recovered = get_permissions(addr).await;
    assert_eq!(recovered["bounty"]["canCreateBounty"], true);
    assert_eq!(recovered["heldTokens"], json!(["bounty"]));
    assert_eq!(client.round_trips(), 4);
}
