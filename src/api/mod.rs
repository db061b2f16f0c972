// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{error::ErrorBody, state::AppState};

pub mod balance;
pub mod health;
pub mod transfer;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/transfer", post(transfer::transfer))
        .route("/balance/{address}", get(balance::get_balance))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        transfer::transfer,
        balance::get_balance,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            transfer::TransferRequest,
            transfer::TransferResponse,
            balance::BalanceResponse,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks,
            ErrorBody
        )
    ),
    tags(
        (name = "Wallet", description = "Transfers and balance queries"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, time::Duration};

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::blockchain::{
        mock::{ChainCall, MockChainClient},
        parse_ether,
    };

    const RECIPIENT: &str = "0xABCDabcdABCDabcdABCDabcdABCDabcdABCDabcd";

    fn app(mock: MockChainClient) -> (Router, Arc<MockChainClient>) {
        let mock = Arc::new(mock);
        let state = AppState::new(mock.clone(), Duration::from_secs(5));
        (router(state), mock)
    }

    fn funded() -> MockChainClient {
        MockChainClient::new().with_balance(parse_ether("10").unwrap())
    }

    async fn post_transfer(app: Router, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/transfer")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    async fn post_raw(app: Router, content_type: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/transfer")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send(app, request).await
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let (app, _) = app(MockChainClient::new());
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn transfer_success_calls_pipeline_once_each() {
        let (app, mock) = app(funded());

        let (status, body) =
            post_transfer(app, json!({ "recipient": RECIPIENT, "amount": "1.5" })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], true);
        assert_eq!(body["message"], "Transaction successful");
        assert!(!body["txHash"].as_str().unwrap().is_empty());
        assert_eq!(
            mock.calls(),
            vec![
                ChainCall::Balance,
                ChainCall::FeeData,
                ChainCall::EstimateGas,
                ChainCall::PendingNonce,
                ChainCall::SendTransaction,
            ]
        );
    }

    #[tokio::test]
    async fn invalid_recipient_is_rejected_without_network_calls() {
        for recipient in ["", "0x123", "0xGGGGabcdABCDabcdABCDabcdABCDabcdABCDabcd", "vitalik.eth"] {
            let (app, mock) = app(funded());

            let (status, body) =
                post_transfer(app, json!({ "recipient": recipient, "amount": "1" })).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{recipient:?}");
            assert_eq!(body["status"], false);
            assert_eq!(body["message"], "Invalid recipient address.");
            assert!(mock.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn bad_amount_is_rejected_before_balance_query() {
        for amount in ["abc", "-1", "", "1.", "0.0000000000000000001"] {
            let (app, mock) = app(funded());

            let (status, body) =
                post_transfer(app, json!({ "recipient": RECIPIENT, "amount": amount })).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{amount:?}");
            assert_eq!(body["status"], false);
            assert!(mock.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn unsafe_characters_are_rejected() {
        for c in ['$', '{', '}', ';', '&', '=', '\'', '"'] {
            let (app, mock) = app(funded());
            let recipient = format!("{}{}", &RECIPIENT[..41], c);

            let (status, _) =
                post_transfer(app, json!({ "recipient": recipient, "amount": "1" })).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{c}");
            assert!(mock.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn internal_ip_recipients_are_rejected() {
        for recipient in ["127.0.0.1", "10.1.2.3", "172.16.0.1", "192.168.0.1"] {
            let (app, mock) = app(funded());

            let (status, body) =
                post_transfer(app, json!({ "recipient": recipient, "amount": "1" })).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{recipient}");
            assert_eq!(body["status"], false);
            assert!(mock.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn numeric_amount_is_accepted() {
        let (app, mock) = app(funded());

        let (status, body) =
            post_transfer(app, json!({ "recipient": RECIPIENT, "amount": 1.5 })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], true);
        assert_eq!(mock.sent()[0].value, parse_ether("1.5").unwrap());
    }

    #[tokio::test]
    async fn numeric_recipient_is_an_invalid_address() {
        let (app, mock) = app(funded());

        let (status, body) = post_transfer(app, json!({ "recipient": 12, "amount": "1" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "status": false, "message": "Invalid recipient address." })
        );
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn unreadable_bodies_get_error_envelope() {
        let cases = [
            ("application/json", "{not json"),
            ("application/json", r#"{"recipient":"0xab","amount":true}"#),
            ("text/plain", r#"{"recipient":"0xab","amount":"1"}"#),
        ];

        for (content_type, raw) in cases {
            let (app, mock) = app(funded());

            let (status, body) = post_raw(app, content_type, raw).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{raw}");
            assert_eq!(
                body,
                json!({ "status": false, "message": "Invalid request body." }),
                "{raw}"
            );
            assert!(mock.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn insufficient_balance_skips_gas_and_nonce() {
        let (app, mock) = app(MockChainClient::new().with_balance(parse_ether("1").unwrap()));

        let (status, body) =
            post_transfer(app, json!({ "recipient": RECIPIENT, "amount": "2" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Insufficient balance.");
        assert_eq!(mock.calls(), vec![ChainCall::Balance]);
    }

    #[tokio::test]
    async fn gas_estimation_failure_is_500_with_sanitized_detail() {
        let (app, mock) = app(funded().failing(ChainCall::EstimateGas));

        let (status, body) =
            post_transfer(app, json!({ "recipient": RECIPIENT, "amount": "1" })).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], false);
        assert_eq!(body["message"], "Transaction failed");
        let detail = body["error"].as_str().unwrap();
        assert!(detail.starts_with("Gas estimation failed"));
        assert!(!detail.contains('<'));
        assert!(!mock.calls().contains(&ChainCall::PendingNonce));
    }

    #[tokio::test]
    async fn concurrent_transfers_are_serialized_on_nonce() {
        let (app, mock) = app(funded().with_nonce(11));

        let first = post_transfer(app.clone(), json!({ "recipient": RECIPIENT, "amount": "1" }));
        let second = post_transfer(app, json!({ "recipient": RECIPIENT, "amount": "2" }));
        let ((s1, _), (s2, _)) = tokio::join!(first, second);

        assert_eq!(s1, StatusCode::OK);
        assert_eq!(s2, StatusCode::OK);

        let mut nonces: Vec<u64> = mock.sent().iter().map(|tx| tx.nonce).collect();
        nonces.sort_unstable();
        assert_eq!(nonces, vec![11, 12]);
    }

    #[tokio::test]
    async fn balance_endpoint_returns_decimal_units() {
        let (app, mock) = app(MockChainClient::new().with_balance(parse_ether("0.75").unwrap()));

        let (status, body) = get_json(app, &format!("/balance/{RECIPIENT}")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "status": true, "address": RECIPIENT, "balance": "0.75" })
        );
        assert_eq!(mock.calls(), vec![ChainCall::Balance]);
    }

    #[tokio::test]
    async fn balance_endpoint_rejects_invalid_address() {
        let (app, mock) = app(funded());

        let (status, body) = get_json(app, "/balance/not-an-address").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "status": false, "message": "Invalid Ethereum address." })
        );
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn balance_endpoint_timeout_is_500() {
        let mock = Arc::new(
            MockChainClient::new().delayed(ChainCall::Balance, Duration::from_secs(2)),
        );
        let app = router(AppState::new(mock, Duration::from_millis(50)));

        let (status, body) = get_json(app, &format!("/balance/{RECIPIENT}")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "status": false, "message": "Failed to fetch balance." })
        );
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let (app, _) = app(MockChainClient::new());

        let response = app
            .oneshot(Request::builder().uri("/health/live").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (app, _) = app(MockChainClient::new());

        let (status, body) = get_json(app, "/api-doc/openapi.json").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"].get("/transfer").is_some());
        assert!(body["paths"].get("/balance/{address}").is_some());
    }
}
