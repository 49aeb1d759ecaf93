//! End-to-end flows against the live mock server.
//!
//! Each test binds the mock backend to a random port and drives the client
//! over real HTTP, covering auth, funds, KYC, plans, signals, settings, and
//! the admin console paths, including concurrent in-flight calls.

use invest_core::{
    ApiError, BuyPlanRequest, ChangePasswordRequest, FormPart, InvestClient, LoginRequest,
    RegisterRequest, Session, SubscribeSignalRequest,
};
use serde_json::json;

async fn start_server() -> InvestClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        mock_server::run(listener).await.unwrap();
    });
    InvestClient::new(&format!("http://{addr}"))
}

fn register_input(email: &str) -> RegisterRequest {
    RegisterRequest {
        username: "joe".to_string(),
        email: email.to_string(),
        password: "secret".to_string(),
    }
}

async fn register(client: &InvestClient, email: &str) -> Session {
    let auth = client.register(&register_input(email)).await.unwrap();
    Session::new(auth.token)
}

async fn admin_session(client: &InvestClient) -> Session {
    let auth = client
        .admin_login(&LoginRequest {
            email: mock_server::ADMIN_EMAIL.to_string(),
            password: mock_server::ADMIN_PASSWORD.to_string(),
        })
        .await
        .unwrap();
    Session::new(auth.token)
}

#[tokio::test]
async fn register_resolves_token_and_user() {
    let client = start_server().await;
    let auth = client.register(&register_input("joe@x.com")).await.unwrap();
    assert!(!auth.token.is_empty());
    assert_eq!(auth.user.username, "joe");
    assert_eq!(auth.user.email, "joe@x.com");
    assert_eq!(auth.user.balance, 0.0);
}

#[tokio::test]
async fn login_with_bad_password_rejects_with_invalid_credentials() {
    let client = start_server().await;
    register(&client, "a@b.com").await;

    let err = client
        .login(&LoginRequest {
            email: "a@b.com".to_string(),
            password: "bad".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Invalid credentials");
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.body().unwrap()["error"], "Invalid credentials");
}

#[tokio::test]
async fn unknown_token_is_unauthorized() {
    let client = start_server().await;
    let err = client
        .get_profile(&Session::new("bogus"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.to_string(), "Unauthorized");
}

#[tokio::test]
async fn deposit_withdrawal_and_history_flow() {
    let client = start_server().await;
    let session = register(&client, "joe@x.com").await;

    let deposit = client
        .deposit(&session, 250.0, "receipt.png", b"png-bytes".to_vec())
        .await
        .unwrap();
    assert_eq!(deposit.amount, 250.0);
    assert_eq!(deposit.status, "pending");

    let deposits = client.get_deposits(&session).await.unwrap();
    assert_eq!(deposits.len(), 1);
    assert_eq!(deposits[0].id, deposit.id);

    let withdrawal = client.withdraw(&session, 100.0).await.unwrap();
    assert_eq!(withdrawal.status, "pending");

    let withdrawals = client.get_withdrawals(&session).await.unwrap();
    assert_eq!(withdrawals.len(), 1);

    let err = client.withdraw(&session, 10_000.0).await.unwrap_err();
    assert_eq!(err.to_string(), "Insufficient balance");
    assert_eq!(err.status(), Some(400));

    let profile = client.get_profile(&session).await.unwrap();
    assert_eq!(profile.balance, 150.0);
}

#[tokio::test]
async fn kyc_lifecycle_with_admin_approval() {
    let client = start_server().await;
    let session = register(&client, "joe@x.com").await;

    let err = client.get_kyc(&session).await.unwrap_err();
    assert_eq!(err.status(), Some(404));

    let submitted = client
        .submit_kyc(&session, &json!({"country": "DE", "documentType": "passport"}))
        .await
        .unwrap();
    assert_eq!(submitted.status, "pending");
    assert_eq!(submitted.data["country"], "DE");

    let fetched = client.get_kyc(&session).await.unwrap();
    assert_eq!(fetched.id, submitted.id);

    let admin = admin_session(&client).await;
    let pending = client.admin_list_kyc(&admin).await.unwrap();
    assert_eq!(pending.len(), 1);

    client.approve_kyc(&admin, &submitted.id).await.unwrap();
    let after = client.admin_list_kyc(&admin).await.unwrap();
    assert_eq!(after[0].status, "approved");

    let mine = client.get_kyc(&session).await.unwrap();
    assert_eq!(mine.status, "approved");
}

#[tokio::test]
async fn kyc_document_upload_and_rejection() {
    let client = start_server().await;
    let session = register(&client, "joe@x.com").await;

    let parts = vec![
        FormPart::Text {
            name: "country".to_string(),
            value: "FR".to_string(),
        },
        FormPart::File {
            name: "document".to_string(),
            filename: "passport.jpg".to_string(),
            bytes: b"jpeg-bytes".to_vec(),
        },
    ];
    let submitted = client.submit_kyc_documents(&session, parts).await.unwrap();
    assert_eq!(submitted.data["country"], "FR");
    assert_eq!(submitted.data["document"], "passport.jpg");

    let admin = admin_session(&client).await;
    client.reject_kyc(&admin, &submitted.id).await.unwrap();
    let mine = client.get_kyc(&session).await.unwrap();
    assert_eq!(mine.status, "rejected");
}

#[tokio::test]
async fn plans_and_signals_flow() {
    let client = start_server().await;
    let session = register(&client, "joe@x.com").await;

    let plans = client.get_plans(&session).await.unwrap();
    assert!(!plans.is_empty());

    let ack = client
        .buy_plan(
            &session,
            &BuyPlanRequest {
                plan_id: plans[0].id.clone(),
                amount: plans[0].min_amount,
            },
        )
        .await
        .unwrap();
    assert_eq!(ack.message.as_deref(), Some("Plan purchased"));

    let err = client
        .buy_plan(
            &session,
            &BuyPlanRequest {
                plan_id: "nope".to_string(),
                amount: 500.0,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Plan not found");
    assert_eq!(err.status(), Some(404));

    let signals = client.get_signals(&session).await.unwrap();
    assert!(!signals.is_empty());
    client
        .subscribe_signal(
            &session,
            &SubscribeSignalRequest {
                signal_id: signals[0].id.clone(),
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn settings_round_trip() {
    let client = start_server().await;
    let session = register(&client, "joe@x.com").await;

    let settings = client.get_settings(&session).await.unwrap();
    assert_eq!(settings, json!({}));

    client
        .update_settings(&session, &json!({"currency": "EUR", "notifications": true}))
        .await
        .unwrap();

    let settings = client.get_settings(&session).await.unwrap();
    assert_eq!(settings["currency"], "EUR");
    assert_eq!(settings["notifications"], true);
}

#[tokio::test]
async fn concurrent_admin_list_fetches_all_resolve() {
    let client = start_server().await;
    let session = register(&client, "joe@x.com").await;
    client
        .deposit(&session, 250.0, "receipt.png", b"png".to_vec())
        .await
        .unwrap();
    let admin = admin_session(&client).await;

    let (deposits, withdrawals, users) = tokio::join!(
        client.admin_list_deposits(&admin),
        client.admin_list_withdrawals(&admin),
        client.admin_list_users(&admin),
    );
    assert_eq!(deposits.unwrap().len(), 1);
    assert!(withdrawals.unwrap().is_empty());
    assert_eq!(users.unwrap().len(), 1);
}

#[tokio::test]
async fn user_token_cannot_reach_admin_routes() {
    let client = start_server().await;
    let session = register(&client, "joe@x.com").await;
    let err = client.admin_list_users(&session).await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(err.to_string(), "Admin access required");
}

#[tokio::test]
async fn admin_password_change_takes_effect() {
    let client = start_server().await;
    let admin = admin_session(&client).await;

    client
        .admin_change_password(
            &admin,
            &ChangePasswordRequest {
                email: mock_server::ADMIN_EMAIL.to_string(),
                old_password: mock_server::ADMIN_PASSWORD.to_string(),
                new_password: "new-secret".to_string(),
            },
        )
        .await
        .unwrap();

    let err = client
        .admin_login(&LoginRequest {
            email: mock_server::ADMIN_EMAIL.to_string(),
            password: mock_server::ADMIN_PASSWORD.to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));

    client
        .admin_login(&LoginRequest {
            email: mock_server::ADMIN_EMAIL.to_string(),
            password: "new-secret".to_string(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn transport_failure_has_no_status() {
    // Nothing listens on this port; the request never completes.
    let client = InvestClient::new("http://127.0.0.1:1");
    let err = client
        .login(&LoginRequest {
            email: "a@b.com".to_string(),
            password: "pw".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(err.status(), None);
}
