//! Gateway notifications applied through the signed webhook.

mod support;

use actix_web::App;
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use rstest::rstest;
use serde_json::json;
use storefront::Trace;
use storefront::domain::{Actor, OrderId, PaymentRecordStatus, UserId};
use storefront::test_support::{TestStorefront, product};
use support::{authed, direct_order, notification, send, stock, text};

#[rstest]
#[actix_web::test]
async fn replays_converge_on_one_ledger_record() {
    let watch = product("CAS-GA2100", "320.00", 4).expect("valid product");
    let shop = TestStorefront::new([watch.clone()]);
    let app = test::init_service(App::new().wrap(Trace).configure(|cfg| shop.register(cfg))).await;
    let buyer = Actor::customer(UserId::random());
    let (status, placed) = send(
        &app,
        direct_order(&shop, &buyer, &watch.id.to_string(), 2, "card_gateway_b", None),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id: OrderId = text(&placed, "/data/id")
        .expect("order id")
        .parse()
        .expect("order id parses");

    let pending = json!({
        "orderId": order_id.to_string(),
        "status": "processing",
        "transactionReference": "GWB-77"
    });
    let settled = json!({
        "orderId": order_id.to_string(),
        "status": "2",
        "transactionReference": "GWB-77",
        "metadata": { "last4": "4242" }
    });

    let (status, body) = send(&app, notification(&shop, "card_gateway_b", &pending)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.pointer("/data/orderChanged"), Some(&json!(false)));
    assert_eq!(text(&body, "/data/payment/status"), Some("pending"));

    for _ in 0..3 {
        let (status, _) = send(&app, notification(&shop, "card_gateway_b", &settled)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let records = shop.payments(order_id).await.expect("ledger readable");
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.status, PaymentRecordStatus::Completed);
    assert_eq!(record.external_reference.as_deref(), Some("GWB-77"));
    assert!(record.paid_at.is_some());
    assert_eq!(record.metadata.get("last4"), Some(&json!("4242")));

    let (_, order) = send(
        &app,
        authed(
            &shop,
            &buyer,
            TestRequest::get().uri(&format!("/api/v1/orders/{order_id}")),
        ),
    )
    .await;
    assert_eq!(text(&order, "/data/status"), Some("confirmed"));
    assert_eq!(text(&order, "/data/paymentStatus"), Some("paid"));
    assert_eq!(stock(&shop, watch.id).await, 2);
}

#[rstest]
#[actix_web::test]
async fn cancelled_orders_only_gain_a_ledger_entry() {
    let watch = product("CAS-GA2100", "320.00", 4).expect("valid product");
    let shop = TestStorefront::new([watch.clone()]);
    let app = test::init_service(App::new().wrap(Trace).configure(|cfg| shop.register(cfg))).await;
    let buyer = Actor::customer(UserId::random());
    let (_, placed) = send(
        &app,
        direct_order(&shop, &buyer, &watch.id.to_string(), 1, "card_gateway_a", None),
    )
    .await;
    let id = text(&placed, "/data/id").expect("order id").to_owned();
    let cancel = TestRequest::put().uri(&format!("/api/v1/orders/{id}/cancel"));
    let (status, _) = send(&app, authed(&shop, &buyer, cancel)).await;
    assert_eq!(status, StatusCode::OK);

    let late = json!({
        "orderId": id,
        "status": "succeeded",
        "transactionReference": "GWA-LATE"
    });
    let (status, body) = send(&app, notification(&shop, "card_gateway_a", &late)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.pointer("/data/orderChanged"), Some(&json!(false)));
    assert_eq!(text(&body, "/data/order/status"), Some("cancelled"));
    assert_eq!(text(&body, "/data/order/paymentStatus"), Some("refunded"));
    assert_eq!(text(&body, "/data/payment/status"), Some("completed"));
    assert_eq!(stock(&shop, watch.id).await, 4);
}

#[rstest]
#[actix_web::test]
async fn a_body_signed_for_one_payload_cannot_carry_another() {
    let watch = product("CAS-GA2100", "320.00", 4).expect("valid product");
    let shop = TestStorefront::new([watch.clone()]);
    let app = test::init_service(App::new().wrap(Trace).configure(|cfg| shop.register(cfg))).await;
    let buyer = Actor::customer(UserId::random());
    let (_, placed) = send(
        &app,
        direct_order(&shop, &buyer, &watch.id.to_string(), 1, "card_gateway_a", None),
    )
    .await;
    let id = text(&placed, "/data/id").expect("order id").to_owned();
    let signed = serde_json::to_vec(&json!({
        "orderId": id,
        "status": "failed",
        "transactionReference": "GWA-1"
    }))
    .expect("serialisable body");
    let forged = serde_json::to_vec(&json!({
        "orderId": id,
        "status": "succeeded",
        "transactionReference": "GWA-1"
    }))
    .expect("serialisable body");

    let req = TestRequest::post()
        .uri("/api/v1/payments/notifications/card_gateway_a")
        .insert_header(shop.signature(&signed).expect("signed"))
        .set_payload(forged);
    let (status, _) = send(&app, req).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let order_id: OrderId = id.parse().expect("order id parses");
    assert!(shop.payments(order_id).await.expect("ledger readable").is_empty());
}

#[rstest]
#[actix_web::test]
async fn gateway_settlement_supersedes_pending_bank_slip() {
    let watch = product("SEI-SRPD55", "180.00", 2).expect("valid product");
    let shop = TestStorefront::new([watch.clone()]);
    let app = test::init_service(App::new().wrap(Trace).configure(|cfg| shop.register(cfg))).await;
    let buyer = Actor::customer(UserId::random());
    let (status, placed) = send(
        &app,
        direct_order(
            &shop,
            &buyer,
            &watch.id.to_string(),
            1,
            "bank_transfer",
            Some("SLIP-881"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = text(&placed, "/data/id").expect("order id").to_owned();

    let settled = json!({
        "orderId": id,
        "status": "succeeded",
        "transactionReference": "GWA-881"
    });
    let (status, body) = send(&app, notification(&shop, "card_gateway_a", &settled)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text(&body, "/data/order/paymentStatus"), Some("paid"));

    let order_id: OrderId = id.parse().expect("order id parses");
    let records = shop.payments(order_id).await.expect("ledger readable");
    assert_eq!(records.len(), 2);
    let slip = records
        .iter()
        .find(|record| record.external_reference.is_none())
        .expect("slip record kept");
    assert_eq!(slip.status, PaymentRecordStatus::Failed);
    assert_eq!(slip.metadata.get("supersededBy"), Some(&json!("GWA-881")));
    assert!(
        records
            .iter()
            .all(|record| record.status != PaymentRecordStatus::Pending)
    );
}
