mod support;

use axum::http::{Method, StatusCode};
use axum::Router;
use serde_json::json;

use support::{app, business_body, call, memory_config, register, sqlite_config};

async fn retail_id(app: &Router) -> anyhow::Result<i64> {
    let cats = call(app, Method::GET, "/api/categories", None, None).await?;
    assert_eq!(cats.status, StatusCode::OK);
    let id = cats.body.as_array().and_then(|a| a.iter().find(|c| c["name"] == "Retail")).map(|c| c["id"].as_i64().unwrap_or_default());
    Ok(id.expect("Retail category seeded"))
}

/// alice lists a shop in Retail, bob likes it and rates it 4, alice pays for
/// placement and the shop shows up as featured.
async fn listing_lifecycle(app: Router) -> anyhow::Result<()> {
    let (alice_id, alice) = register(&app, "alice").await?;
    let (_, bob) = register(&app, "bob").await?;
    let retail = retail_id(&app).await?;

    let created = call(&app, Method::POST, "/api/businesses", Some(&alice), Some(business_body(retail, "Alice's Shop"))).await?;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    let x = created.body["id"].as_i64().unwrap_or_default();
    assert_eq!(created.body["ownerId"].as_i64(), Some(alice_id));
    assert_eq!(created.body["status"], "pending");

    let liked = call(&app, Method::POST, &format!("/api/businesses/{x}/like"), Some(&bob), None).await?;
    assert_eq!(liked.status, StatusCode::CREATED);
    let again = call(&app, Method::POST, &format!("/api/businesses/{x}/like"), Some(&bob), None).await?;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);

    let commented = call(
        &app,
        Method::POST,
        &format!("/api/businesses/{x}/comments"),
        Some(&bob),
        Some(json!({"content": "Great service", "rating": 4})),
    )
    .await?;
    assert_eq!(commented.status, StatusCode::CREATED);
    let bad_rating = call(
        &app,
        Method::POST,
        &format!("/api/businesses/{x}/comments"),
        Some(&bob),
        Some(json!({"content": "Off the scale", "rating": 9})),
    )
    .await?;
    assert_eq!(bad_rating.status, StatusCode::BAD_REQUEST);

    let featured = call(&app, Method::GET, "/api/businesses/featured", None, None).await?;
    assert!(!featured.body.as_array().map(|a| a.iter().any(|b| b["id"] == x)).unwrap_or(false));

    let activated = call(&app, Method::POST, "/api/subscription/activate-demo", Some(&alice), Some(json!({"businessId": x}))).await?;
    assert_eq!(activated.status, StatusCode::OK, "{}", activated.body);
    assert_eq!(activated.body["status"], "active");

    let featured = call(&app, Method::GET, "/api/businesses/featured", None, None).await?;
    assert!(featured.body.as_array().map(|a| a.iter().any(|b| b["id"] == x)).unwrap_or(false));

    let shop = call(&app, Method::GET, &format!("/api/businesses/{x}"), None, None).await?;
    assert_eq!(shop.body["likeCount"], 1);
    assert_eq!(shop.body["commentCount"], 1);
    assert_eq!(shop.body["rating"], 4);
    assert_eq!(shop.body["isPaid"], true);
    assert_eq!(shop.body["status"], "active");

    let cat = call(&app, Method::GET, &format!("/api/categories/{retail}"), None, None).await?;
    assert_eq!(cat.body["businessCount"], 1);
    Ok(())
}

async fn ownership_and_soft_delete(app: Router) -> anyhow::Result<()> {
    let (alice_id, alice) = register(&app, "alice").await?;
    let (bob_id, bob) = register(&app, "bob").await?;
    let retail = retail_id(&app).await?;
    let x = call(&app, Method::POST, "/api/businesses", Some(&alice), Some(business_body(retail, "Corner")))
        .await?
        .body["id"]
        .as_i64()
        .unwrap_or_default();

    assert_eq!(call(&app, Method::POST, "/api/businesses", None, Some(business_body(retail, "Anon"))).await?.status, StatusCode::UNAUTHORIZED);
    let hijack = call(&app, Method::PUT, &format!("/api/businesses/{x}"), Some(&bob), Some(json!({"name": "Mine now"}))).await?;
    assert_eq!(hijack.status, StatusCode::FORBIDDEN);
    assert_eq!(call(&app, Method::DELETE, &format!("/api/businesses/{x}"), Some(&bob), None).await?.status, StatusCode::FORBIDDEN);
    assert_eq!(call(&app, Method::GET, &format!("/api/users/{alice_id}/businesses"), Some(&bob), None).await?.status, StatusCode::FORBIDDEN);
    assert_eq!(call(&app, Method::GET, &format!("/api/users/{bob_id}/likes"), Some(&bob), None).await?.status, StatusCode::OK);

    let renamed = call(&app, Method::PUT, &format!("/api/businesses/{x}"), Some(&alice), Some(json!({"name": "Corner Store"}))).await?;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.body["name"], "Corner Store");

    let search = call(&app, Method::GET, "/api/businesses/search?q=corner", None, None).await?;
    assert_eq!(search.body.as_array().map(Vec::len), Some(1));
    assert_eq!(call(&app, Method::GET, "/api/businesses/search", None, None).await?.status, StatusCode::BAD_REQUEST);

    let deleted = call(&app, Method::DELETE, &format!("/api/businesses/{x}"), Some(&alice), None).await?;
    assert_eq!(deleted.status, StatusCode::OK);
    let row = call(&app, Method::GET, &format!("/api/businesses/{x}"), None, None).await?;
    assert_eq!(row.body["isActive"], false);
    let listed = call(&app, Method::GET, &format!("/api/businesses/category/{retail}"), None, None).await?;
    assert_eq!(listed.body.as_array().map(Vec::len), Some(0));
    let cat = call(&app, Method::GET, &format!("/api/categories/{retail}"), None, None).await?;
    assert_eq!(cat.body["businessCount"], 0);

    assert_eq!(call(&app, Method::GET, "/api/businesses/9999", None, None).await?.status, StatusCode::NOT_FOUND);
    Ok(())
}

async fn messaging_and_notifications(app: Router) -> anyhow::Result<()> {
    let (alice_id, alice) = register(&app, "alice").await?;
    let (bob_id, bob) = register(&app, "bob").await?;
    let (_, carol) = register(&app, "carol").await?;
    let retail = retail_id(&app).await?;
    let x = call(&app, Method::POST, "/api/businesses", Some(&alice), Some(business_body(retail, "Bikes")))
        .await?
        .body["id"]
        .as_i64()
        .unwrap_or_default();

    let sent = call(
        &app,
        Method::POST,
        "/api/messages",
        Some(&bob),
        Some(json!({"receiverId": alice_id, "businessId": x, "content": "Do you repair tyres?"})),
    )
    .await?;
    assert_eq!(sent.status, StatusCode::CREATED, "{}", sent.body);
    let msg_id = sent.body["id"].as_i64().unwrap_or_default();

    // a customer may only write to the owner
    let stray = call(
        &app,
        Method::POST,
        "/api/messages",
        Some(&carol),
        Some(json!({"receiverId": bob_id, "businessId": x, "content": "hi"})),
    )
    .await?;
    assert_eq!(stray.status, StatusCode::BAD_REQUEST);

    let unread = call(&app, Method::GET, "/api/notifications/unread-count", Some(&alice), None).await?;
    assert_eq!(unread.body["count"], 1);
    let notes = call(&app, Method::GET, "/api/notifications", Some(&alice), None).await?;
    assert_eq!(notes.body[0]["type"], "message");
    assert_eq!(notes.body[0]["relatedId"].as_i64(), Some(msg_id));

    let reply = call(
        &app,
        Method::POST,
        "/api/messages",
        Some(&alice),
        Some(json!({"receiverId": bob_id, "businessId": x, "content": "Yes"})),
    )
    .await?;
    assert_eq!(reply.status, StatusCode::CREATED);

    let thread = call(&app, Method::GET, &format!("/api/conversations/{x}/{bob_id}"), Some(&alice), None).await?;
    let contents: Vec<&str> = thread.body.as_array().map(|a| a.iter().filter_map(|m| m["content"].as_str()).collect()).unwrap_or_default();
    assert_eq!(contents, vec!["Do you repair tyres?", "Yes"]);
    assert_eq!(
        call(&app, Method::GET, &format!("/api/conversations/{x}/{bob_id}"), Some(&carol), None).await?.status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(call(&app, Method::GET, &format!("/api/businesses/{x}/messages"), Some(&bob), None).await?.status, StatusCode::FORBIDDEN);

    assert_eq!(call(&app, Method::PATCH, &format!("/api/messages/{msg_id}/read"), Some(&bob), None).await?.status, StatusCode::FORBIDDEN);
    let read = call(&app, Method::PATCH, &format!("/api/messages/{msg_id}/read"), Some(&alice), None).await?;
    assert_eq!(read.body["isRead"], true);

    let all = call(&app, Method::PATCH, "/api/notifications/mark-all-read", Some(&alice), None).await?;
    assert_eq!(all.status, StatusCode::OK);
    let unread = call(&app, Method::GET, "/api/notifications/unread-count", Some(&alice), None).await?;
    assert_eq!(unread.body["count"], 0);
    Ok(())
}

async fn paid_checkout(app: Router) -> anyhow::Result<()> {
    let (_, alice) = register(&app, "alice").await?;
    let retail = retail_id(&app).await?;
    let x = call(&app, Method::POST, "/api/businesses", Some(&alice), Some(business_body(retail, "Paid Shop")))
        .await?
        .body["id"]
        .as_i64()
        .unwrap_or_default();

    let checkout = call(&app, Method::POST, "/api/create-subscription", Some(&alice), Some(json!({"businessId": x}))).await?;
    assert_eq!(checkout.status, StatusCode::OK, "{}", checkout.body);
    let order_id = checkout.body["orderId"].as_str().unwrap_or_default().to_string();
    assert!(checkout.body["approvalUrl"].as_str().unwrap_or_default().contains(&order_id));
    let paid_sub = checkout.body["subscription"]["id"].clone();

    // a second checkout opened before paying the first one
    let retry = call(&app, Method::POST, "/api/create-subscription", Some(&alice), Some(json!({"businessId": x}))).await?;
    assert_eq!(retry.status, StatusCode::OK, "{}", retry.body);
    let retry_order = retry.body["orderId"].as_str().unwrap_or_default().to_string();
    let shop = call(&app, Method::GET, &format!("/api/businesses/{x}"), None, None).await?;
    assert_eq!(shop.body["isPaid"], false);

    let verified = call(&app, Method::POST, "/api/subscription/verify", Some(&alice), Some(json!({"orderId": order_id}))).await?;
    assert_eq!(verified.status, StatusCode::OK, "{}", verified.body);
    assert_eq!(verified.body["businessId"].as_i64(), Some(x));

    let shop = call(&app, Method::GET, &format!("/api/businesses/{x}"), None, None).await?;
    assert_eq!(shop.body["isPaid"], true);
    assert_eq!(shop.body["subscriptionId"], paid_sub);

    let twice = call(&app, Method::POST, "/api/create-subscription", Some(&alice), Some(json!({"businessId": x}))).await?;
    assert_eq!(twice.status, StatusCode::BAD_REQUEST);
    let double_pay = call(&app, Method::POST, "/api/subscription/verify", Some(&alice), Some(json!({"orderId": retry_order}))).await?;
    assert_eq!(double_pay.status, StatusCode::BAD_REQUEST);
    let current = call(&app, Method::GET, &format!("/api/businesses/{x}/subscription"), Some(&alice), None).await?;
    assert_eq!(current.body["id"], paid_sub);

    let canceled = call(&app, Method::POST, "/api/subscription/cancel", Some(&alice), Some(json!({"businessId": x}))).await?;
    assert_eq!(canceled.body["status"], "canceled");
    assert_eq!(canceled.body["id"], paid_sub);
    let shop = call(&app, Method::GET, &format!("/api/businesses/{x}"), None, None).await?;
    assert_eq!(shop.body["isPaid"], false);
    assert_eq!(shop.body["status"], "inactive");
    Ok(())
}

macro_rules! on_both_backends {
    ($($case:ident),* $(,)?) => {
        mod memory {
            $(
                #[tokio::test]
                async fn $case() -> anyhow::Result<()> {
                    super::$case(super::app(&super::memory_config()).await?).await
                }
            )*
        }

        mod sqlite {
            $(
                #[tokio::test]
                async fn $case() -> anyhow::Result<()> {
                    super::$case(super::app(&super::sqlite_config()).await?).await
                }
            )*
        }
    };
}

on_both_backends!(listing_lifecycle, ownership_and_soft_delete, messaging_and_notifications, paid_checkout);
