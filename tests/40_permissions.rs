mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn admin_round_trip_on_v2() -> Result<()> {
    let server = common::ensure_server().await?;
    let token = server.token_for("tester1", "admin").await?;

    let res = server.add_food("v2", &token, "apple").await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = res.json::<Value>().await?;
    assert_eq!(created["name"], "apple");
    let id = created["id"].as_i64().expect("id");

    let res = server
        .authed(server.client.get(server.url("/api/v2/food")), &token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let foods = res.json::<Vec<Value>>().await?;
    assert!(foods.contains(&created));

    let res = server
        .authed(server.client.put(server.url(&format!("/api/v2/food/{}", id))), &token)
        .json(&json!({ "name": "notBanana", "calories": 100, "type": "fruit" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["name"], "notBanana");

    let res = server
        .authed(server.client.delete(server.url(&format!("/api/v2/food/{}", id))), &token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!(1));

    let res = server
        .authed(server.client.get(server.url(&format!("/api/v2/food/{}", id))), &token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, Value::Null);
    Ok(())
}

#[tokio::test]
async fn user_role_can_read_but_not_write_on_v2() -> Result<()> {
    let server = common::ensure_server().await?;
    let admin = server.token_for("tester1", "admin").await?;
    let user = server.token_for("tester2", "user").await?;
    server.add_food("v2", &admin, "apple").await?;

    let res = server
        .authed(server.client.get(server.url("/api/v2/food/1")), &user)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["name"], "apple");

    let res = server.add_food("v2", &user, "banana").await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(res.json::<Value>().await?["message"], "Access Denied");

    let res = server
        .authed(server.client.put(server.url("/api/v2/food/1")), &user)
        .json(&json!({ "name": "notBanana", "calories": 100, "type": "fruit" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(res.json::<Value>().await?["message"], "Access Denied");

    let res = server
        .authed(server.client.delete(server.url("/api/v2/food/1")), &user)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Nothing changed
    let res = server
        .authed(server.client.get(server.url("/api/v2/food/1")), &user)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["name"], "apple");
    Ok(())
}

#[tokio::test]
async fn intermediate_roles_follow_the_ladder() -> Result<()> {
    let server = common::ensure_server().await?;
    let writer = server.token_for("writer", "writer").await?;
    let editor = server.token_for("editor", "editor").await?;

    let res = server.add_food("v2", &writer, "apple").await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = server
        .authed(server.client.put(server.url("/api/v2/food/1")), &writer)
        .json(&json!({ "name": "pear" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .authed(server.client.put(server.url("/api/v2/food/1")), &editor)
        .json(&json!({ "name": "pear" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server
        .authed(server.client.delete(server.url("/api/v2/food/1")), &editor)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn v2_requires_a_token_before_role_check() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = server.client.get(server.url("/api/v2/food")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
