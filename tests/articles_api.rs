//! End-to-end checks of the `/articles` contract, driven through the router
//! against both store engines.

use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;
use wikiapi::{articles, ArticleStore, MemoryStore, Response, Router, SqliteStore};

const NO_MATCH: &str = "No matching article was found ";

struct Api {
    router: Router,
}

impl Api {
    fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self { router: articles::routes(store) }
    }

    async fn send(&self, method: &str, uri: &str, content_type: Option<&str>, body: &str) -> Response {
        let mut req = http::Request::builder().method(method).uri(uri);
        if let Some(ct) = content_type {
            req = req.header("content-type", ct);
        }
        self.router
            .dispatch(req.body(Bytes::copy_from_slice(body.as_bytes())).unwrap())
            .await
    }

    async fn get(&self, uri: &str) -> Response {
        self.send("GET", uri, None, "").await
    }

    async fn form(&self, method: &str, uri: &str, body: &str) -> Response {
        self.send(method, uri, Some("application/x-www-form-urlencoded"), body).await
    }

    async fn json(&self, method: &str, uri: &str, body: &str) -> Response {
        self.send(method, uri, Some("application/json"), body).await
    }
}

fn body_json(res: &Response) -> Value {
    serde_json::from_slice(res.body()).expect("JSON body")
}

fn engines() -> Vec<(&'static str, Api)> {
    vec![
        ("memory", Api::new(Arc::new(MemoryStore::new()))),
        ("sqlite", Api::new(Arc::new(SqliteStore::open_in_memory().unwrap()))),
    ]
}

#[tokio::test]
async fn cats_lifecycle() {
    for (engine, api) in engines() {
        let res = api.form("POST", "/articles", "title=Cats&content=Cats+are+great").await;
        assert_eq!(res.status_code(), 200, "{engine}");
        assert!(res.body_text().unwrap().starts_with("Successfully save the article{"), "{engine}");

        let res = api.get("/articles/Cats").await;
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.header("content-type"), Some("application/json"));
        let article = body_json(&res);
        assert_eq!(article["title"], "Cats", "{engine}");
        assert_eq!(article["content"], "Cats are great", "{engine}");
        let id = article["_id"].clone();

        let res = api.form("PATCH", "/articles/Cats", "content=Cats+are+the+best").await;
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.body_text(), Some("Successfully updated the requested article"));

        let article = body_json(&api.get("/articles/Cats").await);
        assert_eq!(article["title"], "Cats", "{engine}");
        assert_eq!(article["content"], "Cats are the best", "{engine}");
        assert_eq!(article["_id"], id, "{engine}");

        let res = api.get("/articles/Cats").await;
        assert_eq!(res.status_code(), 200);

        let res = api.send("DELETE", "/articles/Cats", None, "").await;
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.body_text(), Some("Successfully deleted the document"));

        let res = api.get("/articles/Cats").await;
        assert_eq!(res.status_code(), 200, "{engine}");
        assert_eq!(res.body_text(), Some(NO_MATCH), "{engine}");
    }
}

#[tokio::test]
async fn put_overwrites_the_whole_document() {
    for (engine, api) in engines() {
        api.form("POST", "/articles", "title=Cats&content=Cats+are+great").await;

        let res = api.json("PUT", "/articles/Cats", r#"{"content":"Just content"}"#).await;
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.body_text(), Some("Update Successful"));

        assert_eq!(api.get("/articles/Cats").await.body_text(), Some(NO_MATCH), "{engine}");

        let all = body_json(&api.get("/articles").await);
        let all = all.as_array().unwrap();
        assert_eq!(all.len(), 1, "{engine}");
        assert!(all[0].get("title").is_none(), "{engine}");
        assert_eq!(all[0]["content"], "Just content", "{engine}");
    }
}

#[tokio::test]
async fn put_with_both_fields_renames() {
    for (engine, api) in engines() {
        api.form("POST", "/articles", "title=Cats&content=old").await;
        api.form("PUT", "/articles/Cats", "title=Dogs&content=new").await;

        assert_eq!(api.get("/articles/Cats").await.body_text(), Some(NO_MATCH), "{engine}");
        let dogs = body_json(&api.get("/articles/Dogs").await);
        assert_eq!(dogs["content"], "new", "{engine}");
    }
}

#[tokio::test]
async fn delete_all_then_list_is_empty() {
    for (engine, api) in engines() {
        for title in ["a", "b", "c"] {
            api.form("POST", "/articles", &format!("title={title}&content=x")).await;
        }
        assert_eq!(body_json(&api.get("/articles").await).as_array().unwrap().len(), 3);

        let res = api.send("DELETE", "/articles", None, "").await;
        assert_eq!(res.status_code(), 200);
        assert_eq!(
            res.body_text(),
            Some(r#"Successfully deleted all the articles{"acknowledged":true,"deletedCount":3}"#),
            "{engine}"
        );

        let res = api.get("/articles").await;
        assert_eq!(res.status_code(), 200);
        assert_eq!(body_json(&res), serde_json::json!([]), "{engine}");
    }
}

#[tokio::test]
async fn lookups_are_exact_and_decoded() {
    for (engine, api) in engines() {
        api.json("POST", "/articles", r#"{"title":"Cats Rule","content":"yes"}"#).await;

        assert_eq!(body_json(&api.get("/articles/Cats%20Rule").await)["content"], "yes", "{engine}");
        assert_eq!(api.get("/articles/cats%20rule").await.body_text(), Some(NO_MATCH), "{engine}");
        assert_eq!(api.get("/articles/Cats").await.body_text(), Some(NO_MATCH), "{engine}");
    }
}

#[tokio::test]
async fn bodies_are_never_rejected() {
    for (engine, api) in engines() {
        let res = api.send("POST", "/articles", Some("text/plain"), "title=Cats").await;
        assert_eq!(res.status_code(), 200, "{engine}");

        let res = api.json("POST", "/articles", "{broken").await;
        assert_eq!(res.status_code(), 200, "{engine}");

        let all = body_json(&api.get("/articles").await);
        let all = all.as_array().unwrap();
        assert_eq!(all.len(), 2, "{engine}");
        for article in all {
            assert!(article.get("title").is_none(), "{engine}");
            assert!(article.get("content").is_none(), "{engine}");
            assert!(article["_id"].is_string(), "{engine}");
        }
    }
}

#[tokio::test]
async fn unknown_routes_and_methods() {
    let api = Api::new(Arc::new(MemoryStore::new()));

    assert_eq!(api.get("/").await.status_code(), 404);
    assert_eq!(api.get("/articles/Cats/comments").await.status_code(), 404);

    let res = api.send("PUT", "/articles", None, "").await;
    assert_eq!(res.status_code(), 405);
    assert_eq!(res.header("allow"), Some("DELETE, GET, HEAD, POST"));

    let res = api.send("POST", "/articles/Cats", None, "").await;
    assert_eq!(res.status_code(), 405);
    assert_eq!(res.header("allow"), Some("DELETE, GET, HEAD, PATCH, PUT"));
}

#[tokio::test]
async fn head_mirrors_get_without_a_body() {
    let api = Api::new(Arc::new(MemoryStore::new()));
    api.form("POST", "/articles", "title=Cats&content=x").await;

    for uri in ["/articles", "/articles/Cats"] {
        let res = api.send("HEAD", uri, None, "").await;
        assert_eq!(res.status_code(), 200, "{uri}");
        assert_eq!(res.header("content-type"), Some("application/json"), "{uri}");
        assert!(res.body().is_empty(), "{uri}");
    }
}
