use std::collections::HashSet;

use bookshelf_db::{bson::doc, ObjectId, Store};
use bookshelf_kernel::settings::Settings;
use reqwest::StatusCode;
use serde_json::{json, Value};

struct TestServer {
    base_url: String,
    store: Store,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(Settings::default()).await
    }

    async fn spawn_with(settings: Settings) -> Self {
        // Same router as prod, over the in-memory store on an ephemeral port.
        let store = Store::memory();
        let registry = bookshelf_app::build_registry(&store, &settings);
        let app = bookshelf_http::build_router(&registry, &settings);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api/books", addr),
            store,
            handle,
        }
    }

    fn url(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, id)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn dune() -> Value {
    json!({
        "isbn": "0-553-21311-3",
        "title": "Dune",
        "author": { "firstname": "Frank", "lastname": "Herbert" }
    })
}

async fn create(client: &reqwest::Client, srv: &TestServer, book: &Value) -> String {
    let res = client.post(&srv.base_url).json(book).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    body["insertedId"].as_str().unwrap().to_string()
}

async fn get(client: &reqwest::Client, srv: &TestServer, id: &str) -> (StatusCode, Value) {
    let res = client.get(srv.url(id)).send().await.unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

#[tokio::test]
async fn created_book_reads_back_with_same_fields() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let id = create(&client, &srv, &dune()).await;
    assert_eq!(id.len(), 24);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));

    let res = client.get(srv.url(&id)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );

    let mut expected = dune();
    expected["id"] = json!(id);
    assert_eq!(res.json::<Value>().await.unwrap(), expected);
}

#[tokio::test]
async fn unknown_id_is_not_found_and_deletes_nothing() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let missing = ObjectId::new().to_hex();

    let (status, body) = get(&client, &srv, &missing).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let res = client.delete(srv.url(&missing)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({ "deletedCount": 0 }));
}

#[tokio::test]
async fn update_replaces_fields_and_keeps_id() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let id = create(&client, &srv, &dune()).await;

    let replacement = json!({
        "isbn": "0-441-17271-7",
        "title": "Children of Dune",
        "author": { "firstname": "F.", "lastname": "Herbert" }
    });
    let res = client
        .put(srv.url(&id))
        .json(&replacement)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // The response is the document as it was before the update.
    let previous: Value = res.json().await.unwrap();
    assert_eq!(previous["id"], json!(id));
    assert_eq!(previous["title"], "Dune");

    let (status, current) = get(&client, &srv, &id).await;
    assert_eq!(status, StatusCode::OK);
    let mut expected = replacement;
    expected["id"] = json!(id);
    assert_eq!(current, expected);
}

#[tokio::test]
async fn update_with_partial_body_empties_omitted_fields() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let id = create(&client, &srv, &dune()).await;

    let res = client
        .put(srv.url(&id))
        .json(&json!({ "title": "Dune Messiah" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let (_, current) = get(&client, &srv, &id).await;
    assert_eq!(
        current,
        json!({
            "id": id,
            "isbn": "",
            "title": "Dune Messiah",
            "author": { "firstname": "", "lastname": "" }
        })
    );
}

#[tokio::test]
async fn update_ignores_id_in_body() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let id = create(&client, &srv, &dune()).await;
    let other = ObjectId::new().to_hex();

    let mut body = dune();
    body["id"] = json!(other);
    client.put(srv.url(&id)).json(&body).send().await.unwrap();

    let (status, current) = get(&client, &srv, &id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current["id"], json!(id));
    let (status, _) = get(&client, &srv, &other).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleted_book_is_gone() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let id = create(&client, &srv, &dune()).await;

    let res = client.delete(srv.url(&id)).send().await.unwrap();
    assert_eq!(res.json::<Value>().await.unwrap(), json!({ "deletedCount": 1 }));

    let (status, _) = get(&client, &srv, &id).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_returns_survivors_with_unique_ids() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut ids = Vec::new();
    for n in 0..5 {
        let book = json!({ "title": format!("Volume {}", n) });
        ids.push(create(&client, &srv, &book).await);
    }
    for id in &ids[..2] {
        client.delete(srv.url(id)).send().await.unwrap();
    }

    let res = client.get(&srv.base_url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let books: Vec<Value> = res.json().await.unwrap();
    assert_eq!(books.len(), 3);

    let listed: HashSet<&str> = books.iter().map(|b| b["id"].as_str().unwrap()).collect();
    assert_eq!(listed.len(), 3);
    assert_eq!(
        listed,
        ids[2..].iter().map(String::as_str).collect::<HashSet<_>>()
    );
}

#[tokio::test]
async fn malformed_identifier_is_bad_request() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = get(&client, &srv, "not-a-hex-id").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");

    let res = client.delete(srv.url("not-a-hex-id")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(&srv.base_url)
        .body("{\"title\": \"Dune\"")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.get(&srv.base_url).send().await.unwrap();
    assert_eq!(res.json::<Vec<Value>>().await.unwrap().len(), 0);
}

#[tokio::test]
async fn client_supplied_id_is_honoured_on_create() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let chosen = ObjectId::new().to_hex();

    let mut book = dune();
    book["id"] = json!(chosen);
    assert_eq!(create(&client, &srv, &book).await, chosen);

    // A second insert with the same id is a store error
    let res = client.post(&srv.base_url).json(&book).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"]["code"], "store_error");
}

#[tokio::test]
async fn undecodable_record_fails_the_list_request_only() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create(&client, &srv, &dune()).await;

    let Store::Memory(memory) = &srv.store else {
        panic!("test server runs on the in-memory store");
    };
    memory
        .seed("books", doc! { "_id": ObjectId::new(), "title": 42 })
        .await;

    let res = client.get(&srv.base_url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"]["code"], "store_error");

    // The service keeps answering.
    let id = create(&client, &srv, &dune()).await;
    let (status, _) = get(&client, &srv, &id).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn legacy_mode_reports_errors_with_200() {
    let mut settings = Settings::default();
    settings.server.legacy_error_status = true;
    let srv = TestServer::spawn_with(settings).await;
    let client = reqwest::Client::new();

    let (status, body) = get(&client, &srv, &ObjectId::new().to_hex()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"]["code"], "not_found");
}
