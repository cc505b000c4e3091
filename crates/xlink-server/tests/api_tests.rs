//! HTTP routes exercised through the router without a network listener

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use common::{TestEnv, BOVINE, BOVINE_CSV};
use xlink_server::ingest::{CommitMode, CommitRequest, PrepareRequest};
use xlink_server::models::Dataset;

const BOUNDARY: &str = "xlink-test-boundary";

fn multipart(filename: &str, content: &str, organelle_id: Option<Uuid>) -> Vec<u8> {
    let mut body = String::new();
    if let Some(id) = organelle_id {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"organelle_id\"\r\n\r\n{id}\r\n"
        ));
    }
    body.push_str(&format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: text/csv\r\n\r\n{content}\r\n--{BOUNDARY}--\r\n"
    ));
    body.into_bytes()
}

fn upload(uri: &str, token: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).expect("request")
}

fn json_request(method: Method, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

async fn committed_dataset(env: &TestEnv) -> Dataset {
    let prepared = env
        .importer()
        .prepare(PrepareRequest {
            user_id: env.user.id,
            filename: "Bos_taurus_Mitochondrion.csv".to_string(),
            content: BOVINE_CSV.as_bytes().to_vec(),
            organelle_id: None,
        })
        .await
        .expect("prepare");
    env.importer()
        .commit(CommitRequest {
            user_id: env.user.id,
            file_sha256: prepared.analysis.file_sha256,
            filename: prepared.analysis.filename,
            organism_taxon_id: prepared.analysis.organism.taxon_id,
            organelle_id: prepared.analysis.organelle.id,
            mode: CommitMode::Create,
            dataset_id: None,
            experiment: None,
            description: None,
        })
        .await
        .expect("commit")
        .dataset
}

#[tokio::test]
async fn test_uploads_require_a_token() {
    let env = TestEnv::new().await;
    let app = env.router();

    let (status, body) = send(&app, upload("/uploads/prepare", None, multipart("a_b.csv", BOVINE_CSV, None))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, _) = send(
        &app,
        upload("/uploads/prepare", Some("not-a-jwt"), multipart("a_b.csv", BOVINE_CSV, None)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_flow_over_http() {
    let env = TestEnv::new().await;
    let app = env.router();
    let token = env.token(&env.user);
    let mitochondrion = env.organelle("Mitochondrion").await;

    let (status, prepared) = send(
        &app,
        upload(
            "/uploads/prepare",
            Some(&token),
            multipart("bovine_run1.csv", BOVINE_CSV, Some(mitochondrion.id)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{prepared}");
    let analysis = &prepared["data"]["analysis"];
    assert_eq!(analysis["organism"]["taxon_id"], BOVINE);
    assert_eq!(analysis["organelle"]["name"], "Mitochondrion");
    assert_eq!(analysis["valid_rows"], 3);

    let commit = json!({
        "file_sha256": analysis["file_sha256"],
        "filename": analysis["filename"],
        "organism_taxon_id": BOVINE,
        "organelle_id": mitochondrion.id,
        "mode": "create",
        "experiment": "DSSO crosslinking"
    });
    let (status, committed) = send(&app, json_request(Method::POST, "/uploads/commit", &token, commit)).await;
    assert_eq!(status, StatusCode::CREATED, "{committed}");
    assert_eq!(committed["data"]["inserted_crosslinks"], 3);
    assert_eq!(committed["data"]["dataset"]["status"], "parsed");
    let dataset_id = committed["data"]["dataset"]["id"].as_str().expect("id").to_string();

    let (status, listed) = send(&app, get(&format!("/datasets?organism_taxon_id={BOVINE}&q=run1"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["meta"]["pagination"]["total"], 1);
    assert_eq!(listed["data"][0]["id"], dataset_id.as_str());

    let (status, crosslinks) = send(&app, get(&format!("/datasets/{dataset_id}/crosslinks?per_page=2"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(crosslinks["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(crosslinks["meta"]["pagination"]["pages"], 2);
    assert_eq!(crosslinks["meta"]["pagination"]["has_next"], true);

    let (status, proteins) = send(&app, get(&format!("/proteins?taxon_id={BOVINE}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(proteins["meta"]["pagination"]["total"], 2);

    let (status, protein) = send(&app, get("/proteins/P02769")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(protein["data"]["gene_name"], "GENE_P02769");

    let (status, organism) = send(&app, get(&format!("/organisms/{BOVINE}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(organism["data"]["scientific_name"], "Bos taurus");
}

#[tokio::test]
async fn test_commit_of_unknown_upload() {
    let env = TestEnv::new().await;
    let app = env.router();
    let token = env.token(&env.user);
    let organelle = env.organelle("Nucleus").await;

    let commit = json!({
        "file_sha256": "f".repeat(64),
        "filename": "Bos_taurus_Nucleus.csv",
        "organism_taxon_id": BOVINE,
        "organelle_id": organelle.id,
        "mode": "create"
    });
    let (status, body) = send(&app, json_request(Method::POST, "/uploads/commit", &token, commit)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_dataset_status_and_deletion() {
    let env = TestEnv::new().await;
    let app = env.router();
    let dataset = committed_dataset(&env).await;
    let owner = env.token(&env.user);
    let stranger = env.token(&env.other_user("stranger@lab.org").await);
    let uri = format!("/datasets/{}", dataset.id);
    let status_uri = format!("{uri}/status");

    let (status, body) = send(
        &app,
        json_request(Method::PATCH, &status_uri, &owner, json!({"status": "validated"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "validated");

    let (status, body) = send(
        &app,
        json_request(Method::PATCH, &status_uri, &owner, json!({"status": "parsed"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (status, _) = send(&app, json_request(Method::DELETE, &uri, &stranger, Value::Null)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, json_request(Method::DELETE, &uri, &owner, Value::Null)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted_crosslinks"], 3);

    let (status, _) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(env.store.crosslink_count().await, 0);
}

#[tokio::test]
async fn test_catalog_and_missing_entities() {
    let env = TestEnv::new().await;
    let app = env.router();

    let (status, organelles) = send(&app, get("/organelles")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(organelles["data"].as_array().map(Vec::len), Some(18));

    let (status, _) = send(&app, get("/organisms/4932")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, get("/proteins/Q00000")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, get(&format!("/datasets/{}/crosslinks", Uuid::new_v4()))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_fasta_import_route() {
    let env = TestEnv::new().await;
    let app = env.router();
    let token = env.token(&env.user);

    let fasta = ">sp|P02769|ALBU_BOVIN Albumin OS=Bos taurus OX=9913 GN=ALB PE=1 SV=4\nMKWVTFISLL\nLLFSSAYS\n";
    let (status, body) = send(&app, upload("/proteins/fasta", Some(&token), multipart("albumin.fasta", fasta, None))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["imported"], 1);

    let (status, protein) = send(&app, get("/proteins/P02769")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(protein["data"]["sequence_length"], 18);
    assert_eq!(protein["data"]["gene_name"], "ALB");
}
