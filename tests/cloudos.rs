//! Run the resolvers and the submitter against a mock CloudOS

use std::time::Duration;

use clap::Parser;
use cloudos_phesant::cloudos::CloudOsClient;
use cloudos_phesant::config::{Args, RunConfig};
use cloudos_phesant::error::{Error, ResourceKind};
use cloudos_phesant::job::payload::JobSubmission;
use cloudos_phesant::job::template::TemplateSource;
use cloudos_phesant::{run, Outcome};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer, extra: &[&str]) -> RunConfig {
    let uri = server.uri();
    let mut argv = vec!["cloudos-phesant", "-H", "key", "-u", uri.as_str()];
    argv.extend_from_slice(extra);
    RunConfig::from_args(Args::try_parse_from(argv).unwrap()).unwrap()
}

async fn mount_projects(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/v1/projects"))
        .and(query_param("apikey", "key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_workflows(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/v1/workflows"))
        .and(query_param("apikey", "key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn resolves_project_by_exact_name() {
    let server = MockServer::start().await;
    mount_projects(&server, json!([{"name": "API jobs", "_id": "p1"}, {"name": "Other", "_id": "p2"}])).await;

    let client = CloudOsClient::new(&config(&server, &[])).unwrap();
    assert_eq!(client.resolve_project("API jobs").await.unwrap(), "p1");
}

#[tokio::test]
async fn resolves_workflow_in_workspace() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/workflows"))
        .and(query_param("teamId", "team1"))
        .and(query_param("apikey", "key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "biobank scanner", "_id": "w0"},
            {"name": "Biobank scanner", "_id": "w1"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = CloudOsClient::new(&config(&server, &["-w", "team1"])).unwrap();
    assert_eq!(client.resolve_workflow("Biobank scanner").await.unwrap(), "w1");
}

#[tokio::test]
async fn unknown_project_aborts_before_workflow_and_submission() {
    let server = MockServer::start().await;
    mount_projects(&server, json!([{"name": "X", "_id": "p9"}])).await;
    Mock::given(path("/api/v1/workflows")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;
    Mock::given(path("/api/v1/jobs")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

    let err = run(&config(&server, &[])).await.unwrap_err();
    match err {
        Error::NotFound { kind, name } => {
            assert_eq!(kind, ResourceKind::Project);
            assert_eq!(name, "API jobs");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn project_with_empty_id_aborts_before_submission() {
    let server = MockServer::start().await;
    mount_projects(&server, json!([{"name": "API jobs", "_id": ""}, {"name": "API jobs", "_id": "p2"}])).await;
    mount_workflows(&server, json!([{"name": "Biobank scanner", "_id": "w1"}])).await;
    Mock::given(path("/api/v1/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": "j1"})))
        .expect(0)
        .mount(&server)
        .await;

    let err = run(&config(&server, &[])).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: ResourceKind::Project, .. }));
}

#[tokio::test]
async fn workflow_with_empty_id_is_not_found() {
    let server = MockServer::start().await;
    mount_workflows(&server, json!([{"name": "Biobank scanner", "_id": ""}])).await;

    let client = CloudOsClient::new(&config(&server, &[])).unwrap();
    let err = client.resolve_workflow("Biobank scanner").await.unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: ResourceKind::Workflow, .. }));
}

#[tokio::test]
async fn unrelated_broken_records_do_not_spoil_the_listing() {
    let server = MockServer::start().await;
    mount_projects(&server, json!([
        {"name": null, "_id": "p0"},
        {"name": "API jobs", "_id": "p1"},
        {"name": "Shared", "_id": null},
        {"_id": "p3"}
    ]))
    .await;

    let client = CloudOsClient::new(&config(&server, &[])).unwrap();
    assert_eq!(client.resolve_project("API jobs").await.unwrap(), "p1");
}

#[tokio::test]
async fn unknown_workflow_aborts_before_submission() {
    let server = MockServer::start().await;
    mount_projects(&server, json!([{"name": "API jobs", "_id": "p1"}])).await;
    mount_workflows(&server, json!([])).await;
    Mock::given(path("/api/v1/jobs")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

    let err = run(&config(&server, &[])).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: ResourceKind::Workflow, .. }));
}

#[tokio::test]
async fn submits_phesant_job_and_builds_status_url() {
    let server = MockServer::start().await;
    mount_projects(&server, json!([{"name": "API jobs", "_id": "p1"}])).await;
    mount_workflows(&server, json!([{"name": "Biobank scanner", "_id": "w1"}])).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/jobs"))
        .and(header("apikey", "key"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "project": "p1",
            "workflow": "w1",
            "name": "Biobank scanner API",
            "executionPlatform": "aws",
            "instanceType": "m2.2xlarge"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": "j123", "status": "initializing"})))
        .expect(1)
        .mount(&server)
        .await;

    match run(&config(&server, &[])).await.unwrap() {
        Outcome::Submitted { project_id, workflow_id, job_id, status_url } => {
            assert_eq!(project_id, "p1");
            assert_eq!(workflow_id, "w1");
            assert_eq!(job_id, "j123");
            assert_eq!(status_url, format!("{}/app/jobs/j123", server.uri()));
        }
        other => panic!("expected a submitted job, got {other:?}"),
    }

    let requests = server.received_requests().await.unwrap();
    let post = requests.iter().find(|r| r.method.as_str() == "POST").unwrap();
    assert!(post.url.query_pairs().all(|(k, _)| k != "apikey"));
    let body: serde_json::Value = serde_json::from_slice(&post.body).unwrap();
    assert_eq!(body["parameters"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn dry_run_never_posts() {
    let server = MockServer::start().await;
    mount_projects(&server, json!([{"name": "API jobs", "_id": "p1"}])).await;
    mount_workflows(&server, json!([{"name": "Biobank scanner", "_id": "w1"}])).await;
    Mock::given(path("/api/v1/jobs")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

    match run(&config(&server, &["--dry-run", "--execution_platform", "azure"])).await.unwrap() {
        Outcome::DryRun { submission } => {
            assert_eq!(submission.project, "p1");
            assert_eq!(submission.workflow, "w1");
            assert_eq!(submission.execution_platform.to_string(), "azure");
        }
        other => panic!("expected a dry run, got {other:?}"),
    }
}

#[tokio::test]
async fn submission_response_without_id_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "initializing"})))
        .mount(&server)
        .await;

    let client = CloudOsClient::new(&config(&server, &[])).unwrap();
    let template = TemplateSource::Embedded.read().unwrap();
    let submission = JobSubmission::new(&template, "p1", "w1", "Biobank scanner API");
    let err = client.submit_job(&submission).await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }));
}

#[tokio::test]
async fn submission_response_with_empty_id_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": ""})))
        .expect(1)
        .mount(&server)
        .await;

    let client = CloudOsClient::new(&config(&server, &[])).unwrap();
    let template = TemplateSource::Embedded.read().unwrap();
    let submission = JobSubmission::new(&template, "p1", "w1", "Biobank scanner API");
    match client.submit_job(&submission).await.unwrap_err() {
        Error::MalformedResponse { endpoint, reason } => {
            assert!(endpoint.ends_with("/api/v1/jobs"));
            assert!(reason.contains("empty"));
        }
        other => panic!("expected a malformed response, got {other:?}"),
    }
}

#[tokio::test]
async fn listing_that_is_not_an_array_is_malformed() {
    let server = MockServer::start().await;
    mount_projects(&server, json!({"projects": []})).await;

    let client = CloudOsClient::new(&config(&server, &[])).unwrap();
    let err = client.resolve_project("API jobs").await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }));
}

#[tokio::test]
async fn listing_that_is_not_json_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(path("/api/v1/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let client = CloudOsClient::new(&config(&server, &[])).unwrap();
    let err = client.resolve_project("API jobs").await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }));
}

#[tokio::test]
async fn non_success_status_is_reported_with_body() {
    let server = MockServer::start().await;
    Mock::given(path("/api/v1/projects"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let client = CloudOsClient::new(&config(&server, &[])).unwrap();
    match client.resolve_project("API jobs").await.unwrap_err() {
        Error::Status { status, body, endpoint } => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid api key");
            assert!(!endpoint.contains("apikey"));
        }
        other => panic!("expected a status error, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(path("/api/v1/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let client = CloudOsClient::new(&config(&server, &["--timeout", "1"])).unwrap();
    let err = client.resolve_project("API jobs").await.unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }));
}

#[tokio::test]
async fn submitting_twice_creates_two_jobs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": "j1"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": "j2"})))
        .mount(&server)
        .await;

    let client = CloudOsClient::new(&config(&server, &[])).unwrap();
    let template = TemplateSource::Embedded.read().unwrap();
    let submission = JobSubmission::new(&template, "p1", "w1", "Biobank scanner API");

    let first = client.submit_job(&submission).await.unwrap();
    let second = client.submit_job(&submission).await.unwrap();
    assert_ne!(first, second);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}
