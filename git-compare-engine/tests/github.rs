use git_compare_engine::{FileStatus, GitCompareError, GitHubClient, GitHubConfig};
use pretty_assertions::assert_eq;
use remote_fetch::{FetchError, RemoteFetcher};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> GitHubClient {
    let cfg = GitHubConfig::new(server.uri(), "ghp_test").unwrap();
    GitHubClient::new(RemoteFetcher::new().unwrap(), cfg)
}

#[tokio::test]
async fn fetch_file_decodes_base64_contents() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/appcd-dev/appcd-dist/contents/.env"))
        .and(query_param("ref", "main"))
        .and(header("authorization", "token ghp_test"))
        .and(header("accept", "application/vnd.github.v3+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": ".env",
            "encoding": "base64",
            "content": "QVBQQ0RfVkVS\nU0lPTj12MQo=\n"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let body = client(&server)
        .fetch_file("appcd-dev/appcd-dist", ".env", "main")
        .await
        .unwrap();
    assert_eq!(body, "APPCD_VERSION=v1\n");
}

#[tokio::test]
async fn missing_file_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_file("o/r", ".env", "main")
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");
}

#[tokio::test]
async fn tag_lookup_treats_404_as_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/o/r/git/refs/tags/v1.0.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ref": "refs/tags/v1.0.0" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/o/r/git/refs/tags/v9.9.9"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/o/r/git/refs/tags/locked"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let gh = client(&server);
    assert!(gh.tag_exists("o/r", "v1.0.0").await.unwrap());
    assert!(!gh.tag_exists("o/r", "v9.9.9").await.unwrap());
    assert!(matches!(
        gh.tag_exists("o/r", "locked").await,
        Err(GitCompareError::Fetch(FetchError::Unauthorized))
    ));
}

#[tokio::test]
async fn compare_maps_commits_and_files() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/o/r/compare/v0.65.4...v0.66.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ahead",
            "ahead_by": 2,
            "behind_by": 0,
            "total_commits": 2,
            "commits": [
                {
                    "sha": "0123456789abcdef",
                    "html_url": "https://github.com/o/r/commit/0123456",
                    "commit": {
                        "message": "fix: resolve [AB-123]\n\nAlso [ABCD-4567]",
                        "author": { "name": "Dana", "date": "2025-07-10T09:05:00Z" }
                    }
                },
                {
                    "sha": "fedcba9876543210",
                    "commit": { "message": "chore: bump", "author": null }
                }
            ],
            "files": [
                { "filename": "a.go", "status": "modified", "additions": 3, "deletions": 1, "changes": 4, "patch": "@@" },
                { "filename": "b.go", "status": "weird" }
            ]
        })))
        .mount(&server)
        .await;

    let cmp = client(&server)
        .compare("o/r", "v0.65.4", "v0.66.0")
        .await
        .unwrap();

    assert_eq!(cmp.repo, "o/r");
    assert_eq!(cmp.status, "ahead");
    assert_eq!(cmp.total_commits, 2);
    assert_eq!(cmp.commits.len(), 2);
    assert_eq!(cmp.commits[0].title(), "fix: resolve [AB-123]");
    assert_eq!(cmp.commits[0].author_name.as_deref(), Some("Dana"));
    assert_eq!(cmp.commits[1].author_name, None);
    assert!(cmp.commit_messages().contains("Also [ABCD-4567]"));
    assert!(!cmp.commit_titles().contains("ABCD-4567"));
    assert_eq!(cmp.files[0].status, FileStatus::Modified);
    assert_eq!(cmp.files[1].status, FileStatus::Unknown);
    assert_eq!(cmp.files[1].changes, 0);
}

#[tokio::test]
async fn invalid_repo_is_rejected_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server).compare("not-a-repo", "a", "b").await.unwrap_err();
    assert!(matches!(err, GitCompareError::Validation(_)));
}
