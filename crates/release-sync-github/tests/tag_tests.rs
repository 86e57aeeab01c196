use std::sync::Arc;
use std::time::Duration;

use release_sync::test_support::RecordingWaiter;
use release_sync::{DownloadError, FeedbackLog, ResolveError, TagResolver};
use release_sync_github::{GitHubTagResolver, HeaderSet, HttpTransport};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn resolver_for(server: &MockServer, waiter: Arc<RecordingWaiter>) -> GitHubTagResolver {
    let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
    GitHubTagResolver::new(transport, HeaderSet::github_api(None), waiter)
        .with_api_base(server.uri())
}

fn tag_entry(server: &MockServer, name: &str, sha: &str) -> String {
    format!(
        r#"{{"name":"{name}","zipball_url":"z","tarball_url":"t","commit":{{"sha":"{sha}","url":"{}/repos/octo/widgets/commits/{sha}"}},"node_id":"n"}}"#,
        server.uri()
    )
}

fn tag_list(server: &MockServer, tags: &[(&str, &str)]) -> String {
    let entries: Vec<String> = tags
        .iter()
        .map(|(name, sha)| tag_entry(server, name, sha))
        .collect();
    format!("[{}]", entries.join(","))
}

fn commit_body(date: &str, message: &str, author: &str) -> String {
    format!(
        r#"{{"sha":"x","commit":{{"author":{{"name":"{author}","email":"a@example.com","date":"{date}"}},"committer":{{"name":"c","email":"c@example.com","date":"{date}"}},"message":"{message}"}}}}"#
    )
}

async fn mount_tags(server: &MockServer, tags: &[(&str, &str)]) {
    Mock::given(method("GET"))
        .and(path("/repos/octo/widgets/tags"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(tag_list(server, tags), "application/json"),
        )
        .mount(server)
        .await;
}

async fn mount_commit(server: &MockServer, sha: &str, date: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/octo/widgets/commits/{sha}")))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            commit_body(date, &format!("Release {sha}"), "Octo Cat"),
            "application/json",
        ))
        .mount(server)
        .await;
}

async fn mount_failing_commit(server: &MockServer, sha: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/octo/widgets/commits/{sha}")))
        .respond_with(ResponseTemplate::new(500))
        .mount(server)
        .await;
}

#[tokio::test]
async fn orders_by_commit_time_and_drops_failed_tags() {
    let server = MockServer::start().await;
    mount_tags(&server, &[("v2", "c2"), ("v1", "c1"), ("v3", "c3")]).await;
    mount_commit(&server, "c2", "2024-01-01T00:00:00Z").await;
    mount_commit(&server, "c1", "2023-01-01T00:00:00Z").await;
    mount_failing_commit(&server, "c3").await;

    let waiter = Arc::new(RecordingWaiter::new());
    let log = FeedbackLog::new();

    let tags = resolver_for(&server, Arc::clone(&waiter))
        .resolve_ordered_tags("octo", "widgets", &log)
        .await
        .unwrap();

    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["v2", "v1"]);
    assert_eq!(log.warnings().len(), 1);
    assert!(log.warnings()[0].message().contains("v3"));
}

#[tokio::test]
async fn newer_tags_listed_later_move_to_the_front() {
    let server = MockServer::start().await;
    mount_tags(&server, &[("old", "a"), ("mid", "b"), ("new", "c")]).await;
    mount_commit(&server, "a", "2022-05-01T10:00:00Z").await;
    mount_commit(&server, "b", "2023-05-01T10:00:00Z").await;
    mount_commit(&server, "c", "2024-05-01T10:00:00Z").await;

    let tags = resolver_for(&server, Arc::new(RecordingWaiter::new()))
        .resolve_ordered_tags("octo", "widgets", &FeedbackLog::new())
        .await
        .unwrap();

    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["new", "mid", "old"]);
}

#[tokio::test]
async fn enriches_with_commit_details() {
    let server = MockServer::start().await;
    mount_tags(&server, &[("v1.2.0", "abc123")]).await;
    mount_commit(&server, "abc123", "2024-03-05T06:07:08Z").await;

    let tags = resolver_for(&server, Arc::new(RecordingWaiter::new()))
        .resolve_ordered_tags("octo", "widgets", &FeedbackLog::new())
        .await
        .unwrap();

    assert_eq!(tags.len(), 1);
    let tag = &tags[0];
    assert_eq!(tag.name, "v1.2.0");
    assert_eq!(tag.commit.sha, "abc123");
    assert_eq!(tag.commit_message, "Release abc123");
    assert_eq!(tag.author_name, "Octo Cat");
    assert_eq!(tag.commit_date_iso(), "2024-03-05T06:07:08+00:00");
}

#[tokio::test]
async fn waits_between_tags_but_not_after_the_last() {
    let server = MockServer::start().await;
    mount_tags(&server, &[("v3", "c3"), ("v2", "c2"), ("v1", "c1")]).await;
    mount_commit(&server, "c3", "2024-03-01T00:00:00Z").await;
    mount_failing_commit(&server, "c2").await;
    mount_commit(&server, "c1", "2024-01-01T00:00:00Z").await;

    let waiter = Arc::new(RecordingWaiter::new());

    resolver_for(&server, Arc::clone(&waiter))
        .with_delay(Duration::from_secs(3))
        .resolve_ordered_tags("octo", "widgets", &FeedbackLog::new())
        .await
        .unwrap();

    assert_eq!(
        waiter.delays(),
        vec![Duration::from_secs(3), Duration::from_secs(3)]
    );
}

#[tokio::test]
async fn single_tag_needs_no_wait() {
    let server = MockServer::start().await;
    mount_tags(&server, &[("only", "c")]).await;
    mount_commit(&server, "c", "2024-01-01T00:00:00Z").await;

    let waiter = Arc::new(RecordingWaiter::new());

    resolver_for(&server, Arc::clone(&waiter))
        .resolve_ordered_tags("octo", "widgets", &FeedbackLog::new())
        .await
        .unwrap();

    assert_eq!(waiter.count(), 0);
}

#[tokio::test]
async fn list_failure_is_an_error_not_an_empty_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/widgets/tags"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let waiter = Arc::new(RecordingWaiter::new());
    let result = resolver_for(&server, Arc::clone(&waiter))
        .resolve_ordered_tags("octo", "widgets", &FeedbackLog::new())
        .await;

    match result {
        Err(ResolveError::ListTags { owner, repo, source }) => {
            assert_eq!(owner, "octo");
            assert_eq!(repo, "widgets");
            assert!(matches!(source, DownloadError::Http { status: 404, .. }));
        }
        other => panic!("expected ListTags error, got {other:?}"),
    }
    assert_eq!(waiter.count(), 0);
}

#[tokio::test]
async fn all_enrichments_failing_yields_empty_sequence() {
    let server = MockServer::start().await;
    mount_tags(&server, &[("v1", "c1"), ("v2", "c2")]).await;
    mount_failing_commit(&server, "c1").await;
    mount_failing_commit(&server, "c2").await;

    let log = FeedbackLog::new();
    let tags = resolver_for(&server, Arc::new(RecordingWaiter::new()))
        .resolve_ordered_tags("octo", "widgets", &log)
        .await
        .unwrap();

    assert!(tags.is_empty());
    assert_eq!(log.warnings().len(), 2);
}

#[tokio::test]
async fn repository_without_tags_yields_empty_sequence() {
    let server = MockServer::start().await;
    mount_tags(&server, &[]).await;

    let tags = resolver_for(&server, Arc::new(RecordingWaiter::new()))
        .resolve_ordered_tags("octo", "widgets", &FeedbackLog::new())
        .await
        .unwrap();

    assert!(tags.is_empty());
}

#[tokio::test]
async fn malformed_tag_list_is_a_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/widgets/tags"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"message":"nope"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let result = resolver_for(&server, Arc::new(RecordingWaiter::new()))
        .resolve_ordered_tags("octo", "widgets", &FeedbackLog::new())
        .await;

    assert!(matches!(result, Err(ResolveError::Parse { .. })));
}

#[tokio::test]
async fn unparseable_commit_date_skips_the_tag() {
    let server = MockServer::start().await;
    mount_tags(&server, &[("good", "g"), ("bad", "b")]).await;
    mount_commit(&server, "g", "2024-01-01T00:00:00Z").await;
    mount_commit(&server, "b", "last tuesday").await;

    let tags = resolver_for(&server, Arc::new(RecordingWaiter::new()))
        .resolve_ordered_tags("octo", "widgets", &FeedbackLog::new())
        .await
        .unwrap();

    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["good"]);
}

#[tokio::test]
async fn sends_token_on_tag_and_commit_requests() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/widgets/tags"))
        .and(header("Authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            tag_list(&server, &[("v1", "c1")]),
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/widgets/commits/c1"))
        .and(header("Authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            commit_body("2024-01-01T00:00:00Z", "init", "me"),
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
    let resolver = GitHubTagResolver::new(
        transport,
        HeaderSet::github_api(Some("abc")),
        Arc::new(RecordingWaiter::new()),
    )
    .with_api_base(server.uri());

    let tags = resolver
        .resolve_ordered_tags("octo", "widgets", &FeedbackLog::new())
        .await
        .unwrap();
    assert_eq!(tags.len(), 1);
}
