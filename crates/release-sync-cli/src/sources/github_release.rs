use std::path::PathBuf;

use release_sync::{ArtifactSource, Feedback, FeedbackSink, FetchError, SyncContext};
use release_sync_github::{ArtifactFetcher, HeaderSet, ReleaseClient};

/// Mirrors selected assets of a repository's latest GitHub release.
///
/// Asset names are patterns: `{tag}` expands to the release's own tag and
/// `{latest}` to the newest tag resolved for the sync run.
pub struct GitHubReleaseSource {
    label: String,
    owner: String,
    repo: String,
    assets: Vec<String>,
    releases: ReleaseClient,
    fetcher: ArtifactFetcher,
    download_headers: HeaderSet,
}

impl GitHubReleaseSource {
    pub fn new(
        label: &str,
        owner: &str,
        repo: &str,
        assets: &[String],
        releases: ReleaseClient,
        fetcher: ArtifactFetcher,
        download_headers: HeaderSet,
    ) -> Self {
        Self {
            label: label.to_owned(),
            owner: owner.to_owned(),
            repo: repo.to_owned(),
            assets: assets.to_vec(),
            releases,
            fetcher,
            download_headers,
        }
    }
}

fn expand_pattern(pattern: &str, release_tag: &str, latest_tag: &str) -> String {
    pattern
        .replace("{tag}", release_tag)
        .replace("{latest}", latest_tag)
}

#[async_trait::async_trait]
impl ArtifactSource for GitHubReleaseSource {
    fn label(&self) -> &str {
        &self.label
    }

    async fn fetch(
        &self,
        context: &SyncContext,
        feedback: &dyn FeedbackSink,
    ) -> Result<Vec<PathBuf>, FetchError> {
        let release = self.releases.latest(&self.owner, &self.repo).await?;
        feedback.emit(Feedback::info(format!(
            "Latest {}/{} release: {}",
            self.owner, self.repo, release.tag_name
        )));

        let wanted: Vec<String> = self
            .assets
            .iter()
            .map(|p| expand_pattern(p, &release.tag_name, &context.latest_tag))
            .collect();

        for name in &wanted {
            if release.asset(name).is_none() {
                feedback.emit(Feedback::warning(format!(
                    "{}/{} {} has no asset named {name}",
                    self.owner, self.repo, release.tag_name
                )));
            }
        }

        // Release order, not pattern order.
        let mut written = Vec::new();
        for asset in release.assets.iter().filter(|a| wanted.contains(&a.name)) {
            let path = self
                .fetcher
                .download(
                    &asset.browser_download_url,
                    Some(&asset.name),
                    Some(&self.download_headers),
                    feedback,
                )
                .await?;
            written.push(path);
        }

        if written.is_empty() {
            return Err(FetchError::Missing(format!(
                "no matching assets in {}/{} release {}",
                self.owner, self.repo, release.tag_name
            )));
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use release_sync::{DownloadError, FeedbackLog};
    use release_sync_github::HttpTransport;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source_for(
        server: &MockServer,
        dir: &tempfile::TempDir,
        assets: &[&str],
    ) -> GitHubReleaseSource {
        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let releases = ReleaseClient::new(
            transport.clone(),
            HeaderSet::github_api(None),
            Some(server.uri()),
        );
        let fetcher = ArtifactFetcher::new(transport, dir.path());
        let assets: Vec<String> = assets.iter().map(|a| (*a).to_owned()).collect();
        GitHubReleaseSource::new(
            "docker-desktop",
            "asxez",
            "DockerDesktop-CN",
            &assets,
            releases,
            fetcher,
            HeaderSet::browser("Mozilla/5.0 test"),
        )
    }

    async fn mount_release(server: &MockServer, tag: &str, asset_names: &[&str]) {
        let assets: Vec<String> = asset_names
            .iter()
            .map(|name| {
                format!(
                    r#"{{"name":"{name}","browser_download_url":"{}/download/{name}"}}"#,
                    server.uri()
                )
            })
            .collect();
        let body = format!(r#"{{"tag_name":"{tag}","assets":[{}]}}"#, assets.join(","));

        Mock::given(method("GET"))
            .and(path("/repos/asxez/DockerDesktop-CN/releases/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
            .mount(server)
            .await;
    }

    async fn mount_download(server: &MockServer, name: &str, body: &str) {
        let route = format!("/download/{name}");
        Mock::given(method("HEAD"))
            .and(path(route.clone()))
            .respond_with(ResponseTemplate::new(200))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    #[test]
    fn expands_tag_placeholders() {
        assert_eq!(
            expand_pattern("DockerDesktop-{tag}-Windows-x86.exe", "v4.30.0", "v9"),
            "DockerDesktop-v4.30.0-Windows-x86.exe"
        );
        assert_eq!(expand_pattern("wsl.{tag}.0.x64.msi", "2.5.7", "x"), "wsl.2.5.7.0.x64.msi");
        assert_eq!(expand_pattern("build-{latest}.zip", "r", "v2"), "build-v2.zip");
        assert_eq!(expand_pattern("plain.asar", "r", "l"), "plain.asar");
    }

    #[tokio::test]
    async fn downloads_matching_assets_only() {
        let server = MockServer::start().await;
        mount_release(
            &server,
            "v4.30.0",
            &[
                "app-Windows-x86.asar",
                "DockerDesktop-v4.30.0-Windows-x86.exe",
                "checksums.txt",
            ],
        )
        .await;
        mount_download(&server, "app-Windows-x86.asar", "asar").await;
        mount_download(&server, "DockerDesktop-v4.30.0-Windows-x86.exe", "exe").await;

        let dir = tempfile::tempdir().unwrap();
        let source = source_for(
            &server,
            &dir,
            &["DockerDesktop-{tag}-Windows-x86.exe", "app-Windows-x86.asar"],
        );

        let written = source
            .fetch(&SyncContext::new("v4.30.0"), &FeedbackLog::new())
            .await
            .unwrap();

        assert_eq!(
            written,
            vec![
                dir.path().join("app-Windows-x86.asar"),
                dir.path().join("DockerDesktop-v4.30.0-Windows-x86.exe"),
            ]
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("app-Windows-x86.asar")).unwrap(),
            "asar"
        );
        assert!(!dir.path().join("checksums.txt").exists());
    }

    #[tokio::test]
    async fn missing_pattern_warns_but_others_download() {
        let server = MockServer::start().await;
        mount_release(&server, "v1", &["app-Windows-x86.asar"]).await;
        mount_download(&server, "app-Windows-x86.asar", "asar").await;

        let dir = tempfile::tempdir().unwrap();
        let log = FeedbackLog::new();
        let source = source_for(
            &server,
            &dir,
            &["app-Windows-x86.asar", "app-Windows-x86-v2beta.asar"],
        );

        let written = source.fetch(&SyncContext::new("v1"), &log).await.unwrap();

        assert_eq!(written.len(), 1);
        assert_eq!(log.warnings().len(), 1);
        assert!(log.warnings()[0].message().contains("app-Windows-x86-v2beta.asar"));
    }

    #[tokio::test]
    async fn no_matching_assets_is_an_error() {
        let server = MockServer::start().await;
        mount_release(&server, "v1", &["other.zip"]).await;

        let dir = tempfile::tempdir().unwrap();
        let source = source_for(&server, &dir, &["wanted.zip"]);

        let err = source
            .fetch(&SyncContext::new("v1"), &FeedbackLog::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Missing(_)));
    }

    #[tokio::test]
    async fn failing_asset_download_fails_the_source() {
        let server = MockServer::start().await;
        mount_release(&server, "v1", &["a.bin", "b.bin"]).await;
        mount_download(&server, "a.bin", "a").await;
        Mock::given(method("GET"))
            .and(path("/download/b.bin"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let source = source_for(&server, &dir, &["a.bin", "b.bin"]);

        let err = source
            .fetch(&SyncContext::new("v1"), &FeedbackLog::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::Download(DownloadError::Http { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn release_lookup_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/asxez/DockerDesktop-CN/releases/latest"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let source = source_for(&server, &dir, &["a.bin"]);

        let err = source
            .fetch(&SyncContext::new("v1"), &FeedbackLog::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::Download(DownloadError::Http { status: 404, .. })
        ));
    }
}
