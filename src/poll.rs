// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::error::{DispatchError, PollError};
use crate::feed::{Episode, episodes_from_entries, fetch_feed};
use crate::http::HttpClient;
use crate::progress::{ProgressEvent, SharedProgressReporter};
use crate::quality::Quality;
use crate::queue::DownloadQueue;
use crate::resolve::Resolver;
use crate::watermark::Watermark;

/// Original series names to download, compared case-insensitively
#[derive(Debug, Clone, Default)]
pub struct InterestSet {
    names: HashSet<String>,
}

impl InterestSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|name| normalize(name.as_ref()))
            .filter(|name| !name.is_empty())
            .collect();
        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&normalize(name))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Options for a polling tick
#[derive(Debug, Clone)]
pub struct PollOptions {
    pub feed_url: String,
    /// Quality requested from the download list
    pub quality: Quality,
    pub interest: InterestSet,
    /// Directory the download queue should save content into
    pub download_path: String,
}

/// Result of a polling tick
#[derive(Debug, Clone)]
pub struct PollResult {
    /// Episodes published after the watermark
    pub new_episodes: usize,
    /// Episodes handed to the download queue
    pub dispatched: usize,
    /// New episodes not on the interest list
    pub skipped: usize,
    /// Episodes whose resolution or queueing failed
    pub failed: usize,
    /// Details of failed episodes (label, error message)
    pub failed_episodes: Vec<(String, String)>,
    /// Watermark after the tick
    pub watermark: DateTime<Utc>,
    /// Set when the watermark could not be persisted
    pub persist_error: Option<String>,
}

/// Run one polling tick
///
/// 1. Reads the watermark
/// 2. Fetches the feed (a failure ends the tick with the watermark untouched)
/// 3. Parses titles, dropping entries that aren't episode announcements
/// 4. Resolves and queues every new episode on the interest list
/// 5. Advances the watermark to the newest publication time seen
///
/// The watermark only moves once the whole batch has been attempted, so
/// episodes that failed are not retried on later ticks.
pub async fn poll_once<C: HttpClient>(
    client: &C,
    resolver: &Resolver<C>,
    queue: &dyn DownloadQueue,
    watermark: &mut Watermark,
    options: &PollOptions,
    reporter: &SharedProgressReporter,
) -> Result<PollResult, PollError> {
    let checked_after = watermark.read();
    reporter.report(ProgressEvent::TickStarted {
        watermark: checked_after,
    });

    reporter.report(ProgressEvent::FetchingFeed {
        url: options.feed_url.clone(),
    });
    let entries = match fetch_feed(client, &options.feed_url).await {
        Ok(entries) => entries,
        Err(e) => {
            reporter.report(ProgressEvent::FeedFailed {
                error: e.to_string(),
            });
            return Err(e.into());
        }
    };

    let total_entries = entries.len();
    let episodes = episodes_from_entries(entries);
    let episode_count = episodes.len();
    let new_episodes: Vec<Episode> = episodes
        .into_iter()
        .filter(|episode| episode.published > checked_after)
        .collect();

    reporter.report(ProgressEvent::FeedParsed {
        total_entries,
        episodes: episode_count,
        new_episodes: new_episodes.len(),
    });

    let mut candidate = checked_after;
    let mut dispatched = 0;
    let mut skipped = 0;
    let mut failed_episodes = Vec::new();

    for episode in &new_episodes {
        candidate = candidate.max(episode.published);
        let label = episode.title.label();

        if !options.interest.contains(&episode.title.original_name) {
            reporter.report(ProgressEvent::EpisodeSkipped { episode: label });
            skipped += 1;
            continue;
        }

        reporter.report(ProgressEvent::DispatchStarting {
            episode: label.clone(),
        });

        match dispatch(resolver, queue, episode, options).await {
            Ok(()) => {
                reporter.report(ProgressEvent::DispatchCompleted { episode: label });
                dispatched += 1;
            }
            Err(e) => {
                reporter.report(ProgressEvent::DispatchFailed {
                    episode: label.clone(),
                    error: e.to_string(),
                });
                failed_episodes.push((label, e.to_string()));
            }
        }
    }

    let persist_error = match watermark.advance(candidate) {
        Ok(advanced) => {
            reporter.report(ProgressEvent::WatermarkAdvanced {
                watermark: advanced,
            });
            None
        }
        Err(e) => {
            reporter.report(ProgressEvent::WatermarkPersistFailed {
                error: e.to_string(),
            });
            Some(e.to_string())
        }
    };

    let failed = failed_episodes.len();
    reporter.report(ProgressEvent::TickCompleted {
        dispatched_count: dispatched,
        skipped_count: skipped,
        failed_count: failed,
    });

    Ok(PollResult {
        new_episodes: new_episodes.len(),
        dispatched,
        skipped,
        failed,
        failed_episodes,
        watermark: candidate,
        persist_error,
    })
}

async fn dispatch<C: HttpClient>(
    resolver: &Resolver<C>,
    queue: &dyn DownloadQueue,
    episode: &Episode,
    options: &PollOptions,
) -> Result<(), DispatchError> {
    let torrent = resolver
        .resolve(&episode.detail_url, options.quality)
        .await?;
    queue.add(&torrent, &options.download_path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::TimeZone;
    use tempfile::tempdir;
    use url::Url;

    use crate::error::{PollError, QueueError};
    use crate::http::mock::MockHttpClient;
    use crate::progress::NoopReporter;
    use crate::progress::recording::RecordingReporter;

    const SITE: &str = "https://example.com";
    const FEED_URL: &str = "https://example.com/rss.xml";

    #[derive(Default)]
    struct RecordingQueue {
        added: Mutex<Vec<(Vec<u8>, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl DownloadQueue for RecordingQueue {
        async fn add(&self, torrent: &[u8], download_path: &str) -> Result<(), QueueError> {
            if self.fail {
                return Err(QueueError::Rejected {
                    result: "queue is full".to_string(),
                });
            }
            self.added
                .lock()
                .unwrap()
                .push((torrent.to_vec(), download_path.to_string()));
            Ok(())
        }
    }

    fn item(title: &str, slug: &str, hour: u32) -> String {
        let date = Utc
            .with_ymd_and_hms(2024, 3, 1, hour, 0, 0)
            .unwrap()
            .to_rfc2822();
        format!(
            "<item><title>{title}</title><link>{SITE}/mr/series/{slug}/</link><pubDate>{date}</pubDate></item>"
        )
    }

    fn feed(items: &[String]) -> String {
        format!(
            r#"<?xml version="1.0"?><rss version="2.0"><channel><title>New</title>{}</channel></rss>"#,
            items.concat()
        )
    }

    /// Register the three resolution pages plus the torrent for a series slug
    fn with_episode(client: MockHttpClient, slug: &str, content_id: u64) -> MockHttpClient {
        let list_url = format!("https://files.example.org/list/{content_id}");
        let torrent_url = format!("https://files.example.org/get/{content_id}.torrent");
        client
            .with(
                &format!("{SITE}/series/{slug}/"),
                format!(r#"<div class="external-btn" onclick="PlayEpisode('{content_id}')"></div>"#),
            )
            .with(
                &format!("{SITE}/v_search.php?a={content_id}"),
                format!(r#"<a href="{list_url}">go</a>"#),
            )
            .with(
                &list_url,
                format!(
                    r#"<div class="inner-box--list"><div class="inner-box--item">
                         <div class="inner-box--label">1080</div>
                         <div class="inner-box--link main"><a href="{torrent_url}">get</a></div>
                       </div></div>"#
                ),
            )
            .with(&torrent_url, format!("torrent-{content_id}"))
    }

    fn options(interest: &[&str]) -> PollOptions {
        PollOptions {
            feed_url: FEED_URL.to_string(),
            quality: Quality::FullHd,
            interest: InterestSet::new(interest),
            download_path: "/downloads/tv".to_string(),
        }
    }

    fn hour(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    fn resolver(client: &Arc<MockHttpClient>) -> Resolver<Arc<MockHttpClient>> {
        Resolver::new(client.clone(), Url::parse(SITE).unwrap())
    }

    #[test]
    fn interest_set_ignores_case_and_whitespace() {
        let interest = InterestSet::new(["The Last of Us", " severance ", ""]);

        assert_eq!(interest.len(), 2);
        assert!(interest.contains("the last of us"));
        assert!(interest.contains("SEVERANCE"));
        assert!(!interest.contains("Silo"));
        assert!(InterestSet::default().is_empty());
    }

    #[tokio::test]
    async fn dispatches_followed_episodes_and_advances_watermark() {
        let dir = tempdir().unwrap();
        let client = MockHttpClient::default().with(
            FEED_URL,
            feed(&[
                item("Шоу (Followed Show). Pilot. (S01E01)", "followed", 10),
                item("Другое (Other Show). Start. (S02E01)", "other", 12),
                item("Site news", "news", 13),
            ]),
        );
        let client = Arc::new(with_episode(client, "followed", 101));
        let queue = RecordingQueue::default();
        let mut watermark = Watermark::new(dir.path().join("marker"));

        let result = poll_once(
            &client,
            &resolver(&client),
            &queue,
            &mut watermark,
            &options(&["followed show"]),
            &NoopReporter::shared(),
        )
        .await
        .unwrap();

        assert_eq!(result.new_episodes, 2);
        assert_eq!(result.dispatched, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.failed, 0);
        assert_eq!(result.watermark, hour(12));
        assert!(result.persist_error.is_none());

        let added = queue.added.lock().unwrap().clone();
        assert_eq!(
            added,
            vec![(b"torrent-101".to_vec(), "/downloads/tv".to_string())]
        );
        assert_eq!(Watermark::new(dir.path().join("marker")).read(), hour(12));
    }

    #[tokio::test]
    async fn failed_resolution_still_advances_watermark() {
        let dir = tempdir().unwrap();
        // Detail page exists but carries no content id
        let client = Arc::new(
            MockHttpClient::default()
                .with(
                    FEED_URL,
                    feed(&[item("Шоу (Followed Show). Pilot. (S01E01)", "followed", 9)]),
                )
                .with(&format!("{SITE}/series/followed/"), "<p>Coming soon</p>"),
        );
        let queue = RecordingQueue::default();
        let mut watermark = Watermark::new(dir.path().join("marker"));
        let options = options(&["Followed Show"]);

        let first = poll_once(
            &client,
            &resolver(&client),
            &queue,
            &mut watermark,
            &options,
            &NoopReporter::shared(),
        )
        .await
        .unwrap();

        assert_eq!(first.failed, 1);
        assert_eq!(first.failed_episodes[0].0, "Followed Show S01E01");
        assert_eq!(first.watermark, hour(9));

        let second = poll_once(
            &client,
            &resolver(&client),
            &queue,
            &mut watermark,
            &options,
            &NoopReporter::shared(),
        )
        .await
        .unwrap();

        assert_eq!(second.new_episodes, 0);
        assert_eq!(second.failed, 0);
        assert_eq!(second.watermark, hour(9));
        assert!(queue.added.lock().unwrap().is_empty());
        // Two feed fetches and one detail page, nothing else
        assert_eq!(client.requests().len(), 3);
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_batch() {
        let dir = tempdir().unwrap();
        let client = MockHttpClient::default().with(
            FEED_URL,
            feed(&[
                item("A (Broken Show). One. (S01E01)", "broken", 8),
                item("B (Working Show). Two. (S01E02)", "working", 7),
            ]),
        );
        let client = Arc::new(with_episode(client, "working", 202));
        let queue = RecordingQueue::default();
        let mut watermark = Watermark::new(dir.path().join("marker"));

        let result = poll_once(
            &client,
            &resolver(&client),
            &queue,
            &mut watermark,
            &options(&["broken show", "working show"]),
            &NoopReporter::shared(),
        )
        .await
        .unwrap();

        assert_eq!(result.dispatched, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.watermark, hour(8));
    }

    #[tokio::test]
    async fn queue_failures_are_reported_per_episode() {
        let dir = tempdir().unwrap();
        let client = MockHttpClient::default().with(
            FEED_URL,
            feed(&[item("A (Followed Show). One. (S01E01)", "followed", 8)]),
        );
        let client = Arc::new(with_episode(client, "followed", 7));
        let queue = RecordingQueue {
            fail: true,
            ..Default::default()
        };
        let reporter = Arc::new(RecordingReporter::default());
        let shared: SharedProgressReporter = reporter.clone();
        let mut watermark = Watermark::new(dir.path().join("marker"));

        let result = poll_once(
            &client,
            &resolver(&client),
            &queue,
            &mut watermark,
            &options(&["followed show"]),
            &shared,
        )
        .await
        .unwrap();

        assert_eq!(result.failed, 1);
        assert!(result.failed_episodes[0].1.contains("queue is full"));
        assert!(reporter.events().iter().any(|event| matches!(
            event,
            ProgressEvent::DispatchFailed { episode, .. } if episode == "Followed Show S01E01"
        )));
    }

    #[tokio::test]
    async fn only_entries_after_watermark_are_processed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("marker");
        std::fs::write(&path, hour(10).timestamp_micros().to_string()).unwrap();

        let client = Arc::new(MockHttpClient::default().with(
            FEED_URL,
            feed(&[
                item("A (Followed Show). Old. (S01E01)", "old", 9),
                item("A (Followed Show). Same. (S01E02)", "same", 10),
            ]),
        ));
        let queue = RecordingQueue::default();
        let mut watermark = Watermark::new(&path);

        let result = poll_once(
            &client,
            &resolver(&client),
            &queue,
            &mut watermark,
            &options(&["followed show"]),
            &NoopReporter::shared(),
        )
        .await
        .unwrap();

        assert_eq!(result.new_episodes, 0);
        assert_eq!(result.watermark, hour(10));
        assert_eq!(client.requests(), vec![FEED_URL]);
    }

    #[tokio::test]
    async fn feed_failure_leaves_watermark_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("marker");
        let client = Arc::new(MockHttpClient::default().with_status(FEED_URL, 503));
        let queue = RecordingQueue::default();
        let reporter = Arc::new(RecordingReporter::default());
        let shared: SharedProgressReporter = reporter.clone();
        let mut watermark = Watermark::new(&path);

        let result = poll_once(
            &client,
            &resolver(&client),
            &queue,
            &mut watermark,
            &options(&["followed show"]),
            &shared,
        )
        .await;

        assert!(matches!(result, Err(PollError::Feed(_))));
        assert!(!path.exists());
        assert!(
            reporter
                .events()
                .iter()
                .any(|event| matches!(event, ProgressEvent::FeedFailed { .. }))
        );
    }

    #[tokio::test]
    async fn persist_failure_is_reported_but_tick_succeeds() {
        let dir = tempdir().unwrap();
        let client = Arc::new(MockHttpClient::default().with(
            FEED_URL,
            feed(&[item("A (Other Show). One. (S01E01)", "other", 6)]),
        ));
        let queue = RecordingQueue::default();
        let mut watermark = Watermark::new(dir.path().join("missing").join("marker"));

        let result = poll_once(
            &client,
            &resolver(&client),
            &queue,
            &mut watermark,
            &options(&["followed show"]),
            &NoopReporter::shared(),
        )
        .await
        .unwrap();

        assert!(result.persist_error.is_some());
        assert_eq!(result.skipped, 1);
        assert_eq!(watermark.read(), hour(6));
    }
}
