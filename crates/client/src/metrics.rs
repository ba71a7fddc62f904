//! Deterministic pseudo-metrics for connected accounts.
//!
//! Every figure derives from the sum of the username's UTF-16 code units, so
//! the same account always shows the same numbers.

use std::time::Duration;

use async_trait::async_trait;
use socialpulse_shared::{ContentReach, MetricsRecord, Platform, PlatformMetrics, VideoStat};

use crate::error::SocialError;
use crate::log_debug;
use crate::timing::sleep;

/// Sum of UTF-16 code units.
pub fn username_hash(username: &str) -> u64 {
    username.encode_utf16().map(u64::from).sum()
}

fn scaled(value: f64, factor: f64) -> u64 {
    (value * factor).floor() as u64
}

/// Metrics snapshot for `username` on `platform`. Pure.
pub fn generate_metrics(platform: Platform, username: &str) -> MetricsRecord {
    let hash = username_hash(username);
    let base_followers = (hash * 100) as f64 * platform.metrics_multiplier();
    let base_engagement = (hash % 10) as f64 / 100.0;

    MetricsRecord {
        followers: scaled(base_followers, 1.0),
        following: scaled(base_followers, 0.3),
        total_posts: (hash % 500) + 10,
        engagement: base_engagement + 0.01,
        impressions: scaled(base_followers, 5.0),
        likes: scaled(base_followers * base_engagement, 2.0),
        comments: scaled(base_followers * base_engagement, 0.2),
        shares: scaled(base_followers * base_engagement, 0.1),
        views: (platform == Platform::Youtube).then(|| scaled(base_followers, 20.0)),
        platform_specific: platform_specific(platform, hash),
    }
}

fn platform_specific(platform: Platform, seed: u64) -> PlatformMetrics {
    let h = seed as f64;
    match platform {
        Platform::Youtube => PlatformMetrics::Youtube {
            subscribers_gained: scaled(h, 0.1),
            watch_time: seed * 60,
            average_view_duration: (seed % 10) + 1,
            top_videos: vec![
                VideoStat {
                    title: "How to grow your channel".to_string(),
                    views: seed * 2,
                },
                VideoStat {
                    title: "Tips and tricks".to_string(),
                    views: scaled(h, 1.5),
                },
                VideoStat {
                    title: "Product review".to_string(),
                    views: scaled(h, 1.2),
                },
            ],
        },
        Platform::Instagram => PlatformMetrics::Instagram {
            reach_rate: (seed % 50) + 10,
            save_rate: (seed % 10) + 1,
            top_hashtags: ["#trending", "#viral", "#content"].map(String::from).to_vec(),
            stories_views: scaled(h, 0.7),
        },
        Platform::Twitter => PlatformMetrics::Twitter {
            retweet_rate: (seed % 20) + 1,
            quote_rate: (seed % 5) + 1,
            impressions_per_tweet: scaled(h, 0.5),
            top_mentions: ["@user1", "@user2", "@user3"].map(String::from).to_vec(),
        },
        Platform::Facebook => PlatformMetrics::Facebook {
            page_views: scaled(h, 1.1),
            page_followers: scaled(h, 0.8),
            click_through_rate: (seed % 15) + 5,
            reach_by_content_type: ContentReach {
                photos: scaled(h, 0.6),
                videos: scaled(h, 0.9),
                links: scaled(h, 0.3),
            },
        },
    }
}

/// Where the aggregator gets metrics from.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait MetricsSource: Send + Sync {
    async fn fetch(&self, platform: Platform, username: &str) -> Result<MetricsRecord, SocialError>;
}

/// [`generate_metrics`] behind a simulated network delay.
#[derive(Debug, Clone, Copy)]
pub struct MetricsService {
    latency: Duration,
}

impl MetricsService {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl MetricsSource for MetricsService {
    async fn fetch(&self, platform: Platform, username: &str) -> Result<MetricsRecord, SocialError> {
        sleep(self.latency).await;
        log_debug!("Generated {} metrics for {}", platform, username);
        Ok(generate_metrics(platform, username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_sums_utf16_code_units() {
        assert_eq!(username_hash("bob"), 98 + 111 + 98);
        assert_eq!(username_hash(""), 0);
        // Astral characters count as two surrogate units.
        assert_eq!(username_hash("😀"), 0xD83D + 0xDE00);
    }

    #[test]
    fn twitter_metrics_for_bob() {
        let metrics = generate_metrics(Platform::Twitter, "bob");
        assert_eq!(metrics.followers, 24560);
        assert_eq!(metrics.following, 7368);
        assert_eq!(metrics.total_posts, 317);
        assert_eq!(metrics.impressions, 122800);
        assert_eq!(metrics.likes, 3438);
        assert!((metrics.engagement - 0.08).abs() < 1e-9);
        assert_eq!(metrics.views, None);
        assert_eq!(
            metrics.platform_specific,
            PlatformMetrics::Twitter {
                retweet_rate: 8,
                quote_rate: 3,
                impressions_per_tweet: 153,
                top_mentions: vec!["@user1".into(), "@user2".into(), "@user3".into()],
            }
        );
    }

    #[test]
    fn only_youtube_reports_views() {
        let youtube = generate_metrics(Platform::Youtube, "alice");
        let hash = username_hash("alice");
        assert_eq!(youtube.views, Some(hash * 100 * 3 / 2 * 20));
        match youtube.platform_specific {
            PlatformMetrics::Youtube { top_videos, watch_time, .. } => {
                assert_eq!(top_videos.len(), 3);
                assert_eq!(top_videos[0].views, hash * 2);
                assert_eq!(watch_time, hash * 60);
            }
            other => panic!("unexpected block {other:?}"),
        }

        for platform in [Platform::Instagram, Platform::Twitter, Platform::Facebook] {
            assert_eq!(generate_metrics(platform, "alice").views, None);
        }
    }

    #[test]
    fn generation_is_deterministic() {
        for platform in Platform::ALL {
            assert_eq!(
                generate_metrics(platform, "alice"),
                generate_metrics(platform, "alice")
            );
        }
    }

    #[tokio::test]
    async fn service_returns_generated_metrics() {
        let service = MetricsService::new(Duration::ZERO);
        let fetched = service.fetch(Platform::Facebook, "amy").await.unwrap();
        assert_eq!(fetched, generate_metrics(Platform::Facebook, "amy"));
    }
}
