use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use routesweep_geom::{haversine, Point};
use tracing::{debug, warn};

use crate::cache::cache_key;
use crate::config::OracleConfig;
use crate::error::OracleError;
use crate::profile::Profile;
use crate::response::{OracleResponse, OracleStats, WireResponse};

type ProfileLimiter = RateLimiter<governor::state::NotKeyed, governor::state::InMemoryState, governor::clock::DefaultClock>;

/// Client for the external routing oracle (spec §4.B).
///
/// `route()` never fails: on missing configuration, exhausted retries, or a
/// non-retryable error, it degrades to a synthetic straight-line connector
/// and counts it in [`OracleClient::stats`].
pub struct OracleClient {
    http: Option<reqwest::Client>,
    config: OracleConfig,
    cache: Option<DashMap<u64, OracleResponse>>,
    limiters: DashMap<Profile, Arc<ProfileLimiter>>,
    real_calls: AtomicU64,
    synthetic_calls: AtomicU64,
}

impl OracleClient {
    #[must_use]
    pub fn new(config: OracleConfig) -> Self {
        let http = config.base_url.as_ref().map(|_| {
            reqwest::Client::builder()
                .timeout(config.call_timeout)
                .build()
                .expect("reqwest client construction with a static config cannot fail")
        });
        Self {
            http,
            cache: config.cache_enabled.then(DashMap::new),
            limiters: DashMap::new(),
            config,
            real_calls: AtomicU64::new(0),
            synthetic_calls: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn stats(&self) -> OracleStats {
        OracleStats {
            real_calls: self.real_calls.load(Ordering::Relaxed),
            synthetic_calls: self.synthetic_calls.load(Ordering::Relaxed),
        }
    }

    /// Requests driving geometry from `start` to `end` for `profile`.
    ///
    /// Inherent method, so ordinary call sites (`client.route(...)`) never
    /// pay for the trait object's boxed future; [`crate::RoutingOracle`]
    /// exists only for callers that need dynamic dispatch (e.g. tests that
    /// swap in a mock oracle).
    pub async fn route(&self, start: Point, end: Point, profile: Profile) -> OracleResponse {
        let key = cache_key(start, end, profile);
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&key) {
                debug!(profile = profile.as_str(), "oracle cache hit");
                return hit.clone();
            }
        }

        let Some(http) = &self.http else {
            return self.record_synthetic(start, end);
        };

        self.limiter_for(profile).until_ready().await;

        let mut last_err = None;
        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tokio::time::sleep(self.backoff_delay(attempt)).await;
            }
            match tokio::time::timeout(
                self.config.call_timeout,
                call_once(http, &self.config, start, end, profile),
            )
            .await
            {
                Ok(Ok(resp)) => {
                    self.real_calls.fetch_add(1, Ordering::Relaxed);
                    if let Some(cache) = &self.cache {
                        cache.insert(key, resp.clone());
                    }
                    return resp;
                }
                Ok(Err(e)) => {
                    let transient = e.is_transient();
                    last_err = Some(e);
                    if !transient {
                        break;
                    }
                }
                Err(_elapsed) => {
                    last_err = Some(OracleError::Timeout);
                }
            }
        }

        warn!(
            profile = profile.as_str(),
            error = ?last_err,
            "routing oracle exhausted; falling back to synthetic connector"
        );
        self.record_synthetic(start, end)
    }

    fn record_synthetic(&self, start: Point, end: Point) -> OracleResponse {
        self.synthetic_calls.fetch_add(1, Ordering::Relaxed);
        OracleResponse {
            distance_m: haversine(start, end),
            duration_s: 0.0,
            geometry: vec![start, end],
            synthetic: true,
        }
    }

    fn limiter_for(&self, profile: Profile) -> Arc<ProfileLimiter> {
        self.limiters
            .entry(profile)
            .or_insert_with(|| {
                let rps = self
                    .config
                    .requests_per_second_per_profile
                    .try_into()
                    .unwrap_or(nonzero!(5u32));
                Arc::new(RateLimiter::direct(Quota::per_second(rps)))
            })
            .clone()
    }

    fn backoff_delay(&self, attempt: u32) -> std::time::Duration {
        let exp = self.config.backoff_base.saturating_mul(1 << attempt.min(10));
        let jitter_frac: f64 = rand::random::<f64>() * 0.25;
        exp.mul_f64(1.0 + jitter_frac)
    }
}

async fn call_once(
    http: &reqwest::Client,
    config: &OracleConfig,
    start: Point,
    end: Point,
    profile: Profile,
) -> Result<OracleResponse, OracleError> {
    let base = config
        .base_url
        .as_ref()
        .expect("call_once is only invoked once base_url is known to be set");
    let mut url = base.clone();
    url.set_path(&format!("{}/route", url.path().trim_end_matches('/')));

    let resp = http
        .get(url)
        .query(&[
            ("start_lon", start.lon),
            ("start_lat", start.lat),
            ("end_lon", end.lon),
            ("end_lat", end.lat),
        ])
        .query(&[("profile", profile.as_str())])
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        return Err(OracleError::Status(status));
    }

    let wire: WireResponse = resp
        .json()
        .await
        .map_err(|e| OracleError::Malformed(e.to_string()))?;

    if wire.geometry.len() < 2 {
        return Err(OracleError::Malformed(
            "oracle geometry has fewer than two points".to_string(),
        ));
    }

    Ok(OracleResponse {
        geometry: wire.geometry.iter().map(|[lon, lat]| Point::new(*lon, *lat)).collect(),
        distance_m: wire.distance_m,
        duration_s: wire.duration_s,
        synthetic: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn offline_client_always_falls_back_to_synthetic() {
        let client = OracleClient::new(OracleConfig::default());
        let start = Point::new(-122.42, 37.77);
        let end = Point::new(-122.41, 37.78);
        let resp = client.route(start, end, Profile::Car).await;
        assert!(resp.synthetic);
        assert_eq!(resp.geometry.len(), 2);
        assert_eq!(client.stats().synthetic_calls, 1);
        assert_eq!(client.stats().real_calls, 0);
    }

    #[tokio::test]
    async fn synthetic_distance_matches_haversine() {
        let client = OracleClient::new(OracleConfig::default());
        let start = Point::new(-122.42, 37.77);
        let end = Point::new(-122.41, 37.78);
        let resp = client.route(start, end, Profile::Car).await;
        assert!((resp.distance_m - haversine(start, end)).abs() < 1e-6);
    }
}
