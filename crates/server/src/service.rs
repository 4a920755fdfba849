//! Queue orchestration: cache, upstream and geocoder glued together.

use std::sync::Arc;

use nfzq_client::QueuesSource;
use nfzq_core::{CacheDb, Error, FilterQuery, Geocoder, Queue};

/// Answers queue queries from the cache, falling back to the upstream.
#[derive(Clone)]
pub struct QueuesService {
    cache: CacheDb,
    source: Arc<dyn QueuesSource>,
    geocoder: Arc<dyn Geocoder>,
}

impl QueuesService {
    pub fn new(cache: CacheDb, source: Arc<dyn QueuesSource>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { cache, source, geocoder }
    }

    /// All records matching `query`, with coordinates from the geocoder.
    ///
    /// A cached result set (even an empty one) skips the upstream. Records
    /// are geocoded on every call, cached or not.
    pub async fn find_all(&self, query: &FilterQuery) -> Result<Vec<Queue>, Error> {
        query.validate()?;

        let mut queues = match self.cache.get_queues(query).await {
            Some(cached) => {
                tracing::info!(count = cached.len(), "cache hit");
                cached
            }
            None => {
                tracing::info!("cache miss");
                let fetched = self.source.fetch_all(query).await?;
                self.cache.store_queues(query, &fetched).await;
                fetched
            }
        };

        for queue in &mut queues {
            self.locate(queue).await;
        }

        Ok(queues)
    }

    async fn locate(&self, queue: &mut Queue) {
        let address = queue.geocoding_address();
        match self.geocoder.geocode(&address).await {
            Ok(located) => {
                queue.attributes.longitude = Some(located.longitude);
                queue.attributes.latitude = Some(located.latitude);
            }
            Err(e) => tracing::warn!(id = %queue.id, address, error = %e, "geocoding failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeGeocoder, FakeSource, queue};
    use nfzq_core::HardcodedGeocoder;

    fn katowice() -> Vec<Queue> {
        vec![
            queue("1", "PORADNIA ENDOKRYNOLOGICZNA", "KATOWICE", "2469011"),
            queue("2", "PORADNIA ENDOKRYNOLOGICZNA DLA DZIECI", "KATOWICE", "2469011"),
        ]
    }

    async fn service(source: &FakeSource, geocoder: Arc<dyn Geocoder>) -> (QueuesService, CacheDb) {
        let db = CacheDb::open_in_memory().await.unwrap();
        (QueuesService::new(db.clone(), Arc::new(source.clone()), geocoder), db)
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let source = FakeSource::returning(katowice());
        let (service, _db) = service(&source, Arc::new(HardcodedGeocoder)).await;
        let query = FilterQuery::new(1, "false").with_benefit("endokryno").with_province(12);

        let first = service.find_all(&query).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(source.calls(), 1);

        let second = service.find_all(&query).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_unstorable_result_is_still_returned() {
        let mut records = katowice();
        records[1].attributes.toilet = None;
        let source = FakeSource::returning(records);
        let (service, db) = service(&source, Arc::new(HardcodedGeocoder)).await;
        let query = FilterQuery::new(1, "false").with_province(12);

        let first = service.find_all(&query).await.unwrap();
        assert_eq!(first.len(), 2);
        assert!(first[1].attributes.toilet.is_none());
        assert_eq!(first[1].attributes.latitude, Some(42.0));
        assert!(db.get_queues(&query).await.is_none());

        let second = service.find_all(&query).await.unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_narrower_query_served_from_cache() {
        let source = FakeSource::returning(katowice());
        let (service, _db) = service(&source, Arc::new(HardcodedGeocoder)).await;

        service.find_all(&FilterQuery::new(1, "false").with_benefit("endo").with_province(12)).await.unwrap();
        let narrowed = service
            .find_all(&FilterQuery::new(1, "FALSE").with_benefit("endokrynologiczna dla").with_province(12))
            .await
            .unwrap();

        assert_eq!(source.calls(), 1);
        let ids: Vec<&str> = narrowed.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[tokio::test]
    async fn test_other_case_goes_upstream() {
        let source = FakeSource::returning(katowice());
        let (service, _db) = service(&source, Arc::new(HardcodedGeocoder)).await;

        service.find_all(&FilterQuery::new(1, "false")).await.unwrap();
        service.find_all(&FilterQuery::new(2, "false")).await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_geocodes_every_record_on_every_call() {
        let source = FakeSource::returning(katowice());
        let geocoder = FakeGeocoder::default();
        let (service, _db) = service(&source, Arc::new(geocoder.clone())).await;
        let query = FilterQuery::new(1, "false");

        let queues = service.find_all(&query).await.unwrap();
        assert_eq!(geocoder.calls(), 2);
        service.find_all(&query).await.unwrap();
        assert_eq!(geocoder.calls(), 4);

        assert_eq!(geocoder.addresses()[0], "UL. CEGLANA 35, KATOWICE, ŚLĄSK");
        assert!(queues.iter().all(|q| q.attributes.latitude == Some(50.0) && q.attributes.longitude == Some(19.0)));
    }

    #[tokio::test]
    async fn test_hardcoded_coordinates_overwrite_upstream_ones() {
        let mut records = katowice();
        records[0].attributes.latitude = Some(50.25);
        records[0].attributes.longitude = Some(19.02);
        let source = FakeSource::returning(records);
        let (service, _db) = service(&source, Arc::new(HardcodedGeocoder)).await;

        let queues = service.find_all(&FilterQuery::new(1, "false")).await.unwrap();
        assert_eq!(queues[0].attributes.latitude, Some(42.0));
        assert_eq!(queues[0].attributes.longitude, Some(1337.0));
    }

    #[tokio::test]
    async fn test_geocode_failure_keeps_coordinates() {
        let mut records = katowice();
        records[0].attributes.latitude = Some(50.25);
        let source = FakeSource::returning(records);
        let (service, _db) = service(&source, Arc::new(FakeGeocoder::failing())).await;

        let queues = service.find_all(&FilterQuery::new(1, "false")).await.unwrap();
        assert_eq!(queues.len(), 2);
        assert_eq!(queues[0].attributes.latitude, Some(50.25));
        assert_eq!(queues[1].attributes.latitude, None);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_not_cached() {
        let source = FakeSource::failing();
        let (service, db) = service(&source, Arc::new(HardcodedGeocoder)).await;
        let query = FilterQuery::new(1, "false");

        let err = service.find_all(&query).await.unwrap_err();
        assert!(matches!(err, Error::UpstreamFetch(_)));
        assert!(db.get_queues(&query).await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_query_touches_nothing() {
        let source = FakeSource::returning(katowice());
        let (service, _db) = service(&source, Arc::new(HardcodedGeocoder)).await;

        let err = service.find_all(&FilterQuery::new(1, "false").with_locality("KATOWICE")).await.unwrap_err();
        assert!(err.is_invalid_query());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_broken_cache_still_answers() {
        let source = FakeSource::returning(katowice());
        let (service, db) = service(&source, Arc::new(HardcodedGeocoder)).await;
        db.close().await;
        let query = FilterQuery::new(1, "false");

        assert_eq!(service.find_all(&query).await.unwrap().len(), 2);
        assert_eq!(service.find_all(&query).await.unwrap().len(), 2);
        assert_eq!(source.calls(), 2);
    }
}
