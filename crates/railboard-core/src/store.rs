//! In-memory record stores.
//!
//! Each store holds one kind of record keyed by [`RecordKey`], together with a
//! textual [`StoreStatus`] and running [`Counters`]. Stores are filled by the
//! feed side of the process (or restored from a snapshot) and only read by
//! the API. Locking is internal; none of the read operations can fail.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::error::{RailboardError, Result};
use crate::model::{Arrival, Departure, Service, Station};

/// Store for [`Arrival`] records.
pub type ArrivalStore = Store<Arrival>;

/// Store for [`Departure`] records.
pub type DepartureStore = Store<Departure>;

/// Store for [`Service`] records.
pub type ServiceStore = Store<Service>;

/// Operational status of a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum StoreStatus {
    /// No data has been received yet.
    #[default]
    Unknown,
    /// The feed is delivering data.
    Up,
    /// The feed stopped delivering data.
    Down,
    /// The feed is back but the store is still catching up.
    Recovering,
}

impl StoreStatus {
    /// Textual form as exposed by the API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Recovering => "RECOVERING",
        }
    }
}

impl fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of record held by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Arrival records.
    Arrival,
    /// Departure records.
    Departure,
    /// Service records.
    Service,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Arrival => "arrival",
            Self::Departure => "departure",
            Self::Service => "service",
        })
    }
}

/// Composite lookup key of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey(String);

impl RecordKey {
    /// Key of a record bound to a station: arrivals and departures.
    #[must_use]
    pub fn station_event(id: &str, station: &str, date: NaiveDate) -> Self {
        Self(format!(
            "{id}/{}/{}",
            station.to_ascii_uppercase(),
            date.format("%Y-%m-%d")
        ))
    }

    /// Key of a service.
    #[must_use]
    pub fn service(id: &str, date: NaiveDate) -> Self {
        Self(format!("{id}/{}", date.format("%Y-%m-%d")))
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A record that can be held by a [`Store`].
pub trait Record: Clone + PartialEq + Send + Sync + 'static {
    /// Kind reported in lookup errors.
    const KIND: RecordKind;

    /// Lookup key of this record.
    fn key(&self) -> RecordKey;

    /// Station the record belongs to, if any.
    fn station(&self) -> Option<&Station>;

    /// Time used to order station boards.
    fn event_time(&self) -> Option<DateTime<Utc>>;

    /// Whether the record is left out of station boards.
    fn is_hidden(&self) -> bool {
        false
    }
}

impl Record for Arrival {
    const KIND: RecordKind = RecordKind::Arrival;

    fn key(&self) -> RecordKey {
        RecordKey::station_event(&self.id, &self.station.code, self.service_date)
    }

    fn station(&self) -> Option<&Station> {
        Some(&self.station)
    }

    fn event_time(&self) -> Option<DateTime<Utc>> {
        Some(self.arrival_time)
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }
}

impl Record for Departure {
    const KIND: RecordKind = RecordKind::Departure;

    fn key(&self) -> RecordKey {
        RecordKey::station_event(&self.id, &self.station.code, self.service_date)
    }

    fn station(&self) -> Option<&Station> {
        Some(&self.station)
    }

    fn event_time(&self) -> Option<DateTime<Utc>> {
        Some(self.departure_time)
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }
}

impl Record for Service {
    const KIND: RecordKind = RecordKind::Service;

    fn key(&self) -> RecordKey {
        RecordKey::service(&self.id, self.service_date)
    }

    fn station(&self) -> Option<&Station> {
        None
    }

    fn event_time(&self) -> Option<DateTime<Utc>> {
        self.stops
            .iter()
            .find_map(|stop| stop.departure_time.or(stop.arrival_time))
    }
}

/// Running message counters of a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Counters {
    /// Records offered to the store.
    pub received: u64,
    /// Records stored or replaced.
    pub processed: u64,
    /// Messages that could not be turned into a record.
    pub errors: u64,
    /// Records identical to the one already stored.
    pub duplicates: u64,
}

/// Aggregate statistics of a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "status": "UP",
    "messages": 1520,
    "counters": {"received": 2100, "processed": 2040, "errors": 3, "duplicates": 57}
}))]
pub struct StoreStats {
    /// Current store status.
    pub status: StoreStatus,
    /// Number of records currently held.
    pub messages: usize,
    /// Running counters.
    pub counters: Counters,
}

struct StoreInner<T> {
    status: StoreStatus,
    counters: Counters,
    records: HashMap<RecordKey, T>,
}

/// In-memory store for one kind of record.
pub struct Store<T: Record> {
    inner: RwLock<StoreInner<T>>,
}

impl<T: Record> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Store<T> {
    /// Create an empty store with status [`StoreStatus::Unknown`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                status: StoreStatus::default(),
                counters: Counters::default(),
                records: HashMap::new(),
            }),
        }
    }

    /// Current status.
    pub async fn status(&self) -> StoreStatus {
        self.inner.read().await.status
    }

    /// Replace the status.
    pub async fn set_status(&self, status: StoreStatus) {
        let mut inner = self.inner.write().await;
        if inner.status != status {
            let kind = T::KIND;
            tracing::info!(%kind, from = %inner.status, to = %status, "Store status changed");
            inner.status = status;
        }
    }

    /// Store a record, replacing any record with the same key.
    pub async fn insert(&self, record: T) {
        let key = record.key();
        let mut inner = self.inner.write().await;
        inner.counters.received += 1;

        if inner.records.get(&key) == Some(&record) {
            inner.counters.duplicates += 1;
            return;
        }

        inner.records.insert(key, record);
        inner.counters.processed += 1;
    }

    /// Count a message that could not be processed.
    pub async fn record_error(&self) {
        self.inner.write().await.counters.errors += 1;
    }

    /// Look up a record by key.
    pub async fn get(&self, key: &RecordKey) -> Option<T> {
        self.inner.read().await.records.get(key).cloned()
    }

    /// Look up a record by key, reporting a miss as [`RailboardError::RecordNotFound`].
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` if no record is stored under `key`.
    pub async fn find(&self, key: &RecordKey) -> Result<T> {
        self.get(key).await.ok_or_else(|| RailboardError::RecordNotFound {
            kind: T::KIND,
            key: key.to_string(),
        })
    }

    /// Visible records at the station with the given code, ordered by time.
    pub async fn by_station(&self, code: &str) -> Vec<T> {
        self.board(|station| station.code.eq_ignore_ascii_case(code))
            .await
    }

    /// Visible records at the station with the given UIC code, ordered by time.
    pub async fn by_station_uic(&self, uic: &str) -> Vec<T> {
        self.board(|station| station.uic == uic).await
    }

    async fn board<F>(&self, matches: F) -> Vec<T>
    where
        F: Fn(&Station) -> bool,
    {
        let inner = self.inner.read().await;
        let mut records: Vec<T> = inner
            .records
            .values()
            .filter(|record| !record.is_hidden())
            .filter(|record| record.station().is_some_and(&matches))
            .cloned()
            .collect();
        records.sort_by_key(T::event_time);
        records
    }

    /// Number of records held.
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.records.is_empty()
    }

    /// Aggregate statistics.
    pub async fn stats(&self) -> StoreStats {
        let inner = self.inner.read().await;
        StoreStats {
            status: inner.status,
            messages: inner.records.len(),
            counters: inner.counters,
        }
    }

    /// All records, in no particular order.
    pub async fn snapshot(&self) -> Vec<T> {
        self.inner.read().await.records.values().cloned().collect()
    }

    /// Replace all records with `records`. Counters are left untouched.
    pub async fn restore(&self, records: Vec<T>) -> usize {
        let mut inner = self.inner.write().await;
        inner.records = records
            .into_iter()
            .map(|record| (record.key(), record))
            .collect();
        inner.records.len()
    }
}

/// The three stores served by the API. Cheap to clone.
#[derive(Clone, Default)]
pub struct Stores {
    /// Arrival store.
    pub arrivals: Arc<ArrivalStore>,
    /// Departure store.
    pub departures: Arc<DepartureStore>,
    /// Service store.
    pub services: Arc<ServiceStore>,
}

impl Stores {
    /// Create three empty stores.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::model::{Arrival, Departure, Service, ServiceStop, Station};

    pub fn station(code: &str, uic: &str) -> Station {
        Station {
            code: code.to_string(),
            uic: uic.to_string(),
            name_short: code.to_string(),
            name_medium: code.to_string(),
            name_long: code.to_string(),
        }
    }

    pub fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
    }

    pub fn arrival(id: &str, code: &str, hour: u32) -> Arrival {
        Arrival {
            id: id.to_string(),
            service_date: date(),
            service_number: id.to_string(),
            company: "NS".to_string(),
            train_type: "Intercity".to_string(),
            station: station(code, "8400621"),
            origin: vec![station("ASD", "8400058")],
            arrival_time: Utc.with_ymd_and_hms(2025, 1, 31, hour, 0, 0).unwrap(),
            delay_seconds: 0,
            platform_planned: Some("5".to_string()),
            platform_actual: None,
            cancelled: false,
            hidden: false,
        }
    }

    pub fn departure(id: &str, code: &str, uic: &str, hour: u32) -> Departure {
        Departure {
            id: id.to_string(),
            service_date: date(),
            service_number: id.to_string(),
            company: "NS".to_string(),
            train_type: "Sprinter".to_string(),
            station: station(code, uic),
            destination: vec![station("GD", "8400258")],
            departure_time: Utc.with_ymd_and_hms(2025, 1, 31, hour, 0, 0).unwrap(),
            delay_seconds: 120,
            platform_planned: Some("18".to_string()),
            platform_actual: Some("19".to_string()),
            cancelled: false,
            hidden: false,
        }
    }

    pub fn service(id: &str) -> Service {
        Service {
            id: id.to_string(),
            service_date: date(),
            service_number: id.to_string(),
            company: "NS".to_string(),
            train_type: "Intercity".to_string(),
            stops: vec![ServiceStop {
                station: station("UT", "8400621"),
                arrival_time: None,
                departure_time: Some(Utc.with_ymd_and_hms(2025, 1, 31, 8, 0, 0).unwrap()),
                platform: Some("5".to_string()),
                cancelled: false,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{arrival, date, departure, service};
    use super::*;

    #[tokio::test]
    async fn test_new_store_is_unknown_and_empty() {
        let store = ArrivalStore::new();
        assert_eq!(store.status().await, StoreStatus::Unknown);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_status_is_read_fresh() {
        let store = DepartureStore::new();
        store.set_status(StoreStatus::Up).await;
        assert_eq!(store.status().await, StoreStatus::Up);
        store.set_status(StoreStatus::Down).await;
        assert_eq!(store.status().await, StoreStatus::Down);
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&StoreStatus::Recovering).unwrap();
        assert_eq!(json, "\"RECOVERING\"");
        assert_eq!(StoreStatus::Up.to_string(), "UP");
    }

    #[tokio::test]
    async fn test_insert_counts_duplicates() {
        let store = ArrivalStore::new();
        store.insert(arrival("1", "UT", 8)).await;
        store.insert(arrival("1", "UT", 8)).await;

        let mut changed = arrival("1", "UT", 8);
        changed.delay_seconds = 60;
        store.insert(changed).await;

        let stats = store.stats().await;
        assert_eq!(stats.messages, 1);
        assert_eq!(stats.counters.received, 3);
        assert_eq!(stats.counters.processed, 2);
        assert_eq!(stats.counters.duplicates, 1);
    }

    #[tokio::test]
    async fn test_find_by_key_ignores_station_case() {
        let store = ArrivalStore::new();
        store.insert(arrival("1", "UT", 8)).await;

        let key = RecordKey::station_event("1", "ut", date());
        assert_eq!(store.find(&key).await.unwrap().id, "1");
    }

    #[tokio::test]
    async fn test_find_reports_missing_record() {
        let store = ServiceStore::new();
        let err = store
            .find(&RecordKey::service("404", date()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RailboardError::RecordNotFound {
                kind: RecordKind::Service,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_station_board_is_ordered_and_skips_hidden() {
        let store = ArrivalStore::new();
        store.insert(arrival("2", "UT", 10)).await;
        store.insert(arrival("1", "UT", 8)).await;
        store.insert(arrival("3", "ASD", 9)).await;
        let mut hidden = arrival("4", "UT", 9);
        hidden.hidden = true;
        store.insert(hidden).await;

        let ids: Vec<String> = store
            .by_station("ut")
            .await
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_board_by_uic() {
        let store = DepartureStore::new();
        store.insert(departure("1", "UT", "8400621", 8)).await;
        store.insert(departure("2", "GD", "8400258", 8)).await;

        let board = store.by_station_uic("8400258").await;
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].station.code, "GD");
    }

    #[tokio::test]
    async fn test_restore_replaces_records_keeps_counters() {
        let store = ServiceStore::new();
        store.insert(service("1")).await;
        let restored = store.restore(vec![service("2"), service("3")]).await;

        assert_eq!(restored, 2);
        assert!(store.get(&RecordKey::service("1", date())).await.is_none());
        assert_eq!(store.stats().await.counters.processed, 1);
    }
}
