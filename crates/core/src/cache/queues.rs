//! Query-aware storage of upstream result sets.
//!
//! Each call to [`CacheDb::store_queues`] appends one `queue_queries` row and
//! its records in a single transaction. [`CacheDb::get_queues`] picks the
//! newest stored query that subsumes the requested one and narrows its
//! records to the requested filter.

use super::connection::CacheDb;
use super::matching::{refine, stored_subsumes};
use crate::query::FilterQuery;
use crate::queue::{Queue, QueueAttributes};
use crate::Error;
use chrono::{SecondsFormat, Utc};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, Row};

/// A queue record flattened for the `queues` table.
///
/// Sub-objects travel as JSON text and are parsed back on read.
#[derive(Debug, Clone)]
struct QueueRow {
    queue: Queue,
    statistics_json: Option<String>,
    dates_json: Option<String>,
    benefits_provided_json: Option<String>,
}

impl QueueRow {
    fn from_queue(queue: &Queue) -> Result<Self, Error> {
        let attributes = &queue.attributes;
        let statistics_json = attributes.statistics.as_ref().map(serde_json::to_string).transpose()?;
        let dates_json = attributes.dates.as_ref().map(serde_json::to_string).transpose()?;
        let benefits_provided_json = attributes.benefits_provided.as_ref().map(serde_json::to_string).transpose()?;

        let mut queue = queue.clone();
        queue.attributes.statistics = None;
        queue.attributes.dates = None;
        queue.attributes.benefits_provided = None;

        Ok(Self { queue, statistics_json, dates_json, benefits_provided_json })
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            queue: Queue {
                kind: row.get(0)?,
                id: row.get(1)?,
                attributes: QueueAttributes {
                    case: row.get(2)?,
                    benefit: row.get(3)?,
                    many_places: row.get(4)?,
                    provider: row.get(5)?,
                    provider_code: row.get(6)?,
                    regon_provider: row.get(7)?,
                    nip_provider: row.get(8)?,
                    teryt_provider: row.get(9)?,
                    place: row.get(10)?,
                    address: row.get(11)?,
                    locality: row.get(12)?,
                    phone: row.get(13)?,
                    teryt_place: row.get(14)?,
                    registry_number: row.get(15)?,
                    id_resort_part_vii: row.get(16)?,
                    id_resort_part_viii: row.get(17)?,
                    benefits_for_children: row.get(18)?,
                    covid_19: row.get(19)?,
                    toilet: row.get(20)?,
                    ramp: row.get(21)?,
                    car_park: row.get(22)?,
                    elevator: row.get(23)?,
                    latitude: row.get(24)?,
                    longitude: row.get(25)?,
                    statistics: None,
                    dates: None,
                    benefits_provided: None,
                },
            },
            statistics_json: row.get(26)?,
            dates_json: row.get(27)?,
            benefits_provided_json: row.get(28)?,
        })
    }

    fn into_queue(self) -> Result<Queue, Error> {
        let mut queue = self.queue;
        queue.attributes.statistics = self.statistics_json.as_deref().map(serde_json::from_str).transpose()?;
        queue.attributes.dates = self.dates_json.as_deref().map(serde_json::from_str).transpose()?;
        queue.attributes.benefits_provided =
            self.benefits_provided_json.as_deref().map(serde_json::from_str).transpose()?;
        Ok(queue)
    }
}

const SELECT_QUEUES: &str = "SELECT
    type, queue_id, \"case\", benefit, many_places, provider, provider_code,
    regon_provider, nip_provider, teryt_provider, place, address, locality,
    phone, teryt_place, registry_number, id_resort_part_vii, id_resort_part_viii,
    benefits_for_children, covid_19, toilet, ramp, car_park, elevator,
    latitude, longitude, statistics_json, dates_json, benefits_provided_json
FROM queues WHERE query_id = ?1 ORDER BY position";

const INSERT_QUEUE: &str = "INSERT INTO queues (
    query_id, position, type, queue_id, \"case\", benefit, many_places, provider,
    provider_code, regon_provider, nip_provider, teryt_provider, place, address,
    locality, phone, teryt_place, registry_number, id_resort_part_vii,
    id_resort_part_viii, benefits_for_children, covid_19, toilet, ramp, car_park,
    elevator, latitude, longitude, statistics_json, dates_json, benefits_provided_json
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
          ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20,
          ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30, ?31)";

impl CacheDb {
    /// Persist a result set for `query`.
    ///
    /// Never fails: storage errors roll the transaction back and are logged.
    pub async fn store_queues(&self, query: &FilterQuery, queues: &[Queue]) {
        match self.insert_queues(query, queues).await {
            Ok(query_id) => tracing::debug!(query_id, records = queues.len(), "stored queues in cache"),
            Err(e) => tracing::warn!(error = %e, records = queues.len(), "failed to store queues in cache"),
        }
    }

    /// Look up a result set covering `query`.
    ///
    /// Returns `None` on a miss. `Some(vec![])` is a hit whose refined
    /// result is empty. Storage errors are logged and treated as a miss.
    pub async fn get_queues(&self, query: &FilterQuery) -> Option<Vec<Queue>> {
        match self.find_queues(query).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read queues from cache, treating as miss");
                None
            }
        }
    }

    /// Insert a query and its records atomically, returning the query id.
    ///
    /// # Errors
    ///
    /// Returns an error if any row violates a storage constraint, in which
    /// case nothing is persisted.
    pub async fn insert_queues(&self, query: &FilterQuery, queues: &[Queue]) -> Result<i64, Error> {
        let query = query.clone();
        let rows = queues.iter().map(QueueRow::from_queue).collect::<Result<Vec<_>, _>>()?;
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        self.conn
            .call(move |conn| -> Result<i64, Error> {
                let tx = conn.transaction()?;

                tx.execute(
                    "INSERT INTO queue_queries (\"case\", benefit_for_children, benefit, province, locality, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        query.case,
                        &query.benefit_for_children,
                        &query.benefit,
                        query.province,
                        &query.locality,
                        &created_at
                    ],
                )?;
                let query_id = tx.last_insert_rowid();

                {
                    let mut stmt = tx.prepare(INSERT_QUEUE)?;
                    for (position, row) in rows.iter().enumerate() {
                        let q = &row.queue;
                        let a = &q.attributes;
                        stmt.execute(params![
                            query_id,
                            position as i64,
                            &q.kind,
                            &q.id,
                            a.case,
                            &a.benefit,
                            &a.many_places,
                            &a.provider,
                            &a.provider_code,
                            &a.regon_provider,
                            &a.nip_provider,
                            &a.teryt_provider,
                            &a.place,
                            &a.address,
                            &a.locality,
                            &a.phone,
                            &a.teryt_place,
                            &a.registry_number,
                            &a.id_resort_part_vii,
                            &a.id_resort_part_viii,
                            &a.benefits_for_children,
                            &a.covid_19,
                            &a.toilet,
                            &a.ramp,
                            &a.car_park,
                            &a.elevator,
                            a.latitude,
                            a.longitude,
                            &row.statistics_json,
                            &row.dates_json,
                            &row.benefits_provided_json,
                        ])?;
                    }
                }

                tx.commit()?;
                Ok(query_id)
            })
            .await
            .map_err(Error::from)
    }

    /// Find the newest stored query subsuming `query` and return its refined records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read or a stored payload is corrupt.
    pub async fn find_queues(&self, query: &FilterQuery) -> Result<Option<Vec<Queue>>, Error> {
        let query = query.clone();

        self.conn
            .call(move |conn| -> Result<Option<Vec<Queue>>, Error> {
                let matched = {
                    let mut stmt = conn.prepare(
                        "SELECT id, \"case\", benefit_for_children, benefit, province, locality
                        FROM queue_queries
                        WHERE \"case\" = ?1 AND (province IS NULL OR province = ?2)
                        ORDER BY id DESC",
                    )?;
                    let candidates = stmt.query_map(params![query.case, query.province], |row| {
                        Ok((
                            row.get::<_, i64>(0)?,
                            FilterQuery {
                                case: row.get(1)?,
                                benefit_for_children: row.get(2)?,
                                benefit: row.get(3)?,
                                province: row.get(4)?,
                                locality: row.get(5)?,
                            },
                        ))
                    })?;

                    let mut matched = None;
                    for candidate in candidates {
                        let (id, stored) = candidate?;
                        if stored_subsumes(&stored, &query) {
                            matched = Some(id);
                            break;
                        }
                    }
                    matched
                };

                let Some(query_id) = matched else {
                    return Ok(None);
                };

                let mut stmt = conn.prepare(SELECT_QUEUES)?;
                let rows = stmt.query_map(params![query_id], QueueRow::from_row)?;
                let mut queues = Vec::new();
                for row in rows {
                    queues.push(row?.into_queue()?);
                }

                tracing::debug!(query_id, stored = queues.len(), "matched cached query");
                Ok(Some(refine(&query, queues)))
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a stored query together with its records.
    ///
    /// Returns whether a query with that id existed.
    pub async fn delete_query(&self, query_id: i64) -> Result<bool, Error> {
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM queue_queries WHERE id = ?1", params![query_id])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }
}
