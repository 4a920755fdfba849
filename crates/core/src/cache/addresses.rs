//! Geocoded address cache operations.
//!
//! Backs [`crate::geocoder::CachingGeocoder`]: one row per queried address,
//! looked up by [`address_key`].

use super::connection::CacheDb;
use super::hash::address_key;
use crate::Error;
use crate::geocoder::GeocodedAddress;
use chrono::Utc;
use tokio_rusqlite::params;

impl CacheDb {
    /// Get a stored geocoding result for `address`, ignoring case.
    pub async fn get_geocoded_address(&self, address: &str) -> Result<Option<GeocodedAddress>, Error> {
        let key = address_key(address);
        self.conn
            .call(move |conn| -> Result<Option<GeocodedAddress>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT queried_address, located_address, longitude, latitude
                    FROM geocoded_addresses WHERE address_key = ?1",
                )?;

                let result = stmt.query_row(params![key], |row| {
                    Ok(GeocodedAddress {
                        queried_address: row.get(0)?,
                        located_address: row.get(1)?,
                        longitude: row.get(2)?,
                        latitude: row.get(3)?,
                    })
                });

                match result {
                    Ok(address) => Ok(Some(address)),
                    Err(tokio_rusqlite::rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or update a geocoding result.
    ///
    /// Uses UPSERT semantics keyed on the case-folded queried address.
    pub async fn put_geocoded_address(&self, address: &GeocodedAddress) -> Result<(), Error> {
        let key = address_key(&address.queried_address);
        let address = address.clone();
        let created_at = Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO geocoded_addresses (address_key, queried_address, located_address, latitude, longitude, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    ON CONFLICT(address_key) DO UPDATE SET
                        queried_address = excluded.queried_address,
                        located_address = excluded.located_address,
                        latitude = excluded.latitude,
                        longitude = excluded.longitude,
                        created_at = excluded.created_at",
                    params![
                        key,
                        address.queried_address,
                        address.located_address,
                        address.latitude,
                        address.longitude,
                        created_at
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}
