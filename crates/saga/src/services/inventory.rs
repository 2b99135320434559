//! Inventory lookup/mutation trait and implementations.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use common::{HotelId, RoomId};
use domain::Money;
use serde::Deserialize;

use crate::remote::{RemoteError, check_status};

/// Hotel data returned by the inventory service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotelRecord {
    pub id: HotelId,
    pub name: String,
    pub city: String,
}

/// Room data returned by the inventory service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomRecord {
    pub id: RoomId,
    pub hotel_id: HotelId,
    pub price_per_night: Money,
    pub available: bool,
}

/// Trait for hotel/room lookups and the availability-flag mutation.
///
/// `set_room_availability` failures are non-fatal to callers; the
/// orchestrators log them and move on.
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Fetches a hotel by id, or `RemoteError::NotFound` when absent.
    async fn get_hotel(&self, id: HotelId) -> Result<HotelRecord, RemoteError>;

    /// Fetches a room's price and availability.
    async fn get_room(
        &self,
        hotel_id: HotelId,
        room_id: RoomId,
    ) -> Result<RoomRecord, RemoteError>;

    /// Sets a room's availability flag.
    async fn set_room_availability(
        &self,
        hotel_id: HotelId,
        room_id: RoomId,
        available: bool,
    ) -> Result<(), RemoteError>;
}

#[derive(Debug, Default)]
struct InMemoryInventoryState {
    hotels: HashMap<i64, HotelRecord>,
    rooms: HashMap<(i64, i64), RoomRecord>,
    fail_on_lookup: bool,
    fail_on_mutation: bool,
    mutation_count: u32,
}

/// In-memory inventory service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventoryService {
    state: Arc<RwLock<InMemoryInventoryState>>,
}

impl InMemoryInventoryService {
    /// Creates a new empty inventory service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a hotel.
    pub fn add_hotel(&self, id: HotelId, name: &str, city: &str) {
        self.state.write().unwrap().hotels.insert(
            id.as_i64(),
            HotelRecord {
                id,
                name: name.to_string(),
                city: city.to_string(),
            },
        );
    }

    /// Registers a room under a hotel.
    pub fn add_room(&self, hotel_id: HotelId, room_id: RoomId, price: Money, available: bool) {
        self.state.write().unwrap().rooms.insert(
            (hotel_id.as_i64(), room_id.as_i64()),
            RoomRecord {
                id: room_id,
                hotel_id,
                price_per_night: price,
                available,
            },
        );
    }

    /// Returns a room's current availability flag.
    pub fn room_available(&self, hotel_id: HotelId, room_id: RoomId) -> Option<bool> {
        self.state
            .read()
            .unwrap()
            .rooms
            .get(&(hotel_id.as_i64(), room_id.as_i64()))
            .map(|r| r.available)
    }

    /// Returns how many availability mutations have been applied.
    pub fn mutation_count(&self) -> u32 {
        self.state.read().unwrap().mutation_count
    }

    /// Configures the service to fail lookups as if unreachable.
    pub fn set_fail_on_lookup(&self, fail: bool) {
        self.state.write().unwrap().fail_on_lookup = fail;
    }

    /// Configures the service to fail availability mutations.
    pub fn set_fail_on_mutation(&self, fail: bool) {
        self.state.write().unwrap().fail_on_mutation = fail;
    }
}

#[async_trait]
impl InventoryService for InMemoryInventoryService {
    async fn get_hotel(&self, id: HotelId) -> Result<HotelRecord, RemoteError> {
        let state = self.state.read().unwrap();
        if state.fail_on_lookup {
            return Err(RemoteError::unavailable("inventory service down"));
        }
        state
            .hotels
            .get(&id.as_i64())
            .cloned()
            .ok_or(RemoteError::NotFound)
    }

    async fn get_room(
        &self,
        hotel_id: HotelId,
        room_id: RoomId,
    ) -> Result<RoomRecord, RemoteError> {
        let state = self.state.read().unwrap();
        if state.fail_on_lookup {
            return Err(RemoteError::unavailable("inventory service down"));
        }
        state
            .rooms
            .get(&(hotel_id.as_i64(), room_id.as_i64()))
            .cloned()
            .ok_or(RemoteError::NotFound)
    }

    async fn set_room_availability(
        &self,
        hotel_id: HotelId,
        room_id: RoomId,
        available: bool,
    ) -> Result<(), RemoteError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_mutation {
            return Err(RemoteError::unavailable("inventory service down"));
        }
        match state.rooms.get_mut(&(hotel_id.as_i64(), room_id.as_i64())) {
            Some(room) => {
                room.available = available;
                state.mutation_count += 1;
                Ok(())
            }
            None => Err(RemoteError::NotFound),
        }
    }
}

/// Wire shape of the inventory service's hotel payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HotelDto {
    id: i64,
    name: String,
    city: String,
}

/// Wire shape of the inventory service's room payload. Prices travel as
/// decimal currency units.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoomDto {
    id: i64,
    price: f64,
    available: bool,
}

/// HTTP client for a remote inventory service.
#[derive(Debug, Clone)]
pub struct HttpInventoryService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpInventoryService {
    /// Creates a client with a bounded per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl InventoryService for HttpInventoryService {
    async fn get_hotel(&self, id: HotelId) -> Result<HotelRecord, RemoteError> {
        let url = format!("{}/api/hotels/{id}", self.base_url);
        let response = self.client.get(&url).send().await?;
        let dto: HotelDto = check_status(response)?.json().await?;
        Ok(HotelRecord {
            id: HotelId::new(dto.id),
            name: dto.name,
            city: dto.city,
        })
    }

    async fn get_room(
        &self,
        hotel_id: HotelId,
        room_id: RoomId,
    ) -> Result<RoomRecord, RemoteError> {
        let url = format!("{}/api/hotels/{hotel_id}/rooms/{room_id}", self.base_url);
        let response = self.client.get(&url).send().await?;
        let dto: RoomDto = check_status(response)?.json().await?;
        Ok(RoomRecord {
            id: RoomId::new(dto.id),
            hotel_id,
            price_per_night: Money::from_cents((dto.price * 100.0).round() as i64),
            available: dto.available,
        })
    }

    async fn set_room_availability(
        &self,
        hotel_id: HotelId,
        room_id: RoomId,
        available: bool,
    ) -> Result<(), RemoteError> {
        let url = format!(
            "{}/api/hotels/{hotel_id}/rooms/{room_id}/availability",
            self.base_url
        );
        let response = self
            .client
            .put(&url)
            .json(&serde_json::json!({ "available": available }))
            .send()
            .await?;
        check_status(response)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> InMemoryInventoryService {
        let service = InMemoryInventoryService::new();
        service.add_hotel(HotelId::new(1), "Hotel Royal Casablanca", "Casablanca");
        service.add_room(
            HotelId::new(1),
            RoomId::new(101),
            Money::from_cents(15000),
            true,
        );
        service
    }

    #[tokio::test]
    async fn test_lookup_hotel_and_room() {
        let service = seeded();

        let hotel = service.get_hotel(HotelId::new(1)).await.unwrap();
        assert_eq!(hotel.name, "Hotel Royal Casablanca");

        let room = service
            .get_room(HotelId::new(1), RoomId::new(101))
            .await
            .unwrap();
        assert_eq!(room.price_per_night, Money::from_cents(15000));
        assert!(room.available);
    }

    #[tokio::test]
    async fn test_missing_entities_are_not_found() {
        let service = seeded();

        assert!(matches!(
            service.get_hotel(HotelId::new(9)).await,
            Err(RemoteError::NotFound)
        ));
        assert!(matches!(
            service.get_room(HotelId::new(1), RoomId::new(999)).await,
            Err(RemoteError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_availability_mutation() {
        let service = seeded();

        service
            .set_room_availability(HotelId::new(1), RoomId::new(101), false)
            .await
            .unwrap();
        assert_eq!(
            service.room_available(HotelId::new(1), RoomId::new(101)),
            Some(false)
        );
        assert_eq!(service.mutation_count(), 1);
    }

    #[tokio::test]
    async fn test_fail_on_mutation_simulates_outage() {
        let service = seeded();
        service.set_fail_on_mutation(true);

        let result = service
            .set_room_availability(HotelId::new(1), RoomId::new(101), false)
            .await;
        assert!(matches!(result, Err(RemoteError::Unavailable { .. })));
        // the flag is untouched
        assert_eq!(
            service.room_available(HotelId::new(1), RoomId::new(101)),
            Some(true)
        );
    }
}
