use super::{ApiClient, ClientError};
use crate::model::{Booking, BookingInput, BookingListQuery, GetQuery};
use uuid::Uuid;

impl ApiClient {
    pub async fn list_bookings(&self, query: &BookingListQuery) -> Result<Vec<Booking>, ClientError> {
        self.send(self.get("/api/bookings", query.to_pairs())).await
    }

    pub async fn create_booking(&self, input: &BookingInput) -> Result<Booking, ClientError> {
        self.send(self.post_json("/api/bookings", input)).await
    }

    pub async fn get_booking_by_id(&self, id: Uuid, query: &GetQuery) -> Result<Booking, ClientError> {
        self.send(self.get(&format!("/api/bookings/{id}"), query.to_pairs()))
            .await
    }

    pub async fn update_booking_by_id(
        &self,
        id: Uuid,
        input: &BookingInput,
    ) -> Result<Booking, ClientError> {
        self.send(self.put_json(&format!("/api/bookings/{id}"), input))
            .await
    }

    pub async fn delete_booking_by_id(&self, id: Uuid) -> Result<Booking, ClientError> {
        self.send(self.delete_req(&format!("/api/bookings/{id}")))
            .await
    }
}
