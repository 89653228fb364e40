use super::{ApiClient, ClientError};
use crate::model::{Car, CarInput, CarListQuery, GetQuery};
use uuid::Uuid;

impl ApiClient {
    pub async fn list_cars(&self, query: &CarListQuery) -> Result<Vec<Car>, ClientError> {
        self.send(self.get("/api/cars", query.to_pairs())).await
    }

    pub async fn create_car(&self, input: &CarInput) -> Result<Car, ClientError> {
        self.send(self.post_json("/api/cars", input)).await
    }

    pub async fn get_car_by_id(&self, id: Uuid, query: &GetQuery) -> Result<Car, ClientError> {
        self.send(self.get(&format!("/api/cars/{id}"), query.to_pairs()))
            .await
    }

    pub async fn update_car_by_id(&self, id: Uuid, input: &CarInput) -> Result<Car, ClientError> {
        self.send(self.put_json(&format!("/api/cars/{id}"), input))
            .await
    }

    pub async fn delete_car_by_id(&self, id: Uuid) -> Result<Car, ClientError> {
        self.send(self.delete_req(&format!("/api/cars/{id}"))).await
    }
}
