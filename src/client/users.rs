use super::{ApiClient, ClientError};
use crate::model::{GetQuery, User, UserInput, UserListQuery};
use uuid::Uuid;

impl ApiClient {
    pub async fn list_users(&self, query: &UserListQuery) -> Result<Vec<User>, ClientError> {
        self.send(self.get("/api/users", query.to_pairs())).await
    }

    pub async fn create_user(&self, input: &UserInput) -> Result<User, ClientError> {
        self.send(self.post_json("/api/users", input)).await
    }

    pub async fn get_user_by_id(&self, id: Uuid, query: &GetQuery) -> Result<User, ClientError> {
        self.send(self.get(&format!("/api/users/{id}"), query.to_pairs()))
            .await
    }

    pub async fn update_user_by_id(&self, id: Uuid, input: &UserInput) -> Result<User, ClientError> {
        self.send(self.put_json(&format!("/api/users/{id}"), input))
            .await
    }

    pub async fn delete_user_by_id(&self, id: Uuid) -> Result<User, ClientError> {
        self.send(self.delete_req(&format!("/api/users/{id}"))).await
    }
}
