use super::{ApiClient, ClientError};
use crate::model::{Company, CompanyInput, CompanyListQuery, GetQuery};
use uuid::Uuid;

impl ApiClient {
    pub async fn list_companies(
        &self,
        query: &CompanyListQuery,
    ) -> Result<Vec<Company>, ClientError> {
        self.send(self.get("/api/companies", query.to_pairs())).await
    }

    pub async fn create_company(&self, input: &CompanyInput) -> Result<Company, ClientError> {
        self.send(self.post_json("/api/companies", input)).await
    }

    pub async fn get_company_by_id(
        &self,
        id: Uuid,
        query: &GetQuery,
    ) -> Result<Company, ClientError> {
        self.send(self.get(&format!("/api/companies/{id}"), query.to_pairs()))
            .await
    }

    pub async fn update_company_by_id(
        &self,
        id: Uuid,
        input: &CompanyInput,
    ) -> Result<Company, ClientError> {
        self.send(self.put_json(&format!("/api/companies/{id}"), input))
            .await
    }

    pub async fn delete_company_by_id(&self, id: Uuid) -> Result<Company, ClientError> {
        self.send(self.delete_req(&format!("/api/companies/{id}")))
            .await
    }
}
