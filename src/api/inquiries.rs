use reqwest::Method;
use serde::Deserialize;
use tracing::info;

use super::{ApiClient, ApiResult};
use crate::models::{Inquiry, InquiryFormData, InquiryPage, InquiryStats, InquiryStatus, StatusQuery, StatusUpdate};

#[derive(Deserialize)]
struct InquiryEnvelope {
    inquiry: Inquiry,
}

impl ApiClient {
    /// Public lead-capture endpoint; no session required.
    pub async fn create_inquiry(&self, data: &InquiryFormData) -> ApiResult<Inquiry> {
        let request = self.request(Method::POST, "/inquiries").json(data);
        let envelope: InquiryEnvelope = self.send(request).await?;
        info!("Submitted inquiry {} for property {}", envelope.inquiry.id, data.property_id);
        Ok(envelope.inquiry)
    }

    pub async fn list_inquiries(&self, query: &StatusQuery) -> ApiResult<InquiryPage> {
        let request = self.request(Method::GET, "/inquiries").query(query);
        self.send(request).await
    }

    pub async fn get_inquiry(&self, id: &str) -> ApiResult<Inquiry> {
        let request = self.request(Method::GET, &format!("/inquiries/{id}"));
        self.send(request).await
    }

    pub async fn update_inquiry_status(&self, id: &str, status: InquiryStatus) -> ApiResult<Inquiry> {
        let request = self
            .request(Method::PUT, &format!("/inquiries/{id}/status"))
            .json(&StatusUpdate { status });
        let envelope: InquiryEnvelope = self.send(request).await?;
        info!("Inquiry {} is now {}", id, status);
        Ok(envelope.inquiry)
    }

    pub async fn delete_inquiry(&self, id: &str) -> ApiResult<()> {
        let request = self.request(Method::DELETE, &format!("/inquiries/{id}"));
        self.send_empty(request).await?;
        info!("Deleted inquiry {}", id);
        Ok(())
    }

    pub async fn inquiry_stats(&self) -> ApiResult<InquiryStats> {
        let request = self.request(Method::GET, "/inquiries/stats");
        self.send(request).await
    }
}
