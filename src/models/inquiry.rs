use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::count;

wire_enum! {
    /// Lead pipeline stage
    InquiryStatus, "inquiry status" {
        New => "new",
        Contacted => "contacted",
        Scheduled => "scheduled",
        Closed => "closed",
    }
}

impl InquiryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            InquiryStatus::New => "New",
            InquiryStatus::Contacted => "Contacted",
            InquiryStatus::Scheduled => "Scheduled",
            InquiryStatus::Closed => "Closed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Inquiry {
    pub id: String,
    pub property_id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
    pub status: InquiryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    // joined from the property row
    #[serde(default)]
    pub property_title: Option<String>,
    #[serde(default)]
    pub property_city: Option<String>,
    #[serde(default)]
    pub property_state: Option<String>,
}

/// Body of `POST /inquiries`
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InquiryFormData {
    pub property_id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InquiryPage {
    pub inquiries: Vec<Inquiry>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct InquiryStats {
    #[serde(rename = "total_inquiries", deserialize_with = "count")]
    pub total: u64,
    #[serde(rename = "new_inquiries", deserialize_with = "count")]
    pub new: u64,
    #[serde(rename = "contacted_inquiries", deserialize_with = "count")]
    pub contacted: u64,
    #[serde(rename = "scheduled_inquiries", deserialize_with = "count")]
    pub scheduled: u64,
    #[serde(rename = "closed_inquiries", deserialize_with = "count")]
    pub closed: u64,
}
