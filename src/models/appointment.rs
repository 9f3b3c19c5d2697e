use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::count;

wire_enum! {
    /// Lifecycle of a viewing request
    AppointmentStatus, "appointment status" {
        Pending => "pending",
        Confirmed => "confirmed",
        Cancelled => "cancelled",
        Completed => "completed",
    }
}

impl AppointmentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "Pending",
            AppointmentStatus::Confirmed => "Confirmed",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: String,
    pub property_id: String,
    #[serde(default)]
    pub inquiry_id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(with = "day")]
    pub preferred_date: NaiveDate,
    /// `HH:MM`
    pub preferred_time: String,
    #[serde(default)]
    pub message: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub property_title: Option<String>,
    #[serde(default)]
    pub property_location: Option<String>,
    #[serde(default)]
    pub agent_id: Option<String>,
}

/// Body of `POST /appointments`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AppointmentRequest {
    #[serde(rename = "propertyId")]
    pub property_id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(with = "day")]
    pub preferred_date: NaiveDate,
    pub preferred_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct AppointmentStats {
    #[serde(rename = "total_appointments", deserialize_with = "count")]
    pub total: u64,
    #[serde(rename = "pending_appointments", deserialize_with = "count")]
    pub pending: u64,
    #[serde(rename = "confirmed_appointments", deserialize_with = "count")]
    pub confirmed: u64,
    #[serde(rename = "cancelled_appointments", deserialize_with = "count")]
    pub cancelled: u64,
    #[serde(rename = "completed_appointments", deserialize_with = "count")]
    pub completed: u64,
    #[serde(rename = "upcoming_appointments", deserialize_with = "count")]
    pub upcoming: u64,
}

/// `YYYY-MM-DD`; the server may also hand back a full timestamp for DATE
/// columns, in which case only the date part is kept.
mod day {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let date_part = raw.get(..10).unwrap_or(&raw);
        NaiveDate::parse_from_str(date_part, FORMAT).map_err(serde::de::Error::custom)
    }
}
