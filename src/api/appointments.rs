use reqwest::Method;
use serde::Deserialize;
use tracing::info;

use super::{ApiClient, ApiResult};
use crate::models::{
    Appointment, AppointmentRequest, AppointmentStats, AppointmentStatus, StatusQuery, StatusUpdate,
};

/// `GET /appointments` answers with either a bare array or an envelope
#[derive(Deserialize)]
#[serde(untagged)]
enum AppointmentList {
    Bare(Vec<Appointment>),
    Wrapped { appointments: Vec<Appointment> },
}

/// Single-appointment replies may or may not be wrapped
#[derive(Deserialize)]
#[serde(untagged)]
enum AppointmentReply {
    Wrapped { appointment: Appointment },
    Bare(Appointment),
}

impl AppointmentReply {
    fn into_inner(self) -> Appointment {
        match self {
            AppointmentReply::Wrapped { appointment } | AppointmentReply::Bare(appointment) => {
                appointment
            }
        }
    }
}

impl ApiClient {
    /// Public booking endpoint; no session required.
    pub async fn create_appointment(&self, data: &AppointmentRequest) -> ApiResult<Appointment> {
        let request = self.request(Method::POST, "/appointments").json(data);
        let reply: AppointmentReply = self.send(request).await?;
        let appointment = reply.into_inner();
        info!(
            "Requested viewing {} for property {} on {} at {}",
            appointment.id, data.property_id, data.preferred_date, data.preferred_time
        );
        Ok(appointment)
    }

    pub async fn list_appointments(&self, query: &StatusQuery) -> ApiResult<Vec<Appointment>> {
        let request = self.request(Method::GET, "/appointments").query(query);
        let list: AppointmentList = self.send(request).await?;
        Ok(match list {
            AppointmentList::Bare(items) => items,
            AppointmentList::Wrapped { appointments } => appointments,
        })
    }

    pub async fn get_appointment(&self, id: &str) -> ApiResult<Appointment> {
        let request = self.request(Method::GET, &format!("/appointments/{id}"));
        let reply: AppointmentReply = self.send(request).await?;
        Ok(reply.into_inner())
    }

    pub async fn update_appointment_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> ApiResult<Appointment> {
        let request = self
            .request(Method::PUT, &format!("/appointments/{id}/status"))
            .json(&StatusUpdate { status });
        let reply: AppointmentReply = self.send(request).await?;
        info!("Appointment {} marked as {}", id, status);
        Ok(reply.into_inner())
    }

    pub async fn delete_appointment(&self, id: &str) -> ApiResult<()> {
        let request = self.request(Method::DELETE, &format!("/appointments/{id}"));
        self.send_empty(request).await?;
        info!("Deleted appointment {}", id);
        Ok(())
    }

    pub async fn appointment_stats(&self) -> ApiResult<AppointmentStats> {
        let request = self.request(Method::GET, "/appointments/stats");
        self.send(request).await
    }
}
