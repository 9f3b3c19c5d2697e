//! Agent-side list views over inquiries and appointments.

use crate::listing::Choice;
use crate::models::{Appointment, AppointmentStatus, InquiryStatus, StatusQuery};

/// `"all"` or one status key
pub type StatusFilter<S> = Choice<S>;

/// Query for `GET /inquiries`; the status filter is applied by the server.
pub fn inquiry_query(status: &StatusFilter<InquiryStatus>, property_id: Option<&str>) -> StatusQuery {
    StatusQuery {
        status: status.as_option().map(|s| s.as_str().to_string()),
        property_id: property_id.map(str::to_string),
    }
}

/// Appointment list state. Everything is narrowed locally after one fetch.
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub search: String,
    pub status: StatusFilter<AppointmentStatus>,
}

impl AppointmentFilter {
    pub fn new(search: impl Into<String>, status: StatusFilter<AppointmentStatus>) -> Self {
        Self {
            search: search.into(),
            status,
        }
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        if let Choice::Only(status) = &self.status {
            if appointment.status != *status {
                return false;
            }
        }

        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let hit = |value: &str| value.to_lowercase().contains(&needle);
        hit(&appointment.name)
            || hit(&appointment.email)
            || appointment.property_title.as_deref().is_some_and(hit)
    }

    pub fn apply<'a>(&self, appointments: &'a [Appointment]) -> Vec<&'a Appointment> {
        appointments.iter().filter(|a| self.matches(a)).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;

    fn appointment(id: &str, name: &str, email: &str, title: Option<&str>, status: AppointmentStatus) -> Appointment {
        let at = Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap();
        Appointment {
            id: id.into(),
            property_id: "p-1".into(),
            inquiry_id: None,
            name: name.into(),
            email: email.into(),
            phone: None,
            preferred_date: NaiveDate::from_ymd_opt(2030, 2, 1).unwrap(),
            preferred_time: "10:00".into(),
            message: None,
            status,
            created_at: at,
            updated_at: at,
            property_title: title.map(str::to_string),
            property_location: None,
            agent_id: None,
        }
    }

    fn book() -> Vec<Appointment> {
        vec![
            appointment("a1", "Jane Doe", "jane@example.com", Some("Oceanfront Villa"), AppointmentStatus::Pending),
            appointment("a2", "Mark Hill", "mark@example.com", Some("Skyline Penthouse"), AppointmentStatus::Confirmed),
            appointment("a3", "Ana Ruiz", "ana@villa-fans.org", None, AppointmentStatus::Pending),
        ]
    }

    fn ids(list: Vec<&Appointment>) -> Vec<&str> {
        list.into_iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let list = book();
        assert_eq!(ids(AppointmentFilter::default().apply(&list)), vec!["a1", "a2", "a3"]);
    }

    #[test]
    fn search_spans_name_email_and_title() {
        let list = book();
        let filter = AppointmentFilter::new("VILLA", Choice::All);
        assert_eq!(ids(filter.apply(&list)), vec!["a1", "a3"]);

        let filter = AppointmentFilter::new("mark", Choice::All);
        assert_eq!(ids(filter.apply(&list)), vec!["a2"]);
    }

    #[test]
    fn search_and_status_combine() {
        let list = book();
        let filter = AppointmentFilter::new("villa", Choice::Only(AppointmentStatus::Pending));
        assert_eq!(ids(filter.apply(&list)), vec!["a1", "a3"]);

        let filter = AppointmentFilter::new("villa", Choice::Only(AppointmentStatus::Confirmed));
        assert!(filter.apply(&list).is_empty());
    }

    #[test]
    fn status_filter_parses_all_and_keys() {
        let all: StatusFilter<InquiryStatus> = "all".parse().unwrap();
        assert!(all.is_all());
        let one: StatusFilter<InquiryStatus> = "contacted".parse().unwrap();
        assert_eq!(one, Choice::Only(InquiryStatus::Contacted));
        assert!("archived".parse::<StatusFilter<InquiryStatus>>().is_err());
    }

    #[test]
    fn inquiry_query_carries_server_filter() {
        let query = inquiry_query(&Choice::Only(InquiryStatus::New), None);
        assert_eq!(query.status.as_deref(), Some("new"));
        assert_eq!(inquiry_query(&Choice::All, Some("p-9")).status, None);
        assert_eq!(inquiry_query(&Choice::All, Some("p-9")).property_id.as_deref(), Some("p-9"));
    }

    #[test]
    fn labels_are_title_case() {
        assert_eq!(InquiryStatus::Scheduled.label(), "Scheduled");
        assert_eq!(AppointmentStatus::Cancelled.label(), "Cancelled");
    }
}
