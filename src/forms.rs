//! Client-side form validation. Everything here runs before a request is
//! built, so an invalid form never reaches the network.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use validator::{Validate, ValidationErrors};

use crate::models::{
    AppointmentRequest, InquiryFormData, LoginCredentials, PropertyFormData, PropertyStatus,
    PropertyType, PropertyUpdate, RegisterData, Role,
};

/// Per-field messages, shown inline next to each input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {field}"));
                out.add(field, message);
            }
        }
        out
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields()
            .flat_map(|(field, messages)| messages.iter().map(move |m| format!("{field}: {m}")))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

fn derive_errors<T: Validate>(form: &T) -> FieldErrors {
    form.validate().map(|_| FieldErrors::new()).unwrap_or_else(FieldErrors::from)
}

/// Blank optional inputs are sent as absent
fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, Default, Validate)]
pub struct InquiryForm {
    #[validate(length(min = 2, max = 255, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(max = 50, message = "Phone number must be at most 50 characters"))]
    pub phone: Option<String>,
    #[validate(length(min = 10, max = 2000, message = "Message must be at least 10 characters"))]
    pub message: String,
}

impl InquiryForm {
    pub fn submit(&self, property_id: &str) -> Result<InquiryFormData, FieldErrors> {
        derive_errors(self).into_result()?;
        Ok(InquiryFormData {
            property_id: property_id.to_string(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: optional(&self.phone),
            message: self.message.trim().to_string(),
        })
    }
}

/// Viewing slots offered by the booking form: 09:00 to 17:00, every half hour
pub fn time_slots() -> Vec<String> {
    let mut slots = Vec::new();
    for hour in 9..=17 {
        slots.push(format!("{hour:02}:00"));
        if hour != 17 {
            slots.push(format!("{hour:02}:30"));
        }
    }
    slots
}

fn is_clock_time(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 5
        && bytes[2] == b':'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 2 || b.is_ascii_digit())
}

#[derive(Debug, Clone, Default, Validate)]
pub struct AppointmentForm {
    #[validate(length(min = 2, max = 255, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(max = 50, message = "Phone number must be at most 50 characters"))]
    pub phone: Option<String>,
    pub preferred_date: Option<NaiveDate>,
    pub preferred_time: Option<String>,
    #[validate(length(max = 2000, message = "Message must be at most 2000 characters"))]
    pub message: Option<String>,
}

impl AppointmentForm {
    /// Validate against `today` and build the booking request.
    pub fn submit(&self, property_id: &str, today: NaiveDate) -> Result<AppointmentRequest, FieldErrors> {
        let mut errors = derive_errors(self);

        let date = match self.preferred_date {
            None => {
                errors.add("preferred_date", "Please select a date");
                None
            }
            Some(date) if date < today => {
                errors.add("preferred_date", "Please select a future date for the appointment.");
                None
            }
            Some(date) => Some(date),
        };

        let time = match self.preferred_time.as_deref().map(str::trim) {
            None | Some("") => {
                errors.add("preferred_time", "Please select a time");
                None
            }
            Some(time) if !is_clock_time(time) || !time_slots().iter().any(|s| s == time) => {
                errors.add("preferred_time", "Please select a valid time");
                None
            }
            Some(time) => Some(time),
        };

        match (date, time) {
            (Some(preferred_date), Some(preferred_time)) if errors.is_empty() => Ok(AppointmentRequest {
                property_id: property_id.to_string(),
                name: self.name.trim().to_string(),
                email: self.email.trim().to_string(),
                phone: optional(&self.phone),
                preferred_date,
                preferred_time: preferred_time.to_string(),
                message: optional(&self.message),
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginForm {
    pub fn submit(&self) -> Result<LoginCredentials, FieldErrors> {
        derive_errors(self).into_result()?;
        Ok(LoginCredentials {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub phone: Option<String>,
    pub role: Role,
}

impl Default for RegisterForm {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            phone: None,
            role: Role::User,
        }
    }
}

impl RegisterForm {
    pub fn submit(&self) -> Result<RegisterData, FieldErrors> {
        let mut errors = derive_errors(self);
        if self.password != self.confirm_password {
            errors.add("confirm_password", "Passwords do not match");
        }
        if self.password.chars().count() < 6 {
            errors.add("password", "Password must be at least 6 characters");
        }
        if self.role == Role::Admin {
            errors.add("role", "Admin accounts cannot be self-registered");
        }
        errors.into_result()?;

        Ok(RegisterData {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone: optional(&self.phone),
            role: Some(self.role),
        })
    }
}

pub const AMENITIES: &[&str] = &[
    "Pool",
    "Gym",
    "Parking",
    "Garden",
    "Balcony",
    "Elevator",
    "Security",
    "Air Conditioning",
    "Heating",
    "Fireplace",
    "Dishwasher",
    "Laundry",
    "Pet Friendly",
    "Furnished",
];

/// Canonical spelling of a known amenity, matched case-insensitively
pub fn amenity(name: &str) -> Option<&'static str> {
    let name = name.trim();
    AMENITIES.iter().copied().find(|a| a.eq_ignore_ascii_case(name))
}

/// Known amenities in their canonical spelling; unknown ones are kept as typed
/// so validation can point at them.
pub fn normalize_amenities(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|name| amenity(name).map(str::to_string).unwrap_or_else(|| name.trim().to_string()))
        .collect()
}

const OLDEST_YEAR: i32 = 1800;

#[derive(Debug, Clone, Validate)]
pub struct PropertyForm {
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub city: String,
    pub state: String,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    pub beds: u32,
    #[validate(range(min = 0.0, message = "Bathrooms cannot be negative"))]
    pub baths: f32,
    pub sqft: u32,
    pub property_type: PropertyType,
    pub year_built: i32,
    pub status: PropertyStatus,
    pub featured: bool,
    pub amenities: Vec<String>,
}

impl PropertyForm {
    /// Blank form as the create page starts it
    pub fn new(current_year: i32) -> Self {
        Self {
            title: String::new(),
            description: None,
            location: String::new(),
            city: String::new(),
            state: String::new(),
            price: 0.0,
            beds: 1,
            baths: 1.0,
            sqft: 0,
            property_type: PropertyType::House,
            year_built: current_year,
            status: PropertyStatus::Draft,
            featured: false,
            amenities: Vec::new(),
        }
    }

    /// Add the amenity if missing, remove it otherwise.
    pub fn toggle_amenity(&mut self, name: &str) {
        let name = amenity(name).map(str::to_string).unwrap_or_else(|| name.trim().to_string());
        if let Some(pos) = self.amenities.iter().position(|a| *a == name) {
            self.amenities.remove(pos);
        } else {
            self.amenities.push(name);
        }
    }

    pub fn submit(&self, current_year: i32) -> Result<PropertyFormData, FieldErrors> {
        let mut errors = derive_errors(self);
        check_required(&mut errors, "title", &self.title);
        check_required(&mut errors, "location", &self.location);
        check_required(&mut errors, "city", &self.city);
        check_required(&mut errors, "state", &self.state);
        check_year(&mut errors, self.year_built, current_year);
        check_amenities(&mut errors, &self.amenities);
        errors.into_result()?;

        Ok(PropertyFormData {
            title: self.title.trim().to_string(),
            description: optional(&self.description),
            location: self.location.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            price: self.price,
            beds: self.beds,
            baths: self.baths,
            sqft: self.sqft,
            property_type: self.property_type,
            year_built: self.year_built,
            status: self.status,
            featured: self.featured,
            amenities: self.amenities.clone(),
        })
    }
}

fn check_year(errors: &mut FieldErrors, year: i32, current_year: i32) {
    if year < OLDEST_YEAR || year > current_year + 1 {
        errors.add(
            "year_built",
            format!("Year built must be between {OLDEST_YEAR} and {}", current_year + 1),
        );
    }
}

fn check_required(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        let label = match field {
            "title" => "Title",
            "location" => "Location",
            "city" => "City",
            "state" => "State",
            other => other,
        };
        errors.add(field, format!("{label} is required"));
    }
}

fn check_amenities(errors: &mut FieldErrors, names: &[String]) {
    for name in names {
        if amenity(name).is_none() {
            errors.add("amenities", format!("Unknown amenity: {name}"));
        }
    }
}

/// Checks the fields an edit actually changes.
pub fn validate_update(update: &PropertyUpdate, current_year: i32) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    let required = [
        ("title", &update.title),
        ("location", &update.location),
        ("city", &update.city),
        ("state", &update.state),
    ];
    for (field, value) in required {
        if let Some(value) = value {
            check_required(&mut errors, field, value);
        }
    }
    if let Some(amenities) = &update.amenities {
        check_amenities(&mut errors, amenities);
    }
    if matches!(update.price, Some(p) if p < 0.0) {
        errors.add("price", "Price cannot be negative");
    }
    if matches!(update.baths, Some(b) if b < 0.0) {
        errors.add("baths", "Bathrooms cannot be negative");
    }
    if let Some(year) = update.year_built {
        check_year(&mut errors, year, current_year);
    }
    errors.into_result()
}

/// Current calendar year, for the year-built bounds
pub fn current_year(today: NaiveDate) -> i32 {
    today.year()
}
