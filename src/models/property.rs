use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

wire_enum! {
    /// Kind of dwelling a listing describes
    PropertyType, "property type" {
        House => "house",
        Penthouse => "penthouse",
        Villa => "villa",
        Estate => "estate",
        Loft => "loft",
    }
}

wire_enum! {
    /// Publication state of a listing
    PropertyStatus, "property status" {
        Draft => "draft",
        Active => "active",
        Pending => "pending",
        Sold => "sold",
    }
}

/// Listing agent as embedded in a property payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
}

/// Core property data model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location: String,
    pub city: String,
    pub state: String,
    pub price: f64,
    pub beds: u32,
    pub baths: f32,
    pub sqft: u32,
    pub property_type: PropertyType,
    pub year_built: i32,
    pub status: PropertyStatus,
    #[serde(default)]
    pub featured: bool,
    /// Relative server paths; the first one is the thumbnail
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub agent: Option<AgentSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether the listing can be placed on a map
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    pub fn display_location(&self) -> String {
        format!("{}, {}", self.city, self.state)
    }
}

/// Server-side filters for `GET /properties`
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<PropertyType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_beds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PropertyStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl PropertyQuery {
    /// What the public listing page asks for
    pub fn active() -> Self {
        Self {
            status: Some(PropertyStatus::Active),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertiesPage {
    pub properties: Vec<Property>,
    /// Total matching listings on the server
    #[serde(default)]
    pub count: u64,
}

/// Body of `POST /properties`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFormData {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub location: String,
    pub city: String,
    pub state: String,
    pub price: f64,
    pub beds: u32,
    pub baths: f32,
    pub sqft: u32,
    pub property_type: PropertyType,
    pub year_built: i32,
    pub status: PropertyStatus,
    pub featured: bool,
    pub amenities: Vec<String>,
}

/// Body of `PUT /properties/:id`; only the fields that are set are sent
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baths: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sqft: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<PropertyType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_built: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PropertyStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<String>>,
}

impl PropertyUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> serde_json::Value {
        json!({
            "id": "p-1",
            "title": "Modern Oceanfront Villa",
            "location": "1 Ocean Drive",
            "city": "Miami Beach",
            "state": "FL",
            "price": 4850000,
            "beds": 5,
            "baths": 6,
            "sqft": 6200,
            "propertyType": "villa",
            "yearBuilt": 2019,
            "status": "active",
            "featured": true,
            "images": ["/uploads/a.jpg", "/uploads/b.jpg"],
            "amenities": ["Pool"],
            "createdAt": "2024-01-10T12:00:00Z",
            "updatedAt": "2024-01-11T12:00:00Z"
        })
    }

    #[test]
    fn decodes_camel_case_payload() {
        let property: Property = serde_json::from_value(payload()).unwrap();
        assert_eq!(property.property_type, PropertyType::Villa);
        assert_eq!(property.status, PropertyStatus::Active);
        assert_eq!(property.year_built, 2019);
        assert_eq!(property.primary_image(), Some("/uploads/a.jpg"));
        assert!(!property.has_coordinates());
        assert!(property.agent.is_none());
        assert_eq!(property.display_location(), "Miami Beach, FL");
    }

    #[test]
    fn rejects_status_outside_closed_set() {
        let mut value = payload();
        value["status"] = json!("archived");
        assert!(serde_json::from_value::<Property>(value).is_err());
    }

    #[test]
    fn partial_update_serializes_only_set_fields() {
        let update = PropertyUpdate {
            price: Some(4_500_000.0),
            status: Some(PropertyStatus::Pending),
            ..PropertyUpdate::default()
        };
        assert!(!update.is_empty());
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "price": 4500000.0, "status": "pending" })
        );
        assert!(PropertyUpdate::default().is_empty());
    }
}
