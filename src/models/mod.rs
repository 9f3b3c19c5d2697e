use serde::{Deserialize, Deserializer, Serialize};

/// A wire value that does not belong to one of the closed enums
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?} (expected one of: {})", expected.join(", "))]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
    pub expected: Vec<&'static str>,
}

/// Declares a closed, lowercase-on-the-wire enum with `as_str`, `Display`
/// and `FromStr`.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::models::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err($crate::models::UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                        expected: $name::ALL.iter().map($name::as_str).collect(),
                    }),
                }
            }
        }
    };
}

mod appointment;
mod inquiry;
mod property;
mod user;

pub use appointment::{Appointment, AppointmentRequest, AppointmentStats, AppointmentStatus};
pub use inquiry::{Inquiry, InquiryFormData, InquiryPage, InquiryStats, InquiryStatus};
pub use property::{
    PropertiesPage, Property, PropertyFormData, PropertyQuery, PropertyStatus,
    PropertyType, PropertyUpdate,
};
pub use user::{AuthResponse, LoginCredentials, RegisterData, Role, User};

/// Request body for the `PUT /…/:id/status` endpoints
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate<S> {
    pub status: S,
}

/// Query parameters shared by the inquiry and appointment listings
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
}

/// Counters arrive either as JSON numbers or as numeric strings (SQL `COUNT`
/// results are passed through untouched by some endpoints).
pub(crate) fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_query_omits_absent_keys() {
        let query = StatusQuery {
            status: Some("new".into()),
            property_id: None,
        };
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value, serde_json::json!({ "status": "new" }));

        let query = StatusQuery {
            status: None,
            property_id: Some("p1".into()),
        };
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value, serde_json::json!({ "propertyId": "p1" }));
    }

    #[test]
    fn unknown_variant_is_reported() {
        let err = "castle".parse::<PropertyType>().unwrap_err();
        assert_eq!(err.kind, "property type");
        assert_eq!(err.value, "castle");
        assert_eq!(
            err.to_string(),
            "unknown property type: \"castle\" (expected one of: house, penthouse, villa, estate, loft)"
        );
    }
}
