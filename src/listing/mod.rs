//! Client-side narrowing and ordering of the property list shown on the
//! listings page.

mod view;

pub use view::{featured, format_price, mappable, result_label, thumbnail, ViewMode};

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use crate::models::{Property, PropertyType};

/// A filter value that is either unset (`"all"`) or a concrete choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice<T> {
    All,
    Only(T),
}

impl<T> Default for Choice<T> {
    fn default() -> Self {
        Choice::All
    }
}

impl<T> Choice<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Choice::All)
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Choice::All => None,
            Choice::Only(value) => Some(value),
        }
    }
}

impl<T: FromStr> FromStr for Choice<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Choice::All)
        } else {
            s.trim().parse().map(Choice::Only)
        }
    }
}

impl<T: fmt::Display> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::All => f.write_str("all"),
            Choice::Only(value) => value.fmt(f),
        }
    }
}

/// Half-open price bracket `[min, max)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub key: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
}

pub const PRICE_RANGES: &[PriceRange] = &[
    PriceRange {
        key: "0-1000000",
        label: "Under $1M",
        min: 0.0,
        max: 1_000_000.0,
    },
    PriceRange {
        key: "1000000-2500000",
        label: "$1M - $2.5M",
        min: 1_000_000.0,
        max: 2_500_000.0,
    },
    PriceRange {
        key: "2500000-5000000",
        label: "$2.5M - $5M",
        min: 2_500_000.0,
        max: 5_000_000.0,
    },
    PriceRange {
        key: "5000000-10000000",
        label: "$5M - $10M",
        min: 5_000_000.0,
        max: 10_000_000.0,
    },
    PriceRange {
        key: "10000000-plus",
        label: "$10M+",
        min: 10_000_000.0,
        max: f64::INFINITY,
    },
];

impl PriceRange {
    pub fn find(key: &str) -> Option<&'static PriceRange> {
        PRICE_RANGES.iter().find(|range| range.key == key)
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price < self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Featured,
    PriceLow,
    PriceHigh,
    Newest,
    Beds,
}

impl SortOrder {
    pub const ALL: &'static [SortOrder] = &[
        SortOrder::Featured,
        SortOrder::PriceLow,
        SortOrder::PriceHigh,
        SortOrder::Newest,
        SortOrder::Beds,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SortOrder::Featured => "featured",
            SortOrder::PriceLow => "price-low",
            SortOrder::PriceHigh => "price-high",
            SortOrder::Newest => "newest",
            SortOrder::Beds => "beds",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::Featured => "Featured",
            SortOrder::PriceLow => "Price: Low to High",
            SortOrder::PriceHigh => "Price: High to Low",
            SortOrder::Newest => "Newest",
            SortOrder::Beds => "Most Bedrooms",
        }
    }

    /// Unknown keys fall back to the default order.
    pub fn from_key(key: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|order| order.key() == key.trim())
            .unwrap_or_default()
    }

    /// Stable in-place sort.
    pub fn sort(&self, properties: &mut [Property]) {
        match self {
            SortOrder::Featured => properties.sort_by_key(|p| Reverse(p.featured)),
            SortOrder::PriceLow => properties.sort_by(|a, b| a.price.total_cmp(&b.price)),
            SortOrder::PriceHigh => properties.sort_by(|a, b| b.price.total_cmp(&a.price)),
            SortOrder::Newest => properties.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::Beds => properties.sort_by(|a, b| b.beds.cmp(&a.beds)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error(transparent)]
    PropertyType(#[from] crate::models::UnknownVariant),
    #[error("bedrooms must be \"all\" or a whole number, got {0:?}")]
    Bedrooms(String),
}

/// Filter state of the listings page
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListingFilters {
    pub property_type: Choice<PropertyType>,
    /// Key into [`PRICE_RANGES`]; an unknown key filters nothing
    pub price_range: Choice<String>,
    /// Minimum number of bedrooms
    pub bedrooms: Choice<u32>,
    pub sort: SortOrder,
}

impl ListingFilters {
    /// Build from the string values the filter controls hold.
    pub fn parse(
        property_type: &str,
        price_range: &str,
        bedrooms: &str,
        sort: &str,
    ) -> Result<Self, FilterError> {
        let property_type = property_type.parse()?;
        let price_range = match price_range.parse::<Choice<String>>() {
            Ok(choice) => choice,
            Err(never) => match never {},
        };
        let bedrooms = bedrooms
            .parse()
            .map_err(|_| FilterError::Bedrooms(bedrooms.to_string()))?;

        Ok(Self {
            property_type,
            price_range,
            bedrooms,
            sort: SortOrder::from_key(sort),
        })
    }

    pub fn price_bracket(&self) -> Option<&'static PriceRange> {
        self.price_range.as_option().and_then(|key| PriceRange::find(key))
    }

    /// Whether a property passes every active predicate
    pub fn matches(&self, property: &Property) -> bool {
        let type_ok = match &self.property_type {
            Choice::All => true,
            Choice::Only(kind) => property.property_type == *kind,
        };
        let price_ok = self
            .price_bracket()
            .map_or(true, |range| range.contains(property.price));
        let beds_ok = match self.bedrooms {
            Choice::All => true,
            Choice::Only(min) => property.beds >= min,
        };
        type_ok && price_ok && beds_ok
    }

    pub fn apply(&self, properties: &[Property]) -> Vec<Property> {
        let mut result: Vec<Property> = properties
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect();
        self.sort.sort(&mut result);
        result
    }

    /// Number of non-`all` filters (sort order is not a filter)
    pub fn active_count(&self) -> usize {
        [
            !self.property_type.is_all(),
            !self.price_range.is_all(),
            !self.bedrooms.is_all(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
