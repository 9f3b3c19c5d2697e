use std::str::FromStr;

use crate::api::ApiClient;
use crate::models::Property;

pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grid" => Ok(ViewMode::Grid),
            "list" => Ok(ViewMode::List),
            other => Err(format!("unknown view mode: {other}")),
        }
    }
}

/// "1 property" / "12 properties"
pub fn result_label(count: usize) -> String {
    if count == 1 {
        "1 property".to_string()
    } else {
        format!("{count} properties")
    }
}

/// Whole dollars with thousands separators, e.g. `$4,850,000`.
pub fn format_price(price: f64) -> String {
    let dollars = price.round();
    let sign = if dollars < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", dollars.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}")
}

/// Full URL of the listing's primary image, or the placeholder.
pub fn thumbnail(property: &Property, api: &ApiClient) -> String {
    property
        .primary_image()
        .map(|path| api.image_url(path))
        .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string())
}

/// Featured listings in input order, at most `limit` of them (homepage strip)
pub fn featured(properties: &[Property], limit: usize) -> Vec<&Property> {
    properties.iter().filter(|p| p.featured).take(limit).collect()
}

/// Listings that carry coordinates and can be pinned on a map
pub fn mappable(properties: &[Property]) -> Vec<&Property> {
    properties.iter().filter(|p| p.has_coordinates()).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::listing::fixtures::ten;
    use crate::session::MemorySessionStore;

    #[test]
    fn formats_prices_like_the_site() {
        assert_eq!(format_price(4_850_000.0), "$4,850,000");
        assert_eq!(format_price(950_000.0), "$950,000");
        assert_eq!(format_price(999.0), "$999");
        assert_eq!(format_price(1_000.4), "$1,000");
        assert_eq!(format_price(0.0), "$0");
    }

    #[test]
    fn labels_pluralise() {
        assert_eq!(result_label(0), "0 properties");
        assert_eq!(result_label(1), "1 property");
        assert_eq!(result_label(7), "7 properties");
    }

    #[test]
    fn thumbnail_uses_first_image_or_placeholder() {
        let config = Config {
            api_url: "https://homes.example.com/api".into(),
            ..Config::default()
        };
        let api = ApiClient::new(&config, Arc::new(MemorySessionStore::new())).unwrap();

        let mut listing = ten().remove(0);
        assert_eq!(thumbnail(&listing, &api), "https://homes.example.com/uploads/1.jpg");

        listing.images.clear();
        assert_eq!(thumbnail(&listing, &api), PLACEHOLDER_IMAGE);
    }

    #[test]
    fn featured_strip_keeps_order_and_limit() {
        let list = ten();
        let strip: Vec<_> = featured(&list, 3).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(strip, vec!["1", "3", "5"]);
    }

    #[test]
    fn only_located_listings_are_mappable() {
        let mut list = ten();
        list[2].latitude = Some(25.79);
        list[2].longitude = Some(-80.13);
        list[4].latitude = Some(25.0);
        let pins = mappable(&list);
        assert_eq!(pins.len(), 1);
        assert_eq!(pins[0].id, "3");
    }

    #[test]
    fn view_mode_parses() {
        assert_eq!("LIST".parse::<ViewMode>().unwrap(), ViewMode::List);
        assert!("table".parse::<ViewMode>().is_err());
    }
}
