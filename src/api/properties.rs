use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ApiClient, ApiError, ApiResult};
use crate::models::{PropertiesPage, Property, PropertyFormData, PropertyQuery, PropertyUpdate};

#[derive(Deserialize)]
struct PropertyEnvelope {
    property: Property,
}

#[derive(Deserialize)]
struct MyProperties {
    properties: Vec<Property>,
}

#[derive(Deserialize)]
struct ImagesEnvelope {
    images: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageRemoval<'a> {
    image_url: &'a str,
}

/// An image queued for upload
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub async fn read(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self { file_name, bytes })
    }

    fn mime(&self) -> &'static str {
        let ext = PathBuf::from(&self.file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            _ => "application/octet-stream",
        }
    }
}

impl ApiClient {
    pub async fn list_properties(&self, query: &PropertyQuery) -> ApiResult<PropertiesPage> {
        let request = self.request(Method::GET, "/properties").query(query);
        self.send(request).await
    }

    pub async fn get_property(&self, id: &str) -> ApiResult<Property> {
        let request = self.request(Method::GET, &format!("/properties/{id}"));
        let envelope: PropertyEnvelope = self.send(request).await?;
        Ok(envelope.property)
    }

    pub async fn create_property(&self, data: &PropertyFormData) -> ApiResult<Property> {
        let request = self.request(Method::POST, "/properties").json(data);
        let envelope: PropertyEnvelope = self.send(request).await?;
        info!("Created property {} ({})", envelope.property.id, envelope.property.title);
        Ok(envelope.property)
    }

    pub async fn update_property(&self, id: &str, update: &PropertyUpdate) -> ApiResult<Property> {
        let request = self
            .request(Method::PUT, &format!("/properties/{id}"))
            .json(update);
        let envelope: PropertyEnvelope = self.send(request).await?;
        info!("Updated property {}", id);
        Ok(envelope.property)
    }

    pub async fn delete_property(&self, id: &str) -> ApiResult<()> {
        let request = self.request(Method::DELETE, &format!("/properties/{id}"));
        self.send_empty(request).await?;
        info!("Deleted property {}", id);
        Ok(())
    }

    /// Listings owned by the signed-in agent
    pub async fn my_properties(&self) -> ApiResult<Vec<Property>> {
        let request = self.request(Method::GET, "/properties/agent/my-properties");
        let envelope: MyProperties = self.send(request).await?;
        Ok(envelope.properties)
    }

    /// Upload images as multipart `images` parts; returns the property's
    /// image list after the upload.
    pub async fn upload_images(&self, id: &str, files: Vec<ImageFile>) -> ApiResult<Vec<String>> {
        let count = files.len();
        let mut form = Form::new();
        for file in files {
            let mime = file.mime();
            let part = Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(mime)
                .map_err(|e| ApiError::Unexpected(e.to_string()))?;
            form = form.part("images", part);
        }

        let request = self
            .request(Method::POST, &format!("/properties/{id}/images"))
            .multipart(form);
        let envelope: ImagesEnvelope = self.send(request).await?;
        info!("Uploaded {} image(s) to property {}", count, id);
        Ok(envelope.images)
    }

    /// Remove one image; returns the remaining images.
    pub async fn delete_image(&self, id: &str, image_url: &str) -> ApiResult<Vec<String>> {
        let request = self
            .request(Method::DELETE, &format!("/properties/{id}/images"))
            .json(&ImageRemoval { image_url });
        let envelope: ImagesEnvelope = self.send(request).await?;
        Ok(envelope.images)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::{Multipart, Path as UrlPath, RawQuery};
    use axum::http::StatusCode;
    use axum::routing::{delete, get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::api::stub::{serve, Seen};
    use crate::models::{PropertyStatus, PropertyType};
    use crate::session::{test_user, MemorySessionStore};

    fn property_json(id: &str) -> Value {
        json!({
            "id": id,
            "title": "Skyline Penthouse",
            "location": "5th Avenue",
            "city": "Manhattan",
            "state": "NY",
            "price": 8200000,
            "beds": 4,
            "baths": 4,
            "sqft": 4800,
            "propertyType": "penthouse",
            "yearBuilt": 2015,
            "status": "active",
            "featured": false,
            "images": [],
            "amenities": [],
            "createdAt": "2024-03-01T10:00:00Z",
            "updatedAt": "2024-03-01T10:00:00Z"
        })
    }

    fn agent_store() -> Arc<MemorySessionStore> {
        Arc::new(MemorySessionStore::with_session("tok", test_user("agent")))
    }

    #[tokio::test]
    async fn list_sends_only_present_filters() {
        let seen = Seen::default();
        let log = seen.clone();
        let router = Router::new().route(
            "/properties",
            get(move |RawQuery(query): RawQuery| {
                let log = log.clone();
                async move {
                    log.push(query.unwrap_or_default());
                    Json(json!({
                        "properties": [property_json("p-1")],
                        "count": 1,
                        "limit": 20,
                        "offset": 0
                    }))
                }
            }),
        );
        let api = serve(router, Arc::new(MemorySessionStore::new())).await;

        let query = PropertyQuery {
            property_type: Some(PropertyType::Penthouse),
            min_beds: Some(3),
            ..PropertyQuery::active()
        };
        let page = api.list_properties(&query).await.unwrap();

        assert_eq!(page.count, 1);
        assert_eq!(page.properties[0].id, "p-1");
        assert_eq!(
            seen.entries(),
            vec!["propertyType=penthouse&minBeds=3&status=active".to_string()]
        );
    }

    #[tokio::test]
    async fn get_unwraps_property_envelope() {
        let router = Router::new().route(
            "/properties/{id}",
            get(|UrlPath(id): UrlPath<String>| async move {
                Json(json!({ "property": property_json(&id) }))
            }),
        );
        let api = serve(router, Arc::new(MemorySessionStore::new())).await;

        let property = api.get_property("p-42").await.unwrap();
        assert_eq!(property.id, "p-42");
        assert_eq!(property.status, PropertyStatus::Active);
    }

    #[tokio::test]
    async fn missing_property_surfaces_server_message() {
        let router = Router::new().route(
            "/properties/{id}",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "message": "Property not found" })),
                )
            }),
        );
        let api = serve(router, Arc::new(MemorySessionStore::new())).await;

        let err = api.get_property("nope").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.message_or("Failed to load property"), "Property not found");
    }

    #[tokio::test]
    async fn my_properties_unwraps_list() {
        let router = Router::new().route(
            "/properties/agent/my-properties",
            get(|| async {
                Json(json!({ "properties": [property_json("a"), property_json("b")], "count": 2 }))
            }),
        );
        let api = serve(router, agent_store()).await;

        let mine = api.my_properties().await.unwrap();
        let ids: Vec<_> = mine.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn upload_sends_one_part_per_file() {
        let seen = Seen::default();
        let log = seen.clone();
        let router = Router::new().route(
            "/properties/{id}/images",
            post(move |mut multipart: Multipart| {
                let log = log.clone();
                async move {
                    while let Some(field) = multipart.next_field().await.unwrap() {
                        let name = field.name().unwrap_or_default().to_string();
                        let file = field.file_name().unwrap_or_default().to_string();
                        let mime = field.content_type().unwrap_or_default().to_string();
                        log.push(format!("{name}:{file}:{mime}"));
                    }
                    Json(json!({
                        "message": "uploaded",
                        "images": ["/uploads/front.jpg", "/uploads/pool.png"],
                        "uploadedCount": 2
                    }))
                }
            }),
        );
        let api = serve(router, agent_store()).await;

        let files = vec![
            ImageFile {
                file_name: "front.jpg".into(),
                bytes: vec![0xff, 0xd8],
            },
            ImageFile {
                file_name: "pool.png".into(),
                bytes: vec![0x89, 0x50],
            },
        ];
        let images = api.upload_images("p-1", files).await.unwrap();

        assert_eq!(images.len(), 2);
        assert_eq!(
            seen.entries(),
            vec![
                "images:front.jpg:image/jpeg".to_string(),
                "images:pool.png:image/png".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn delete_image_sends_url_in_body() {
        let seen = Seen::default();
        let log = seen.clone();
        let router = Router::new().route(
            "/properties/{id}/images",
            delete(move |Json(body): Json<Value>| {
                let log = log.clone();
                async move {
                    log.push(body.to_string());
                    Json(json!({ "message": "deleted", "images": ["/uploads/pool.png"] }))
                }
            }),
        );
        let api = serve(router, agent_store()).await;

        let remaining = api.delete_image("p-1", "/uploads/front.jpg").await.unwrap();
        assert_eq!(remaining, vec!["/uploads/pool.png".to_string()]);
        let body: Value = serde_json::from_str(&seen.entries()[0]).unwrap();
        assert_eq!(body, json!({ "imageUrl": "/uploads/front.jpg" }));
    }
}
