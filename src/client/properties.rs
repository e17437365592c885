// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Property listing endpoints.

use super::ApiClient;
use crate::error::{ClientError, Result};
use crate::models::{ImageUpload, Property, PropertyDraft, PropertySearch};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use validator::Validate;

impl ApiClient {
    /// List every property.
    pub async fn list_properties(&self) -> Result<Vec<Property>> {
        self.get_json("/api/properties").await
    }

    /// Search with optional criteria; unset criteria are not sent.
    pub async fn search_properties(&self, search: &PropertySearch) -> Result<Vec<Property>> {
        let builder = self
            .request(Method::GET, "/api/properties/search")?
            .query(search);
        self.send_json(builder).await
    }

    /// Get a single property by ID.
    pub async fn get_property(&self, property_id: i64) -> Result<Property> {
        self.get_json(&format!("/api/properties/{}", property_id))
            .await
    }

    /// Listings owned by a broker.
    pub async fn broker_properties(&self, broker_id: i64) -> Result<Vec<Property>> {
        self.get_json(&format!("/api/properties/broker/{}", broker_id))
            .await
    }

    /// Create a listing for a broker.
    pub async fn create_property(&self, broker_id: i64, draft: &PropertyDraft) -> Result<Property> {
        draft.validate()?;

        let builder = self
            .request(Method::POST, "/api/properties")?
            .query(&[("brokerId", broker_id)])
            .json(draft);
        self.send_json(builder).await
    }

    /// Update a listing, optionally moving it to another broker.
    pub async fn update_property(
        &self,
        property: &Property,
        broker_id: Option<i64>,
    ) -> Result<Property> {
        let mut builder = self.request(Method::PUT, "/api/properties")?.json(property);
        if let Some(broker_id) = broker_id {
            builder = builder.query(&[("brokerId", broker_id)]);
        }
        self.send_json(builder).await
    }

    /// Delete a listing.
    pub async fn delete_property(&self, property_id: i64) -> Result<()> {
        let builder = self.request(Method::DELETE, &format!("/api/properties/{}", property_id))?;
        self.send_empty(builder).await
    }

    /// Upload one or more images; returns the updated listing.
    pub async fn upload_images(
        &self,
        property_id: i64,
        images: Vec<ImageUpload>,
    ) -> Result<Property> {
        if images.is_empty() {
            return Err(ClientError::Validation("no images to upload".into()));
        }

        let mut form = Form::new();
        for image in images {
            let part = Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.content_type)
                .map_err(|e| ClientError::Validation(format!("bad content type: {}", e)))?;
            form = form.part("files", part);
        }

        let builder = self
            .request(Method::POST, &format!("/api/properties/{}/images", property_id))?
            .multipart(form);
        self.send_json(builder).await
    }

    /// Remove one image from a listing by its URL.
    pub async fn delete_image(&self, property_id: i64, image_url: &str) -> Result<Property> {
        let builder = self
            .request(
                Method::DELETE,
                &format!("/api/properties/{}/images", property_id),
            )?
            .query(&[("url", image_url)]);
        self.send_json(builder).await
    }
}
