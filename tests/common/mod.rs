// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process fake marketplace backend for integration tests.
//!
//! Serves the subset of the REST API the client uses, enforces Basic auth
//! on the endpoints the real backend protects, and records every request.

#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use realty_client::config::Config;
use realty_client::session::{LoginRedirect, MemorySessionStore, SessionStore};
use realty_client::SessionManager;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Shared = Arc<Mutex<BackendState>>;

#[derive(Debug, Clone)]
pub struct FakeUser {
    pub user_id: i64,
    pub email: String,
    pub password: String,
    pub role: &'static str,
    pub name: String,
    pub broker_id: Option<i64>,
    pub customer_id: Option<i64>,
}

impl FakeUser {
    fn profile(&self) -> Value {
        json!({
            "userId": self.user_id,
            "email": self.email,
            "role": self.role,
            "mobile": null,
            "city": "Pune",
            "brokerId": self.broker_id,
            "customerId": self.customer_id,
        })
    }
}

/// One request as seen by the backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Debug, Default)]
pub struct BackendState {
    pub users: Vec<FakeUser>,
    /// property id -> (city, broker id)
    pub properties: BTreeMap<i64, (String, i64)>,
    /// customer id -> favorited property ids
    pub favorites: BTreeMap<i64, BTreeSet<i64>>,
    pub deals: Vec<Value>,
    pub comments: BTreeMap<i64, Vec<Value>>,
    /// property id -> image URLs, when changed from the default
    pub images: BTreeMap<i64, Vec<String>>,
    /// broker id -> ratings
    pub ratings: BTreeMap<i64, Vec<Value>>,
    pub requests: Vec<RecordedRequest>,
    /// Forced status for the login endpoint
    pub login_status: Option<StatusCode>,
    /// Forced status for favorite add/remove
    pub favorite_write_status: Option<StatusCode>,
    /// Delay before favorite add/remove is applied
    pub favorite_write_delay: Option<Duration>,
    next_id: i64,
}

impl BackendState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn authenticate(&self, headers: &HeaderMap) -> Option<&FakeUser> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let token = value.strip_prefix("Basic ")?;
        let decoded = String::from_utf8(BASE64.decode(token).ok()?).ok()?;
        let (email, password) = decoded.split_once(':')?;
        self.users
            .iter()
            .find(|u| u.email == email && u.password == password)
    }

    fn authorize_customer(&self, headers: &HeaderMap, customer_id: i64) -> Result<(), StatusCode> {
        let user = self.authenticate(headers).ok_or(StatusCode::UNAUTHORIZED)?;
        if user.customer_id == Some(customer_id) {
            Ok(())
        } else {
            Err(StatusCode::FORBIDDEN)
        }
    }

    fn property_json(&self, property_id: i64) -> Option<Value> {
        let (city, broker_id) = self.properties.get(&property_id)?;
        let images = self
            .images
            .get(&property_id)
            .cloned()
            .unwrap_or_else(|| vec![format!("/uploads/{}/front.jpg", property_id)]);
        Some(json!({
            "propId": property_id,
            "configuration": "FLAT",
            "offerType": "SELL",
            "offerCost": 5_000_000.0,
            "areaSqft": 900.0,
            "address": format!("{} Main Road", property_id),
            "street": null,
            "city": city,
            "status": true,
            "imageUrls": images,
            "avgRating": 0.0,
            "reviewCount": 0,
            "broker": { "broId": broker_id, "broName": "Acme Realty" },
        }))
    }
}

/// Handle on a running fake backend.
pub struct FakeBackend {
    pub base_url: String,
    pub state: Shared,
}

impl FakeBackend {
    /// Start the backend on an ephemeral local port.
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(BackendState::default()));
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake backend");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake backend crashed");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn lock(&self) -> std::sync::MutexGuard<'_, BackendState> {
        self.state.lock().unwrap()
    }

    /// Add a CUSTOMER account; returns its customer id.
    pub fn add_customer(&self, email: &str, password: &str) -> i64 {
        let mut st = self.lock();
        let user_id = st.next_id();
        let customer_id = st.next_id();
        st.users.push(FakeUser {
            user_id,
            email: email.to_string(),
            password: password.to_string(),
            role: "CUSTOMER",
            name: "Customer".to_string(),
            broker_id: None,
            customer_id: Some(customer_id),
        });
        customer_id
    }

    /// Add a BROKER account; returns its broker id.
    pub fn add_broker(&self, email: &str, password: &str) -> i64 {
        let mut st = self.lock();
        let user_id = st.next_id();
        let broker_id = st.next_id();
        st.users.push(FakeUser {
            user_id,
            email: email.to_string(),
            password: password.to_string(),
            role: "BROKER",
            name: "Acme Realty".to_string(),
            broker_id: Some(broker_id),
            customer_id: None,
        });
        broker_id
    }

    pub fn add_property(&self, property_id: i64, city: &str, broker_id: i64) {
        self.lock()
            .properties
            .insert(property_id, (city.to_string(), broker_id));
    }

    pub fn set_favorites(&self, customer_id: i64, ids: &[i64]) {
        self.lock()
            .favorites
            .insert(customer_id, ids.iter().copied().collect());
    }

    pub fn server_favorites(&self, customer_id: i64) -> Vec<i64> {
        self.lock()
            .favorites
            .get(&customer_id)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Change a password server-side, making stored credentials stale.
    pub fn change_password(&self, email: &str, password: &str) {
        let mut st = self.lock();
        if let Some(user) = st.users.iter_mut().find(|u| u.email == email) {
            user.password = password.to_string();
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn reset_requests(&self) {
        self.lock().requests.clear();
    }
}

/// Redirect hook that remembers every navigation.
#[derive(Default)]
pub struct RecordingRedirect {
    pub paths: Mutex<Vec<String>>,
}

impl RecordingRedirect {
    pub fn count(&self) -> usize {
        self.paths.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<String> {
        self.paths.lock().unwrap().last().cloned()
    }
}

impl LoginRedirect for RecordingRedirect {
    fn redirect_to_login(&self, login_path: &str) {
        self.paths.lock().unwrap().push(login_path.to_string());
    }
}

/// A session manager against `base_url` with an in-memory store.
pub fn session_for(base_url: &str) -> (SessionManager, Arc<RecordingRedirect>) {
    session_with_store(base_url, Arc::new(MemorySessionStore::new()))
}

pub fn session_with_store(
    base_url: &str,
    store: Arc<dyn SessionStore>,
) -> (SessionManager, Arc<RecordingRedirect>) {
    let config = Config::for_base(base_url).expect("valid base URL");
    let redirect = Arc::new(RecordingRedirect::default());
    let manager =
        SessionManager::from_config(&config, store, redirect.clone()).expect("session manager");
    (manager, redirect)
}

/// A base URL nothing is listening on.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

// ─── Routes ──────────────────────────────────────────────────────────────────

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/users/login", post(login))
        .route("/api/auth/register/broker", post(register_broker))
        .route("/api/auth/register/customer", post(register_customer))
        .route(
            "/api/properties",
            get(list_properties)
                .post(create_property)
                .put(update_property),
        )
        .route("/api/properties/search", get(search_properties))
        .route(
            "/api/properties/{id}",
            get(get_property).delete(delete_property),
        )
        .route(
            "/api/properties/{id}/images",
            post(upload_images).delete(delete_image),
        )
        .route("/api/properties/broker/{id}", get(broker_properties))
        .route(
            "/api/properties/{id}/comments",
            get(list_comments).post(add_comment),
        )
        .route("/api/brokers", get(list_brokers))
        .route("/api/brokers/top-rated", get(list_brokers))
        .route("/api/brokers/{id}", get(get_broker))
        .route(
            "/api/brokers/{id}/ratings",
            get(list_ratings).post(rate_broker),
        )
        .route("/api/customers/{id}/properties", get(list_favorites))
        .route(
            "/api/customers/{cid}/favorites/{pid}",
            post(add_favorite).delete(remove_favorite),
        )
        .route("/api/customers/{id}/deals", get(customer_deals))
        .route("/api/deals", post(create_deal))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    {
        let mut st = state.lock().unwrap();
        st.requests.push(RecordedRequest {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            query: request.uri().query().map(str::to_string),
            authorization: request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .map(str::to_string),
        });
    }
    next.run(request).await
}

#[derive(Deserialize)]
struct LoginParams {
    email: String,
    password: String,
}

async fn login(State(state): State<Shared>, Query(params): Query<LoginParams>) -> Response {
    let st = state.lock().unwrap();
    if let Some(status) = st.login_status {
        return (status, "forced failure").into_response();
    }
    match st
        .users
        .iter()
        .find(|u| u.email == params.email && u.password == params.password)
    {
        Some(user) => Json(user.profile()).into_response(),
        None => (StatusCode::UNAUTHORIZED, "Invalid email or password").into_response(),
    }
}

async fn register_broker(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    register(&state, &body, "BROKER", "brokerName")
}

async fn register_customer(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    register(&state, &body, "CUSTOMER", "customerName")
}

fn register(state: &Shared, body: &Value, role: &'static str, name_field: &str) -> Response {
    let mut st = state.lock().unwrap();
    let (Some(email), Some(password), Some(name)) = (
        body["email"].as_str(),
        body["password"].as_str(),
        body[name_field].as_str(),
    ) else {
        return (StatusCode::BAD_REQUEST, "Missing required fields").into_response();
    };

    if st.users.iter().any(|u| u.email == email) {
        return (StatusCode::BAD_REQUEST, "Email already registered").into_response();
    }

    let user_id = st.next_id();
    let linked_id = st.next_id();
    let user = FakeUser {
        user_id,
        email: email.to_string(),
        password: password.to_string(),
        role,
        name: name.to_string(),
        broker_id: (role == "BROKER").then_some(linked_id),
        customer_id: (role == "CUSTOMER").then_some(linked_id),
    };
    let profile = user.profile();
    st.users.push(user);
    Json(profile).into_response()
}

async fn list_properties(State(state): State<Shared>) -> Response {
    let st = state.lock().unwrap();
    let all: Vec<Value> = st
        .properties
        .keys()
        .filter_map(|id| st.property_json(*id))
        .collect();
    Json(all).into_response()
}

#[derive(Deserialize)]
struct SearchParams {
    city: Option<String>,
}

async fn search_properties(
    State(state): State<Shared>,
    Query(params): Query<SearchParams>,
) -> Response {
    let st = state.lock().unwrap();
    let found: Vec<Value> = st
        .properties
        .iter()
        .filter(|(_, (city, _))| params.city.as_deref().map_or(true, |c| c == city))
        .filter_map(|(id, _)| st.property_json(*id))
        .collect();
    Json(found).into_response()
}

async fn get_property(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let st = state.lock().unwrap();
    match st.property_json(id) {
        Some(property) => Json(property).into_response(),
        None => (StatusCode::NOT_FOUND, "Property not found").into_response(),
    }
}

async fn broker_properties(
    State(state): State<Shared>,
    Path(broker_id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let st = state.lock().unwrap();
    let Some(user) = st.authenticate(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    if user.broker_id != Some(broker_id) {
        return StatusCode::FORBIDDEN.into_response();
    }
    let owned: Vec<Value> = st
        .properties
        .iter()
        .filter(|(_, (_, owner))| *owner == broker_id)
        .filter_map(|(id, _)| st.property_json(*id))
        .collect();
    Json(owned).into_response()
}

fn broker_json(user: &FakeUser, broker_id: i64, ratings: &[Value]) -> Value {
    let total: f64 = ratings.iter().filter_map(|r| r["rating"].as_f64()).sum();
    let avg = if ratings.is_empty() {
        0.0
    } else {
        total / ratings.len() as f64
    };
    json!({
        "broId": broker_id,
        "broName": user.name,
        "user": { "email": user.email, "role": "BROKER" },
        "avgRating": avg,
        "ratingCount": ratings.len(),
    })
}

async fn list_brokers(State(state): State<Shared>) -> Response {
    let st = state.lock().unwrap();
    let brokers: Vec<Value> = st
        .users
        .iter()
        .filter_map(|u| {
            u.broker_id.map(|id| {
                let ratings = st.ratings.get(&id).map(Vec::as_slice).unwrap_or_default();
                broker_json(u, id, ratings)
            })
        })
        .collect();
    Json(brokers).into_response()
}

async fn get_broker(State(state): State<Shared>, Path(broker_id): Path<i64>) -> Response {
    let st = state.lock().unwrap();
    match st.users.iter().find(|u| u.broker_id == Some(broker_id)) {
        Some(user) => {
            let ratings = st
                .ratings
                .get(&broker_id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            Json(broker_json(user, broker_id, ratings)).into_response()
        }
        None => (StatusCode::NOT_FOUND, "Broker not found").into_response(),
    }
}

async fn list_ratings(State(state): State<Shared>, Path(broker_id): Path<i64>) -> Response {
    let st = state.lock().unwrap();
    Json(st.ratings.get(&broker_id).cloned().unwrap_or_default()).into_response()
}

async fn rate_broker(
    State(state): State<Shared>,
    Path(broker_id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut st = state.lock().unwrap();
    match st.authenticate(&headers) {
        None => return StatusCode::UNAUTHORIZED.into_response(),
        Some(user) if user.customer_id.is_none() => return StatusCode::FORBIDDEN.into_response(),
        Some(_) => {}
    }
    let rating = json!({
        "id": st.next_id(),
        "rating": body["rating"],
        "comment": body["comment"],
        "createdAt": "2025-02-01T09:00:00",
    });
    st.ratings.entry(broker_id).or_default().push(rating.clone());
    Json(rating).into_response()
}

/// The broker behind the request, or the status to reject it with.
fn authorize_broker(st: &BackendState, headers: &HeaderMap) -> Result<i64, StatusCode> {
    let user = st.authenticate(headers).ok_or(StatusCode::UNAUTHORIZED)?;
    user.broker_id.ok_or(StatusCode::FORBIDDEN)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrokerParam {
    broker_id: Option<i64>,
}

async fn create_property(
    State(state): State<Shared>,
    Query(params): Query<BrokerParam>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut st = state.lock().unwrap();
    let broker_id = match authorize_broker(&st, &headers) {
        Ok(id) => id,
        Err(status) => return status.into_response(),
    };
    if params.broker_id != Some(broker_id) {
        return StatusCode::FORBIDDEN.into_response();
    }
    let Some(city) = body["city"].as_str() else {
        return (StatusCode::BAD_REQUEST, "city is required").into_response();
    };
    let property_id = st.next_id();
    st.properties
        .insert(property_id, (city.to_string(), broker_id));
    st.images.insert(property_id, Vec::new());
    Json(st.property_json(property_id)).into_response()
}

async fn update_property(
    State(state): State<Shared>,
    Query(params): Query<BrokerParam>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut st = state.lock().unwrap();
    if let Err(status) = authorize_broker(&st, &headers) {
        return status.into_response();
    }
    let (Some(property_id), Some(city)) = (body["propId"].as_i64(), body["city"].as_str()) else {
        return (StatusCode::BAD_REQUEST, "propId and city are required").into_response();
    };
    let Some(entry) = st.properties.get_mut(&property_id) else {
        return (StatusCode::NOT_FOUND, "Property not found").into_response();
    };
    entry.0 = city.to_string();
    if let Some(broker_id) = params.broker_id {
        entry.1 = broker_id;
    }
    Json(st.property_json(property_id)).into_response()
}

async fn delete_property(
    State(state): State<Shared>,
    Path(property_id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut st = state.lock().unwrap();
    if let Err(status) = authorize_broker(&st, &headers) {
        return status.into_response();
    }
    match st.properties.remove(&property_id) {
        Some(_) => (StatusCode::OK, "Property deleted").into_response(),
        None => (StatusCode::NOT_FOUND, "Property not found").into_response(),
    }
}

/// Accepts a multipart body and records one image per `filename=`.
async fn upload_images(
    State(state): State<Shared>,
    Path(property_id): Path<i64>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut st = state.lock().unwrap();
    if let Err(status) = authorize_broker(&st, &headers) {
        return status.into_response();
    }
    let is_multipart = headers
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));
    if !is_multipart || !st.properties.contains_key(&property_id) {
        return StatusCode::BAD_REQUEST.into_response();
    }

    let text = String::from_utf8_lossy(&body);
    let names: Vec<String> = text
        .split("name=\"files\"; filename=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .map(|name| format!("/uploads/{}/{}", property_id, name))
        .collect();
    st.images.entry(property_id).or_default().extend(names);
    Json(st.property_json(property_id)).into_response()
}

#[derive(Deserialize)]
struct ImageParam {
    url: String,
}

async fn delete_image(
    State(state): State<Shared>,
    Path(property_id): Path<i64>,
    Query(params): Query<ImageParam>,
    headers: HeaderMap,
) -> Response {
    let mut st = state.lock().unwrap();
    if let Err(status) = authorize_broker(&st, &headers) {
        return status.into_response();
    }
    if let Some(images) = st.images.get_mut(&property_id) {
        images.retain(|url| *url != params.url);
    }
    match st.property_json(property_id) {
        Some(property) => Json(property).into_response(),
        None => (StatusCode::NOT_FOUND, "Property not found").into_response(),
    }
}

async fn list_favorites(
    State(state): State<Shared>,
    Path(customer_id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let st = state.lock().unwrap();
    if let Err(status) = st.authorize_customer(&headers, customer_id) {
        return status.into_response();
    }
    let properties: Vec<Value> = st
        .favorites
        .get(&customer_id)
        .into_iter()
        .flatten()
        .filter_map(|id| st.property_json(*id))
        .collect();
    Json(properties).into_response()
}

async fn add_favorite(
    State(state): State<Shared>,
    Path((customer_id, property_id)): Path<(i64, i64)>,
    headers: HeaderMap,
) -> Response {
    write_favorite(state, customer_id, property_id, headers, true).await
}

async fn remove_favorite(
    State(state): State<Shared>,
    Path((customer_id, property_id)): Path<(i64, i64)>,
    headers: HeaderMap,
) -> Response {
    write_favorite(state, customer_id, property_id, headers, false).await
}

async fn write_favorite(
    state: Shared,
    customer_id: i64,
    property_id: i64,
    headers: HeaderMap,
    add: bool,
) -> Response {
    let delay = state.lock().unwrap().favorite_write_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let mut st = state.lock().unwrap();
    if let Err(status) = st.authorize_customer(&headers, customer_id) {
        return status.into_response();
    }
    if let Some(status) = st.favorite_write_status {
        return (status, "forced failure").into_response();
    }

    let ids = st.favorites.entry(customer_id).or_default();
    if add {
        ids.insert(property_id);
        (StatusCode::OK, "Property added to favorites").into_response()
    } else {
        ids.remove(&property_id);
        (StatusCode::OK, "Property removed from favorites").into_response()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DealParams {
    property_id: i64,
    customer_id: i64,
    price: f64,
}

async fn create_deal(
    State(state): State<Shared>,
    Query(params): Query<DealParams>,
    headers: HeaderMap,
) -> Response {
    let mut st = state.lock().unwrap();
    if let Err(status) = st.authorize_customer(&headers, params.customer_id) {
        return status.into_response();
    }
    let Some(property) = st.property_json(params.property_id) else {
        return (StatusCode::BAD_REQUEST, "Property not found").into_response();
    };
    let deal = json!({
        "dealId": st.next_id(),
        "dealDate": "2025-03-14",
        "dealCost": params.price,
        "customerId": params.customer_id,
        "property": property,
    });
    st.deals.push(deal.clone());
    Json(deal).into_response()
}

async fn customer_deals(
    State(state): State<Shared>,
    Path(customer_id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let st = state.lock().unwrap();
    if let Err(status) = st.authorize_customer(&headers, customer_id) {
        return status.into_response();
    }
    let deals: Vec<Value> = st
        .deals
        .iter()
        .filter(|d| d["customerId"] == customer_id)
        .cloned()
        .collect();
    Json(deals).into_response()
}

async fn list_comments(State(state): State<Shared>, Path(property_id): Path<i64>) -> Response {
    let st = state.lock().unwrap();
    let mut comments = st.comments.get(&property_id).cloned().unwrap_or_default();
    comments.reverse();
    Json(comments).into_response()
}

async fn add_comment(
    State(state): State<Shared>,
    Path(property_id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut st = state.lock().unwrap();
    let Some(email) = st.authenticate(&headers).map(|u| u.email.clone()) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    let comment = json!({
        "commentId": st.next_id(),
        "content": body["content"],
        "rating": body["rating"],
        "createdAt": "2025-01-02T10:15:30",
        "user": { "email": email },
    });
    st.comments
        .entry(property_id)
        .or_default()
        .push(comment.clone());
    Json(comment).into_response()
}
