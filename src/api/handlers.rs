//! API Handlers
//!
//! HTTP request handlers translating each endpoint into a repository call.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header::CONTENT_TYPE, HeaderMap},
    Json,
};

use crate::cache::Repository;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::memory::MemoryStore;
use crate::models::{
    validate_key, BatchResponse, CounterRequest, CounterResponse, ForgetManyRequest,
    HealthResponse, ManyRequest, ManyResponse, PutManyRequest, PutRequest, StatsResponse,
    ValueResponse, WriteResponse,
};

/// Application state shared across all handlers.
///
/// The repository synchronizes through its store, so no outer lock is needed.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache repository
    pub cache: Arc<Repository<MemoryStore>>,
}

impl AppState {
    /// Creates a new AppState around the given repository.
    pub fn new(cache: Repository<MemoryStore>) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        let store = MemoryStore::new(config.max_entries).with_prefix(config.prefix.clone());
        Self::new(Repository::with_default_cache_time(
            store,
            config.default_cache_time,
        ))
    }
}

fn checked_key(key: &str) -> Result<()> {
    match validate_key(key) {
        Some(error_msg) => Err(CacheError::InvalidRequest(error_msg)),
        None => Ok(()),
    }
}

/// Parses an optional counter body. Only an empty body means the default step.
fn counter_request(headers: &HeaderMap, body: &Bytes) -> Result<CounterRequest> {
    if body.is_empty() {
        return Ok(CounterRequest::default());
    }

    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    if !is_json {
        return Err(CacheError::InvalidRequest(
            "Expected request with `Content-Type: application/json`".to_string(),
        ));
    }

    Json::<CounterRequest>::from_bytes(body)
        .map(|Json(req)| req)
        .map_err(|rejection| CacheError::InvalidRequest(rejection.body_text()))
}

/// Handler for GET /cache/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ValueResponse>> {
    let value = state
        .cache
        .get(&key)
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(ValueResponse::new(key, value)))
}

/// Handler for PUT /cache/:key
pub async fn put_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<PutRequest>,
) -> Result<Json<WriteResponse>> {
    checked_key(&key)?;

    let ttl = req.ttl();
    let success = state.cache.put(&key, req.value, ttl);

    Ok(Json(WriteResponse::new(key, success)))
}

/// Handler for POST /cache/:key/add
///
/// Responds with `success: false` when the key already exists.
pub async fn add_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<PutRequest>,
) -> Result<Json<WriteResponse>> {
    checked_key(&key)?;

    let ttl = req.ttl();
    let success = state.cache.add(&key, req.value, ttl);

    Ok(Json(WriteResponse::new(key, success)))
}

/// Handler for DELETE /cache/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<WriteResponse> {
    let success = state.cache.forget(&key);
    Json(WriteResponse::new(key, success))
}

/// Handler for POST /cache/:key/pull
pub async fn pull_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ValueResponse>> {
    let value = state
        .cache
        .pull(&key)
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(ValueResponse::new(key, value)))
}

/// Handler for POST /cache/:key/increment
///
/// The body is optional and defaults to a step of one. A body that is present
/// must be valid JSON.
pub async fn increment_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CounterResponse>> {
    checked_key(&key)?;

    let req = counter_request(&headers, &body)?;
    let value = state.cache.increment_by(&key, req.by)?;

    Ok(Json(CounterResponse::new(key, value)))
}

/// Handler for POST /cache/:key/decrement
pub async fn decrement_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CounterResponse>> {
    checked_key(&key)?;

    let req = counter_request(&headers, &body)?;
    let value = state.cache.decrement_by(&key, req.by)?;

    Ok(Json(CounterResponse::new(key, value)))
}

/// Handler for POST /batch/get
pub async fn many_handler(
    State(state): State<AppState>,
    Json(req): Json<ManyRequest>,
) -> Result<Json<ManyResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let values = state.cache.get_multiple(&req.keys, req.default);
    Ok(Json(ManyResponse { values }))
}

/// Handler for PUT /batch
pub async fn put_many_handler(
    State(state): State<AppState>,
    Json(req): Json<PutManyRequest>,
) -> Result<Json<BatchResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl();
    let success = state.cache.put_many(req.values, ttl);
    Ok(Json(BatchResponse { success }))
}

/// Handler for POST /batch/forget
pub async fn forget_many_handler(
    State(state): State<AppState>,
    Json(req): Json<ForgetManyRequest>,
) -> Result<Json<BatchResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let success = state.cache.delete_multiple(&req.keys);
    Ok(Json(BatchResponse { success }))
}

/// Handler for DELETE /cache
///
/// Flushes the whole store.
pub async fn clear_handler(State(state): State<AppState>) -> Json<BatchResponse> {
    Json(BatchResponse {
        success: state.cache.clear(),
    })
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.store().stats();
    Json(StatsResponse::new(stats, state.cache.default_cache_time()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
