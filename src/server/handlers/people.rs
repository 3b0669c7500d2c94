//! The person CRUD and filter endpoints. Each handler is a stateless,
//! single-round-trip translation from query parameters to a store call.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::error::RolodexError;
use crate::model::{fields, Person};
use crate::query::{DistanceUnit, Predicate};
use crate::server::AppState;

use super::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterAgeParams {
    pub min_age: u32,
    pub max_age: u32,
}

#[derive(Debug, Deserialize)]
pub struct FilterGeoParams {
    pub lon: f64,
    pub lat: f64,
    pub radius: f64,
    pub unit: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterNameParams {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct FullTextParams {
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalCodeParams {
    pub postal_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetNameParams {
    pub street_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SkillParams {
    pub skill: String,
}

/// `POST /people` — insert a person; the stored record (with its assigned
/// id) is echoed back.
#[instrument(skip(state, person), fields(first_name = %person.first_name, last_name = %person.last_name))]
pub async fn add_person(
    State(state): State<AppState>,
    Json(person): Json<Person>,
) -> Result<Json<Person>, ApiError> {
    let stored = state.store.insert(person).await.map_err(ApiError::from)?;
    info!(id = stored.id.as_deref().unwrap_or(""), "person inserted");
    Ok(Json(stored))
}

/// `GET /people/filterAge?minAge=&maxAge=` — inclusive age range.
#[instrument(skip(state), fields(min_age = params.min_age, max_age = params.max_age))]
pub async fn filter_age(
    State(state): State<AppState>,
    Query(params): Query<FilterAgeParams>,
) -> Result<Json<Vec<Person>>, ApiError> {
    let predicate = Predicate::numeric_range(
        fields::AGE,
        f64::from(params.min_age),
        f64::from(params.max_age),
    );
    run_filter(&state, &predicate).await
}

/// `GET /people/filterGeo?lon=&lat=&radius=&unit=` — radius query around a
/// center point. An unrecognized unit is a structured 400.
#[instrument(skip(state), fields(radius = params.radius, unit = %params.unit))]
pub async fn filter_geo(
    State(state): State<AppState>,
    Query(params): Query<FilterGeoParams>,
) -> Result<Json<Vec<Person>>, ApiError> {
    let unit: DistanceUnit = params.unit.parse().map_err(ApiError::from)?;
    let predicate = Predicate::geo_radius(
        fields::HOME_LOC,
        params.lon,
        params.lat,
        params.radius,
        unit,
    );
    run_filter(&state, &predicate).await
}

/// `GET /people/filterName?firstName=&lastName=` — conjunctive exact match.
#[instrument(skip(state, params))]
pub async fn filter_name(
    State(state): State<AppState>,
    Query(params): Query<FilterNameParams>,
) -> Result<Json<Vec<Person>>, ApiError> {
    let predicate = Predicate::And(vec![
        Predicate::tag(fields::FIRST_NAME, params.first_name),
        Predicate::tag(fields::LAST_NAME, params.last_name),
    ]);
    run_filter(&state, &predicate).await
}

/// `GET /people/fullText?text=` — full-text match on the personal statement.
#[instrument(skip(state, params))]
pub async fn full_text(
    State(state): State<AppState>,
    Query(params): Query<FullTextParams>,
) -> Result<Json<Vec<Person>>, ApiError> {
    let predicate = Predicate::text(fields::PERSONAL_STATEMENT, params.text);
    run_filter(&state, &predicate).await
}

/// `GET /people/postalCode?postalCode=` — exact match on the embedded
/// address's postal code.
#[instrument(skip(state, params))]
pub async fn postal_code(
    State(state): State<AppState>,
    Query(params): Query<PostalCodeParams>,
) -> Result<Json<Vec<Person>>, ApiError> {
    let predicate = Predicate::tag(fields::ADDRESS_POSTAL_CODE, params.postal_code);
    run_filter(&state, &predicate).await
}

/// `GET /people/streetName?streetName=` — full-text match on the embedded
/// address's street name.
#[instrument(skip(state, params))]
pub async fn street_name(
    State(state): State<AppState>,
    Query(params): Query<StreetNameParams>,
) -> Result<Json<Vec<Person>>, ApiError> {
    let predicate = Predicate::text(fields::ADDRESS_STREET_NAME, params.street_name);
    run_filter(&state, &predicate).await
}

/// `GET /people/skill?skill=` — membership query on the skills set.
#[instrument(skip(state, params))]
pub async fn skill(
    State(state): State<AppState>,
    Query(params): Query<SkillParams>,
) -> Result<Json<Vec<Person>>, ApiError> {
    let predicate = Predicate::tag(fields::SKILLS, params.skill);
    run_filter(&state, &predicate).await
}

/// `PATCH /people/updateAge/{id}` — load, mutate only the age, persist.
/// Repeating the call yields the same final state. Unknown ids are a 404.
#[instrument(skip(state), fields(id = %id, new_age = new_age))]
pub async fn update_age(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(new_age): Json<u32>,
) -> Result<StatusCode, ApiError> {
    let mut person = state
        .store
        .get(&id)
        .await
        .map_err(ApiError::from)?
        .ok_or(RolodexError::NotFound { id: id.clone() })?;
    person.age = new_age;
    state.store.save(&person).await.map_err(ApiError::from)?;
    info!(id = %id, new_age, "age updated");
    Ok(StatusCode::ACCEPTED)
}

/// `DELETE /people/{id}` — unlink the storage key. Deleting an unknown id
/// succeeds silently.
#[instrument(skip(state), fields(id = %id))]
pub async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(&id).await.map_err(ApiError::from)?;
    info!(id = %id, "person deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn run_filter(
    state: &AppState,
    predicate: &Predicate,
) -> Result<Json<Vec<Person>>, ApiError> {
    let people = state
        .store
        .search(predicate, state.config.server.max_results)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(people))
}
