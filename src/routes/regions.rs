use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::regions::{City, CityList, Province, ProvinceList, ProvinceQuery},
    error::AppResult,
    response::ApiResponse,
    services::region_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/provinces", get(list_provinces))
        .route("/provinces/{province_id}", get(get_province))
        .route("/provinces/{province_id}/cities", get(list_cities))
        .route("/cities/{city_id}", get(get_city))
}

#[utoipa::path(
    get,
    path = "/api/regions/provinces",
    params(ProvinceQuery),
    responses(
        (status = 200, description = "Provinces", body = ApiResponse<ProvinceList>),
        (status = 502, description = "Region directory error"),
        (status = 504, description = "Region directory timed out"),
    ),
    tag = "Regions"
)]
pub async fn list_provinces(
    State(state): State<AppState>,
    Query(query): Query<ProvinceQuery>,
) -> AppResult<Json<ApiResponse<ProvinceList>>> {
    Ok(Json(region_service::list_provinces(&state, query).await?))
}

#[utoipa::path(
    get,
    path = "/api/regions/provinces/{province_id}",
    params(("province_id" = String, Path, description = "Numeric province ID")),
    responses(
        (status = 200, description = "Province", body = ApiResponse<Province>),
        (status = 400, description = "Invalid ID"),
        (status = 404, description = "Province not found"),
    ),
    tag = "Regions"
)]
pub async fn get_province(
    State(state): State<AppState>,
    Path(province_id): Path<String>,
) -> AppResult<Json<ApiResponse<Province>>> {
    Ok(Json(
        region_service::get_province(&state, &province_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/regions/provinces/{province_id}/cities",
    params(("province_id" = String, Path, description = "Numeric province ID")),
    responses(
        (status = 200, description = "Cities of the province", body = ApiResponse<CityList>),
        (status = 400, description = "Invalid ID"),
        (status = 404, description = "Province not found"),
    ),
    tag = "Regions"
)]
pub async fn list_cities(
    State(state): State<AppState>,
    Path(province_id): Path<String>,
) -> AppResult<Json<ApiResponse<CityList>>> {
    Ok(Json(
        region_service::list_cities(&state, &province_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/regions/cities/{city_id}",
    params(("city_id" = String, Path, description = "Numeric city ID")),
    responses(
        (status = 200, description = "City", body = ApiResponse<City>),
        (status = 400, description = "Invalid ID"),
        (status = 404, description = "City not found"),
    ),
    tag = "Regions"
)]
pub async fn get_city(
    State(state): State<AppState>,
    Path(city_id): Path<String>,
) -> AppResult<Json<ApiResponse<City>>> {
    Ok(Json(region_service::get_city(&state, &city_id).await?))
}
