use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Province {
    pub id: String,
    pub name: String,
}

/// A regency or city inside a province.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct City {
    pub id: String,
    pub province_id: String,
    pub name: String,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ProvinceQuery {
    /// Case-insensitive substring match on the province name.
    pub search: Option<String>,
    /// Page size, at most 100. Missing or 0 returns every match.
    pub limit: Option<i64>,
    /// 1-based page number, used only with `limit`.
    pub page: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProvinceList {
    #[schema(value_type = Vec<Province>)]
    pub items: Vec<Province>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CityList {
    #[schema(value_type = Vec<City>)]
    pub items: Vec<City>,
}
