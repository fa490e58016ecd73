use std::{sync::Arc, time::Duration};

use moka::future::Cache;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    config::RegionConfig,
    dto::regions::{City, CityList, Province, ProvinceList, ProvinceQuery},
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    state::AppState,
};

const MAX_PROVINCE_PAGE: i64 = 100;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegionError {
    #[error("Invalid ID")]
    InvalidId,

    #[error("Data not found")]
    NotFound,

    #[error("Upstream region directory timed out")]
    Timeout,

    #[error("Upstream region directory error")]
    Upstream,
}

impl From<RegionError> for AppError {
    fn from(err: RegionError) -> Self {
        let message = err.to_string();
        match err {
            RegionError::InvalidId => AppError::BadRequest(message),
            RegionError::NotFound => AppError::NotFound(message),
            RegionError::Timeout => AppError::UpstreamTimeout(message),
            RegionError::Upstream => AppError::Upstream(message),
        }
    }
}

#[derive(Clone)]
enum CacheValue {
    Provinces(Arc<Vec<Province>>),
    Cities(Arc<Vec<City>>),
    Province(Province),
    City(City),
}

/// Client for the Indonesian province/city directory.
///
/// Responses are cached per path; concurrent misses on the same key share one
/// upstream request.
#[derive(Clone)]
pub struct RegionClient {
    inner: Arc<RegionClientInner>,
}

struct RegionClientInner {
    client: reqwest::Client,
    base_url: String,
    retries: u32,
    cache: Cache<String, CacheValue>,
}

impl RegionClient {
    pub fn new(config: &RegionConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        let cache = if config.cache_ttl_secs == 0 {
            Cache::builder().max_capacity(0).build()
        } else {
            Cache::builder()
                .max_capacity(1000)
                .time_to_live(Duration::from_secs(config.cache_ttl_secs))
                .build()
        };

        Ok(Self {
            inner: Arc::new(RegionClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                retries: config.retries,
                cache,
            }),
        })
    }

    pub async fn provinces(&self, query: &ProvinceQuery) -> Result<Vec<Province>, RegionError> {
        let all = match self
            .cached("provinces", || async {
                self.get_json::<Vec<Province>>("/provinces.json")
                    .await
                    .map(|list| CacheValue::Provinces(Arc::new(list)))
            })
            .await?
        {
            CacheValue::Provinces(list) => list,
            _ => return Err(RegionError::Upstream),
        };

        Ok(filter_provinces(
            &all,
            query.search.as_deref(),
            query.limit,
            query.page,
        ))
    }

    pub async fn province(&self, id: &str) -> Result<Province, RegionError> {
        ensure_id(id)?;
        let path = format!("/province/{id}.json");
        match self
            .cached(&path, || async {
                self.get_json::<Province>(&path).await.map(CacheValue::Province)
            })
            .await?
        {
            CacheValue::Province(province) => Ok(province),
            _ => Err(RegionError::Upstream),
        }
    }

    pub async fn cities(&self, province_id: &str) -> Result<Vec<City>, RegionError> {
        ensure_id(province_id)?;
        let path = format!("/regencies/{province_id}.json");
        match self
            .cached(&path, || async {
                self.get_json::<Vec<City>>(&path)
                    .await
                    .map(|list| CacheValue::Cities(Arc::new(list)))
            })
            .await?
        {
            CacheValue::Cities(list) => Ok(list.as_ref().clone()),
            _ => Err(RegionError::Upstream),
        }
    }

    pub async fn city(&self, id: &str) -> Result<City, RegionError> {
        ensure_id(id)?;
        let path = format!("/regency/{id}.json");
        match self
            .cached(&path, || async {
                self.get_json::<City>(&path).await.map(CacheValue::City)
            })
            .await?
        {
            CacheValue::City(city) => Ok(city),
            _ => Err(RegionError::Upstream),
        }
    }

    async fn cached<F, Fut>(&self, key: &str, fetch: F) -> Result<CacheValue, RegionError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CacheValue, RegionError>>,
    {
        self.inner
            .cache
            .try_get_with(key.to_string(), fetch())
            .await
            .map_err(|err| err.as_ref().clone())
    }

    /// GETs `path`, retrying timeouts and non-404 error statuses.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RegionError> {
        let url = format!("{}{}", self.inner.base_url, path);
        let mut last = RegionError::Upstream;

        for attempt in 0..=self.inner.retries {
            let response = match self.inner.client.get(&url).send().await {
                Ok(response) => response,
                Err(err) if err.is_timeout() => {
                    tracing::warn!(url = %url, attempt, "region request timed out");
                    last = RegionError::Timeout;
                    continue;
                }
                Err(err) => {
                    tracing::warn!(url = %url, error = %err, "region request failed");
                    return Err(RegionError::Upstream);
                }
            };

            let status = response.status();
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(RegionError::NotFound);
            }
            if !status.is_success() {
                tracing::warn!(url = %url, status = %status, attempt, "region request rejected");
                last = RegionError::Upstream;
                continue;
            }

            return response.json::<T>().await.map_err(|err| {
                tracing::warn!(url = %url, error = %err, "malformed region response");
                if err.is_timeout() {
                    RegionError::Timeout
                } else {
                    RegionError::Upstream
                }
            });
        }

        Err(last)
    }
}

/// Applies the name search, then the optional page window.
pub fn filter_provinces(
    items: &[Province],
    search: Option<&str>,
    limit: Option<i64>,
    page: Option<i64>,
) -> Vec<Province> {
    let needle = search.map(|s| s.trim().to_lowercase()).unwrap_or_default();
    let matches = items
        .iter()
        .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle));

    let limit = match limit {
        Some(limit) if limit > 0 => limit.min(MAX_PROVINCE_PAGE),
        _ => return matches.cloned().collect(),
    };
    let page = page.unwrap_or(1).max(1);
    let offset = usize::try_from((page - 1).saturating_mul(limit)).unwrap_or(usize::MAX);

    matches
        .skip(offset)
        .take(limit as usize)
        .cloned()
        .collect()
}

fn ensure_id(id: &str) -> Result<(), RegionError> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RegionError::InvalidId);
    }
    Ok(())
}

pub async fn list_provinces(
    state: &AppState,
    query: ProvinceQuery,
) -> AppResult<ApiResponse<ProvinceList>> {
    let items = state.regions.provinces(&query).await?;
    Ok(ApiResponse::success(
        "Provinces",
        ProvinceList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_province(state: &AppState, id: &str) -> AppResult<ApiResponse<Province>> {
    let province = state.regions.province(id).await?;
    Ok(ApiResponse::success("Province", province, None))
}

pub async fn list_cities(
    state: &AppState,
    province_id: &str,
) -> AppResult<ApiResponse<CityList>> {
    let items = state.regions.cities(province_id).await?;
    Ok(ApiResponse::success(
        "Cities",
        CityList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_city(state: &AppState, id: &str) -> AppResult<ApiResponse<City>> {
    let city = state.regions.city(id).await?;
    Ok(ApiResponse::success("City", city, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provinces() -> Vec<Province> {
        [("11", "ACEH"), ("31", "DKI JAKARTA"), ("32", "JAWA BARAT"), ("33", "JAWA TENGAH")]
            .into_iter()
            .map(|(id, name)| Province {
                id: id.into(),
                name: name.into(),
            })
            .collect()
    }

    #[test]
    fn search_is_case_insensitive() {
        let found = filter_provinces(&provinces(), Some(" jawa "), None, None);
        let ids: Vec<&str> = found.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["32", "33"]);
    }

    #[test]
    fn zero_limit_returns_everything() {
        assert_eq!(filter_provinces(&provinces(), None, Some(0), Some(3)).len(), 4);
    }

    #[test]
    fn limit_pages_through_matches() {
        let page = filter_provinces(&provinces(), None, Some(3), Some(2));
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, "33");
        assert!(filter_provinces(&provinces(), None, Some(3), Some(i64::MAX)).is_empty());
    }

    #[test]
    fn ids_must_be_numeric() {
        assert_eq!(ensure_id("31"), Ok(()));
        assert_eq!(ensure_id(""), Err(RegionError::InvalidId));
        assert_eq!(ensure_id("3a"), Err(RegionError::InvalidId));
        assert_eq!(ensure_id("../31"), Err(RegionError::InvalidId));
    }

    #[test]
    fn region_errors_map_to_statuses() {
        use axum::http::StatusCode;
        assert_eq!(AppError::from(RegionError::NotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::from(RegionError::InvalidId).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::from(RegionError::Timeout).status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(AppError::from(RegionError::Upstream).status(), StatusCode::BAD_GATEWAY);
    }
}
