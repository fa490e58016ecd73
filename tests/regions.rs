mod common;

use common::region_directory;
use marketplace_api::{
    config::RegionConfig,
    dto::regions::ProvinceQuery,
    error::AppError,
    services::region_service::{RegionClient, RegionError},
};

#[tokio::test]
async fn province_list_is_fetched_once_and_filtered_locally() -> anyhow::Result<()> {
    let directory = region_directory().await?;
    let client = RegionClient::new(&directory.config())?;

    let all = client.provinces(&ProvinceQuery::default()).await?;
    assert_eq!(all.len(), 4);

    let jawa = client
        .provinces(&ProvinceQuery {
            search: Some("jawa".into()),
            ..Default::default()
        })
        .await?;
    let names: Vec<&str> = jawa.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["JAWA BARAT", "JAWA TENGAH"]);

    let second_page = client
        .provinces(&ProvinceQuery {
            search: None,
            limit: Some(3),
            page: Some(2),
        })
        .await?;
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].id, "33");

    assert_eq!(directory.hits(), 1);
    Ok(())
}

#[tokio::test]
async fn cities_and_details_resolve_by_id() -> anyhow::Result<()> {
    let directory = region_directory().await?;
    let client = RegionClient::new(&directory.config())?;

    let cities = client.cities("31").await?;
    assert_eq!(cities.len(), 2);
    assert!(cities.iter().all(|city| city.province_id == "31"));

    let province = client.province("31").await?;
    assert_eq!(province.name, "DKI JAKARTA");

    let city = client.city("3171").await?;
    assert_eq!(city.name, "KOTA JAKARTA SELATAN");
    assert_eq!(city.province_id, "31");

    client.city("3171").await?;
    assert_eq!(directory.hits(), 3);
    Ok(())
}

#[tokio::test]
async fn unknown_region_is_not_found_and_malformed_id_never_leaves_the_process()
-> anyhow::Result<()> {
    let directory = region_directory().await?;
    let client = RegionClient::new(&directory.config())?;

    let missing = client.province("77").await.unwrap_err();
    assert_eq!(missing, RegionError::NotFound);
    assert!(matches!(AppError::from(missing), AppError::NotFound(_)));
    // A 404 is final; it is not retried.
    assert_eq!(directory.hits(), 1);

    let malformed = client.city("31/../71").await.unwrap_err();
    assert_eq!(malformed, RegionError::InvalidId);
    assert!(matches!(AppError::from(malformed), AppError::BadRequest(_)));
    assert_eq!(directory.hits(), 1);
    Ok(())
}

#[tokio::test]
async fn failing_directory_is_retried_then_reported_as_upstream() -> anyhow::Result<()> {
    let directory = region_directory().await?;
    let config = directory.config();
    let client = RegionClient::new(&config)?;

    let err = client.province("99").await.unwrap_err();
    assert_eq!(err, RegionError::Upstream);
    assert!(matches!(AppError::from(err), AppError::Upstream(_)));
    assert_eq!(directory.hits(), config.retries as usize + 1);

    // Failures are not cached.
    client.province("99").await.unwrap_err();
    assert_eq!(directory.hits(), 2 * (config.retries as usize + 1));
    Ok(())
}

#[tokio::test]
async fn unreachable_directory_is_an_upstream_error() -> anyhow::Result<()> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);

    let client = RegionClient::new(&RegionConfig {
        base_url: format!("http://{addr}"),
        timeout_ms: 500,
        retries: 0,
        cache_ttl_secs: 0,
    })?;
    let err = client.provinces(&ProvinceQuery::default()).await.unwrap_err();
    assert!(matches!(err, RegionError::Upstream | RegionError::Timeout));
    Ok(())
}
