mod common;

use common::{admin, auth, create_product, fixture, region_directory, setup_state, setup_state_with};
use marketplace_api::{
    dto::{categories::CategoryRequest, stores::UpdateStoreRequest, users::UpdateProfileRequest},
    entity::{Categories, Users},
    error::AppError,
    routes::params::StoreQuery,
    services::{category_service, store_service, user_service},
};
use sea_orm::EntityTrait;
use uuid::Uuid;

#[tokio::test]
async fn profile_update_resolves_region_names() -> anyhow::Result<()> {
    let directory = region_directory().await?;
    let Some(state) = setup_state_with(directory.config()).await? else {
        return Ok(());
    };
    let fx = fixture(&state).await?;
    let user = auth(fx.user_id);

    let before = user_service::get_profile(&state, &user)
        .await?
        .into_data()
        .expect("profile");
    assert_eq!(before.birth_date, "");
    assert_eq!(before.province.id, "");

    let updated = user_service::update_profile(
        &state,
        &user,
        UpdateProfileRequest {
            job: Some(" Engineer ".into()),
            birth_date: Some("17/08/1990".into()),
            province_id: Some("31".into()),
            city_id: Some("3171".into()),
            ..Default::default()
        },
    )
    .await?
    .into_data()
    .expect("profile");
    assert_eq!(updated.name, before.name);
    assert_eq!(updated.job, "Engineer");
    assert_eq!(updated.birth_date, "17/08/1990");
    assert_eq!(updated.province.name, "DKI JAKARTA");
    assert_eq!(updated.city.name, "KOTA JAKARTA SELATAN");
    assert_eq!(updated.city.province_id, "31");

    let read = user_service::get_profile(&state, &user)
        .await?
        .into_data()
        .expect("profile");
    assert_eq!(read, updated);
    Ok(())
}

#[tokio::test]
async fn profile_rejects_city_outside_province() -> anyhow::Result<()> {
    let directory = region_directory().await?;
    let Some(state) = setup_state_with(directory.config()).await? else {
        return Ok(());
    };
    let fx = fixture(&state).await?;

    let err = user_service::update_profile(
        &state,
        &auth(fx.user_id),
        UpdateProfileRequest {
            province_id: Some("31".into()),
            city_id: Some("3273".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = user_service::update_profile(
        &state,
        &auth(fx.user_id),
        UpdateProfileRequest {
            province_id: Some("31".into()),
            city_id: Some("3199".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let stored = Users::find_by_id(fx.user_id)
        .one(&state.orm)
        .await?
        .expect("user");
    assert_eq!(stored.province_id, "");
    assert_eq!(stored.city_id, "");
    Ok(())
}

#[tokio::test]
async fn profile_rejects_taken_email_and_bad_fields() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let fx = fixture(&state).await?;
    let other = fixture(&state).await?;
    let other_email = Users::find_by_id(other.user_id)
        .one(&state.orm)
        .await?
        .expect("user")
        .email;

    let err = user_service::update_profile(
        &state,
        &auth(fx.user_id),
        UpdateProfileRequest {
            email: Some(other_email.to_uppercase()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let err = user_service::update_profile(
        &state,
        &auth(fx.user_id),
        UpdateProfileRequest {
            birth_date: Some("1990-08-17".into()),
            phone: Some("12ab".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    match err {
        AppError::Validation(errors) => assert_eq!(errors.len(), 2),
        other => panic!("expected validation error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn category_rename_and_delete() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let fx = fixture(&state).await?;
    let owner = admin(fx.user_id);
    let tag = Uuid::new_v4().simple().to_string();

    let created = category_service::create_category(
        &state,
        &owner,
        CategoryRequest {
            name: format!("Kitchen {tag}"),
        },
    )
    .await?
    .into_data()
    .expect("category");

    let renamed = category_service::update_category(
        &state,
        &owner,
        created.id,
        CategoryRequest {
            name: format!("  Dapur {tag} "),
        },
    )
    .await?
    .into_data()
    .expect("category");
    assert_eq!(renamed.id, created.id);
    assert_eq!(renamed.name, format!("Dapur {tag}"));

    let taken = Categories::find_by_id(fx.category_id)
        .one(&state.orm)
        .await?
        .expect("category")
        .name;
    let err = category_service::update_category(
        &state,
        &owner,
        created.id,
        CategoryRequest { name: taken },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let err = category_service::update_category(
        &state,
        &auth(fx.user_id),
        created.id,
        CategoryRequest {
            name: "Anything".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    category_service::delete_category(&state, &owner, created.id).await?;
    let err = category_service::get_category(&state, created.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = category_service::delete_category(&state, &owner, created.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn category_in_use_cannot_be_deleted() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let fx = fixture(&state).await?;
    create_product(&state, &fx, 50000, 1).await?;

    let err = category_service::delete_category(&state, &admin(fx.user_id), fx.category_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert!(
        Categories::find_by_id(fx.category_id)
            .one(&state.orm)
            .await?
            .is_some()
    );
    Ok(())
}

#[tokio::test]
async fn store_list_filters_by_name_and_pages() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let first = fixture(&state).await?;
    let second = fixture(&state).await?;
    let tag = Uuid::new_v4().simple().to_string();

    for (fx, suffix) in [(&first, "one"), (&second, "two")] {
        store_service::update_my_store(
            &state,
            &auth(fx.user_id),
            UpdateStoreRequest {
                name: Some(format!("Toko {tag} {suffix}")),
                photo_url: None,
            },
        )
        .await?;
    }

    let response = store_service::list_stores(
        &state,
        StoreQuery {
            name: Some(tag.to_uppercase()),
            limit: None,
            page: None,
        },
    )
    .await?;
    assert_eq!(response.meta.clone().expect("meta").total, Some(2));
    let ids: Vec<i64> = response
        .into_data()
        .expect("stores")
        .items
        .iter()
        .map(|store| store.id)
        .collect();
    assert_eq!(ids, vec![first.store_id, second.store_id]);

    let page = store_service::list_stores(
        &state,
        StoreQuery {
            name: Some(tag.clone()),
            limit: Some(1),
            page: Some(2),
        },
    )
    .await?
    .into_data()
    .expect("stores");
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, second.store_id);
    assert_eq!(page.items[0].user_id, second.user_id);
    Ok(())
}
