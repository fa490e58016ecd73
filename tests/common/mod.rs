#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use marketplace_api::{
    config::{AppConfig, RegionConfig},
    db::{create_orm_conn, create_pool, run_migrations},
    entity::{
        addresses::ActiveModel as AddressActive,
        categories::ActiveModel as CategoryActive,
        product_photos::ActiveModel as PhotoActive,
        products::{ActiveModel as ProductActive, Model as ProductModel},
        stores::ActiveModel as StoreActive,
        users::ActiveModel as UserActive,
    },
    middleware::auth::AuthUser,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::{Value, json};
use uuid::Uuid;

pub struct Fixture {
    pub user_id: i64,
    pub store_id: i64,
    pub category_id: i64,
    pub address_id: i64,
}

// Every test creates its own users and products, so tests can share one
// database and run in parallel.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    setup_state_with(RegionConfig::default()).await
}

pub async fn setup_state_with(regions: RegionConfig) -> anyhow::Result<Option<AppState>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run DB tests.");
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;
    let orm = create_orm_conn(&database_url).await?;

    let config = AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        jwt_exp_days: 7,
        regions,
    };
    Ok(Some(AppState::new(pool, orm, config)?))
}

pub fn unique_phone() -> String {
    format!("08{:010}", Uuid::new_v4().as_u128() % 10_000_000_000)
}

pub async fn fixture(state: &AppState) -> anyhow::Result<Fixture> {
    let tag = Uuid::new_v4().simple().to_string();
    let phone = unique_phone();

    let user = UserActive {
        id: NotSet,
        name: Set(format!("buyer-{tag}")),
        email: Set(format!("{tag}@example.com")),
        phone: Set(phone.clone()),
        password_hash: Set("dummy".into()),
        is_admin: Set(false),
        birth_date: NotSet,
        job: NotSet,
        province_id: NotSet,
        city_id: NotSet,
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let store = StoreActive {
        id: NotSet,
        user_id: Set(user.id),
        name: Set(format!("store-{tag}")),
        photo_url: Set("https://cdn.example.com/store.png".into()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let category = CategoryActive {
        id: NotSet,
        name: Set(format!("category-{tag}")),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let address = AddressActive {
        id: NotSet,
        user_id: Set(user.id),
        title: Set("Home".into()),
        recipient_name: Set("Budi".into()),
        phone: Set(phone),
        detail: Set("Jl. Merdeka No. 1".into()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(Fixture {
        user_id: user.id,
        store_id: store.id,
        category_id: category.id,
        address_id: address.id,
    })
}

pub async fn create_product(
    state: &AppState,
    fx: &Fixture,
    consumer_price: i64,
    stock: i32,
) -> anyhow::Result<ProductModel> {
    let slug = format!("product-{}", Uuid::new_v4().simple());
    let product = ProductActive {
        id: NotSet,
        store_id: Set(fx.store_id),
        category_id: Set(fx.category_id),
        name: Set("Ferris Mug".into()),
        slug: Set(slug.clone()),
        reseller_price: Set(consumer_price - 20000),
        consumer_price: Set(consumer_price),
        stock: Set(stock),
        description: Set("Coffee tastes better with Ferris".into()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    PhotoActive {
        id: NotSet,
        product_id: Set(product.id),
        url: Set(format!("https://cdn.example.com/{slug}.jpg")),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(product)
}

pub fn auth(user_id: i64) -> AuthUser {
    AuthUser {
        user_id,
        is_admin: false,
    }
}

pub fn admin(user_id: i64) -> AuthUser {
    AuthUser {
        user_id,
        is_admin: true,
    }
}

/// A local stand-in for the province/city directory. Counts every request it
/// serves.
pub struct RegionDirectory {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl RegionDirectory {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> RegionConfig {
        RegionConfig {
            base_url: self.base_url.clone(),
            timeout_ms: 2000,
            retries: 2,
            cache_ttl_secs: 60,
        }
    }
}

pub async fn region_directory() -> anyhow::Result<RegionDirectory> {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .fallback(serve_region)
        .with_state(hits.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(RegionDirectory {
        base_url: format!("http://{addr}"),
        hits,
    })
}

async fn serve_region(State(hits): State<Arc<AtomicUsize>>, uri: Uri) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);
    let body: Value = match uri.path() {
        "/provinces.json" => json!([
            { "id": "11", "name": "ACEH" },
            { "id": "31", "name": "DKI JAKARTA" },
            { "id": "32", "name": "JAWA BARAT" },
            { "id": "33", "name": "JAWA TENGAH" },
        ]),
        "/province/31.json" => json!({ "id": "31", "name": "DKI JAKARTA" }),
        "/province/32.json" => json!({ "id": "32", "name": "JAWA BARAT" }),
        "/regencies/31.json" => json!([
            { "id": "3171", "province_id": "31", "name": "KOTA JAKARTA SELATAN" },
            { "id": "3173", "province_id": "31", "name": "KOTA JAKARTA PUSAT" },
        ]),
        "/regency/3171.json" => {
            json!({ "id": "3171", "province_id": "31", "name": "KOTA JAKARTA SELATAN" })
        }
        "/regency/3273.json" => {
            json!({ "id": "3273", "province_id": "32", "name": "KOTA BANDUNG" })
        }
        "/province/99.json" => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    Json(body).into_response()
}
