use marketplace_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    services::auth_service::hash_password,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let admin_id = ensure_user(&pool, "Admin", "admin@example.com", "081100000001", "admin123", true).await?;
    let user_id = ensure_user(&pool, "Budi", "user@example.com", "081100000002", "user123", false).await?;
    let category_id = ensure_category(&pool, "Merchandise").await?;
    let store_id = store_of(&pool, user_id).await?;
    seed_products(&pool, store_id, category_id).await?;
    seed_address(&pool, user_id).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    phone: &str,
    password: &str,
    is_admin: bool,
) -> anyhow::Result<i64> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (user_id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO users (name, email, phone, password_hash, is_admin)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET is_admin = EXCLUDED.is_admin
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(password_hash)
    .bind(is_admin)
    .fetch_one(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO stores (user_id, name)
        VALUES ($1, $2)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(name)
    .execute(pool)
    .await?;

    println!("Ensured user {email} (admin={is_admin})");
    Ok(user_id)
}

async fn ensure_category(pool: &sqlx::PgPool, name: &str) -> anyhow::Result<i64> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO categories (name)
        VALUES ($1)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(name)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn store_of(pool: &sqlx::PgPool, user_id: i64) -> anyhow::Result<i64> {
    let (id,): (i64,) = sqlx::query_as("SELECT id FROM stores WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(id)
}

async fn seed_products(pool: &sqlx::PgPool, store_id: i64, category_id: i64) -> anyhow::Result<()> {
    let products = vec![
        ("Axum Hoodie", "axum-hoodie", "Warm hoodie for Rustaceans", 500000, 550000, 50),
        ("Ferris Mug", "ferris-mug", "Coffee tastes better with Ferris", 100000, 120000, 100),
        ("Rust Sticker Pack", "rust-sticker-pack", "Decorate your laptop", 40000, 50000, 200),
    ];

    for (name, slug, desc, reseller, consumer, stock) in products {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            INSERT INTO products (store_id, category_id, name, slug, reseller_price, consumer_price, stock, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (slug) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(store_id)
        .bind(category_id)
        .bind(name)
        .bind(slug)
        .bind(reseller as i64)
        .bind(consumer as i64)
        .bind(stock as i32)
        .bind(desc)
        .fetch_optional(pool)
        .await?;

        // Photos only for freshly inserted products.
        if let Some((product_id,)) = row {
            sqlx::query("INSERT INTO product_photos (product_id, url) VALUES ($1, $2)")
                .bind(product_id)
                .bind(format!("https://cdn.example.com/products/{slug}.jpg"))
                .execute(pool)
                .await?;
        }
    }

    println!("Seeded products");
    Ok(())
}

async fn seed_address(pool: &sqlx::PgPool, user_id: i64) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO addresses (user_id, title, recipient_name, phone, detail)
        SELECT $1, 'Home', 'Budi', '081100000002', 'Jl. Merdeka No. 1, Jakarta'
        WHERE NOT EXISTS (SELECT 1 FROM addresses WHERE user_id = $1)
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    println!("Seeded address");
    Ok(())
}
