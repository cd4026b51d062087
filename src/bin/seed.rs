use clap::Parser;
use fake::faker::lorem::en::{Sentence, Words};
use fake::Fake;
use storefront::{
    db,
    domain::{CreateCouponRequest, CreateProductRequest, CreateShippingRequest, CreateUserRequest},
    repository::{
        CouponRepository, ProductRepository, ShippingRepository, UserRepository,
        SqliteCouponRepository, SqliteProductRepository, SqliteShippingRepository,
        SqliteUserRepository,
    },
};

/// Populate a storefront database with demo data.
#[derive(Parser, Debug)]
#[command(name = "seed")]
struct Args {
    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://storefront.db")]
    database_url: String,

    /// Number of random catalog products to create
    #[arg(long, default_value_t = 20)]
    products: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    println!("🌱 Starting database seeding...");

    println!("📋 Running migrations...");
    let db_pool = db::init_db(&args.database_url, 5).await?;

    let user_repo = SqliteUserRepository::new(db_pool.clone());
    let product_repo = SqliteProductRepository::new(db_pool.clone());
    let coupon_repo = SqliteCouponRepository::new(db_pool.clone());
    let shipping_repo = SqliteShippingRepository::new(db_pool.clone());

    println!("👤 Creating demo customer...");
    let demo = user_repo.create(CreateUserRequest {
        email: "demo@storefront.local".to_string(),
        username: "demo".to_string(),
        password: "demo12345".to_string(),
    }).await?;

    shipping_repo.create(demo.id, CreateShippingRequest {
        address: "Jhamsikhel Road 12".to_string(),
        city: "Lalitpur".to_string(),
        province: "Bagmati".to_string(),
        phone: "9800000001".to_string(),
    }).await?;

    println!("  ✅ Created demo@storefront.local / demo12345 (shipping phone 9800000001)");

    println!("🛍️  Creating products...");

    // A couple of fixed items so the checkout walkthrough is predictable
    product_repo.create(CreateProductRequest {
        name: "Handmade Lokta Notebook".to_string(),
        description: "Paper notebook bound by hand.".to_string(),
        price: 100,
        quantity: 3,
        is_featured: true,
    }).await?;

    product_repo.create(CreateProductRequest {
        name: "Last Singing Bowl".to_string(),
        description: "Only one left in stock.".to_string(),
        price: 2500,
        quantity: 1,
        is_featured: true,
    }).await?;

    for i in 0..args.products {
        let words: Vec<String> = Words(2..4).fake();
        let description: String = Sentence(6..12).fake();

        product_repo.create(CreateProductRequest {
            name: capitalize(&words.join(" ")),
            description,
            price: (50..5000).fake::<i64>(),
            quantity: (0..40).fake::<i64>(),
            is_featured: i % 5 == 0,
        }).await?;
    }

    println!("  ✅ Created {} products", args.products + 2);

    println!("🏷️  Creating coupons...");
    coupon_repo.create(CreateCouponRequest {
        code: "SAVE10".to_string(),
        discount_percent: 10,
        is_active: true,
    }).await?;

    coupon_repo.create(CreateCouponRequest {
        code: "EXPIRED25".to_string(),
        discount_percent: 25,
        is_active: false,
    }).await?;

    println!("  ✅ Created SAVE10 (active) and EXPIRED25 (inactive)");

    println!("\n✨ Seeding complete!");

    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
