//! # Seed Data Generator
//!
//! Populates the database with demo data for development: shop products,
//! a few members and librarians, and a small catalog of books with copies.
//! Payment methods are seeded by the migrations themselves.
//!
//! ## Usage
//! ```bash
//! # Use DATABASE_URL (or the local default)
//! cargo run -p ateneo-db --bin seed
//!
//! # Specify the database explicitly
//! cargo run -p ateneo-db --bin seed -- --db postgres://localhost:5432/ateneo
//! ```
//!
//! Seeding is skipped when products already exist, so it is safe to run
//! against a database that was already set up.

use std::env;

use rust_decimal::Decimal;

use ateneo_db::{Database, DbConfig, NewBookRequest, NewPersonRequest, NewProductRequest};

/// Shop products: name, description, price in cents, starting stock.
const PRODUCTS: &[(&str, &str, i64, i64)] = &[
    ("Notebook A5", "Ruled, 96 pages", 1500, 40),
    ("Notebook A4", "Plain, 120 pages", 2200, 25),
    ("Fountain Pen", "Fine nib, blue", 4800, 12),
    ("Ballpoint Pen", "Black ink", 350, 120),
    ("Bookmark Set", "Set of 5, assorted", 900, 60),
    ("Tote Bag", "Canvas, house logo", 3500, 18),
    ("Postcard Pack", "10 art postcards", 1200, 45),
    ("Espresso", "Single shot", 800, 0),
    ("Cappuccino", "With cocoa dust", 1100, 0),
    ("Reading Lamp", "Clip-on, USB", 6500, 7),
];

/// Members: name, lastname, dni.
const MEMBERS: &[(&str, &str, &str)] = &[
    ("Ana", "García", "30123456"),
    ("Luis", "Pereyra", "28987654"),
    ("Marta", "Sosa", "33456789"),
    ("Diego", "Funes", "31222333"),
];

/// Librarians: name, lastname, dni.
const LIBRARIANS: &[(&str, &str, &str)] = &[
    ("Jorge", "Medina", "25111222"),
    ("Clara", "Benítez", "27333444"),
];

/// Books: isbn, title, author, copies.
const BOOKS: &[(&str, &str, &str, i32)] = &[
    ("978-0-14-243723-0", "Don Quixote", "Miguel de Cervantes", 3),
    ("978-0-8021-3030-3", "Ficciones", "Jorge Luis Borges", 2),
    (
        "978-0-06-088328-7",
        "One Hundred Years of Solitude",
        "Gabriel García Márquez",
        4,
    ),
    ("978-0-394-75284-1", "Hopscotch", "Julio Cortázar", 2),
    ("978-0-14-203937-3", "The Aleph", "Jorge Luis Borges", 2),
    ("978-0-8021-3390-8", "Pedro Páramo", "Juan Rulfo", 1),
];

const DEFAULT_DB: &str = "postgres://localhost:5432/ateneo";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_url = env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DB.to_string());

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_url = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Ateneo Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <URL>     Database URL (default: $DATABASE_URL or {DEFAULT_DB})");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Ateneo Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_url);
    println!();

    // Connect to database (runs migrations by default)
    let config = DbConfig::new(&db_url);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing data
    let existing = db.products().list().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} products", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    println!();
    println!("Seeding products...");
    for (name, description, price_cents, stock) in PRODUCTS {
        let request = NewProductRequest {
            name: Some((*name).to_string()),
            description: Some((*description).to_string()),
            price: Some(Decimal::new(*price_cents, 2)),
            stock: Some(Decimal::from(*stock)),
        };
        let product = db.products().create(&request).await?;
        println!("  {} ({})", product.name, product.price);
    }

    println!();
    println!("Seeding people...");
    for (name, lastname, dni) in MEMBERS {
        let request = NewPersonRequest {
            name: Some((*name).to_string()),
            lastname: Some((*lastname).to_string()),
            dni: Some((*dni).to_string()),
        };
        let member = db.people().register_member(&request).await?;
        println!(
            "  member    {} {} ({})",
            member.name,
            member.lastname,
            member.member_id.as_deref().unwrap_or("-")
        );
    }
    for (name, lastname, dni) in LIBRARIANS {
        let request = NewPersonRequest {
            name: Some((*name).to_string()),
            lastname: Some((*lastname).to_string()),
            dni: Some((*dni).to_string()),
        };
        let librarian = db.people().register_librarian(&request).await?;
        println!(
            "  librarian {} {} ({})",
            librarian.name,
            librarian.lastname,
            librarian.enrollment_librarian.as_deref().unwrap_or("-")
        );
    }

    println!();
    println!("Seeding books...");
    let mut copies_total = 0;
    for (isbn, title, author, copies) in BOOKS {
        let request = NewBookRequest {
            isbn: Some((*isbn).to_string()),
            title: Some((*title).to_string()),
            author: Some((*author).to_string()),
            copies: Some(*copies),
        };
        let book = db.books().register_with_copies(&request).await?;
        copies_total += book.copies.len();
        println!("  {} ({} copies)", book.title, book.copies.len());
    }

    let payments = db.payments().list_active().await?;

    println!();
    println!("✓ Seed complete!");
    println!("  Products:        {}", PRODUCTS.len());
    println!("  Members:         {}", MEMBERS.len());
    println!("  Librarians:      {}", LIBRARIANS.len());
    println!("  Books:           {} ({} copies)", BOOKS.len(), copies_total);
    println!("  Payment methods: {} (from migrations)", payments.len());

    Ok(())
}
