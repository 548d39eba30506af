//! # Catalog Seed Tool
//!
//! Populates the price library with a starter set of BTP works.
//!
//! ## Usage
//! ```bash
//! # Seed into the default database file
//! cargo run -p devis-db --bin seed
//!
//! # Specify database path
//! cargo run -p devis-db --bin seed -- --db ./data/devis.db
//! ```
//!
//! ## Generated Items
//! One entry per common trade work across categories:
//! - Gros œuvre (concrete, masonry)
//! - Plâtrerie / isolation
//! - Carrelage, peinture
//! - Plomberie, électricité
//! - Menuiserie, couverture
//!
//! VAT rates follow the French construction rules: 20% standard, 10%
//! renovation works, 5.5% energy renovation. Re-running skips codes that
//! already exist.

use std::env;
use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use devis_core::{CatalogItem, Money, TaxRate};
use devis_db::{Database, DbConfig, DbError};

struct SeedItem {
    code: &'static str,
    name: &'static str,
    unit: &'static str,
    price: &'static str,
    rate: &'static str,
    category: &'static str,
}

const ITEMS: &[SeedItem] = &[
    // Gros œuvre
    SeedItem { code: "GO-BET-001", name: "Béton C25/30 coulé en fondation", unit: "m³", price: "185.00", rate: "20", category: "Gros œuvre" },
    SeedItem { code: "GO-PAR-001", name: "Mur parpaing 20cm monté", unit: "m²", price: "68.50", rate: "20", category: "Gros œuvre" },
    SeedItem { code: "GO-DAL-001", name: "Dalle béton armé 15cm", unit: "m²", price: "92.00", rate: "20", category: "Gros œuvre" },
    SeedItem { code: "GO-TER-001", name: "Terrassement en pleine masse", unit: "m³", price: "38.00", rate: "20", category: "Gros œuvre" },
    // Plâtrerie / isolation
    SeedItem { code: "PLA-BA13-001", name: "Cloison placo BA13 sur rail", unit: "m²", price: "35.80", rate: "10", category: "Plâtrerie" },
    SeedItem { code: "PLA-DBL-001", name: "Doublage collé 13+80", unit: "m²", price: "42.20", rate: "5.5", category: "Plâtrerie" },
    SeedItem { code: "PLA-FXP-001", name: "Faux plafond sur ossature", unit: "m²", price: "48.00", rate: "10", category: "Plâtrerie" },
    SeedItem { code: "ISO-LDV-001", name: "Isolation laine de verre 300mm combles", unit: "m²", price: "28.50", rate: "5.5", category: "Isolation" },
    SeedItem { code: "ISO-ITE-001", name: "Isolation thermique par l'extérieur", unit: "m²", price: "145.00", rate: "5.5", category: "Isolation" },
    // Carrelage
    SeedItem { code: "CAR-SOL-001", name: "Carrelage sol 60x60 collé", unit: "m²", price: "48.30", rate: "10", category: "Carrelage" },
    SeedItem { code: "CAR-FAI-001", name: "Faïence murale salle de bain", unit: "m²", price: "52.00", rate: "10", category: "Carrelage" },
    SeedItem { code: "CAR-CHA-001", name: "Chape de ravoirage 5cm", unit: "m²", price: "24.80", rate: "10", category: "Carrelage" },
    // Peinture
    SeedItem { code: "PEI-MUR-001", name: "Peinture murale 2 couches", unit: "m²", price: "18.50", rate: "10", category: "Peinture" },
    SeedItem { code: "PEI-PLA-001", name: "Peinture plafond 2 couches", unit: "m²", price: "21.00", rate: "10", category: "Peinture" },
    SeedItem { code: "PEI-BOI-001", name: "Lasure boiseries extérieures", unit: "m²", price: "26.40", rate: "10", category: "Peinture" },
    // Plomberie
    SeedItem { code: "PLO-EVA-001", name: "Évacuation PVC Ø100", unit: "ml", price: "32.00", rate: "10", category: "Plomberie" },
    SeedItem { code: "PLO-SDB-001", name: "Installation salle de bain complète", unit: "forfait", price: "3850.00", rate: "10", category: "Plomberie" },
    SeedItem { code: "PLO-CHF-001", name: "Remplacement chaudière condensation", unit: "u", price: "4200.00", rate: "5.5", category: "Plomberie" },
    SeedItem { code: "PLO-PAC-001", name: "Pompe à chaleur air/eau posée", unit: "u", price: "11500.00", rate: "5.5", category: "Plomberie" },
    // Électricité
    SeedItem { code: "ELE-TAB-001", name: "Tableau électrique 13 modules", unit: "u", price: "890.00", rate: "10", category: "Électricité" },
    SeedItem { code: "ELE-PRI-001", name: "Point prise 16A encastré", unit: "u", price: "58.00", rate: "10", category: "Électricité" },
    SeedItem { code: "ELE-LUM-001", name: "Point lumineux commandé", unit: "u", price: "72.00", rate: "10", category: "Électricité" },
    // Menuiserie
    SeedItem { code: "MEN-FEN-001", name: "Fenêtre PVC double vitrage posée", unit: "u", price: "620.00", rate: "5.5", category: "Menuiserie" },
    SeedItem { code: "MEN-PRT-001", name: "Porte intérieure âme pleine", unit: "u", price: "285.00", rate: "10", category: "Menuiserie" },
    SeedItem { code: "MEN-PAR-001", name: "Parquet contrecollé chêne posé", unit: "m²", price: "64.00", rate: "10", category: "Menuiserie" },
    // Couverture
    SeedItem { code: "COU-TUI-001", name: "Couverture tuile mécanique", unit: "m²", price: "78.00", rate: "10", category: "Couverture" },
    SeedItem { code: "COU-ZIN-001", name: "Gouttière zinc demi-ronde", unit: "ml", price: "45.50", rate: "10", category: "Couverture" },
    SeedItem { code: "COU-ECR-001", name: "Écran sous-toiture HPV", unit: "m²", price: "12.80", rate: "10", category: "Couverture" },
    // Main d'œuvre générique
    SeedItem { code: "MO-CHEF-001", name: "Main d'œuvre chef de chantier", unit: "h", price: "58.00", rate: "10", category: "Main d'œuvre" },
    SeedItem { code: "MO-OUVR-001", name: "Main d'œuvre ouvrier qualifié", unit: "h", price: "45.00", rate: "10", category: "Main d'œuvre" },
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parse arguments: --db <path>
    let args: Vec<String> = env::args().collect();
    let mut db_path = "./devis.db".to_string();
    let mut i = 1;
    while i < args.len() {
        if args[i] == "--db" && i + 1 < args.len() {
            db_path = args[i + 1].clone();
            i += 2;
        } else {
            i += 1;
        }
    }

    println!("Seeding catalog into {db_path}");
    let db = Database::new(DbConfig::new(&db_path)).await?;
    let catalog = db.catalog();

    let start = std::time::Instant::now();
    let mut inserted = 0usize;
    let mut skipped = 0usize;

    for item in ITEMS {
        let now = Utc::now();
        let entry = CatalogItem {
            id: Uuid::new_v4(),
            code: item.code.to_string(),
            name: item.name.to_string(),
            unit: item.unit.to_string(),
            unit_price: Money::new(Decimal::from_str(item.price)?),
            tax_rate: TaxRate::from_percent(Decimal::from_str(item.rate)?),
            category: Some(item.category.to_string()),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        match catalog.insert(&entry).await {
            Ok(()) => inserted += 1,
            Err(DbError::UniqueViolation { .. }) => skipped += 1,
            Err(e) => return Err(e.into()),
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Inserted {inserted} items ({skipped} already present) in {elapsed:?}");

    // Verify search works over what we just wrote
    println!();
    println!("Verifying catalog search...");
    let hits = catalog.search("placo", 10).await?;
    println!("  Search 'placo': {} results", hits.len());
    let hits = catalog.search("PLO", 10).await?;
    println!("  Search 'PLO': {} results", hits.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
