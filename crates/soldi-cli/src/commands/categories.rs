//! Category command implementations

use anyhow::Result;
use soldi_core::db::Database;

pub fn cmd_categories_list(db: &Database) -> Result<()> {
    let user = db.get_or_create_local_user()?;
    let categories = db.list_categories(user.id)?;

    if categories.is_empty() {
        println!("No categories found. Create one with:");
        println!("  soldi categories add Spesa --sub Supermercato --sub Panetteria");
        return Ok(());
    }

    println!();
    println!("🏷️  Categories");
    println!("   ─────────────────────────────");

    for category in &categories {
        println!("   [{}] {}", category.id, category.name);
        for sub in &category.subcategories {
            println!("       [{}] {}", sub.id, sub.name);
        }
    }

    Ok(())
}

pub fn cmd_categories_add(db: &Database, name: &str, subcategories: &[String]) -> Result<()> {
    let user = db.get_or_create_local_user()?;
    let category = db.create_category(user.id, name, subcategories)?;

    println!("✅ Created category [{}] {}", category.id, category.name);
    if !category.subcategories.is_empty() {
        let names: Vec<&str> = category
            .subcategories
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        println!("   Subcategories: {}", names.join(", "));
    }

    Ok(())
}

pub fn cmd_categories_delete(db: &Database, id: i64) -> Result<()> {
    let user = db.get_or_create_local_user()?;
    let category = db
        .get_category(user.id, id)?
        .ok_or_else(|| anyhow::anyhow!("Category {} not found", id))?;

    db.delete_category(user.id, id)?;

    println!(
        "✅ Deleted category '{}' and its subcategories.",
        category.name
    );
    println!("   Existing transactions keep their records but lose the category link.");

    Ok(())
}
