use anyhow::Result;

use cinescroll_core::content::{Catalog, Inspiration};

pub fn run(catalog: &Catalog, category: Option<&str>) -> Result<()> {
    let items: Vec<&Inspiration> = match category {
        Some(category) => catalog.by_category(category).collect(),
        None => catalog.list().iter().collect(),
    };

    if items.is_empty() {
        match category {
            Some(category) => {
                println!("No entries in category '{}'.", category);
                let known: Vec<_> = catalog.categories().into_iter().collect();
                println!("\nKnown categories: {}", known.join(", "));
            }
            None => println!("No entries yet."),
        }
        return Ok(());
    }

    println!("Inspirations ({}):\n", items.len());

    for item in items {
        let tags = if item.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", item.tags.join(", "))
        };

        println!("  {} - {}{}", item.id, item.title, tags);
        println!("    {} | {}", item.category, item.date.format("%Y-%m-%d"));
        println!("    {}", item.excerpt(96));
        if let Some(media) = &item.media {
            println!("    Media: {:?} {}", media.kind, media.url);
        }
        println!();
    }

    Ok(())
}
