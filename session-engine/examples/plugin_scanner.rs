//! Scan for plugins and print the known plugin list, grouped by manufacturer

use session_engine::prelude::*;
use session_engine::PluginTree;

fn print_tree(tree: &PluginTree, depth: usize) {
    let indent = "  ".repeat(depth);
    for folder in &tree.sub_folders {
        println!("{}{}/", indent, folder.folder);
        print_tree(folder, depth + 1);
    }
    for plugin in &tree.plugins {
        println!(
            "{}- {} [{}] {}",
            indent, plugin.name, plugin.category, plugin.version
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("Plugin Scanner");
    println!("==============\n");

    let mut engine = Engine::new()?;
    for path in std::env::args().skip(1) {
        engine.add_scan_path(&path)?;
    }

    let report = engine.scanner().scan(&[]);

    let known = engine.known_plugins();
    let mut known = known.borrow_mut();
    for desc in &report.found {
        known.add_type(desc.clone());
    }
    for file in &report.blacklisted {
        known.add_to_blacklist(file.clone());
    }

    println!("Found {} plugins\n", known.len());
    print_tree(&known.create_tree(SortMethod::ByManufacturer), 0);

    if !report.failed.is_empty() {
        println!("\nFailed:");
        for (file, reason) in &report.failed {
            println!("  {}: {}", file.display(), reason);
        }
    }

    if !report.blacklisted.is_empty() {
        println!("\nBlacklisted:");
        for file in &report.blacklisted {
            println!("  {}", file.display());
        }
    }

    Ok(())
}
