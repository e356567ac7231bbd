//! List command implementations

use pinreclaim_core::vendor::{ids, BUILTIN_ENTRIES};

use crate::config::Settings;

/// Print the built-in vendor table
pub fn list_vendors(settings: &Settings) {
    println!("Built-in vendor table:");
    println!();
    println!(
        "  {:<14} {:<14} {:>6}  {:<36} {:<13} enabled",
        "group", "vendor", "type", "recipe", "commit"
    );
    println!("  {}", "-".repeat(100));

    for entry in BUILTIN_ENTRIES {
        let vendor = format!(
            "0x{:02X} {}",
            entry.vendor,
            ids::vendor_name(entry.vendor).unwrap_or("")
        );
        let recipe = if entry.plan.restore_sr3 {
            format!("{} +SR3", entry.plan.recipe)
        } else {
            entry.plan.recipe.to_string()
        };
        println!(
            "  {:<14} {:<14} {:>6}  {:<36} {:<13} {}",
            entry.group.name().unwrap_or("?"),
            vendor,
            format!("0x{:02X}", entry.type_value),
            recipe,
            entry.plan.commit.name(),
            if settings.reclaim.groups.contains(entry.group) {
                "yes"
            } else {
                "no"
            }
        );
    }
}
