//! CLI command implementations
//!
//! All commands operate on a [`pinreclaim_dummy::SimChip`] through the
//! [`pinreclaim_core::bus::FlashBus`] trait, exactly as firmware would on
//! the real controller.

pub mod list;
pub mod probe;
pub mod reclaim;
pub mod status;

use pinreclaim_core::protocol::Commit;
use pinreclaim_core::recipe::Recipe;
use std::error::Error;

/// Look up a recipe by name, listing the valid ones on failure
fn parse_recipe(name: &str) -> Result<Recipe, Box<dyn Error>> {
    Recipe::from_name(name).ok_or_else(|| {
        let names: Vec<&str> = Recipe::ALL.iter().map(|r| r.name()).collect();
        format!(
            "Unknown recipe '{}'. Expected one of: {}",
            name,
            names.join(", ")
        )
        .into()
    })
}

fn commit(non_volatile: bool) -> Commit {
    if non_volatile {
        Commit::NonVolatile
    } else {
        Commit::Volatile
    }
}
