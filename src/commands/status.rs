//! Status register commands

use pinreclaim_core::bus::FlashBus;
use pinreclaim_core::protocol;
use pinreclaim_core::spi::opcodes;
use pinreclaim_dummy::SimChip;
use std::error::Error;

use super::{commit, parse_recipe};

/// Format one SR1..SR3 snapshot with the bits that matter here
pub fn format_status(value: u32) -> String {
    let [sr1, sr2, sr3, _] = value.to_le_bytes();
    let mut flags = Vec::new();
    if sr1 & opcodes::SR1_WIP != 0 {
        flags.push("WIP");
    }
    if sr1 & opcodes::SR1_WEL != 0 {
        flags.push("WEL");
    }
    if sr1 & opcodes::SR1_QE_S6 != 0 {
        flags.push("S6");
    }
    if sr2 & opcodes::SR2_QE != 0 {
        flags.push("QE/S9");
    }
    format!(
        "SR1=0x{:02X} SR2=0x{:02X} SR3=0x{:02X} [{}]",
        sr1,
        sr2,
        sr3,
        flags.join(" ")
    )
}

fn print_status<B: FlashBus + ?Sized>(bus: &mut B) -> Result<(), Box<dyn Error>> {
    let value = protocol::read_status_registers_24(bus)?;
    println!("{}", format_status(value));
    Ok(())
}

/// Show SR1..SR3
pub fn run(chip: &mut SimChip) -> Result<(), Box<dyn Error>> {
    print_status(chip)
}

/// Set or clear the QE/WPDis bit with a named recipe
pub fn run_set(
    chip: &mut SimChip,
    recipe: &str,
    non_volatile: bool,
    set: bool,
) -> Result<(), Box<dyn Error>> {
    let recipe = parse_recipe(recipe)?;
    let commit = commit(non_volatile);
    print!("Before: ");
    print_status(chip)?;

    let result = if set {
        recipe.set(chip, commit)
    } else {
        recipe.clear(chip, commit)
    };

    print!("After:  ");
    print_status(chip)?;
    println!("Status writes issued: {}", chip.status_writes());
    result?;

    println!(
        "{} bit {} ({} {})",
        recipe.bit(),
        if set { "set" } else { "cleared" },
        commit.name(),
        recipe.name()
    );
    Ok(())
}

/// Software reset, optionally after setting QE
pub fn run_reset(
    chip: &mut SimChip,
    set_first: Option<&str>,
    non_volatile: bool,
) -> Result<(), Box<dyn Error>> {
    if let Some(name) = set_first {
        let recipe = parse_recipe(name)?;
        recipe.set(chip, commit(non_volatile))?;
        print!("Before reset: ");
        print_status(chip)?;
    }

    protocol::software_reset(chip)?;
    print!("After reset:  ");
    print_status(chip)?;
    Ok(())
}
