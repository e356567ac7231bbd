//! CLI argument parsing

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pinreclaim")]
#[command(
    author,
    version,
    about = "Free the flash /WP and /HOLD pins (GPIO9/GPIO10) on a simulated chip",
    long_about = None
)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub chip: ChipArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Simulated chip and reclaim options shared across commands
///
/// Anything given here overrides the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct ChipArgs {
    /// Config file (TOML format)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// JEDEC ID of the simulated chip (hex or decimal, e.g. 0x1640EF)
    #[arg(long, global = true)]
    pub id: Option<String>,

    /// Chip quirks (comma-separated), replacing the ones known for the vendor
    #[arg(long, global = true)]
    pub quirks: Option<String>,

    /// Controller I/O mode (SPI, DOUT, DIO, QOUT, QIO)
    #[arg(long, global = true)]
    pub io_mode: Option<String>,

    /// Vendor groups enabled in the built-in table (comma-separated)
    #[arg(long, global = true, value_delimiter = ',')]
    pub groups: Vec<String>,

    /// Run the reclaim inside a critical section
    #[arg(long, global = true)]
    pub early_boot: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Identify the chip and show which recipe would run
    Probe,

    /// Show status registers SR1..SR3
    Status,

    /// Reclaim GPIO9 and GPIO10
    Reclaim {
        /// Number of boots to simulate, power cycling in between
        #[arg(long, default_value = "1")]
        boots: u32,
    },

    /// Set the QE/WPDis bit with a given recipe
    SetQe {
        /// Recipe (s6-sr1-8, s9-sr2-8, s9-sr1-16)
        recipe: String,

        /// Commit to the non-volatile register
        #[arg(long)]
        non_volatile: bool,
    },

    /// Clear the QE/WPDis bit with a given recipe
    ClearQe {
        /// Recipe (s6-sr1-8, s9-sr2-8, s9-sr1-16)
        recipe: String,

        /// Commit to the non-volatile register
        #[arg(long)]
        non_volatile: bool,
    },

    /// Send the 66h/99h software reset and show what survived
    Reset {
        /// Set QE with this recipe before resetting
        #[arg(long)]
        set_first: Option<String>,

        /// Commit the bit set before the reset to the non-volatile register
        #[arg(long)]
        non_volatile: bool,
    },

    /// List the built-in vendor table
    ListVendors,
}
