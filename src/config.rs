//! TOML config file and command line overrides
//!
//! ```toml
//! [chip]
//! id = 0x164020
//! quirks = ["sr3-cleared"]
//! io_mode = "DIO"
//! sr3 = 0x60
//!
//! [reclaim]
//! groups = ["legacy-16bit", "xmc"]
//! early_boot = false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use pinreclaim_core::bus::BusFeatures;
use pinreclaim_core::{ReclaimConfig, VendorGroups};
use pinreclaim_dummy::{parse_chip_id, parse_io_mode, Quirks, SimConfig, SimConfigError};
use thiserror::Error;

use crate::cli::ChipArgs;

/// Errors loading the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Bad chip description
    #[error(transparent)]
    Chip(#[from] SimConfigError),

    /// Vendor group name not recognised
    #[error("Unknown vendor group '{0}' (see list-vendors)")]
    UnknownGroup(String),

    /// Status register value wider than 8 bits
    #[error("sr{reg} = 0x{value:X} does not fit in a status register")]
    StatusOutOfRange { reg: u8, value: u32 },
}

/// Config file structure
#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    chip: ChipSection,
    #[serde(default)]
    reclaim: ReclaimSection,
}

/// Simulated chip description
#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ChipSection {
    #[serde(default, deserialize_with = "deserialize_opt_hex_u32")]
    id: Option<u32>,
    quirks: Option<Vec<String>>,
    io_mode: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_hex_u32")]
    sr1: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_opt_hex_u32")]
    sr2: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_opt_hex_u32")]
    sr3: Option<u32>,
    busy_polls: Option<u32>,
    two_byte_status: Option<bool>,
}

/// Reclaim settings
#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ReclaimSection {
    groups: Option<Vec<String>>,
    #[serde(default)]
    early_boot: bool,
}

/// Deserialize an optional u32 that can be hex (0x...) or decimal
fn deserialize_opt_hex_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    // Try to deserialize as a number first, then as a string
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum HexOrInt {
        Int(u32),
        Str(String),
    }

    match HexOrInt::deserialize(deserializer)? {
        HexOrInt::Int(n) => Ok(Some(n)),
        HexOrInt::Str(s) => parse_number(&s).map(Some).map_err(serde::de::Error::custom),
    }
}

/// Parse a number that can be hex (0x...) or decimal
fn parse_number(s: &str) -> Result<u32, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("invalid hex: {}", e))
    } else {
        s.parse().map_err(|e| format!("invalid number: {}", e))
    }
}

/// Parse comma-separated or listed vendor group names
pub fn parse_groups<S: AsRef<str>>(names: &[S]) -> Result<VendorGroups, ConfigError> {
    let mut groups = VendorGroups::empty();
    for name in names.iter().map(|n| n.as_ref().trim()) {
        if name.eq_ignore_ascii_case("all") {
            groups |= VendorGroups::all();
            continue;
        }
        groups |= VendorGroups::from_group_name(name)
            .ok_or_else(|| ConfigError::UnknownGroup(name.to_string()))?;
    }
    Ok(groups)
}

/// Everything a command needs to build the simulated chip and reclaimer
#[derive(Debug, Clone)]
pub struct Settings {
    pub sim: SimConfig,
    pub reclaim: ReclaimConfig,
}

impl Settings {
    /// Load the config file (if any) and apply command line overrides
    pub fn load(args: &ChipArgs) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => load_file(path)?,
            None => ConfigFile::default(),
        };
        Self::from_parts(file, args)
    }

    fn from_parts(file: ConfigFile, args: &ChipArgs) -> Result<Self, ConfigError> {
        let id = match (&args.id, file.chip.id) {
            (Some(s), _) => parse_chip_id(s)?,
            (None, Some(raw)) => parse_chip_id(&raw.to_string())?,
            (None, None) => SimConfig::default().id,
        };
        let mut sim = SimConfig::for_chip(id);

        if let Some(list) = &args.quirks {
            sim.quirks = Quirks::from_names(list)?;
        } else if let Some(list) = &file.chip.quirks {
            sim.quirks = Quirks::from_names(&list.join(","))?;
        }

        if let Some(mode) = args.io_mode.as_deref().or(file.chip.io_mode.as_deref()) {
            sim.io_mode = parse_io_mode(mode)?;
        }

        for (slot, value) in [file.chip.sr1, file.chip.sr2, file.chip.sr3]
            .into_iter()
            .enumerate()
        {
            if let Some(value) = value {
                sim.status[slot] =
                    u8::try_from(value).map_err(|_| ConfigError::StatusOutOfRange {
                        reg: slot as u8 + 1,
                        value,
                    })?;
            }
        }
        if let Some(polls) = file.chip.busy_polls {
            sim.busy_polls = polls;
        }
        if let Some(enabled) = file.chip.two_byte_status {
            sim.features.set(BusFeatures::TWO_BYTE_STATUS, enabled);
        }

        let groups = if !args.groups.is_empty() {
            parse_groups(&args.groups)?
        } else if let Some(names) = &file.reclaim.groups {
            parse_groups(names)?
        } else {
            VendorGroups::default()
        };

        Ok(Self {
            sim,
            reclaim: ReclaimConfig {
                groups,
                early_boot: args.early_boot || file.reclaim.early_boot,
            },
        })
    }
}

fn load_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Loaded config from {}", path.display());
    Ok(toml::from_str(&content)?)
}
