//! Bus controller flash access modes

/// I/O mode the bus controller uses to fetch from flash
///
/// On the targeted parts the boot image header selects one of QIO, QOUT,
/// DIO or DOUT. Only the dual and single modes leave IO2 and IO3 idle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IoMode {
    /// Standard SPI: 1-1-1
    #[default]
    Single,
    /// Dual Output (DOUT): 1-1-2
    DualOut,
    /// Dual I/O (DIO): 1-2-2
    DualIo,
    /// Quad Output (QOUT): 1-1-4
    QuadOut,
    /// Quad I/O (QIO): 1-4-4
    QuadIo,
}

impl IoMode {
    /// All modes
    pub const ALL: [IoMode; 5] = [
        Self::Single,
        Self::DualOut,
        Self::DualIo,
        Self::QuadOut,
        Self::QuadIo,
    ];

    /// Look up a mode by its header name, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
    }

    /// Returns true if IO2/IO3 carry data in this mode
    pub const fn requires_quad(&self) -> bool {
        matches!(self, Self::QuadOut | Self::QuadIo)
    }

    /// Name as it appears in boot image headers
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Single => "SPI",
            Self::DualOut => "DOUT",
            Self::DualIo => "DIO",
            Self::QuadOut => "QOUT",
            Self::QuadIo => "QIO",
        }
    }
}

impl core::fmt::Display for IoMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_modes() {
        assert!(IoMode::QuadIo.requires_quad());
        assert!(IoMode::QuadOut.requires_quad());
        assert!(!IoMode::DualIo.requires_quad());
        assert!(!IoMode::DualOut.requires_quad());
        assert!(!IoMode::Single.requires_quad());
    }

    #[test]
    fn test_from_name() {
        assert_eq!(IoMode::from_name("qio"), Some(IoMode::QuadIo));
        assert_eq!(IoMode::from_name("DOUT"), Some(IoMode::DualOut));
        assert_eq!(IoMode::from_name("octal"), None);
    }
}
