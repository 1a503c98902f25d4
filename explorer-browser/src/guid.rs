use std::fmt;

/// 128-bit interface, service or pane identifier.
///
/// The value is stored in canonical textual order, so
/// `Guid::from_u128(0x000214f1_0000_0000_c000_000000000046)` formats as
/// `{000214F1-0000-0000-C000-000000000046}`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Guid(u128);

impl Guid {
    /// Build from the canonical 128-bit value.
    pub const fn from_u128(value: u128) -> Self {
        Self(value)
    }

    /// The canonical 128-bit value.
    pub const fn to_u128(self) -> u128 {
        self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        write!(
            f,
            "{{{:08X}-{:04X}-{:04X}-{:04X}-{:012X}}}",
            (v >> 96) as u32,
            (v >> 80) as u16,
            (v >> 64) as u16,
            (v >> 48) as u16,
            v & 0xFFFF_FFFF_FFFF
        )
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Interface identifiers the engine queries the adapter for.
pub mod iid {
    use super::Guid;

    /// Identity interface every callback object answers to.
    pub const UNKNOWN: Guid = Guid::from_u128(0x00000000_0000_0000_c000_000000000046);
    /// Service resolution.
    pub const SERVICE_PROVIDER: Guid = Guid::from_u128(0x6d5140c1_7436_11ce_8034_00aa006009fa);
    /// Command interception, base revision.
    pub const COMMDLG_BROWSER: Guid = Guid::from_u128(0x000214f1_0000_0000_c000_000000000046);
    /// Command interception, second revision.
    pub const COMMDLG_BROWSER2: Guid = Guid::from_u128(0x10339516_2894_11d2_9039_00c04f8eeb3e);
    /// Command interception, third revision.
    pub const COMMDLG_BROWSER3: Guid = Guid::from_u128(0xc8ad25a1_3294_41ee_8165_71174bd01c57);
    /// Navigation and view notifications.
    pub const EXPLORER_BROWSER_EVENTS: Guid =
        Guid::from_u128(0x361bbdc7_e6ee_4e13_be58_58e2240c810f);
    /// Per-item folder filter.
    pub const FOLDER_FILTER: Guid = Guid::from_u128(0x9cc22886_dc8e_11d2_b1d0_00c04f8eeb3e);
    /// Pane visibility negotiation.
    pub const EXPLORER_PANE_VISIBILITY: Guid =
        Guid::from_u128(0xe07010ec_bc17_44c0_97b0_46c7c95b9edc);
}

/// Service identifiers resolved through the service-provider role.
pub mod sid {
    use super::Guid;

    /// The browser frame service; answers for command interception.
    pub const EXPLORER_BROWSER_FRAME: Guid =
        Guid::from_u128(0xcde725b0_ccc9_4519_917e_325d72fab4ce);
    /// The pane visibility service.
    pub const EXPLORER_PANE_VISIBILITY: Guid =
        Guid::from_u128(0xe07010ec_bc17_44c0_97b0_46c7c95b9edc);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_in_registry_style() {
        assert_eq!(
            iid::COMMDLG_BROWSER.to_string(),
            "{000214F1-0000-0000-C000-000000000046}"
        );
        assert_eq!(
            sid::EXPLORER_BROWSER_FRAME.to_string(),
            "{CDE725B0-CCC9-4519-917E-325D72FAB4CE}"
        );
    }
}
