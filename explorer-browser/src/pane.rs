use bitflags::bitflags;

use crate::guid::Guid;
use crate::status::CallbackError;

/// Number of panes whose visibility can be negotiated.
pub const PANE_COUNT: usize = 10;

/// Individual explorer panes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(usize)]
pub enum PaneId {
    /// Navigation tree
    NavPane = 0,
    /// Command bar
    Commands,
    /// "Organize" menu of the command bar
    CommandsOrganize,
    /// "View" menu of the command bar
    CommandsView,
    /// Details pane
    DetailsPane,
    /// Preview pane
    PreviewPane,
    /// Search box
    QueryPane,
    /// Advanced search pane
    AdvancedQueryPane,
    /// Status bar
    StatusBar,
    /// Ribbon
    Ribbon,
}

impl PaneId {
    /// All panes in table order.
    pub const ALL: [PaneId; PANE_COUNT] = [
        PaneId::NavPane,
        PaneId::Commands,
        PaneId::CommandsOrganize,
        PaneId::CommandsView,
        PaneId::DetailsPane,
        PaneId::PreviewPane,
        PaneId::QueryPane,
        PaneId::AdvancedQueryPane,
        PaneId::StatusBar,
        PaneId::Ribbon,
    ];

    /// The identifier the engine uses for this pane.
    pub const fn guid(self) -> Guid {
        match self {
            PaneId::NavPane => Guid::from_u128(0xcb316b22_25f7_42b8_8a09_540d23a43c2f),
            PaneId::Commands => Guid::from_u128(0xd9745868_ca5f_4a76_91cd_f5a129fbb076),
            PaneId::CommandsOrganize => Guid::from_u128(0x72e81700_e3ec_4660_bf24_3c3b7b648806),
            PaneId::CommandsView => Guid::from_u128(0x21f7c32d_eeaa_439b_bb51_37b96fd6a943),
            PaneId::DetailsPane => Guid::from_u128(0x43abf98b_89b8_472d_b9ce_e69b8229f019),
            PaneId::PreviewPane => Guid::from_u128(0x893c63d1_45c8_4d17_be19_223be71be365),
            PaneId::QueryPane => Guid::from_u128(0x65bcde4f_4f07_4f27_83a7_1afca4df7ddd),
            PaneId::AdvancedQueryPane => Guid::from_u128(0xb4e9db8b_34ba_4c39_b5cc_16a1bd2c411c),
            PaneId::StatusBar => Guid::from_u128(0x65fe56ce_5cfe_4bc4_ad8a_7ae3fe7e8f7c),
            PaneId::Ribbon => Guid::from_u128(0xd27524a8_c9f2_4834_a106_df8889fd4f37),
        }
    }

    /// Look a pane up by its engine identifier.
    pub fn from_guid(guid: &Guid) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.guid() == *guid)
    }
}

/// Visibility directive of a pane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum PaneVisibility {
    /// Let the engine decide
    #[default]
    DontCare = 0x0000,
    /// Shown unless the user hid it
    DefaultOn = 0x0001,
    /// Hidden unless the user showed it
    DefaultOff = 0x0002,
}

bitflags! {
    /// Modifiers of a [`PaneVisibility`] directive.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct PaneStateFlags: u32 {
        /// Apply the directive only the first time the view is shown
        const INITIAL_STATE = 0x0001_0000;
        /// Apply the directive and prevent the user from changing it
        const FORCE = 0x0002_0000;
    }
}

/// A pane directive combined with its modifiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaneState {
    /// Show/hide directive.
    pub visibility: PaneVisibility,
    /// Modifiers.
    pub flags: PaneStateFlags,
}

impl PaneState {
    const STATE_MASK: u32 = 0xFFFF;

    /// The engine decides.
    pub const DONT_CARE: PaneState = PaneState::new(PaneVisibility::DontCare);

    /// A directive without modifiers.
    pub const fn new(visibility: PaneVisibility) -> Self {
        Self {
            visibility,
            flags: PaneStateFlags::empty(),
        }
    }

    /// Add modifiers to the ones already set.
    pub const fn with_flags(mut self, flags: PaneStateFlags) -> Self {
        self.flags = self.flags.union(flags);
        self
    }

    /// Native encoding: directive in the low word, flags above.
    pub fn bits(self) -> u32 {
        self.visibility as u32 | self.flags.bits()
    }

    /// Decode the native encoding; `None` for an unknown directive.
    pub fn from_bits(bits: u32) -> Option<Self> {
        let visibility = match bits & Self::STATE_MASK {
            0x0000 => PaneVisibility::DontCare,
            0x0001 => PaneVisibility::DefaultOn,
            0x0002 => PaneVisibility::DefaultOff,
            _ => return None,
        };
        Some(Self {
            visibility,
            flags: PaneStateFlags::from_bits_truncate(bits & !Self::STATE_MASK),
        })
    }
}

/// Visibility policy for every pane.
///
/// Changes take effect only when the engine creates its next view (for
/// example after navigating to another folder).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaneVisibilitySettings {
    states: [PaneState; PANE_COUNT],
}

impl PaneVisibilitySettings {
    /// `DontCare` for every pane.
    pub fn new() -> Self {
        Self::default()
    }

    /// State configured for `pane`.
    pub fn get(&self, pane: PaneId) -> PaneState {
        self.states[pane as usize]
    }

    /// Configure `pane`.
    pub fn set(&mut self, pane: PaneId, state: PaneState) -> &mut Self {
        self.states[pane as usize] = state;
        self
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, pane: PaneId, state: PaneState) -> Self {
        self.set(pane, state);
        self
    }

    /// State for a pane named by its engine identifier.
    pub fn state_for(&self, pane: &Guid) -> Result<PaneState, CallbackError> {
        PaneId::from_guid(pane)
            .map(|p| self.get(p))
            .ok_or(CallbackError::InvalidArgument)
    }

    /// Iterate panes with their states.
    pub fn iter(&self) -> impl Iterator<Item = (PaneId, PaneState)> + '_ {
        PaneId::ALL.into_iter().map(|p| (p, self.get(p)))
    }
}
