//! Menu states
//!
//! Every confirm press moves one step along a fixed path:
//!
//! ```text
//! Idle -> Banner -> Title(1..=4) -> RomBank -> Sound -> Boot -> SaveConfirm -> Idle
//! ```

/// What to do with the edited record when the menu closes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExitAction {
    /// Persist and carry on
    Save,
    /// Persist, then let the watchdog restart the controller
    SaveAndRestart,
    /// Use the edits without persisting them
    Keep,
    /// Throw the edits away
    Discard,
    /// Persist factory defaults, then restart
    FactoryReset,
}

impl ExitAction {
    const ALL: [ExitAction; 5] = [
        ExitAction::Save,
        ExitAction::SaveAndRestart,
        ExitAction::Keep,
        ExitAction::Discard,
        ExitAction::FactoryReset,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Next choice, wrapping after the last
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous choice, wrapping before the first
    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            ExitAction::Save => "Save",
            ExitAction::SaveAndRestart => "Save+Reset",
            ExitAction::Keep => "Use",
            ExitAction::Discard => "Discard",
            ExitAction::FactoryReset => "Factory Reset",
        }
    }
}

/// Configuration menu states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuState {
    /// Menu closed
    #[default]
    Idle,
    /// Welcome screen
    Banner,
    /// Editing the title of ROM bank 1-4
    Title(u8),
    /// Choosing the active ROM bank
    RomBank,
    Sound,
    Boot,
    /// Choosing how to leave the menu
    SaveConfirm(ExitAction),
}

impl MenuState {
    /// State after a confirm press
    pub fn advance(self) -> Self {
        use MenuState::*;

        match self {
            Idle => Banner,
            Banner => Title(1),
            Title(bank) if bank < 4 => Title(bank + 1),
            Title(_) => RomBank,
            RomBank => Sound,
            Sound => Boot,
            Boot => SaveConfirm(ExitAction::SaveAndRestart),
            SaveConfirm(_) => Idle,
        }
    }

    pub fn is_idle(self) -> bool {
        self == MenuState::Idle
    }
}
