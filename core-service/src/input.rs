//! Keyboard shortcuts
//!
//! Hosts translate their native key events into [`KeyEvent`] and let
//! [`ShortcutMapper`] decide what, if anything, the press means.
//!
//! | Key | Focus | Condition | Shortcut |
//! |-----|-------|-----------|----------|
//! | Space | anything but a text area or button | audio loaded | [`Shortcut::TogglePlayback`] |
//! | Ctrl+Enter | text area | | [`Shortcut::SubmitArticle`] |
//! | ArrowDown / ArrowUp | history list | | [`Shortcut::HistoryNext`] / [`Shortcut::HistoryPrevious`] |
//! | Enter | history list | | [`Shortcut::HistorySelect`] |

use core_playback::PlaybackCommand;
use serde::{Deserialize, Serialize};

/// Key identity, independent of layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Space,
    Enter,
    ArrowUp,
    ArrowDown,
    Char(char),
    Other,
}

/// Kind of element holding keyboard focus when the key was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FocusTarget {
    #[default]
    Body,
    TextArea,
    Button,
    HistoryList,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub target: FocusTarget,
    pub ctrl: bool,
}

impl KeyEvent {
    pub fn new(code: KeyCode, target: FocusTarget) -> Self {
        Self {
            code,
            target,
            ctrl: false,
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shortcut {
    TogglePlayback,
    SubmitArticle,
    HistoryNext,
    HistoryPrevious,
    HistorySelect,
}

impl Shortcut {
    /// Playback command for shortcuts handled by the controller loop.
    pub fn to_command(self) -> Option<PlaybackCommand> {
        match self {
            Shortcut::TogglePlayback => Some(PlaybackCommand::TogglePlayback),
            _ => None,
        }
    }

    /// Whether the host should suppress the key's default action
    /// (page scroll for Space, newline for Enter).
    pub fn prevents_default(self) -> bool {
        true
    }
}

/// Stateless key → shortcut mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortcutMapper;

impl ShortcutMapper {
    pub fn map(&self, event: &KeyEvent, has_audio: bool) -> Option<Shortcut> {
        match (event.code, event.target) {
            (KeyCode::Space, FocusTarget::TextArea | FocusTarget::Button) => None,
            (KeyCode::Space, _) if has_audio => Some(Shortcut::TogglePlayback),
            (KeyCode::Enter, FocusTarget::TextArea) if event.ctrl => Some(Shortcut::SubmitArticle),
            (KeyCode::ArrowDown, FocusTarget::HistoryList) => Some(Shortcut::HistoryNext),
            (KeyCode::ArrowUp, FocusTarget::HistoryList) => Some(Shortcut::HistoryPrevious),
            (KeyCode::Enter, FocusTarget::HistoryList) => Some(Shortcut::HistorySelect),
            _ => None,
        }
    }
}
