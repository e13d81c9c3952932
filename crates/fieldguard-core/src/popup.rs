//! Popup placement metadata for validator badges
//!
//! Every validator carries a [`PopupSettings`] describing how a UI should
//! anchor its explanation popup. The target is a fresh UUID per call so no
//! two badges ever share an anchor.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event that opens the popup
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PopupEvent {
    /// Open while hovering the anchor
    #[default]
    Hover,
    /// Toggle on click
    Click,
}

/// Side of the anchor the popup appears on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Below the anchor
    #[default]
    Bottom,
    /// Above the anchor
    Top,
    /// Left of the anchor
    Left,
    /// Right of the anchor
    Right,
}

/// UI placement hint attached to a validator descriptor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PopupSettings {
    /// Trigger event
    pub event: PopupEvent,
    /// Unique anchor identifier
    pub target: String,
    /// Placement side
    pub placement: Placement,
}

/// Build hover-triggered popup settings with a fresh anchor id
pub fn make_popup() -> PopupSettings {
    PopupSettings {
        event: PopupEvent::Hover,
        target: Uuid::new_v4().to_string(),
        placement: Placement::Bottom,
    }
}

/// Build click-triggered popup settings, used by the validation legend
pub fn make_legend_popup() -> PopupSettings {
    PopupSettings {
        event: PopupEvent::Click,
        ..make_popup()
    }
}
