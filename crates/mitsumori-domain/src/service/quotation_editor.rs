//! Quotation panel state machine
//!
//! A panel is either viewing its committed `QuotationResult` or editing a
//! list of `EditableLineItem`s derived from it. The total is always computed
//! from the current items and never stored.
//!
//! ```text
//! Viewing --start_edit--> Editing
//! Editing --cancel_edit--> Viewing   (edits discarded)
//! Editing --save_edit----> Viewing   (new result committed)
//! any     --receive------> Viewing   (new result wins, edits discarded)
//! ```

use mitsumori_types::{LineItem, QuotationResult};
use thiserror::Error;

use crate::model::{EditTotal, EditableLineItem};
use crate::service::man_yen::format_cost_range;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    #[error("Panel is not in edit mode")]
    NotEditing,

    #[error("No quotation has been received yet")]
    NoQuotation,

    #[error("Line item {index} does not exist ({len} items)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Line item {index}: amount {value} is not a non-negative number")]
    InvalidAmount { index: usize, value: f64 },

    #[error("Line item {index}: minimum {min} exceeds maximum {max}")]
    ReversedRange { index: usize, min: f64, max: f64 },
}

fn check_amount(index: usize, value: f64) -> Result<f64, EditorError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(EditorError::InvalidAmount { index, value })
    }
}

/// In-progress edits of one quotation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditSession {
    items: Vec<EditableLineItem>,
}

impl EditSession {
    pub fn from_result(result: &QuotationResult) -> Self {
        Self {
            items: result
                .items
                .iter()
                .map(EditableLineItem::from_line_item)
                .collect(),
        }
    }

    pub fn items(&self) -> &[EditableLineItem] {
        &self.items
    }

    pub fn total(&self) -> EditTotal {
        EditTotal::of(&self.items)
    }

    fn item_mut(&mut self, index: usize) -> Result<&mut EditableLineItem, EditorError> {
        let len = self.items.len();
        self.items
            .get_mut(index)
            .ok_or(EditorError::IndexOutOfRange { index, len })
    }

    pub fn set_name(&mut self, index: usize, name: impl Into<String>) -> Result<(), EditorError> {
        self.item_mut(index)?.name = name.into();
        Ok(())
    }

    /// Set the minimum in man-yen. The order against the maximum is only
    /// checked on save.
    pub fn set_cost_min(&mut self, index: usize, cost_min: f64) -> Result<(), EditorError> {
        let cost_min = check_amount(index, cost_min)?;
        self.item_mut(index)?.cost_min = cost_min;
        Ok(())
    }

    /// Set the maximum in man-yen
    pub fn set_cost_max(&mut self, index: usize, cost_max: f64) -> Result<(), EditorError> {
        let cost_max = check_amount(index, cost_max)?;
        self.item_mut(index)?.cost_max = cost_max;
        Ok(())
    }

    /// First item whose minimum exceeds its maximum
    pub fn validate(&self) -> Result<(), EditorError> {
        match self
            .items
            .iter()
            .enumerate()
            .find(|(_, item)| item.cost_min > item.cost_max)
        {
            Some((index, item)) => Err(EditorError::ReversedRange {
                index,
                min: item.cost_min,
                max: item.cost_max,
            }),
            None => Ok(()),
        }
    }

    /// Append a placeholder item and return its index
    pub fn add_item(&mut self) -> usize {
        self.items.push(EditableLineItem::placeholder());
        self.items.len() - 1
    }

    pub fn remove_item(&mut self, index: usize) -> Result<EditableLineItem, EditorError> {
        let len = self.items.len();
        if index >= len {
            return Err(EditorError::IndexOutOfRange { index, len });
        }
        Ok(self.items.remove(index))
    }

    /// Serialize back to the string-based form.
    pub fn to_result(&self, notes: &str) -> QuotationResult {
        let items: Vec<LineItem> = self.items.iter().map(EditableLineItem::to_line_item).collect();
        QuotationResult {
            items,
            total_cost_range: format_cost_range(self.total().cost_range_yen()),
            notes: notes.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum PanelState {
    #[default]
    Viewing,
    Editing(EditSession),
}

/// One quotation panel: owns its committed result and any edit session
#[derive(Debug, Clone, Default)]
pub struct QuotationPanel {
    committed: Option<QuotationResult>,
    state: PanelState,
}

impl QuotationPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result(result: QuotationResult) -> Self {
        Self {
            committed: Some(result),
            state: PanelState::Viewing,
        }
    }

    /// Accept a freshly generated quotation, discarding any edit in progress.
    pub fn receive(&mut self, result: QuotationResult) {
        if self.is_editing() {
            tracing::debug!("new quotation arrived during edit; discarding edits");
        }
        self.committed = Some(result);
        self.state = PanelState::Viewing;
    }

    pub fn committed(&self) -> Option<&QuotationResult> {
        self.committed.as_ref()
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, PanelState::Editing(_))
    }

    /// Enter edit mode with items derived fresh from the committed result.
    pub fn start_edit(&mut self) -> Result<&mut EditSession, EditorError> {
        let committed = self.committed.as_ref().ok_or(EditorError::NoQuotation)?;
        self.state = PanelState::Editing(EditSession::from_result(committed));
        self.session_mut()
    }

    pub fn session(&self) -> Result<&EditSession, EditorError> {
        match &self.state {
            PanelState::Editing(session) => Ok(session),
            PanelState::Viewing => Err(EditorError::NotEditing),
        }
    }

    pub fn session_mut(&mut self) -> Result<&mut EditSession, EditorError> {
        match &mut self.state {
            PanelState::Editing(session) => Ok(session),
            PanelState::Viewing => Err(EditorError::NotEditing),
        }
    }

    /// Drop the edit session. Viewing panels are left untouched.
    pub fn cancel_edit(&mut self) {
        self.state = PanelState::Viewing;
    }

    /// Commit the edit session as the new result and return to viewing.
    ///
    /// A session with a reversed item stays open and nothing is committed.
    pub fn save_edit(&mut self) -> Result<&QuotationResult, EditorError> {
        let notes = self
            .committed
            .as_ref()
            .map(|r| r.notes.clone())
            .unwrap_or_default();
        let session = self.session()?;
        session.validate()?;
        let result = session.to_result(&notes);
        self.state = PanelState::Viewing;
        Ok(self.committed.insert(result))
    }
}
