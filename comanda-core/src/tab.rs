//! Local state of one open tab
//!
//! The backend owns the tab: every snapshot it pushes replaces what is held
//! here. Local changes are limited to edit mode (quantity nudges that are
//! pushed back as one `UpdateTab`) and the per-line correction form.

use shared::order::{
    AdjustTotal, EditLine, LineEdit, OrderLine, TabSnapshot, UndoPayment, UpdateTab,
};
use shared::util::{is_hhmm, parse_number_text};

use crate::error::{CoreError, CoreResult};
use crate::payment::line_key;
use crate::pricing;

/// Customer name the backend uses for lines nobody claimed
pub const UNNAMED_CUSTOMER: &str = "-1";

#[derive(Debug, Clone, PartialEq)]
struct EditSession {
    backup: Vec<OrderLine>,
    /// Keys of changed lines, each once, in first-change order
    altered: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabState {
    snapshot: TabSnapshot,
    /// Payment round whose lines are shown (0 = current)
    round: u32,
    edit: Option<EditSession>,
}

impl TabState {
    pub fn new(tab_id: impl Into<String>) -> Self {
        Self {
            snapshot: TabSnapshot::empty(tab_id),
            round: 0,
            edit: None,
        }
    }

    pub fn from_snapshot(snapshot: TabSnapshot) -> Self {
        Self {
            snapshot,
            round: 0,
            edit: None,
        }
    }

    pub fn tab_id(&self) -> &str {
        &self.snapshot.tab_id
    }

    pub fn snapshot(&self) -> &TabSnapshot {
        &self.snapshot
    }

    pub fn all_lines(&self) -> &[OrderLine] {
        &self.snapshot.lines
    }

    pub fn amount_due(&self) -> f64 {
        self.snapshot.amount_due
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Replace local state with the backend's; snapshots of other tabs are
    /// ignored. Returns whether the snapshot was applied.
    ///
    /// An open edit session is dropped: the backend state wins.
    pub fn apply_snapshot(&mut self, snapshot: TabSnapshot) -> bool {
        if snapshot.tab_id != self.snapshot.tab_id {
            return false;
        }
        if self.edit.take().is_some() {
            tracing::debug!(tab = %snapshot.tab_id, "Snapshot arrived during edit, local edits dropped");
        }
        self.snapshot = snapshot;
        self.round = 0;
        true
    }

    /// Clear everything if `tab_id` is this tab. Returns whether it was.
    pub fn apply_deleted(&mut self, tab_id: &str) -> bool {
        if tab_id != self.snapshot.tab_id {
            return false;
        }
        tracing::debug!(tab = %tab_id, "Tab deleted");
        self.snapshot = TabSnapshot::empty(tab_id);
        self.round = 0;
        self.edit = None;
        true
    }

    /// Show the lines of a past payment round as returned by the backend
    pub fn apply_round(&mut self, round: u32, lines: Vec<OrderLine>, amount_due: f64) {
        self.round = round;
        self.snapshot.lines = lines;
        self.snapshot.amount_due = amount_due;
        self.edit = None;
    }

    /// Revert the payments of the round being shown; the view goes back to
    /// the current round.
    pub fn undo_payment(&mut self) -> UndoPayment {
        let command = UndoPayment {
            comanda: self.snapshot.tab_id.clone(),
            preco: self.snapshot.amount_due,
            ordem: self.round,
        };
        self.round = 0;
        command
    }

    /// Discount or other manual change of the total
    pub fn adjust_total(&self, amount: &str, kind: &str) -> CoreResult<AdjustTotal> {
        let value = parse_number_text(amount)
            .filter(|v| *v >= 0.0)
            .ok_or_else(|| CoreError::invalid_field("valor", "must be a non-negative number"))?;
        Ok(AdjustTotal {
            valor: value.to_string(),
            categoria: kind.to_string(),
            comanda: self.snapshot.tab_id.clone(),
        })
    }

    /// Lines of one customer with their index in the tab.
    ///
    /// Use [`UNNAMED_CUSTOMER`] for lines without a customer.
    pub fn filter_by_customer<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = (usize, &'a OrderLine)> + 'a {
        self.snapshot
            .lines
            .iter()
            .enumerate()
            .filter(move |(_, line)| line.customer == name)
    }

    // ========== Edit mode ==========

    pub fn is_editing(&self) -> bool {
        self.edit.is_some()
    }

    pub fn begin_edit(&mut self) {
        if self.edit.is_none() {
            self.edit = Some(EditSession {
                backup: self.snapshot.lines.clone(),
                altered: Vec::new(),
            });
        }
    }

    fn nudge(&mut self, index: usize, up: bool) -> CoreResult<u32> {
        let Some(edit) = self.edit.as_mut() else {
            return Err(CoreError::InvalidTransition(
                "quantity edits need edit mode".to_string(),
            ));
        };
        let line = self
            .snapshot
            .lines
            .get_mut(index)
            .ok_or_else(|| CoreError::LineNotFound(format!("#{index}")))?;

        let quantity = if up {
            line.quantity.saturating_add(1)
        } else if line.quantity == 0 {
            return Ok(0);
        } else {
            line.quantity - 1
        };
        pricing::set_quantity(line, quantity);

        let key = line_key(line, index);
        if !edit.altered.contains(&key) {
            edit.altered.push(key);
        }
        Ok(quantity)
    }

    /// One more unit of the line, unit price kept
    pub fn increment(&mut self, index: usize) -> CoreResult<u32> {
        self.nudge(index, true)
    }

    /// One less unit, never below 0
    pub fn decrement(&mut self, index: usize) -> CoreResult<u32> {
        self.nudge(index, false)
    }

    /// Restore the lines as they were when edit mode began
    pub fn cancel_edit(&mut self) {
        if let Some(edit) = self.edit.take() {
            self.snapshot.lines = edit.backup;
        }
    }

    /// Leave edit mode; `None` when nothing changed.
    pub fn commit_edit(&mut self, username: Option<String>) -> CoreResult<Option<UpdateTab>> {
        let edit = self.edit.take().ok_or_else(|| {
            CoreError::InvalidTransition("commit without edit mode".to_string())
        })?;
        if edit.altered.is_empty() {
            return Ok(None);
        }
        let itens_alterados = self
            .snapshot
            .lines
            .iter()
            .enumerate()
            .filter(|(index, line)| edit.altered.contains(&line_key(line, *index)))
            .map(|(_, line)| line.clone())
            .collect();
        Ok(Some(UpdateTab {
            itens_alterados,
            comanda: self.snapshot.tab_id.clone(),
            username,
        }))
    }
}

// ============================================================================
// Line correction form
// ============================================================================

/// Operator-typed correction of one line, kept as text until validated
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineForm {
    pub id: Option<String>,
    pub tab_id: Option<String>,
    pub quantity: String,
    pub quantity_paid: String,
    pub unit_price: String,
    pub line_total: String,
    pub note: String,
    pub options: Vec<shared::models::OptionGroup>,
    pub delivery_time: String,
}

fn parse_count(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok()
}

impl LineForm {
    pub fn from_line(line: &OrderLine, tab_id: Option<&str>) -> Self {
        Self {
            id: (!line.id.is_empty()).then(|| line.id.clone()),
            tab_id: tab_id.map(str::to_string),
            quantity: line.quantity.to_string(),
            quantity_paid: line.quantity_paid.to_string(),
            unit_price: line.unit_price.to_string(),
            line_total: line.line_total.to_string(),
            note: line.note.clone(),
            options: line.options.clone(),
            delivery_time: line.delivery_time.clone().unwrap_or_default(),
        }
    }

    fn typed_quantity(&self) -> u32 {
        parse_count(&self.quantity)
            .map(|q| q.clamp(0, u32::MAX as i64) as u32)
            .unwrap_or(0)
    }

    fn recompute_total(&mut self) {
        let unit = parse_number_text(&self.unit_price).unwrap_or(0.0);
        self.line_total = format!("{:.2}", pricing::line_total(unit, self.typed_quantity()));
    }

    /// New quantity text; the total follows and paid units are clamped.
    pub fn set_quantity(&mut self, text: &str) {
        self.quantity = text.to_string();
        let quantity = self.typed_quantity();
        self.recompute_total();
        let paid = parse_count(&self.quantity_paid)
            .map(|p| p.clamp(0, quantity as i64))
            .unwrap_or(0);
        self.quantity_paid = paid.to_string();
    }

    /// New unit price text; the total follows.
    pub fn set_unit_price(&mut self, text: &str) {
        self.unit_price = text.to_string();
        self.recompute_total();
    }

    /// Check every field and build the correction command.
    pub fn validate(&self, operator: Option<String>) -> CoreResult<EditLine> {
        let quantity = parse_count(&self.quantity)
            .filter(|q| *q >= 0)
            .ok_or_else(|| CoreError::invalid_field("quantidade", "whole number expected"))?;
        let quantity_paid = parse_count(&self.quantity_paid)
            .filter(|q| *q >= 0)
            .ok_or_else(|| CoreError::invalid_field("quantidade_paga", "whole number expected"))?;
        if quantity_paid > quantity {
            return Err(CoreError::invalid_field(
                "quantidade_paga",
                "cannot exceed the quantity",
            ));
        }
        let unit_price = parse_number_text(&self.unit_price)
            .filter(|v| *v >= 0.0)
            .ok_or_else(|| CoreError::invalid_field("preco_unitario", "invalid price"))?;
        let line_total = parse_number_text(&self.line_total)
            .filter(|v| *v >= 0.0)
            .ok_or_else(|| CoreError::invalid_field("preco", "invalid price"))?;
        let delivery_time = self.delivery_time.trim();
        if !delivery_time.is_empty() && !is_hhmm(delivery_time) {
            return Err(CoreError::invalid_field(
                "horario_para_entrega",
                "expected HH:MM",
            ));
        }

        let to_u32 = |v: i64| v.min(u32::MAX as i64) as u32;
        Ok(EditLine {
            pedido_alterado: LineEdit {
                id: self.id.clone(),
                comanda: self.tab_id.clone(),
                quantidade: to_u32(quantity),
                quantidade_paga: to_u32(quantity_paid),
                preco_unitario: unit_price,
                preco: line_total,
                extra: self.note.clone(),
                opcoes: self.options.clone(),
                horario_para_entrega: delivery_time.to_string(),
            },
            usuario: operator,
        })
    }
}
