//! Payment splitting
//!
//! A tab can be settled three ways, one per confirmation:
//!
//! - **itemized**: a per-line quantity, bounded by the line's unpaid units
//! - **partial**: a free amount, `0 < amount <= amount_due`
//! - **full**: everything still due
//!
//! The base amount of each mode may get the 10% service surcharge and a
//! gratuity on top. [`PaymentFlow`] drives the modal from mode choice to the
//! [`PaymentRequest`] handed to the transport.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use shared::order::{OrderLine, PaidItem, PaymentMethod, PaymentMode, PaymentRequest};

use crate::error::{CoreError, CoreResult};
use crate::money::{
    SURCHARGE_RATE, checked_sum, parse_money, round_money, times_quantity, to_decimal, to_f64,
};


/// Stable identity of a line inside one tab snapshot
pub fn line_key(line: &OrderLine, index: usize) -> String {
    format!("{}|{}|{}|{}", line.id, line.name, line.note, index)
}

// ============================================================================
// Itemized selection
// ============================================================================

/// Units chosen per line for an itemized payment
///
/// Holds the lines it was built from; quantities always stay within
/// `0..=remaining` of their line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentSelection {
    lines: Vec<OrderLine>,
    quantities: BTreeMap<String, u32>,
}

impl PaymentSelection {
    pub fn new(lines: Vec<OrderLine>) -> Self {
        Self {
            lines,
            quantities: BTreeMap::new(),
        }
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    fn line(&self, index: usize) -> CoreResult<&OrderLine> {
        self.lines
            .get(index)
            .ok_or_else(|| CoreError::LineNotFound(format!("#{index}")))
    }

    /// Units selected for the line at `index`
    pub fn quantity(&self, index: usize) -> u32 {
        self.lines
            .get(index)
            .and_then(|line| self.quantities.get(&line_key(line, index)))
            .copied()
            .unwrap_or(0)
    }

    /// Select exactly `quantity` units; more than the unpaid units is rejected.
    pub fn set(&mut self, index: usize, quantity: u32) -> CoreResult<()> {
        let line = self.line(index)?;
        let remaining = line.remaining();
        if quantity > remaining {
            return Err(CoreError::QuantityAboveRemaining {
                requested: quantity,
                remaining,
            });
        }
        let key = line_key(line, index);
        self.store(key, quantity);
        Ok(())
    }

    /// One more unit, saturating at the unpaid units. Returns the new quantity.
    pub fn increment(&mut self, index: usize) -> CoreResult<u32> {
        let remaining = self.line(index)?.remaining();
        let next = (self.quantity(index) + 1).min(remaining);
        self.set(index, next)?;
        Ok(next)
    }

    /// One less unit, saturating at 0. Returns the new quantity.
    pub fn decrement(&mut self, index: usize) -> CoreResult<u32> {
        self.line(index)?;
        let next = self.quantity(index).saturating_sub(1);
        self.set(index, next)?;
        Ok(next)
    }

    /// Select every unpaid unit of every line
    pub fn select_all(&mut self) {
        for (index, line) in self.lines.iter().enumerate() {
            let key = line_key(line, index);
            let remaining = line.remaining();
            if remaining > 0 {
                self.quantities.insert(key, remaining);
            }
        }
    }

    fn store(&mut self, key: String, quantity: u32) {
        if quantity == 0 {
            self.quantities.remove(&key);
        } else {
            self.quantities.insert(key, quantity);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    pub fn clear(&mut self) {
        self.quantities.clear();
    }

    /// Σ selected units × unit price
    pub fn subtotal(&self) -> Decimal {
        checked_sum(
            self.lines
                .iter()
                .enumerate()
                .map(|(index, line)| times_quantity(to_decimal(line.unit_price), self.quantity(index))),
        )
    }

    /// Lines with a positive selected quantity, in tab order
    pub fn paid_items(&self) -> Vec<PaidItem> {
        self.lines
            .iter()
            .enumerate()
            .filter_map(|(index, line)| {
                let quantidade = self.quantity(index);
                (quantidade > 0).then(|| PaidItem {
                    index,
                    id: (!line.id.is_empty()).then(|| line.id.clone()),
                    pedido: line.name.clone(),
                    extra: line.note.clone(),
                    quantidade,
                })
            })
            .collect()
    }
}

// ============================================================================
// Amounts
// ============================================================================

/// Base plus optional surcharge and gratuity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentAmounts {
    pub base: Decimal,
    pub surcharge: Option<Decimal>,
    pub gratuity: Option<Decimal>,
    pub total: Decimal,
}

impl PaymentAmounts {
    /// The gratuity only counts when positive.
    pub fn compute(base: Decimal, apply_surcharge: bool, gratuity: Decimal) -> Self {
        let base = round_money(base);
        let surcharge = apply_surcharge.then(|| round_money(base * SURCHARGE_RATE));
        let gratuity = (gratuity > Decimal::ZERO).then(|| round_money(gratuity));
        let total = checked_sum([
            base,
            surcharge.unwrap_or_default(),
            gratuity.unwrap_or_default(),
        ]);
        Self {
            base,
            surcharge,
            gratuity,
            total,
        }
    }
}

// ============================================================================
// Flow
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    AwaitingMethodAndExtras(PaymentMode),
    /// Request emitted, waiting for the caller to hand it off
    Confirmed(PaymentMode),
}

/// Payment modal state
///
/// `Idle -> AwaitingMethodAndExtras -> Confirmed -> Idle`; `cancel` goes back
/// to `Idle` from the awaiting state and drops everything picked so far.
#[derive(Debug, Clone)]
pub struct PaymentFlow {
    tab_id: String,
    amount_due: Decimal,
    state: FlowState,
    method: Option<PaymentMethod>,
    apply_surcharge: bool,
    gratuity: Decimal,
    partial_amount: Decimal,
    selection: PaymentSelection,
    /// Latest snapshot received while the modal was open
    pending: Option<(Vec<OrderLine>, Decimal)>,
}

impl PaymentFlow {
    pub fn new(tab_id: impl Into<String>, lines: Vec<OrderLine>, amount_due: f64) -> Self {
        Self {
            tab_id: tab_id.into(),
            amount_due: to_decimal(amount_due.max(0.0)),
            state: FlowState::Idle,
            method: None,
            apply_surcharge: false,
            gratuity: Decimal::ZERO,
            partial_amount: Decimal::ZERO,
            selection: PaymentSelection::new(lines),
            pending: None,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn tab_id(&self) -> &str {
        &self.tab_id
    }

    pub fn amount_due(&self) -> f64 {
        to_f64(self.amount_due)
    }

    /// Replace the lines and amount due with a fresh snapshot.
    ///
    /// An open modal keeps the lines it was opened on; the newest snapshot is
    /// held and applied as soon as the flow is back to idle.
    pub fn refresh(&mut self, lines: Vec<OrderLine>, amount_due: f64) {
        let amount_due = to_decimal(amount_due.max(0.0));
        if self.state != FlowState::Idle {
            tracing::debug!(tab = %self.tab_id, "Payment modal open, snapshot deferred");
            self.pending = Some((lines, amount_due));
            return;
        }
        self.amount_due = amount_due;
        self.selection = PaymentSelection::new(lines);
    }

    pub fn choose_mode(&mut self, mode: PaymentMode) -> CoreResult<()> {
        if self.state != FlowState::Idle {
            return Err(self.invalid("choose a mode"));
        }
        tracing::debug!(tab = %self.tab_id, ?mode, "Payment mode chosen");
        self.state = FlowState::AwaitingMethodAndExtras(mode);
        Ok(())
    }

    fn awaiting(&self, action: &str) -> CoreResult<PaymentMode> {
        match self.state {
            FlowState::AwaitingMethodAndExtras(mode) => Ok(mode),
            _ => Err(self.invalid(action)),
        }
    }

    fn invalid(&self, action: &str) -> CoreError {
        CoreError::InvalidTransition(format!("cannot {action} while {:?}", self.state))
    }

    pub fn set_method(&mut self, method: PaymentMethod) -> CoreResult<()> {
        self.awaiting("set the method")?;
        self.method = Some(method);
        Ok(())
    }

    pub fn set_surcharge(&mut self, apply: bool) -> CoreResult<()> {
        self.awaiting("toggle the surcharge")?;
        self.apply_surcharge = apply;
        Ok(())
    }

    /// Gratuity as typed by the operator; invalid text counts as none
    pub fn set_gratuity(&mut self, text: &str) -> CoreResult<()> {
        self.awaiting("set the gratuity")?;
        self.gratuity = parse_money(text);
        Ok(())
    }

    /// Amount of a partial payment as typed by the operator
    pub fn set_partial_amount(&mut self, text: &str) -> CoreResult<()> {
        match self.awaiting("set the amount")? {
            PaymentMode::Partial => {
                self.partial_amount = parse_money(text);
                Ok(())
            }
            _ => Err(self.invalid("set an amount outside partial mode")),
        }
    }

    /// Itemized selection, editable only in itemized mode
    pub fn selection_mut(&mut self) -> CoreResult<&mut PaymentSelection> {
        match self.awaiting("edit the selection")? {
            PaymentMode::Itemized => Ok(&mut self.selection),
            _ => Err(self.invalid("edit the selection outside itemized mode")),
        }
    }

    pub fn selection(&self) -> &PaymentSelection {
        &self.selection
    }

    fn base(&self, mode: PaymentMode) -> Decimal {
        match mode {
            PaymentMode::Itemized => self.selection.subtotal(),
            PaymentMode::Partial => self.partial_amount,
            PaymentMode::Full => self.amount_due,
        }
    }

    /// Amounts as they would be confirmed now
    pub fn preview(&self) -> Option<PaymentAmounts> {
        let mode = self.awaiting("preview").ok()?;
        Some(PaymentAmounts::compute(
            self.base(mode),
            self.apply_surcharge,
            self.gratuity,
        ))
    }

    fn validate(&self, mode: PaymentMode) -> CoreResult<()> {
        if self.method.is_none() {
            return Err(CoreError::MethodRequired);
        }
        let base = self.base(mode);
        match mode {
            PaymentMode::Itemized if base <= Decimal::ZERO => Err(CoreError::NothingSelected),
            PaymentMode::Partial if base <= Decimal::ZERO || base > self.amount_due => {
                Err(CoreError::AmountOutOfRange {
                    amount: to_f64(base),
                    max: to_f64(self.amount_due),
                })
            }
            PaymentMode::Full if base <= Decimal::ZERO => Err(CoreError::NothingDue),
            _ => Ok(()),
        }
    }

    /// Validate and build the request; the flow moves to `Confirmed`.
    ///
    /// On a validation error the flow stays where it was.
    pub fn confirm(&mut self) -> CoreResult<PaymentRequest> {
        let mode = self.awaiting("confirm")?;
        self.validate(mode)?;
        let method = self.method.ok_or(CoreError::MethodRequired)?;

        let amounts = PaymentAmounts::compute(self.base(mode), self.apply_surcharge, self.gratuity);
        let items = match mode {
            PaymentMode::Itemized => self.selection.paid_items(),
            _ => Vec::new(),
        };
        let request = PaymentRequest {
            tab_id: self.tab_id.clone(),
            mode,
            method,
            base: to_f64(amounts.base),
            apply_surcharge: self.apply_surcharge,
            surcharge: amounts.surcharge.map(to_f64),
            gratuity: amounts.gratuity.map(to_f64),
            total: to_f64(amounts.total),
            items,
        };
        tracing::debug!(tab = %self.tab_id, ?mode, total = request.total, "Payment confirmed");
        self.state = FlowState::Confirmed(mode);
        Ok(request)
    }

    /// Return to `Idle` once the confirmed request was handed off, whether
    /// or not the transport accepted it.
    pub fn finish(&mut self) {
        if matches!(self.state, FlowState::Confirmed(_)) {
            self.reset();
        }
    }

    pub fn cancel(&mut self) -> CoreResult<()> {
        self.awaiting("cancel")?;
        tracing::debug!(tab = %self.tab_id, "Payment cancelled");
        self.reset();
        Ok(())
    }

    fn reset(&mut self) {
        self.state = FlowState::Idle;
        self.method = None;
        self.apply_surcharge = false;
        self.gratuity = Decimal::ZERO;
        self.partial_amount = Decimal::ZERO;
        match self.pending.take() {
            Some((lines, amount_due)) => {
                self.amount_due = amount_due;
                self.selection = PaymentSelection::new(lines);
            }
            None => self.selection.clear(),
        }
    }
}
