//! Order entry: lines collected by a waiter before they are sent to a tab

use shared::models::{MenuItem, OptionGroup};
use shared::order::InsertOrder;

use crate::error::{CoreError, CoreResult};
use crate::pricing;
use crate::selection::Selection;

/// One pending line
#[derive(Debug, Clone, PartialEq)]
pub struct DraftLine {
    pub item: String,
    pub quantity: u32,
    pub note: String,
    pub customer: String,
    pub options: Vec<OptionGroup>,
    pub unit_price: f64,
}

impl DraftLine {
    pub fn line_total(&self) -> f64 {
        pricing::line_total(self.unit_price, self.quantity)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderDraft {
    lines: Vec<DraftLine>,
}

impl OrderDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[DraftLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Queue `quantity` units of `item` with the chosen options. Returns the
    /// index of the new line.
    pub fn add(
        &mut self,
        item: &MenuItem,
        selection: &Selection,
        quantity: u32,
        note: impl Into<String>,
        customer: impl Into<String>,
    ) -> usize {
        self.lines.push(DraftLine {
            item: item.name.clone(),
            quantity,
            note: note.into(),
            customer: customer.into(),
            options: selection.selected_groups(),
            unit_price: pricing::unit_price(item.base_price, selection),
        });
        self.lines.len() - 1
    }

    pub fn increment(&mut self, index: usize) -> CoreResult<u32> {
        let line = self.line_mut(index)?;
        line.quantity = line.quantity.saturating_add(1);
        Ok(line.quantity)
    }

    /// Never below 0; a zero line stays listed until the draft is sent
    pub fn decrement(&mut self, index: usize) -> CoreResult<u32> {
        let line = self.line_mut(index)?;
        line.quantity = line.quantity.saturating_sub(1);
        Ok(line.quantity)
    }

    pub fn remove(&mut self, index: usize) -> CoreResult<DraftLine> {
        self.line_mut(index)?;
        Ok(self.lines.remove(index))
    }

    fn line_mut(&mut self, index: usize) -> CoreResult<&mut DraftLine> {
        self.lines
            .get_mut(index)
            .ok_or_else(|| CoreError::LineNotFound(format!("draft #{index}")))
    }

    pub fn total(&self) -> f64 {
        let total = crate::money::checked_sum(
            self.lines
                .iter()
                .map(|l| crate::money::to_decimal(l.line_total())),
        );
        crate::money::to_f64(total)
    }

    /// Build the insert command; zero-quantity lines are dropped.
    pub fn into_command(
        self,
        tab_id: &str,
        operator: impl Into<String>,
        time: impl Into<String>,
    ) -> CoreResult<InsertOrder> {
        let tab_id = tab_id.trim();
        if tab_id.is_empty() {
            return Err(CoreError::TabRequired);
        }
        let lines: Vec<DraftLine> = self.lines.into_iter().filter(|l| l.quantity > 0).collect();
        if lines.is_empty() {
            return Err(CoreError::EmptyOrder);
        }

        let mut command = InsertOrder {
            comanda: tab_id.to_string(),
            horario: time.into(),
            username: operator.into(),
            ..InsertOrder::default()
        };
        for line in lines {
            command.pedidos_selecionados.push(line.item);
            command.quantidade_selecionada.push(line.quantity);
            command.extra_selecionados.push(line.note);
            command.nome_selecionado.push(line.customer);
            command.opcoes_selecionadas.push(line.options);
        }
        tracing::debug!(tab = %command.comanda, lines = command.len(), "Order draft sent");
        Ok(command)
    }
}

/// A single complimentary unit of `item`, added to the tab without charge
pub fn complimentary(
    tab_id: &str,
    item: &str,
    operator: impl Into<String>,
    time: impl Into<String>,
) -> CoreResult<InsertOrder> {
    let item = item.trim();
    if item.is_empty() {
        return Err(CoreError::EmptyOrder);
    }
    if tab_id.trim().is_empty() {
        return Err(CoreError::TabRequired);
    }
    Ok(InsertOrder {
        comanda: tab_id.trim().to_string(),
        pedidos_selecionados: vec![item.to_string()],
        quantidade_selecionada: vec![1],
        extra_selecionados: vec![String::new()],
        nome_selecionado: vec![String::new()],
        opcoes_selecionadas: vec![Vec::new()],
        horario: time.into(),
        username: operator.into(),
        complimentary: true,
    })
}
