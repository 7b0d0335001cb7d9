//! Price composition for order lines

use shared::models::MenuItem;
use shared::order::OrderLine;

use crate::money::{checked_sum, times_quantity, to_decimal, to_f64};
use crate::selection::Selection;

/// Base price plus the extras of every selected option
pub fn unit_price(base_price: f64, selection: &Selection) -> f64 {
    to_f64(checked_sum([
        to_decimal(base_price.max(0.0)),
        to_decimal(selection.extras_total()),
    ]))
}

/// `unit_price × quantity`; an out-of-range price gives 0 instead of panicking
pub fn line_total(unit_price: f64, quantity: u32) -> f64 {
    to_f64(times_quantity(to_decimal(unit_price), quantity))
}

/// Change a line's quantity, recomputing its total and clamping the paid units
pub fn set_quantity(line: &mut OrderLine, quantity: u32) {
    line.quantity = quantity;
    line.line_total = line_total(line.unit_price, quantity);
    if line.quantity_paid > quantity {
        line.quantity_paid = quantity;
    }
}

/// New unpaid line for `quantity` units of `item` with the given options
pub fn build_line(item: &MenuItem, selection: &Selection, quantity: u32) -> OrderLine {
    let unit = unit_price(item.base_price, selection);
    OrderLine {
        id: item.id.clone(),
        name: item.name.clone(),
        quantity,
        quantity_paid: 0,
        unit_price: unit,
        line_total: line_total(unit, quantity),
        note: String::new(),
        customer: String::new(),
        options: selection.selected_groups(),
        printed: false,
        category: Some(item.category),
        status: None,
        delivery_time: None,
    }
}
