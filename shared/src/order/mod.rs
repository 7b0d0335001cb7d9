//! Order and tab types
//!
//! - Commands: requests from the client to the backend
//! - Events: state pushed by the backend
//! - Snapshots: the authoritative state of one tab

pub mod command;
pub mod event;
pub mod snapshot;
pub mod types;

// Re-exports
pub use command::{
    AdjustTotal, EditLine, InsertOrder, LineEdit, MenuItemForm, OrderCommand, PaidItem, PayFull,
    PayItems, PayPartial, PaymentRequest, RemoveMenuItem, SetPreparation, UndoPayment, UpdateTab,
};
pub use event::{
    MenuListed, OrdersListed, ServerError, StockAlert, TabDeleted, TabEntry, TabEvent, TabsListed,
};
pub use snapshot::TabSnapshot;
pub use types::*;
