//! Order composition and payment rules
//!
//! Pure state and calculations for the comanda client; nothing here does I/O.
//! Every operation either returns the command to send or a [`CoreError`]
//! describing why it was refused.
//!
//! - [`options`]: normalize stored option payloads into groups
//! - [`selection`]: pick options within each group's limit
//! - [`pricing`]: unit price and line totals
//! - [`payment`]: itemized, partial and full payments
//! - [`tab`]: local view of a tab, edit mode and line corrections
//! - [`draft`]: lines collected before they are sent to a tab
//! - [`directory`]: open and closed tabs with a prefix filter
//! - [`stock`], [`kitchen`], [`search`]

pub mod directory;
pub mod draft;
pub mod error;
pub mod kitchen;
pub mod money;
pub mod options;
pub mod payment;
pub mod pricing;
pub mod search;
pub mod selection;
pub mod stock;
pub mod tab;

pub use directory::{TAB_LIST_TIMEOUT, TabDirectory};
pub use draft::{DraftLine, OrderDraft};
pub use error::{CoreError, CoreResult};
pub use kitchen::{KitchenBoard, PreparationStatus};
pub use options::RawOptions;
pub use payment::{FlowState, PaymentAmounts, PaymentFlow, PaymentSelection};
pub use selection::{Selection, ToggleOutcome};
pub use stock::StockVerdict;
pub use tab::{LineForm, TabState};
