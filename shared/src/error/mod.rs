//! Error system shared by every crate
//!
//! Each failure carries an [`ErrorCode`]. The code decides the
//! [`ErrorCategory`] (by range), the [`Surface`] it is shown on and the HTTP
//! status the backend uses for it.
//!
//! ```
//! use shared::error::{AppError, ErrorCode, Surface};
//!
//! let err = AppError::with_message(ErrorCode::PaymentAmountOutOfRange, "Amount above due")
//!     .with_detail("max", 87.5);
//! assert_eq!(err.surface(), Surface::Blocking);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::{ErrorCategory, Surface};
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
