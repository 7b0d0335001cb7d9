//! Menu data models

pub mod menu;
pub mod option;

pub use menu::*;
pub use option::*;
