//! Bank-specific row and line layouts.

pub mod cmb_credit;
