//! Integration and adversarial test suite for the Sigil wallet manager.
//!
//! Tests drive [`sigil_wallet::WalletManager`] against real temp
//! directories and try to make it leak, overwrite or misattribute keys.

pub mod helpers;
