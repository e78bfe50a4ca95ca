//! Intake payload types, one per processing domain.
//!
//! Content is opaque to the pipeline - these exist so the HTTP layer can
//! validate request bodies and the simulated processors have something to
//! log.

use serde::Deserialize;

/// An order to be processed in the background.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    pub amount: f64,
}

/// A catalog item submitted for processing.
#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    pub price: f64,
}

/// A payment to be settled in the background.
#[derive(Debug, Clone, Deserialize)]
pub struct Payment {
    pub amount: f64,
}

/// A user registration to be provisioned in the background.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub email: String,
}
