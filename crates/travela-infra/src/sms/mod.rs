//! SMS gateway clients.

pub mod africastalking;
