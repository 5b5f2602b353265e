//! Arena Live - Real-Time Tournament Progression Core
//!
//! This crate implements the match lifecycle, bracket progression, winner
//! determination, and admission-controlled event broadcast layer for a
//! tournament platform. Registration, payments, certificates, and organizer
//! screens are external collaborators: they call into this core through the
//! application services and consume the events it broadcasts.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
