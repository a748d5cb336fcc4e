//! Quantum Key Distribution (QKD) Protocols.
//!
//! - **BB84**: prepare-and-measure key exchange in two conjugate bases, with
//!   Pauli channel noise and an optional intercept-resend eavesdropper.

pub mod bb84;
