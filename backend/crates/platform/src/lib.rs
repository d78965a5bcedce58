//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no domain knowledge:
//! - Cryptographic utilities (SHA-256, Base64, constant-time compare)
//! - Client IP extraction
//! - Password hashing (Argon2id)
//! - Rate limiting store and middleware
//! - Upload type sniffing
//! - CSV export writer
//! - Outbound email (SendGrid)
//! - Payment webhook signature verification

pub mod client;
pub mod crypto;
pub mod csv;
pub mod mailer;
pub mod password;
pub mod rate_limit;
pub mod upload;
pub mod webhook;
