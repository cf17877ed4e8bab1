//! Unit tests for the exception mailer
//!
//! This module contains tests for notifier behavior and the relay
//! transport.
