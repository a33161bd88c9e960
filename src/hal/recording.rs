//! In-memory transport
//!
//! Records every bus transaction instead of driving hardware. Used by the
//! test suite and by `oled-trace` to show exactly what a panel would see.

use alloc::vec::Vec;

use embedded_hal::delay::DelayNs;
use thiserror::Error;

use super::Interface;

/// One bus transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Commands(Vec<u8>),
    Data(Vec<u8>),
    Release,
}

/// Failure injected by [`RecordingInterface::fail_after`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("injected transport failure after {0} transactions")]
pub struct InjectedFailure(pub usize);

/// Transport that records instead of transmitting
#[derive(Debug, Default)]
pub struct RecordingInterface {
    log: Vec<Transaction>,
    fail_after: Option<usize>,
}

impl RecordingInterface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every transaction once `count` more have succeeded
    pub fn fail_after(&mut self, count: usize) {
        self.fail_after = Some(self.log.len() + count);
    }

    /// Stop injecting failures
    pub fn heal(&mut self) {
        self.fail_after = None;
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.log
    }

    /// Drain the log
    pub fn take_transactions(&mut self) -> Vec<Transaction> {
        core::mem::take(&mut self.log)
    }

    /// All command bytes in order, flattened
    pub fn command_bytes(&self) -> Vec<u8> {
        self.log
            .iter()
            .filter_map(|t| match t {
                Transaction::Commands(bytes) => Some(bytes.as_slice()),
                _ => None,
            })
            .flatten()
            .copied()
            .collect()
    }

    /// Data blocks in order
    pub fn data_blocks(&self) -> Vec<&[u8]> {
        self.log
            .iter()
            .filter_map(|t| match t {
                Transaction::Data(bytes) => Some(bytes.as_slice()),
                _ => None,
            })
            .collect()
    }

    pub fn is_released(&self) -> bool {
        self.log.last() == Some(&Transaction::Release)
    }

    fn record(&mut self, transaction: Transaction) -> Result<(), InjectedFailure> {
        if let Some(limit) = self.fail_after {
            if self.log.len() >= limit {
                return Err(InjectedFailure(limit));
            }
        }
        self.log.push(transaction);
        Ok(())
    }
}

impl Interface for RecordingInterface {
    type Error = InjectedFailure;

    fn send_commands(&mut self, commands: &[u8]) -> Result<(), Self::Error> {
        self.record(Transaction::Commands(commands.to_vec()))
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.record(Transaction::Data(data.to_vec()))
    }

    fn release(&mut self) -> Result<(), Self::Error> {
        self.record(Transaction::Release)
    }
}

/// Delay that returns immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantDelay;

impl DelayNs for InstantDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}
