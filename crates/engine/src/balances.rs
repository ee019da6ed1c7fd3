//! Resource balances
//!
//! Balances are ordinary records in a table under the system namespace, so
//! a transfer made inside a frame is buffered in that frame and rolls back
//! with it.

use serde::{Deserialize, Serialize};
use tessera_concurrency::StateAccess;
use tessera_core::{Error, Name, Result};
use tessera_primitives::{Table, TableSchema};
use tracing::trace;

/// Table holding every account
pub const BALANCES_TABLE: &str = "balances";

/// Balance record of one identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account owner, user or contract
    pub owner: Name,
    /// Spendable amount
    pub amount: u64,
}

/// Handle on the balances table
#[derive(Debug, Clone)]
pub struct Balances {
    accounts: Table<Account, Name>,
}

impl Default for Balances {
    fn default() -> Self {
        Self::new()
    }
}

impl Balances {
    /// Handle on [`BALANCES_TABLE`]
    pub fn new() -> Self {
        Self {
            accounts: Table::new(TableSchema::new(BALANCES_TABLE, |a: &Account| {
                a.owner.clone()
            })),
        }
    }

    /// Current balance, zero for unknown accounts
    pub fn balance<S: StateAccess + ?Sized>(&self, state: &S, owner: &Name) -> Result<u64> {
        Ok(self
            .accounts
            .find(state, owner)?
            .map(|a| a.amount)
            .unwrap_or(0))
    }

    /// Add `amount` to `owner`
    pub fn credit<S: StateAccess + ?Sized>(&self, state: &mut S, owner: &Name, amount: u64) -> Result<u64> {
        let current = self.balance(state, owner)?;
        let updated = current.checked_add(amount).ok_or_else(|| {
            Error::InvalidOperation(format!("Balance of '{}' would overflow", owner))
        })?;

        if self.accounts.has(state, owner)? {
            self.accounts.update(state, owner, |a| a.amount = updated)?;
        } else {
            self.accounts.insert(state, |a| {
                a.owner = owner.clone();
                a.amount = updated;
            })?;
        }
        Ok(updated)
    }

    /// Remove `amount` from `owner`
    ///
    /// Fails with `InsufficientResources` if the balance is short.
    pub fn debit<S: StateAccess + ?Sized>(&self, state: &mut S, owner: &Name, amount: u64) -> Result<u64> {
        let available = self.balance(state, owner)?;
        if available < amount {
            return Err(Error::InsufficientResources {
                account: owner.clone(),
                required: amount,
                available,
            });
        }
        let remaining = available - amount;
        self.accounts.update(state, owner, |a| a.amount = remaining)?;
        Ok(remaining)
    }

    /// Move `amount` from `from` to `to`; zero amounts are a no-op
    pub fn transfer<S: StateAccess + ?Sized>(
        &self,
        state: &mut S,
        from: &Name,
        to: &Name,
        amount: u64,
    ) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        self.debit(state, from, amount)?;
        self.credit(state, to, amount)?;
        trace!(target: "tessera::dispatch", %from, %to, amount, "Transferred");
        Ok(())
    }

    /// Every account in owner order
    pub fn accounts<S: StateAccess + ?Sized>(&self, state: &S) -> Result<Vec<Account>> {
        self.accounts.records(state)
    }
}
