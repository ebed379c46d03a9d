use std::collections::BTreeMap;

use alloy_primitives::{Address, Bytes, B256, U256};

use crate::{CatenaSpecId, SnapshotId, StateError, WorldState};

/// An in-memory account record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryAccount {
    /// The account balance.
    pub balance: U256,
    /// The account nonce.
    pub nonce: u64,
    /// The account code; empty for plain accounts.
    pub code: Bytes,
}

/// A reversible mutation recorded by [`MemoryWorldState`].
#[derive(Clone, Debug)]
enum JournalEntry {
    BalanceChange { address: Address, previous: U256 },
    NonceChange { address: Address, previous: u64 },
    CodeChange { address: Address, previous: Bytes },
    Created { address: Address },
    Deleted { address: Address, account: MemoryAccount },
}

/// An in-memory world state for testing purposes.
///
/// Mutations are journaled between snapshots; `commit` flushes the journal, `commit_tree`
/// persists the account set and `reset` reloads the last persisted tree. The state root is a
/// blake3 digest over the sorted account set.
#[derive(Clone, Debug)]
pub struct MemoryWorldState {
    accounts: BTreeMap<Address, MemoryAccount>,
    persisted: BTreeMap<Address, MemoryAccount>,
    journal: Vec<JournalEntry>,
    root: B256,
    last_committed_tree: Option<u64>,
}

impl Default for MemoryWorldState {
    fn default() -> Self {
        let mut state = Self {
            accounts: BTreeMap::new(),
            persisted: BTreeMap::new(),
            journal: Vec::new(),
            root: B256::ZERO,
            last_committed_tree: None,
        };
        state.root = state.compute_root();
        state
    }
}

impl MemoryWorldState {
    /// Sets the balance of an account, creating it if absent.
    ///
    /// Seeded accounts are part of the persisted tree, so a `reset` returns to them.
    pub fn set_account_balance(&mut self, address: Address, balance: U256) {
        self.accounts.entry(address).or_default().balance = balance;
        self.persisted.entry(address).or_default().balance = balance;
    }

    /// Sets the balance of an account, creating it if absent.
    pub fn with_account(mut self, address: Address, balance: U256) -> Self {
        self.set_account_balance(address, balance);
        self
    }

    /// Sets the nonce of an account, creating it if absent.
    pub fn set_account_nonce(&mut self, address: Address, nonce: u64) {
        self.accounts.entry(address).or_default().nonce = nonce;
        self.persisted.entry(address).or_default().nonce = nonce;
    }

    /// Sets the nonce of an account, creating it if absent.
    pub fn with_nonce(mut self, address: Address, nonce: u64) -> Self {
        self.set_account_nonce(address, nonce);
        self
    }

    /// Sets the code of an account, creating it if absent.
    pub fn set_account_code(&mut self, address: Address, code: Bytes) {
        self.accounts.entry(address).or_default().code = code.clone();
        self.persisted.entry(address).or_default().code = code;
    }

    /// Sets the code of an account, creating it if absent.
    pub fn with_code(mut self, address: Address, code: Bytes) -> Self {
        self.set_account_code(address, code);
        self
    }

    /// The code installed under `address`, empty when absent.
    pub fn code(&self, address: Address) -> Bytes {
        self.accounts.get(&address).map(|account| account.code.clone()).unwrap_or_default()
    }

    /// The current account set.
    pub fn accounts(&self) -> &BTreeMap<Address, MemoryAccount> {
        &self.accounts
    }

    /// The batch number of the last persisted tree, if any.
    pub fn last_committed_tree(&self) -> Option<u64> {
        self.last_committed_tree
    }

    fn compute_root(&self) -> B256 {
        let mut hasher = blake3::Hasher::new();
        for (address, account) in &self.accounts {
            hasher.update(address.as_slice());
            hasher.update(&account.balance.to_be_bytes::<32>());
            hasher.update(&account.nonce.to_le_bytes());
            hasher.update(&account.code);
        }
        B256::from(*hasher.finalize().as_bytes())
    }

    fn revert(&mut self, entry: JournalEntry) {
        match entry {
            JournalEntry::BalanceChange { address, previous } => {
                if let Some(account) = self.accounts.get_mut(&address) {
                    account.balance = previous;
                }
            }
            JournalEntry::NonceChange { address, previous } => {
                if let Some(account) = self.accounts.get_mut(&address) {
                    account.nonce = previous;
                }
            }
            JournalEntry::CodeChange { address, previous } => {
                if let Some(account) = self.accounts.get_mut(&address) {
                    account.code = previous;
                }
            }
            JournalEntry::Created { address } => {
                self.accounts.remove(&address);
            }
            JournalEntry::Deleted { address, account } => {
                self.accounts.insert(address, account);
            }
        }
    }
}

impl WorldState for MemoryWorldState {
    fn account_exists(&self, address: Address) -> bool {
        self.accounts.contains_key(&address)
    }

    fn get_balance(&self, address: Address) -> U256 {
        self.accounts.get(&address).map(|account| account.balance).unwrap_or_default()
    }

    fn get_nonce(&self, address: Address) -> u64 {
        self.accounts.get(&address).map(|account| account.nonce).unwrap_or_default()
    }

    fn create_account(&mut self, address: Address, balance: U256) {
        self.accounts.insert(address, MemoryAccount { balance, ..Default::default() });
        self.journal.push(JournalEntry::Created { address });
    }

    fn subtract_balance(&mut self, address: Address, amount: U256) -> Result<(), StateError> {
        if amount.is_zero() {
            return Ok(());
        }
        let balance = self.get_balance(address);
        if balance < amount {
            return Err(StateError::InsufficientBalance { address, balance, required: amount });
        }
        if !self.accounts.contains_key(&address) {
            return Err(StateError::UnknownAccount(address));
        }
        self.journal.push(JournalEntry::BalanceChange { address, previous: balance });
        self.accounts.get_mut(&address).expect("existence checked above").balance =
            balance - amount;
        Ok(())
    }

    fn add_balance(&mut self, address: Address, amount: U256) -> Result<(), StateError> {
        let previous = match self.accounts.get(&address) {
            Some(account) => account.balance,
            None => return Err(StateError::UnknownAccount(address)),
        };
        self.journal.push(JournalEntry::BalanceChange { address, previous });
        self.accounts.get_mut(&address).expect("existence checked above").balance =
            previous + amount;
        Ok(())
    }

    fn increment_nonce(&mut self, address: Address) -> Result<(), StateError> {
        let previous = match self.accounts.get(&address) {
            Some(account) => account.nonce,
            None => return Err(StateError::UnknownAccount(address)),
        };
        self.journal.push(JournalEntry::NonceChange { address, previous });
        self.accounts.get_mut(&address).expect("existence checked above").nonce = previous + 1;
        Ok(())
    }

    fn insert_code(&mut self, address: Address, code: Bytes) -> Result<(), StateError> {
        let previous = match self.accounts.get(&address) {
            Some(account) => account.code.clone(),
            None => return Err(StateError::UnknownAccount(address)),
        };
        self.journal.push(JournalEntry::CodeChange { address, previous });
        self.accounts.get_mut(&address).expect("existence checked above").code = code;
        Ok(())
    }

    fn delete_account(&mut self, address: Address) {
        if let Some(account) = self.accounts.remove(&address) {
            self.journal.push(JournalEntry::Deleted { address, account });
        }
    }

    fn take_snapshot(&mut self) -> SnapshotId {
        SnapshotId(self.journal.len())
    }

    fn restore(&mut self, snapshot: SnapshotId) -> Result<(), StateError> {
        if snapshot.0 > self.journal.len() {
            return Err(StateError::InvalidSnapshot(snapshot));
        }
        while self.journal.len() > snapshot.0 {
            let entry = self.journal.pop().expect("journal length checked above");
            self.revert(entry);
        }
        Ok(())
    }

    fn commit(&mut self, _spec: CatenaSpecId) {
        self.journal.clear();
    }

    fn recalculate_state_root(&mut self) -> B256 {
        self.root = self.compute_root();
        self.root
    }

    fn current_state_root(&self) -> B256 {
        self.root
    }

    fn commit_tree(&mut self, sequence_number: u64) {
        self.journal.clear();
        self.persisted = self.accounts.clone();
        self.root = self.compute_root();
        self.last_committed_tree = Some(sequence_number);
    }

    fn reset(&mut self) {
        self.accounts = self.persisted.clone();
        self.journal.clear();
        self.root = self.compute_root();
    }
}
