use ledger_actor_utils::store::StateStore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key names for the metadata records
pub const NAME_KEY: &str = "name";
pub const SYMBOL_KEY: &str = "symbol";
pub const DECIMALS_KEY: &str = "decimals";
pub const TOTAL_SUPPLY_KEY: &str = "totalSupply";

/// Prefix for (owner, spender) allowance keys
pub const ALLOWANCE_PREFIX: &str = "allowance";

#[derive(Error, Debug)]
pub enum StateError {
    #[error("underlying store error: {0}")]
    Store(String),
    #[error("stored value under {key:?} is not usable as {expected}: {value:?}")]
    InvalidStoredValue { key: String, expected: &'static str, value: String },
    #[error("decreasing {owner:?}'s balance of {balance:?} by {delta:?} would be negative")]
    InsufficientBalance { owner: String, balance: u64, delta: u64 },
    #[error(
        "{spender:?} attempted to use {delta:?} of the allowance {allowance:?} granted by {owner:?}"
    )]
    InsufficientAllowance { owner: String, spender: String, allowance: u64, delta: u64 },
    #[error("increasing {owner:?}'s balance of {balance:?} by {delta:?} overflows")]
    BalanceOverflow { owner: String, balance: u64, delta: u64 },
    #[error("increasing the total supply of {supply:?} by {delta:?} overflows")]
    SupplyOverflow { supply: u64, delta: u64 },
    #[error("decreasing the total supply of {supply:?} by {delta:?} would be negative")]
    SupplyUnderflow { supply: u64, delta: u64 },
    #[error("token metadata record {0:?} has not been initialized")]
    MissingMetadata(&'static str),
}

type Result<T> = std::result::Result<T, StateError>;

/// Token metadata, fixed once at initialization
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: u64,
}

/// Composite key for the allowance granted by `owner` to `spender`
///
/// Each component carries a decimal length prefix, so distinct (owner,
/// spender) pairs can never alias however long the addresses are.
pub fn allowance_key(owner: &str, spender: &str) -> String {
    format!("{}{}:{}{}:{}", ALLOWANCE_PREFIX, owner.len(), owner, spender.len(), spender)
}

/// A schema-aware accessor over the host's key-value store.
///
/// Wraps raw get/put with the token key layout and the decimal-string value
/// codec, and enforces the arithmetic invariants (no negative balance,
/// allowance or supply, no u64 wrap-around). Protocol-level checks such as
/// argument validation are left to the caller. Every mutator computes all of
/// its new values before issuing the first write, so a failed call leaves the
/// store untouched.
pub struct LedgerState<'s, S: StateStore> {
    store: &'s S,
}

impl<'s, S: StateStore> LedgerState<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    fn get_string(&self, key: &str) -> Result<Option<String>> {
        let bytes = self.store.get(key).map_err(|e| StateError::Store(e.to_string()))?;
        match bytes {
            Some(bytes) => match String::from_utf8(bytes) {
                Ok(text) => Ok(Some(text)),
                Err(err) => Err(StateError::InvalidStoredValue {
                    key: key.to_string(),
                    expected: "a UTF-8 string",
                    value: String::from_utf8_lossy(err.as_bytes()).into_owned(),
                }),
            },
            None => Ok(None),
        }
    }

    fn get_u64(&self, key: &str) -> Result<Option<u64>> {
        match self.get_string(key)? {
            Some(text) => match text.parse::<u64>() {
                Ok(value) => Ok(Some(value)),
                Err(_) => Err(StateError::InvalidStoredValue {
                    key: key.to_string(),
                    expected: "an unsigned decimal numeral",
                    value: text,
                }),
            },
            None => Ok(None),
        }
    }

    fn put_u64(&self, key: &str, value: u64) -> Result<()> {
        self.store
            .put(key, value.to_string().as_bytes())
            .map_err(|e| StateError::Store(e.to_string()))
    }

    /// Sets a decimal-valued key, deleting the entry instead of storing an
    /// explicit zero
    fn put_u64_or_clear(&self, key: &str, value: u64) -> Result<()> {
        if value == 0 {
            self.store.delete(key).map_err(|e| StateError::Store(e.to_string()))
        } else {
            self.put_u64(key, value)
        }
    }

    /// Get the balance of an account from the currently stored state
    ///
    /// Accounts without a stored record have an implicit zero balance
    pub fn get_balance(&self, owner: &str) -> Result<u64> {
        Ok(self.get_u64(owner)?.unwrap_or(0))
    }

    /// Set the balance of an account, clearing the record when it reaches zero
    pub fn set_balance(&self, owner: &str, balance: u64) -> Result<()> {
        self.put_u64_or_clear(owner, balance)
    }

    fn supply_or_default(&self) -> Result<u64> {
        Ok(self.get_u64(TOTAL_SUPPLY_KEY)?.unwrap_or(0))
    }

    /// The recorded total supply; fails until metadata has been initialized
    pub fn total_supply(&self) -> Result<u64> {
        self.get_u64(TOTAL_SUPPLY_KEY)?.ok_or(StateError::MissingMetadata(TOTAL_SUPPLY_KEY))
    }

    pub fn name(&self) -> Result<String> {
        self.get_string(NAME_KEY)?.ok_or(StateError::MissingMetadata(NAME_KEY))
    }

    pub fn symbol(&self) -> Result<String> {
        self.get_string(SYMBOL_KEY)?.ok_or(StateError::MissingMetadata(SYMBOL_KEY))
    }

    pub fn decimals(&self) -> Result<u8> {
        let value = self.get_u64(DECIMALS_KEY)?.ok_or(StateError::MissingMetadata(DECIMALS_KEY))?;
        u8::try_from(value).map_err(|_| StateError::InvalidStoredValue {
            key: DECIMALS_KEY.to_string(),
            expected: "a decimals count of at most 255",
            value: value.to_string(),
        })
    }

    pub fn is_initialized(&self) -> Result<bool> {
        Ok(self.get_string(NAME_KEY)?.is_some())
    }

    /// Writes all four metadata records
    pub fn init_metadata(&self, metadata: &TokenMetadata) -> Result<()> {
        self.store
            .put(NAME_KEY, metadata.name.as_bytes())
            .and_then(|_| self.store.put(SYMBOL_KEY, metadata.symbol.as_bytes()))
            .map_err(|e| StateError::Store(e.to_string()))?;
        self.put_u64(DECIMALS_KEY, metadata.decimals as u64)?;
        self.put_u64(TOTAL_SUPPLY_KEY, metadata.total_supply)
    }

    pub fn metadata(&self) -> Result<TokenMetadata> {
        Ok(TokenMetadata {
            name: self.name()?,
            symbol: self.symbol()?,
            decimals: self.decimals()?,
            total_supply: self.total_supply()?,
        })
    }

    /// Credits a freshly minted amount to `owner`, growing the total supply in
    /// lockstep. Returns the new balance and the new supply.
    pub fn mint(&self, owner: &str, amount: u64) -> Result<(u64, u64)> {
        let balance = self.get_balance(owner)?;
        let supply = self.supply_or_default()?;
        let new_balance =
            balance.checked_add(amount).ok_or_else(|| StateError::BalanceOverflow {
                owner: owner.to_string(),
                balance,
                delta: amount,
            })?;
        let new_supply = supply
            .checked_add(amount)
            .ok_or(StateError::SupplyOverflow { supply, delta: amount })?;

        self.set_balance(owner, new_balance)?;
        self.put_u64(TOTAL_SUPPLY_KEY, new_supply)?;
        Ok((new_balance, new_supply))
    }

    /// Debits a burnt amount from `owner`, shrinking the total supply in
    /// lockstep. Returns the new balance and the new supply.
    pub fn burn(&self, owner: &str, amount: u64) -> Result<(u64, u64)> {
        let balance = self.get_balance(owner)?;
        let supply = self.supply_or_default()?;
        let new_balance =
            balance.checked_sub(amount).ok_or_else(|| StateError::InsufficientBalance {
                owner: owner.to_string(),
                balance,
                delta: amount,
            })?;
        let new_supply = supply
            .checked_sub(amount)
            .ok_or(StateError::SupplyUnderflow { supply, delta: amount })?;

        self.set_balance(owner, new_balance)?;
        self.put_u64(TOTAL_SUPPLY_KEY, new_supply)?;
        Ok((new_balance, new_supply))
    }

    /// Moves `amount` from one account to another. Both new balances are
    /// computed before either write is issued.
    ///
    /// A transfer to the sending account itself must still not exceed the
    /// balance, but moves nothing.
    pub fn transfer(&self, from: &str, to: &str, amount: u64) -> Result<(u64, u64)> {
        let from_balance = self.get_balance(from)?;
        let new_from =
            from_balance.checked_sub(amount).ok_or_else(|| StateError::InsufficientBalance {
                owner: from.to_string(),
                balance: from_balance,
                delta: amount,
            })?;

        if from == to {
            return Ok((from_balance, from_balance));
        }

        let to_balance = self.get_balance(to)?;
        let new_to =
            to_balance.checked_add(amount).ok_or_else(|| StateError::BalanceOverflow {
                owner: to.to_string(),
                balance: to_balance,
                delta: amount,
            })?;

        self.set_balance(from, new_from)?;
        self.set_balance(to, new_to)?;
        Ok((new_from, new_to))
    }

    /// Get the allowance that an owner has approved for a spender
    ///
    /// An allowance that was never set is implicitly zero
    pub fn get_allowance(&self, owner: &str, spender: &str) -> Result<u64> {
        Ok(self.get_u64(&allowance_key(owner, spender))?.unwrap_or(0))
    }

    /// Set the allowance between owner and spender to a specific amount,
    /// returning the old allowance. Overwrites, never accumulates; a zero
    /// amount clears the record.
    pub fn set_allowance(&self, owner: &str, spender: &str, amount: u64) -> Result<u64> {
        let key = allowance_key(owner, spender);
        let old_allowance = self.get_u64(&key)?.unwrap_or(0);
        self.put_u64_or_clear(&key, amount)?;
        Ok(old_allowance)
    }

    /// Spends `amount` of the (owner, spender) allowance while moving it from
    /// the owner to `to`. All three new values are computed and checked
    /// before any write is issued, so a failure leaves balances and the
    /// allowance exactly as they were.
    pub fn transfer_from(
        &self,
        owner: &str,
        spender: &str,
        to: &str,
        amount: u64,
    ) -> Result<(u64, u64, u64)> {
        let allowance = self.get_allowance(owner, spender)?;
        let new_allowance =
            allowance.checked_sub(amount).ok_or_else(|| StateError::InsufficientAllowance {
                owner: owner.to_string(),
                spender: spender.to_string(),
                allowance,
                delta: amount,
            })?;

        let from_balance = self.get_balance(owner)?;
        let new_from =
            from_balance.checked_sub(amount).ok_or_else(|| StateError::InsufficientBalance {
                owner: owner.to_string(),
                balance: from_balance,
                delta: amount,
            })?;

        if owner == to {
            self.put_u64_or_clear(&allowance_key(owner, spender), new_allowance)?;
            return Ok((from_balance, from_balance, new_allowance));
        }

        let to_balance = self.get_balance(to)?;
        let new_to =
            to_balance.checked_add(amount).ok_or_else(|| StateError::BalanceOverflow {
                owner: to.to_string(),
                balance: to_balance,
                delta: amount,
            })?;

        self.put_u64_or_clear(&allowance_key(owner, spender), new_allowance)?;
        self.set_balance(owner, new_from)?;
        self.set_balance(to, new_to)?;
        Ok((new_from, new_to, new_allowance))
    }
}

#[cfg(test)]
mod test {
    use ledger_actor_utils::store::{MemoryStateStore, StateStore};

    use super::{allowance_key, LedgerState, StateError, TokenMetadata, TOTAL_SUPPLY_KEY};

    const ALICE: &str = "aa11";
    const BOB: &str = "bb22";
    const CAROL: &str = "cc33";

    #[test]
    fn it_reads_implicit_zero_balances() {
        let store = MemoryStateStore::new();
        let state = LedgerState::new(&store);
        assert_eq!(state.get_balance(ALICE).unwrap(), 0);
    }

    #[test]
    fn it_mints_balance_and_supply_in_lockstep() {
        let store = MemoryStateStore::new();
        let state = LedgerState::new(&store);

        let (balance, supply) = state.mint(ALICE, 100).unwrap();
        assert_eq!(balance, 100);
        assert_eq!(supply, 100);

        let (balance, supply) = state.mint(ALICE, 50).unwrap();
        assert_eq!(balance, 150);
        assert_eq!(supply, 150);
    }

    #[test]
    fn it_rejects_minting_past_the_supply_ceiling() {
        let store = MemoryStateStore::new();
        let state = LedgerState::new(&store);

        state.mint(ALICE, u64::MAX).unwrap();
        let err = state.mint(BOB, 1).unwrap_err();
        match err {
            StateError::SupplyOverflow { supply, delta } => {
                assert_eq!(supply, u64::MAX);
                assert_eq!(delta, 1);
            }
            _ => panic!("unexpected error"),
        }

        // nothing was credited to the second account
        assert_eq!(state.get_balance(BOB).unwrap(), 0);
        assert_eq!(state.total_supply().unwrap(), u64::MAX);
    }

    #[test]
    fn it_burns_balance_and_supply_in_lockstep() {
        let store = MemoryStateStore::new();
        let state = LedgerState::new(&store);
        state.mint(ALICE, 100).unwrap();

        let (balance, supply) = state.burn(ALICE, 40).unwrap();
        assert_eq!(balance, 60);
        assert_eq!(supply, 60);
    }

    #[test]
    fn it_refuses_to_burn_more_than_the_balance() {
        let store = MemoryStateStore::new();
        let state = LedgerState::new(&store);
        state.mint(ALICE, 100).unwrap();

        let err = state.burn(ALICE, 101).unwrap_err();
        match err {
            StateError::InsufficientBalance { balance, delta, .. } => {
                assert_eq!(balance, 100);
                assert_eq!(delta, 101);
            }
            _ => panic!("unexpected error"),
        }
        assert_eq!(state.get_balance(ALICE).unwrap(), 100);
        assert_eq!(state.total_supply().unwrap(), 100);
    }

    #[test]
    fn it_transfers_between_accounts() {
        let store = MemoryStateStore::new();
        let state = LedgerState::new(&store);
        state.mint(ALICE, 100).unwrap();

        let (from_balance, to_balance) = state.transfer(ALICE, BOB, 40).unwrap();
        assert_eq!(from_balance, 60);
        assert_eq!(to_balance, 40);
        // the pair conserves value
        assert_eq!(
            state.get_balance(ALICE).unwrap() + state.get_balance(BOB).unwrap(),
            state.total_supply().unwrap()
        );
    }

    #[test]
    fn it_leaves_both_balances_on_a_failed_transfer() {
        let store = MemoryStateStore::new();
        let state = LedgerState::new(&store);
        state.mint(ALICE, 10).unwrap();

        state.transfer(ALICE, BOB, 11).unwrap_err();
        assert_eq!(state.get_balance(ALICE).unwrap(), 10);
        assert_eq!(state.get_balance(BOB).unwrap(), 0);
    }

    #[test]
    fn it_checks_sufficiency_on_self_transfers_without_moving() {
        let store = MemoryStateStore::new();
        let state = LedgerState::new(&store);
        state.mint(ALICE, 10).unwrap();

        let (from_balance, to_balance) = state.transfer(ALICE, ALICE, 10).unwrap();
        assert_eq!(from_balance, 10);
        assert_eq!(to_balance, 10);
        assert_eq!(state.get_balance(ALICE).unwrap(), 10);

        state.transfer(ALICE, ALICE, 11).unwrap_err();
    }

    #[test]
    fn it_clears_zero_balances_from_the_store() {
        let store = MemoryStateStore::new();
        let state = LedgerState::new(&store);
        state.mint(ALICE, 10).unwrap();
        state.transfer(ALICE, BOB, 10).unwrap();

        assert!(!store.contains_key(ALICE));
        assert_eq!(state.get_balance(ALICE).unwrap(), 0);
    }

    #[test]
    fn it_overwrites_allowances() {
        let store = MemoryStateStore::new();
        let state = LedgerState::new(&store);

        assert_eq!(state.get_allowance(ALICE, BOB).unwrap(), 0);

        let old = state.set_allowance(ALICE, BOB, 100).unwrap();
        assert_eq!(old, 0);
        assert_eq!(state.get_allowance(ALICE, BOB).unwrap(), 100);

        // overwrite, not accumulate
        let old = state.set_allowance(ALICE, BOB, 40).unwrap();
        assert_eq!(old, 100);
        assert_eq!(state.get_allowance(ALICE, BOB).unwrap(), 40);

        // the reverse direction is a different record
        assert_eq!(state.get_allowance(BOB, ALICE).unwrap(), 0);

        // a zero allowance clears the record
        state.set_allowance(ALICE, BOB, 0).unwrap();
        assert!(!store.contains_key(&allowance_key(ALICE, BOB)));
    }

    #[test]
    fn it_spends_allowances_atomically() {
        let store = MemoryStateStore::new();
        let state = LedgerState::new(&store);
        state.mint(ALICE, 100).unwrap();
        state.set_allowance(ALICE, BOB, 60).unwrap();

        let (from_balance, to_balance, allowance) =
            state.transfer_from(ALICE, BOB, CAROL, 50).unwrap();
        assert_eq!(from_balance, 50);
        assert_eq!(to_balance, 50);
        assert_eq!(allowance, 10);

        // cannot spend more than what remains approved
        let err = state.transfer_from(ALICE, BOB, CAROL, 11).unwrap_err();
        match err {
            StateError::InsufficientAllowance { allowance, delta, .. } => {
                assert_eq!(allowance, 10);
                assert_eq!(delta, 11);
            }
            _ => panic!("unexpected error"),
        }
        assert_eq!(state.get_balance(ALICE).unwrap(), 50);
        assert_eq!(state.get_balance(CAROL).unwrap(), 50);
        assert_eq!(state.get_allowance(ALICE, BOB).unwrap(), 10);
    }

    #[test]
    fn it_leaves_all_three_values_when_the_owner_balance_is_short() {
        let store = MemoryStateStore::new();
        let state = LedgerState::new(&store);
        state.mint(ALICE, 10).unwrap();
        state.set_allowance(ALICE, BOB, 100).unwrap();

        let err = state.transfer_from(ALICE, BOB, CAROL, 50).unwrap_err();
        match err {
            StateError::InsufficientBalance { .. } => {}
            _ => panic!("unexpected error"),
        }
        assert_eq!(state.get_balance(ALICE).unwrap(), 10);
        assert_eq!(state.get_balance(CAROL).unwrap(), 0);
        assert_eq!(state.get_allowance(ALICE, BOB).unwrap(), 100);
    }

    #[test]
    fn it_builds_collision_free_allowance_keys() {
        // naive concatenation would alias both pairs to "allowanceabc"
        assert_ne!(allowance_key("ab", "c"), allowance_key("a", "bc"));
        assert_ne!(allowance_key("", "abc"), allowance_key("abc", ""));
    }

    #[test]
    fn it_round_trips_metadata() {
        let store = MemoryStateStore::new();
        let state = LedgerState::new(&store);

        assert!(!state.is_initialized().unwrap());
        match state.name().unwrap_err() {
            StateError::MissingMetadata("name") => {}
            _ => panic!("unexpected error"),
        }

        let metadata = TokenMetadata {
            name: "Gold".to_string(),
            symbol: "GLD".to_string(),
            decimals: 2,
            total_supply: 1000,
        };
        state.init_metadata(&metadata).unwrap();

        assert!(state.is_initialized().unwrap());
        assert_eq!(state.metadata().unwrap(), metadata);
        assert_eq!(state.name().unwrap(), "Gold");
        assert_eq!(state.symbol().unwrap(), "GLD");
        assert_eq!(state.decimals().unwrap(), 2);
        assert_eq!(state.total_supply().unwrap(), 1000);
    }

    #[test]
    fn it_rejects_corrupt_numeric_records() {
        let store = MemoryStateStore::new();
        let state = LedgerState::new(&store);
        store.put(TOTAL_SUPPLY_KEY, b"not-a-number").unwrap();

        match state.total_supply().unwrap_err() {
            StateError::InvalidStoredValue { key, .. } => assert_eq!(key, TOTAL_SUPPLY_KEY),
            _ => panic!("unexpected error"),
        }
    }
}
