use ledger_actor_utils::host::Host;
use ledger_actor_utils::response::Response;
use ledger_actor_utils::runtime::ContractRuntime;
use ledger_actor_utils::store::StateStore;
use log::{debug, warn};

pub use error::TokenError;

use self::state::{
    LedgerState, TokenMetadata, ALLOWANCE_PREFIX, DECIMALS_KEY, NAME_KEY, SYMBOL_KEY,
    TOTAL_SUPPLY_KEY,
};
use self::types::{BurnReturn, MintReturn, Operation, TransferFromReturn, TransferReturn};
use crate::event::{TransferEvent, TRANSFER_EVENT};

mod error;
pub mod state;
pub mod types;

type Result<T> = std::result::Result<T, TokenError>;

/// The fungible-token ledger contract.
///
/// Constructed fresh for every invocation around the runtime the host hands
/// in; holds no state of its own. All reads and writes go through the host's
/// store, so the final writes are a pure function of the snapshot the host
/// supplied.
pub struct TokenLedger<H, S>
where
    H: Host,
    S: StateStore,
{
    /// Runtime services to interact with the hosting ledger platform
    runtime: ContractRuntime<H, S>,
}

impl<H, S> TokenLedger<H, S>
where
    H: Host,
    S: StateStore,
{
    pub fn new(runtime: ContractRuntime<H, S>) -> Self {
        Self { runtime }
    }

    /// Get a reference to the underlying runtime
    pub fn runtime(&self) -> &ContractRuntime<H, S> {
        &self.runtime
    }

    fn state(&self) -> LedgerState<'_, ContractRuntime<H, S>> {
        LedgerState::new(&self.runtime)
    }

    /// Applies one named operation against the store and reports the outcome
    /// to the host.
    ///
    /// This is the contract's entire surface: parse, execute, convert any
    /// error into a failure response. A failure response instructs the host to
    /// discard the invocation's writes.
    pub fn apply(&self, operation: &str, args: &[String]) -> Response {
        debug!("dispatching operation {:?} with {} argument(s)", operation, args.len());
        let parsed = match Operation::parse(operation, args) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!("rejected operation {:?}: {}", operation, err);
                return Response::error(err.to_string());
            }
        };
        match self.execute(parsed) {
            Ok(payload) => Response::success(payload),
            Err(err) => {
                warn!("operation {:?} failed: {}", operation, err);
                Response::error(err.to_string())
            }
        }
    }

    fn execute(&self, operation: Operation) -> Result<Vec<u8>> {
        match operation {
            Operation::Initialize { name, symbol, decimals, total_supply } => {
                let metadata = self.initialize(&name, &symbol, decimals, total_supply)?;
                Ok(serde_json::to_vec(&metadata)?)
            }
            Operation::Mint { amount } => self.mint(amount).map(|_| Vec::new()),
            Operation::Burn { amount } => self.burn(amount).map(|_| Vec::new()),
            Operation::Transfer { to, amount } => self.transfer(&to, amount).map(|_| Vec::new()),
            Operation::Approve { owner, spender, amount } => {
                self.approve(&owner, &spender, amount).map(|_| Vec::new())
            }
            Operation::Allowance { owner, spender } => {
                Ok(decimal_payload(self.allowance(&owner, &spender)?))
            }
            Operation::TransferFrom { owner, spender, to, amount } => {
                self.transfer_from(&owner, &spender, &to, amount).map(|_| Vec::new())
            }
            Operation::BalanceOf { address } => {
                Ok(decimal_payload(self.balance_of(&address)?))
            }
            Operation::ClientAccountId => Ok(self.client_account_id()?.into_bytes()),
            Operation::ClientAccountBalance => {
                Ok(decimal_payload(self.client_account_balance()?))
            }
            Operation::Name => Ok(self.name()?.into_bytes()),
            Operation::Symbol => Ok(self.symbol()?.into_bytes()),
            Operation::TotalSupply => Ok(decimal_payload(self.total_supply()?)),
        }
    }

    /// Writes the token metadata and credits the full initial supply to the
    /// caller's account
    ///
    /// Metadata is immutable once written; a second call fails and changes
    /// nothing.
    pub fn initialize(
        &self,
        name: &str,
        symbol: &str,
        decimals: u8,
        total_supply: u64,
    ) -> Result<TokenMetadata> {
        let state = self.state();
        if state.is_initialized()? {
            return Err(TokenError::AlreadyInitialized);
        }
        let caller = self.runtime.caller_address()?;

        let metadata = TokenMetadata {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
            total_supply,
        };
        state.init_metadata(&metadata)?;
        state.set_balance(&caller, total_supply)?;
        Ok(metadata)
    }

    /// Mints new tokens into the caller's account
    ///
    /// Upon success:
    /// - The caller's balance increases by the requested amount
    /// - The total supply increases by the requested amount
    /// - A Transfer notification with an empty `from` is attached
    ///
    /// Fails if either value would exceed the u64 range; nothing is written
    /// in that case.
    pub fn mint(&self, amount: u64) -> Result<MintReturn> {
        let caller = self.runtime.caller_address()?;
        let payload =
            TransferEvent { from: String::new(), to: caller.clone(), value: amount }.to_json()?;

        let (balance, supply) = self.state().mint(&caller, amount)?;
        self.runtime.emit_event(TRANSFER_EVENT, &payload)?;
        Ok(MintReturn { balance, supply })
    }

    /// Burns tokens from the caller's account, decreasing the total supply
    ///
    /// - The requested amount MUST NOT exceed the caller's balance
    /// - A Transfer notification with an empty `to` is attached
    pub fn burn(&self, amount: u64) -> Result<BurnReturn> {
        let caller = self.runtime.caller_address()?;
        let payload =
            TransferEvent { from: caller.clone(), to: String::new(), value: amount }.to_json()?;

        let (balance, supply) = self.state().burn(&caller, amount)?;
        self.runtime.emit_event(TRANSFER_EVENT, &payload)?;
        Ok(BurnReturn { balance, supply })
    }

    /// Transfers an amount from the caller to another account
    ///
    /// - The recipient address MUST NOT be empty
    /// - The requested amount MUST NOT exceed the caller's balance
    /// - A transfer to the caller's own account verifies the balance but
    ///   moves nothing
    ///
    /// Both new balances are computed before either is written.
    pub fn transfer(&self, to: &str, amount: u64) -> Result<TransferReturn> {
        let to = validate_address("to", to)?;
        let caller = self.runtime.caller_address()?;
        let payload =
            TransferEvent { from: caller.clone(), to: to.to_string(), value: amount }.to_json()?;

        let (from_balance, to_balance) = self.state().transfer(&caller, to, amount)?;
        self.runtime.emit_event(TRANSFER_EVENT, &payload)?;
        Ok(TransferReturn { from_balance, to_balance })
    }

    /// Sets the allowance a spender may move out of an owner's account
    ///
    /// Overwrites any previous allowance rather than accumulating. Returns
    /// the allowance that was replaced.
    pub fn approve(&self, owner: &str, spender: &str, amount: u64) -> Result<u64> {
        let owner = validate_address("owner", owner)?;
        let spender = validate_address("spender", spender)?;
        Ok(self.state().set_allowance(owner, spender, amount)?)
    }

    /// Gets the allowance between owner and spender
    ///
    /// An allowance that was never approved is zero, not an error
    pub fn allowance(&self, owner: &str, spender: &str) -> Result<u64> {
        Ok(self.state().get_allowance(owner, spender)?)
    }

    /// Transfers an amount from an owner's account on the strength of a
    /// previously approved allowance
    ///
    /// - The recipient address MUST NOT be empty
    /// - The (owner, spender) allowance MUST cover the requested amount
    /// - The owner's balance MUST cover the requested amount
    ///
    /// Upon success the owner's balance and the allowance decrease, and the
    /// recipient's balance increases, by the requested amount. All three new
    /// values are computed before any of them is written, so a failed call
    /// leaves all three untouched.
    pub fn transfer_from(
        &self,
        owner: &str,
        spender: &str,
        to: &str,
        amount: u64,
    ) -> Result<TransferFromReturn> {
        let owner = validate_address("owner", owner)?;
        let spender = validate_address("spender", spender)?;
        let to = validate_address("to", to)?;
        let payload =
            TransferEvent { from: owner.to_string(), to: to.to_string(), value: amount }
                .to_json()?;

        let (from_balance, to_balance, allowance) =
            self.state().transfer_from(owner, spender, to, amount)?;
        self.runtime.emit_event(TRANSFER_EVENT, &payload)?;
        Ok(TransferFromReturn { from_balance, to_balance, allowance })
    }

    /// Returns the balance of an account
    ///
    /// Accounts that have never received tokens report zero rather than an
    /// error, so a balance query cannot be used to probe which accounts exist.
    pub fn balance_of(&self, address: &str) -> Result<u64> {
        Ok(self.state().get_balance(address)?)
    }

    /// The account address derived from the caller's identity
    pub fn client_account_id(&self) -> Result<String> {
        Ok(self.runtime.caller_address()?)
    }

    /// The balance of the account derived from the caller's identity
    pub fn client_account_balance(&self) -> Result<u64> {
        let caller = self.runtime.caller_address()?;
        self.balance_of(&caller)
    }

    pub fn name(&self) -> Result<String> {
        Ok(self.state().name()?)
    }

    pub fn symbol(&self) -> Result<String> {
        Ok(self.state().symbol()?)
    }

    pub fn decimals(&self) -> Result<u8> {
        Ok(self.state().decimals()?)
    }

    pub fn total_supply(&self) -> Result<u64> {
        Ok(self.state().total_supply()?)
    }

    pub fn metadata(&self) -> Result<TokenMetadata> {
        Ok(self.state().metadata()?)
    }
}

/// Validates an externally supplied address argument for use on a mutating
/// path.
///
/// The address must be non-empty and must not alias one of the reserved
/// metadata keys or the allowance key space, since balances share the store's
/// flat key namespace. Derived caller addresses are hex strings and can never
/// collide. Returns the argument, or an error.
pub fn validate_address<'a>(name: &'static str, address: &'a str) -> Result<&'a str> {
    if address.is_empty() {
        return Err(TokenError::EmptyAddress(name));
    }
    let reserved = [NAME_KEY, SYMBOL_KEY, DECIMALS_KEY, TOTAL_SUPPLY_KEY];
    if reserved.contains(&address) || address.starts_with(ALLOWANCE_PREFIX) {
        return Err(TokenError::ReservedAddress { name, address: address.to_string() });
    }
    Ok(address)
}

fn decimal_payload(value: u64) -> Vec<u8> {
    value.to_string().into_bytes()
}
