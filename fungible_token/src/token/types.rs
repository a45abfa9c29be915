use std::str::FromStr;

use crate::token::TokenError;

/// The closed set of operations the contract supports.
///
/// The host delivers an operation name plus positional string arguments;
/// [`Operation::parse`] turns that pair into a variant, rejecting unknown
/// names, wrong argument counts and malformed numerals before any state is
/// touched. Dispatch over the parsed value is an exhaustive match, so adding
/// an operation without handling it everywhere fails to compile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Initialize { name: String, symbol: String, decimals: u8, total_supply: u64 },
    Mint { amount: u64 },
    Burn { amount: u64 },
    Transfer { to: String, amount: u64 },
    Approve { owner: String, spender: String, amount: u64 },
    Allowance { owner: String, spender: String },
    TransferFrom { owner: String, spender: String, to: String, amount: u64 },
    BalanceOf { address: String },
    ClientAccountId,
    ClientAccountBalance,
    Name,
    Symbol,
    TotalSupply,
}

impl Operation {
    /// Parses a host-supplied operation name and argument list
    pub fn parse(operation: &str, args: &[String]) -> Result<Self, TokenError> {
        match operation {
            "Initialize" => match args {
                [name, symbol, decimals, total_supply] => Ok(Operation::Initialize {
                    name: name.clone(),
                    symbol: symbol.clone(),
                    decimals: parse_numeral("decimals", decimals)?,
                    total_supply: parse_numeral("totalSupply", total_supply)?,
                }),
                _ => Err(arg_count("Initialize", 4, args)),
            },
            "Mint" => match args {
                [amount] => Ok(Operation::Mint { amount: parse_numeral("amount", amount)? }),
                _ => Err(arg_count("Mint", 1, args)),
            },
            "Burn" => match args {
                [amount] => Ok(Operation::Burn { amount: parse_numeral("amount", amount)? }),
                _ => Err(arg_count("Burn", 1, args)),
            },
            "Transfer" => match args {
                [to, amount] => Ok(Operation::Transfer {
                    to: to.clone(),
                    amount: parse_numeral("amount", amount)?,
                }),
                _ => Err(arg_count("Transfer", 2, args)),
            },
            "Approve" => match args {
                [owner, spender, amount] => Ok(Operation::Approve {
                    owner: owner.clone(),
                    spender: spender.clone(),
                    amount: parse_numeral("amount", amount)?,
                }),
                _ => Err(arg_count("Approve", 3, args)),
            },
            "Allowance" => match args {
                [owner, spender] => Ok(Operation::Allowance {
                    owner: owner.clone(),
                    spender: spender.clone(),
                }),
                _ => Err(arg_count("Allowance", 2, args)),
            },
            "TransferFrom" => match args {
                [owner, spender, to, amount] => Ok(Operation::TransferFrom {
                    owner: owner.clone(),
                    spender: spender.clone(),
                    to: to.clone(),
                    amount: parse_numeral("amount", amount)?,
                }),
                _ => Err(arg_count("TransferFrom", 4, args)),
            },
            "BalanceOf" => match args {
                [address] => Ok(Operation::BalanceOf { address: address.clone() }),
                _ => Err(arg_count("BalanceOf", 1, args)),
            },
            "ClientAccountID" => match args {
                [] => Ok(Operation::ClientAccountId),
                _ => Err(arg_count("ClientAccountID", 0, args)),
            },
            "ClientAccountBalance" => match args {
                [] => Ok(Operation::ClientAccountBalance),
                _ => Err(arg_count("ClientAccountBalance", 0, args)),
            },
            "Name" => match args {
                [] => Ok(Operation::Name),
                _ => Err(arg_count("Name", 0, args)),
            },
            "Symbol" => match args {
                [] => Ok(Operation::Symbol),
                _ => Err(arg_count("Symbol", 0, args)),
            },
            "TotalSupply" => match args {
                [] => Ok(Operation::TotalSupply),
                _ => Err(arg_count("TotalSupply", 0, args)),
            },
            other => Err(TokenError::UnsupportedOperation(other.to_string())),
        }
    }
}

fn arg_count(operation: &'static str, expected: usize, args: &[String]) -> TokenError {
    TokenError::ArgumentCount { operation, expected, got: args.len() }
}

fn parse_numeral<T: FromStr>(name: &'static str, value: &str) -> Result<T, TokenError> {
    value
        .parse()
        .map_err(|_| TokenError::InvalidNumeral { name, value: value.to_string() })
}

/// Return value after a successful mint
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintReturn {
    /// The new balance of the minting account
    pub balance: u64,
    /// The new total supply
    pub supply: u64,
}

/// The updated values after burning
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BurnReturn {
    /// New balance of the burning account
    pub balance: u64,
    /// The new total supply
    pub supply: u64,
}

/// Return value after a successful transfer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferReturn {
    /// The new balance of the sending account
    pub from_balance: u64,
    /// The new balance of the receiving account
    pub to_balance: u64,
}

/// Return value after a successful delegated transfer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferFromReturn {
    /// The new balance of the owner account
    pub from_balance: u64,
    /// The new balance of the receiving account
    pub to_balance: u64,
    /// The remaining (owner, spender) allowance
    pub allowance: u64,
}
