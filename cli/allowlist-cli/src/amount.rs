use crypto_bigint::{CheckedAdd, CheckedMul, Encoding, U256};

use crate::error::{AllowlistError, Result};

/// Fixed decimal precision applied to every amount before hashing.
pub const TOKEN_DECIMALS: usize = 18;

/// A token quantity scaled by `10^TOKEN_DECIMALS`, as a `uint256`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TokenAmount(U256);

impl TokenAmount {
    pub const ZERO: TokenAmount = TokenAmount(U256::ZERO);

    /// Parses a decimal string such as `"250"` or `"0.5"` into base units.
    ///
    /// Accepts `D+`, `D+.D*` and `.D+` after trimming whitespace, with at
    /// most `TOKEN_DECIMALS` fractional digits. Signs, exponents and
    /// separators are rejected.
    ///
    /// # Errors
    /// Returns `InvalidAmount` if the string is malformed, carries too many
    /// fractional digits, or the scaled value does not fit in 256 bits
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let (whole, fraction) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (trimmed, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(AllowlistError::invalid_amount(input, "no digits"));
        }
        if !whole.bytes().chain(fraction.bytes()).all(|c| c.is_ascii_digit()) {
            return Err(AllowlistError::invalid_amount(
                input,
                "expected an unsigned decimal number",
            ));
        }
        if fraction.len() > TOKEN_DECIMALS {
            return Err(AllowlistError::invalid_amount(
                input,
                format!("more than {TOKEN_DECIMALS} fractional digits"),
            ));
        }

        let ten = U256::from_u8(10);
        let padding = std::iter::repeat(b'0').take(TOKEN_DECIMALS - fraction.len());
        let mut value = U256::ZERO;
        for digit in whole.bytes().chain(fraction.bytes()).chain(padding) {
            let scaled: Option<U256> = value.checked_mul(&ten).into();
            let next: Option<U256> = scaled
                .and_then(|v| Option::from(v.checked_add(&U256::from_u8(digit - b'0'))));
            value = next.ok_or_else(|| {
                AllowlistError::invalid_amount(input, "does not fit in a uint256")
            })?;
        }
        Ok(TokenAmount(value))
    }

    /// Big-endian 32-byte encoding, as `abi.encodePacked(uint256)` lays it out.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        self.0.to_be_bytes()
    }
}
