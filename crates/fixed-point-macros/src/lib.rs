//! Compile-time literals for token amounts. `uint256!(250e18)` expands to the
//! `U256` 250 * 10^18 and `fixed!(0.002e18)` to the equivalent `FixedPoint`.

use ethers::types::U256;
use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input, LitFloat, LitInt, Result,
};

struct Amount {
    value: U256,
}

impl Parse for Amount {
    fn parse(input: ParseStream) -> Result<Self> {
        let (digits, span) = if input.peek(LitFloat) {
            let lit = input.parse::<LitFloat>()?;
            (lit.base10_digits().to_string(), lit.span())
        } else if input.peek(LitInt) {
            let lit = input.parse::<LitInt>()?;
            (lit.base10_digits().to_string(), lit.span())
        } else {
            return Err(input.error("expected a float or an integer literal"));
        };
        let value = scale(&digits).map_err(|message| syn::Error::new(span, message))?;
        Ok(Self { value })
    }
}

/// Splits `digits` into a mantissa and an exponent and multiplies them out.
/// The literal must describe an integer once the exponent is applied.
fn scale(digits: &str) -> std::result::Result<U256, String> {
    let (mantissa, exponent) = match digits.split_once(|c: char| c == 'e' || c == 'E') {
        Some((mantissa, exponent)) => (
            mantissa,
            exponent
                .parse::<usize>()
                .map_err(|_| format!("invalid exponent in {digits}"))?,
        ),
        None => (digits, 0),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if fraction.len() > exponent {
        return Err(format!("{digits} is not an integer"));
    }
    let combined = format!("{whole}{fraction}");
    let base = U256::from_dec_str(&combined).map_err(|e| format!("{digits}: {e}"))?;
    let factor = U256::from(10)
        .checked_pow(U256::from(exponent - fraction.len()))
        .ok_or_else(|| format!("{digits} overflows uint256"))?;
    base.checked_mul(factor)
        .ok_or_else(|| format!("{digits} overflows uint256"))
}

#[proc_macro]
pub fn uint256(input: TokenStream) -> TokenStream {
    let amount = parse_macro_input!(input as Amount);
    let bytes: [u8; 32] = amount.value.into();
    quote!(ethers::types::U256::from([ #(#bytes),* ])).into()
}

#[proc_macro]
pub fn fixed(input: TokenStream) -> TokenStream {
    let amount = parse_macro_input!(input as Amount);
    let bytes: [u8; 32] = amount.value.into();
    quote!(FixedPoint::from([ #(#bytes),* ])).into()
}
