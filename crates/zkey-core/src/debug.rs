//! Debug rendering for field elements and points
//!
//! Enable the trace macros with `--features debug`

use num_bigint::BigUint;

use crate::types::{Fq2, G1Affine, G2Affine};

/// Big-endian hex with `0x` prefix
pub fn fe_to_hex(x: &BigUint) -> String {
    format!("0x{}", hex::encode(x.to_bytes_be()))
}

/// Format G1 point as hex, `inf` for the point at infinity
pub fn g1_to_hex(p: &G1Affine) -> String {
    if p.is_infinity() {
        return "inf".to_string();
    }
    format!("({}, {})", fe_to_hex(&p.x), fe_to_hex(&p.y))
}

fn fq2_to_hex(x: &Fq2) -> String {
    format!("[{}, {}]", fe_to_hex(&x.c0), fe_to_hex(&x.c1))
}

pub fn g2_to_hex(p: &G2Affine) -> String {
    if p.is_infinity() {
        return "inf".to_string();
    }
    format!("({}, {})", fq2_to_hex(&p.x), fq2_to_hex(&p.y))
}

/// Trace a G1 value (only when debug feature enabled)
#[cfg(feature = "debug")]
#[macro_export]
macro_rules! dbg_g1 {
    ($name:expr, $g1:expr) => {
        log::trace!("{} = {}", $name, $crate::debug::g1_to_hex($g1));
    };
}

/// Trace a G1 value (noop when disabled)
#[cfg(not(feature = "debug"))]
#[macro_export]
macro_rules! dbg_g1 {
    ($name:expr, $g1:expr) => {};
}
