//! Container constants and BN254 reference moduli

use num_bigint::BigUint;

/// File magic for zkey containers
pub const ZKEY_MAGIC: [u8; 4] = *b"zkey";

/// Container version written by this codec, and the highest one it reads
pub const ZKEY_VERSION: u32 = 1;

/// Number of sections a Groth16 zkey carries
pub const ZKEY_NUM_SECTIONS: u32 = 6;

/// Protocol tag for Groth16 in section 1
pub const PROTOCOL_GROTH16: u32 = 1;

pub const SECTION_HEADER: u32 = 1;
pub const SECTION_GROTH_HEADER: u32 = 2;
pub const SECTION_IC: u32 = 3;
pub const SECTION_COEFFS: u32 = 4;
pub const SECTION_ABC: u32 = 5;
pub const SECTION_H: u32 = 6;

/// BN254 base field modulus (q), big-endian
/// q = 21888242871839275222246405745257275088696311157297823662689037894645226208583
pub const BN254_FQ_MODULUS: [u8; 32] = [
    0x30, 0x64, 0x4e, 0x72, 0xe1, 0x31, 0xa0, 0x29, 0xb8, 0x50, 0x45, 0xb6, 0x81, 0x81, 0x58, 0x5d,
    0x97, 0x81, 0x6a, 0x91, 0x68, 0x71, 0xca, 0x8d, 0x3c, 0x20, 0x8c, 0x16, 0xd8, 0x7c, 0xfd, 0x47,
];

/// BN254 scalar field modulus (r), big-endian
/// r = 21888242871839275222246405745257275088548364400416034343698204186575808495617
pub const BN254_FR_MODULUS: [u8; 32] = [
    0x30, 0x64, 0x4e, 0x72, 0xe1, 0x31, 0xa0, 0x29, 0xb8, 0x50, 0x45, 0xb6, 0x81, 0x81, 0x58, 0x5d,
    0x28, 0x33, 0xe8, 0x48, 0x79, 0xb9, 0x70, 0x91, 0x43, 0xe1, 0xf5, 0x93, 0xf0, 0x00, 0x00, 0x01,
];

/// BN254 base field modulus as an integer
pub fn bn254_q() -> BigUint {
    BigUint::from_bytes_be(&BN254_FQ_MODULUS)
}

/// BN254 scalar field modulus as an integer
pub fn bn254_r() -> BigUint {
    BigUint::from_bytes_be(&BN254_FR_MODULUS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bn254_moduli_decimal() {
        assert_eq!(
            bn254_q().to_str_radix(10),
            "21888242871839275222246405745257275088696311157297823662689037894645226208583"
        );
        assert_eq!(
            bn254_r().to_str_radix(10),
            "21888242871839275222246405745257275088548364400416034343698204186575808495617"
        );
    }
}
