//! Bit-exact codec for Groth16 zkey proving-key containers
//!
//! A zkey is a section container (`b"zkey"`, version 1) with six sections:
//! protocol tag, Groth16 parameters, IC points, sparse A/B coefficients,
//! per-variable A/B1/B2/C points and the H basis. Every field element is
//! stored as a Montgomery residue, little-endian, sized to its modulus.
//!
//! # Example
//!
//! ```ignore
//! use zkey_core::zkey;
//!
//! let key = zkey::read("circuit_final.zkey")?;
//! println!("nVars = {}, nPublic = {}", key.n_vars, key.n_public);
//! zkey::write("copy.zkey", &key)?;
//! ```

pub mod binfile;
pub mod constants;
pub mod debug;
pub mod errors;
pub mod field;
pub mod header;
pub mod key;
pub mod point;
pub mod sections;
pub mod types;
pub mod zkey;

pub use errors::{Result, ZKeyError};
pub use field::{n8_for, FieldCodec};
pub use key::{Coefficient, Matrix, Protocol, ProvingKey};
pub use point::PointCodec;
pub use types::{FieldElement, Fq2, G1Affine, G2Affine};
pub use zkey::WriteOptions;
