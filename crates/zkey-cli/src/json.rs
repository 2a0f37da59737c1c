//! snarkjs-style JSON view of a proving key
//!
//! Field elements are decimal strings. Points keep their projective `z`, so
//! infinity is `["0", "1", "0"]`.

use anyhow::{anyhow, bail, Context, Result};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use zkey_core::{n8_for, Coefficient, Fq2, G1Affine, G2Affine, Matrix, Protocol, ProvingKey};

pub type G1Json = [String; 3];
pub type G2Json = [[String; 2]; 3];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoefJson {
    pub matrix: u32,
    pub constraint: u32,
    pub signal: u32,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZKeyJson {
    pub protocol: String,
    pub n8q: usize,
    pub q: String,
    pub n8r: usize,
    pub r: String,
    #[serde(rename = "nVars")]
    pub n_vars: u32,
    #[serde(rename = "nPublic")]
    pub n_public: u32,
    #[serde(rename = "domainSize")]
    pub domain_size: u32,

    #[serde(alias = "vk_alpha_1")]
    pub vk_alfa_1: G1Json,
    pub vk_beta_1: G1Json,
    pub vk_delta_1: G1Json,
    pub vk_beta_2: G2Json,
    pub vk_gamma_2: G2Json,
    pub vk_delta_2: G2Json,

    #[serde(rename = "IC")]
    pub ic: Vec<G1Json>,
    pub ccoefs: Vec<CoefJson>,
    #[serde(rename = "A")]
    pub a: Vec<G1Json>,
    #[serde(rename = "B1")]
    pub b1: Vec<G1Json>,
    #[serde(rename = "B2")]
    pub b2: Vec<G2Json>,
    #[serde(rename = "C")]
    pub c: Vec<G1Json>,
    #[serde(rename = "hExps")]
    pub h_exps: Vec<G1Json>,
}

fn g1_json(p: &G1Affine) -> G1Json {
    [p.x.to_string(), p.y.to_string(), p.z.to_string()]
}

fn fq2_json(x: &Fq2) -> [String; 2] {
    [x.c0.to_string(), x.c1.to_string()]
}

fn g2_json(p: &G2Affine) -> G2Json {
    [fq2_json(&p.x), fq2_json(&p.y), fq2_json(&p.z)]
}

impl From<&ProvingKey> for ZKeyJson {
    fn from(key: &ProvingKey) -> Self {
        Self {
            protocol: key.protocol.name().to_string(),
            n8q: key.n8q(),
            q: key.q.to_string(),
            n8r: key.n8r(),
            r: key.r.to_string(),
            n_vars: key.n_vars,
            n_public: key.n_public,
            domain_size: key.domain_size,
            vk_alfa_1: g1_json(&key.alfa1),
            vk_beta_1: g1_json(&key.beta1),
            vk_delta_1: g1_json(&key.delta1),
            vk_beta_2: g2_json(&key.beta2),
            vk_gamma_2: g2_json(&key.gamma2),
            vk_delta_2: g2_json(&key.delta2),
            ic: key.ic.iter().map(g1_json).collect(),
            ccoefs: key
                .ccoefs
                .iter()
                .map(|c| CoefJson {
                    matrix: c.matrix.id(),
                    constraint: c.constraint,
                    signal: c.signal,
                    value: c.value.to_string(),
                })
                .collect(),
            a: key.a.iter().map(g1_json).collect(),
            b1: key.b1.iter().map(g1_json).collect(),
            b2: key.b2.iter().map(g2_json).collect(),
            c: key.c.iter().map(g1_json).collect(),
            h_exps: key.h_exps.iter().map(g1_json).collect(),
        }
    }
}

fn parse_fe(s: &str) -> Result<BigUint> {
    BigUint::parse_bytes(s.trim().as_bytes(), 10)
        .ok_or_else(|| anyhow!("not a decimal field element: {:?}", s))
}

fn parse_g1(p: &G1Json) -> Result<G1Affine> {
    Ok(G1Affine {
        x: parse_fe(&p[0])?,
        y: parse_fe(&p[1])?,
        z: parse_fe(&p[2])?,
    })
}

fn parse_fq2(x: &[String; 2]) -> Result<Fq2> {
    Ok(Fq2::new(parse_fe(&x[0])?, parse_fe(&x[1])?))
}

fn parse_g2(p: &G2Json) -> Result<G2Affine> {
    Ok(G2Affine {
        x: parse_fq2(&p[0])?,
        y: parse_fq2(&p[1])?,
        z: parse_fq2(&p[2])?,
    })
}

fn parse_g1s(name: &str, points: &[G1Json]) -> Result<Vec<G1Affine>> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| parse_g1(p).with_context(|| format!("{}[{}]", name, i)))
        .collect()
}

fn parse_g2s(name: &str, points: &[G2Json]) -> Result<Vec<G2Affine>> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| parse_g2(p).with_context(|| format!("{}[{}]", name, i)))
        .collect()
}

impl TryFrom<&ZKeyJson> for ProvingKey {
    type Error = anyhow::Error;

    fn try_from(json: &ZKeyJson) -> Result<Self> {
        let protocol = match json.protocol.as_str() {
            "groth16" => Protocol::Groth16,
            other => bail!("unsupported protocol {:?}", other),
        };
        let q = parse_fe(&json.q).context("q")?;
        let r = parse_fe(&json.r).context("r")?;
        if n8_for(&q) != json.n8q {
            bail!("n8q is {} but q needs {} bytes", json.n8q, n8_for(&q));
        }
        if n8_for(&r) != json.n8r {
            bail!("n8r is {} but r needs {} bytes", json.n8r, n8_for(&r));
        }

        let ccoefs = json
            .ccoefs
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let matrix = Matrix::try_from(c.matrix)
                    .map_err(|m| anyhow!("ccoefs[{}]: unknown matrix {}", i, m))?;
                Ok(Coefficient {
                    matrix,
                    constraint: c.constraint,
                    signal: c.signal,
                    value: parse_fe(&c.value).with_context(|| format!("ccoefs[{}]", i))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ProvingKey {
            protocol,
            q,
            r,
            n_vars: json.n_vars,
            n_public: json.n_public,
            domain_size: json.domain_size,
            alfa1: parse_g1(&json.vk_alfa_1).context("vk_alfa_1")?,
            beta1: parse_g1(&json.vk_beta_1).context("vk_beta_1")?,
            delta1: parse_g1(&json.vk_delta_1).context("vk_delta_1")?,
            beta2: parse_g2(&json.vk_beta_2).context("vk_beta_2")?,
            gamma2: parse_g2(&json.vk_gamma_2).context("vk_gamma_2")?,
            delta2: parse_g2(&json.vk_delta_2).context("vk_delta_2")?,
            ic: parse_g1s("IC", &json.ic)?,
            ccoefs,
            a: parse_g1s("A", &json.a)?,
            b1: parse_g1s("B1", &json.b1)?,
            b2: parse_g2s("B2", &json.b2)?,
            c: parse_g1s("C", &json.c)?,
            h_exps: parse_g1s("hExps", &json.h_exps)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkey_core::constants::{bn254_q, bn254_r};

    fn key() -> ProvingKey {
        let g1 = |i: u32| G1Affine::new(BigUint::from(i), BigUint::from(i + 1));
        let g2 = |i: u32| {
            G2Affine::new(
                Fq2::new(BigUint::from(i), BigUint::from(i + 1)),
                Fq2::new(BigUint::from(i + 2), BigUint::from(i + 3)),
            )
        };
        ProvingKey {
            protocol: Protocol::Groth16,
            q: bn254_q(),
            r: bn254_r(),
            n_vars: 3,
            n_public: 1,
            domain_size: 2,
            alfa1: g1(1),
            beta1: g1(2),
            delta1: g1(3),
            beta2: g2(4),
            gamma2: G2Affine::infinity(),
            delta2: g2(6),
            ic: vec![g1(7), g1(8)],
            ccoefs: vec![Coefficient {
                matrix: Matrix::B,
                constraint: 1,
                signal: 2,
                value: &bn254_r() - 1u32,
            }],
            a: vec![g1(10), g1(11), g1(12)],
            b1: vec![g1(13), G1Affine::infinity(), g1(15)],
            b2: vec![g2(16), g2(17), g2(18)],
            c: vec![G1Affine::infinity(), G1Affine::infinity(), g1(21)],
            h_exps: vec![g1(22), g1(23)],
        }
    }

    #[test]
    fn test_json_roundtrip() {
        let key = key();
        let text = serde_json::to_string(&ZKeyJson::from(&key)).unwrap();
        let json: ZKeyJson = serde_json::from_str(&text).unwrap();
        assert_eq!(ProvingKey::try_from(&json).unwrap(), key);
    }

    #[test]
    fn test_snarkjs_field_names() {
        let value = serde_json::to_value(ZKeyJson::from(&key())).unwrap();
        for name in ["nVars", "nPublic", "domainSize", "vk_alfa_1", "IC", "hExps", "B2"] {
            assert!(value.get(name).is_some(), "missing {}", name);
        }
        assert_eq!(value["vk_gamma_2"][2], serde_json::json!(["0", "0"]));
        assert_eq!(value["C"][0], serde_json::json!(["0", "1", "0"]));
        assert_eq!(value["n8q"], 32);
    }

    #[test]
    fn test_rejects_bad_input() {
        let mut json = ZKeyJson::from(&key());
        json.n8q = 48;
        assert!(ProvingKey::try_from(&json).is_err());

        let mut json = ZKeyJson::from(&key());
        json.ccoefs[0].matrix = 2;
        assert!(ProvingKey::try_from(&json).is_err());

        let mut json = ZKeyJson::from(&key());
        json.ic[1][0] = "0x12".to_string();
        assert!(ProvingKey::try_from(&json).is_err());

        let mut json = ZKeyJson::from(&key());
        json.protocol = "plonk".to_string();
        assert!(ProvingKey::try_from(&json).is_err());
    }
}
