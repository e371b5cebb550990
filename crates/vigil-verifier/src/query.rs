use std::fmt;

use prost::Message;
use serde::{Deserialize, Serialize};
use vigil_core::{CircuitKind, U256};

use crate::error::VerificationError;

/// Maximum number of query operands.
pub const MAX_QUERY_VALUES: usize = 64;

/// Comparator codes understood by the credential circuits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Noop,
    Eq,
    Lt,
    Gt,
    In,
    Nin,
    Ne,
    Lte,
    Gte,
    Between,
    #[serde(rename = "NONBETWEEN")]
    NonBetween,
    Exists,
    #[serde(rename = "SD")]
    SelectiveDisclosure,
    Nullify,
}

impl Operator {
    pub fn from_code(code: u64) -> Option<Self> {
        let op = match code {
            0 => Self::Noop,
            1 => Self::Eq,
            2 => Self::Lt,
            3 => Self::Gt,
            4 => Self::In,
            5 => Self::Nin,
            6 => Self::Ne,
            7 => Self::Lte,
            8 => Self::Gte,
            9 => Self::Between,
            10 => Self::NonBetween,
            11 => Self::Exists,
            16 => Self::SelectiveDisclosure,
            17 => Self::Nullify,
            _ => return None,
        };
        Some(op)
    }

    pub fn code(&self) -> u64 {
        match self {
            Self::Noop => 0,
            Self::Eq => 1,
            Self::Lt => 2,
            Self::Gt => 3,
            Self::In => 4,
            Self::Nin => 5,
            Self::Ne => 6,
            Self::Lte => 7,
            Self::Gte => 8,
            Self::Between => 9,
            Self::NonBetween => 10,
            Self::Exists => 11,
            Self::SelectiveDisclosure => 16,
            Self::Nullify => 17,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Noop => "NOOP",
            Self::Eq => "EQ",
            Self::Lt => "LT",
            Self::Gt => "GT",
            Self::In => "IN",
            Self::Nin => "NIN",
            Self::Ne => "NE",
            Self::Lte => "LTE",
            Self::Gte => "GTE",
            Self::Between => "BETWEEN",
            Self::NonBetween => "NONBETWEEN",
            Self::Exists => "EXISTS",
            Self::SelectiveDisclosure => "SD",
            Self::Nullify => "NULLIFY",
        };
        write!(f, "{}", name)
    }
}

/// Query fields only V3 circuits understand. Zero means "unconstrained".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V3QueryFields {
    #[serde(default)]
    pub group_id: u64,
    #[serde(default)]
    pub nullifier_session_id: U256,
    #[serde(default)]
    pub proof_type: u64,
    #[serde(default)]
    pub verifier_id: U256,
}

impl V3QueryFields {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// The relying party's claim: what the proof must show and under which
/// constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomicQuery {
    pub schema: U256,
    /// Zero for non-merklized credentials.
    #[serde(default)]
    pub claim_path_key: U256,
    pub operator: Operator,
    #[serde(default)]
    pub slot_index: u64,
    #[serde(default)]
    pub value: Vec<U256>,
    pub query_hash: U256,
    /// Empty accepts any issuer.
    #[serde(default)]
    pub allowed_issuers: Vec<U256>,
    pub circuit_ids: Vec<String>,
    #[serde(default)]
    pub skip_claim_revocation_check: bool,
    #[serde(default)]
    pub claim_path_not_exists: bool,
    #[serde(default)]
    pub v3: V3QueryFields,
}

impl AtomicQuery {
    /// Decode the protobuf wire form.
    pub fn decode(bytes: &[u8]) -> Result<Self, VerificationError> {
        let msg = AtomicQueryMessage::decode(bytes)
            .map_err(|e| VerificationError::MalformedQuery(e.to_string()))?;
        Self::try_from(msg)
    }

    /// Encode to the protobuf wire form.
    pub fn encode(&self) -> Vec<u8> {
        AtomicQueryMessage::from(self).encode_to_vec()
    }

    /// The single circuit this query targets.
    pub fn circuit_id(&self) -> Result<&str, VerificationError> {
        match self.circuit_ids.as_slice() {
            [id] => Ok(id.as_str()),
            ids => Err(VerificationError::UnsupportedCircuit(format!(
                "expected exactly one circuit id, got {}",
                ids.len()
            ))),
        }
    }

    /// Reject V3 constraints aimed at a circuit that cannot enforce them.
    pub fn check_kind(&self, kind: CircuitKind) -> Result<(), VerificationError> {
        if !kind.is_v3() && !self.v3.is_empty() {
            return Err(VerificationError::MalformedQuery(
                "V3 query fields set for a common circuit".into(),
            ));
        }
        Ok(())
    }
}

impl TryFrom<AtomicQueryMessage> for AtomicQuery {
    type Error = VerificationError;

    fn try_from(msg: AtomicQueryMessage) -> Result<Self, Self::Error> {
        let operator = Operator::from_code(msg.operator).ok_or_else(|| {
            VerificationError::MalformedQuery(format!("unknown operator code {}", msg.operator))
        })?;
        if msg.value.len() > MAX_QUERY_VALUES {
            return Err(VerificationError::MalformedQuery(format!(
                "{} values exceed the limit of {}",
                msg.value.len(),
                MAX_QUERY_VALUES
            )));
        }
        let claim_path_not_exists = match msg.claim_path_not_exists {
            0 => false,
            1 => true,
            other => {
                return Err(VerificationError::MalformedQuery(format!(
                    "claimPathNotExists must be 0 or 1, got {}",
                    other
                )))
            }
        };
        let v3 = match msg.v3 {
            Some(ext) => V3QueryFields {
                group_id: ext.group_id,
                nullifier_session_id: number("nullifierSessionID", &ext.nullifier_session_id)?,
                proof_type: ext.proof_type,
                verifier_id: number("verifierID", &ext.verifier_id)?,
            },
            None => V3QueryFields::default(),
        };

        Ok(Self {
            schema: number("schema", &msg.schema)?,
            claim_path_key: number("claimPathKey", &msg.claim_path_key)?,
            operator,
            slot_index: msg.slot_index,
            value: msg
                .value
                .iter()
                .map(|v| number("value", v))
                .collect::<Result<_, _>>()?,
            query_hash: number("queryHash", &msg.query_hash)?,
            allowed_issuers: msg
                .allowed_issuers
                .iter()
                .map(|v| number("allowedIssuers", v))
                .collect::<Result<_, _>>()?,
            circuit_ids: msg.circuit_ids,
            skip_claim_revocation_check: msg.skip_claim_revocation_check,
            claim_path_not_exists,
            v3,
        })
    }
}

impl From<&AtomicQuery> for AtomicQueryMessage {
    fn from(query: &AtomicQuery) -> Self {
        let v3 = (!query.v3.is_empty()).then(|| V3QueryExtension {
            group_id: query.v3.group_id,
            nullifier_session_id: bytes_of(query.v3.nullifier_session_id),
            proof_type: query.v3.proof_type,
            verifier_id: bytes_of(query.v3.verifier_id),
        });
        Self {
            schema: bytes_of(query.schema),
            claim_path_key: bytes_of(query.claim_path_key),
            operator: query.operator.code(),
            slot_index: query.slot_index,
            value: query.value.iter().copied().map(bytes_of).collect(),
            query_hash: bytes_of(query.query_hash),
            allowed_issuers: query.allowed_issuers.iter().copied().map(bytes_of).collect(),
            circuit_ids: query.circuit_ids.clone(),
            skip_claim_revocation_check: query.skip_claim_revocation_check,
            claim_path_not_exists: u64::from(query.claim_path_not_exists),
            v3,
        }
    }
}

/// Big-endian bytes with leading zeros stripped.
fn bytes_of(value: U256) -> Vec<u8> {
    value.to_be_bytes_trimmed_vec()
}

fn number(field: &str, bytes: &[u8]) -> Result<U256, VerificationError> {
    U256::try_from_be_slice(bytes).ok_or_else(|| {
        VerificationError::MalformedQuery(format!(
            "{} is {} bytes, at most 32 allowed",
            field,
            bytes.len()
        ))
    })
}

/// Protobuf wire form of [`AtomicQuery`]. Numbers travel as big-endian byte
/// strings of at most 32 bytes.
#[derive(Clone, PartialEq, Message)]
pub struct AtomicQueryMessage {
    #[prost(bytes = "vec", tag = "1")]
    pub schema: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub claim_path_key: Vec<u8>,
    #[prost(uint64, tag = "3")]
    pub operator: u64,
    #[prost(uint64, tag = "4")]
    pub slot_index: u64,
    #[prost(bytes = "vec", repeated, tag = "5")]
    pub value: Vec<Vec<u8>>,
    #[prost(bytes = "vec", tag = "6")]
    pub query_hash: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "7")]
    pub allowed_issuers: Vec<Vec<u8>>,
    #[prost(string, repeated, tag = "8")]
    pub circuit_ids: Vec<String>,
    #[prost(bool, tag = "9")]
    pub skip_claim_revocation_check: bool,
    #[prost(uint64, tag = "10")]
    pub claim_path_not_exists: u64,
    #[prost(message, optional, tag = "11")]
    pub v3: Option<V3QueryExtension>,
}

/// V3 extension of [`AtomicQueryMessage`].
#[derive(Clone, PartialEq, Message)]
pub struct V3QueryExtension {
    #[prost(uint64, tag = "1")]
    pub group_id: u64,
    #[prost(bytes = "vec", tag = "2")]
    pub nullifier_session_id: Vec<u8>,
    #[prost(uint64, tag = "3")]
    pub proof_type: u64,
    #[prost(bytes = "vec", tag = "4")]
    pub verifier_id: Vec<u8>,
}
