//! Public keys, private keys and signatures: three textual/binary forms
//! (`K1`, `R1`, `WA`) sharing one wire convention — a one-byte key-type tag
//! followed by the payload (see spec.md §4.2 "Keys and signatures").

use std::fmt;

use bs58;
use ripemd::{Digest, Ripemd160};
use sha2::Sha256;
use thiserror::Error;

use crate::bytestream::{ByteStream, StreamError};

#[derive(Eq, PartialEq, Hash, Debug, Copy, Clone)]
pub enum KeyType {
    K1,
    R1,
    WebAuthn,
}

impl KeyType {
    pub fn from_index(i: u8) -> Result<Self, InvalidCryptoData> {
        match i {
            0 => Ok(Self::K1),
            1 => Ok(Self::R1),
            2 => Ok(Self::WebAuthn),
            _ => Err(InvalidCryptoData::InvalidKeyType(i)),
        }
    }

    pub fn index(&self) -> u8 {
        match self {
            Self::K1 => 0,
            Self::R1 => 1,
            Self::WebAuthn => 2,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            Self::K1 => "K1",
            Self::R1 => "R1",
            Self::WebAuthn => "WA",
        }
    }
}

#[derive(Error, Debug)]
pub enum InvalidCryptoData {
    #[error("not crypto data: {0}")]
    NotCryptoData(String),

    #[error("error while decoding base58 data")]
    Base58Error(#[from] bs58::decode::Error),

    #[error("invalid checksum for crypto data")]
    InvalidChecksum,

    #[error("invalid key type index: {0}")]
    InvalidKeyType(u8),

    #[error("binary stream error while reading crypto data")]
    StreamError(#[from] StreamError),

    #[error("WebAuthn payload exceeds the maximum representable length")]
    PayloadTooLarge,
}

pub trait CryptoDataType {
    const DISPLAY_NAME: &'static str;
    const PREFIX: &'static str;
    /// Size, in bytes, of the K1/R1 fixed-size payload.
    const DATA_SIZE: usize;
    /// Size, in bytes, of the fixed prefix of a WebAuthn payload (spec.md
    /// §4.2: 34 for public keys, 65 for signatures — not always equal to
    /// [`Self::DATA_SIZE`]).
    const WA_PREFIX_SIZE: usize = Self::DATA_SIZE;
    /// Number of trailing varuint32-length-prefixed blobs a WebAuthn
    /// payload of this type carries (1 for public keys, 2 for signatures).
    const WA_BLOB_COUNT: usize = 1;
}

/// One of `K1`/`R1` fixed-size payload, or `WebAuthn`'s fixed prefix plus
/// one or more varuint32-length-prefixed trailing blobs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CryptoPayload {
    Fixed(Vec<u8>),
    WebAuthn { prefix: Vec<u8>, blobs: Vec<Vec<u8>> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoData<T: CryptoDataType> {
    key_type: KeyType,
    payload: CryptoPayload,
    _marker: std::marker::PhantomData<T>,
}

impl<T: CryptoDataType> CryptoData<T> {
    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn payload(&self) -> &CryptoPayload {
        &self.payload
    }

    pub fn fixed_data(&self) -> Option<&[u8]> {
        match &self.payload {
            CryptoPayload::Fixed(b) => Some(b),
            CryptoPayload::WebAuthn { .. } => None,
        }
    }

    pub fn new_fixed(key_type: KeyType, data: Vec<u8>) -> Self {
        Self { key_type, payload: CryptoPayload::Fixed(data), _marker: std::marker::PhantomData }
    }

    pub fn new_webauthn(prefix: Vec<u8>, blobs: Vec<Vec<u8>>) -> Self {
        Self {
            key_type: KeyType::WebAuthn,
            payload: CryptoPayload::WebAuthn { prefix, blobs },
            _marker: std::marker::PhantomData,
        }
    }

    pub fn from_str(s: &str) -> Result<Self, InvalidCryptoData> {
        if T::PREFIX == "PUB" && s.starts_with("EOS") {
            let data = string_to_key_data(&s[3..], None)?;
            return Ok(Self::new_fixed(KeyType::K1, data));
        }
        if T::PREFIX == "PVT" && !s.contains('_') {
            let data = from_wif(s)?;
            return Ok(Self::new_fixed(KeyType::K1, data));
        }
        if let Some(rest) = s.strip_prefix(&format!("{}_K1_", T::PREFIX)) {
            let data = string_to_key_data(rest, Some("K1"))?;
            return Ok(Self::new_fixed(KeyType::K1, data));
        }
        if let Some(rest) = s.strip_prefix(&format!("{}_R1_", T::PREFIX)) {
            let data = string_to_key_data(rest, Some("R1"))?;
            return Ok(Self::new_fixed(KeyType::R1, data));
        }
        if let Some(rest) = s.strip_prefix(&format!("{}_WA_", T::PREFIX)) {
            let data = string_to_key_data(rest, Some("WA"))?;
            if data.len() < T::WA_PREFIX_SIZE {
                return Err(InvalidCryptoData::NotCryptoData(s.to_owned()));
            }
            let (prefix, tail) = data.split_at(T::WA_PREFIX_SIZE);
            let prefix = prefix.to_vec();
            let mut stream = ByteStream::from_bytes(tail.to_vec());
            let mut blobs = vec![];
            for _ in 0..T::WA_BLOB_COUNT {
                let len = stream.read_var_u32()? as usize;
                blobs.push(stream.read_bytes(len)?.to_vec());
            }
            return Ok(Self::new_webauthn(prefix, blobs));
        }
        Err(InvalidCryptoData::NotCryptoData(s.to_owned()))
    }

    pub fn to_bin(&self, stream: &mut ByteStream) {
        stream.write_byte(self.key_type.index());
        match &self.payload {
            CryptoPayload::Fixed(data) => stream.write_bytes(data),
            CryptoPayload::WebAuthn { prefix, blobs } => {
                stream.write_bytes(prefix);
                for blob in blobs {
                    stream.write_var_u32(blob.len() as u32);
                    stream.write_bytes(blob);
                }
            },
        }
    }

    pub fn from_bin(stream: &mut ByteStream) -> Result<Self, InvalidCryptoData> {
        let key_type = KeyType::from_index(stream.read_byte()?)?;
        match key_type {
            KeyType::K1 | KeyType::R1 => {
                let data = stream.read_bytes(T::DATA_SIZE)?.to_vec();
                Ok(Self::new_fixed(key_type, data))
            },
            KeyType::WebAuthn => {
                let prefix = stream.read_bytes(T::WA_PREFIX_SIZE)?.to_vec();
                let mut blobs = vec![];
                for _ in 0..T::WA_BLOB_COUNT {
                    let len = stream.read_var_u32()? as usize;
                    blobs.push(stream.read_bytes(len)?.to_vec());
                }
                Ok(Self::new_webauthn(prefix, blobs))
            },
        }
    }
}

impl<T: CryptoDataType> fmt::Display for CryptoData<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            CryptoPayload::Fixed(data) => {
                write!(f, "{}_{}", T::PREFIX, key_data_to_string(data, self.key_type.prefix()))
            },
            CryptoPayload::WebAuthn { prefix, blobs } => {
                let mut data = prefix.clone();
                for blob in blobs {
                    data.extend_from_slice(&(blob.len() as u32).to_le_bytes());
                    data.extend_from_slice(blob);
                }
                write!(f, "{}_{}", T::PREFIX, key_data_to_string(&data, "WA"))
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublicKeyType;

impl CryptoDataType for PublicKeyType {
    const DISPLAY_NAME: &'static str = "public key";
    const PREFIX: &'static str = "PUB";
    const DATA_SIZE: usize = 33;
    const WA_PREFIX_SIZE: usize = 34;
    const WA_BLOB_COUNT: usize = 1;
}

pub type PublicKey = CryptoData<PublicKeyType>;

#[derive(Debug, Clone, PartialEq)]
pub struct PrivateKeyType;

impl CryptoDataType for PrivateKeyType {
    const DISPLAY_NAME: &'static str = "private key";
    const PREFIX: &'static str = "PVT";
    const DATA_SIZE: usize = 32;
}

pub type PrivateKey = CryptoData<PrivateKeyType>;

#[derive(Debug, Clone, PartialEq)]
pub struct SignatureType;

impl CryptoDataType for SignatureType {
    const DISPLAY_NAME: &'static str = "signature";
    const PREFIX: &'static str = "SIG";
    const DATA_SIZE: usize = 65;
    const WA_PREFIX_SIZE: usize = 65;
    const WA_BLOB_COUNT: usize = 2;
}

pub type Signature = CryptoData<SignatureType>;

fn string_to_key_data(enc_data: &str, prefix: Option<&str>) -> Result<Vec<u8>, InvalidCryptoData> {
    let data = bs58::decode(enc_data).into_vec()?;
    if data.len() < 5 {
        return Err(InvalidCryptoData::NotCryptoData(format!(
            "invalid length for decoded base58 crypto data, needs to be at least 5, is {}",
            data.len()
        )));
    }

    let mut hasher = Ripemd160::new();
    hasher.update(&data[..data.len() - 4]);
    if let Some(prefix) = prefix {
        hasher.update(prefix);
    }
    let digest = hasher.finalize();

    let actual = &digest[..4];
    let expected = &data[data.len() - 4..];
    if actual != expected {
        return Err(InvalidCryptoData::InvalidChecksum);
    }

    Ok(data[..data.len() - 4].to_owned())
}

fn from_wif(enc_data: &str) -> Result<Vec<u8>, InvalidCryptoData> {
    let data = bs58::decode(enc_data).into_vec()?;
    if data.len() < 5 {
        return Err(InvalidCryptoData::NotCryptoData(format!(
            "invalid length for decoded base58 crypto data, needs to be at least 5, is {}",
            data.len()
        )));
    }

    let digest = Sha256::digest(&data[..data.len() - 4]);
    let digest2 = Sha256::digest(digest);

    let actual = &digest[..4];
    let actual2 = &digest2[..4];
    let expected = &data[data.len() - 4..];
    if actual != expected && actual2 != expected {
        return Err(InvalidCryptoData::InvalidChecksum);
    }

    Ok(data[1..data.len() - 4].to_owned())
}

fn key_data_to_string(data: &[u8], prefix: &str) -> String {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.update(prefix);
    let digest = hasher.finalize();

    let mut out = data.to_vec();
    out.extend_from_slice(&digest[..4]);

    bs58::encode(out).into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_key_roundtrip() {
        // a syntactically valid, but not cryptographically meaningful, K1 key
        let data = vec![2u8; 33];
        let key = PublicKey::new_fixed(KeyType::K1, data.clone());
        let text = key.to_string();
        let parsed = PublicKey::from_str(&text).unwrap();
        assert_eq!(parsed.fixed_data().unwrap(), data.as_slice());
        assert_eq!(parsed.key_type(), KeyType::K1);
    }

    #[test]
    fn binary_roundtrip() {
        let key = PublicKey::new_fixed(KeyType::K1, vec![3u8; 33]);
        let mut s = ByteStream::new();
        key.to_bin(&mut s);
        let mut r = ByteStream::from_bytes(s.into_bytes());
        let decoded = PublicKey::from_bin(&mut r).unwrap();
        assert_eq!(decoded, key);
    }

    #[test]
    fn webauthn_signature_binary_roundtrip() {
        let sig = Signature::new_webauthn(vec![9u8; 65], vec![vec![1, 2, 3], vec![4, 5]]);
        let mut s = ByteStream::new();
        sig.to_bin(&mut s);
        let mut r = ByteStream::from_bytes(s.into_bytes());
        let decoded = Signature::from_bin(&mut r).unwrap();
        assert_eq!(decoded, sig);
    }
}
