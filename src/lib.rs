pub mod cli;
pub mod clipboard;
pub mod config;
pub mod emitter;
pub mod generator;
pub mod holdoff;
pub mod labels;
pub mod totp;
pub(crate) mod uri_helper;

use core::num;
use std::{fmt::Display, io, str::FromStr};

use hmac::{digest::KeyInit, Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

/// Number of digits printed for every code.
pub const CODE_DIGITS: u32 = 6;

#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    #[error("Secret decode error")]
    SecretDecode(data_encoding::DecodeError),
    #[error("Invalid digest")]
    InvalidDigest(Vec<u8>),
    #[error("Invalid hashing algorithm, found {0}. Expected one of: SHA1, SHA256 or SHA512")]
    InvalidHashingAlgorithm(String),
    #[error("The provided URI is not of a valid type, found {0}. Expected: {1}")]
    InvalidUriType(String, String),
    #[error("Could not parse the URI")]
    UriParseError(url::ParseError),
    #[error("Could not retrieve the secret from the URI")]
    UriMissingSecret,
    #[error("Could not parse an integer. Failed parsing: {1}")]
    IntegerParseError(num::ParseIntError, String),
    #[error("The period must be greater than zero")]
    ZeroPeriod,
    #[error("Codes must have between 1 and 9 digits, found {0}")]
    InvalidDigits(u32),
    #[error("Only {expected_digits}-digit codes with a {expected_period} second period are supported, found {digits} digits every {period} seconds")]
    UnsupportedParameters {
        digits: u32,
        period: u64,
        expected_digits: u32,
        expected_period: u64,
    },
    #[error("Could not run the code generator `{0}`")]
    GeneratorSpawn(String, #[source] io::Error),
    #[error("The code generator `{0}` failed with {1}: {2}")]
    GeneratorFailed(String, std::process::ExitStatus, String),
    #[error("Output from the code generator doesn't seem to be valid: {0:?}")]
    InvalidCode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Otp(#[from] OtpError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum OtpHashAlgorithm {
    #[default]
    SHA1,
    SHA256,
    SHA512,
}

impl Display for OtpHashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SHA1 => write!(f, "SHA1"),
            Self::SHA256 => write!(f, "SHA256"),
            Self::SHA512 => write!(f, "SHA512"),
        }
    }
}

impl FromStr for OtpHashAlgorithm {
    type Err = OtpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_uppercase();

        match normalized.as_str() {
            "SHA1" => Ok(Self::SHA1),
            "SHA256" => Ok(Self::SHA256),
            "SHA512" => Ok(Self::SHA512),
            _ => Err(OtpError::InvalidHashingAlgorithm(s.to_string())),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct OtpCode {
    code: u32,
    digits: u32,
}

impl OtpCode {
    pub fn integer(&self) -> u32 {
        self.code
    }

    pub fn digits(&self) -> u32 {
        self.digits
    }
}

impl Display for OtpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:0padding$}",
            self.code,
            padding = (self.digits as usize)
        )
    }
}

/// Parses the textual output of an external generator, e.g. `"012345"`.
impl FromStr for OtpCode {
    type Err = OtpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if trimmed.is_empty() || trimmed.len() > 9 || !trimmed.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(OtpError::InvalidCode(s.to_string()));
        }

        let code = u32::from_str(trimmed).map_err(|_| OtpError::InvalidCode(s.to_string()))?;

        Ok(Self {
            code,
            digits: trimmed.len() as u32,
        })
    }
}

fn sign<M: Mac + KeyInit>(key: &[u8], data: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length
    let Ok(mut mac) = <M as KeyInit>::new_from_slice(key) else {
        return Vec::new();
    };
    mac.update(data);

    mac.finalize().into_bytes().to_vec()
}

pub trait Otp {
    /// Decodes a secret (given as an RFC4648 base32-encoded ASCII string)
    /// into a byte string.
    ///
    /// Whitespace and `=` padding are ignored, lowercase letters are accepted.
    fn decode_secret(secret: &str) -> Result<Vec<u8>, OtpError> {
        let normalized: String = secret
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '=')
            .map(|c| c.to_ascii_uppercase())
            .collect();

        data_encoding::BASE32_NOPAD
            .decode(normalized.as_bytes())
            .map_err(OtpError::SecretDecode)
    }

    /// Calculates the HMAC digest for the given secret.
    fn calc_digest(&self, decoded_secret: &[u8], algorithm: OtpHashAlgorithm, data: u64) -> Vec<u8> {
        let data = data.to_be_bytes();

        match algorithm {
            OtpHashAlgorithm::SHA1 => sign::<Hmac<Sha1>>(decoded_secret, &data),
            OtpHashAlgorithm::SHA256 => sign::<Hmac<Sha256>>(decoded_secret, &data),
            OtpHashAlgorithm::SHA512 => sign::<Hmac<Sha512>>(decoded_secret, &data),
        }
    }

    /// Encodes the HMAC digest into a truncated integer.
    fn encode_digest_truncated(digest: &[u8], target_digits_count: u32) -> Result<u32, OtpError> {
        // While sometimes this is a hardcoded 19
        // the last byte tells us the offset for any algorithm
        let offset = match digest.last() {
            Some(x) => *x & 0xf,
            None => return Err(OtpError::InvalidDigest(Vec::from(digest))),
        } as usize;

        // Gets the 4 bytes that will compose the code
        let code_bytes: [u8; 4] = match digest.get(offset..offset + 4).map(<[u8; 4]>::try_from) {
            Some(Ok(x)) => x,
            _ => return Err(OtpError::InvalidDigest(Vec::from(digest))),
        };

        let code = u32::from_be_bytes(code_bytes);
        let truncation_factor = u64::pow(10, target_digits_count);

        Ok(((code & 0x7fffffff) as u64 % truncation_factor) as u32)
    }

    fn from_uri(uri: &str) -> Result<Self, OtpError>
    where
        Self: std::marker::Sized;
}
