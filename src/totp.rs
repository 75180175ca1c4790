use crate::{uri_helper, Otp, OtpCode, OtpError, OtpHashAlgorithm, CODE_DIGITS};

/// Length of a TOTP window in seconds.
pub const DEFAULT_PERIOD: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct Totp {
    pub(crate) secret: String,
    pub(crate) algorithm: OtpHashAlgorithm,
    pub(crate) period: u64,
    pub(crate) digits: u32,
}

impl Otp for Totp {
    fn from_uri(uri: &str) -> Result<Self, OtpError> {
        uri_helper::totp_from_uri(uri)
    }
}

impl Totp {
    /// Creates the config for the [Time-based One-time Password Algorithm](http://en.wikipedia.org/wiki/Time-based_One-time_Password_Algorithm)
    /// (TOTP) given an RFC4648 base32 encoded secret.
    ///
    /// Obs.: This method defaults to the SHA1 hash, a 6-digit code and a period of 30 seconds
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            algorithm: OtpHashAlgorithm::SHA1,
            period: DEFAULT_PERIOD,
            digits: CODE_DIGITS,
        }
    }

    /// Builds a TOTP from a config value, which is either a bare base32
    /// secret or an `otpauth://totp/` URI.
    ///
    /// URIs must keep the default 6 digits and 30 second period, the only
    /// window the holdoff tracks.
    pub fn from_secret(secret: &str) -> Result<Self, OtpError> {
        if !uri_helper::is_otpauth_uri(secret) {
            return Ok(Self::new(secret.to_string()));
        }

        let totp = Self::from_uri(secret)?;
        if totp.digits != CODE_DIGITS || totp.period != DEFAULT_PERIOD {
            return Err(OtpError::UnsupportedParameters {
                digits: totp.digits,
                period: totp.period,
                expected_digits: CODE_DIGITS,
                expected_period: DEFAULT_PERIOD,
            });
        }

        Ok(totp)
    }

    ///  Sets hashing algorithm
    pub fn with_algorithm(&mut self, algorithm: OtpHashAlgorithm) -> &mut Self {
        self.algorithm = algorithm;

        self
    }

    ///  Sets the period in seconds
    pub fn with_period(&mut self, period: u64) -> &mut Self {
        self.period = period;

        self
    }

    ///  Sets the number of digits to generate
    pub fn with_digits(&mut self, digits: u32) -> &mut Self {
        self.digits = digits;

        self
    }

    /// Generates a Totp from the provided seconds since the UNIX epoch
    /// truncated to the specified number of digits
    pub fn generate(&self, seconds_since_epoch: u64) -> Result<OtpCode, OtpError> {
        if self.period == 0 {
            return Err(OtpError::ZeroPeriod);
        }

        let calculated_time = seconds_since_epoch / self.period;

        let decoded = Self::decode_secret(self.secret.as_str())?;
        let digest = self.calc_digest(decoded.as_slice(), self.algorithm, calculated_time);

        let code = Self::encode_digest_truncated(digest.as_ref(), self.digits)?;

        Ok(OtpCode {
            code,
            digits: self.digits,
        })
    }

    /// Seconds left before the code generated at `seconds_since_epoch` expires,
    /// in `1..=period`.
    pub fn remaining_seconds(&self, seconds_since_epoch: u64) -> u64 {
        crate::holdoff::remaining_seconds(seconds_since_epoch, self.period)
    }
}
