use std::{borrow::Cow, str::FromStr};

use crate::{totp::Totp, OtpError, OtpHashAlgorithm};

const OTPAUTH_SCHEME: &str = "otpauth";
const TOTP_TYPE: &str = "totp";

const URI_SECRET_QUERY: &str = "secret";
const URI_HASH_QUERY: &str = "algorithm";
const URI_PERIOD_QUERY: &str = "period";
const URI_DIGITS_QUERY: &str = "digits";

pub fn is_otpauth_uri(value: &str) -> bool {
    value
        .trim_start()
        .get(..OTPAUTH_SCHEME.len() + 3)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("otpauth://"))
}

/// Reads a [Key Uri](https://github.com/google/google-authenticator/wiki/Key-Uri-Format)
/// of type `totp`, falling back to the usual defaults for the missing parameters.
pub fn totp_from_uri(uri: &str) -> Result<Totp, OtpError> {
    let uri = url::Url::parse(uri.trim()).map_err(OtpError::UriParseError)?;

    let domain = uri.host_str();
    if domain.is_none() || domain.is_some_and(|d| !d.eq_ignore_ascii_case(TOTP_TYPE)) {
        return Err(OtpError::InvalidUriType(
            domain.unwrap_or("None").into(),
            TOTP_TYPE.into(),
        ));
    }

    let mut totp = Totp::new(String::new());

    for params in uri.query_pairs() {
        match params.0 {
            Cow::Borrowed(URI_SECRET_QUERY) => totp.secret = params.1.to_string(),
            Cow::Borrowed(URI_HASH_QUERY) => {
                totp.algorithm = OtpHashAlgorithm::from_str(params.1.as_ref())?
            }
            Cow::Borrowed(URI_PERIOD_QUERY) => {
                totp.period = u64::from_str(params.1.as_ref())
                    .map_err(|e| OtpError::IntegerParseError(e, URI_PERIOD_QUERY.into()))?
            }
            Cow::Borrowed(URI_DIGITS_QUERY) => {
                totp.digits = u32::from_str(params.1.as_ref())
                    .map_err(|e| OtpError::IntegerParseError(e, URI_DIGITS_QUERY.into()))?
            }
            _ => (),
        }
    }

    if totp.secret.is_empty() {
        return Err(OtpError::UriMissingSecret);
    }

    if totp.period == 0 {
        return Err(OtpError::ZeroPeriod);
    }

    // A u32 code holds at most 9 decimal digits
    if !(1..=9).contains(&totp.digits) {
        return Err(OtpError::InvalidDigits(totp.digits));
    }

    Ok(totp)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{is_otpauth_uri, totp_from_uri};
    use crate::{OtpError, OtpHashAlgorithm};

    #[rstest]
    #[case("otpauth://totp/x?secret=ABC", true)]
    #[case("  OTPAUTH://totp/x?secret=ABC", true)]
    #[case("GEZDGNBVGY3TQOJQ", false)]
    #[case("otp", false)]
    fn detects_uris(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(expected, is_otpauth_uri(value));
    }

    #[rstest]
    fn defaults_missing_parameters() {
        let totp =
            totp_from_uri("otpauth://totp/john?secret=HXDMVJECJJWSRB3HWIZR4IFUGFTMXBOZ").unwrap();

        assert_eq!("HXDMVJECJJWSRB3HWIZR4IFUGFTMXBOZ", totp.secret);
        assert_eq!(OtpHashAlgorithm::SHA1, totp.algorithm);
        assert_eq!(30, totp.period);
        assert_eq!(6, totp.digits);
    }

    #[rstest]
    fn rejects_hotp_uri() {
        let result = totp_from_uri(
            "otpauth://hotp/john?secret=HXDMVJECJJWSRB3HWIZR4IFUGFTMXBOZ&counter=1",
        );

        assert!(matches!(result, Err(OtpError::InvalidUriType(found, _)) if found == "hotp"));
    }

    #[rstest]
    #[case("otpauth://totp/john?issuer=ACME")]
    #[case("otpauth://totp/john?secret=")]
    fn rejects_missing_secret(#[case] uri: &str) {
        assert!(matches!(totp_from_uri(uri), Err(OtpError::UriMissingSecret)));
    }

    #[rstest]
    #[case("otpauth://totp/john?secret=ABC&period=0")]
    #[case("otpauth://totp/john?secret=ABC&period=soon")]
    #[case("otpauth://totp/john?secret=ABC&digits=12")]
    #[case("otpauth://totp/john?secret=ABC&algorithm=MD5")]
    fn rejects_bad_parameters(#[case] uri: &str) {
        assert!(totp_from_uri(uri).is_err());
    }
}
