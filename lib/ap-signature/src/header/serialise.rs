use super::SignatureHeader;
use std::fmt;

impl fmt::Display for SignatureHeader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "keyId=\"{}\",algorithm=\"{}\",headers=\"{}\",signature=\"{}\"",
            self.key_id,
            self.algorithm.signature_algorithm(),
            self.headers.join(" "),
            self.signature,
        )
    }
}
