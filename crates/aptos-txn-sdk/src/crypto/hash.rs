use sha3::{Digest, Sha3_256};

/// SHA3-256 of `data`.
pub fn sha3_256(data: &[u8]) -> [u8; 32] {
    Sha3_256::digest(data).into()
}

/// SHA3-256 over the concatenation of `items`, without allocating it.
pub fn sha3_256_of<I, T>(items: I) -> [u8; 32]
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut hasher = Sha3_256::new();
    for item in items {
        hasher.update(item.as_ref());
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha3_256_of_matches_concatenation() {
        assert_eq!(
            sha3_256_of([&b"APTOS::"[..], &b"RawTransaction"[..]]),
            sha3_256(b"APTOS::RawTransaction")
        );
    }
}
