/*!
 * Expected content hashes and hashing of downloaded files.
 */

use crate::error::FetchError;
use sha1::Sha1;
use sha2::Digest;
use sha2::Sha256;
use std::fmt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

const BUF_SIZE: usize = 64 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha1,
    Sha256,
}

/*
 * The algorithm is inferred from nothing more than the number of hex digits
 * the caller gave us.  If another algorithm ever produces 40 or 64 digits it
 * will be mistaken for one of these.
 */
const ALGORITHMS_BY_HEX_LEN: &[(usize, DigestAlgorithm)] =
    &[(40, DigestAlgorithm::Sha1), (64, DigestAlgorithm::Sha256)];

impl DigestAlgorithm {
    pub fn from_hex_len(len: usize) -> Option<DigestAlgorithm> {
        ALGORITHMS_BY_HEX_LEN
            .iter()
            .find(|(l, _)| *l == len)
            .map(|(_, algorithm)| *algorithm)
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestAlgorithm::Sha1 => write!(f, "sha1"),
            DigestAlgorithm::Sha256 => write!(f, "sha256"),
        }
    }
}

/** A hash the downloaded bytes must match, normalized to lowercase hex. */
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpectedDigest {
    algorithm: DigestAlgorithm,
    hex: String,
}

impl ExpectedDigest {
    pub fn parse(value: &str) -> Result<ExpectedDigest, FetchError> {
        let algorithm = DigestAlgorithm::from_hex_len(value.len())
            .ok_or_else(|| FetchError::InvalidHash(value.to_string()))?;
        if !value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(FetchError::InvalidHash(value.to_string()));
        }
        Ok(ExpectedDigest {
            algorithm,
            hex: value.to_ascii_lowercase(),
        })
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn hex(&self) -> &str {
        &self.hex
    }

    /**
     * Hashes the file at `path` and compares it against this digest.  Returns
     * the computed hash when they match.
     */
    pub async fn verify(&self, path: &Path) -> Result<String, FetchError> {
        let actual = hash_file(path, self.algorithm).await?;
        if actual != self.hex {
            return Err(FetchError::HashMismatch {
                expected: self.hex.clone(),
                actual,
            });
        }
        Ok(actual)
    }
}

/** Returns the lowercase hex digest of the contents of `path`. */
pub async fn hash_file(
    path: &Path,
    algorithm: DigestAlgorithm,
) -> Result<String, FetchError> {
    match algorithm {
        DigestAlgorithm::Sha1 => hash_file_with::<Sha1>(path).await,
        DigestAlgorithm::Sha256 => hash_file_with::<Sha256>(path).await,
    }
}

async fn hash_file_with<D: Digest>(path: &Path) -> Result<String, FetchError> {
    let hashing_error = |source| FetchError::Hashing {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).await.map_err(hashing_error)?;
    let mut hasher = D::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = file.read(&mut buf).await.map_err(hashing_error)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
