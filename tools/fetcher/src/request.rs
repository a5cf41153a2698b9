/*!
 * Turns command-line arguments into a DownloadRequest.  The forms are told
 * apart purely by how many arguments there are, plus a trailing "-" that
 * selects streaming to stdout.
 */

use crate::digest::ExpectedDigest;
use crate::error::FetchError;

pub const STREAM_SENTINEL: &str = "-";

pub const USAGE_MESSAGE: &str = "\
usage: fetcher BUCKET KEY
       fetcher BUCKET KEY HASH
       fetcher BUCKET KEY VERSION_ID HASH
       fetcher BUCKET KEY [VERSION_ID] -

HASH is a 40-digit SHA-1 or 64-digit SHA-256 hex digest.  A trailing \"-\"
writes the object to stdout without verifying it.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectId {
    pub bucket: String,
    pub key: String,
    pub version: Option<String>,
}

impl ObjectId {
    /**
     * Returns the local file name for this object: the last segment of the
     * key, ignoring trailing slashes.
     */
    pub fn file_name(&self) -> Result<&str, FetchError> {
        let name = self.key.trim_end_matches('/').rsplit('/').next();
        match name {
            Some(name) if !name.is_empty() && name != "." && name != ".." => {
                Ok(name)
            }
            _ => Err(FetchError::Usage(format!(
                "cannot derive a file name from key {:?}",
                self.key
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /** write the object's bytes to stdout, unverified */
    Stream,
    /** write to a temporary file, optionally verify, then rename */
    File { expected: Option<ExpectedDigest> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadRequest {
    pub object: ObjectId,
    pub target: Target,
}

impl DownloadRequest {
    pub fn is_stream(&self) -> bool {
        self.target == Target::Stream
    }
}

/**
 * Reports whether `args` select streaming.  This only looks at the trailing
 * sentinel, so it can be used before the rest of the arguments are checked.
 */
pub fn is_stream_args(args: &[String]) -> bool {
    args.last().map(String::as_str) == Some(STREAM_SENTINEL)
}

/** Parses arguments (not including the program name). */
pub fn parse_args(args: &[String]) -> Result<DownloadRequest, FetchError> {
    let stream = is_stream_args(args);
    let positional = if stream { &args[..args.len() - 1] } else { args };

    if positional.len() < 2 {
        return Err(usage());
    }

    let bucket = positional[0].clone();
    let key = positional[1].clone();
    let (version, hash) = match &positional[2..] {
        [] => (None, None),
        [only] if stream => (Some(only), None),
        [hash] => (None, Some(hash)),
        [version, hash] => (Some(version), Some(hash)),
        _ => return Err(usage()),
    };

    let object = ObjectId {
        bucket,
        key,
        version: version.filter(|v| !v.is_empty()).cloned(),
    };

    let target = if stream {
        if let Some(hash) = hash {
            log::debug!("ignoring hash {:?} when streaming", hash);
        }
        Target::Stream
    } else {
        object.file_name()?;
        let expected = hash.map(|h| ExpectedDigest::parse(h)).transpose()?;
        Target::File { expected }
    };

    Ok(DownloadRequest { object, target })
}

fn usage() -> FetchError {
    FetchError::Usage(format!(
        "bucket and item names required\n{}",
        USAGE_MESSAGE
    ))
}

#[cfg(test)]
mod test {
    use super::is_stream_args;
    use super::parse_args;
    use super::ObjectId;
    use super::Target;
    use crate::digest::DigestAlgorithm;
    use crate::error::FetchError;

    const SHA256: &str =
        "8b7887ddda0ccbd2b0d087439e62cba52ca7032abb695956b7dcd43171e8468b";
    const SHA1: &str = "6179a86c275ada44d15a32f8e39c92e5fae806d4";

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_bucket_key() {
        let request = parse_args(&args(&["bkt", "a/b/c.tar"])).unwrap();
        assert_eq!(request.object.bucket, "bkt");
        assert_eq!(request.object.key, "a/b/c.tar");
        assert_eq!(request.object.version, None);
        assert_eq!(request.target, Target::File { expected: None });
        assert_eq!(request.object.file_name().unwrap(), "c.tar");
    }

    #[test]
    fn test_hash_forms() {
        let request = parse_args(&args(&["bkt", "k", SHA256])).unwrap();
        assert_eq!(request.object.version, None);
        match request.target {
            Target::File { expected: Some(d) } => {
                assert_eq!(d.algorithm(), DigestAlgorithm::Sha256)
            }
            other => panic!("unexpected target: {:?}", other),
        }

        let request = parse_args(&args(&["bkt", "k", "v1", SHA1])).unwrap();
        assert_eq!(request.object.version.as_deref(), Some("v1"));
        match request.target {
            Target::File { expected: Some(d) } => {
                assert_eq!(d.algorithm(), DigestAlgorithm::Sha1)
            }
            other => panic!("unexpected target: {:?}", other),
        }

        /* An empty version means "latest". */
        let request = parse_args(&args(&["bkt", "k", "", SHA1])).unwrap();
        assert_eq!(request.object.version, None);
    }

    #[test]
    fn test_invalid_hash() {
        match parse_args(&args(&["bkt", "k", "0123456789"])) {
            Err(FetchError::InvalidHash(h)) => assert_eq!(h, "0123456789"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_stream() {
        let request = parse_args(&args(&["bkt", "k", "-"])).unwrap();
        assert!(request.is_stream());
        assert_eq!(request.object.version, None);

        let request = parse_args(&args(&["bkt", "k", "v2", "-"])).unwrap();
        assert!(request.is_stream());
        assert_eq!(request.object.version.as_deref(), Some("v2"));

        /* Hashes are never checked when streaming, even bogus ones. */
        let request =
            parse_args(&args(&["bkt", "k", "v2", "nothex", "-"])).unwrap();
        assert!(request.is_stream());
        assert_eq!(request.object.version.as_deref(), Some("v2"));
    }

    #[test]
    fn test_is_stream_args() {
        assert!(is_stream_args(&args(&["bkt", "k", "-"])));
        assert!(is_stream_args(&args(&["bkt", "-"])));
        assert!(!is_stream_args(&args(&["bkt", "k"])));
        assert!(!is_stream_args(&args(&["bkt", "-", "k"])));
        assert!(!is_stream_args(&args(&[])));

        /* Agrees with the full parse whenever the full parse succeeds. */
        for list in &[&["bkt", "k", "v2", "nothex", "-"][..], &["bkt", "k"][..]] {
            let list = args(list);
            assert_eq!(
                is_stream_args(&list),
                parse_args(&list).unwrap().is_stream()
            );
        }
    }

    #[test]
    fn test_usage_errors() {
        for bad in &[
            &[][..],
            &["bkt"][..],
            &["bkt", "-"][..],
            &["bkt", "k", "v", SHA1, "extra"][..],
            &["bkt", "k", "v", SHA1, "extra", "-"][..],
            &["bkt", "dir/.."][..],
            &["bkt", ".."][..],
        ] {
            assert!(
                matches!(parse_args(&args(bad)), Err(FetchError::Usage(_))),
                "args {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_file_name() {
        let object = |key: &str| ObjectId {
            bucket: "bkt".to_string(),
            key: key.to_string(),
            version: None,
        };
        assert_eq!(object("plain").file_name().unwrap(), "plain");
        assert_eq!(object("a/b/").file_name().unwrap(), "b");
        assert!(object("").file_name().is_err());
        assert!(object("/").file_name().is_err());
    }
}
