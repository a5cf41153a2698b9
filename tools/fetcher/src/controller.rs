/*!
 * Download, verify, commit.  An object is first written to
 * "<name>.unconfirmed", checked against the expected hash (if there is one),
 * and only then renamed to "<name>".  The rename is the only step that
 * touches the final path, so a failed or mismatched download never leaves
 * anything there.
 */

use crate::digest::ExpectedDigest;
use crate::error::FetchError;
use crate::request::DownloadRequest;
use crate::request::ObjectId;
use crate::request::Target;
use crate::source::ObjectSource;
use std::path::Path;
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;

pub const TEMP_SUFFIX: &str = ".unconfirmed";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verification {
    NotRequested,
    Matched,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub bytes: u64,
    /** committed file; None when streaming */
    pub path: Option<PathBuf>,
    pub verification: Verification,
}

/**
 * Carries out `request`.  Temporary and final files are placed in `dir`.
 * Streaming requests write to stdout.
 */
pub async fn run<S: ObjectSource>(
    source: &S,
    request: &DownloadRequest,
    dir: &Path,
) -> Result<Outcome, FetchError> {
    let mut stdout = tokio::io::stdout();
    run_with_stdout(source, request, dir, &mut stdout).await
}

/** Like run(), but streaming requests write to `stdout`. */
pub async fn run_with_stdout<S, W>(
    source: &S,
    request: &DownloadRequest,
    dir: &Path,
    stdout: &mut W,
) -> Result<Outcome, FetchError>
where
    S: ObjectSource,
    W: AsyncWrite + Unpin + ?Sized,
{
    match &request.target {
        Target::Stream => stream_to(source, &request.object, stdout).await,
        Target::File { expected } => {
            download_to_dir(source, &request.object, expected.as_ref(), dir)
                .await
        }
    }
}

/** Copies the object straight into `out`.  Nothing is verified or logged. */
pub async fn stream_to<S, W>(
    source: &S,
    object: &ObjectId,
    out: &mut W,
) -> Result<Outcome, FetchError>
where
    S: ObjectSource,
    W: AsyncWrite + Unpin + ?Sized,
{
    let bytes = source.download(object, out).await?;
    out.flush()
        .await
        .map_err(|e| FetchError::transfer(&object.key, e))?;
    Ok(Outcome {
        bytes,
        path: None,
        verification: Verification::NotRequested,
    })
}

pub async fn download_to_dir<S: ObjectSource>(
    source: &S,
    object: &ObjectId,
    expected: Option<&ExpectedDigest>,
    dir: &Path,
) -> Result<Outcome, FetchError> {
    let paths = CommitPaths::resolve(dir, object.file_name()?)?;

    let mut file =
        File::create(&paths.temp)
            .await
            .map_err(|e| FetchError::CreateTemp {
                path: paths.temp.clone(),
                source: e,
            })?;

    let fetched = fetch_and_verify(source, object, expected, &mut file, &paths)
        .await;
    drop(file);
    let (bytes, verification) = match fetched {
        Ok(v) => v,
        Err(error) => {
            discard(&paths.temp).await;
            return Err(error);
        }
    };

    if let Err(e) = tokio::fs::rename(&paths.temp, &paths.fin).await {
        discard(&paths.temp).await;
        return Err(FetchError::Commit {
            from: paths.temp,
            to: paths.fin,
            source: e,
        });
    }

    log::info!("complete: {}", paths.fin.display());
    Ok(Outcome {
        bytes,
        path: Some(paths.fin),
        verification,
    })
}

async fn fetch_and_verify<S: ObjectSource>(
    source: &S,
    object: &ObjectId,
    expected: Option<&ExpectedDigest>,
    file: &mut File,
    paths: &CommitPaths,
) -> Result<(u64, Verification), FetchError> {
    let bytes = source.download(object, file).await?;

    /* Make sure everything is on disk before we hash it or commit it. */
    let flushed = match file.flush().await {
        Ok(()) => file.sync_all().await,
        Err(e) => Err(e),
    };
    flushed.map_err(|e| FetchError::transfer(&object.key, e))?;
    log::info!("downloaded: {} {} bytes", paths.fin.display(), bytes);

    let verification = match expected {
        None => Verification::NotRequested,
        Some(expected) => {
            let actual = expected.verify(&paths.temp).await?;
            log::info!(
                "downloaded {} hash is correct: {}",
                expected.algorithm(),
                actual
            );
            Verification::Matched
        }
    };

    Ok((bytes, verification))
}

/*
 * Best-effort cleanup of the temporary file after a failure.  The original
 * error is what gets reported, so a failure here is only logged.
 */
async fn discard(temp: &Path) {
    match tokio::fs::remove_file(temp).await {
        Ok(()) => log::debug!("removed {}", temp.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => (),
        Err(e) => log::warn!("failed to remove {}: {}", temp.display(), e),
    }
}

#[derive(Debug)]
struct CommitPaths {
    temp: PathBuf,
    fin: PathBuf,
}

impl CommitPaths {
    fn resolve(dir: &Path, name: &str) -> Result<CommitPaths, FetchError> {
        let dir = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|source| FetchError::ResolvePath {
                    name: name.to_string(),
                    source,
                })?
                .join(dir)
        };
        Ok(CommitPaths {
            temp: dir.join(format!("{}{}", name, TEMP_SUFFIX)),
            fin: dir.join(name),
        })
    }
}
