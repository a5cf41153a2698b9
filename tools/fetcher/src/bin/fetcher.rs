/*!
 * fetcher BUCKET KEY [[VERSION_ID] HASH]: fetches the given S3 object into
 * the current directory, checking its hash first if one was given.
 * "fetcher BUCKET KEY [VERSION_ID] -" writes the object to stdout instead.
 *
 * The region comes from AWS_REGION (default ap-southeast-2).  Setting
 * AWS_NO_VERIFY_SSL=true disables TLS certificate verification.
 */

use env_logger::Env;
use fetcher::parse_args;
use fetcher::request::is_stream_args;
use fetcher::Config;
use fetcher::S3Source;
use std::path::Path;

#[tokio::main(basic_scheduler)]
async fn main() -> Result<(), anyhow::Error> {
    let args = std::env::args().skip(1).collect::<Vec<String>>();

    /* Keep quiet when stdout is carrying the object. */
    let default_filter = if is_stream_args(&args) { "warn" } else { "info" };
    let _ = env_logger::Builder::from_env(
        Env::default().default_filter_or(default_filter),
    )
    .try_init();

    let request = parse_args(&args)?;

    let config = Config::from_env();
    let source = S3Source::new(&config)?;
    let outcome = fetcher::run(&source, &request, Path::new(".")).await?;
    log::debug!("{:?}", outcome);

    Ok(())
}
