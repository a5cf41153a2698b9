/*!
 * fetcher: download a single object from an S3 bucket, optionally check its
 * hash, and move it into place only once it's known to be good.
 */

pub mod config;
pub mod controller;
pub mod digest;
pub mod error;
pub mod request;
pub mod source;

pub use config::Config;
pub use controller::run;
pub use controller::Outcome;
pub use error::FetchError;
pub use request::parse_args;
pub use request::DownloadRequest;
pub use source::ObjectSource;
pub use source::S3Source;
