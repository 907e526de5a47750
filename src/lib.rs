#![doc = include_str!("../README.md")]

mod capabilities;
mod client;
/// NETASCII line-ending transform for ASCII-mode transfers
pub mod codec;
/// FTP command-line builders
pub mod commands;
mod config;
#[cfg(feature = "deflate")]
mod compression;
mod error;
/// Listing-dialect parsers and the SYST-driven dialect detector
pub mod parsers;
mod response;

pub use capabilities::{FeatureCacheState, FeatureMap};
pub use client::FtpClient;
pub use client::data::DataConnectionMode;
pub use client::keepalive::KeepaliveStats;
pub use client::listing::ListingCursor;
pub use client::state::{DataProtection, FileFormat, FileType, FileStructure, TransferMode};
pub use client::transfer::TransferStream;
pub use config::{ClientConfig, Credentials, DataConfig, ParserConfig, TimeoutConfig, TlsMode};
pub use error::{FtpError, Result};
pub use parsers::{CustomParser, Dialect, EntryType, FileEntry, Permissions};
pub use response::{Reply, ReplyCategory, codes};
