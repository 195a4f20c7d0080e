//! Domain models

pub mod upload;

pub use upload::{
    parse_tags, BackupLink, PublishMode, PublishedMedia, ShopLinks, Source, UploadRecord,
};
