//! Domain XML parsing.
//!
//! Decodes the one schema fragment this tool depends on —
//! `domain/devices/disk/source@file` — and ignores everything else, so
//! richer domain definitions keep parsing.

use serde::Deserialize;
use thiserror::Error;

/// The domain definition could not be parsed.
#[derive(Debug, Error)]
#[error("malformed domain XML: {0}")]
pub struct ParseError(#[from] quick_xml::DeError);

#[derive(Debug, Deserialize)]
struct DomainXml {
    #[serde(default)]
    devices: DevicesXml,
}

#[derive(Debug, Default, Deserialize)]
struct DevicesXml {
    #[serde(default, rename = "disk")]
    disks: Vec<DiskXml>,
}

#[derive(Debug, Deserialize)]
struct DiskXml {
    source: Option<SourceXml>,
}

#[derive(Debug, Deserialize)]
struct SourceXml {
    #[serde(rename = "@file")]
    file: Option<String>,
}

/// Extract the backing-file paths of a domain's disks, in document order.
///
/// Disk entries without a `source file` attribute (media-less CD-ROM and
/// floppy drives) are skipped: an empty path is never a usable mutation
/// target. A domain with no disks at all is valid and yields an empty list.
pub fn disk_sources(xml: &str) -> Result<Vec<String>, ParseError> {
    let domain: DomainXml = quick_xml::de::from_str(xml)?;

    Ok(domain
        .devices
        .disks
        .into_iter()
        .filter_map(|disk| disk.source.and_then(|source| source.file))
        .filter(|file| !file.is_empty())
        .collect())
}
