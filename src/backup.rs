use anyhow::{anyhow, Context};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
const DOCUMENT_ENTRY: &str = "data/database.json";
pub const BUNDLE_FORMAT_V1: &str = "schoolbook-document-v1";
pub const LEGACY_JSON_FORMAT: &str = "legacy-json";

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub entry_count: usize,
    pub sha256: String,
}

#[derive(Debug, Clone)]
pub struct ImportedBundle {
    pub bundle_format_detected: String,
    /// Raw document bytes, checksum already verified for zip bundles.
    pub document: Vec<u8>,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

pub fn export_document_bundle(document: &[u8], out_path: &Path) -> anyhow::Result<ExportSummary> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }

    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let exported_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let digest = sha256_hex(document);
    let manifest = json!({
        "format": BUNDLE_FORMAT_V1,
        "version": 1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": exported_at,
        "sha256": digest,
    });
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    zip.start_file(DOCUMENT_ENTRY, opts)
        .context("failed to start document entry")?;
    zip.write_all(document)
        .context("failed to write document entry")?;

    zip.finish().context("failed to finalize zip bundle")?;

    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT_V1.to_string(),
        entry_count: 2,
        sha256: digest,
    })
}

/// Reads a bundle written by [`export_document_bundle`]. A plain JSON file
/// is accepted as-is so a raw copy of the document also restores.
pub fn read_document_bundle(in_path: &Path) -> anyhow::Result<ImportedBundle> {
    if !is_zip_file(in_path)? {
        let document = std::fs::read(in_path)
            .with_context(|| format!("failed to read {}", in_path.to_string_lossy()))?;
        return Ok(ImportedBundle {
            bundle_format_detected: LEGACY_JSON_FORMAT.to_string(),
            document,
        });
    }

    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: serde_json::Value =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid JSON")?;
    let format = manifest
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if format != BUNDLE_FORMAT_V1 {
        return Err(anyhow!("unsupported bundle format: {}", format));
    }

    let mut document = Vec::new();
    archive
        .by_name(DOCUMENT_ENTRY)
        .context("bundle missing data/database.json")?
        .read_to_end(&mut document)
        .context("failed to extract document entry")?;

    if let Some(expected) = manifest.get("sha256").and_then(|v| v.as_str()) {
        let actual = sha256_hex(&document);
        if actual != expected {
            return Err(anyhow!(
                "document checksum mismatch: manifest {}, bundle {}",
                expected,
                actual
            ));
        }
    }

    Ok(ImportedBundle {
        bundle_format_detected: BUNDLE_FORMAT_V1.to_string(),
        document,
    })
}

fn is_zip_file(path: &Path) -> anyhow::Result<bool> {
    let mut f = File::open(path)
        .with_context(|| format!("failed to open input file {}", path.to_string_lossy()))?;
    let mut sig = [0u8; 4];
    let read = f.read(&mut sig).context("failed to read file signature")?;
    if read < 4 {
        return Ok(false);
    }
    Ok(sig == [0x50, 0x4B, 0x03, 0x04])
}
