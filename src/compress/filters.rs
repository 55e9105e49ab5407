//! filters.rs: the single compression capability behind every codec config.
//!
//! A chain is: zero or more pre-filters, exactly one compressor, then an
//! optional passphrase stage. Every valid chain becomes one 7z archive that
//! holds the digest as a single entry, so any 7-Zip build opens the artifact.

use sevenz_rust2::encoder_options::{
    AesEncoderOptions, BrotliOptions, Bzip2Options, DeflateOptions, DeltaOptions,
    EncoderOptions, Lzma2Options, LzmaOptions, PpmdOptions, ZstandardOptions,
};
use sevenz_rust2::{
    ArchiveEntry, ArchiveReader, ArchiveWriter, EncoderConfiguration, EncoderMethod, Password,
};
use std::io::Cursor;

use crate::error::CodecError;

/// Extension of every artifact.
pub const ARCHIVE_EXTENSION: &str = "7z";

/// Largest PPMd model (64 MiB); bigger requests are clamped.
pub const PPMD_MEM_LOG2_MAX: u32 = 26;

const BROTLI_WINDOW: u32 = 22;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Byte-wise delta pre-filter.
    Delta { distance: u8 },
    /// x86 branch converter (BCJ).
    X86,
    /// ARM branch converter.
    Arm,
    Lzma2 { preset: u32 },
    Lzma { preset: u32 },
    Bzip2 { level: u32 },
    Deflate { level: u32 },
    Zstd { level: u32 },
    /// Model memory is `1 << mem_log2` bytes.
    Ppmd { order: u32, mem_log2: u32 },
    Brotli { quality: u32 },
    /// 7zAES (AES-256, SHA-256 key stretching) keyed from the run passphrase.
    Aes256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Pre,
    Compress,
    Post,
}

impl Filter {
    fn stage(&self) -> Stage {
        match self {
            Filter::Delta { .. } | Filter::X86 | Filter::Arm => Stage::Pre,
            Filter::Aes256 => Stage::Post,
            _ => Stage::Compress,
        }
    }

    fn coder(&self, passphrase: Option<&str>) -> Result<EncoderConfiguration, CodecError> {
        let coder = match *self {
            Filter::Delta { distance } => DeltaOptions::from_distance(u32::from(distance)).into(),
            Filter::X86 => EncoderMethod::BCJ_X86_FILTER.into(),
            Filter::Arm => EncoderMethod::BCJ_ARM_FILTER.into(),
            Filter::Lzma2 { preset } => Lzma2Options::from_level(preset).into(),
            Filter::Lzma { preset } => EncoderConfiguration::new(EncoderMethod::LZMA)
                .with_options(EncoderOptions::Lzma(LzmaOptions::from_level(preset))),
            Filter::Bzip2 { level } => Bzip2Options::from_level(level).into(),
            Filter::Deflate { level } => DeflateOptions::from_level(level).into(),
            Filter::Zstd { level } => ZstandardOptions::from_level(level).into(),
            Filter::Ppmd { order, mem_log2 } => {
                PpmdOptions::from_order_memory_size(order, 1 << mem_log2.min(PPMD_MEM_LOG2_MAX))
                    .into()
            }
            Filter::Brotli { quality } => {
                BrotliOptions::from_quality_window(quality, BROTLI_WINDOW).into()
            }
            Filter::Aes256 => {
                let p = passphrase.ok_or(CodecError::MissingPassphrase)?;
                AesEncoderOptions::new(Password::new(p)).into()
            }
        };
        Ok(coder)
    }
}

/// Returns whether the chain ends in the passphrase stage.
fn validate(filters: &[Filter]) -> Result<bool, CodecError> {
    let mut compressor = false;
    let mut encrypt = false;
    for f in filters {
        match f.stage() {
            Stage::Pre if compressor => {
                return Err(CodecError::InvalidChain("pre-filter after compressor"))
            }
            Stage::Pre => {}
            Stage::Compress if compressor => {
                return Err(CodecError::InvalidChain("more than one compressor"))
            }
            Stage::Compress => compressor = true,
            Stage::Post if !compressor || encrypt => {
                return Err(CodecError::InvalidChain("passphrase stage must come last, once"))
            }
            Stage::Post => encrypt = true,
        }
    }
    if !compressor {
        return Err(CodecError::InvalidChain("no compressor"));
    }
    Ok(encrypt)
}

/// Pack `data` as `entry_name` into a 7z archive whose coders follow
/// `filters`. Returns the archive bytes.
pub fn compress_with(
    filters: &[Filter],
    entry_name: &str,
    data: &[u8],
    passphrase: Option<&str>,
) -> Result<Vec<u8>, CodecError> {
    if validate(filters)? && passphrase.is_none() {
        return Err(CodecError::MissingPassphrase);
    }

    // 7z lists coders from the archive side inwards.
    let methods = filters
        .iter()
        .rev()
        .map(|f| f.coder(passphrase))
        .collect::<Result<Vec<_>, _>>()?;

    let mut writer = ArchiveWriter::new(Cursor::new(Vec::new()))?;
    writer.set_content_methods(methods);
    writer.push_archive_entry(ArchiveEntry::new_file(entry_name), Some(data))?;
    Ok(writer.finish()?.into_inner())
}

/// Read one entry back out of an archive built by [`compress_with`].
pub fn read_entry(
    archive: &[u8],
    entry_name: &str,
    passphrase: Option<&str>,
) -> Result<Vec<u8>, CodecError> {
    let password = passphrase.map(Password::new).unwrap_or_else(Password::empty);
    let mut reader = ArchiveReader::new(Cursor::new(archive), password)?;
    Ok(reader.read_file(entry_name)?)
}
