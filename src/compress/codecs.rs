// src/compress/codecs.rs
use super::filters::Filter;
use super::CodecConfig;

const PRESET_DEFAULT: u32 = 6;

fn cfg(name: &str, filters: Vec<Filter>) -> CodecConfig {
    CodecConfig::new(name, filters)
}

/// `mem_log2` follows the 7z convention: the model gets `1 << mem_log2` bytes.
fn ppmd(name: &str, order: u32, mem_log2: u32) -> CodecConfig {
    cfg(name, vec![Filter::Ppmd { order, mem_log2 }])
}

/// The candidate table tried on every run. Declaration order only matters
/// for breaking size ties.
pub fn default_codecs() -> Vec<CodecConfig> {
    use Filter::*;
    let lzma2 = Lzma2 {
        preset: PRESET_DEFAULT,
    };
    let lzma = Lzma {
        preset: PRESET_DEFAULT,
    };

    vec![
        cfg("LZMA2_Delta", vec![Delta { distance: 1 }, lzma2.clone()]),
        cfg("LZMA2_BCJ", vec![X86, lzma2.clone()]),
        cfg("LZMA2_ARM", vec![Arm, lzma2.clone()]),
        cfg("LZMA_BCJ", vec![X86, lzma.clone()]),
        cfg("LZMA2", vec![lzma2.clone()]),
        cfg("LZMA", vec![lzma.clone()]),
        cfg("BZip2", vec![Bzip2 { level: 9 }]),
        cfg("Deflate", vec![Deflate { level: 9 }]),
        cfg("ZStandard", vec![Zstd { level: 3 }]),
        ppmd("PPMd0", 6, 16),
        ppmd("PPMd1", 6, 32),
        ppmd("PPMd2", 6, 24),
        ppmd("PPMd3", 3, 24),
        ppmd("PPMd4", 12, 24),
        ppmd("PPMd5", 24, 24),
        ppmd("PPMd6", 48, 24),
        ppmd("PPMd7", 12, 32),
        cfg("Brolti", vec![Brotli { quality: 11 }]),
        cfg(
            "7zAES_LZMA2_Delta",
            vec![Delta { distance: 1 }, lzma2.clone(), Aes256],
        ),
        cfg("7zAES_LZMA2_BCJ", vec![X86, lzma2, Aes256]),
        cfg("7zAES_LZMA", vec![lzma, Aes256]),
        cfg("7zAES_Deflate", vec![Deflate { level: 9 }, Aes256]),
        cfg("7zAES_BZip2", vec![Bzip2 { level: 9 }, Aes256]),
        cfg("7zAES_ZStandard", vec![Zstd { level: 3 }, Aes256]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let table = default_codecs();
        let names: HashSet<_> = table.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.len(), table.len());
        assert_eq!(table.len(), 24);
    }

    #[test]
    fn passphrase_variants_end_in_aes() {
        let table = default_codecs();
        let sealed: Vec<_> = table
            .iter()
            .filter(|c| c.filters.last() == Some(&Filter::Aes256))
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(sealed.len(), 6);
        assert!(sealed.iter().all(|n| n.starts_with("7zAES_")));
    }

    #[test]
    fn every_chain_has_a_compressor() {
        for c in default_codecs() {
            assert!(
                c.filters.iter().any(|f| !matches!(
                    f,
                    Filter::Delta { .. } | Filter::X86 | Filter::Arm | Filter::Aes256
                )),
                "{} has no compressor",
                c.name
            );
        }
    }
}
