// tests/compress_trial.rs
use std::path::{Path, PathBuf};

use news_digest::compress::codecs::default_codecs;
use news_digest::compress::filters::{read_entry, Filter};
use news_digest::compress::prepare_output_dir;
use news_digest::config::Secret;
use news_digest::{select_best, AllCodecsFailed, CodecConfig, CompressionTrial, TrialResult};

fn digest_text() -> Vec<u8> {
    let mut s = String::from("Nyheder fra DR: 2024-03-01 12:00:00.000000+01:00\n");
    for i in 0..40 {
        s.push_str(&format!(
            "12:{i:02}: Overskrift nummer {i}\n\nBrødtekst der gentager sig selv en hel del.\n{}\n",
            "-".repeat(60)
        ));
    }
    s.into_bytes()
}

fn trial_in(dir: &Path) -> CompressionTrial {
    CompressionTrial::new(dir.join("compress"), Path::new("news.txt"))
}

#[tokio::test]
async fn invalid_config_is_left_out() {
    let dir = tempfile::tempdir().unwrap();
    let trial = trial_in(dir.path());
    prepare_output_dir(&dir.path().join("compress")).unwrap();

    let configs = vec![
        CodecConfig::new("LZMA2", vec![Filter::Lzma2 { preset: 6 }]),
        CodecConfig::new(
            "Broken",
            vec![Filter::Zstd { level: 3 }, Filter::Bzip2 { level: 9 }],
        ),
        CodecConfig::new("PPMd0", vec![Filter::Ppmd { order: 6, mem_log2: 16 }]),
    ];
    let results = trial.trial_all(&digest_text(), &configs).await;

    let names: Vec<_> = results.iter().map(|r| r.codec_name.as_str()).collect();
    assert_eq!(names, vec!["LZMA2", "PPMd0"]);
    assert_eq!(
        results[0].path,
        dir.path().join("compress").join("LZMA2_news.7z")
    );
    assert_eq!(
        results[1].path,
        dir.path().join("compress").join("PPMd0_news.7z")
    );
    for r in &results {
        let on_disk = std::fs::metadata(&r.path).unwrap().len();
        assert_eq!(on_disk, r.size_bytes);
    }
    assert!(!dir.path().join("compress").join("Broken_news.7z").exists());
}

#[tokio::test]
async fn default_table_without_passphrase() {
    let dir = tempfile::tempdir().unwrap();
    prepare_output_dir(&dir.path().join("compress")).unwrap();
    let data = digest_text();
    let table = default_codecs();
    let results = trial_in(dir.path()).trial_all(&data, &table).await;

    // only the passphrase variants are skipped
    let names: Vec<_> = results.iter().map(|r| r.codec_name.as_str()).collect();
    let expected: Vec<_> = table
        .iter()
        .map(|c| c.name.as_str())
        .filter(|n| !n.starts_with("7zAES_"))
        .collect();
    assert_eq!(names, expected);
    assert_eq!(names.len(), 18);
    assert!(names.contains(&"LZMA2_Delta"));
    assert!(names.contains(&"LZMA_BCJ"));
    assert!(names.contains(&"PPMd7"));

    let best = select_best(&results).unwrap();
    assert!(best.size_bytes < data.len() as u64);
    assert!(results.iter().all(|r| r.size_bytes >= best.size_bytes));
}

#[tokio::test]
async fn every_artifact_is_a_7z_archive_of_the_digest() {
    let dir = tempfile::tempdir().unwrap();
    prepare_output_dir(&dir.path().join("compress")).unwrap();
    let data = digest_text();
    let results = trial_in(dir.path())
        .with_passphrase(Some(Secret::new("korrekt hest")))
        .trial_all(&data, &default_codecs())
        .await;

    assert_eq!(results.len(), 24);
    for r in &results {
        assert_eq!(r.path.extension().and_then(|e| e.to_str()), Some("7z"));
        let archive = std::fs::read(&r.path).unwrap();
        assert!(archive.starts_with(b"7z\xBC\xAF\x27\x1C"), "{}", r.codec_name);
        let passphrase = r.codec_name.starts_with("7zAES_").then_some("korrekt hest");
        assert_eq!(
            read_entry(&archive, "news.txt", passphrase).unwrap(),
            data,
            "{}",
            r.codec_name
        );
    }
}

#[tokio::test]
async fn passphrase_variants_are_encrypted() {
    let dir = tempfile::tempdir().unwrap();
    prepare_output_dir(&dir.path().join("compress")).unwrap();
    let trial = trial_in(dir.path()).with_passphrase(Some(Secret::new("korrekt hest")));
    let configs = vec![CodecConfig::new(
        "7zAES_ZStandard",
        vec![Filter::Zstd { level: 3 }, Filter::Aes256],
    )];
    let data = digest_text();
    let results = trial.trial_all(&data, &configs).await;

    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0].path,
        dir.path().join("compress").join("7zAES_ZStandard_news.7z")
    );
    let archive = std::fs::read(&results[0].path).unwrap();
    assert!(read_entry(&archive, "news.txt", None).is_err());
    assert!(read_entry(&archive, "news.txt", Some("forkert")).is_err());
    assert_eq!(
        read_entry(&archive, "news.txt", Some("korrekt hest")).unwrap(),
        data
    );
}

fn result(name: &str, size_bytes: u64) -> TrialResult {
    TrialResult {
        codec_name: name.into(),
        path: PathBuf::from(format!("compress/{name}_news.7z")),
        size_bytes,
    }
}

#[test]
fn smaller_wins_and_ties_go_to_earlier() {
    let rs = vec![result("A", 900), result("B", 850), result("C", 850)];
    assert_eq!(select_best(&rs).unwrap().codec_name, "B");
}

#[test]
fn nothing_succeeded() {
    assert_eq!(select_best(&[]), Err(AllCodecsFailed));
}
