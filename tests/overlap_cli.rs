//! End-to-end tests for the `olgff` binary.
//!
//! Tests cover:
//! 1. Report contents and ordering
//! 2. Configuration and input errors
//! 3. Gzip input and default output naming
//! 4. Scan and generate subcommands

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper to write a GFF file into the temp dir.
fn write_gff(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Helper to run olgff in a working directory and return output.
fn run_olgff(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_olgff"))
        .current_dir(cwd)
        .args(args)
        .output()
        .expect("Failed to run olgff")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn gff_line(chrom: &str, start: u64, end: u64, id: &str) -> String {
    format!("{}\ttest\tgene\t{}\t{}\t.\t+\t.\tID={}\n", chrom, start, end, id)
}

// =============================================================================
// Report contents
// =============================================================================

#[test]
fn test_single_overlap_report() {
    let dir = TempDir::new().unwrap();
    let a = write_gff(&dir, "a.gff", &gff_line("chr1", 100, 200, "a1"));
    let b = write_gff(&dir, "b.gff", &gff_line("chr1", 150, 250, "b1"));
    let out = dir.path().join("out.tsv");

    let output = run_olgff(
        dir.path(),
        &[
            "overlap",
            a.to_str().unwrap(),
            b.to_str().unwrap(),
            "-z",
            "10",
            "-o",
            out.to_str().unwrap(),
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("with 10 zones completed in"));

    let report = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "chr\toverlap_beg\toverlap_end\tbeg1\tend1\tbeg2\tend2\tsource1\tsource2\tfeature_type1\tfeature_type2\tscore1\tscore2\tstrand1\tstrand2\tframe1\tframe2\tattribute1\tattribute2"
    );
    assert_eq!(
        lines[1],
        "chr1\t150\t200\t100\t200\t150\t250\ttest\ttest\tgene\tgene\t.\t.\t+\t+\t.\t.\tID=a1\tID=b1"
    );
}

#[test]
fn test_rows_sorted_and_unique() {
    let dir = TempDir::new().unwrap();
    let a_content = [
        gff_line("chr1", 1, 1000, "wide"),
        gff_line("chr1", 900, 950, "late"),
        gff_line("chr2", 10, 20, "other"),
    ]
    .concat();
    let b_content = [
        gff_line("chr1", 920, 925, "b1"),
        gff_line("chr1", 120, 480, "b2"),
        gff_line("chr3", 10, 20, "lonely"),
    ]
    .concat();
    let a = write_gff(&dir, "a.gff", &a_content);
    let b = write_gff(&dir, "b.gff", &b_content);
    let out = dir.path().join("out.tsv");

    let output = run_olgff(
        dir.path(),
        &["overlap", a.to_str().unwrap(), b.to_str().unwrap(), "-z", "25", "-o", out.to_str().unwrap()],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report = fs::read_to_string(&out).unwrap();
    let rows: Vec<Vec<&str>> = report.lines().skip(1).map(|l| l.split('\t').collect()).collect();
    let ranges: Vec<(&str, &str, &str, &str)> = rows.iter().map(|r| (r[1], r[2], r[17], r[18])).collect();
    assert_eq!(
        ranges,
        vec![
            ("120", "480", "ID=wide", "ID=b2"),
            ("920", "925", "ID=wide", "ID=b1"),
            ("920", "925", "ID=late", "ID=b1"),
        ]
    );
}

#[test]
fn test_naive_mode_matches_zones() {
    let dir = TempDir::new().unwrap();
    let a_content: String = (0..40u64).map(|i| gff_line("chr1", i * 25 + 1, i * 25 + 60, "a")).collect();
    let b_content: String = (0..25u64).map(|i| gff_line("chr1", i * 41 + 3, i * 41 + 9, "b")).collect();
    let a = write_gff(&dir, "a.gff", &a_content);
    let b = write_gff(&dir, "b.gff", &b_content);

    let zoned = dir.path().join("zoned.tsv");
    let naive = dir.path().join("naive.tsv");
    let run = |extra: &[&str], out: &Path| {
        let mut args = vec!["overlap", a.to_str().unwrap(), b.to_str().unwrap(), "-o", out.to_str().unwrap()];
        args.extend_from_slice(extra);
        let output = run_olgff(dir.path(), &args);
        assert!(output.status.success(), "stderr: {}", stderr(&output));
    };
    run(&["-z", "7"], &zoned);
    run(&["--naive"], &naive);

    let mut zoned_rows: Vec<String> = fs::read_to_string(&zoned).unwrap().lines().map(String::from).collect();
    let mut naive_rows: Vec<String> = fs::read_to_string(&naive).unwrap().lines().map(String::from).collect();
    zoned_rows.sort();
    naive_rows.sort();
    assert!(zoned_rows.len() > 1);
    assert_eq!(zoned_rows, naive_rows);
}

#[test]
fn test_end_at_max_coordinate() {
    let dir = TempDir::new().unwrap();
    let a = write_gff(&dir, "a.gff", &gff_line("chr1", 100, u64::MAX, "huge"));
    let b = write_gff(&dir, "b.gff", &gff_line("chr1", 150, 250, "b1"));
    let out = dir.path().join("out.tsv");

    let output = run_olgff(
        dir.path(),
        &["overlap", a.to_str().unwrap(), b.to_str().unwrap(), "-z", "10", "-o", out.to_str().unwrap()],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report = fs::read_to_string(&out).unwrap();
    let rows: Vec<&str> = report.lines().skip(1).collect();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].starts_with("chr1\t150\t250\t100\t18446744073709551615\t"));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_zero_zones_rejected_before_io() {
    let dir = TempDir::new().unwrap();
    // Inputs do not exist: the zone check must fire first
    let output = run_olgff(dir.path(), &["overlap", "missing1.gff", "missing2.gff", "-z", "0"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("non-zero positive integer"));
}

#[test]
fn test_negative_zones_rejected() {
    let dir = TempDir::new().unwrap();
    let output = run_olgff(dir.path(), &["overlap", "a.gff", "b.gff", "-z", "-4"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Configuration error"));
}

#[test]
fn test_missing_input() {
    let dir = TempDir::new().unwrap();
    let b = write_gff(&dir, "b.gff", &gff_line("chr1", 1, 2, "b"));
    let output = run_olgff(dir.path(), &["overlap", "nope.gff", b.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("does not exist"));
}

#[test]
fn test_wrong_extension() {
    let dir = TempDir::new().unwrap();
    let a = write_gff(&dir, "a.bed", &gff_line("chr1", 1, 2, "a"));
    let b = write_gff(&dir, "b.gff", &gff_line("chr1", 1, 2, "b"));
    let output = run_olgff(dir.path(), &["overlap", a.to_str().unwrap(), b.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("gff/gff.gz expected"));
}

#[test]
fn test_bad_coordinate_produces_no_output() {
    let dir = TempDir::new().unwrap();
    let a_content = format!("{}chr1\ttest\tgene\t5\tten\t.\t+\t.\tID=bad\n", gff_line("chr1", 1, 9, "ok"));
    let a = write_gff(&dir, "a.gff", &a_content);
    let b = write_gff(&dir, "b.gff", &gff_line("chr1", 1, 2, "b"));
    let out = dir.path().join("out.tsv");

    let output = run_olgff(
        dir.path(),
        &["overlap", a.to_str().unwrap(), b.to_str().unwrap(), "-o", out.to_str().unwrap()],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("line 2"));
    assert!(!out.exists());
}

// =============================================================================
// Gzip input and default naming
// =============================================================================

#[test]
fn test_gzip_input_and_default_output_name() {
    let dir = TempDir::new().unwrap();
    let a = write_gff(&dir, "genes.gff", &gff_line("chr1", 100, 200, "a1"));

    let b = dir.path().join("repeats.gff.gz");
    let mut encoder = GzEncoder::new(fs::File::create(&b).unwrap(), Compression::default());
    encoder.write_all(gff_line("chr1", 190, 300, "b1").as_bytes()).unwrap();
    encoder.finish().unwrap();

    let output = run_olgff(dir.path(), &["overlap", "genes.gff", "repeats.gff.gz"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(a.exists());

    let report = fs::read_to_string(dir.path().join("genes.repeats.gff.overlap.tsv")).unwrap();
    assert_eq!(report.lines().count(), 2);
    assert!(report.lines().nth(1).unwrap().starts_with("chr1\t190\t200\t"));
}

// =============================================================================
// Scan and generate
// =============================================================================

#[test]
fn test_generate_then_scan() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");

    let output = run_olgff(
        dir.path(),
        &["generate", "-o", data.to_str().unwrap(), "-a", "300", "-b", "200", "--seed", "7"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let scan = dir.path().join("scan.tsv");
    let output = run_olgff(
        dir.path(),
        &[
            "scan",
            data.join("a.gff").to_str().unwrap(),
            data.join("b.gff").to_str().unwrap(),
            "--zones",
            "1,10,100",
            "-o",
            scan.to_str().unwrap(),
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let table = fs::read_to_string(&scan).unwrap();
    let rows: Vec<Vec<&str>> = table.lines().skip(1).map(|l| l.split('\t').collect()).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][0], "1");
    assert_eq!(rows[2][0], "100");
    assert!(rows.iter().all(|r| r[3] == rows[0][3]));
}
