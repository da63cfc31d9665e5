use std::{fs, path::PathBuf};

use tempfile::tempdir;

use pipewright_cli::{Args, ReportFormat, run};

/// Collects all .pcf files from a directory
fn collect_pcf_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("pcf")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn demos_dir() -> PathBuf {
    // Demos are at workspace root, relative to workspace not the crate
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let rules = demos_dir().join("rules.toml");

    let demo_files = collect_pcf_files(demos_dir());
    assert!(!demo_files.is_empty(), "No demo files found in demos/");

    let mut failed = Vec::new();

    for demo_path in &demo_files {
        let output_filename = format!(
            "{}.report.txt",
            demo_path.file_stem().unwrap().to_string_lossy()
        );
        let output_path = temp_dir.path().join(output_filename);

        let args = Args {
            input: demo_path.to_string_lossy().to_string(),
            rules: Some(rules.to_string_lossy().to_string()),
            output: Some(output_path.to_string_lossy().to_string()),
            format: ReportFormat::Text,
            config: None,
            log_level: "off".to_string(),
        };

        match run(&args) {
            Ok(report) if report.is_clean() => {
                let rendered = fs::read_to_string(&output_path).unwrap();
                assert!(rendered.contains("parsed elements"));
            }
            Ok(report) => failed.push((demo_path.clone(), format!("unclean run:\n{report}"))),
            Err(err) => failed.push((demo_path.clone(), err.to_string())),
        }
    }

    if !failed.is_empty() {
        eprintln!("\nDemos that failed:");
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} demo(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_json_report() {
    let temp_dir = tempdir().unwrap();
    let output_path = temp_dir.path().join("report.json");

    let args = Args {
        input: demos_dir().join("heating_loop.pcf").to_string_lossy().to_string(),
        rules: Some(demos_dir().join("rules.toml").to_string_lossy().to_string()),
        output: Some(output_path.to_string_lossy().to_string()),
        format: ReportFormat::Json,
        config: None,
        log_level: "off".to_string(),
    };

    run(&args).expect("run should succeed");

    let rendered = fs::read_to_string(&output_path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert!(value["parsed"].as_u64().unwrap() > 0);
    assert_eq!(value["placeholders_dangling"].as_array().unwrap().len(), 0);
}

#[test]
fn e2e_missing_rule_table() {
    let args = Args {
        input: demos_dir().join("heating_loop.pcf").to_string_lossy().to_string(),
        rules: None,
        output: None,
        format: ReportFormat::Text,
        config: Some("/nonexistent/config.toml".to_string()),
        log_level: "off".to_string(),
    };

    assert!(run(&args).is_err());
}

#[test]
fn e2e_malformed_input_fails() {
    let temp_dir = tempdir().unwrap();
    let bad_pcf = temp_dir.path().join("bad.pcf");
    fs::write(&bad_pcf, "    END-POINT 0 0 0 50\nPIPE\n").unwrap();

    let args = Args {
        input: bad_pcf.to_string_lossy().to_string(),
        rules: Some(demos_dir().join("rules.toml").to_string_lossy().to_string()),
        output: None,
        format: ReportFormat::Text,
        config: None,
        log_level: "off".to_string(),
    };

    assert!(run(&args).is_err());
}
