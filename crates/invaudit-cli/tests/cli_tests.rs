//! Integration tests for the invaudit CLI.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use predicates::prelude::*;
use tempfile::TempDir;

/// CLI command isolated from the user's config directory.
fn cli(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_invaudit"));
    cmd.env("XDG_CONFIG_HOME", home).env("HOME", home);
    cmd
}

/// One-page PDF drawing `lines` top to bottom in a standard font.
fn write_pdf(path: &Path, base_font: &str, lines: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let y = 780 - (i as i64) * 20;
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), 11.into()]));
        operations.push(Operation::new("Td", vec![50.into(), y.into()]));
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("ET", vec![]));
    }
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.save(path).unwrap();
}

fn invoice_lines(number: &str, rate: &str) -> Vec<String> {
    vec![
        "Star Electronics".to_string(),
        "Shop 4, Link Road, Malad West".to_string(),
        "Tel. No. : 9820012345".to_string(),
        format!("Invoice No. INV-2023 {}", number),
        "M/s. Acme Co, 12 Main St".to_string(),
        "GSTIN No. 27ABCDE1234F1Z5".to_string(),
        format!("Widget A 8471 2 {} 1000.00;", rate),
        "Total 1000".to_string(),
    ]
}

fn write_invoice(dir: &Path, name: &str, font: &str, number: &str, rate: &str) {
    let lines = invoice_lines(number, rate);
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    write_pdf(&dir.join(name), font, &lines);
}

fn csv_rows(path: &Path) -> (Vec<String>, usize) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers = reader.headers().unwrap().iter().map(str::to_string).collect();
    let rows = reader.records().count();
    (headers, rows)
}

// ============ GENERAL ============

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    cli(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("audit"))
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("config"));
}

// ============ CONFIG COMMAND ============

#[test]
fn test_config_path_not_created() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("custom.json");

    cli(home.path())
        .args(["-c", path.to_str().unwrap(), "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.json"))
        .stdout(predicate::str::contains("not created"));
}

#[test]
fn test_config_init_set_get() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("invaudit.json");
    let path = path.to_str().unwrap();

    cli(home.path())
        .args(["-c", path, "config", "init"])
        .assert()
        .success();
    assert!(Path::new(path).exists());

    cli(home.path())
        .args(["-c", path, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    cli(home.path())
        .args(["-c", path, "config", "get", "output.invoices_name"])
        .assert()
        .success()
        .stdout(predicate::str::contains("IA_inv"));

    cli(home.path())
        .args(["-c", path, "config", "set", "reconcile.font_drift", "false"])
        .assert()
        .success();

    cli(home.path())
        .args(["-c", path, "config", "get", "reconcile.font_drift"])
        .assert()
        .success()
        .stdout(predicate::str::contains("false"));

    cli(home.path())
        .args(["-c", path, "config", "set", "reconcile.no_such_key", "1"])
        .assert()
        .failure();
}

// ============ AUDIT COMMAND ============

#[test]
fn test_audit_without_matches_fails() {
    let home = TempDir::new().unwrap();
    let pattern = home.path().join("*.pdf");

    cli(home.path())
        .arg("audit")
        .arg(pattern.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No PDF files found"));
}

#[test]
fn test_audit_writes_both_tables() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("in");
    let output = home.path().join("out");
    fs::create_dir_all(&input).unwrap();
    write_invoice(&input, "a.pdf", "Helvetica", "0001", "500");
    write_invoice(&input, "b.pdf", "Courier", "0002", "550");
    fs::write(input.join("notes.txt"), "not an invoice").unwrap();

    cli(home.path())
        .arg("audit")
        .arg(input.join("*").to_str().unwrap())
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"));

    let (headers, rows) = csv_rows(&output.join("IA_inv.csv"));
    assert_eq!(headers[0], "Company Name");
    assert_eq!(headers.last().unwrap(), "Items_Qty_Rate");
    assert_eq!(rows, 2);

    let (headers, rows) = csv_rows(&output.join("IA_inv_issues.csv"));
    assert_eq!(headers[..5], ["Issues", "Invoice number", "Item", "Rate", "Font"]);
    // Two fonts from one vendor flag both invoices.
    assert!(rows >= 2);
}

#[test]
fn test_audit_json_export() {
    let home = TempDir::new().unwrap();
    write_invoice(home.path(), "a.pdf", "Helvetica", "0001", "500");

    cli(home.path())
        .arg("audit")
        .arg(home.path().join("a.pdf").to_str().unwrap())
        .args(["-f", "json", "-o"])
        .arg(home.path())
        .assert()
        .success();

    let records: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(home.path().join("IA_inv.json")).unwrap()).unwrap();
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["font_style"], "Helvetica");

    let issues: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(home.path().join("IA_inv_issues.json")).unwrap())
            .unwrap();
    assert!(issues.as_array().unwrap().is_empty());
}

#[test]
fn test_audit_aborts_on_unreadable_document() {
    let home = TempDir::new().unwrap();
    let output = home.path().join("out");
    write_invoice(home.path(), "a.pdf", "Helvetica", "0001", "500");
    fs::write(home.path().join("broken.pdf"), "not a pdf").unwrap();

    cli(home.path())
        .arg("audit")
        .arg(home.path().join("*.pdf").to_str().unwrap())
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.pdf"));

    assert!(!output.join("IA_inv.csv").exists());
    assert!(!output.join("IA_inv_issues.csv").exists());
}

#[test]
fn test_audit_continue_on_error() {
    let home = TempDir::new().unwrap();
    let output = home.path().join("out");
    write_invoice(home.path(), "a.pdf", "Helvetica", "0001", "500");
    fs::write(home.path().join("broken.pdf"), "not a pdf").unwrap();

    cli(home.path())
        .arg("audit")
        .arg(home.path().join("*.pdf").to_str().unwrap())
        .arg("-o")
        .arg(&output)
        .arg("--continue-on-error")
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped files"))
        .stdout(predicate::str::contains("broken.pdf"));

    let (_, rows) = csv_rows(&output.join("IA_inv.csv"));
    assert_eq!(rows, 1);
}

#[test]
fn test_audit_ignores_directories_named_like_pdfs() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("in");
    let output = home.path().join("out");
    fs::create_dir_all(input.join("dir.pdf")).unwrap();
    write_invoice(&input, "a.pdf", "Helvetica", "0001", "500");
    fs::write(input.join("empty.pdf"), "").unwrap();

    cli(home.path())
        .arg("audit")
        .arg(input.join("*").to_str().unwrap())
        .arg("-o")
        .arg(&output)
        .arg("--continue-on-error")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"))
        .stdout(predicate::str::contains("empty.pdf"))
        .stdout(predicate::str::contains("dir.pdf").not());

    let (_, rows) = csv_rows(&output.join("IA_inv.csv"));
    assert_eq!(rows, 1);
}

#[test]
fn test_audit_writes_neither_table_when_one_fails() {
    let home = TempDir::new().unwrap();
    let output = home.path().join("out");
    write_invoice(home.path(), "a.pdf", "Helvetica", "0001", "500");
    // A directory in place of the issues table makes its write fail.
    fs::create_dir_all(output.join("IA_inv_issues.csv")).unwrap();

    cli(home.path())
        .arg("audit")
        .arg(home.path().join("a.pdf").to_str().unwrap())
        .arg("-o")
        .arg(&output)
        .assert()
        .failure();

    assert!(!output.join("IA_inv.csv").exists());
    let entries: Vec<_> = fs::read_dir(&output).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

// ============ EXTRACT COMMAND ============

#[test]
fn test_extract_text() {
    let home = TempDir::new().unwrap();
    write_invoice(home.path(), "a.pdf", "Courier", "0001", "500");

    cli(home.path())
        .arg("extract")
        .arg(home.path().join("a.pdf"))
        .args(["-f", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Invoice:"))
        .stdout(predicate::str::contains("Fonts: Courier"));
}

#[test]
fn test_extract_missing_file() {
    let home = TempDir::new().unwrap();

    cli(home.path())
        .arg("extract")
        .arg(home.path().join("missing.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}
