use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn markoc_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("markoc"))
}

/// Basic compilation of a simple template
#[test]
fn test_compile_simple_template() {
    let temp_dir = TempDir::new().unwrap();
    let input_file = temp_dir.path().join("card.marko");
    fs::write(&input_file, "<div class=\"card\">${input.title}</div>").unwrap();

    markoc_cmd()
        .arg(input_file.to_str().unwrap())
        .arg("--root")
        .arg(temp_dir.path().to_str().unwrap())
        .assert()
        .success();

    let generated = fs::read_to_string(temp_dir.path().join("card.js")).unwrap();
    assert!(generated.contains("export function render(out, input)"));
    assert!(generated.contains("escapeXml(input.title)"));
}

/// Output directory option
#[test]
fn test_output_directory() {
    let temp_dir = TempDir::new().unwrap();
    let input_file = temp_dir.path().join("page.marko");
    let output_dir = temp_dir.path().join("out");
    fs::write(&input_file, "<section>static</section>").unwrap();

    markoc_cmd()
        .arg(input_file.to_str().unwrap())
        .arg("--out-dir")
        .arg(output_dir.to_str().unwrap())
        .assert()
        .success();

    assert!(output_dir.join("page.js").exists());
}

/// Compilation failure on malformed templates
#[test]
fn test_syntax_error_fails_the_batch() {
    let temp_dir = TempDir::new().unwrap();
    let input_file = temp_dir.path().join("broken.marko");
    fs::write(&input_file, "<div><span></div>").unwrap();

    markoc_cmd()
        .arg(input_file.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to compile"));
}

/// Metadata sidecar emission
#[test]
fn test_emit_meta_sidecar() {
    let temp_dir = TempDir::new().unwrap();
    let input_file = temp_dir.path().join("widget.marko");
    fs::write(&input_file, "<div/>").unwrap();

    markoc_cmd()
        .arg(input_file.to_str().unwrap())
        .arg("--root")
        .arg(temp_dir.path().to_str().unwrap())
        .arg("--emit-meta")
        .assert()
        .success();

    let meta = fs::read_to_string(temp_dir.path().join("widget.meta.json")).unwrap();
    assert!(meta.contains("\"id\": \"widget.marko\""));
}

/// CommonJS module format
#[test]
fn test_cjs_module_format() {
    let temp_dir = TempDir::new().unwrap();
    let input_file = temp_dir.path().join("legacy.marko");
    fs::write(&input_file, "<div/>").unwrap();

    markoc_cmd()
        .arg(input_file.to_str().unwrap())
        .arg("--modules")
        .arg("cjs")
        .assert()
        .success();

    let generated = fs::read_to_string(temp_dir.path().join("legacy.js")).unwrap();
    assert!(generated.contains("exports.render = render;"));
    assert!(!generated.contains("export function"));
}

/// Directory input discovers nested templates
#[test]
fn test_directory_input() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("pages");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("home.marko"), "<main/>").unwrap();
    fs::write(nested.join("notes.txt"), "not a template").unwrap();

    markoc_cmd()
        .arg(temp_dir.path().to_str().unwrap())
        .assert()
        .success();

    assert!(nested.join("home.js").exists());
    assert!(!nested.join("notes.js").exists());
}

/// Source map emission
#[test]
fn test_source_maps() {
    let temp_dir = TempDir::new().unwrap();
    let input_file = temp_dir.path().join("mapped.marko");
    fs::write(&input_file, "<div/>").unwrap();

    markoc_cmd()
        .arg(input_file.to_str().unwrap())
        .arg("--source-maps")
        .assert()
        .success();

    let map = fs::read_to_string(temp_dir.path().join("mapped.js.map")).unwrap();
    assert!(map.contains("\"mappings\""));
}
