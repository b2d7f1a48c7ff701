use assert_cmd::Command;

use assert_cmd::prelude::*;
use assert_fs::{prelude::*, TempDir};
use predicates::prelude::*;

const TITLE: &str = "Intersection of private data among jif snapshots";
const COMPLAINT: &str = "expected format is <filename>: [<hashes>, ]";
const USAGE: &str = "usage: plot-upset <output file name>";

fn main_binary() -> Command {
    Command::cargo_bin("plot-upset").unwrap()
}

fn path_of(file: &assert_fs::fixture::ChildPath) -> &str {
    file.path().to_str().unwrap()
}

#[test]
fn writes_an_svg_plot() {
    let temp = TempDir::new().unwrap();
    let plot = temp.child("plot.svg");
    main_binary()
        .arg(path_of(&plot))
        .write_stdin("a.txt: 1, 2, 3\nb.txt: 2, 3, 4\n")
        .assert()
        .success()
        .stdout("");
    plot.assert(predicate::str::starts_with("<svg "));
    plot.assert(predicate::str::contains(TITLE));
    plot.assert(predicate::str::contains("a.txt").and(predicate::str::contains("b.txt")));
}

#[test]
fn writes_an_html_page() {
    let temp = TempDir::new().unwrap();
    let plot = temp.child("plot.html");
    main_binary().arg(path_of(&plot)).write_stdin("a.txt: 1\n").assert().success();
    plot.assert(predicate::str::starts_with("<!DOCTYPE html>"));
    plot.assert(predicate::str::contains(format!("<title>{TITLE}</title>")));
}

#[test]
fn title_can_be_changed() {
    let temp = TempDir::new().unwrap();
    let plot = temp.child("plot.svg");
    main_binary()
        .args(["--title", "Shared pages", path_of(&plot)])
        .write_stdin("a.txt: 1\n")
        .assert()
        .success();
    plot.assert(predicate::str::contains("Shared pages"));
    plot.assert(predicate::str::contains(TITLE).not());
}

#[test]
fn counts_have_thousands_separators() {
    let temp = TempDir::new().unwrap();
    let plot = temp.child("plot.svg");
    let hashes: Vec<String> = (0..2500).map(|n| format!("{n:08x}")).collect();
    let input = format!("big.jif: {}, \n", hashes.join(", "));
    main_binary().arg(path_of(&plot)).write_stdin(input).assert().success();
    plot.assert(predicate::str::contains("2,500"));
}

#[test]
fn empty_hash_lists_and_empty_input_are_fine() {
    let temp = TempDir::new().unwrap();
    let plot = temp.child("plot.svg");
    main_binary().arg(path_of(&plot)).write_stdin("a.txt: \n").assert().success();
    plot.assert(predicate::str::contains("a.txt"));

    let empty = temp.child("empty.svg");
    main_binary().arg(path_of(&empty)).write_stdin("").assert().success();
    empty.assert(predicate::str::contains(TITLE));
}

#[test]
fn malformed_line_fails_without_writing() {
    let temp = TempDir::new().unwrap();
    let plot = temp.child("plot.svg");
    main_binary()
        .arg(path_of(&plot))
        .write_stdin("a.txt: 1, 2\nbadline\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains(COMPLAINT))
        .stderr(predicate::str::contains("Line 2"));
    plot.assert(predicate::path::missing());
}

#[test]
fn no_output_file_prints_usage_then_fails() {
    main_binary()
        .write_stdin("a.txt: 1\n")
        .assert()
        .failure()
        .stdout(predicate::str::contains(USAGE))
        .stderr(predicate::str::contains("no output file name was given"));
}

#[test]
fn no_output_file_still_checks_the_input() {
    main_binary()
        .write_stdin("badline\n")
        .assert()
        .failure()
        .stdout(predicate::str::contains(USAGE))
        .stderr(predicate::str::contains(COMPLAINT));
}

#[test]
fn two_output_files_print_usage_and_write_the_first() {
    let temp = TempDir::new().unwrap();
    let first = temp.child("first.svg");
    let second = temp.child("second.svg");
    main_binary()
        .args([path_of(&first), path_of(&second)])
        .write_stdin("a.txt: 1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(USAGE));
    first.assert(predicate::path::exists());
    second.assert(predicate::path::missing());
}

#[test]
fn writes_a_png_plot() {
    let temp = TempDir::new().unwrap();
    let plot = temp.child("plot.png");
    main_binary()
        .arg(path_of(&plot))
        .write_stdin("a.txt: 1, 2, 3\nb.txt: 2, 3, 4\n")
        .assert()
        .success()
        .stdout("");
    let bytes = std::fs::read(plot.path()).unwrap();
    assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
    assert!(bytes.len() > 100);
}

#[test]
fn a_trailing_dot_writes_svg() {
    let temp = TempDir::new().unwrap();
    let plot = temp.child("plot.");
    main_binary().arg(path_of(&plot)).write_stdin("a.txt: 1\n").assert().success();
    plot.assert(predicate::str::starts_with("<svg "));
}

#[test]
fn unsupported_extension_fails() {
    let temp = TempDir::new().unwrap();
    let plot = temp.child("plot.pdf");
    main_binary()
        .arg(path_of(&plot))
        .write_stdin("a.txt: 1\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Can't write pdf files"));
    plot.assert(predicate::path::missing());
}

#[test]
fn utf16_input_is_accepted() {
    let temp = TempDir::new().unwrap();
    let plot = temp.child("plot.svg");
    let mut input = b"\xff\xfe".to_vec();
    for b in "x.jif: 1, 2\ny.jif: 2\n".bytes() {
        input.push(b);
        input.push(0);
    }
    main_binary().arg(path_of(&plot)).write_stdin(input).assert().success();
    plot.assert(predicate::str::contains("x.jif").and(predicate::str::contains("y.jif")));
}
