//! End-to-end tests for the `kustomap cycles` command.

#[allow(dead_code)]
mod common;
use common::prelude::*;

#[test]
fn test_no_cycles() {
    let fixture = TestFixture::new().with_layout(layouts::BASE_AND_OVERLAYS);

    fixture
        .command()
        .arg("cycles")
        .arg(fixture.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No cycles found"));
}

#[test]
fn test_cycle_is_printed() {
    let fixture = TestFixture::new().with_layout(layouts::CYCLE);

    fixture
        .command()
        .arg("cycles")
        .arg(fixture.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("cycle: a -> b -> a"));
}

#[test]
fn test_fail_on_cycle_exits_with_one() {
    let fixture = TestFixture::new().with_layout(layouts::CYCLE);

    fixture
        .command()
        .args(["cycles", "--fail-on-cycle"])
        .arg(fixture.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("1 dependency cycle(s) found"));
}

#[test]
fn test_self_reference_is_a_cycle() {
    let fixture = TestFixture::new().with_manifest("loop", "resources:\n  - .\n");

    fixture
        .command()
        .arg("cycles")
        .arg(fixture.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("cycle: loop -> loop"));
}
