//! Shared test utilities for E2E tests.
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = TestFixture::new().with_layout(layouts::BASE_AND_OVERLAYS);
//! fixture.command().arg("scan").arg(fixture.path()).assert().success();
//! ```

use assert_fs::prelude::*;
use std::env;
use std::path::Path;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::layouts;
    #[allow(unused_imports)]
    pub use super::should_skip_network_tests;
    pub use super::TestFixture;
}

/// Manifest trees as `(directory, kustomization.yaml content)` pairs.
#[allow(dead_code)]
pub mod layouts {
    pub type Layout = &'static [(&'static str, &'static str)];

    /// A base, a component and two overlays.
    pub const BASE_AND_OVERLAYS: Layout = &[
        ("base", "resources:\n  - deployment.yaml\n  - service.yaml\n"),
        ("shared/components/monitoring", "apiVersion: kustomize.config.k8s.io/v1alpha1\nkind: Component\n"),
        (
            "overlays/staging",
            "resources:\n  - ../../base\ncomponents:\n  - ../../shared/components/monitoring\n",
        ),
        ("overlays/prod", "resources:\n  - ../../base\nnamePrefix: prod-\n"),
    ];

    /// Two manifests referencing each other.
    pub const CYCLE: Layout = &[
        ("a", "resources:\n  - ../b\n"),
        ("b", "resources:\n  - ../a\n"),
    ];

    /// A valid base next to a manifest that is not a mapping.
    pub const WITH_INVALID: Layout = &[
        ("base", "resources: []\n"),
        ("broken", "- this\n- is a list\n"),
    ];
}

/// Returns `true` if the `SKIP_NETWORK_TESTS` environment variable is set.
#[allow(dead_code)]
pub fn should_skip_network_tests() -> bool {
    env::var("SKIP_NETWORK_TESTS").is_ok()
}

/// A temporary directory populated with kustomization files.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `<dir>/kustomization.yaml` for every entry of `layout`.
    pub fn with_layout(self, layout: layouts::Layout) -> Self {
        layout
            .iter()
            .fold(self, |fixture, (dir, content)| fixture.with_manifest(dir, content))
    }

    /// Write `<dir>/kustomization.yaml`.
    pub fn with_manifest(self, dir: &str, content: &str) -> Self {
        let path = if dir == "." {
            "kustomization.yaml".to_string()
        } else {
            format!("{}/kustomization.yaml", dir)
        };
        self.with_file(&path, content)
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// A command for the kustomap binary, isolated from the caller's
    /// environment.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("kustomap");
        cmd.current_dir(self.path())
            .env_remove("RUST_LOG")
            .env_remove("KUSTOMAP_CONFIG")
            .env_remove("GITHUB_TOKEN")
            .env_remove("GITLAB_TOKEN")
            .env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_writes_layout() {
        let fixture = TestFixture::new().with_layout(layouts::BASE_AND_OVERLAYS);
        assert!(fixture.path().join("base/kustomization.yaml").exists());
        assert!(fixture.path().join("overlays/prod/kustomization.yaml").exists());
    }

    #[test]
    fn test_root_manifest() {
        let fixture = TestFixture::new().with_manifest(".", "resources: []");
        assert!(fixture.path().join("kustomization.yaml").exists());
    }
}
