//! Orchestrator for complete scans
//!
//! [`Scanner`] owns everything that lives longer than one scan: the HTTP
//! client, the content cache, the fetch worker pool and the id counters. It
//! runs the phases in order and returns either a complete [`ScanReport`] or a
//! single error.

use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use rayon::ThreadPool;

use super::{assembly, discovery, parse, ScanReport, ScanWarning};
use crate::cache::ContentCache;
use crate::config::{Credentials, Settings};
use crate::content::ContentFetcher;
use crate::disambiguate::Resolution;
use crate::error::{Error, Result};
use crate::graph::GraphBuilder;
use crate::http::{HttpClient, HttpTransport, RetryPolicy, UreqTransport};
use crate::local::{self, LocalManifest};
use crate::node::NodeBuilder;
use crate::path;
use crate::provider::{hosting_api, HostingApi};
use crate::source::{parse_source_url, SourceUrl};
use crate::tree::TreeFetcher;

/// Runs scans against remote repositories and local directories.
pub struct Scanner {
    settings: Settings,
    credentials: Credentials,
    client: HttpClient,
    api_override: Option<Arc<dyn HostingApi>>,
    cache: ContentCache,
    nodes: NodeBuilder,
    edges: GraphBuilder,
    pool: ThreadPool,
}

impl Scanner {
    /// Create a scanner that talks to providers over HTTPS.
    pub fn new(settings: Settings, credentials: Credentials) -> Result<Self> {
        let transport = Arc::new(UreqTransport::new(&settings.http));
        Self::with_transport(settings, credentials, transport)
    }

    /// Create a scanner on top of a custom transport.
    pub fn with_transport(
        settings: Settings,
        credentials: Credentials,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        let client = HttpClient::new(transport, RetryPolicy::from(&settings.retry));
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(settings.scan.max_parallel_fetches.max(1))
            .thread_name(|i| format!("kustomap-fetch-{}", i))
            .build()?;

        Ok(Self {
            settings,
            credentials,
            client,
            api_override: None,
            cache: ContentCache::new(),
            nodes: NodeBuilder::new(),
            edges: GraphBuilder::new(),
            pool,
        })
    }

    /// Use `api` for every remote operation regardless of provider.
    pub fn with_api(mut self, api: Arc<dyn HostingApi>) -> Self {
        self.api_override = Some(api);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    /// Drop every cached manifest text.
    pub fn clear_cache(&self) -> Result<()> {
        self.cache.clear()
    }

    fn api_for(&self, source: &SourceUrl) -> Arc<dyn HostingApi> {
        match &self.api_override {
            Some(api) => Arc::clone(api),
            None => hosting_api(
                source.provider,
                &self.settings,
                &self.credentials,
                self.client.clone(),
            ),
        }
    }

    /// Resolve a repository URL to a coordinate without scanning it.
    pub fn resolve(&self, url: &str) -> Result<Resolution> {
        let source = parse_source_url(url)?;
        let api = self.api_for(&source);
        discovery::resolve(&source, api.as_ref())
    }

    /// Scan `source`: an `http(s)://` URL is scanned remotely, anything else
    /// is treated as a local directory.
    pub fn scan(&mut self, source: &str) -> Result<ScanReport> {
        if path::is_remote_reference(source) {
            self.scan_remote(source)
        } else {
            self.scan_local(Path::new(source))
        }
    }

    /// Scan a repository on a hosting provider.
    pub fn scan_remote(&mut self, url: &str) -> Result<ScanReport> {
        let source = parse_source_url(url)?;
        let api = self.api_for(&source);
        let mut warnings = Vec::new();

        let resolution = discovery::resolve(&source, api.as_ref())?;
        if resolution.is_low_confidence() {
            warnings.push(ScanWarning::LowConfidenceBranch {
                url: url.to_string(),
                branch: resolution.coordinate.branch.clone(),
            });
        }
        info!("Scanning {}", resolution.coordinate);

        let found = discovery::execute(&resolution.coordinate, &TreeFetcher::new(Arc::clone(&api)))?;
        if found.truncated {
            warnings.push(ScanWarning::TruncatedListing {
                coordinate: found.coordinate.to_string(),
            });
        }

        let contents = ContentFetcher::new(api, self.cache.clone());
        let texts = parse::fetch_all(&found, &contents, &self.pool)?;
        let scope = found.coordinate.to_string();

        let mut report = self.assemble(texts, Some(url), &scope)?;
        warnings.append(&mut report.warnings);
        report.warnings = warnings;
        report.resolution = Some(resolution);
        Ok(report)
    }

    /// Scan a directory on disk.
    pub fn scan_local(&mut self, root: &Path) -> Result<ScanReport> {
        let entries = local::enumerate_manifests(root)?;
        if entries.is_empty() {
            return Err(Error::NoManifestsFound {
                scope: root.display().to_string(),
            });
        }
        info!("Found {} manifest(s) under {}", entries.len(), root.display());
        self.scan_entries(entries, &root.display().to_string())
    }

    /// Scan pre-enumerated manifests, as supplied by a file-system
    /// collaborator. `scope` names the source in errors.
    pub fn scan_entries(&mut self, entries: Vec<LocalManifest>, scope: &str) -> Result<ScanReport> {
        if entries.is_empty() {
            return Err(Error::NoManifestsFound {
                scope: scope.to_string(),
            });
        }
        self.assemble(parse::from_local(entries), None, scope)
    }

    fn assemble(
        &mut self,
        texts: Vec<parse::ManifestText>,
        remote_source_url: Option<&str>,
        scope: &str,
    ) -> Result<ScanReport> {
        let (nodes, mut warnings) = parse::execute(texts, &self.nodes, remote_source_url);
        if nodes.is_empty() {
            warn!("None of the manifests in {} could be used", scope);
            return Err(Error::NoManifestsFound {
                scope: scope.to_string(),
            });
        }

        let assembled = assembly::execute(nodes, &mut self.edges);
        warnings.extend(assembled.warnings);

        Ok(ScanReport {
            graph: assembled.graph,
            cycles: assembled.cycles,
            warnings,
            resolution: None,
        })
    }
}
