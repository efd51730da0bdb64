//! Test helpers: layer files on disk and a routing client double.

use std::cell::RefCell;
use std::rc::Rc;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;
use waymatrix_core::test_support::StubMatrixClient;
use waymatrix_core::{ApiError, MatrixClient, MatrixRequest, MatrixResponse};

use crate::CliError;
use crate::matrix::{MatrixClientBuilder, MatrixConfig};

pub(super) const STOPS: &str = r#"{"type": "FeatureCollection", "features": [
    {"type": "Feature", "properties": {"name": "A"}, "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}},
    {"type": "Feature", "properties": {"name": "B"}, "geometry": {"type": "Point", "coordinates": [1.0, 1.0]}}
]}"#;

pub(super) const SHOPS: &str = r#"{"type": "FeatureCollection", "features": [
    {"type": "Feature", "properties": {"ref": 7}, "geometry": {"type": "Point", "coordinates": [2.0, 2.0]}},
    {"type": "Feature", "properties": {"ref": 8}, "geometry": {"type": "Point", "coordinates": [3.0, 3.0]}}
]}"#;

pub(super) const MULTI_STOPS: &str = r#"{"type": "FeatureCollection", "features": [
    {"type": "Feature", "properties": {"name": "A"}, "geometry": {"type": "MultiPoint", "coordinates": [[0.0, 0.0], [0.5, 0.5]]}}
]}"#;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write test file");
}

/// Temporary directory holding the layers used by a test.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn layer(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(name);
        write_utf8(&path, contents.as_bytes());
        path
    }
}

/// Forwards to a shared stub so tests can inspect requests after the run.
struct SharedStub(Rc<StubMatrixClient>);

impl MatrixClient for SharedStub {
    fn request(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        body: &MatrixRequest,
    ) -> Result<MatrixResponse, ApiError> {
        self.0.request(endpoint, query, body)
    }
}

/// Hands out a [`StubMatrixClient`] and remembers the configuration it saw.
#[derive(Debug)]
pub(super) struct StubClientBuilder {
    client: Rc<StubMatrixClient>,
    configs: RefCell<Vec<MatrixConfig>>,
}

impl StubClientBuilder {
    pub(super) fn new(client: StubMatrixClient) -> Self {
        Self {
            client: Rc::new(client),
            configs: RefCell::new(Vec::new()),
        }
    }

    pub(super) fn client(&self) -> &StubMatrixClient {
        &self.client
    }

    pub(super) fn configs(&self) -> Vec<MatrixConfig> {
        self.configs.borrow().clone()
    }
}

impl MatrixClientBuilder for StubClientBuilder {
    fn build(&self, config: &MatrixConfig) -> Result<Box<dyn MatrixClient>, CliError> {
        self.configs.borrow_mut().push(config.clone());
        Ok(Box::new(SharedStub(Rc::clone(&self.client))))
    }
}
