//! Test helpers for laying out category directories and product catalogues.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

pub(super) const TV_CATEGORY: &str = include_str!("../../../demos/categories/tv.json");
pub(super) const TV_PRODUCTS: &str = include_str!("../../../demos/products/tv.json");

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    hmum_fs::write_utf8_file(path, contents).expect("write test file");
}

/// A temporary workspace holding `categories/tv.json` and `products.json`.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        let workspace = Self { _dir: dir, root };
        write_utf8(&workspace.category_path("tv"), TV_CATEGORY.as_bytes());
        write_utf8(&workspace.products_path(), TV_PRODUCTS.as_bytes());
        workspace
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn config_dir(&self) -> Utf8PathBuf {
        self.root.join("categories")
    }

    pub(super) fn category_path(&self, id: &str) -> Utf8PathBuf {
        self.config_dir().join(format!("{id}.json"))
    }

    pub(super) fn products_path(&self) -> Utf8PathBuf {
        self.root.join("products.json")
    }
}
