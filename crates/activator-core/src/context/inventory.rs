//! Project file inventory.
//!
//! Produces the `area -> category -> files` listing stored in the context,
//! plus the most recently modified files for the recent-changes block.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use activator_models::FileInventory;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{CoreError, Result};

/// Category used for files sitting directly inside an area.
pub const ROOT_CATEGORY: &str = "root";

/// A file path with its modification time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentFile {
    /// Path relative to the project root, `/`-separated.
    pub path: String,
    pub modified: DateTime<Utc>,
}

/// Listing and recent files taken from the same pass over the project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryScan {
    pub files: FileInventory,
    /// Newest first.
    pub recent: Vec<RecentFile>,
}

/// Read-only listing of the project's source areas.
#[async_trait]
pub trait ProjectInventory: Send + Sync {
    /// Snapshot of the inventory.
    async fn snapshot(&self) -> Result<FileInventory>;

    /// Up to `limit` most recently modified files, newest first.
    async fn recent_files(&self, _limit: usize) -> Result<Vec<RecentFile>> {
        Ok(Vec::new())
    }

    /// Listing plus up to `recent_limit` recent files. Implementations that
    /// walk the file system override this to walk once.
    async fn scan(&self, recent_limit: usize) -> Result<InventoryScan> {
        Ok(InventoryScan {
            files: self.snapshot().await?,
            recent: self.recent_files(recent_limit).await?,
        })
    }
}

/// Fixed inventory, e.g. from the config file.
#[derive(Debug, Clone, Default)]
pub struct StaticInventory {
    inventory: FileInventory,
}

impl StaticInventory {
    pub fn new(inventory: FileInventory) -> Self {
        Self { inventory }
    }
}

#[async_trait]
impl ProjectInventory for StaticInventory {
    async fn snapshot(&self) -> Result<FileInventory> {
        Ok(self.inventory.clone())
    }
}

/// Inventory produced by walking areas below a project root.
///
/// The first directory below an area is the category; deeper files keep
/// their path relative to that category directory. Hidden entries are
/// skipped and areas that do not exist are left out.
#[derive(Debug, Clone)]
pub struct DirectoryInventory {
    root: PathBuf,
    areas: Vec<String>,
    max_depth: usize,
}

#[derive(Debug)]
struct ScannedFile {
    area: String,
    category: String,
    name: String,
    path: String,
    modified: DateTime<Utc>,
}

impl DirectoryInventory {
    pub fn new(root: impl Into<PathBuf>, areas: Vec<String>, max_depth: usize) -> Self {
        Self {
            root: root.into(),
            areas,
            max_depth: max_depth.max(1),
        }
    }

    async fn walk_areas(&self) -> Result<Vec<ScannedFile>> {
        let scanner = self.clone();
        tokio::task::spawn_blocking(move || scanner.scan_blocking())
            .await
            .map_err(|e| CoreError::Inventory(format!("scan task failed: {}", e)))?
    }

    fn scan_blocking(&self) -> Result<Vec<ScannedFile>> {
        if !self.root.is_dir() {
            return Err(CoreError::Inventory(format!(
                "project root {} is not a directory",
                self.root.display()
            )));
        }

        let mut files = Vec::new();
        for area in &self.areas {
            let area_dir = self.root.join(area);
            if area_dir.is_dir() {
                self.walk(area, &area_dir, &area_dir, 0, &mut files)?;
            }
        }
        Ok(files)
    }

    fn walk(
        &self,
        area: &str,
        area_dir: &Path,
        dir: &Path,
        depth: usize,
        out: &mut Vec<ScannedFile>,
    ) -> Result<()> {
        if depth >= self.max_depth {
            return Ok(());
        }

        let entries = fs::read_dir(dir)
            .map_err(|e| CoreError::Inventory(format!("{}: {}", dir.display(), e)))?;

        for entry in entries {
            let entry = entry.map_err(|e| CoreError::Inventory(e.to_string()))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }

            let path = entry.path();
            let meta = entry
                .metadata()
                .map_err(|e| CoreError::Inventory(format!("{}: {}", path.display(), e)))?;

            if meta.is_dir() {
                self.walk(area, area_dir, &path, depth + 1, out)?;
            } else if meta.is_file() {
                let modified = meta
                    .modified()
                    .map(DateTime::<Utc>::from)
                    .unwrap_or_else(|_| Utc::now());
                out.push(self.classify(area, area_dir, &path, modified));
            }
        }
        Ok(())
    }

    fn classify(
        &self,
        area: &str,
        area_dir: &Path,
        path: &Path,
        modified: DateTime<Utc>,
    ) -> ScannedFile {
        let in_area: Vec<String> = path
            .strip_prefix(area_dir)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        let (category, name) = match in_area.split_first() {
            Some((first, rest)) if !rest.is_empty() => (first.clone(), rest.join("/")),
            _ => (ROOT_CATEGORY.to_string(), in_area.join("/")),
        };

        ScannedFile {
            area: area.to_string(),
            path: format!("{}/{}", area.trim_end_matches('/'), in_area.join("/")),
            category,
            name,
            modified,
        }
    }
}

fn group(files: &[ScannedFile]) -> FileInventory {
    let mut inventory: FileInventory = BTreeMap::new();
    for file in files {
        inventory
            .entry(file.area.clone())
            .or_default()
            .entry(file.category.clone())
            .or_default()
            .push(file.name.clone());
    }
    for categories in inventory.values_mut() {
        for names in categories.values_mut() {
            names.sort();
        }
    }
    inventory
}

fn newest(mut files: Vec<ScannedFile>, limit: usize) -> Vec<RecentFile> {
    files.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.path.cmp(&b.path)));
    files
        .into_iter()
        .take(limit)
        .map(|f| RecentFile {
            path: f.path,
            modified: f.modified,
        })
        .collect()
}

#[async_trait]
impl ProjectInventory for DirectoryInventory {
    async fn snapshot(&self) -> Result<FileInventory> {
        Ok(group(&self.walk_areas().await?))
    }

    async fn recent_files(&self, limit: usize) -> Result<Vec<RecentFile>> {
        Ok(newest(self.walk_areas().await?, limit))
    }

    async fn scan(&self, recent_limit: usize) -> Result<InventoryScan> {
        let files = self.walk_areas().await?;
        Ok(InventoryScan {
            files: group(&files),
            recent: newest(files, recent_limit),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[tokio::test]
    async fn test_static_inventory() {
        let mut inventory = FileInventory::new();
        inventory
            .entry("src".into())
            .or_default()
            .insert("components".into(), vec!["OrderForm.vue".into()]);

        let source = StaticInventory::new(inventory.clone());
        assert_eq!(source.snapshot().await.unwrap(), inventory);
        assert!(source.recent_files(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_directory_inventory_groups_by_category() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "src/main.js");
        touch(dir.path(), "src/components/OrderForm.vue");
        touch(dir.path(), "src/components/print/Receipt.vue");
        touch(dir.path(), "src/views/Orders.vue");
        touch(dir.path(), "src/.hidden/secret.js");
        touch(dir.path(), "scripts/metrics.js");
        touch(dir.path(), "node_modules/lib/index.js");

        let inventory = DirectoryInventory::new(
            dir.path(),
            vec!["src".into(), "scripts".into(), "public".into()],
            4,
        );
        let snapshot = inventory.snapshot().await.unwrap();

        let src = &snapshot["src"];
        assert_eq!(src["root"], vec!["main.js".to_string()]);
        assert_eq!(
            src["components"],
            vec!["OrderForm.vue".to_string(), "print/Receipt.vue".to_string()]
        );
        assert_eq!(src["views"], vec!["Orders.vue".to_string()]);
        assert!(!src.contains_key(".hidden"));
        assert_eq!(snapshot["scripts"]["root"], vec!["metrics.js".to_string()]);
        assert!(!snapshot.contains_key("public"));
        assert!(!snapshot.contains_key("node_modules"));
    }

    #[tokio::test]
    async fn test_directory_inventory_respects_depth() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "src/a/b/c/deep.js");
        touch(dir.path(), "src/a/shallow.js");

        let inventory = DirectoryInventory::new(dir.path(), vec!["src".into()], 2);
        let snapshot = inventory.snapshot().await.unwrap();
        assert_eq!(snapshot["src"]["a"], vec!["shallow.js".to_string()]);
    }

    #[tokio::test]
    async fn test_recent_files_limit_and_paths() {
        let dir = tempdir().unwrap();
        for i in 0..5 {
            touch(dir.path(), &format!("src/views/View{}.vue", i));
        }

        let inventory = DirectoryInventory::new(dir.path(), vec!["src".into()], 4);
        let recent = inventory.recent_files(3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert!(recent.iter().all(|f| f.path.starts_with("src/views/View")));
        assert!(recent.windows(2).all(|w| w[0].modified >= w[1].modified));
    }

    #[tokio::test]
    async fn test_scan_listing_and_recent_agree() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "src/main.js");
        touch(dir.path(), "src/views/Orders.vue");
        touch(dir.path(), "public/logo.svg");

        let inventory = DirectoryInventory::new(
            dir.path(),
            vec!["src".into(), "public".into()],
            4,
        );
        let scan = inventory.scan(10).await.unwrap();

        assert_eq!(scan.recent.len(), 3);
        assert_eq!(scan.files, inventory.snapshot().await.unwrap());
        for file in &scan.recent {
            let (area, rest) = file.path.split_once('/').unwrap();
            let listed = scan.files[area].iter().any(|(category, names)| {
                names.iter().any(|name| {
                    (category == ROOT_CATEGORY && name == rest)
                        || rest == format!("{}/{}", category, name)
                })
            });
            assert!(listed, "{} missing from listing", file.path);
        }
    }

    #[tokio::test]
    async fn test_missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        let inventory = DirectoryInventory::new(dir.path().join("gone"), vec!["src".into()], 4);
        assert!(matches!(
            inventory.snapshot().await,
            Err(CoreError::Inventory(_))
        ));
        assert!(matches!(inventory.scan(5).await, Err(CoreError::Inventory(_))));
    }
}
