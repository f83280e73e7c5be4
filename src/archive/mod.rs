pub mod integrity;

use crate::util;
use crate::variant::{Category, FileVariant, VariantId};
use ahash::AHashSet;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{debug, trace, warn};

/// Variants already handled for one category during one invocation.
#[derive(Debug)]
pub struct DedupIndex {
    category: Category,
    seen: AHashSet<VariantId>,
}

impl DedupIndex {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            seen: AHashSet::new(),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn contains(&self, id: &VariantId) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    fn insert(&mut self, id: VariantId) {
        self.seen.insert(id);
    }
}

/// One index per category, so equal names in different categories never collide.
#[derive(Debug)]
pub struct CategoryIndexes {
    indexes: Vec<DedupIndex>,
}

impl CategoryIndexes {
    pub fn new() -> Self {
        Self {
            indexes: Category::ALL.iter().map(|c| DedupIndex::new(*c)).collect(),
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut DedupIndex {
        let pos = Category::ALL
            .iter()
            .position(|c| *c == category)
            .unwrap_or_default();
        &mut self.indexes[pos]
    }

    pub fn total(&self) -> usize {
        self.indexes.iter().map(DedupIndex::len).sum()
    }
}

impl Default for CategoryIndexes {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// Copied into the archive for the first time.
    Copied,
    /// Already handled earlier in this invocation.
    AlreadyIndexed,
    /// Archived by an earlier invocation, content matches.
    ExistingVerified,
    /// Archived by an earlier invocation with different content. The archived
    /// copy is kept.
    ExistingMismatch,
    /// Archived by an earlier invocation, verification disabled.
    ExistingUnchecked,
}

/// Deduplicated store of file variants under the ledger root. Archived copies
/// are never overwritten.
#[derive(Debug, Clone)]
pub struct Archive {
    root: PathBuf,
    verify_existing: bool,
}

impl Archive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            verify_existing: true,
        }
    }

    pub fn with_verify_existing(mut self, verify: bool) -> Self {
        self.verify_existing = verify;
        self
    }

    pub fn category_dir(&self, category: Category) -> PathBuf {
        category.join_dir(&self.root)
    }

    pub fn path_for(&self, category: Category, encoded_name: &str) -> PathBuf {
        self.category_dir(category).join(encoded_name)
    }

    pub fn contains(&self, category: Category, encoded_name: &str) -> bool {
        self.path_for(category, encoded_name).is_file()
    }

    pub fn store(&self, index: &mut DedupIndex, variant: &FileVariant) -> io::Result<StoreOutcome> {
        if index.contains(&variant.id) {
            trace!("{} already indexed", variant.source.display());
            return Ok(StoreOutcome::AlreadyIndexed);
        }

        let dest_dir = self.category_dir(variant.category);
        if !dest_dir.is_dir() {
            fs::create_dir_all(&dest_dir)?;
        }
        let destination = dest_dir.join(variant.id.encode());

        let outcome = if destination.is_file() {
            if self.verify_existing {
                if integrity::same_content(&variant.source, &destination)? {
                    StoreOutcome::ExistingVerified
                } else {
                    warn!(
                        "{} differs from archived copy {}, keeping the archived copy",
                        variant.source.display(),
                        destination.display()
                    );
                    StoreOutcome::ExistingMismatch
                }
            } else {
                StoreOutcome::ExistingUnchecked
            }
        } else {
            util::copy_preserving_mtime(&variant.source, &destination)?;
            debug!("Archived {} as {}", variant.source.display(), destination.display());
            StoreOutcome::Copied
        };

        index.insert(variant.id.clone());
        Ok(outcome)
    }

    /// Number of archived copies in a category.
    pub fn count(&self, category: Category) -> io::Result<usize> {
        let dir = self.category_dir(category);
        if !dir.is_dir() {
            return Ok(0);
        }
        let mut count = 0;
        for entry in fs::read_dir(dir)? {
            if entry?.file_type()?.is_file() {
                count += 1;
            }
        }
        Ok(count)
    }
}
