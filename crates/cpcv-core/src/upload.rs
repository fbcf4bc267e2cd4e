//! Uploaded files and the per-run file collection.

use crate::category::Category;
use std::sync::Arc;
use uuid::Uuid;

/// A user-supplied file tagged with its evidence category.
///
/// The payload is shared immutably so conversion tasks can hold it without
/// copying the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    id: Uuid,
    name: String,
    media_type: String,
    bytes: Arc<[u8]>,
    category: Category,
    preview: String,
}

impl UploadedFile {
    /// Create a file with a fresh identifier.
    ///
    /// `media_type` is the declared MIME type (may be empty when unknown).
    pub fn new(
        category: Category,
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        let id = Uuid::new_v4();
        let name = name.into();
        let preview = format!("preview://{id}/{name}");
        Self {
            id,
            name,
            media_type: media_type.into(),
            bytes: bytes.into(),
            category,
            preview,
        }
    }

    /// Unique identifier within the run.
    #[inline]
    #[must_use = "returns the file identifier"]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Original file name, including extension.
    #[inline]
    #[must_use = "returns the file name"]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared MIME type.
    #[inline]
    #[must_use = "returns the declared media type"]
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Raw payload.
    #[inline]
    #[must_use = "returns the raw payload"]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Evidence category.
    #[inline]
    #[must_use = "returns the category"]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Display preview reference.
    #[inline]
    #[must_use = "returns the preview reference"]
    pub fn preview(&self) -> &str {
        &self.preview
    }
}

/// Every file selected for one validation run, in upload order.
///
/// Validation only borrows the set, so after a failed run the files and
/// their categories are still here for a retry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSet {
    files: Vec<UploadedFile>,
}

impl UploadSet {
    /// Create an empty set.
    #[must_use = "creates an empty upload set"]
    pub const fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Append one file.
    pub fn add(&mut self, file: UploadedFile) {
        self.files.push(file);
    }

    /// Remove a file by identifier, returning it if present.
    pub fn remove(&mut self, id: Uuid) -> Option<UploadedFile> {
        let index = self.files.iter().position(|f| f.id == id)?;
        Some(self.files.remove(index))
    }

    /// Files of one category in upload order.
    pub fn files_for(&self, category: Category) -> impl Iterator<Item = &UploadedFile> {
        self.files.iter().filter(move |f| f.category == category)
    }

    /// All files in upload order.
    #[must_use = "returns all files"]
    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    /// Categories that have no file yet, in canonical order.
    #[must_use = "returns categories still lacking evidence"]
    pub fn missing_categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.files_for(*c).next().is_none())
            .collect()
    }

    /// Number of files.
    #[must_use = "returns the number of files"]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True when no file has been added.
    #[must_use = "returns whether the set is empty"]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Drop every file, starting a fresh run.
    pub fn reset(&mut self) {
        self.files.clear();
    }
}

impl Extend<UploadedFile> for UploadSet {
    fn extend<T: IntoIterator<Item = UploadedFile>>(&mut self, iter: T) {
        self.files.extend(iter);
    }
}

impl FromIterator<UploadedFile> for UploadSet {
    fn from_iter<T: IntoIterator<Item = UploadedFile>>(iter: T) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(category: Category, name: &str) -> UploadedFile {
        UploadedFile::new(category, name, "image/png", vec![1u8, 2, 3])
    }

    #[test]
    fn test_new_file_metadata() {
        let f = file(Category::Owner, "cc.png");
        assert_eq!(f.name(), "cc.png");
        assert_eq!(f.media_type(), "image/png");
        assert_eq!(f.bytes(), &[1_u8, 2, 3]);
        assert_eq!(f.category(), Category::Owner);
        assert!(f.preview().starts_with("preview://"));
        assert!(f.preview().ends_with("/cc.png"));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = file(Category::Owner, "a.png");
        let b = file(Category::Owner, "a.png");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_files_for_keeps_upload_order() {
        let mut set = UploadSet::new();
        set.add(file(Category::Owner, "o1.png"));
        set.add(file(Category::Buyer, "b1.png"));
        set.add(file(Category::Owner, "o2.png"));
        set.add(file(Category::Owner, "o3.png"));

        let names: Vec<&str> = set.files_for(Category::Owner).map(UploadedFile::name).collect();
        assert_eq!(names, vec!["o1.png", "o2.png", "o3.png"]);
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_remove_and_reset() {
        let mut set = UploadSet::new();
        let keep = file(Category::Property, "caderneta.png");
        let stale = file(Category::Property, "wrong.png");
        let stale_id = stale.id();
        set.extend([keep, stale]);

        let removed = set.remove(stale_id).unwrap();
        assert_eq!(removed.name(), "wrong.png");
        assert!(set.remove(stale_id).is_none());
        assert_eq!(set.len(), 1);

        set.reset();
        assert!(set.is_empty());
    }

    #[test]
    fn test_missing_categories() {
        let set: UploadSet = [file(Category::Buyer, "b.png"), file(Category::Contract, "c.png")]
            .into_iter()
            .collect();
        assert_eq!(
            set.missing_categories(),
            vec![Category::Owner, Category::Property]
        );
        assert_eq!(UploadSet::new().missing_categories(), Category::ALL.to_vec());
    }
}
