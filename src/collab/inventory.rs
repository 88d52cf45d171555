//! Inventory rows and item images, always scoped to the owning user.

pub mod memory;

pub use memory::MemoryInventory;

// self
use crate::{
	_prelude::*,
	collab::{CollabFuture, CollaboratorError},
	id::UserId,
};

/// Stored inventory row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
	/// Row identifier assigned by the store.
	pub id: String,
	/// Owning user.
	pub user_id: UserId,
	/// Item name.
	pub name: String,
	/// Price paid for the item.
	pub purchase_price: Option<Decimal>,
	/// Asking price.
	pub selling_price: Option<Decimal>,
	/// Free-form storage location.
	pub storage_location: Option<String>,
	/// Free-form notes.
	pub notes: Option<String>,
	/// Free-form status label (e.g. `listed`, `sold`).
	pub status: Option<String>,
	/// Public URL of the uploaded image.
	#[serde(rename = "imageURL")]
	pub image_url: Option<String>,
	/// Insertion instant; listings are ordered on it, newest first.
	#[serde(rename = "dateadded", with = "time::serde::rfc3339")]
	pub date_added: OffsetDateTime,
}

/// Fields supplied when creating an inventory row.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewInventoryItem {
	/// Item name.
	pub name: String,
	/// Price paid for the item.
	pub purchase_price: Option<Decimal>,
	/// Asking price.
	pub selling_price: Option<Decimal>,
	/// Free-form storage location.
	pub storage_location: Option<String>,
	/// Free-form notes.
	pub notes: Option<String>,
	/// Free-form status label.
	pub status: Option<String>,
	/// Public URL of an already uploaded image.
	#[serde(rename = "imageURL")]
	pub image_url: Option<String>,
}
impl NewInventoryItem {
	/// Creates a row with only a name.
	pub fn named(name: impl Into<String>) -> Self {
		Self { name: name.into(), ..Default::default() }
	}
}

/// Partial update; `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryPatch {
	/// New name.
	pub name: Option<String>,
	/// New purchase price.
	pub purchase_price: Option<Decimal>,
	/// New asking price.
	pub selling_price: Option<Decimal>,
	/// New storage location.
	pub storage_location: Option<String>,
	/// New notes.
	pub notes: Option<String>,
	/// New status label.
	pub status: Option<String>,
	/// New image URL.
	#[serde(rename = "imageURL")]
	pub image_url: Option<String>,
}
impl InventoryPatch {
	/// Writes every set field onto `item`.
	pub fn apply(self, item: &mut InventoryItem) {
		if let Some(name) = self.name {
			item.name = name;
		}
		if self.purchase_price.is_some() {
			item.purchase_price = self.purchase_price;
		}
		if self.selling_price.is_some() {
			item.selling_price = self.selling_price;
		}
		if self.storage_location.is_some() {
			item.storage_location = self.storage_location;
		}
		if self.notes.is_some() {
			item.notes = self.notes;
		}
		if self.status.is_some() {
			item.status = self.status;
		}
		if self.image_url.is_some() {
			item.image_url = self.image_url;
		}
	}
}

/// Image file handed to [`InventoryStore::upload_image`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageUpload {
	/// Original file name; becomes the suffix of the stored object name.
	pub file_name: String,
	/// MIME type stored alongside the bytes.
	pub content_type: String,
	/// Raw file contents.
	pub bytes: Vec<u8>,
}

/// Row-level inventory CRUD plus image storage.
pub trait InventoryStore
where
	Self: Send + Sync,
{
	/// Inserts a row owned by `user_id` and returns it as stored.
	fn insert<'a>(
		&'a self,
		user_id: &'a UserId,
		item: NewInventoryItem,
	) -> CollabFuture<'a, InventoryItem>;

	/// Lists the rows owned by `user_id`, newest `date_added` first.
	fn list_for_user<'a>(&'a self, user_id: &'a UserId) -> CollabFuture<'a, Vec<InventoryItem>>;

	/// Applies `patch` to `item_id` when it belongs to `user_id`; `false` when nothing matched.
	fn update<'a>(
		&'a self,
		item_id: &'a str,
		user_id: &'a UserId,
		patch: InventoryPatch,
	) -> CollabFuture<'a, bool>;

	/// Deletes `item_id` when it belongs to `user_id`; `false` when nothing matched.
	fn delete<'a>(&'a self, item_id: &'a str, user_id: &'a UserId) -> CollabFuture<'a, bool>;

	/// Stores the image (replacing any object with the same name) and returns its public URL.
	fn upload_image(&self, upload: ImageUpload) -> CollabFuture<'_, String>;
}

pub(crate) fn validate_file_name(name: &str) -> Result<(), CollaboratorError> {
	if name.trim().is_empty() {
		return Err(CollaboratorError::invalid("image file name is empty"));
	}
	if name.contains(['/', '\\']) {
		return Err(CollaboratorError::invalid("image file name must not contain path separators"));
	}

	Ok(())
}
