//! Thread-safe in-memory [`InventoryStore`] for local development and tests.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	collab::{
		CollabFuture, CollaboratorError,
		inventory::{self, ImageUpload, InventoryItem, InventoryPatch, InventoryStore, NewInventoryItem},
	},
	id::UserId,
};

#[derive(Clone, Debug)]
struct Row {
	seq: u64,
	item: InventoryItem,
}

#[derive(Clone, Debug)]
struct StoredObject {
	content_type: String,
	bytes: Vec<u8>,
}

type RowMap = Arc<RwLock<HashMap<String, Row>>>;
type ObjectMap = Arc<RwLock<HashMap<String, StoredObject>>>;

/// In-process inventory rows plus an object bucket for images.
#[derive(Clone, Debug)]
pub struct MemoryInventory {
	rows: RowMap,
	objects: ObjectMap,
	next_seq: Arc<AtomicU64>,
	public_base: String,
	bucket: String,
}
impl MemoryInventory {
	/// Creates an empty store whose image URLs start with `public_base` and name `bucket`.
	pub fn new(public_base: &Url, bucket: impl Into<String>) -> Self {
		Self {
			rows: Default::default(),
			objects: Default::default(),
			next_seq: Default::default(),
			public_base: public_base.as_str().trim_end_matches('/').to_owned(),
			bucket: bucket.into(),
		}
	}

	/// Returns the bytes and content type stored under `path` (e.g. `images/1-a.png`).
	pub fn object(&self, path: &str) -> Option<(String, Vec<u8>)> {
		self.objects
			.read()
			.get(path)
			.map(|object| (object.content_type.clone(), object.bytes.clone()))
	}

	fn insert_now(&self, user_id: UserId, item: NewInventoryItem) -> Result<InventoryItem, CollaboratorError> {
		if item.name.trim().is_empty() {
			return Err(CollaboratorError::invalid("item name is empty"));
		}

		let seq = self.next_seq.fetch_add(1, Ordering::Relaxed) + 1;
		let stored = InventoryItem {
			id: format!("item-{seq}"),
			user_id,
			name: item.name,
			purchase_price: item.purchase_price,
			selling_price: item.selling_price,
			storage_location: item.storage_location,
			notes: item.notes,
			status: item.status,
			image_url: item.image_url,
			date_added: OffsetDateTime::now_utc(),
		};

		self.rows.write().insert(stored.id.clone(), Row { seq, item: stored.clone() });

		Ok(stored)
	}

	fn list_now(&self, user_id: &UserId) -> Vec<InventoryItem> {
		let mut rows = self
			.rows
			.read()
			.values()
			.filter(|row| &row.item.user_id == user_id)
			.cloned()
			.collect::<Vec<_>>();

		rows.sort_by(|a, b| (b.item.date_added, b.seq).cmp(&(a.item.date_added, a.seq)));

		rows.into_iter().map(|row| row.item).collect()
	}

	fn update_now(&self, item_id: &str, user_id: &UserId, patch: InventoryPatch) -> bool {
		let mut guard = self.rows.write();

		match guard.get_mut(item_id) {
			Some(row) if &row.item.user_id == user_id => {
				patch.apply(&mut row.item);

				true
			},
			_ => false,
		}
	}

	fn delete_now(&self, item_id: &str, user_id: &UserId) -> bool {
		let mut guard = self.rows.write();

		if guard.get(item_id).is_some_and(|row| &row.item.user_id == user_id) {
			guard.remove(item_id);

			true
		} else {
			false
		}
	}

	fn upload_now(&self, upload: ImageUpload) -> Result<String, CollaboratorError> {
		inventory::validate_file_name(&upload.file_name)?;

		let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
		let path = format!("images/{millis}-{}", upload.file_name);
		let url = format!(
			"{}/storage/v1/object/public/{}/{path}",
			self.public_base, self.bucket
		);

		self.objects
			.write()
			.insert(path, StoredObject { content_type: upload.content_type, bytes: upload.bytes });

		Ok(url)
	}
}
impl InventoryStore for MemoryInventory {
	fn insert<'a>(
		&'a self,
		user_id: &'a UserId,
		item: NewInventoryItem,
	) -> CollabFuture<'a, InventoryItem> {
		Box::pin(async move { self.insert_now(user_id.clone(), item) })
	}

	fn list_for_user<'a>(&'a self, user_id: &'a UserId) -> CollabFuture<'a, Vec<InventoryItem>> {
		Box::pin(async move { Ok(self.list_now(user_id)) })
	}

	fn update<'a>(
		&'a self,
		item_id: &'a str,
		user_id: &'a UserId,
		patch: InventoryPatch,
	) -> CollabFuture<'a, bool> {
		Box::pin(async move { Ok(self.update_now(item_id, user_id, patch)) })
	}

	fn delete<'a>(&'a self, item_id: &'a str, user_id: &'a UserId) -> CollabFuture<'a, bool> {
		Box::pin(async move { Ok(self.delete_now(item_id, user_id)) })
	}

	fn upload_image(&self, upload: ImageUpload) -> CollabFuture<'_, String> {
		Box::pin(async move { self.upload_now(upload) })
	}
}
