//! Collaborator contracts for the listing backend and their in-memory implementations.
//!
//! The marketplace client does not depend on any of these. They describe the I/O the
//! surrounding service performs (inventory rows and images, spreadsheet sync, and user
//! identity) so handlers can be written and tested against the in-memory backends.

pub mod identity;
pub mod inventory;
pub mod sheets;

pub use identity::{IdentityProvider, MemoryIdentity, Session, User, UserProfile, bearer_token};
pub use inventory::{
	ImageUpload, InventoryItem, InventoryPatch, InventoryStore, MemoryInventory, NewInventoryItem,
};
pub use sheets::{AppendOutcome, CellRef, MemorySpreadsheet, SheetRange, SpreadsheetStore};

// self
use crate::_prelude::*;

/// Boxed future returned by every collaborator operation.
pub type CollabFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, CollaboratorError>> + 'a + Send>>;

/// Error type produced by collaborator implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CollaboratorError {
	/// Backend-level failure of the storage or identity service.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
	/// Caller input was rejected before reaching the backend.
	#[error("Invalid input: {message}.")]
	InvalidInput {
		/// Human-readable error payload.
		message: String,
	},
	/// Bearer token or credentials were missing, invalid, or expired.
	#[error("Unauthorized: {message}.")]
	Unauthorized {
		/// Human-readable error payload.
		message: String,
	},
	/// Record already exists.
	#[error("Conflict: {message}.")]
	Conflict {
		/// Human-readable error payload.
		message: String,
	},
}
impl CollaboratorError {
	pub(crate) fn invalid(message: impl Into<String>) -> Self {
		Self::InvalidInput { message: message.into() }
	}

	pub(crate) fn unauthorized(message: impl Into<String>) -> Self {
		Self::Unauthorized { message: message.into() }
	}
}
