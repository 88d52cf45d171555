// crates.io
use url::Url;
// self
use market_scout::{
	collab::{
		CollaboratorError, IdentityProvider, ImageUpload, InventoryPatch, InventoryStore,
		MemoryIdentity, MemoryInventory, MemorySpreadsheet, NewInventoryItem, SheetRange,
		SpreadsheetStore, UserProfile, bearer_token,
	},
	error::Error,
	id::SpreadsheetId,
	rust_decimal::Decimal,
};

#[tokio::test]
async fn signed_in_user_manages_own_inventory() {
	let identity = MemoryIdentity::new();
	let base = Url::parse("https://project.supabase.co").expect("Storage base URL should parse.");
	let inventory = MemoryInventory::new(&base, "inventory");

	identity
		.sign_up("seller@example.com", "resale-42", UserProfile {
			username: Some("seller".into()),
			display_name: Some("Seller".into()),
		})
		.await
		.expect("Sign-up should succeed.");
	identity
		.sign_up("other@example.com", "resale-43", UserProfile::default())
		.await
		.expect("Second sign-up should succeed.");

	let session =
		identity.sign_in("seller@example.com", "resale-42").await.expect("Sign-in should succeed.");
	let other_session =
		identity.sign_in("other@example.com", "resale-43").await.expect("Sign-in should succeed.");
	let header = format!("Bearer {}", session.access_token.expose());
	let user = identity
		.resolve_user(bearer_token(&header).expect("Header should carry a bearer token."))
		.await
		.expect("Session token should resolve.");
	let image_url = inventory
		.upload_image(ImageUpload {
			file_name: "ae1.jpg".into(),
			content_type: "image/jpeg".into(),
			bytes: vec![0xff, 0xd8, 0xff],
		})
		.await
		.expect("Upload should succeed.");
	let item = inventory
		.insert(&user.id, NewInventoryItem {
			name: "Canon AE-1".into(),
			purchase_price: Some(Decimal::new(4_500, 2)),
			image_url: Some(image_url.clone()),
			..Default::default()
		})
		.await
		.expect("Insert should succeed.");

	assert!(image_url.starts_with("https://project.supabase.co/storage/v1/object/public/inventory/images/"));
	assert_eq!(item.user_id, user.id);

	let patch = InventoryPatch { selling_price: Some(Decimal::new(12_000, 2)), ..Default::default() };

	assert!(
		!inventory
			.update(&item.id, &other_session.user.id, patch.clone())
			.await
			.expect("Foreign update should run.")
	);
	assert!(inventory.update(&item.id, &user.id, patch).await.expect("Own update should run."));

	let rows = inventory.list_for_user(&user.id).await.expect("Listing should succeed.");

	assert_eq!(rows.len(), 1);
	assert_eq!(rows[0].selling_price, Some(Decimal::new(12_000, 2)));
	assert!(
		inventory
			.list_for_user(&other_session.user.id)
			.await
			.expect("Listing should succeed.")
			.is_empty()
	);
}

#[tokio::test]
async fn spreadsheet_rows_append_below_existing_data() {
	let sheet = MemorySpreadsheet::new(
		SpreadsheetId::new("1AbCdEf").expect("Spreadsheet identifier should be valid."),
	);
	let first = sheet
		.append_rows("Sheet1", vec![vec!["Canon AE-1".into(), "45.00".into()]])
		.await
		.expect("First append should succeed.");
	let second = sheet
		.append_rows("Sheet1", vec![vec!["Tripod".into(), "12.00".into()]])
		.await
		.expect("Second append should succeed.");

	assert_eq!(first.updated_range.to_string(), "Sheet1!A3:B3");
	assert_eq!(second.updated_range.to_string(), "Sheet1!A4:B4");

	let range: SheetRange = "Sheet1!A3:B4".parse().expect("Range should parse.");
	let values = sheet.read_range(&range).await.expect("Read should succeed.");

	assert_eq!(values, vec![vec!["Canon AE-1", "45.00"], vec!["Tripod", "12.00"]]);
}

#[tokio::test]
async fn collaborator_failures_convert_into_crate_errors() {
	let identity = MemoryIdentity::new();
	let err: Error = identity
		.resolve_user("expired-or-unknown")
		.await
		.expect_err("Unknown token should be rejected.")
		.into();

	assert!(matches!(err, Error::Collaborator(CollaboratorError::Unauthorized { .. })));
	assert!(!err.is_transient());
}
