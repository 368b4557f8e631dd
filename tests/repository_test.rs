use marketplace::db;
use marketplace::domain::{
    CreateItemInput, CreateUserInput, DomainError, ItemRepository, MarketRepository,
    ProductRepository, RoleRepository, UpdateItemInput, UpdateUserInput, UserEmailRepository,
    UserRepository,
};
use marketplace::infrastructure::AppState;
use marketplace::models::item;
use sea_orm::{ActiveModelTrait, Set};

// Helper to create a test app state
async fn setup_test_state() -> AppState {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    AppState::new(db)
}

struct Fixture {
    user_id: i32,
    market_id: i32,
    product_id: i32,
}

// Helper to create a seller, a market and a product
async fn create_fixture(state: &AppState) -> Fixture {
    let user = state
        .user_repo
        .create(CreateUserInput {
            primary_email: "seller@example.com".to_string(),
            password: "password".to_string(),
            name: Some("Seller".to_string()),
            emails: vec![],
            role_ids: vec![],
        })
        .await
        .expect("Failed to create user");
    let market = state
        .market_repo
        .create("Farmers Market".to_string())
        .await
        .expect("Failed to create market");
    let product = state
        .product_repo
        .create("Vegetables".to_string())
        .await
        .expect("Failed to create product");

    Fixture {
        user_id: user.id,
        market_id: market.id,
        product_id: product.id,
    }
}

fn item_input(fixture: &Fixture, name: &str, price: f64) -> CreateItemInput {
    CreateItemInput {
        name: name.to_string(),
        description: Some(format!("Fresh {}", name)),
        price,
        user_id: fixture.user_id,
        market_id: fixture.market_id,
        product_id: fixture.product_id,
    }
}

#[tokio::test]
async fn test_market_crud() {
    let state = setup_test_state().await;

    let market = state
        .market_repo
        .create("  Nairobi  ".to_string())
        .await
        .unwrap();
    assert_eq!(market.name, "Nairobi");

    let renamed = state
        .market_repo
        .update(market.id, "Kampala".to_string())
        .await
        .unwrap();
    assert_eq!(renamed.name, "Kampala");

    let all = state.market_repo.find_all().await.unwrap();
    assert_eq!(all.len(), 1);

    state.market_repo.delete(market.id).await.unwrap();
    assert!(state.market_repo.find_by_id(market.id).await.unwrap().is_none());

    assert!(matches!(
        state.market_repo.delete(market.id).await,
        Err(DomainError::NotFound)
    ));
    assert!(matches!(
        state.market_repo.update(market.id, "Gone".to_string()).await,
        Err(DomainError::NotFound)
    ));
}

#[tokio::test]
async fn test_blank_names_rejected() {
    let state = setup_test_state().await;

    assert!(matches!(
        state.market_repo.create("   ".to_string()).await,
        Err(DomainError::Validation(_))
    ));
    assert!(matches!(
        state.product_repo.create(String::new()).await,
        Err(DomainError::Validation(_))
    ));
    assert!(matches!(
        state.role_repo.create(" ".to_string()).await,
        Err(DomainError::Validation(_))
    ));
}

#[tokio::test]
async fn test_product_crud() {
    let state = setup_test_state().await;

    let fruit = state.product_repo.create("Fruit".to_string()).await.unwrap();
    let grain = state.product_repo.create("Grain".to_string()).await.unwrap();

    let all = state.product_repo.find_all().await.unwrap();
    assert_eq!(
        all.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
        vec!["Fruit", "Grain"]
    );

    let updated = state
        .product_repo
        .update(grain.id, "Cereals".to_string())
        .await
        .unwrap();
    assert_eq!(updated.id, grain.id);
    assert_eq!(updated.name, "Cereals");

    state.product_repo.delete(fruit.id).await.unwrap();
    assert_eq!(state.product_repo.find_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_role_names_unique() {
    let state = setup_test_state().await;

    let admin = state.role_repo.create("admin".to_string()).await.unwrap();
    let user = state.role_repo.create("user".to_string()).await.unwrap();

    assert!(matches!(
        state.role_repo.create("admin".to_string()).await,
        Err(DomainError::Conflict(_))
    ));
    assert!(matches!(
        state.role_repo.update(user.id, "admin".to_string()).await,
        Err(DomainError::Conflict(_))
    ));
    // Same authority token, so the same role
    assert!(matches!(
        state.role_repo.create("ADMIN".to_string()).await,
        Err(DomainError::Conflict(_))
    ));
    assert!(matches!(
        state.role_repo.update(user.id, "Admin".to_string()).await,
        Err(DomainError::Conflict(_))
    ));

    // Renaming to its own name is not a conflict, whatever the case
    state
        .role_repo
        .update(admin.id, "Admin".to_string())
        .await
        .unwrap();

    assert_eq!(state.role_repo.find_all().await.unwrap().len(), 2);

    let found = state.role_repo.find_by_name("user").await.unwrap().unwrap();
    assert_eq!(found.id, user.id);
    assert!(state.role_repo.find_by_name("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn test_user_email_crud() {
    let state = setup_test_state().await;
    let fixture = create_fixture(&state).await;

    let email = state
        .user_email_repo
        .create(fixture.user_id, "Backup@Example.com".to_string())
        .await
        .unwrap();
    assert_eq!(email.useremail, "backup@example.com");

    let updated = state
        .user_email_repo
        .update(email.id, "Other@Example.com".to_string())
        .await
        .unwrap();
    assert_eq!(updated.useremail, "other@example.com");

    let for_user = state
        .user_email_repo
        .find_by_user(fixture.user_id)
        .await
        .unwrap();
    assert_eq!(for_user.len(), 1);

    assert!(matches!(
        state
            .user_email_repo
            .create(fixture.user_id, "not-an-email".to_string())
            .await,
        Err(DomainError::Validation(_))
    ));

    // Email rows need an existing user
    assert!(
        state
            .user_email_repo
            .create(9999, "orphan@example.com".to_string())
            .await
            .is_err()
    );

    state.user_email_repo.delete(email.id).await.unwrap();
    assert!(state.user_email_repo.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_item_crud() {
    let state = setup_test_state().await;
    let fixture = create_fixture(&state).await;

    let item = state
        .item_repo
        .create(item_input(&fixture, "Tomatoes", 2.5))
        .await
        .expect("Failed to create item");
    assert_eq!(item.name, "Tomatoes");
    assert_eq!(item.price, 2.5);
    assert_eq!(item.user.id, fixture.user_id);
    assert_eq!(item.user.primary_email, "seller@example.com");
    assert_eq!(item.market.name, "Farmers Market");
    assert_eq!(item.product.name, "Vegetables");

    let updated = state
        .item_repo
        .update(
            item.id,
            UpdateItemInput {
                price: Some(3.0),
                description: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.price, 3.0);
    assert_eq!(updated.description, None);
    assert_eq!(updated.name, "Tomatoes");

    let by_user = state.item_repo.find_by_user(fixture.user_id).await.unwrap();
    assert_eq!(by_user.len(), 1);
    let by_market = state
        .item_repo
        .find_by_market(fixture.market_id)
        .await
        .unwrap();
    assert_eq!(by_market.len(), 1);
    let by_product = state
        .item_repo
        .find_by_product(fixture.product_id)
        .await
        .unwrap();
    assert_eq!(by_product.len(), 1);

    let seller = state
        .user_repo
        .find_by_id(fixture.user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(seller.items.len(), 1);
    assert_eq!(seller.items[0].name, "Tomatoes");

    state.item_repo.delete(item.id).await.unwrap();
    assert!(state.item_repo.find_all().await.unwrap().is_empty());
    assert!(matches!(
        state.item_repo.delete(item.id).await,
        Err(DomainError::NotFound)
    ));
}

#[tokio::test]
async fn test_item_validation() {
    let state = setup_test_state().await;
    let fixture = create_fixture(&state).await;

    assert!(matches!(
        state.item_repo.create(item_input(&fixture, "  ", 1.0)).await,
        Err(DomainError::Validation(_))
    ));
    assert!(matches!(
        state
            .item_repo
            .create(item_input(&fixture, "Beans", f64::NAN))
            .await,
        Err(DomainError::Validation(_))
    ));
}

#[tokio::test]
async fn test_item_requires_existing_references() {
    let state = setup_test_state().await;
    let fixture = create_fixture(&state).await;

    let missing_user = CreateItemInput {
        user_id: 9999,
        ..item_input(&fixture, "Ghost", 1.0)
    };
    let missing_market = CreateItemInput {
        market_id: 9999,
        ..item_input(&fixture, "Ghost", 1.0)
    };
    let missing_product = CreateItemInput {
        product_id: 9999,
        ..item_input(&fixture, "Ghost", 1.0)
    };

    for input in [missing_user, missing_market, missing_product] {
        let result = state.item_repo.create(input).await;
        assert!(
            matches!(result, Err(DomainError::Constraint(_))),
            "expected constraint violation, got {:?}",
            result
        );
    }

    assert!(state.item_repo.find_all().await.unwrap().is_empty());

    // Repointing an existing item at a missing market is refused too
    let item = state
        .item_repo
        .create(item_input(&fixture, "Onions", 1.0))
        .await
        .unwrap();
    let result = state
        .item_repo
        .update(
            item.id,
            UpdateItemInput {
                market_id: Some(9999),
                ..Default::default()
            },
        )
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_raw_item_insert_hits_foreign_key() {
    let state = setup_test_state().await;
    let now = chrono::Utc::now().to_rfc3339();

    let orphan = item::ActiveModel {
        name: Set("Orphan".to_string()),
        price: Set(1.0),
        user_id: Set(1),
        market_id: Set(1),
        product_id: Set(1),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    assert!(orphan.insert(state.db()).await.is_err());
}

#[tokio::test]
async fn test_market_and_product_in_use_cannot_be_deleted() {
    let state = setup_test_state().await;
    let fixture = create_fixture(&state).await;

    state
        .item_repo
        .create(item_input(&fixture, "Kale", 1.2))
        .await
        .unwrap();

    assert!(matches!(
        state.market_repo.delete(fixture.market_id).await,
        Err(DomainError::Constraint(_))
    ));
    assert!(matches!(
        state.product_repo.delete(fixture.product_id).await,
        Err(DomainError::Constraint(_))
    ));
    assert!(
        state
            .market_repo
            .find_by_id(fixture.market_id)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_item_json_embeds_seller_without_items() {
    let state = setup_test_state().await;
    let fixture = create_fixture(&state).await;

    let item = state
        .item_repo
        .create(item_input(&fixture, "Carrots", 0.8))
        .await
        .unwrap();

    let json = serde_json::to_value(&item).unwrap();
    assert_eq!(json["user"]["primary_email"], "seller@example.com");
    assert!(json["user"].get("items").is_none());
    assert!(json["user"].get("password").is_none());
    assert_eq!(json["market"]["name"], "Farmers Market");

    let seller = state
        .user_repo
        .find_by_id(fixture.user_id)
        .await
        .unwrap()
        .unwrap();
    let json = serde_json::to_value(&seller).unwrap();
    assert_eq!(json["items"][0]["name"], "Carrots");
    assert!(json["items"][0].get("user").is_none());
}

#[tokio::test]
async fn test_create_input_collections_optional() {
    let input: CreateUserInput = serde_json::from_value(serde_json::json!({
        "primary_email": "json@example.com",
        "password": "pw",
        "name": null
    }))
    .unwrap();

    assert!(input.emails.is_empty());
    assert!(input.role_ids.is_empty());
}

#[tokio::test]
async fn test_json_null_clears_optional_fields() {
    let state = setup_test_state().await;
    let fixture = create_fixture(&state).await;
    let item = state
        .item_repo
        .create(item_input(&fixture, "Leeks", 1.5))
        .await
        .unwrap();

    // An absent field leaves the stored value alone
    let keep: UpdateUserInput = serde_json::from_str(r#"{"password":"rotated"}"#).unwrap();
    assert!(keep.name.is_none());
    let seller = state.user_repo.update(fixture.user_id, keep).await.unwrap();
    assert_eq!(seller.name.as_deref(), Some("Seller"));

    let clear: UpdateUserInput = serde_json::from_str(r#"{"name":null}"#).unwrap();
    assert_eq!(clear.name, Some(None));
    let seller = state.user_repo.update(fixture.user_id, clear).await.unwrap();
    assert_eq!(seller.name, None);

    let keep: UpdateItemInput = serde_json::from_str(r#"{"price":2.0}"#).unwrap();
    let updated = state.item_repo.update(item.id, keep).await.unwrap();
    assert_eq!(updated.description.as_deref(), Some("Fresh Leeks"));

    let clear: UpdateItemInput = serde_json::from_str(r#"{"description":null}"#).unwrap();
    assert_eq!(clear.description, Some(None));
    let updated = state.item_repo.update(item.id, clear).await.unwrap();
    assert_eq!(updated.description, None);
    assert_eq!(updated.price, 2.0);
}
