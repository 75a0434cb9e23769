//! Database seeder for Atrium development and testing.
//!
//! Seeds an admin, an editor in the `Editors` group, the resource-type
//! catalog, the editors' grants, and a demo customer with one draft
//! transaction. Every step checks for existing rows first, so the seeder can
//! be re-run against the same database.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

use atrium_core::auth::hash_password;
use atrium_core::authz::{AuthorizationEngine, DEFAULT_ADMIN_ROLE, ResourceType};
use atrium_core::transaction::TransactionType;
use atrium_db::entities::{companies, groups, users};
use atrium_db::repositories::{
    CatalogCache, CreateResourceTypeInput, CreateTransactionInput, TransactionFilter,
};
use atrium_db::{
    CompanyRepository, GroupRepository, PermissionRepository, TransactionRepository,
    UserRepository,
};
use atrium_shared::types::{Currency, PageRequest};

const ADMIN_EMAIL: &str = "admin@atrium.dev";
const ADMIN_PASSWORD: &str = "admin-password";
const EDITOR_EMAIL: &str = "editor@atrium.dev";
const EDITOR_PASSWORD: &str = "editor-password";
const EDITORS_GROUP: &str = "Editors";
const DEMO_COMPANY: &str = "Messebau Nord GmbH";

/// (code, name, icon)
const RESOURCE_TYPES: [(&str, &str, &str); 7] = [
    ("User", "User", "user"),
    ("Company", "Company", "building"),
    ("Project", "Project", "folder"),
    ("Transaction", "Transaction", "receipt"),
    ("Group", "Group", "users"),
    ("ResourceType", "Resource type", "shield"),
    ("PermissionGrant", "Permission grant", "key"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("ATRIUM__DATABASE__URL"))
        .context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = atrium_db::connect(&database_url)
        .await
        .context("failed to connect to database")?;

    println!("Seeding users...");
    let admin = seed_user(
        &db,
        ADMIN_EMAIL,
        ADMIN_PASSWORD,
        "Ada Admin",
        &[DEFAULT_ADMIN_ROLE],
    )
    .await?;
    let editor = seed_user(&db, EDITOR_EMAIL, EDITOR_PASSWORD, "Eddie Editor", &[]).await?;

    println!("Seeding resource types...");
    let permissions = PermissionRepository::new(
        db.clone(),
        AuthorizationEngine::default(),
        CatalogCache::default(),
    );
    let mut catalog = Vec::with_capacity(RESOURCE_TYPES.len());
    for (code, name, icon) in RESOURCE_TYPES {
        catalog.push(seed_resource_type(&permissions, code, name, icon).await?);
    }

    println!("Seeding groups...");
    let editors = seed_editors(&db, &editor).await?;

    println!("Seeding grants...");
    let by_code = |code: &str| {
        catalog
            .iter()
            .find(|r| r.code == code)
            .with_context(|| format!("resource type {code} missing"))
    };
    let project = by_code("Project")?;
    let transaction = by_code("Transaction")?;
    permissions
        .set_grant(editors.id, project.id.into_inner(), true, false)
        .await?;
    permissions
        .set_grant(editors.id, transaction.id.into_inner(), true, true)
        .await?;

    println!("Seeding demo company and transaction...");
    let company = seed_company(&db).await?;
    seed_transaction(&db, &company, &admin, &editor).await?;

    println!("Seeding complete!");
    println!("  {ADMIN_EMAIL} / {ADMIN_PASSWORD}");
    println!("  {EDITOR_EMAIL} / {EDITOR_PASSWORD}");
    Ok(())
}

async fn seed_user(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
    full_name: &str,
    roles: &[&str],
) -> anyhow::Result<users::Model> {
    let repo = UserRepository::new(db.clone());
    if let Some(existing) = repo.find_by_email(email).await? {
        println!("  {email} already exists, skipping...");
        return Ok(existing);
    }

    let hash = hash_password(password)?;
    let user = repo.create(email, &hash, full_name, roles).await?;
    println!("  Created {email}");
    Ok(user)
}

async fn seed_resource_type(
    permissions: &PermissionRepository,
    code: &str,
    name: &str,
    icon: &str,
) -> anyhow::Result<ResourceType> {
    if let Some(existing) = permissions.find_resource_type(code).await? {
        return Ok(existing);
    }

    let created = permissions
        .create_resource_type(CreateResourceTypeInput {
            code: code.to_string(),
            name: name.to_string(),
            icon: Some(icon.to_string()),
        })
        .await?;
    println!("  Created resource type {code}");
    Ok(created)
}

async fn seed_editors(
    db: &DatabaseConnection,
    editor: &users::Model,
) -> anyhow::Result<groups::Model> {
    let repo = GroupRepository::new(db.clone());
    let group = match repo.find_by_name(EDITORS_GROUP).await? {
        Some(group) => group,
        None => repo.create(EDITORS_GROUP, &[]).await?,
    };

    if repo.add_member(group.id, editor.id).await? {
        println!("  Added {} to {EDITORS_GROUP}", editor.email);
    }
    Ok(group)
}

async fn seed_company(db: &DatabaseConnection) -> anyhow::Result<companies::Model> {
    let repo = CompanyRepository::new(db.clone());
    if let Some(existing) = repo.find_by_name(DEMO_COMPANY).await? {
        return Ok(existing);
    }
    Ok(repo
        .create(DEMO_COMPANY, Some("einkauf@messebau-nord.example"))
        .await?)
}

async fn seed_transaction(
    db: &DatabaseConnection,
    company: &companies::Model,
    admin: &users::Model,
    editor: &users::Model,
) -> anyhow::Result<()> {
    let repo = TransactionRepository::new(db.clone());
    let filter = TransactionFilter {
        customer_id: Some(company.id),
        ..TransactionFilter::default()
    };
    let (_, existing) = repo.list(&filter, &PageRequest::default()).await?;
    if existing > 0 {
        println!("  Demo transaction already exists, skipping...");
        return Ok(());
    }

    let created = repo
        .create(CreateTransactionInput {
            title: "Trade fair stand, spring fair".to_string(),
            transaction_type: TransactionType::Project,
            customer_id: Some(company.id),
            assignee_id: Some(editor.id),
            net_total: Decimal::new(12_500_00, 2),
            tax_total: Decimal::new(2_375_00, 2),
            currency: Currency::Eur,
            created_by: Some(admin.id),
        })
        .await?;
    println!("  Created {}", created.number);
    Ok(())
}
