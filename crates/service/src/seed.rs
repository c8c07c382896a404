//! Startup data: the default category set and an optional demo account with
//! sample listings. Seeding is skipped when categories already exist.
use std::sync::Arc;

use chrono::Months;
use tracing::info;

use crate::auth::CredentialHasher;
use crate::domain::*;
use crate::storage::Storage;

pub const DEFAULT_CATEGORIES: [(&str, &str); 6] = [
    ("Retail", "ri-store-2-line"),
    ("Food & Dining", "ri-restaurant-line"),
    ("Professional", "ri-briefcase-4-line"),
    ("Healthcare", "ri-heart-pulse-line"),
    ("Home Services", "ri-home-4-line"),
    ("Education", "ri-graduation-cap-line"),
];

pub const DEMO_USERNAME: &str = "demo_user";
pub const DEMO_PASSWORD: &str = "password123";

struct SampleListing {
    name: &'static str,
    category: &'static str,
    description: &'static str,
    address: &'static str,
    city: &'static str,
    state: &'static str,
    zip_code: &'static str,
    phone: &'static str,
    paid: bool,
}

const SAMPLE_LISTINGS: [SampleListing; 6] = [
    SampleListing {
        name: "Corner Market",
        category: "Retail",
        description: "Neighbourhood grocery with local produce and a small hardware aisle.",
        address: "12 Elm Street",
        city: "Minneapolis",
        state: "Minnesota",
        zip_code: "55403",
        phone: "+1-612-555-0101",
        paid: true,
    },
    SampleListing {
        name: "Harbor Coffee Roasters",
        category: "Food & Dining",
        description: "Small-batch roastery and cafe serving pour-overs and pastries.",
        address: "400 Pier Road",
        city: "Seattle",
        state: "Washington",
        zip_code: "98134",
        phone: "+1-206-555-0102",
        paid: true,
    },
    SampleListing {
        name: "Taqueria Sol",
        category: "Food & Dining",
        description: "Family-run taqueria with handmade tortillas.",
        address: "88 Ocean Avenue",
        city: "Newport Beach",
        state: "California",
        zip_code: "92660",
        phone: "+1-949-555-0103",
        paid: false,
    },
    SampleListing {
        name: "Ledger & Co. Tax Services",
        category: "Professional",
        description: "Tax preparation and bookkeeping for households and small firms.",
        address: "1 Commerce Plaza",
        city: "Kansas City",
        state: "Missouri",
        zip_code: "64105",
        phone: "+1-816-555-0104",
        paid: true,
    },
    SampleListing {
        name: "Riverside Family Clinic",
        category: "Healthcare",
        description: "Primary care, vaccinations and same-day appointments.",
        address: "200 River Street",
        city: "Rochester",
        state: "Minnesota",
        zip_code: "55905",
        phone: "+1-507-555-0105",
        paid: false,
    },
    SampleListing {
        name: "Northside Tutoring",
        category: "Education",
        description: "After-school tutoring in maths, reading and science.",
        address: "9 College Way",
        city: "Boston",
        state: "Massachusetts",
        zip_code: "02115",
        phone: "+1-617-555-0106",
        paid: false,
    },
];

/// Creates the default categories and, when `demo` is set, the demo account and
/// its listings. Returns the number of categories created.
pub async fn seed(store: &Arc<dyn Storage>, hasher: &dyn CredentialHasher, demo: bool) -> anyhow::Result<usize> {
    if !store.get_categories().await?.is_empty() {
        info!("seed skipped; categories present");
        return Ok(0);
    }
    let mut categories = Vec::with_capacity(DEFAULT_CATEGORIES.len());
    for (name, icon) in DEFAULT_CATEGORIES {
        categories.push(store.create_category(NewCategory::new(name, icon)).await?);
    }
    if demo {
        seed_demo(store, hasher, &categories).await?;
    }
    info!(categories = categories.len(), demo, "seed applied");
    Ok(categories.len())
}

async fn seed_demo(store: &Arc<dyn Storage>, hasher: &dyn CredentialHasher, categories: &[Category]) -> anyhow::Result<()> {
    let owner = store
        .create_user(NewUser {
            username: DEMO_USERNAME.to_string(),
            email: "demo@derraplatform.com".to_string(),
            password: hasher.hash(DEMO_PASSWORD)?,
            name: Some("Demo User".to_string()),
            avatar: None,
        })
        .await?;

    for listing in &SAMPLE_LISTINGS {
        let Some(category) = categories.iter().find(|c| c.name == listing.category) else {
            continue;
        };
        let b = store
            .create_business(NewBusiness {
                name: listing.name.to_string(),
                description: listing.description.to_string(),
                owner_id: owner.id,
                category_id: category.id,
                address: listing.address.to_string(),
                city: listing.city.to_string(),
                state: listing.state.to_string(),
                zip_code: listing.zip_code.to_string(),
                phone: Some(listing.phone.to_string()),
                email: None,
                website: None,
                image: None,
            })
            .await?;
        store
            .update_business(b.id, BusinessPatch { is_verified: Some(true), ..Default::default() })
            .await?;
        if listing.paid {
            let start = now();
            store
                .create_subscription(NewSubscription {
                    business_id: b.id,
                    user_id: owner.id,
                    external_order_id: None,
                    status: SubscriptionStatus::Active,
                    price_id: "demo".to_string(),
                    current_period_start: Some(start),
                    current_period_end: start.checked_add_months(Months::new(1)),
                })
                .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Argon2Hasher;
    use crate::test_support::memory_store;

    #[tokio::test]
    async fn seeds_once_with_demo_listings() -> anyhow::Result<()> {
        let store = memory_store();
        assert_eq!(seed(&store, &Argon2Hasher, true).await?, 6);
        assert_eq!(seed(&store, &Argon2Hasher, true).await?, 0);

        let cats = store.get_categories().await?;
        let food = cats.iter().find(|c| c.name == "Food & Dining").unwrap();
        assert_eq!(food.business_count, 2);

        let demo = store.get_user_by_username(DEMO_USERNAME).await?.unwrap();
        assert!(Argon2Hasher.verify(&demo.password, DEMO_PASSWORD));

        let featured = store.get_featured_businesses(10).await?;
        assert_eq!(featured.len(), 3);
        assert!(featured.iter().all(|b| b.is_paid && b.is_verified && b.status == BusinessStatus::Active));
        Ok(())
    }
}
