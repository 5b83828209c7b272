//! Seed the database with demo visits.
//!
//! Visits are spread over the last day across a handful of shops, each with
//! a few products from a small catalogue. About a third are still open.

use chrono::{TimeDelta, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;

use shoptrail_core::Price;
use shoptrail_server::models::{NewLineItem, NewVisit};
use shoptrail_server::services::clock::SystemClock;
use shoptrail_server::services::visits::VisitService;

const SHOPS: [&str; 4] = ["downtown", "harbour", "airport", "mall"];

const SHOPPERS: [&str; 5] = [
    "ada@example.com",
    "grace@example.com",
    "linus@example.com",
    "ken@example.com",
    "barbara@example.com",
];

const CATALOGUE: [(&str, f64); 8] = [
    ("Apple", 0.5),
    ("Bread", 2.25),
    ("Milk", 1.2),
    ("Coffee", 7.99),
    ("Cheese", 4.5),
    ("Eggs", 3.1),
    ("Chocolate", 1.75),
    ("Olive oil", 9.0),
];

/// Build `count` random visit payloads.
fn demo_visits(count: u32) -> Result<Vec<NewVisit>, Box<dyn std::error::Error>> {
    let mut rng = rand::rng();
    let now = Utc::now();
    let mut visits = Vec::new();

    for _ in 0..count {
        let entered_at = now - TimeDelta::minutes(rng.random_range(30..24 * 60));
        let exited_at = rng
            .random_bool(2.0 / 3.0)
            .then(|| entered_at + TimeDelta::minutes(rng.random_range(5..30)));

        let mut items = Vec::new();
        for _ in 0..rng.random_range(0..5) {
            if let Some((name, price)) = CATALOGUE.choose(&mut rng) {
                items.push(NewLineItem {
                    name: (*name).to_owned(),
                    price: Price::from_f64(*price)?,
                });
            }
        }

        visits.push(NewVisit {
            user: SHOPPERS.choose(&mut rng).copied().unwrap_or("guest").to_owned(),
            shop_id: SHOPS.choose(&mut rng).copied().unwrap_or("downtown").to_owned(),
            entered_at: Some(entered_at),
            exited_at,
            items,
            total: None,
        });
    }

    Ok(visits)
}

/// Insert `count` demo visits.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn visits(count: u32) -> Result<(), Box<dyn std::error::Error>> {
    let payloads = demo_visits(count)?;
    let storage = super::connect().await?;
    let service = VisitService::new(storage.visits(), &SystemClock);

    let mut created = 0_u32;
    let mut result = Ok(());
    for payload in payloads {
        match service.create(payload).await {
            Ok(_) => created += 1,
            Err(e) => {
                result = Err(e);
                break;
            }
        }
    }
    storage.close().await;
    result?;

    tracing::info!(created, "Seeded demo visits");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_visits_are_consistent() {
        let visits = demo_visits(50).unwrap();
        assert_eq!(visits.len(), 50);

        for visit in visits {
            assert!(SHOPS.contains(&visit.shop_id.as_str()));
            assert!(visit.items.len() < 5);
            if let (Some(entered), Some(exited)) = (visit.entered_at, visit.exited_at) {
                assert!(exited > entered);
            }
        }
    }
}
