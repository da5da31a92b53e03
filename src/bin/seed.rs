//! Demo Data Seeder
//!
//! Loads deterministic demo advertisers, clients, campaigns, and relevance
//! scores into a database file so the API has something to serve.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin seed -- --db ./adserve.db --advertisers 3 --clients 12
//! ```

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use uuid::Uuid;

use adserve_backend::{
    db::Database,
    engine::{BlocklistClassifier, Engine, TextIntelligence},
    models::{
        Advertiser, CampaignDraft, Client, Config, Gender, MlScore, TargetGender, Targeting,
    },
};

#[derive(Parser, Debug)]
#[command(name = "seed", about = "Load demo advertisers, clients, and campaigns")]
struct Args {
    /// Database file to seed
    #[arg(long, default_value = "./adserve.db", env = "DATABASE_PATH")]
    db: String,

    /// Number of advertisers
    #[arg(long, default_value_t = 3)]
    advertisers: usize,

    /// Number of clients
    #[arg(long, default_value_t = 12)]
    clients: usize,

    /// Campaigns per advertiser
    #[arg(long, default_value_t = 2)]
    campaigns_each: usize,
}

const ADVERTISER_NAMES: &[&str] = &[
    "Acme Outdoors",
    "Borealis Coffee",
    "Cobalt Fitness",
    "Driftwood Books",
    "Evergreen Travel",
];
const LOCATIONS: &[&str] = &["Berlin", "Amsterdam", "Lisbon", "Prague"];
const LOGINS: &[&str] = &[
    "ada", "bob", "cleo", "dan", "erin", "finn", "gus", "hana", "iris", "jude", "kai", "lena",
];

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let db = Database::open(&args.db)?;
    let classifier: Arc<dyn TextIntelligence> =
        Arc::new(BlocklistClassifier::from_config(&Config::from_env()?));
    let engine = Engine::new(&db, classifier);

    let advertisers: Vec<Advertiser> = (0..args.advertisers)
        .map(|i| Advertiser {
            id: Uuid::new_v4(),
            name: ADVERTISER_NAMES[i % ADVERTISER_NAMES.len()].to_string(),
        })
        .collect();
    engine.accounts.upsert_advertisers(advertisers.clone()).await?;

    let clients: Vec<Client> = (0..args.clients)
        .map(|i| Client {
            id: Uuid::new_v4(),
            login: format!("{}{}", LOGINS[i % LOGINS.len()], i / LOGINS.len()),
            age: 18 + (i as i64 * 7) % 50,
            location: LOCATIONS[i % LOCATIONS.len()].to_string(),
            gender: if i % 2 == 0 {
                Gender::Female
            } else {
                Gender::Male
            },
        })
        .collect();
    engine.accounts.upsert_clients(clients.clone()).await?;

    let today = engine.platform.current_day()?;
    let mut campaign_count = 0;
    for (ai, advertiser) in advertisers.iter().enumerate() {
        for ci in 0..args.campaigns_each {
            let draft = CampaignDraft {
                impressions_limit: 50 + ci as i64 * 25,
                clicks_limit: 10 + ci as i64 * 5,
                cost_per_impression: 1.0 + ci as f64 * 0.5,
                cost_per_click: 8.0,
                ad_title: format!("{} Deal {}", advertiser.name, ci + 1),
                ad_text: format!("Seasonal offer {} from {}.", ci + 1, advertiser.name),
                start_day: today,
                end_day: today + 30,
                targeting: if ci % 2 == 0 {
                    Targeting::default()
                } else {
                    Targeting {
                        gender: Some(TargetGender::All),
                        age_from: Some(18),
                        age_to: Some(65),
                        location: None,
                    }
                },
            };
            engine.campaigns.create(advertiser.id, draft).await?;
            campaign_count += 1;
        }

        // Scores for about a third of the clients so ranking has spread.
        for (offset, client) in clients.iter().enumerate() {
            if (ai + offset) % 3 == 0 {
                engine
                    .accounts
                    .upsert_ml_score(MlScore {
                        client_id: client.id,
                        advertiser_id: advertiser.id,
                        score: ((ai + 1) * 10 + offset) as i64,
                    })
                    .await?;
            }
        }
    }

    println!(
        "Seeded {} advertisers, {} clients, {} campaigns into {}",
        advertisers.len(),
        clients.len(),
        campaign_count,
        args.db
    );
    Ok(())
}
