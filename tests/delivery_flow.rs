//! End-to-end delivery scenarios against the full service layer.

use std::sync::Arc;
use uuid::Uuid;

use adserve_backend::{
    db::Database,
    engine::{BlocklistClassifier, Engine, TextIntelligence},
    error::EngineError,
    models::{Advertiser, CampaignDraft, Client, Gender, MlScore, TargetGender, Targeting},
    store::LedgerStore,
};

fn test_engine() -> (Engine, Database) {
    let db = Database::in_memory().expect("Failed to create database");
    let classifier: Arc<dyn TextIntelligence> =
        Arc::new(BlocklistClassifier::new(vec!["free money".to_string()]));
    let engine = Engine::new(&db, classifier);
    (engine, db)
}

async fn seed_advertiser(engine: &Engine, name: &str) -> Advertiser {
    let advertiser = Advertiser {
        id: Uuid::new_v4(),
        name: name.to_string(),
    };
    engine
        .accounts
        .upsert_advertisers(vec![advertiser.clone()])
        .await
        .expect("Failed to upsert advertiser");
    advertiser
}

async fn seed_client(engine: &Engine, age: i64, location: &str, gender: Gender) -> Client {
    let client = Client {
        id: Uuid::new_v4(),
        login: format!("client-{}", Uuid::new_v4()),
        age,
        location: location.to_string(),
        gender,
    };
    engine
        .accounts
        .upsert_clients(vec![client.clone()])
        .await
        .expect("Failed to upsert client");
    client
}

fn draft(
    impressions_limit: i64,
    clicks_limit: i64,
    start_day: i64,
    end_day: i64,
    targeting: Targeting,
) -> CampaignDraft {
    CampaignDraft {
        impressions_limit,
        clicks_limit,
        cost_per_impression: 1.0,
        cost_per_click: 5.0,
        ad_title: "Trail Shoes".to_string(),
        ad_text: "Lightweight shoes for long runs.".to_string(),
        start_day,
        end_day,
        targeting,
    }
}

#[tokio::test]
async fn test_impression_budget_holds_across_clients() {
    let (engine, db) = test_engine();
    let advertiser = seed_advertiser(&engine, "Acme").await;
    let campaign = engine
        .campaigns
        .create(advertiser.id, draft(2, 1, 0, 10, Targeting::default()))
        .await
        .expect("Failed to create campaign");

    let x = seed_client(&engine, 25, "Berlin", Gender::Female).await;
    let y = seed_client(&engine, 30, "Berlin", Gender::Male).await;
    let z = seed_client(&engine, 35, "Berlin", Gender::Female).await;

    let ledger = LedgerStore::new(&db);

    // First impression spends one of the two slots.
    let served = engine
        .delivery
        .select_ad(x.id)
        .await
        .expect("Failed to serve first impression");
    assert_eq!(served.ad_id, campaign.id);
    assert_eq!(served.advertiser_id, advertiser.id);
    assert_eq!(
        ledger.impressions_count(&campaign.id).expect("count"),
        1
    );

    // Same client again: same ad back, no extra spend.
    let again = engine
        .delivery
        .select_ad(x.id)
        .await
        .expect("Failed to re-serve");
    assert_eq!(again.ad_id, campaign.id);
    assert_eq!(
        ledger.impressions_count(&campaign.id).expect("count"),
        1
    );

    // Second client takes the last slot.
    engine
        .delivery
        .select_ad(y.id)
        .await
        .expect("Failed to serve second impression");
    assert_eq!(
        ledger.impressions_count(&campaign.id).expect("count"),
        2
    );

    // Budget gone: a third client gets nothing.
    let err = engine
        .delivery
        .select_ad(z.id)
        .await
        .expect_err("Exhausted campaign must not serve");
    assert!(matches!(err, EngineError::NoEligibleAd));
    assert_eq!(
        ledger.impressions_count(&campaign.id).expect("count"),
        2
    );

    // And the clients who already hold a slot stop being served too.
    let err = engine
        .delivery
        .select_ad(x.id)
        .await
        .expect_err("Exhausted campaign must not re-serve pair holders");
    assert!(matches!(err, EngineError::NoEligibleAd));
}

#[tokio::test]
async fn test_clicks_are_idempotent_and_capped() {
    let (engine, db) = test_engine();
    let advertiser = seed_advertiser(&engine, "Acme").await;
    let campaign = engine
        .campaigns
        .create(advertiser.id, draft(10, 1, 0, 10, Targeting::default()))
        .await
        .expect("Failed to create campaign");

    let x = seed_client(&engine, 25, "Berlin", Gender::Female).await;
    let y = seed_client(&engine, 30, "Berlin", Gender::Male).await;

    engine.delivery.select_ad(x.id).await.expect("serve x");
    engine.delivery.select_ad(y.id).await.expect("serve y");

    let ledger = LedgerStore::new(&db);

    // Double click from the same client counts once.
    engine
        .delivery
        .record_click(campaign.id, x.id)
        .await
        .expect("Failed to record click");
    engine
        .delivery
        .record_click(campaign.id, x.id)
        .await
        .expect("Failed to repeat click");
    assert_eq!(ledger.clicks_count(&campaign.id).expect("count"), 1);

    // Cap reached: the next client's click is acknowledged but not stored.
    engine
        .delivery
        .record_click(campaign.id, y.id)
        .await
        .expect("Over-cap click must still succeed");
    assert_eq!(ledger.clicks_count(&campaign.id).expect("count"), 1);
}

#[tokio::test]
async fn test_click_validation_order() {
    let (engine, _db) = test_engine();
    let advertiser = seed_advertiser(&engine, "Acme").await;
    let campaign = engine
        .campaigns
        .create(advertiser.id, draft(10, 5, 0, 10, Targeting::default()))
        .await
        .expect("Failed to create campaign");
    let client = seed_client(&engine, 25, "Berlin", Gender::Female).await;

    let err = engine
        .delivery
        .record_click(campaign.id, Uuid::new_v4())
        .await
        .expect_err("Unknown client must fail");
    assert!(matches!(err, EngineError::ClientNotFound));

    let err = engine
        .delivery
        .record_click(Uuid::new_v4(), client.id)
        .await
        .expect_err("Unknown ad must fail");
    assert!(matches!(err, EngineError::AdNotFound));

    // A click without a prior impression still lands.
    engine
        .delivery
        .record_click(campaign.id, client.id)
        .await
        .expect("Failed to record click");
}

#[tokio::test]
async fn test_click_outside_date_window_still_recorded() {
    let (engine, db) = test_engine();
    let advertiser = seed_advertiser(&engine, "Acme").await;
    let campaign = engine
        .campaigns
        .create(advertiser.id, draft(10, 5, 0, 2, Targeting::default()))
        .await
        .expect("Failed to create campaign");
    let client = seed_client(&engine, 25, "Berlin", Gender::Female).await;

    engine.delivery.select_ad(client.id).await.expect("serve");
    engine.platform.advance_day(8).await.expect("advance");

    engine
        .delivery
        .record_click(campaign.id, client.id)
        .await
        .expect("Click after the window must still record");
    assert_eq!(
        LedgerStore::new(&db)
            .clicks_count(&campaign.id)
            .expect("count"),
        1
    );
}

#[tokio::test]
async fn test_targeting_filters_on_gender_age_and_location() {
    let (engine, _db) = test_engine();
    let advertiser = seed_advertiser(&engine, "Acme").await;
    engine
        .campaigns
        .create(
            advertiser.id,
            draft(
                100,
                10,
                0,
                10,
                Targeting {
                    gender: Some(TargetGender::Female),
                    age_from: Some(18),
                    age_to: Some(30),
                    location: None,
                },
            ),
        )
        .await
        .expect("Failed to create campaign");

    let too_young = seed_client(&engine, 17, "Berlin", Gender::Female).await;
    let in_range = seed_client(&engine, 25, "Berlin", Gender::Female).await;
    let wrong_gender = seed_client(&engine, 25, "Berlin", Gender::Male).await;

    assert!(matches!(
        engine.delivery.select_ad(too_young.id).await,
        Err(EngineError::NoEligibleAd)
    ));
    assert!(engine.delivery.select_ad(in_range.id).await.is_ok());
    assert!(matches!(
        engine.delivery.select_ad(wrong_gender.id).await,
        Err(EngineError::NoEligibleAd)
    ));
}

#[tokio::test]
async fn test_serving_respects_date_window() {
    let (engine, _db) = test_engine();
    let advertiser = seed_advertiser(&engine, "Acme").await;
    engine
        .campaigns
        .create(advertiser.id, draft(100, 10, 2, 4, Targeting::default()))
        .await
        .expect("Failed to create campaign");

    let before = seed_client(&engine, 25, "Berlin", Gender::Female).await;
    assert!(matches!(
        engine.delivery.select_ad(before.id).await,
        Err(EngineError::NoEligibleAd)
    ));

    engine.platform.advance_day(2).await.expect("advance");
    let during = seed_client(&engine, 25, "Berlin", Gender::Female).await;
    assert!(engine.delivery.select_ad(during.id).await.is_ok());

    engine.platform.advance_day(5).await.expect("advance");
    let after = seed_client(&engine, 25, "Berlin", Gender::Female).await;
    assert!(matches!(
        engine.delivery.select_ad(after.id).await,
        Err(EngineError::NoEligibleAd)
    ));
}

#[tokio::test]
async fn test_ranking_prefers_score_then_campaign_id() {
    let (engine, _db) = test_engine();
    let acme = seed_advertiser(&engine, "Acme").await;
    let zenith = seed_advertiser(&engine, "Zenith").await;
    let acme_campaign = engine
        .campaigns
        .create(acme.id, draft(100, 10, 0, 10, Targeting::default()))
        .await
        .expect("create");
    let zenith_campaign = engine
        .campaigns
        .create(zenith.id, draft(100, 10, 0, 10, Targeting::default()))
        .await
        .expect("create");

    let scored = seed_client(&engine, 25, "Berlin", Gender::Female).await;
    engine
        .accounts
        .upsert_ml_score(MlScore {
            client_id: scored.id,
            advertiser_id: zenith.id,
            score: 80,
        })
        .await
        .expect("Failed to upsert score");
    engine
        .accounts
        .upsert_ml_score(MlScore {
            client_id: scored.id,
            advertiser_id: acme.id,
            score: 5,
        })
        .await
        .expect("Failed to upsert score");

    let served = engine.delivery.select_ad(scored.id).await.expect("serve");
    assert_eq!(served.ad_id, zenith_campaign.id);

    // No scores at all: the tie falls to the smaller campaign id.
    let unscored = seed_client(&engine, 25, "Berlin", Gender::Male).await;
    let served = engine.delivery.select_ad(unscored.id).await.expect("serve");
    assert_eq!(served.ad_id, acme_campaign.id.min(zenith_campaign.id));
}

#[tokio::test]
async fn test_clock_never_moves_backwards() {
    let (engine, _db) = test_engine();

    assert_eq!(engine.platform.advance_day(3).await.expect("advance"), 3);
    let err = engine
        .platform
        .advance_day(2)
        .await
        .expect_err("Backwards move must fail");
    match err {
        EngineError::DateRegression { requested, current } => {
            assert_eq!(requested, 2);
            assert_eq!(current, 3);
        }
        other => panic!("Unexpected error: {other:?}"),
    }
    assert_eq!(engine.platform.current_day().expect("read"), 3);
    assert_eq!(engine.platform.advance_day(3).await.expect("advance"), 3);
}

#[tokio::test]
async fn test_started_campaign_freezes_limits_and_window() {
    let (engine, _db) = test_engine();
    let advertiser = seed_advertiser(&engine, "Acme").await;
    let campaign = engine
        .campaigns
        .create(advertiser.id, draft(100, 10, 2, 5, Targeting::default()))
        .await
        .expect("create");

    engine.platform.advance_day(2).await.expect("advance");

    let mut requested = draft(50, 5, 3, 7, Targeting::default());
    requested.ad_title = "New Title".to_string();
    requested.cost_per_click = 9.0;
    let updated = engine
        .campaigns
        .update(advertiser.id, campaign.id, requested)
        .await
        .expect("Failed to update");

    assert_eq!(updated.impressions_limit, 100);
    assert_eq!(updated.clicks_limit, 10);
    assert_eq!(updated.start_day, 2);
    assert_eq!(updated.end_day, 5);
    assert_eq!(updated.ad_title, "New Title");
    assert_eq!(updated.cost_per_click, 9.0);

    let stored = engine
        .campaigns
        .get(advertiser.id, campaign.id)
        .expect("Failed to get");
    assert_eq!(stored.impressions_limit, 100);
    assert_eq!(stored.ad_title, "New Title");
}

#[tokio::test]
async fn test_unstarted_campaign_rejects_bad_windows() {
    let (engine, _db) = test_engine();
    let advertiser = seed_advertiser(&engine, "Acme").await;

    engine.platform.advance_day(1).await.expect("advance");

    let err = engine
        .campaigns
        .create(advertiser.id, draft(100, 10, 0, 5, Targeting::default()))
        .await
        .expect_err("Past start must fail");
    assert!(matches!(err, EngineError::BadRequest(_)));

    let err = engine
        .campaigns
        .create(advertiser.id, draft(100, 10, 5, 3, Targeting::default()))
        .await
        .expect_err("Inverted window must fail");
    assert!(matches!(err, EngineError::BadRequest(_)));

    let campaign = engine
        .campaigns
        .create(advertiser.id, draft(100, 10, 3, 6, Targeting::default()))
        .await
        .expect("create");

    let err = engine
        .campaigns
        .update(advertiser.id, campaign.id, draft(100, 10, 0, 6, Targeting::default()))
        .await
        .expect_err("Moving an unstarted window into the past must fail");
    assert!(matches!(err, EngineError::BadRequest(_)));
}

#[tokio::test]
async fn test_moderation_blocks_creation_and_clears_after_toggle() {
    let (engine, _db) = test_engine();
    let advertiser = seed_advertiser(&engine, "Acme").await;

    assert!(engine
        .platform
        .toggle_moderation()
        .await
        .expect("Failed to toggle"));

    let mut flagged = draft(100, 10, 0, 10, Targeting::default());
    flagged.ad_text = "Absolutely free money inside.".to_string();
    let err = engine
        .campaigns
        .create(advertiser.id, flagged.clone())
        .await
        .expect_err("Flagged content must be rejected");
    assert!(matches!(err, EngineError::ModerationRejected));

    let campaigns = engine
        .campaigns
        .list(advertiser.id, 10, 0)
        .expect("Failed to list");
    assert!(campaigns.is_empty());

    assert!(!engine
        .platform
        .toggle_moderation()
        .await
        .expect("Failed to toggle"));
    engine
        .campaigns
        .create(advertiser.id, flagged)
        .await
        .expect("Same draft must pass once moderation is off");
}

#[tokio::test]
async fn test_moderation_blocks_update_content() {
    let (engine, _db) = test_engine();
    let advertiser = seed_advertiser(&engine, "Acme").await;
    let campaign = engine
        .campaigns
        .create(advertiser.id, draft(100, 10, 0, 10, Targeting::default()))
        .await
        .expect("create");

    engine.platform.toggle_moderation().await.expect("toggle");

    let mut flagged = draft(100, 10, 0, 10, Targeting::default());
    flagged.ad_title = "Free Money Friday".to_string();
    let err = engine
        .campaigns
        .update(advertiser.id, campaign.id, flagged)
        .await
        .expect_err("Flagged update must be rejected");
    assert!(matches!(err, EngineError::ModerationRejected));

    let stored = engine
        .campaigns
        .get(advertiser.id, campaign.id)
        .expect("get");
    assert_eq!(stored.ad_title, "Trail Shoes");
}

#[tokio::test]
async fn test_campaign_crud_scoped_to_owner() {
    let (engine, _db) = test_engine();
    let owner = seed_advertiser(&engine, "Acme").await;
    let other = seed_advertiser(&engine, "Zenith").await;

    let err = engine
        .campaigns
        .create(Uuid::new_v4(), draft(10, 1, 0, 10, Targeting::default()))
        .await
        .expect_err("Unknown advertiser must fail");
    assert!(matches!(err, EngineError::AdvertiserNotFound));

    let campaign = engine
        .campaigns
        .create(owner.id, draft(10, 1, 0, 10, Targeting::default()))
        .await
        .expect("create");

    assert!(matches!(
        engine.campaigns.get(other.id, campaign.id),
        Err(EngineError::AdNotFound)
    ));
    assert!(matches!(
        engine.campaigns.delete(other.id, campaign.id).await,
        Err(EngineError::AdNotFound)
    ));

    engine
        .campaigns
        .delete(owner.id, campaign.id)
        .await
        .expect("Failed to delete");
    assert!(matches!(
        engine.campaigns.get(owner.id, campaign.id),
        Err(EngineError::AdNotFound)
    ));
}

#[tokio::test]
async fn test_select_ad_for_unknown_client_fails() {
    let (engine, _db) = test_engine();
    let err = engine
        .delivery
        .select_ad(Uuid::new_v4())
        .await
        .expect_err("Unknown client must fail");
    assert!(matches!(err, EngineError::ClientNotFound));
}

#[tokio::test]
async fn test_generated_text_uses_advertiser_and_title() {
    let (engine, _db) = test_engine();
    let text = engine
        .intelligence
        .generate_ad_text("Acme", "Trail Shoes")
        .await
        .expect("Failed to generate");
    assert!(text.contains("Acme"));
    assert!(text.contains("Trail Shoes"));
}
