use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use hembi_core::store::ManualClock;
use hembi_core::{ConversationStore, DialogueEngine, DialogueState, PartyId};

fn engine_with_clock() -> (DialogueEngine, Arc<ManualClock>) {
    let clock =
        Arc::new(ManualClock::starting_at(Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()));
    let store = Arc::new(ConversationStore::new(clock.clone(), Duration::minutes(30)));
    (DialogueEngine::new(store), clock)
}

#[test]
fn full_happy_path_ends_idle_with_order_id() {
    let (engine, _clock) = engine_with_clock();
    let party = PartyId::from("5215550001");

    let started = engine.handle_inbound_text(&party, "Quiero 2 garrafones y 3 botellas");
    assert!(started.contains("Garrafón 20L x2"));
    assert!(started.contains("Botella 1L x3"));
    assert!(started.contains("envío gratis"), "100.00 total should ship free: {started}");

    let phone_prompt = engine.handle_inbound_text(&party, "Av. Reforma 222, Col. Centro, CDMX");
    assert!(phone_prompt.contains("teléfono"));

    let payment_prompt = engine.handle_inbound_text(&party, "(55) 1234-5678");
    assert!(payment_prompt.contains("Efectivo"));

    let summary = engine.handle_inbound_text(&party, "1");
    assert!(summary.contains("Resumen"));
    assert!(summary.contains("Efectivo"));

    let confirmation = engine.handle_inbound_text(&party, "confirmar");
    let order_id = confirmation
        .split_whitespace()
        .find(|word| word.contains("PSJ"))
        .expect("confirmation should carry an order id");
    assert!(order_id.trim_matches(|c: char| !c.is_ascii_alphanumeric()).starts_with("PSJ"));

    // conversation fully cleared, next message classifies fresh
    assert_eq!(engine.store().state_of(&party).state, DialogueState::Idle);
    assert!(engine.store().draft_of(&party).items.is_empty());
    assert!(engine.handle_inbound_text(&party, "hola").contains("Hembi"));
}

#[test]
fn accented_confirmation_word_is_accepted() {
    let (engine, _clock) = engine_with_clock();
    let party = PartyId::from("5215550002");

    engine.handle_inbound_text(&party, "3 garrafones");
    engine.handle_inbound_text(&party, "Calle Hidalgo 45, Col. Juárez");
    engine.handle_inbound_text(&party, "5598765432");
    engine.handle_inbound_text(&party, "tarjeta");
    let confirmation = engine.handle_inbound_text(&party, "Sí");

    assert!(confirmation.contains("confirmado"));
}

#[test]
fn stale_conversation_restarts_fresh_on_next_message() {
    let (engine, clock) = engine_with_clock();
    let party = PartyId::from("5215550003");

    engine.handle_inbound_text(&party, "2 garrafones");
    assert_eq!(engine.store().state_of(&party).state, DialogueState::CollectingAddress);

    clock.advance(Duration::minutes(31));

    // the stale address-step conversation is gone; this classifies from Idle
    let reply = engine.handle_inbound_text(&party, "hola");
    assert!(reply.contains("Hembi"));
    assert_eq!(engine.store().state_of(&party).state, DialogueState::Idle);
    assert!(engine.store().draft_of(&party).items.is_empty());
}

#[test]
fn sweep_clears_stale_conversations_in_bulk() {
    let (engine, clock) = engine_with_clock();

    for suffix in 0..5 {
        let party = PartyId::from(format!("52155500{suffix:02}").as_str());
        engine.handle_inbound_text(&party, "2 garrafones");
    }
    assert_eq!(engine.store().active_conversations(), 5);

    clock.advance(Duration::minutes(31));
    let survivor = PartyId::from("5215559999");
    engine.handle_inbound_text(&survivor, "hola");

    assert_eq!(engine.run_expiry_sweep(), 5);
    assert_eq!(engine.store().active_conversations(), 1);
}
