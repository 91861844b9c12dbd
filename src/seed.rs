//! Demo data: one event filled to capacity.

use anyhow::Context;
use passin_db::models::{NewAttendee, NewEvent};
use passin_db::DynStore;
use uuid::{uuid, Uuid};

use crate::utils::generate_slug;

pub const SEED_EVENT_ID: Uuid = uuid!("9e0e17e6-8b6e-4846-a71d-eabc09a38c2e");
const SEED_EVENT_TITLE: &str = "Unite Summit";
const SEED_EVENT_DETAILS: &str = "Um evento p/ devs apaixonados(as) por código!";
const SEED_CAPACITY: i32 = 120;

/// Insert the demo event and its attendees. Returns how many attendees were
/// inserted; zero when the event is already present.
pub async fn seed(store: &DynStore) -> anyhow::Result<usize> {
    let slug = generate_slug(SEED_EVENT_TITLE);

    if store
        .find_event_by_slug(&slug)
        .await
        .context("failed to look up seed event")?
        .is_some()
    {
        tracing::info!(%slug, "seed event already present, skipping");
        return Ok(0);
    }

    let event = store
        .insert_event(NewEvent {
            id: SEED_EVENT_ID,
            title: SEED_EVENT_TITLE.to_string(),
            slug,
            details: Some(SEED_EVENT_DETAILS.to_string()),
            maximum_attendees: Some(SEED_CAPACITY),
        })
        .await
        .context("failed to insert seed event")?;

    for n in 1..=SEED_CAPACITY {
        store
            .insert_attendee(NewAttendee {
                event_id: event.id,
                name: format!("attendee{n:03}"),
                email: format!("attendee{n:03}@passin.dev"),
            })
            .await
            .with_context(|| format!("failed to insert seed attendee {n}"))?;
    }

    tracing::info!(event_id = %event.id, attendees = SEED_CAPACITY, "seed data inserted");
    Ok(SEED_CAPACITY as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use passin_db::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn seed_fills_the_event_once() {
        let store: DynStore = Arc::new(MemoryStore::new());

        assert_eq!(seed(&store).await.unwrap(), 120);
        assert_eq!(seed(&store).await.unwrap(), 0);

        let capacity = store.event_capacity(SEED_EVENT_ID).await.unwrap().unwrap();
        assert_eq!(capacity.attendees_amount, 120);
        assert!(capacity.is_full());
    }
}
