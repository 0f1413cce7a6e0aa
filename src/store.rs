//! Off-chain offer records.
//!
//! The store itself is an external collaborator; this module defines the
//! record shape, the lifecycle states, the [`OfferStore`] capability trait
//! the orchestration entrypoints are written against, and an in-memory
//! implementation for tests and local runs.

use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Human-visible lifecycle of a trade offer. `Requested` is the only state
/// an offer can be acted on from; the other two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferStatus {
    Requested,
    Accepted,
    Canceled,
}

impl OfferStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Accepted | Self::Canceled)
    }

    /// Transitions are monotone: `Requested` may move to a terminal state,
    /// nothing ever moves out of one.
    pub fn can_transition_to(self, next: Self) -> bool {
        self == Self::Requested && next.is_terminal()
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Requested => "REQUESTED",
            Self::Accepted => "ACCEPTED",
            Self::Canceled => "CANCELED",
        };
        f.write_str(s)
    }
}

/// One trade's off-chain record. `escrow_address` is unique per offer and
/// never reassigned once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: String,
    pub buyer_address: String,
    pub seller_address: String,
    pub escrow_address: String,
    pub nft_address: String,
    pub offered_amount: f64,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for a fresh record; ids and timestamps are store-assigned and the
/// status always starts at `Requested`.
#[derive(Debug, Clone)]
pub struct NewOffer {
    pub buyer_address: String,
    pub seller_address: String,
    pub escrow_address: String,
    pub nft_address: String,
    pub offered_amount: f64,
}

/// Document-store surface the orchestration needs: insert, partial update
/// by id, and equality queries on the counterparty addresses. A write must
/// be visible to the caller once the future resolves.
#[async_trait]
pub trait OfferStore: Send + Sync {
    async fn insert(&self, offer: NewOffer) -> Result<Offer>;
    async fn update_status(&self, id: &str, status: OfferStatus) -> Result<Offer>;
    async fn find_by_buyer(&self, buyer_address: &str) -> Result<Vec<Offer>>;
    async fn find_by_seller(&self, seller_address: &str) -> Result<Vec<Offer>>;
}

#[async_trait]
impl<T: OfferStore + ?Sized> OfferStore for Arc<T> {
    async fn insert(&self, offer: NewOffer) -> Result<Offer> {
        (**self).insert(offer).await
    }

    async fn update_status(&self, id: &str, status: OfferStatus) -> Result<Offer> {
        (**self).update_status(id, status).await
    }

    async fn find_by_buyer(&self, buyer_address: &str) -> Result<Vec<Offer>> {
        (**self).find_by_buyer(buyer_address).await
    }

    async fn find_by_seller(&self, seller_address: &str) -> Result<Vec<Offer>> {
        (**self).find_by_seller(seller_address).await
    }
}

/// In-memory store. Queries return the newest records first, mirroring how
/// the trade history is presented.
#[derive(Debug, Default)]
pub struct MemoryOfferStore {
    offers: Mutex<Vec<Offer>>,
    next_id: AtomicU64,
}

impl MemoryOfferStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_matches(&self, predicate: impl Fn(&Offer) -> bool) -> Vec<Offer> {
        let offers = self.offers.lock().expect("offer store lock poisoned");
        let mut matches: Vec<Offer> = offers.iter().filter(|o| predicate(o)).cloned().collect();
        matches.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        matches
    }
}

#[async_trait]
impl OfferStore for MemoryOfferStore {
    async fn insert(&self, offer: NewOffer) -> Result<Offer> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let now = Utc::now();
        let record = Offer {
            id: format!("offer-{id}"),
            buyer_address: offer.buyer_address,
            seller_address: offer.seller_address,
            escrow_address: offer.escrow_address,
            nft_address: offer.nft_address,
            offered_amount: offer.offered_amount,
            status: OfferStatus::Requested,
            created_at: now,
            updated_at: now,
        };
        self.offers
            .lock()
            .expect("offer store lock poisoned")
            .push(record.clone());
        Ok(record)
    }

    async fn update_status(&self, id: &str, status: OfferStatus) -> Result<Offer> {
        let mut offers = self.offers.lock().expect("offer store lock poisoned");
        let record = offers
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| Error::Store(format!("offer {id} not found")))?;
        record.status = status;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn find_by_buyer(&self, buyer_address: &str) -> Result<Vec<Offer>> {
        Ok(self.sorted_matches(|o| o.buyer_address == buyer_address))
    }

    async fn find_by_seller(&self, seller_address: &str) -> Result<Vec<Offer>> {
        Ok(self.sorted_matches(|o| o.seller_address == seller_address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(buyer: &str, seller: &str) -> NewOffer {
        NewOffer {
            buyer_address: buyer.into(),
            seller_address: seller.into(),
            escrow_address: "escrow".into(),
            nft_address: "nft".into(),
            offered_amount: 10.0,
        }
    }

    #[test]
    fn status_transitions_are_one_directional() {
        use OfferStatus::*;
        assert!(Requested.can_transition_to(Accepted));
        assert!(Requested.can_transition_to(Canceled));
        assert!(!Accepted.can_transition_to(Requested));
        assert!(!Canceled.can_transition_to(Accepted));
        assert!(!Requested.can_transition_to(Requested));
    }

    #[test]
    fn status_serializes_like_the_stored_records() {
        assert_eq!(
            serde_json::to_string(&OfferStatus::Requested).unwrap(),
            "\"REQUESTED\""
        );
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_requested_status() {
        let store = MemoryOfferStore::new();
        let offer = store.insert(sample("b", "s")).await.unwrap();
        assert_eq!(offer.status, OfferStatus::Requested);
        assert!(!offer.id.is_empty());
        let second = store.insert(sample("b", "s")).await.unwrap();
        assert_ne!(offer.id, second.id);
    }

    #[tokio::test]
    async fn update_touches_updated_at_and_is_immediately_visible() {
        let store = MemoryOfferStore::new();
        let offer = store.insert(sample("buyer-1", "seller-1")).await.unwrap();
        let updated = store
            .update_status(&offer.id, OfferStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(updated.status, OfferStatus::Accepted);
        assert!(updated.updated_at >= offer.updated_at);

        let found = store.find_by_buyer("buyer-1").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].status, OfferStatus::Accepted);
    }

    #[tokio::test]
    async fn queries_match_on_equality_only() {
        let store = MemoryOfferStore::new();
        store.insert(sample("buyer-1", "seller-1")).await.unwrap();
        store.insert(sample("buyer-2", "seller-1")).await.unwrap();

        assert_eq!(store.find_by_buyer("buyer-1").await.unwrap().len(), 1);
        assert_eq!(store.find_by_seller("seller-1").await.unwrap().len(), 2);
        assert!(store.find_by_seller("seller-2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_id_is_a_store_error() {
        let store = MemoryOfferStore::new();
        assert!(matches!(
            store.update_status("missing", OfferStatus::Canceled).await,
            Err(Error::Store(_))
        ));
    }
}
