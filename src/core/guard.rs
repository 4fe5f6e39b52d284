use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use tokio::sync::{Mutex, MutexGuard};

/// Per-stripe state guarded by the stripe lock. Carries the in-flight
/// session swipe counters for every user mapping onto this stripe.
#[derive(Debug, Default)]
pub struct StripeState {
    session_swipes: HashMap<String, u32>,
}

impl StripeState {
    pub fn session_swipes(&self, user_id: &str) -> u32 {
        self.session_swipes.get(user_id).copied().unwrap_or(0)
    }

    pub fn record_swipe(&mut self, user_id: &str) {
        *self.session_swipes.entry(user_id.to_string()).or_insert(0) += 1;
    }

    pub fn reset_session(&mut self, user_id: &str) {
        self.session_swipes.remove(user_id);
    }
}

/// Fixed-size array of lock stripes serializing per-user read-modify-write
/// sequences.
///
/// A user id hashes onto one stripe; holding the stripe serializes all
/// operations for users on that stripe while users on other stripes proceed
/// in parallel. Sized once at construction, lifetime bound to the service
/// instance.
#[derive(Debug)]
pub struct UserLocks {
    stripes: Vec<Mutex<StripeState>>,
}

impl UserLocks {
    pub fn new(stripe_count: usize) -> Self {
        let count = stripe_count.max(1);
        Self {
            stripes: (0..count).map(|_| Mutex::new(StripeState::default())).collect(),
        }
    }

    fn index(&self, user_id: &str) -> usize {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        user_id.hash(&mut hasher);
        (hasher.finish() % self.stripes.len() as u64) as usize
    }

    /// Acquire the stripe for a user. Held across the whole read-modify-write
    /// sequence.
    pub async fn lock(&self, user_id: &str) -> MutexGuard<'_, StripeState> {
        self.stripes[self.index(user_id)].lock().await
    }

    pub fn stripe_count(&self) -> usize {
        self.stripes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stripe_count_is_at_least_one() {
        assert_eq!(UserLocks::new(0).stripe_count(), 1);
        assert_eq!(UserLocks::new(64).stripe_count(), 64);
    }

    #[test]
    fn test_same_user_maps_to_same_stripe() {
        let locks = UserLocks::new(16);
        assert_eq!(locks.index("alice"), locks.index("alice"));
    }

    #[tokio::test]
    async fn test_session_counters_per_user() {
        let locks = UserLocks::new(16);

        {
            let mut stripe = locks.lock("alice").await;
            stripe.record_swipe("alice");
            stripe.record_swipe("alice");
            assert_eq!(stripe.session_swipes("alice"), 2);
            assert_eq!(stripe.session_swipes("bob"), 0);
        }

        let mut stripe = locks.lock("alice").await;
        assert_eq!(stripe.session_swipes("alice"), 2);
        stripe.reset_session("alice");
        assert_eq!(stripe.session_swipes("alice"), 0);
    }

    #[tokio::test]
    async fn test_held_stripe_blocks_same_user() {
        let locks = UserLocks::new(16);
        let guard = locks.lock("alice").await;

        let stripe = &locks.stripes[locks.index("alice")];
        assert!(stripe.try_lock().is_err());
        drop(guard);
        assert!(stripe.try_lock().is_ok());
    }
}
