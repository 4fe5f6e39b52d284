// Service exports
pub mod cache;
pub mod memory;
pub mod postgres;
pub mod store;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use store::{
    BlockStore, MatchStore, MatchingStore, RankingStore, StandoutStore, StoreError, StoreResult,
    SwipeStore, UserStore,
};
