use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use log::debug;
use rand::Rng;
use tokio::sync::Mutex;

use crate::clients::{entities::SavedTrack, errors::Result, store::TrackStore};

// Ordered by ASCII value so that ids sort the same way they were generated
const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";
const TIME_CHARS: usize = 8;
const RANDOM_CHARS: usize = 12;

/// Generates Firebase style push ids: 8 characters of millisecond timestamp
/// followed by 12 random characters. Two ids created in the same millisecond
/// share the random part incremented by one, so ids are strictly increasing.
#[derive(Debug, Default)]
pub struct PushIdGenerator {
    last_time: u64,
    last_random: [u8; RANDOM_CHARS],
}

impl PushIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default();
        self.next_id_at(now)
    }

    fn next_id_at(&mut self, now: u64) -> String {
        // A clock going backwards is treated like the same millisecond
        if now > self.last_time {
            let mut rng = rand::rng();
            for slot in &mut self.last_random {
                *slot = rng.random_range(0..64);
            }
            self.last_time = now;
        } else {
            self.increment_random();
        }

        let mut id = [0u8; TIME_CHARS + RANDOM_CHARS];
        let mut time = self.last_time;
        for slot in id[..TIME_CHARS].iter_mut().rev() {
            *slot = PUSH_CHARS[usize::try_from(time % 64).unwrap_or_default()];
            time /= 64;
        }
        for (slot, &digit) in id[TIME_CHARS..].iter_mut().zip(&self.last_random) {
            *slot = PUSH_CHARS[usize::from(digit)];
        }
        id.iter().map(|&b| char::from(b)).collect()
    }

    fn increment_random(&mut self) {
        for digit in self.last_random.iter_mut().rev() {
            if *digit == 63 {
                *digit = 0;
            } else {
                *digit += 1;
                return;
            }
        }
        // All random digits overflowed, move on to the next millisecond
        self.last_time += 1;
    }
}

/// Saved tracks kept in process memory. They are gone when the session ends.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<String, String>>,
    ids: Mutex<PushIdGenerator>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TrackStore for MemoryStore {
    async fn add(&self, label: &str) -> Result<String> {
        let id = self.ids.lock().await.next_id();
        self.records
            .lock()
            .await
            .insert(id.clone(), label.to_string());
        debug!("Stored {label:?} under {id} in memory");
        Ok(id)
    }

    async fn remove(&self, id: &str) -> Result<()> {
        if self.records.lock().await.remove(id).is_some() {
            debug!("Removed record {id} from memory");
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<SavedTrack>> {
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .map(|(id, label)| SavedTrack::new(id.clone(), label.clone()))
            .collect())
    }
}
