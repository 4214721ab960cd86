use crate::decorator::{AlertDecoration, DecoratedAlert};
use crate::routing::{resolve_priority, ChannelRoute, PriorityRoute};
use crate::NotificationChannel;
use cardiomon_common::sink::AlertSink;
use cardiomon_common::types::Alert;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Key: (patient_id, condition)
type RepeatKey = (String, String);

#[derive(Debug, Clone, Copy)]
struct RepeatEntry {
    count: u32,
    /// Newest alert timestamp seen for the key, epoch ms.
    last_seen: i64,
}

pub struct NotificationManager {
    channels: Vec<Box<dyn NotificationChannel>>,
    routes: Vec<ChannelRoute>,
    priorities: Vec<PriorityRoute>,
    repeats: Mutex<HashMap<RepeatKey, RepeatEntry>>,
}

impl NotificationManager {
    pub fn new(
        channels: Vec<Box<dyn NotificationChannel>>,
        routes: Vec<ChannelRoute>,
        priorities: Vec<PriorityRoute>,
    ) -> Self {
        Self {
            channels,
            routes,
            priorities,
            repeats: Mutex::new(HashMap::new()),
        }
    }

    /// Routes every alert to every channel regardless of priority.
    pub fn broadcast(channels: Vec<Box<dyn NotificationChannel>>, priorities: Vec<PriorityRoute>) -> Self {
        let routes = (0..channels.len())
            .map(|channel_index| ChannelRoute {
                min_priority: crate::Priority::Low,
                channel_index,
            })
            .collect();
        Self::new(channels, routes, priorities)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// How many times this patient/condition pair has been delivered.
    pub fn repeat_count(&self, alert: &Alert) -> u32 {
        let repeats = self.repeats.lock().unwrap_or_else(PoisonError::into_inner);
        repeats
            .get(&(alert.patient_id.clone(), alert.condition.clone()))
            .map_or(0, |entry| entry.count)
    }

    /// Records one more occurrence and builds the delivered description.
    /// The repeat annotation appears from the second occurrence on.
    pub fn decorate(&self, alert: &Alert) -> DecoratedAlert {
        let count = {
            let mut repeats = self.repeats.lock().unwrap_or_else(PoisonError::into_inner);
            let entry = repeats
                .entry((alert.patient_id.clone(), alert.condition.clone()))
                .or_insert(RepeatEntry {
                    count: 0,
                    last_seen: alert.timestamp,
                });
            entry.count += 1;
            entry.last_seen = entry.last_seen.max(alert.timestamp);
            entry.count
        };

        let decoration = AlertDecoration::new(alert)
            .priority(resolve_priority(&self.priorities, &alert.condition));
        if count > 1 {
            decoration.repeated(count).decorate()
        } else {
            decoration.decorate()
        }
    }

    /// Forgets repeat counts for one patient, e.g. after a clinician review.
    pub fn reset_patient(&self, patient_id: &str) {
        let mut repeats = self.repeats.lock().unwrap_or_else(PoisonError::into_inner);
        repeats.retain(|(id, _), _| id != patient_id);
    }

    /// Drops repeat counters whose newest alert is older than `cutoff`
    /// (epoch ms). Returns how many were removed.
    pub fn evict_stale(&self, cutoff: i64) -> usize {
        let mut repeats = self.repeats.lock().unwrap_or_else(PoisonError::into_inner);
        let before = repeats.len();
        repeats.retain(|_, entry| entry.last_seen >= cutoff);
        before - repeats.len()
    }

    pub fn tracked_repeats(&self) -> usize {
        self.repeats.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn send_to_channels(&self, decorated: &DecoratedAlert) {
        let priority = decorated.priority.unwrap_or(crate::Priority::Medium);
        for route in &self.routes {
            if !route.should_send(priority) {
                continue;
            }

            if let Some(channel) = self.channels.get(route.channel_index) {
                if let Err(e) = channel.send(decorated) {
                    tracing::error!(
                        channel = channel.channel_name(),
                        patient_id = %decorated.alert.patient_id,
                        error = %e,
                        "Failed to deliver alert"
                    );
                }
            }
        }
    }
}

impl AlertSink for NotificationManager {
    fn accept(&self, alert: &Alert) {
        let decorated = self.decorate(alert);
        self.send_to_channels(&decorated);
    }
}
