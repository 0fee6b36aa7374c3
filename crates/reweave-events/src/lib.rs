/* crates/reweave-events/src/lib.rs */

// Cross-process "file changed" fan-out. One bus instance is shared by
// whoever owns it (never a global); channels are keyed by project id
// so previews of unrelated projects never see each other's events.
//
// Late subscribers get a bounded replay of recent events before the
// live stream. Replay entries age out after a TTL; the sweep runs
// opportunistically on publish and subscribe rather than on a timer.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::time::Instant;

const DEFAULT_REPLAY_CAPACITY: usize = 64;
const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// One rewritten-file notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChangeEvent {
  pub path: String,
  pub content: String,
  pub timestamp_ms: u64,
}

impl FileChangeEvent {
  /// Event stamped with the current wall-clock time.
  pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
    let timestamp_ms = SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
    Self { path: path.into(), content: content.into(), timestamp_ms }
  }
}

struct ProjectChannel {
  sender: broadcast::Sender<FileChangeEvent>,
  replay: VecDeque<(Instant, FileChangeEvent)>,
}

/// Publish/subscribe bus keyed by project id.
pub struct EventBus {
  channels: Mutex<HashMap<String, ProjectChannel>>,
  replay_capacity: usize,
  ttl: Duration,
}

impl Default for EventBus {
  fn default() -> Self {
    Self::new()
  }
}

impl EventBus {
  pub fn new() -> Self {
    Self::with_limits(DEFAULT_REPLAY_CAPACITY, DEFAULT_TTL)
  }

  /// A zero capacity is clamped to one entry so the buffer stays
  /// bounded.
  pub fn with_limits(replay_capacity: usize, ttl: Duration) -> Self {
    Self { channels: Mutex::new(HashMap::new()), replay_capacity: replay_capacity.max(1), ttl }
  }

  /// Record the event in the project's replay buffer (oldest entry
  /// dropped at capacity) and fan it out to live subscribers. An event
  /// with no subscribers is not an error; it waits in the buffer.
  pub fn publish(&self, project_id: &str, event: FileChangeEvent) {
    let mut channels = self.lock();
    self.sweep(&mut channels);

    let capacity = self.replay_capacity;
    let channel = channels
      .entry(project_id.to_string())
      .or_insert_with(|| new_channel(capacity));
    while channel.replay.len() >= capacity {
      channel.replay.pop_front();
    }
    channel.replay.push_back((Instant::now(), event.clone()));
    let _ = channel.sender.send(event);
  }

  /// Snapshot of the replay buffer plus a live receiver. Events
  /// published after this call arrive on the receiver only.
  pub fn subscribe(
    &self,
    project_id: &str,
  ) -> (Vec<FileChangeEvent>, broadcast::Receiver<FileChangeEvent>) {
    let mut channels = self.lock();
    self.sweep(&mut channels);

    let capacity = self.replay_capacity;
    let channel = channels
      .entry(project_id.to_string())
      .or_insert_with(|| new_channel(capacity));
    let snapshot = channel.replay.iter().map(|(_, event)| event.clone()).collect();
    (snapshot, channel.sender.subscribe())
  }

  /// Project ids currently holding a buffer or subscribers.
  pub fn active_projects(&self) -> Vec<String> {
    let mut channels = self.lock();
    self.sweep(&mut channels);
    let mut ids: Vec<String> = channels.keys().cloned().collect();
    ids.sort();
    ids
  }

  /// Drop expired replay entries, then drop idle project keys (empty
  /// buffer, nobody listening).
  fn sweep(&self, channels: &mut HashMap<String, ProjectChannel>) {
    let now = Instant::now();
    channels.retain(|_, channel| {
      while let Some((stamp, _)) = channel.replay.front() {
        if now.duration_since(*stamp) > self.ttl {
          channel.replay.pop_front();
        } else {
          break;
        }
      }
      !channel.replay.is_empty() || channel.sender.receiver_count() > 0
    });
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, ProjectChannel>> {
    // A poisoned lock means a panic mid-publish; the map is still
    // structurally sound, so keep serving.
    self.channels.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
  }
}

fn new_channel(replay_capacity: usize) -> ProjectChannel {
  let (sender, _) = broadcast::channel(replay_capacity.max(1));
  ProjectChannel { sender, replay: VecDeque::with_capacity(replay_capacity) }
}
