//! Unit tests for the notification bridge
//!
//! Drives the bridge with an in-memory player, a manual clock and a
//! recording sink. No D-Bus or network involved.

#![allow(clippy::unwrap_used)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::TimeDelta;
use futures::stream;

use crate::{
    bridge::{BridgeOutcome, Clock, NotificationBridge, NotificationSink, Timestamp},
    services::player::{MetadataError, MetadataSource, TrackChanged, TrackChanges, TrackInfo},
    shutdown::{ShutdownReason, ShutdownSignal},
};

#[derive(Default)]
struct FakePlayer {
    track: Mutex<Option<TrackInfo>>,
    broken: Mutex<bool>,
    lookups: Mutex<usize>,
}

impl FakePlayer {
    fn play(&self, artist: &str, title: &str) {
        *self.track.lock().unwrap() = Some(TrackInfo::new(artist, title));
    }

    fn break_down(&self) {
        *self.broken.lock().unwrap() = true;
    }

    fn lookups(&self) -> usize {
        *self.lookups.lock().unwrap()
    }
}

#[async_trait]
impl MetadataSource for FakePlayer {
    async fn current_track_uri(&self) -> Result<String, MetadataError> {
        *self.lookups.lock().unwrap() += 1;
        if *self.broken.lock().unwrap() {
            return Err(MetadataError::InitializationFailed("player crashed".into()));
        }
        match &*self.track.lock().unwrap() {
            Some(track) => Ok(format!("file:///{}", track.title)),
            None => Err(MetadataError::NoCurrentTrack),
        }
    }

    async fn track_properties(&self, _uri: &str) -> Result<TrackInfo, MetadataError> {
        self.track
            .lock()
            .unwrap()
            .clone()
            .ok_or(MetadataError::MissingField("xesam:title"))
    }

    async fn track_changes(&self) -> Result<TrackChanges, MetadataError> {
        Ok(Box::pin(stream::empty()))
    }
}

#[derive(Clone)]
struct ManualClock(Arc<Mutex<Timestamp>>);

impl ManualClock {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(Timestamp::UNIX_EPOCH)))
    }

    fn set_seconds(&self, seconds: i64) {
        *self.0.lock().unwrap() = Timestamp::UNIX_EPOCH + TimeDelta::seconds(seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.0.lock().unwrap()
    }
}

#[derive(Default)]
struct RecordingSink {
    sent: Vec<String>,
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&mut self, text: &str) {
        self.sent.push(text.to_string());
    }
}

fn bridge() -> (
    NotificationBridge<FakePlayer, ManualClock>,
    ManualClock,
    ShutdownSignal,
) {
    let clock = ManualClock::new();
    let shutdown = ShutdownSignal::new();
    let bridge = NotificationBridge::with_clock(FakePlayer::default(), clock.clone(), shutdown.clone())
        .with_cooldown(Duration::from_secs(300));
    (bridge, clock, shutdown)
}

fn changed() -> TrackChanged {
    TrackChanged::default()
}

#[tokio::test]
async fn announces_first_change_and_then_once_per_cooldown() {
    let (mut bridge, clock, shutdown) = bridge();
    let mut sink = RecordingSink::default();

    clock.set_seconds(0);
    bridge.source().play("Artist X", "Song A");
    bridge.on_track_changed(changed(), &mut sink).await;

    clock.set_seconds(60);
    bridge.source().play("Artist X", "Song B");
    bridge.on_track_changed(changed(), &mut sink).await;

    clock.set_seconds(301);
    bridge.source().play("Artist X", "Song C");
    bridge.on_track_changed(changed(), &mut sink).await;

    assert_eq!(
        sink.sent,
        vec![
            "is now playing: Artist X - Song A",
            "is now playing: Artist X - Song C",
        ]
    );
    assert!(!shutdown.is_triggered());
}

#[tokio::test]
async fn rate_limited_change_sends_nothing() {
    let (mut bridge, clock, _shutdown) = bridge();
    let mut sink = RecordingSink::default();

    bridge.source().play("Artist X", "Song A");
    let first = bridge.on_track_changed(changed(), &mut sink).await;

    clock.set_seconds(10);
    bridge.source().play("Artist X", "Song B");
    let second = bridge.on_track_changed(changed(), &mut sink).await;

    assert_eq!(
        first,
        BridgeOutcome::Announced("is now playing: Artist X - Song A".into())
    );
    assert_eq!(second, BridgeOutcome::RateLimited);
    assert_eq!(sink.sent.len(), 1);
    assert_eq!(bridge.source().lookups(), 2);
}

#[tokio::test]
async fn announcement_is_whitespace_normalized() {
    let (mut bridge, _clock, _shutdown) = bridge();
    let mut sink = RecordingSink::default();

    bridge.source().play("A  B", "C\n D");
    bridge.on_track_changed(changed(), &mut sink).await;

    assert_eq!(sink.sent, vec!["is now playing: A B - C D"]);
}

#[tokio::test]
async fn fetch_failure_triggers_shutdown_once_and_sends_nothing() {
    let (mut bridge, clock, shutdown) = bridge();
    let mut sink = RecordingSink::default();

    bridge.source().break_down();
    let outcome = bridge.on_track_changed(changed(), &mut sink).await;

    assert_eq!(outcome, BridgeOutcome::Failed);
    assert_eq!(shutdown.reason(), Some(ShutdownReason::MetadataUnavailable));

    clock.set_seconds(600);
    let again = bridge.on_track_changed(changed(), &mut sink).await;

    assert_eq!(again, BridgeOutcome::Ignored);
    assert_eq!(bridge.source().lookups(), 1);
    assert!(!shutdown.trigger(ShutdownReason::MetadataUnavailable));
    assert!(sink.sent.is_empty());
}

#[tokio::test]
async fn missing_track_is_fatal() {
    let (mut bridge, _clock, shutdown) = bridge();
    let mut sink = RecordingSink::default();

    let outcome = bridge.on_track_changed(changed(), &mut sink).await;

    assert_eq!(outcome, BridgeOutcome::Failed);
    assert!(shutdown.is_triggered());
    assert!(sink.sent.is_empty());
}

#[tokio::test]
async fn changes_after_external_shutdown_are_ignored() {
    let (mut bridge, _clock, shutdown) = bridge();
    let mut sink = RecordingSink::default();

    shutdown.trigger(ShutdownReason::ConnectionLost);
    bridge.source().play("Artist X", "Song A");
    let outcome = bridge.on_track_changed(changed(), &mut sink).await;

    assert_eq!(outcome, BridgeOutcome::Ignored);
    assert_eq!(bridge.source().lookups(), 0);
    assert!(sink.sent.is_empty());
}
