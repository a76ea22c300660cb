//! Event loop driving the watchface.
//!
//! A single task owns the [`Watchface`] and waits on the minute ticker, the
//! event queue and the cancellation token. Events are handled one at a time,
//! so the face never observes a configuration change in the middle of a tick.

pub mod input;

use chrono::{NaiveDateTime, Timelike};
use tokio::{sync::mpsc, time::Duration};
use tokio_util::sync::CancellationToken;

use crate::{
    face::{FaceDisplay, TickUnits, Watchface},
    persist::PersistStore,
    rotation::ImageLoader,
    settings::ConfigMessage,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Slack added after a minute boundary so the wake-up lands past it.
const BOUNDARY_SLACK_MS: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapAxis {
    X,
    Y,
    Z,
}

/// Accelerometer tap. The payload is carried but not interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapEvent {
    pub axis: TapAxis,
    pub direction: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FaceEvent {
    Tap(TapEvent),
    Config(ConfigMessage),
}

/// Turns wall-clock readings into minute/hour boundary events.
#[derive(Debug, Default)]
pub struct MinuteTicker {
    last: Option<NaiveDateTime>,
}

impl MinuteTicker {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { last: Some(now) }
    }

    /// Units that rolled over since the previous reading.
    pub fn observe(&mut self, now: NaiveDateTime) -> TickUnits {
        let units = TickUnits::between(self.last, now);
        self.last = Some(now);
        units
    }

    /// Time left until just past the next minute boundary.
    pub fn until_next_minute(now: NaiveDateTime) -> Duration {
        let into_minute = Duration::from_secs(u64::from(now.second()))
            + Duration::from_nanos(u64::from(now.nanosecond()));
        Duration::from_secs(60).saturating_sub(into_minute)
            + Duration::from_millis(BOUNDARY_SLACK_MS)
    }
}

/// Run until cancelled or until every event sender is gone.
pub async fn run_face_loop<P, L, D, C>(
    face: &mut Watchface<P, L, D>,
    mut events: mpsc::Receiver<FaceEvent>,
    cancel: CancellationToken,
    clock: C,
) where
    P: PersistStore,
    L: ImageLoader,
    D: FaceDisplay<L::Image>,
    C: Fn() -> NaiveDateTime,
{
    let mut ticker = MinuteTicker::new(clock());

    loop {
        let wait = MinuteTicker::until_next_minute(clock());

        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                let now = clock();
                let units = ticker.observe(now);
                if units.any() {
                    face.on_minute_tick(now, units);
                }
            }
            event = events.recv() => match event {
                Some(FaceEvent::Tap(tap)) => {
                    log_debug!("Tap on {:?} axis ({})", tap.axis, tap.direction);
                    face.on_tap();
                }
                Some(FaceEvent::Config(message)) => {
                    log_info!("Configuration received ({} values)", message.len());
                    face.on_config(&message);
                }
                None => {
                    log_info!("Event channel closed");
                    break;
                }
            },
            _ = cancel.cancelled() => {
                log_info!("Face loop shutting down");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        chime::{ChimePattern, Haptics, PulseStyle},
        face::FaceOptions,
        persist::SqlitePersist,
        rotation::{ImageId, CATALOG},
    };
    use anyhow::Result;
    use chrono::NaiveDate;

    struct IdLoader;

    impl ImageLoader for IdLoader {
        type Image = ImageId;

        fn load(&mut self, id: ImageId) -> Result<ImageId> {
            Ok(id)
        }
    }

    struct NullDisplay;

    impl FaceDisplay<ImageId> for NullDisplay {
        fn show_time(&mut self, _text: &str) {}

        fn show_background(&mut self, _image: &ImageId) {}
    }

    struct NullHaptics;

    impl Haptics for NullHaptics {
        fn pulse(&mut self, _style: PulseStyle) {}

        fn play_pattern(&mut self, _pattern: &ChimePattern) {}
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 3)
            .unwrap()
            .and_hms_opt(12, 0, 30)
            .unwrap()
    }

    fn face() -> Watchface<SqlitePersist, IdLoader, NullDisplay> {
        Watchface::start(
            SqlitePersist::open_in_memory().unwrap(),
            IdLoader,
            NullDisplay,
            Box::new(NullHaptics),
            FaceOptions {
                clock_is_24h: true,
                abbreviate: true,
                catalog: CATALOG.to_vec(),
            },
            noon(),
        )
        .unwrap()
    }

    #[test]
    fn waits_until_just_past_the_boundary() {
        assert_eq!(
            MinuteTicker::until_next_minute(noon()),
            Duration::from_millis(30_000 + BOUNDARY_SLACK_MS)
        );
    }

    #[test]
    fn ticker_reports_each_boundary_once() {
        let mut ticker = MinuteTicker::new(noon());
        let next = noon() + chrono::Duration::seconds(30);

        assert_eq!(ticker.observe(next), TickUnits::MINUTE);
        assert_eq!(ticker.observe(next), TickUnits::NONE);
    }

    #[tokio::test]
    async fn handles_events_in_order_until_senders_drop() {
        let mut face = face();
        let (tx, rx) = mpsc::channel(8);

        tx.send(FaceEvent::Config(
            ConfigMessage::from_json(r#"{"ModeChangeShake": 1}"#).unwrap(),
        ))
        .await
        .unwrap();
        tx.send(FaceEvent::Tap(TapEvent {
            axis: TapAxis::X,
            direction: -1,
        }))
        .await
        .unwrap();
        drop(tx);

        run_face_loop(&mut face, rx, CancellationToken::new(), noon).await;

        assert!(face.tap_subscribed());
        assert_eq!(face.rotator().cursor(), 2);
    }

    #[tokio::test]
    async fn stops_on_cancellation() {
        let mut face = face();
        let (_tx, rx) = mpsc::channel::<FaceEvent>(1);
        let cancel = CancellationToken::new();
        cancel.cancel();

        run_face_loop(&mut face, rx, cancel, noon).await;
        assert_eq!(face.rotator().cursor(), 1);
    }
}
