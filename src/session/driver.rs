use anyhow::Result;
use crate::core::{RouteSelection, RouteSequence};
use crate::input::{LoadError, LoadTicket};
use crate::session::{Command, Session};
use crate::ui::terminal::format_controls;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

type LoadResult = (LoadTicket, Result<RouteSequence, LoadError>);

/// Drive a session until told to quit.
///
/// Everything runs on the calling task: commands, playback ticks, animation
/// frames and load results are handled one at a time. Loads run on spawned
/// tasks and report back over a channel. If the command channel closes, the
/// driver keeps going until playback and animations have finished.
pub async fn run(mut session: Session, mut commands: mpsc::Receiver<Command>) -> Result<()> {
    let config = session.config();
    let (load_tx, mut load_rx) = mpsc::channel::<LoadResult>(16);

    let mut frames = time::interval(config.frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut ticker: Option<Interval> = None;
    let mut ticker_epoch = session.timer_epoch();
    let mut commands_open = true;

    let initial = session.selection();
    spawn_load(&mut session, initial, &load_tx);
    session.render(Instant::now().into_std());

    loop {
        if !commands_open && !session.is_loading() && !session.should_tick() && !session.is_animating() {
            info!("Command input closed and playback idle, shutting down");
            break;
        }

        tokio::select! {
            cmd = commands.recv(), if commands_open => {
                let now = Instant::now().into_std();
                match cmd {
                    None => {
                        debug!("Command channel closed");
                        commands_open = false;
                    }
                    Some(Command::Quit) => break,
                    Some(Command::Select(selection)) => spawn_load(&mut session, selection, &load_tx),
                    Some(Command::TogglePlay) => {
                        session.toggle_play(now);
                    }
                    Some(Command::Play) => session.play(now),
                    Some(Command::Pause) => session.pause(now),
                    Some(Command::Reset) => session.reset(now),
                    Some(Command::Status) => log_status(&session),
                }
                session.render(now);
            }
            Some((ticket, result)) = load_rx.recv() => {
                let now = Instant::now().into_std();
                session.on_load_result(ticket, result, now);
                session.render(now);
            }
            _ = next_tick(&mut ticker) => {
                let now = Instant::now().into_std();
                session.on_tick(now);
                session.render(now);
            }
            _ = frames.tick(), if session.is_animating() => {
                session.render(Instant::now().into_std());
            }
        }

        // Restart the tick timer on every play/pause/reset/reload, stop it when idle
        if !session.should_tick() {
            ticker = None;
        } else if ticker.is_none() || ticker_epoch != session.timer_epoch() {
            let start = Instant::now() + config.tick_interval;
            let mut interval = time::interval_at(start, config.tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker = Some(interval);
        }
        ticker_epoch = session.timer_epoch();
    }

    // Cancel the timer explicitly so nothing fires against torn-down state
    drop(ticker);
    session.shutdown();
    Ok(())
}

/// Issue a load request and run it on its own task
fn spawn_load(session: &mut Session, selection: RouteSelection, tx: &mpsc::Sender<LoadResult>) {
    let ticket = session.request_load(selection);
    let store = session.store();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = store.load(ticket.selection).await;
        let _ = tx.send((ticket, result)).await;
    });
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn log_status(session: &Session) {
    let selection = session.selection();
    match session.controls() {
        Some(controls) => info!("{}: {}", selection, format_controls(&controls)),
        None if session.is_loading() => info!("{}: loading", selection),
        None => info!("{}: no route points", selection),
    }
    if let Some(e) = session.last_error() {
        info!("Last load error: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Day, PointType};
    use crate::input::{MemoryRouteSource, RouteStore};
    use crate::playback::PlaybackConfig;
    use crate::ui::{MapView, RenderFrame};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct SharedFrames(Arc<Mutex<Vec<RenderFrame>>>);

    impl MapView for SharedFrames {
        fn render(&mut self, frame: &RenderFrame) {
            self.0.lock().unwrap().push(frame.clone());
        }
    }

    impl SharedFrames {
        fn last(&self) -> Option<RenderFrame> {
            self.0.lock().unwrap().last().cloned()
        }
    }

    fn fast_config() -> PlaybackConfig {
        PlaybackConfig {
            tick_interval: Duration::from_millis(10),
            animation_duration: Duration::from_millis(5),
            pan_duration: Duration::from_millis(5),
            frame_interval: Duration::from_millis(2),
        }
    }

    fn session(source: MemoryRouteSource, frames: &SharedFrames) -> Session {
        let store = Arc::new(RouteStore::new(Arc::new(source)));
        Session::new(store, fast_config(), Box::new(frames.clone()))
    }

    #[tokio::test]
    async fn test_autoplay_runs_to_end_after_input_closes() {
        let frames = SharedFrames::default();
        let s = session(MemoryRouteSource::demo(), &frames).with_autoplay(true);

        // No commands at all: the driver plays the route out and exits
        let (tx, rx) = mpsc::channel(4);
        drop(tx);
        time::timeout(Duration::from_secs(10), run(s, rx))
            .await
            .expect("driver did not finish")
            .unwrap();

        let last = frames.last().unwrap();
        let controls = last.controls.unwrap();
        assert_eq!(controls.index, controls.len - 1);
        assert!(!controls.is_playing);
        assert_eq!(last.path.len(), controls.len);
    }

    #[tokio::test]
    async fn test_quit_stops_driver() {
        let frames = SharedFrames::default();
        let s = session(MemoryRouteSource::demo(), &frames);
        let (tx, rx) = mpsc::channel(4);
        tx.send(Command::Quit).await.unwrap();
        time::timeout(Duration::from_secs(5), run(s, rx))
            .await
            .expect("driver did not quit")
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_selection_wins() {
        let frames = SharedFrames::default();
        let slow = MemoryRouteSource::demo().with_delay(Duration::from_millis(50));
        let s = session(slow, &frames);
        let (tx, rx) = mpsc::channel(4);

        let script = async {
            tx.send(Command::Select(RouteSelection::new(Day::ThreeDaysAgo, PointType::Manual)))
                .await
                .unwrap();
            time::sleep(Duration::from_millis(300)).await;
            tx.send(Command::Quit).await.unwrap();
        };
        let (result, _) = tokio::join!(run(s, rx), script);
        result.unwrap();

        // The initial "today" load resolves too, but only day3 is applied
        let last = frames.last().unwrap();
        let controls = last.controls.unwrap();
        assert_eq!(controls.len, 12);
        let day3_first = crate::input::select_route(
            &crate::input::memory::demo_buckets(),
            RouteSelection::new(Day::ThreeDaysAgo, PointType::Manual),
        )
        .unwrap()
        .get(0)
        .unwrap()
        .position();
        assert_eq!(controls.position, day3_first);
    }
}
