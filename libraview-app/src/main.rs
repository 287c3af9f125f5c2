use futures_util::StreamExt;
use libraview_app::{mock_scan_code, SeatFinder, UserMessage};
use libraview_core::{toggle_filter, Feature, FilterId, FilterSet, ScanCode};
use libraview_store::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "libraview_app=debug,libraview_hold=debug,libraview_checkin=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Starting Libraview seat finder for hold length {}m", config.hold.hold_minutes);

    let finder = SeatFinder::from_config(&config)?;
    tracing::info!("Floors: {}", serde_json::to_string(&finder.floors())?);

    // Second floor, window seats only
    let filters = toggle_filter(&FilterSet::default(), FilterId::Feature(Feature::Window));
    let visible = finder.visible_spots(2, &filters)?;
    let Some(desk) = visible.into_iter().find(|spot| spot.is_available()) else {
        tracing::warn!("No free window seat on floor 2");
        return Ok(());
    };

    let hold = match finder.start_hold(&desk.id) {
        Ok(hold) => hold,
        Err(e) => {
            show(&e.user_message());
            return Ok(());
        }
    };
    show(&UserMessage::hold_started(&desk.desk_number, &hold));

    let mut countdown = Box::pin(finder.countdown_stream(&desk.id));
    for _ in 0..3 {
        if let Some(update) = countdown.next().await {
            tracing::info!("Desk {}: {} left ({:?})", desk.desk_number, update.display(), update.band);
        }
    }

    let code = mock_scan_code(&mut rand::thread_rng(), &[desk.desk_number.as_str()])
        .unwrap_or_default();
    scan(&finder, &code);
    finder.rearm_scanner();
    scan(&finder, &ScanCode::check_out(desk.desk_number.as_str()).to_string());

    for entry in finder.history() {
        tracing::info!(
            "History: desk {} on floor {} for {} ({:?})",
            entry.desk_number,
            entry.floor_number,
            entry.duration_label(),
            entry.outcome
        );
    }

    finder.leave();
    Ok(())
}

fn scan(finder: &SeatFinder, code: &str) {
    match finder.resolve_scan(code) {
        Ok(result) => {
            if let Some(message) = UserMessage::scan(&result) {
                show(&message);
            }
        }
        Err(e) => show(&e.user_message()),
    }
}

fn show(message: &UserMessage) {
    println!("[{}] {}", message.title, message.body);
}
