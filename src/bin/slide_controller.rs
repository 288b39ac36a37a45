//! Desktop/SBC slide timer controller.
//!
//! Brings up the display, syncs the clock over SNTP, starts the event loop
//! with the HTTP reporter, and serves the status API. Without sensor
//! hardware attached, runs can be driven through the web API:
//!
//! ```sh
//! curl -X POST localhost:8080/api/card   -d '{"card_id": 12345}'
//! curl -X POST localhost:8080/api/sensor -d '{"sensor": "upper"}'
//! curl -X POST localhost:8080/api/sensor -d '{"sensor": "lower"}'
//! curl localhost:8080/api/state
//! ```
//!
//! # Environment
//!
//! | Variable | Default |
//! |----------|---------|
//! | `SLIDE_API_HOST` | `devsnaggertown` |
//! | `SLIDE_API_PORT` | `8081` |
//! | `SLIDE_NTP_HOST` | `pool.ntp.org` |
//! | `SLIDE_UTC_OFFSET` | `-5` |
//! | `SLIDE_ELAPSED_MODE` | `total` (or `ms-component`) |
//! | `SLIDE_STALE_TIMEOUT_MS` | `120000` (`0` disables) |
//! | `SLIDE_WEB_PORT` | `8080` |
//! | `SLIDE_DEVICE_NAME` | `slide-timer` |
//! | `RUST_LOG` | `info` |

use std::str::FromStr;
use std::sync::Arc;

use slide_timer::hal::{ConsoleDisplay, SystemClock};
use slide_timer::services::{
    run_server, AppState, HttpReporter, SlideService, SntpTimeSource, WebServerConfig,
};
use slide_timer::{
    startup, ApiConfig, ClockConfig, Config, DeviceConfig, ElapsedMode, RunTracker, TrackConfig,
    TrackerSettings, WallClock, WebConfig,
};

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("ignoring invalid {}={:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

fn load_config() -> Config {
    let defaults = Config::default();

    let elapsed_mode = match std::env::var("SLIDE_ELAPSED_MODE").as_deref() {
        Ok("ms-component") | Ok("millisecond_component") => ElapsedMode::MillisecondComponent,
        _ => ElapsedMode::Total,
    };

    Config::default()
        .with_api(
            ApiConfig::default()
                .with_host(&env_or("SLIDE_API_HOST", defaults.api.host.to_string()))
                .with_port(env_or("SLIDE_API_PORT", defaults.api.port)),
        )
        .with_clock(
            ClockConfig::default()
                .with_ntp_host(&env_or("SLIDE_NTP_HOST", defaults.clock.ntp_host.to_string()))
                .with_utc_offset_hours(env_or("SLIDE_UTC_OFFSET", defaults.clock.utc_offset_hours)),
        )
        .with_track(
            TrackConfig::default()
                .with_elapsed_mode(elapsed_mode)
                .with_stale_run_timeout_ms(env_or(
                    "SLIDE_STALE_TIMEOUT_MS",
                    defaults.track.stale_run_timeout_ms,
                )),
        )
        .with_web(WebConfig::default().with_port(env_or("SLIDE_WEB_PORT", defaults.web.port)))
        .with_device(
            DeviceConfig::default()
                .with_name(&env_or("SLIDE_DEVICE_NAME", defaults.device.name.to_string())),
        )
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!();
    println!("================================");
    println!("  Slide Timer Controller");
    println!("================================");
    println!();

    let config = load_config();
    log::info!("reporting runs to {}", config.api.url());

    let runtime = tokio::runtime::Runtime::new()?;

    // =========================================================================
    // Startup (SNTP exchange driven on the runtime from this thread)
    // =========================================================================
    let mut display = ConsoleDisplay::new().with_prefix(&config.device.name);
    let mut wall = WallClock::new(SystemClock::new());
    let mut ntp = SntpTimeSource::from_config(&config.clock, runtime.handle().clone());
    startup::initialize(&mut display, &mut ntp, &mut wall, &config.clock);
    let wall = Arc::new(wall);

    // =========================================================================
    // Event loop + web API
    // =========================================================================
    runtime.block_on(async move {
        let reporter = HttpReporter::new(&config.api)?;
        let tracker = RunTracker::new(
            display,
            reporter,
            config.sensors,
            TrackerSettings::from(&config.track),
        );
        let (service, sender, snapshots) =
            SlideService::new(tracker, Arc::clone(&wall), &config.service);
        let service_task = tokio::spawn(service.run());

        if config.web.enabled {
            let web_config = WebServerConfig::from_config(&config.web);
            println!("  API: http://{}/api/state", web_config.addr);
            println!();
            let state = Arc::new(AppState::new(sender, snapshots, wall));
            run_server(state, web_config).await?;
        } else {
            log::info!("web server disabled; waiting for shutdown");
            tokio::signal::ctrl_c().await?;
            drop(sender);
        }

        service_task.await?;
        Ok::<(), anyhow::Error>(())
    })
}
