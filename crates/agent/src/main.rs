//! `motorwatch-agent` -- motor temperature and current monitor.
//!
//! Samples a temperature probe and a current transducer on a fixed
//! cadence, forwards every reading to an HTTP ingestion endpoint, and
//! emails an alert when either quantity crosses its threshold. Sampling
//! and alert delivery run as two independent tasks joined by a bounded
//! queue.
//!
//! See [`motorwatch_agent::config`] for the environment variables.

use std::sync::Arc;
use std::time::Duration;

use motorwatch_agent::config::{AgentConfig, SensorSourceKind};
use motorwatch_agent::dispatcher::NotificationDispatcher;
use motorwatch_agent::link;
use motorwatch_agent::sampler::{Sampler, SamplerSettings};
use motorwatch_agent::sensors::{HwmonSensors, SensorSource, SimulatedSensors};
use motorwatch_core::SharedStateStore;
use motorwatch_events::{
    alert_queue, EmailNotifier, Forwarder, HttpForwarder, LinkFlag, LinkMonitor, LogNotifier,
    Notifier,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long to wait for each task to stop after shutdown is requested.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "motorwatch_agent=info,motorwatch_events=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AgentConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    tracing::info!(
        ingest_url = %config.ingest_url,
        interval_ms = config.sample_interval.as_millis() as u64,
        sensor_source = ?config.sensor_source,
        smtp = config.email.is_some(),
        "Starting motorwatch-agent",
    );

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    // --- Link ---
    let link_flag = LinkFlag::new(false);
    if !link::wait_for_link(&config.link_probe_addr, &link_flag, &cancel).await {
        tracing::info!("Shutdown requested before link came up");
        return;
    }
    let prober_handle = tokio::spawn(link::run_prober(
        config.link_probe_addr.clone(),
        config.link_probe_interval,
        link_flag.clone(),
        cancel.clone(),
    ));
    let link: Arc<dyn LinkMonitor> = Arc::new(link_flag);

    // --- Collaborators ---
    let forwarder: Arc<dyn Forwarder> = match HttpForwarder::new(&config.ingest_url) {
        Ok(forwarder) => Arc::new(forwarder),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build ingestion client");
            std::process::exit(1);
        }
    };

    let notifier: Arc<dyn Notifier> = match config.email.clone() {
        Some(email) => Arc::new(EmailNotifier::new(email)),
        None => {
            tracing::warn!("SMTP_HOST not set -- alerts will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let sensors: Box<dyn SensorSource> = match &config.sensor_source {
        SensorSourceKind::Simulated => Box::new(SimulatedSensors::new()),
        SensorSourceKind::Hwmon {
            temperature_path,
            current_path,
        } => Box::new(HwmonSensors::new(
            temperature_path.clone(),
            current_path.clone(),
        )),
    };

    // --- Core ---
    let (alert_tx, alert_rx) = match alert_queue(config.queue_capacity) {
        Ok(queue) => queue,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create alert queue");
            std::process::exit(1);
        }
    };
    let state = Arc::new(SharedStateStore::new());

    let sampler = Sampler::new(
        SamplerSettings {
            interval: config.sample_interval,
            thresholds: config.thresholds,
            temperature: config.temperature.clone(),
            current: config.current.clone(),
        },
        sensors,
        Arc::clone(&state),
        alert_tx,
        forwarder,
        Arc::clone(&link),
    );
    let dispatcher =
        NotificationDispatcher::new(alert_rx, notifier, link, config.dispatch_cooldown);

    let sampler_handle = tokio::spawn(sampler.run(cancel.clone()));
    let dispatcher_handle = tokio::spawn(dispatcher.run(cancel.clone()));

    cancel.cancelled().await;

    // --- Shutdown ---
    join_task("sampler", sampler_handle).await;
    join_task("dispatcher", dispatcher_handle).await;
    join_task("link prober", prober_handle).await;

    let last = state.read();
    tracing::info!(
        temperature = last.temperature,
        current = last.current,
        "Shutdown complete"
    );
}

/// Wait up to [`SHUTDOWN_GRACE`] for a task, reporting panics and overruns.
async fn join_task(name: &'static str, mut handle: JoinHandle<()>) {
    match tokio::time::timeout(SHUTDOWN_GRACE, &mut handle).await {
        Ok(Ok(())) => tracing::debug!(task = name, "Task stopped"),
        Ok(Err(e)) if e.is_panic() => {
            tracing::error!(task = name, error = %e, "Task panicked");
        }
        Ok(Err(e)) => tracing::warn!(task = name, error = %e, "Task cancelled"),
        Err(_) => {
            tracing::warn!(
                task = name,
                grace_secs = SHUTDOWN_GRACE.as_secs(),
                "Task did not stop in time, aborting"
            );
            handle.abort();
        }
    }
}

/// Cancel `token` on SIGINT or (on Unix) SIGTERM.
async fn cancel_on_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }

    token.cancel();
}
