use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// JSON subscriber writing to `sink`.
///
/// `RUST_LOG` wins over `default_filter` when set.
pub fn get_subscriber<Sink>(default_filter: &str, sink: Sink) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_writer(sink)
        .json()
        .with_current_span(true)
        .with_target(true);

    Registry::default().with(env_filter).with(formatting_layer)
}

/// Installs `subscriber` globally. `log` records from actix-web and the
/// request middleware are forwarded into it.
pub fn init_telemetry(subscriber: impl Subscriber + Send + Sync + 'static) {
    subscriber.init();
}
