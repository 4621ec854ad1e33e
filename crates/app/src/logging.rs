use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

pub fn setup_tracing(level: LevelFilter) {
    let filter_layer = tracing_subscriber::filter::filter_fn(move |metadata| {
        let target = metadata.target();
        let is_ours = target.starts_with("weightcopy") || target.starts_with("core");
        let effective = if is_ours { level } else { level.min(LevelFilter::WARN) };
        metadata.level() <= &effective
    });
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter_layer))
        .init();
}

