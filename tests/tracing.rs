use tracing::subscriber::set_global_default;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt as _};

/// Installs a hierarchical subscriber filtered by `RUST_LOG`. Tests in one
/// binary share the global subscriber, so later calls are no-ops.
pub fn init_tracing() {
    let subscriber = Registry::default()
        .with(
            tracing_tree::HierarchicalLayer::new(2)
                .with_indent_lines(true)
                .with_bracketed_fields(true)
                .with_targets(true),
        )
        .with(EnvFilter::from_default_env());
    if set_global_default(subscriber).is_ok() {
        eprintln!();
    }
}
