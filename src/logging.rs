use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

pub fn default_filter(debug_mode: bool) -> &'static str {
    if debug_mode {
        "info,oklink_client=debug,config_manager=debug"
    } else {
        "info"
    }
}

/// Install the stderr subscriber before anything else logs. The returned
/// handle switches the default filter once configuration is loaded; it is
/// `None` when `RUST_LOG` is set, since an explicit filter always wins.
pub fn init() -> Option<FilterHandle> {
    let from_env = EnvFilter::try_from_default_env().ok();
    let explicit = from_env.is_some();
    let filter = from_env.unwrap_or_else(|| EnvFilter::new(default_filter(false)));

    let (filter, handle) = reload::Layer::new(filter);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    (!explicit).then_some(handle)
}

/// Widen the default filter when the loaded configuration asks for debug output
pub fn apply_debug_mode(handle: Option<&FilterHandle>, debug_mode: bool) -> Result<()> {
    if let (Some(handle), true) = (handle, debug_mode) {
        handle.reload(EnvFilter::new(default_filter(true)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters_parse() {
        for debug_mode in [false, true] {
            assert!(EnvFilter::try_new(default_filter(debug_mode)).is_ok());
        }
        assert!(default_filter(true).contains("oklink_client=debug"));
        assert_eq!(default_filter(false), "info");
    }

    #[test]
    fn test_debug_mode_reloads_filter() {
        // the handle only works while its layer is alive
        let (_layer, handle) = reload::Layer::<EnvFilter, Registry>::new(EnvFilter::new("info"));

        apply_debug_mode(Some(&handle), false).unwrap();
        let current = handle.with_current(|f| f.to_string()).unwrap();
        assert!(!current.contains("oklink_client"));

        apply_debug_mode(Some(&handle), true).unwrap();
        let current = handle.with_current(|f| f.to_string()).unwrap();
        assert!(current.contains("oklink_client=debug"));

        // an explicit RUST_LOG leaves nothing to reload
        apply_debug_mode(None, true).unwrap();
    }
}
