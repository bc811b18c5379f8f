use once_cell::sync::OnceCell;

use crate::{context::Posix, host::WasiUnstable};

static GLOBAL: OnceCell<Posix<WasiUnstable>> = OnceCell::new();

/// The process-wide context over the module's own imports.
///
/// Built on first use with the default configuration.
///
/// # Panics
///
/// When the rights of the root descriptor cannot be read: without them no
/// file can be opened at all.
pub fn global() -> &'static Posix<WasiUnstable> {
    GLOBAL.get_or_init(|| match Posix::new(WasiUnstable) {
        Ok(posix) => posix,
        Err(err) => panic!("wasi-posix: {err}"),
    })
}
