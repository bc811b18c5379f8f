//! Implementations of [`Host`](wasi_posix_types::Host).
//!
//! Only the real import binding lives here; an in-memory host is provided
//! by the `wasi-posix-mem` crate.

pub use wasi_posix_types::host::{Host, RawErrno};

cfg_if::cfg_if! {
    if #[cfg(all(target_arch = "wasm32", target_os = "wasi"))] {
        mod wasm32;
        pub use self::wasm32::WasiUnstable;
    }
}
