use std::io::{self, IsTerminal};

use crate::config::Config;
use crate::die;
use crate::ollama::api::OllamaApi;
use crate::RequestedColorMode;

pub(crate) mod chat;
pub(crate) mod list;

/// Binds a backend handle from the configured base address, falling back to
/// the fixed default endpoint.
pub(crate) fn backend_api(config: &Config) -> OllamaApi {
    match &config.backend.api_base {
        Some(api_base) => match OllamaApi::with_api_base(api_base) {
            Ok(api) => api,
            Err(err) => die!("backend api base failed to parse: {}", err),
        },
        None => OllamaApi::new(),
    }
}

#[derive(Clone, Copy, strum_macros::Display)]
pub(crate) enum ColorMode {
    On,
    Off,
}

impl ColorMode {
    /// Returns whether ANSI color should be used.
    /// A preference stated on the command line or through the "NO_COLOR"
    /// environment variable is honored. Absent a preference, color is enabled
    /// when the output is a terminal.
    pub(crate) fn resolve_auto(cm: RequestedColorMode) -> ColorMode {
        match cm {
            RequestedColorMode::Auto => {
                let disable_color =
                    std::env::var_os("NO_COLOR").is_some() || !io::stdout().is_terminal();

                if disable_color {
                    ColorMode::Off
                } else {
                    ColorMode::On
                }
            }
            RequestedColorMode::On => ColorMode::On,
            RequestedColorMode::Off => ColorMode::Off,
        }
    }
}
