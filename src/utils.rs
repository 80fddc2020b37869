// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use signal_hook::{
    consts::signal::{SIGINT, SIGQUIT, SIGTERM},
    iterator::{Signals, SignalsInfo},
};
use std::{io, sync::Arc};
use tokio::sync::Notify;

/// Set up handlers for various termination signals.
///
/// Currently we handle:
///   - [SIGINT] - `Ctrl-C`
///   - [SIGTERM] - `kill -15` from shell or systemd etc
///   - [SIGQUIT] - `Ctrl-\`. This normally creates a core dump, but here we just exit cleanly.
///
/// Each received signal wakes whoever waits on `quit`; a signal arriving before
/// anyone waits is remembered.
pub(crate) fn setup_signal_handler(quit: Arc<Notify>) -> io::Result<()> {
    // Signals to listen for
    let listen: [i32; 3] = [SIGINT, SIGTERM, SIGQUIT];
    let mut signals: SignalsInfo = Signals::new(listen)?;

    // Spawn a dedicated thread that listens for signals.
    std::thread::spawn(move || {
        for sig in signals.forever() {
            match sig {
                SIGINT => tracing::info!("Received SIGINT (Ctrl-C), shutting down..."),
                SIGTERM => tracing::info!("Received SIGTERM (kill -15), shutting down..."),
                SIGQUIT => tracing::info!("Received SIGQUIT (Ctrl-\\), shutting down..."),
                _ => {}
            }

            // Tell the server to stop accepting requests.
            quit.notify_one();
        }
    });
    Ok(())
}

/// Resolves once [setup_signal_handler] has seen a termination signal.
pub(crate) async fn shutdown_signal(quit: Arc<Notify>) {
    quit.notified().await;
}
