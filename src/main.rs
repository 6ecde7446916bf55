mod app;
mod controller;
mod conversation;
mod error;
mod event;
mod sql;
mod theme;

use app::SqlChatApp;
use eframe::egui;
use log::info;
use sql::{SqlClient, GENERATE_SQL_ENDPOINT};
use std::sync::mpsc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (tx, rx) = mpsc::channel();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("sqlchat-runtime")
        .build()?;

    let client = runtime.block_on(async { SqlClient::new(GENERATE_SQL_ENDPOINT, tx) })?;
    info!("sending prompts to {}", client.endpoint());
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([720.0, 480.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "SQL Chat",
        native_options,
        Box::new(move |creation_context| Ok(Box::new(SqlChatApp::new(rx, client, &creation_context.egui_ctx)))),
    )?;

    Ok(())
}
