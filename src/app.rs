use crate::controller::{Reconciliation, SendTrigger, SubmissionController};
use crate::conversation::attachments::schema_file_names;
use crate::conversation::Presentation;
use crate::event::AppEvent;
use crate::sql::SqlClient;
use crate::theme::Theme;
use eframe::egui::{self, RichText, ScrollArea};
use log::warn;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const IN_FLIGHT_REPAINT: Duration = Duration::from_millis(100);

pub struct SqlChatApp {
    rx: Receiver<AppEvent>,
    controller: SubmissionController<SqlClient>,
    theme: Theme,
    manual_file_name: String,
    diagnostics_log: Vec<String>,
    scroll_to_bottom: bool,
    channel_closed: bool,
}

impl SqlChatApp {
    pub fn new(rx: Receiver<AppEvent>, client: SqlClient, ctx: &egui::Context) -> Self {
        let theme = Theme::default();
        theme.apply_visuals(ctx);

        Self {
            rx,
            controller: SubmissionController::new(client),
            theme,
            manual_file_name: String::new(),
            diagnostics_log: Vec::new(),
            scroll_to_bottom: false,
            channel_closed: false,
        }
    }

    fn timestamp() -> String {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(duration) => duration.as_secs().to_string(),
            Err(_) => "0".to_string(),
        }
    }

    fn log_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics_log
            .push(format!("[{}] {}", Self::timestamp(), message.into()));
    }

    fn submit_prompt(&mut self, trigger: SendTrigger, ctx: &egui::Context) {
        if self.controller.send(trigger).is_some() {
            self.scroll_to_bottom = true;
            ctx.request_repaint();
        }
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        if self.channel_closed {
            return;
        }

        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply_event(event, ctx),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("event channel disconnected");
                    self.log_diagnostic("event channel disconnected");
                    self.channel_closed = true;
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent, ctx: &egui::Context) {
        match event {
            AppEvent::SqlResponse {
                request_id,
                outcome,
            } => {
                match self.controller.reconcile(request_id, outcome) {
                    Reconciliation::Failed(reason) => {
                        self.log_diagnostic(format!("request {request_id} failed: {reason}"));
                    }
                    Reconciliation::Stray => {
                        self.log_diagnostic(format!("ignored response for unknown request {request_id}"));
                    }
                    Reconciliation::Sql | Reconciliation::NoSql => {}
                }
                self.scroll_to_bottom = true;
                ctx.request_repaint();
            }
        }
    }

    fn collect_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped.is_empty() {
            return;
        }

        let names = schema_file_names(&dropped);
        let skipped = dropped.len() - names.len();
        if skipped > 0 {
            self.log_diagnostic(format!("skipped {skipped} dropped file(s) without a .json extension"));
        }
        self.controller.add_attachments(names);
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        let pending = self.controller.in_flight();
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("SQL Chat");
                ui.separator();
                ui.label(RichText::new(self.controller.dispatcher().endpoint()).color(self.theme.text_muted));
                if pending > 0 {
                    ui.separator();
                    ui.spinner();
                    ui.label(RichText::new(format!("{pending} pending")).color(self.theme.warning));
                }
            });
        });
    }

    fn render_left_panel(&mut self, ctx: &egui::Context) {
        let hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());
        egui::SidePanel::left("upload_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Uploaded Files");
                let hint = if hovering {
                    RichText::new("Release to add .json files").color(self.theme.accent_primary)
                } else {
                    RichText::new("Drop .json schema files on the window").color(self.theme.text_muted)
                };
                ui.label(hint);

                let mut add_now = false;
                ui.horizontal(|ui| {
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut self.manual_file_name)
                            .desired_width(150.0)
                            .hint_text("file name"),
                    );
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        add_now = true;
                    }
                    add_now |= ui
                        .add_enabled(!self.manual_file_name.trim().is_empty(), egui::Button::new("Add"))
                        .clicked();
                });
                if add_now {
                    let name = self.manual_file_name.trim().to_string();
                    if !name.is_empty() {
                        self.controller.add_attachments([name]);
                    }
                    self.manual_file_name.clear();
                }

                ui.separator();
                let attachments = &self.controller.state().attachments;
                if attachments.is_empty() {
                    ui.label(RichText::new("No files yet").color(self.theme.text_muted));
                }
                ScrollArea::vertical().id_salt("uploaded_files").show(ui, |ui| {
                    for name in attachments.file_names() {
                        ui.label(format!("• {name}"));
                    }
                });
            });
    }

    fn render_center_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Response/chat history view");
            ui.separator();

            let transcript_height = (ui.available_height() - 150.0).max(120.0);
            ScrollArea::vertical()
                .id_salt("chat_transcript")
                .max_height(transcript_height)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for message in self.controller.state().log.messages() {
                        match message.presentation() {
                            Presentation::Preformatted(sql) => {
                                self.theme.sql_block_frame().show(ui, |ui| {
                                    ui.set_width(ui.available_width());
                                    ui.label(RichText::new(sql).monospace());
                                });
                            }
                            Presentation::Inline { sender, text } => {
                                ui.horizontal_wrapped(|ui| {
                                    ui.label(RichText::new(format!("{sender}:")).strong());
                                    ui.label(text);
                                });
                            }
                        }
                    }

                    if self.scroll_to_bottom {
                        ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                    }
                });
            self.scroll_to_bottom = false;

            ui.separator();
            egui::CollapsingHeader::new("Diagnostics")
                .default_open(false)
                .show(ui, |ui| {
                    ScrollArea::vertical()
                        .id_salt("diagnostics_log")
                        .max_height(90.0)
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for entry in &self.diagnostics_log {
                                ui.label(RichText::new(entry).color(self.theme.danger));
                            }
                        });
                });

            ui.separator();
            let mut trigger = None;
            self.theme.composer_frame().show(ui, |ui| {
                ui.horizontal(|ui| {
                    let response = ui.add(
                        egui::TextEdit::singleline(self.controller.pending_input_mut())
                            .desired_width(ui.available_width() - 80.0)
                            .hint_text("Question/chat input"),
                    );
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        trigger = Some(SendTrigger::EnterKey);
                        response.request_focus();
                    }

                    if ui.button("Send").clicked() {
                        trigger = Some(SendTrigger::SendButton);
                    }
                });
            });

            if let Some(trigger) = trigger {
                self.submit_prompt(trigger, ctx);
            }
        });
    }
}

impl eframe::App for SqlChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events(ctx);
        self.collect_dropped_files(ctx);
        self.render_top_bar(ctx);
        self.render_left_panel(ctx);
        self.render_center_panel(ctx);

        if self.controller.in_flight() > 0 {
            ctx.request_repaint_after(IN_FLIGHT_REPAINT);
        }
    }
}
