use crate::app::{Av1EncoderApp, VIDEO_EXTENSIONS};
use eframe::egui;

pub fn render_main_window(app: &mut Av1EncoderApp, ctx: &egui::Context) {
    // Status bar at bottom
    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        render_status_bar(app, ui);
    });

    egui::CentralPanel::default().show(ctx, |ui| {
        render_form(app, ui);

        ui.separator();

        render_controls(app, ui);

        ui.separator();

        render_log(app, ui);
    });
}

fn render_form(app: &mut Av1EncoderApp, ui: &mut egui::Ui) {
    let idle = !app.is_encoding();

    ui.label("Select a video:");
    ui.horizontal(|ui| {
        if ui.add_enabled(idle, egui::Button::new("Open file...")).clicked() {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("Videos", VIDEO_EXTENSIONS)
                .pick_file()
            {
                app.select_file(path);
            }
        }
        ui.label(app.file_label());
    });

    ui.add_space(4.0);

    egui::Grid::new("encode_settings_grid")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui| {
            ui.label("Quality (1-63):");
            ui.add_enabled(
                idle,
                egui::TextEdit::singleline(&mut app.quality).desired_width(80.0),
            );
            ui.end_row();

            ui.label("Resolution (e.g. 1920x1080):");
            ui.add_enabled(
                idle,
                egui::TextEdit::singleline(&mut app.resolution).desired_width(120.0),
            );
            ui.end_row();
        });
}

fn render_controls(app: &mut Av1EncoderApp, ui: &mut egui::Ui) {
    let busy = app.is_encoding();

    ui.horizontal(|ui| {
        if ui.add_enabled(!busy, egui::Button::new("Start encoding")).clicked() {
            app.start_encoding();
        }

        let can_cancel = app
            .task
            .as_ref()
            .map(|t| !t.is_cancel_requested())
            .unwrap_or(false);
        if ui.add_enabled(can_cancel, egui::Button::new("Cancel")).clicked() {
            app.cancel_encoding();
        }

        if busy {
            ui.spinner();
        }
    });

    ui.add(
        egui::ProgressBar::new(f32::from(app.progress) / 100.0)
            .show_percentage()
            .desired_width(ui.available_width()),
    );
}

fn render_log(app: &Av1EncoderApp, ui: &mut egui::Ui) {
    ui.label("Log:");
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            for line in &app.log {
                ui.monospace(line);
            }
        });
}

fn render_status_bar(app: &Av1EncoderApp, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.label(&app.status_message);

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if let Some(ref task) = app.task {
                let name = task
                    .input()
                    .file_name()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default();
                ui.label(format!("{} | {}%", name, app.progress));
            }
        });
    });
}
