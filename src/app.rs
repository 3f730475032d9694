use std::path::PathBuf;
use std::sync::mpsc;

use crate::{
    config::AppConfig,
    filter::FilterKind,
    picker::PhotoPicker,
    review::ReviewGate,
    share::{self, ShareFormat, ShareOptions},
    source::PhotoLoader,
    state::EditSession,
};

pub struct InstafilterApp {
    session: EditSession,
    loader: PhotoLoader,
    picker: PhotoPicker,
    review_gate: ReviewGate,
    texture: Option<egui::TextureHandle>,
    texture_revision: u64,
    photo_stem: String,
    show_picker: bool,
    show_filter_choice: bool,
    show_review_prompt: bool,
    show_share_window: bool,
    share_path: String,
    share_format: ShareFormat,
    share_jpg_quality: u8,
    share_status: String,
    share_rx: Option<mpsc::Receiver<Result<PathBuf, String>>>,
    config: AppConfig,
}

impl InstafilterApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig, preview_max: u32) -> Self {
        let picker = PhotoPicker::new(config.browse_path.clone());
        let share_dir = config
            .share_path
            .clone()
            .unwrap_or_else(share::default_share_dir);
        let share_format = config
            .share_format
            .as_deref()
            .map(ShareFormat::parse)
            .unwrap_or(ShareFormat::Jpg);
        Self {
            session: EditSession::new(),
            loader: PhotoLoader::new(preview_max),
            picker,
            review_gate: ReviewGate::default(),
            texture: None,
            texture_revision: 0,
            photo_stem: String::from("photo"),
            show_picker: false,
            show_filter_choice: false,
            show_review_prompt: false,
            show_share_window: false,
            share_path: share_dir.display().to_string(),
            share_format,
            share_jpg_quality: ShareOptions::default().jpg_quality,
            share_status: String::new(),
            share_rx: None,
            config,
        }
    }

    fn refresh_texture(&mut self, ctx: &egui::Context) {
        if self.session.revision() == self.texture_revision {
            return;
        }
        self.texture_revision = self.session.revision();
        let Some(img) = self.session.processed() else {
            return;
        };
        let rgba = img.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let color = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
        match self.texture.as_mut() {
            Some(tex) => tex.set(color, egui::TextureOptions::LINEAR),
            None => {
                self.texture =
                    Some(ctx.load_texture("processed", color, egui::TextureOptions::LINEAR));
            }
        }
    }

    fn choose_filter(&mut self, kind: FilterKind) {
        tracing::debug!(filter = kind.label(), "filter selected");
        self.session.set_filter(kind);
        if self.review_gate.record_change(&mut self.config) {
            self.show_review_prompt = true;
        }
    }

    fn start_share(&mut self, ctx: &egui::Context) {
        let Some(img) = self.session.processed().cloned() else {
            return;
        };
        let dir = share::expand_home_prefix(self.share_path.trim());
        if dir.as_os_str().is_empty() {
            self.share_status = "Destination folder is empty".to_string();
            return;
        }
        let options = ShareOptions {
            format: self.share_format,
            jpg_quality: self.share_jpg_quality,
        };
        self.config.share_path = Some(dir.clone());
        self.config.share_format = Some(self.share_format.extension().to_string());

        let stem = format!("{}-{}", self.photo_stem, slug(self.session.filter_kind()));
        self.share_rx = Some(share::spawn_share(img, dir, stem, options, ctx));
        self.share_status = "Saving...".to_string();
    }

    fn poll_share(&mut self) {
        let Some(rx) = self.share_rx.as_ref() else {
            return;
        };
        match rx.try_recv() {
            Ok(Ok(path)) => {
                self.share_status = format!("Saved {}", path.display());
                self.share_rx = None;
            }
            Ok(Err(err)) => {
                self.share_status = format!("Could not save: {}", err);
                self.share_rx = None;
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                self.share_rx = None;
            }
        }
    }

    fn show_photo(&mut self, ui: &mut egui::Ui) {
        let avail = ui.available_size();
        let has_output = self.session.processed().is_some();
        if let Some(tex) = self.texture.as_ref().filter(|_| has_output) {
            let tex_size = tex.size_vec2();
            let scale = (avail.x / tex_size.x).min(avail.y / tex_size.y);
            let display = tex_size * scale;
            ui.centered_and_justified(|ui| {
                ui.add(egui::Image::new((tex.id(), display)));
            });
            return;
        }

        ui.centered_and_justified(|ui| {
            let text = if self.loader.is_loading() {
                "Loading..."
            } else {
                "No Picture\nClick to import a photo"
            };
            let placeholder = ui.add(
                egui::Label::new(egui::RichText::new(text).size(18.0).weak())
                    .sense(egui::Sense::click()),
            );
            if placeholder.clicked() {
                self.show_picker = true;
            }
        });
    }

    fn show_controls(&mut self, ui: &mut egui::Ui) {
        ui.add_space(6.0);
        ui.horizontal(|ui| {
            ui.label("Intensity");
            let mut intensity = self.session.intensity();
            let resp = ui.add_sized(
                [ui.available_width(), 18.0],
                egui::Slider::new(&mut intensity, 0.0_f32..=1.0_f32)
                    .show_value(false)
                    .clamping(egui::SliderClamping::Always),
            );
            if resp.changed() {
                self.session.set_intensity(intensity);
            }
        });

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            if ui.button("Change Filter").clicked() {
                self.show_filter_choice = true;
            }
            ui.weak(self.session.filter_kind().label());
            let filter = self.session.filter();
            for &key in filter.input_keys() {
                if let Some(value) = filter.value(key) {
                    ui.weak(format!("{} {:.1}", key.name(), value));
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let can_share = self.session.processed().is_some();
                if ui
                    .add_enabled(can_share, egui::Button::new("Share"))
                    .clicked()
                {
                    self.show_share_window = true;
                }
                if ui.button("Pick Photo").clicked() {
                    self.show_picker = true;
                }
            });
        });
        ui.add_space(6.0);
    }

    fn show_filter_choice(&mut self, ctx: &egui::Context) {
        if !self.show_filter_choice {
            return;
        }
        let mut chosen: Option<FilterKind> = None;
        let mut cancel = false;
        egui::Window::new("Select a filter")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.vertical_centered_justified(|ui| {
                    for kind in FilterKind::ALL {
                        if ui.button(kind.label()).clicked() {
                            chosen = Some(kind);
                        }
                    }
                    ui.separator();
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });

        if let Some(kind) = chosen {
            self.choose_filter(kind);
            self.show_filter_choice = false;
        } else if cancel {
            self.show_filter_choice = false;
        }
    }

    fn show_share_window(&mut self, ctx: &egui::Context) {
        if !self.show_share_window {
            return;
        }
        let mut open = self.show_share_window;
        let saving = self.share_rx.is_some();
        egui::Window::new("Share")
            .open(&mut open)
            .default_size([480.0, 200.0])
            .show(ctx, |ui| {
                ui.label("Destination Folder");
                ui.add(
                    egui::TextEdit::singleline(&mut self.share_path)
                        .desired_width(ui.available_width())
                        .font(egui::TextStyle::Monospace),
                );

                ui.add_space(8.0);
                egui::ComboBox::from_label("Format")
                    .selected_text(self.share_format.label())
                    .show_ui(ui, |ui| {
                        for fmt in ShareFormat::ALL {
                            ui.selectable_value(&mut self.share_format, fmt, fmt.label());
                        }
                    });
                if self.share_format == ShareFormat::Jpg {
                    ui.horizontal(|ui| {
                        ui.label("JPEG Quality");
                        ui.add(
                            egui::Slider::new(&mut self.share_jpg_quality, 1_u8..=100_u8)
                                .clamping(egui::SliderClamping::Always),
                        );
                    });
                }

                ui.add_space(8.0);
                let label = if saving { "Saving..." } else { "Save" };
                if ui
                    .add_enabled(!saving, egui::Button::new(label))
                    .clicked()
                {
                    self.start_share(ctx);
                }

                if !self.share_status.is_empty() {
                    ui.separator();
                    ui.label(&self.share_status);
                }
            });
        self.show_share_window = open;
    }

    fn show_review_prompt(&mut self, ctx: &egui::Context) {
        if !self.show_review_prompt {
            return;
        }
        egui::Window::new("Enjoying Instafilter?")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("You've tried a lot of filters. Would you rate the app?");
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Rate Instafilter").clicked() {
                        tracing::info!("review accepted");
                        self.show_review_prompt = false;
                    }
                    if ui.button("Not Now").clicked() {
                        self.show_review_prompt = false;
                    }
                });
            });
    }
}

fn slug(kind: FilterKind) -> String {
    kind.label().to_ascii_lowercase().replace(' ', "-")
}

impl eframe::App for InstafilterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Track window size for saving on exit
        if let Some(rect) = ctx.input(|i| i.viewport().inner_rect) {
            self.config.window_width = Some(rect.width());
            self.config.window_height = Some(rect.height());
        }

        // Poll background work before drawing
        self.picker.poll(ctx);
        if let Some(path) = self.picker.take_picked() {
            self.photo_stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "photo".to_string());
            self.loader.request(path, ctx);
            self.show_picker = false;
        }
        if let Some(img) = self.loader.poll() {
            self.session.load_image(img);
        }
        self.poll_share();
        self.refresh_texture(ctx);

        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
            self.show_controls(ui);
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_photo(ui);
        });

        if self.show_picker {
            let mut open = self.show_picker;
            egui::Window::new("Photos")
                .open(&mut open)
                .default_size([620.0, 640.0])
                .show(ctx, |ui| {
                    self.picker.show_contents(ui, ctx);
                });
            self.show_picker = open && self.show_picker;
        }

        self.show_filter_choice(ctx);
        self.show_share_window(ctx);
        self.show_review_prompt(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.config.browse_path = Some(self.picker.current_dir.clone());
        self.config.save();
    }
}
