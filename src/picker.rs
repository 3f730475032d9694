use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::mpsc,
};

use crate::source;

const CELL: f32 = 140.0;
const THUMB_SIZE: u32 = 256;

enum ThumbState {
    Loading,
    Ready(egui::TextureHandle),
    Failed,
}

struct ThumbResult {
    path: PathBuf,
    rgba: Option<(Vec<u8>, usize, usize)>,
}

#[derive(Debug, Default, PartialEq)]
struct Listing {
    subdirs: Vec<(PathBuf, String)>,
    images: Vec<(PathBuf, String)>,
}

/// In-app photo picker: a directory browser with a thumbnail grid.
pub struct PhotoPicker {
    pub current_dir: PathBuf,
    listing: Listing,
    pending_nav: Option<PathBuf>,
    thumbnails: HashMap<PathBuf, ThumbState>,
    tx: mpsc::SyncSender<ThumbResult>,
    rx: mpsc::Receiver<ThumbResult>,
    picked: Option<PathBuf>,
}

impl PhotoPicker {
    pub fn new(start_dir: Option<PathBuf>) -> Self {
        let (tx, rx) = mpsc::sync_channel(64);
        let current_dir = start_dir
            .filter(|p| p.is_dir())
            .or_else(dirs::picture_dir)
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("/"));
        let mut picker = Self {
            current_dir,
            listing: Listing::default(),
            pending_nav: None,
            thumbnails: HashMap::new(),
            tx,
            rx,
            picked: None,
        };
        picker.rescan();
        picker
    }

    /// Hands out the most recent pick once.
    pub fn take_picked(&mut self) -> Option<PathBuf> {
        self.picked.take()
    }

    fn rescan(&mut self) {
        self.thumbnails.clear();
        self.listing = list_dir(&self.current_dir);
    }

    /// Applies pending navigation and collects finished thumbnails.
    pub fn poll(&mut self, ctx: &egui::Context) {
        if let Some(nav) = self.pending_nav.take() {
            self.current_dir = nav;
            self.rescan();
        }

        while let Ok(ThumbResult { path, rgba }) = self.rx.try_recv() {
            // Results from a directory we already left are stale.
            if !self.thumbnails.contains_key(&path) {
                continue;
            }
            let state = match rgba {
                Some((data, w, h)) => {
                    let img = egui::ColorImage::from_rgba_unmultiplied([w, h], &data);
                    let tex = ctx.load_texture(
                        path.to_string_lossy().as_ref(),
                        img,
                        egui::TextureOptions::LINEAR,
                    );
                    ThumbState::Ready(tex)
                }
                None => ThumbState::Failed,
            };
            self.thumbnails.insert(path, state);
        }
    }

    fn queue_pending_thumbs(&mut self, ctx: &egui::Context) {
        let to_queue: Vec<PathBuf> = self
            .listing
            .images
            .iter()
            .filter(|(p, _)| !self.thumbnails.contains_key(p))
            .map(|(p, _)| p.clone())
            .collect();

        for path in to_queue {
            self.thumbnails.insert(path.clone(), ThumbState::Loading);
            let tx = self.tx.clone();
            let ctx2 = ctx.clone();
            std::thread::spawn(move || {
                let rgba = generate_thumb(&path);
                let _ = tx.send(ThumbResult { path, rgba });
                ctx2.request_repaint();
            });
        }
    }

    pub fn show_contents(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        self.queue_pending_thumbs(ctx);

        ui.horizontal(|ui| {
            if ui.button("⬆").on_hover_text("Parent directory").clicked() {
                if let Some(p) = self.current_dir.parent() {
                    self.pending_nav = Some(p.to_path_buf());
                }
            }
            ui.monospace(self.current_dir.display().to_string());
        });
        ui.separator();

        if !self.listing.subdirs.is_empty() {
            ui.horizontal_wrapped(|ui| {
                for (path, name) in &self.listing.subdirs {
                    if ui.button(format!("📁 {}", name)).clicked() {
                        self.pending_nav = Some(path.clone());
                    }
                }
            });
            ui.separator();
        }

        if self.listing.images.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label("No photos in this folder");
            });
            return;
        }

        let cols = ((ui.available_width() / (CELL + 8.0)) as usize).max(1);
        let mut new_pick: Option<PathBuf> = None;

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                egui::Grid::new("picker_grid")
                    .num_columns(cols)
                    .spacing([8.0, 8.0])
                    .show(ui, |ui| {
                        for (i, (path, name)) in self.listing.images.iter().enumerate() {
                            let thumb = match self.thumbnails.get(path) {
                                Some(ThumbState::Ready(tex)) => {
                                    Some((tex.id(), tex.size_vec2()))
                                }
                                _ => None,
                            };
                            let failed =
                                matches!(self.thumbnails.get(path), Some(ThumbState::Failed));
                            if draw_thumb_cell(ui, name, thumb, failed) {
                                new_pick = Some(path.clone());
                            }
                            if (i + 1) % cols == 0 {
                                ui.end_row();
                            }
                        }
                    });
            });

        if let Some(path) = new_pick {
            tracing::debug!(path = %path.display(), "photo picked");
            self.picked = Some(path);
        }
    }
}

fn list_dir(dir: &Path) -> Listing {
    let mut listing = Listing::default();
    let Ok(rd) = std::fs::read_dir(dir) else {
        return listing;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        if path.is_dir() {
            listing.subdirs.push((path, name));
        } else if source::is_supported_image(&path) {
            listing.images.push((path, name));
        }
    }

    listing.subdirs.sort_by(|a, b| a.1.cmp(&b.1));
    listing.images.sort_by(|a, b| a.1.cmp(&b.1));
    listing
}

fn generate_thumb(path: &Path) -> Option<(Vec<u8>, usize, usize)> {
    let bytes = source::read_bytes(path)?;
    let img = source::decode(&bytes).ok()?;
    let rgba = img.thumbnail(THUMB_SIZE, THUMB_SIZE).to_rgba8();
    let w = rgba.width() as usize;
    let h = rgba.height() as usize;
    Some((rgba.into_raw(), w, h))
}

fn draw_thumb_cell(
    ui: &mut egui::Ui,
    name: &str,
    thumb: Option<(egui::TextureId, egui::Vec2)>,
    failed: bool,
) -> bool {
    let (resp, painter) =
        ui.allocate_painter(egui::vec2(CELL, CELL + 22.0), egui::Sense::click());
    let rect = resp.rect;

    if resp.hovered() {
        painter.rect_filled(rect, 4.0, ui.visuals().widgets.hovered.bg_fill);
    }

    let img_rect = egui::Rect::from_min_size(rect.min, egui::vec2(CELL, CELL));
    match thumb {
        Some((tex_id, tex_size)) => {
            let scale = (CELL / tex_size.x).min(CELL / tex_size.y);
            let display = tex_size * scale;
            let offset = (egui::vec2(CELL, CELL) - display) * 0.5;
            let draw_rect = egui::Rect::from_min_size(img_rect.min + offset, display);
            painter.image(
                tex_id,
                draw_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }
        None => {
            painter.rect_filled(img_rect, 4.0, egui::Color32::from_gray(40));
            painter.text(
                img_rect.center(),
                egui::Align2::CENTER_CENTER,
                if failed { "⚠" } else { "…" },
                egui::FontId::proportional(22.0),
                egui::Color32::GRAY,
            );
        }
    }

    let label_pos = egui::pos2(rect.center().x, img_rect.max.y + 11.0);
    let name_short: String = name.chars().take(22).collect();
    painter.text(
        label_pos,
        egui::Align2::CENTER_CENTER,
        name_short,
        egui::FontId::proportional(11.0),
        ui.visuals().text_color(),
    );

    resp.clicked()
}
