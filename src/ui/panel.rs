use std::path::PathBuf;

use egui::{Context, Vec2};
use glam::Vec4;

use super::file_browser::FileBrowser;
use crate::config::ViewerConfig;
use crate::controller::{Projection, ViewerState};
use crate::model::{MappingMode, Material, ModelInfo};

pub const CONTROL_WINDOW_SIZE: Vec2 = Vec2::new(222.0, 50.0);
/// Room for the "no texture coordinates" note.
pub const NO_UV_EXTRA_HEIGHT: f32 = 26.0;
pub const LIGHT_WINDOW_SIZE: Vec2 = Vec2::new(222.0, 244.0);
const MARGIN: f32 = 5.0;

/// Requests the GUI hands back to the shell; applied after the frame is declared.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    CycleTexture,
    SelectProgram(usize),
    LoadModel(PathBuf),
    LoadTexture(PathBuf),
}

pub struct UiState {
    pub model_browser: FileBrowser,
    pub texture_browser: FileBrowser,
    /// Last load error, shown under the controls until the next success.
    pub status: Option<String>,
}

impl UiState {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            model_browser: FileBrowser::new("Acho que eu vi um gatinho")
                .with_type_filters(&[".obj"])
                .with_pwd(config.assets_dir()),
            texture_browser: FileBrowser::new("Load Texture")
                .with_type_filters(&[".jpg", ".png"])
                .with_pwd(config.maps_dir()),
            status: None,
        }
    }
}

pub fn control_window_size(has_uv: bool) -> Vec2 {
    if has_uv {
        CONTROL_WINDOW_SIZE
    } else {
        CONTROL_WINDOW_SIZE + Vec2::new(0.0, NO_UV_EXTRA_HEIGHT)
    }
}

/// Declare the whole GUI for this frame and collect what the user asked for.
pub fn draw_viewer_ui(
    ctx: &Context,
    ui_state: &mut UiState,
    state: &mut ViewerState,
    model: Option<&ModelInfo>,
    program_names: &[String],
) -> Vec<UiAction> {
    let mut actions = Vec::new();
    let viewport = ctx.available_rect();
    let has_uv = model.is_some_and(|m| m.has_uv);

    let browser_size = viewport.size() * 0.8;
    ui_state.model_browser.set_window_size(browser_size);
    ui_state.texture_browser.set_window_size(browser_size);

    draw_control_window(ctx, viewport, ui_state, state, model, has_uv, program_names, &mut actions);

    if state.shows_lighting_panel() {
        draw_light_window(ctx, viewport, state);
    }

    ui_state.model_browser.display(ctx);
    if let Some(path) = ui_state.model_browser.selected() {
        actions.push(UiAction::LoadModel(path.to_path_buf()));
        ui_state.model_browser.clear_selected();
    }

    ui_state.texture_browser.display(ctx);
    if let Some(path) = ui_state.texture_browser.selected() {
        actions.push(UiAction::LoadTexture(path.to_path_buf()));
        ui_state.texture_browser.clear_selected();
    }

    actions
}

#[allow(clippy::too_many_arguments)]
fn draw_control_window(
    ctx: &Context,
    viewport: egui::Rect,
    ui_state: &mut UiState,
    state: &mut ViewerState,
    model: Option<&ModelInfo>,
    has_uv: bool,
    program_names: &[String],
    actions: &mut Vec<UiAction>,
) {
    let size = control_window_size(has_uv);

    egui::Window::new("Widget window")
        .title_bar(false)
        .resizable(false)
        .default_size(size)
        .min_width(size.x)
        .fixed_pos([viewport.max.x - size.x - MARGIN, viewport.min.y + MARGIN])
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open model...").clicked() {
                        ui_state.model_browser.open();
                    }
                    if ui.button("Open texture...").clicked() {
                        ui_state.texture_browser.open();
                    }
                });
            });
            ui.separator();

            if ui.add_sized([100.0, 50.0], egui::Button::new("Trocar a cor")).clicked() {
                actions.push(UiAction::CycleTexture);
            }

            let current = state.current_program();
            let mut selected = current;
            let current_name = program_names.get(current).map(String::as_str).unwrap_or("-");
            egui::ComboBox::from_label("Shader")
                .selected_text(current_name)
                .width(120.0)
                .show_ui(ui, |ui| {
                    for (index, name) in program_names.iter().enumerate() {
                        ui.selectable_value(&mut selected, index, name.as_str());
                    }
                });
            if selected != current {
                actions.push(UiAction::SelectProgram(selected));
            }

            egui::ComboBox::from_label("UV mapping")
                .selected_text(state.mapping_mode.label())
                .width(120.0)
                .show_ui(ui, |ui| {
                    for mode in MappingMode::available(has_uv) {
                        ui.selectable_value(&mut state.mapping_mode, *mode, mode.label());
                    }
                });

            egui::ComboBox::from_label("Projection")
                .selected_text(state.projection.label())
                .width(120.0)
                .show_ui(ui, |ui| {
                    for projection in Projection::ALL {
                        ui.selectable_value(&mut state.projection, projection, projection.label());
                    }
                });

            if !has_uv {
                ui.label(egui::RichText::new("Mesh has no texture coordinates").small());
            }
            if let Some(info) = model {
                ui.label(egui::RichText::new(format!("Triangles: {}", info.triangles)).small());
            }
            if let Some(status) = &ui_state.status {
                ui.colored_label(egui::Color32::LIGHT_RED, status);
            }
        });
}

fn color_edit(ui: &mut egui::Ui, label: &str, color: &mut Vec4) {
    ui.horizontal(|ui| {
        let mut rgb = [color.x, color.y, color.z];
        if ui.color_edit_button_rgb(&mut rgb).changed() {
            *color = Vec4::new(rgb[0], rgb[1], rgb[2], color.w);
        }
        ui.label(label);
    });
}

fn draw_light_window(ctx: &Context, viewport: egui::Rect, state: &mut ViewerState) {
    let size = LIGHT_WINDOW_SIZE;
    egui::Window::new("Light properties")
        .title_bar(false)
        .resizable(false)
        .fixed_size(size)
        .fixed_pos([viewport.max.x - size.x - MARGIN, viewport.max.y - size.y - MARGIN])
        .show(ctx, |ui| {
            ui.label("Light properties");
            color_edit(ui, "Ia", &mut state.lighting.ia);
            color_edit(ui, "Id", &mut state.lighting.id);
            color_edit(ui, "Is", &mut state.lighting.is);

            ui.add_space(4.0);
            ui.label("Material properties");
            color_edit(ui, "Ka", &mut state.material.ka);
            color_edit(ui, "Kd", &mut state.material.kd);
            color_edit(ui, "Ks", &mut state.material.ks);

            ui.add(
                egui::Slider::new(&mut state.material.shininess, 0.0..=Material::MAX_SHININESS)
                    .text("shininess"),
            );
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_frame(
        ctx: &Context,
        ui_state: &mut UiState,
        state: &mut ViewerState,
        info: &ModelInfo,
    ) -> Vec<UiAction> {
        let names: Vec<String> = crate::config::SHADER_NAMES.iter().map(|s| s.to_string()).collect();
        let mut actions = Vec::new();
        let mut input = egui::RawInput::default();
        input.screen_rect = Some(egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(800.0, 600.0)));
        let _ = ctx.run(input, |ctx| {
            actions = draw_viewer_ui(ctx, ui_state, state, Some(info), &names);
        });
        actions
    }

    fn info(has_uv: bool) -> ModelInfo {
        ModelInfo {
            path: PathBuf::from("cat.obj"),
            triangles: 2,
            has_uv,
            material: Material::default(),
        }
    }

    #[test]
    fn test_idle_frame_emits_nothing() {
        let ctx = Context::default();
        let mut ui_state = UiState::new(&ViewerConfig::default());
        let mut state = ViewerState::new(6, 800, 600);
        assert!(run_frame(&ctx, &mut ui_state, &mut state, &info(true)).is_empty());
    }

    #[test]
    fn test_browser_selection_is_reported_once() {
        let dir = tempfile::tempdir().unwrap();
        let mesh = dir.path().join("other.OBJ");
        std::fs::write(&mesh, "v 0 0 0\n").unwrap();

        let ctx = Context::default();
        let mut ui_state = UiState::new(&ViewerConfig::default());
        let mut state = ViewerState::new(6, 800, 600);

        ui_state.model_browser.set_pwd(dir.path());
        ui_state.model_browser.open();
        ui_state.model_browser.choose(&mesh);

        let actions = run_frame(&ctx, &mut ui_state, &mut state, &info(true));
        assert_eq!(actions, vec![UiAction::LoadModel(mesh)]);
        assert!(!ui_state.model_browser.has_selected());
        assert!(run_frame(&ctx, &mut ui_state, &mut state, &info(true)).is_empty());
    }

    #[test]
    fn test_browsers_use_expected_titles_and_filters() {
        let ui_state = UiState::new(&ViewerConfig::default());
        assert_eq!(ui_state.model_browser.title(), "Acho que eu vi um gatinho");
        assert_eq!(ui_state.model_browser.type_filters(), ["obj"]);
        assert_eq!(ui_state.texture_browser.title(), "Load Texture");
        assert_eq!(ui_state.texture_browser.type_filters(), ["jpg", "png"]);
    }

    #[test]
    fn test_control_window_grows_without_uv() {
        assert_eq!(control_window_size(true), Vec2::new(222.0, 50.0));
        assert_eq!(control_window_size(false), Vec2::new(222.0, 76.0));
    }
}
