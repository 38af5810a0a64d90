use std::path::{Path, PathBuf};

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Lists `dir`: directories first, then files accepted by `filters`, each
/// group sorted by name. Hidden entries are skipped.
pub fn list_entries(dir: &Path, filters: &[String]) -> std::io::Result<Vec<BrowserEntry>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let path = entry.path();
        let is_dir = path.is_dir();
        if is_dir || matches_filters(&path, filters) {
            entries.push(BrowserEntry { name, path, is_dir });
        }
    }
    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
    Ok(entries)
}

/// Case-insensitive extension match. An empty filter list accepts everything.
pub fn matches_filters(path: &Path, filters: &[String]) -> bool {
    if filters.is_empty() {
        return true;
    }
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    filters.iter().any(|f| *f == ext)
}

fn normalize_filter(filter: &str) -> String {
    filter.trim_start_matches('.').to_ascii_lowercase()
}

/// Modal-ish file picker window. Call [`FileBrowser::display`] every frame and
/// poll [`FileBrowser::has_selected`] afterwards.
pub struct FileBrowser {
    title: String,
    type_filters: Vec<String>,
    window_size: egui::Vec2,
    pwd: PathBuf,
    open: bool,
    highlighted: Option<PathBuf>,
    selected: Option<PathBuf>,
    listing: Result<Vec<BrowserEntry>, String>,
}

impl FileBrowser {
    pub fn new(title: impl Into<String>) -> Self {
        let pwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            title: title.into(),
            type_filters: Vec::new(),
            window_size: egui::vec2(640.0, 480.0),
            pwd,
            open: false,
            highlighted: None,
            selected: None,
            listing: Ok(Vec::new()),
        }
    }

    /// Filters like `".jpg"` or `"png"`.
    pub fn with_type_filters(mut self, filters: &[&str]) -> Self {
        self.type_filters = filters.iter().map(|f| normalize_filter(f)).collect();
        self
    }

    pub fn with_pwd(mut self, pwd: impl Into<PathBuf>) -> Self {
        self.pwd = pwd.into();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn type_filters(&self) -> &[String] {
        &self.type_filters
    }

    pub fn set_window_size(&mut self, size: egui::Vec2) {
        self.window_size = size;
    }

    pub fn window_size(&self) -> egui::Vec2 {
        self.window_size
    }

    pub fn pwd(&self) -> &Path {
        &self.pwd
    }

    pub fn set_pwd(&mut self, pwd: impl Into<PathBuf>) {
        self.pwd = pwd.into();
        self.highlighted = None;
        self.refresh();
    }

    pub fn open(&mut self) {
        self.open = true;
        self.refresh();
    }

    pub fn close(&mut self) {
        self.open = false;
        self.highlighted = None;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn has_selected(&self) -> bool {
        self.selected.is_some()
    }

    pub fn selected(&self) -> Option<&Path> {
        self.selected.as_deref()
    }

    pub fn clear_selected(&mut self) {
        self.selected = None;
    }

    pub fn entries(&self) -> Result<&[BrowserEntry], &str> {
        self.listing.as_deref().map_err(String::as_str)
    }

    /// Re-read the working directory.
    pub fn refresh(&mut self) {
        self.listing = list_entries(&self.pwd, &self.type_filters).map_err(|e| {
            tracing::warn!("Cannot list {}: {}", self.pwd.display(), e);
            format!("Cannot list {}: {}", self.pwd.display(), e)
        });
    }

    /// Enter a directory or pick a file; picking closes the browser.
    pub fn choose(&mut self, path: &Path) {
        if path.is_dir() {
            self.set_pwd(path);
        } else if matches_filters(path, &self.type_filters) {
            self.selected = Some(path.to_path_buf());
            self.close();
        }
    }

    fn go_up(&mut self) {
        if let Some(parent) = self.pwd.parent().map(Path::to_path_buf) {
            self.set_pwd(parent);
        }
    }

    pub fn display(&mut self, ctx: &egui::Context) {
        if !self.open {
            return;
        }

        let mut chosen: Option<PathBuf> = None;
        let mut go_up = false;
        let mut cancel = false;

        egui::Window::new(self.title.clone())
            .collapsible(false)
            .resizable(false)
            .fixed_size(self.window_size)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(egui::RichText::new(self.pwd.display().to_string()).small());
                ui.separator();

                let list_height = (self.window_size.y - 80.0).max(40.0);
                egui::ScrollArea::vertical().max_height(list_height).show(ui, |ui| {
                    if self.pwd.parent().is_some() && ui.selectable_label(false, "..").double_clicked() {
                        go_up = true;
                    }
                    match &self.listing {
                        Ok(entries) => {
                            for entry in entries {
                                let label = if entry.is_dir {
                                    format!("[dir] {}", entry.name)
                                } else {
                                    entry.name.clone()
                                };
                                let is_highlighted = self.highlighted.as_ref() == Some(&entry.path);
                                let response = ui.selectable_label(is_highlighted, label);
                                if response.double_clicked() {
                                    chosen = Some(entry.path.clone());
                                } else if response.clicked() {
                                    self.highlighted = Some(entry.path.clone());
                                }
                            }
                        }
                        Err(message) => {
                            ui.colored_label(egui::Color32::LIGHT_RED, message);
                        }
                    }
                });

                ui.separator();
                ui.horizontal(|ui| {
                    let can_open = self.highlighted.is_some();
                    if ui.add_enabled(can_open, egui::Button::new("Open")).clicked() {
                        chosen = self.highlighted.clone();
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                    if !self.type_filters.is_empty() {
                        ui.label(format!("Filter: {}", self.type_filters.join(", ")));
                    }
                });
            });

        if go_up {
            self.go_up();
        }
        if let Some(path) = chosen {
            self.choose(&path);
        }
        if cancel {
            self.close();
        }
    }
}
