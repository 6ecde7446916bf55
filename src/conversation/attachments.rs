use eframe::egui::DroppedFile;
use std::path::Path;

const SCHEMA_EXTENSION: &str = "json";

/// File names the user has attached as schema context. Grows only; duplicates
/// are kept so every submission sees exactly what was selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentRegistry {
    file_names: Vec<String>,
}

impl AttachmentRegistry {
    pub fn add<I, S>(&mut self, file_names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file_names
            .extend(file_names.into_iter().map(Into::into));
    }

    pub fn file_names(&self) -> &[String] {
        &self.file_names
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.file_names.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.file_names.is_empty()
    }
}

fn has_schema_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SCHEMA_EXTENSION))
}

fn dropped_file_name(file: &DroppedFile) -> Option<String> {
    let from_path = file
        .path
        .as_deref()
        .and_then(|path| path.file_name())
        .and_then(|name| name.to_str())
        .map(str::to_string);

    from_path.or_else(|| {
        let name = file.name.trim();
        (!name.is_empty()).then(|| name.to_string())
    })
}

/// Names of dropped files that pass the `.json` selection filter, in drop order.
pub fn schema_file_names(files: &[DroppedFile]) -> Vec<String> {
    files
        .iter()
        .filter_map(dropped_file_name)
        .filter(|name| has_schema_extension(name))
        .collect()
}
