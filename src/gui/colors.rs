use eframe::egui::Color32;

/// Map a file extension to a name colour in the results table.
pub fn color_for_extension(ext: &str) -> Color32 {
    match ext {
        "sh" | "bash" | "zsh" | "fish" | "run" | "appimage" => Color32::from_rgb(80, 220, 120),
        "so" | "a" | "o" | "ko" => Color32::from_rgb(80, 220, 255),
        "xml" | "html" | "htm" | "json" | "yaml" | "yml" | "toml" | "css" => {
            Color32::from_rgb(80, 200, 80)
        }
        "svg" | "png" | "jpg" | "jpeg" | "gif" | "bmp" | "ico" | "webp" | "tiff" => {
            Color32::from_rgb(220, 80, 220)
        }
        "rs" | "go" | "c" | "cpp" | "h" | "hpp" | "py" | "js" | "ts" => {
            Color32::from_rgb(100, 180, 255)
        }
        "zip" | "tar" | "gz" | "bz2" | "7z" | "xz" | "zst" | "deb" | "rpm" => {
            Color32::from_rgb(255, 120, 120)
        }
        "pdf" | "odt" | "ods" | "doc" | "docx" | "xls" | "xlsx" => Color32::from_rgb(255, 240, 120),
        "md" | "txt" | "log" | "ini" | "cfg" | "conf" => Color32::from_rgb(180, 180, 180),
        _ => Color32::from_rgb(220, 220, 220),
    }
}

/// Get an icon string for a result entry.
pub fn icon_for_entry(is_directory: bool, ext: &str) -> &'static str {
    if is_directory {
        return "\u{1F4C1}"; // folder
    }
    match ext {
        "sh" | "bash" | "zsh" | "fish" | "run" | "appimage" => "\u{2699}\u{FE0F}",
        "so" | "a" | "o" | "ko" => "\u{1F527}",
        "txt" | "log" => "\u{1F4DD}",
        "md" => "\u{1F4C3}",
        "pdf" => "\u{1F4D5}",
        "zip" | "tar" | "gz" | "7z" | "xz" | "zst" | "deb" | "rpm" => "\u{1F4E6}",
        "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" | "tiff" | "svg" => "\u{1F5BC}\u{FE0F}",
        "mp3" | "wav" | "flac" | "ogg" => "\u{1F3B5}",
        "mp4" | "avi" | "mkv" | "mov" | "webm" => "\u{1F3AC}",
        "py" => "\u{1F40D}",
        "rs" => "\u{1F980}",
        "ini" | "cfg" | "conf" | "toml" | "yaml" | "yml" => "\u{2699}\u{FE0F}",
        _ => "\u{1F4C4}",
    }
}
